use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::PolicyHandle;
use crate::error::Result;
use crate::library::{MediaLibrary, scan_folders};
use crate::model::Song;
use crate::player::RodioPlayer;

mod console;
mod coordinator;
mod logging;
mod settings;

pub use console::{Console, ConsoleError, Flow, Input, PolicyFlag, parse_command};
pub use coordinator::{Command, Coordinator, CoordinatorHandle, Snapshot};
pub use logging::init_logging;
pub use settings::load_settings;

pub fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--print-config") {
        print!("{}", crate::config::Settings::default().to_toml()?);
        return Ok(());
    }

    let (settings, fallback) = load_settings();
    init_logging(&settings.logging.filter);
    if let Some(reason) = fallback {
        warn!("{reason}");
    }

    let folders: Vec<PathBuf> = if !args.is_empty() {
        args.iter().map(PathBuf::from).collect()
    } else if !settings.library.folders.is_empty() {
        settings.library.folders.clone()
    } else {
        vec![env::current_dir()?]
    };

    let songs = scan_folders(&folders, &settings.library);
    info!(songs = songs.len(), folders = folders.len(), "library scanned");

    let library = MediaLibrary::new(songs);
    let catalog: Vec<Arc<Song>> = library.songs().to_vec();
    let policy = PolicyHandle::new(settings.playback);

    let coordinator = Coordinator::spawn(&settings, policy.clone(), library, RodioPlayer::open_default)?;
    let console = Console {
        songs: &catalog,
        coordinator: &coordinator,
        policy: &policy,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "encore: {} songs, type `help` for commands", catalog.len())?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if console.handle_line(&line, &mut out)? == Flow::Quit {
            break;
        }
        out.flush()?;
    }

    coordinator.shutdown();
    Ok(())
}
