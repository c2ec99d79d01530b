use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::PolicyHandle;
use crate::library::{LibraryError, export_csv, find_duplicates, write_duplicates};
use crate::model::{ItemId, Singer, Song};

use super::coordinator::{Command, CoordinatorHandle};

pub const HELP: &str = "\
commands:
  play | pause | stop | next | prev
  seek <ms>                  jump within the current song
  vol <0-10>                 set the volume
  add <lib#> [singer,...]    queue a library song
  insert <pos> <lib#>...     insert library songs at a playlist position
  move <item> <pos>          move a playlist item
  rm <item>                  remove a playlist item
  playitem <item>            play a playlist item now
  clear                      empty the playlist
  list                       show the playlist
  lib [filter]               show the library
  dupes                      list songs found more than once
  export <file.csv>          write the library as two csv listings
  status                     show what is playing
  set <sequential|stop-after|remove-after> <on|off>
  help | quit";

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{0}` is missing an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a valid {1}")]
    BadArgument(String, &'static str),
    #[error("no library song {0}")]
    NoSuchSong(usize),
    #[error("coordinator is not running")]
    Disconnected,
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PolicyFlag {
    Sequential,
    StopAfterSong,
    RemoveAfterFetch,
}

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Empty,
    Play,
    Pause,
    Stop,
    Next,
    Prev,
    Seek(i64),
    Volume(f64),
    Add { song: usize, singers: Vec<String> },
    Insert { index: usize, songs: Vec<usize> },
    Move { item: ItemId, index: usize },
    Remove(ItemId),
    PlayItem(ItemId),
    Clear,
    List,
    Library(Option<String>),
    Dupes,
    Export(PathBuf),
    Status,
    Set { flag: PolicyFlag, on: bool },
    Help,
    Quit,
}

fn number<T: std::str::FromStr>(
    arg: Option<&str>,
    cmd: &'static str,
    what: &'static str,
) -> Result<T, ConsoleError> {
    let arg = arg.ok_or(ConsoleError::MissingArgument(cmd))?;
    arg.parse()
        .map_err(|_| ConsoleError::BadArgument(arg.to_string(), what))
}

fn item_id(arg: Option<&str>, cmd: &'static str) -> Result<ItemId, ConsoleError> {
    let arg = arg.ok_or(ConsoleError::MissingArgument(cmd))?;
    arg.trim_start_matches('#')
        .parse()
        .map(ItemId)
        .map_err(|_| ConsoleError::BadArgument(arg.to_string(), "item id"))
}

fn switch(arg: Option<&str>) -> Result<bool, ConsoleError> {
    match arg {
        Some("on" | "true" | "yes") => Ok(true),
        Some("off" | "false" | "no") => Ok(false),
        Some(other) => Err(ConsoleError::BadArgument(other.to_string(), "switch")),
        None => Err(ConsoleError::MissingArgument("set")),
    }
}

pub fn parse_command(line: &str) -> Result<Input, ConsoleError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let input = match head {
        "" => Input::Empty,
        "play" => Input::Play,
        "pause" => Input::Pause,
        "stop" => Input::Stop,
        "next" => Input::Next,
        "prev" | "previous" => Input::Prev,
        "seek" => Input::Seek(number(args.next(), "seek", "position")?),
        "vol" | "volume" => Input::Volume(number(args.next(), "vol", "volume")?),
        "add" => {
            let song = number(args.next(), "add", "library number")?;
            let singers = rest
                .split_once(char::is_whitespace)
                .map(|(_, names)| {
                    names
                        .split(',')
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Input::Add { song, singers }
        }
        "insert" => {
            let index = number(args.next(), "insert", "position")?;
            let songs = args
                .map(|a| number(Some(a), "insert", "library number"))
                .collect::<Result<Vec<usize>, _>>()?;
            if songs.is_empty() {
                return Err(ConsoleError::MissingArgument("insert"));
            }
            Input::Insert { index, songs }
        }
        "move" => {
            let item = item_id(args.next(), "move")?;
            let index = number(args.next(), "move", "position")?;
            Input::Move { item, index }
        }
        "rm" | "remove" => Input::Remove(item_id(args.next(), "rm")?),
        "playitem" => Input::PlayItem(item_id(args.next(), "playitem")?),
        "clear" => Input::Clear,
        "list" | "ls" => Input::List,
        "lib" => Input::Library((!rest.is_empty()).then(|| rest.to_lowercase())),
        "dupes" => Input::Dupes,
        "export" if rest.is_empty() => return Err(ConsoleError::MissingArgument("export")),
        "export" => Input::Export(PathBuf::from(rest)),
        "status" => Input::Status,
        "set" => {
            let flag = match args.next() {
                Some("sequential") => PolicyFlag::Sequential,
                Some("stop-after") => PolicyFlag::StopAfterSong,
                Some("remove-after") => PolicyFlag::RemoveAfterFetch,
                Some(other) => return Err(ConsoleError::BadArgument(other.to_string(), "setting")),
                None => return Err(ConsoleError::MissingArgument("set")),
            };
            Input::Set {
                flag,
                on: switch(args.next())?,
            }
        }
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(ConsoleError::Unknown(other.to_string())),
    };
    Ok(input)
}

/// Whether the console loop keeps reading.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end: turns [`Input`] into coordinator commands and
/// prints replies.
pub struct Console<'a> {
    pub songs: &'a [Arc<Song>],
    pub coordinator: &'a CoordinatorHandle,
    pub policy: &'a PolicyHandle,
}

impl Console<'_> {
    fn song(&self, n: usize) -> Result<Arc<Song>, ConsoleError> {
        self.songs.get(n).cloned().ok_or(ConsoleError::NoSuchSong(n))
    }

    fn send(&self, cmd: Command) -> Result<(), ConsoleError> {
        self.coordinator
            .send(cmd)
            .map_err(|_| ConsoleError::Disconnected)
    }

    /// Parse and run one line. Parse and lookup errors are printed, not
    /// returned.
    pub fn handle_line(&self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let result = parse_command(line).and_then(|input| self.execute(input, out));
        match result {
            Ok(flow) => Ok(flow),
            Err(ConsoleError::Io(e)) => Err(e),
            Err(e) => {
                writeln!(out, "error: {e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&self, input: Input, out: &mut impl Write) -> Result<Flow, ConsoleError> {
        match input {
            Input::Empty => {}
            Input::Play => self.send(Command::Play)?,
            Input::Pause => self.send(Command::Pause)?,
            Input::Stop => self.send(Command::Stop)?,
            Input::Next => self.send(Command::Next)?,
            Input::Prev => self.send(Command::Previous)?,
            Input::Seek(ms) => self.send(Command::Seek(ms))?,
            Input::Volume(level) => self.send(Command::SetVolume(level))?,
            Input::Add { song, singers } => {
                let song = self.song(song)?;
                writeln!(out, "queued {}", song.display())?;
                self.send(Command::Enqueue {
                    song,
                    singers: singers.into_iter().map(Singer::new).collect(),
                    start_if_empty: true,
                })?;
            }
            Input::Insert { index, songs } => {
                let songs = songs
                    .into_iter()
                    .map(|n| self.song(n))
                    .collect::<Result<Vec<_>, _>>()?;
                self.send(Command::Insert { index, songs })?;
            }
            Input::Move { item, index } => self.send(Command::Reorder { item, index })?,
            Input::Remove(item) => self.send(Command::Remove(item))?,
            Input::PlayItem(item) => self.send(Command::PlayItem(item))?,
            Input::Clear => self.send(Command::Clear)?,
            Input::List => self.print_playlist(out)?,
            Input::Library(filter) => self.print_library(filter.as_deref(), out)?,
            Input::Dupes => write_duplicates(&find_duplicates(self.songs), out)?,
            Input::Export(target) => {
                let (by_artist, by_title) = export_csv(self.songs, &target)?;
                writeln!(out, "wrote {} and {}", by_artist.display(), by_title.display())?;
            }
            Input::Status => self.print_status(out)?,
            Input::Set { flag, on } => {
                self.policy.update(|p| match flag {
                    PolicyFlag::Sequential => p.sequential = on,
                    PolicyFlag::StopAfterSong => p.stop_after_song = on,
                    PolicyFlag::RemoveAfterFetch => p.remove_after_fetch = on,
                });
                writeln!(out, "{flag:?} = {on}")?;
            }
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn print_playlist(&self, out: &mut impl Write) -> Result<(), ConsoleError> {
        let snap = self.coordinator.snapshot().ok_or(ConsoleError::Disconnected)?;
        if snap.items.is_empty() {
            writeln!(out, "playlist is empty")?;
        }
        let now = std::time::Instant::now();
        for (pos, item) in snap.items.iter().enumerate() {
            let marker = if item.is_playing() { '>' } else { ' ' };
            let singers = item.singers_text();
            let singers = if singers.is_empty() {
                String::new()
            } else {
                format!(" [{singers}]")
            };
            writeln!(
                out,
                "{marker}{pos:>3} {} {}{singers} ({})",
                item.id(),
                item.song().display(),
                item.time_since_added(now)
            )?;
        }
        Ok(())
    }

    fn print_library(&self, filter: Option<&str>, out: &mut impl Write) -> Result<(), ConsoleError> {
        for (n, song) in self.songs.iter().enumerate() {
            let text = song.display();
            if filter.is_some_and(|f| !text.to_lowercase().contains(f)) {
                continue;
            }
            let cdg = if song.has_graphics() || song.is_archive() {
                " +cdg"
            } else {
                ""
            };
            writeln!(out, "{n:>5} {text}{cdg}")?;
        }
        Ok(())
    }

    fn print_status(&self, out: &mut impl Write) -> Result<(), ConsoleError> {
        let snap = self.coordinator.snapshot().ok_or(ConsoleError::Disconnected)?;
        let np = self
            .coordinator
            .now_playing()
            .lock()
            .map(|np| np.clone())
            .unwrap_or_else(|p| p.into_inner().clone());
        let policy = self.policy.get();

        match snap.current.as_ref() {
            Some(item) => writeln!(
                out,
                "{} {} {} (played {}x)",
                snap.state,
                item.id(),
                item.song().display(),
                snap.current_plays
            )?,
            None => writeln!(out, "{}", snap.state)?,
        }
        if !np.singers.is_empty() {
            writeln!(out, "singers: {}", np.singers)?;
        }
        if let Some(p) = np.progress.as_ref() {
            writeln!(out, "{} ({})", p.elapsed, p.remaining)?;
        }
        writeln!(
            out,
            "volume {:.1} | queued {} | played {} | sequential {} | stop-after {} | remove-after {}",
            snap.volume,
            snap.items.len(),
            snap.history_len,
            policy.sequential,
            policy.stop_after_song,
            policy.remove_after_fetch
        )?;
        Ok(())
    }
}
