use std::{env, path::PathBuf};

use thiserror::Error;

use super::schema::Settings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `ENCORE__`), and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("ENCORE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=10.0).contains(&self.player.volume) {
            return Err(SettingsError::Invalid(format!(
                "player.volume must be within 0..=10, got {}",
                self.player.volume
            )));
        }
        if self.player.tick_interval_ms == 0 {
            return Err(SettingsError::Invalid(
                "player.tick_interval_ms must be >= 1".to_string(),
            ));
        }
        if self.library.artist_title_separator.is_empty() {
            return Err(SettingsError::Invalid(
                "library.artist_title_separator must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the settings as TOML (used by `--print-config`).
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Resolve the config path from `ENCORE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ENCORE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/encore/config.toml`
/// or `~/.config/encore/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("encore").join("config.toml"))
}
