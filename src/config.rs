//! Configuration loader and schema types.
//!
//! This module exposes the settings schema, the loader (file + environment)
//! and the shared playback policy handle read by the engine on every call.

mod load;
mod policy;
mod schema;

pub use load::{SettingsError, default_config_path, resolve_config_path};
pub use policy::PolicyHandle;
pub use schema::*;
