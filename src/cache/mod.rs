//! In-process caching of the effective site configuration.

mod lock;
mod settings;

pub use settings::{ResolvedSettings, SettingsCache, SettingsSource};
