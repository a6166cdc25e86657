//! Site settings: persistence adapter, validation and the service that ties
//! them to the process-wide cache.

mod adapter;
mod service;
mod validation;

pub use adapter::{
    FetchOutcome, SaveError, SettingsAdapter, SettingsFetchReport, SettingsSaveReport,
    StoredSettings,
};
pub use service::{SettingsError, SettingsStatus, SiteSettingsService};
pub use validation::validate_effective;
