//! Domain layer types and invariants.

pub mod entities;
pub mod error;
pub mod project_code;
pub mod site_config;
