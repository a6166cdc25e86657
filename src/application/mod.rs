//! Application services and the storage contracts they depend on.

pub mod auth;
pub mod content;
pub mod error;
pub mod repos;
pub mod settings;
