//! Vitrine: marketing site backend, admin content portal and layered
//! site-configuration store.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
