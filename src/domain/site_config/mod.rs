//! The site configuration document.
//!
//! A single nested JSON tree holds every text, metric and card list the public
//! site renders. The compiled-in defaults are always complete; the database
//! override may be partial. [`merge`] combines the two into the effective
//! document that consumers read.

mod merge;
mod path;
mod view;

pub use merge::merge;
pub use path::set_path;
pub use view::{
    Branding, Company, Contact, NavLink, Navigation, SiteConfig, Social, WhatsappWidget,
};

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

/// A configuration document: the top-level JSON object keyed by page/section.
pub type Document = Map<String, Value>;

/// Row key of the persisted override document.
pub const SETTINGS_ROW_KEY: &str = "site_config";

const DEFAULT_SITE_CONFIG: &str = include_str!("../../../assets/site_config.json");

static DEFAULTS: Lazy<Arc<Document>> = Lazy::new(|| {
    let document: Document = serde_json::from_str(DEFAULT_SITE_CONFIG)
        .expect("bundled site configuration must be a JSON object");
    Arc::new(document)
});

/// The compiled-in Default Configuration.
pub fn defaults() -> Arc<Document> {
    Arc::clone(&DEFAULTS)
}

/// Interpret a stored JSON value as a document. Only objects qualify.
pub fn document_from_value(value: Value) -> Option<Document> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults_cover_every_section() {
        let defaults = defaults();
        for section in [
            "company",
            "contact",
            "social",
            "navigation",
            "home",
            "about",
            "services",
            "portfolio",
            "contactPage",
            "admin",
            "footer",
            "branding",
            "whatsappWidget",
        ] {
            assert!(
                defaults.get(section).is_some_and(Value::is_object),
                "missing section {section}"
            );
        }
    }

    #[test]
    fn defaults_are_shared_not_reparsed() {
        assert!(Arc::ptr_eq(&defaults(), &defaults()));
    }

    #[test]
    fn only_objects_become_documents() {
        assert!(document_from_value(serde_json::json!({"a": 1})).is_some());
        assert!(document_from_value(serde_json::json!([1, 2])).is_none());
        assert!(document_from_value(Value::Null).is_none());
    }
}
