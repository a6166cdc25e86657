use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::error::DomainError;
use crate::domain::site_config::Document;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const REQUIRED_SECTIONS: [&str; 3] = ["company", "contact", "social"];

/// Check the effective document an admin save would produce.
pub fn validate_effective(document: &Document) -> Result<(), DomainError> {
    let mut problems = Vec::new();

    for section in REQUIRED_SECTIONS {
        if !document.get(section).is_some_and(Value::is_object) {
            problems.push(format!("`{section}` section is required"));
        }
    }

    let company_name = document
        .get("company")
        .and_then(|company| company.get("name"))
        .and_then(Value::as_str);
    if !company_name.is_some_and(|name| !name.trim().is_empty()) {
        problems.push("company.name is required".to_string());
    }

    let email = document
        .get("contact")
        .and_then(|contact| contact.get("email"))
        .and_then(Value::as_str);
    if !email.is_some_and(|email| EMAIL_PATTERN.is_match(email)) {
        problems.push("contact.email must be a valid email address".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation(problems.join("; ")))
    }
}
