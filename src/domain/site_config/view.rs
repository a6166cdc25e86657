use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::warn;
use url::form_urlencoded;

use super::{Document, defaults};

const WHATSAPP_BASE_URL: &str = "https://wa.me/";

/// Strongly-typed view over the sections of the effective document that
/// server-side code consumes directly.
///
/// Every field is required. A section that does not deserialize (for example
/// because an override replaced a string with a number) falls back to the
/// corresponding default section as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub company: Company,
    pub contact: Contact,
    pub social: Social,
    pub navigation: Navigation,
    pub branding: Branding,
    pub whatsapp_widget: WhatsappWidget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub name_short: String,
    pub name_full: String,
    pub tagline: String,
    pub tagline_extended: String,
    pub description: String,
    pub description_long: String,
    pub slogan: String,
    pub founded_year: i32,
    pub employee_count: String,
    pub client_count: String,
    pub project_count: String,
    pub countries_served: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub email: String,
    pub email_support: String,
    pub email_sales: String,
    pub phone: String,
    pub phone_formatted: String,
    pub phone_international: String,
    /// Digits only, as used in `wa.me` links.
    pub whatsapp: String,
    pub address: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub country: String,
    pub timezone: String,
    pub map_share_link: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Social {
    pub facebook: String,
    pub twitter: String,
    pub linkedin: String,
    pub github: String,
    pub instagram: String,
    pub youtube: String,
    pub discord: String,
    pub telegram: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub links: Vec<NavLink>,
    pub admin_label: String,
    pub admin_dashboard_label: String,
    pub mobile_menu_label: String,
    pub close_menu_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub path: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub logo_url: String,
    pub favicon_url: String,
    pub og_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsappWidget {
    pub enabled: bool,
    pub position: String,
    pub default_message: String,
    pub show_on_pages: Vec<String>,
    pub button_text: String,
    pub button_icon: String,
    pub color: String,
}

static DEFAULT_VIEW: Lazy<SiteConfig> = Lazy::new(|| {
    let document = defaults();
    SiteConfig {
        company: bundled_section(&document, "company"),
        contact: bundled_section(&document, "contact"),
        social: bundled_section(&document, "social"),
        navigation: bundled_section(&document, "navigation"),
        branding: bundled_section(&document, "branding"),
        whatsapp_widget: bundled_section(&document, "whatsappWidget"),
    }
});

fn bundled_section<T: DeserializeOwned>(document: &Document, key: &str) -> T {
    let value = document.get(key).cloned().unwrap_or_default();
    serde_json::from_value(value)
        .unwrap_or_else(|err| panic!("bundled section `{key}` does not match its type: {err}"))
}

fn section_or<T: DeserializeOwned + Clone>(document: &Document, key: &str, fallback: &T) -> T {
    let Some(value) = document.get(key) else {
        return fallback.clone();
    };
    match T::deserialize(value) {
        Ok(section) => section,
        Err(err) => {
            warn!(
                target = "vitrine::settings::view",
                section = key,
                error = %err,
                "Section does not match its schema; using default section"
            );
            fallback.clone()
        }
    }
}

impl SiteConfig {
    /// Typed view of the compiled-in defaults.
    pub fn defaults() -> &'static SiteConfig {
        &DEFAULT_VIEW
    }

    /// Build the typed view of an effective document.
    pub fn from_document(document: &Document) -> Self {
        let fallback = Self::defaults();
        Self {
            company: section_or(document, "company", &fallback.company),
            contact: section_or(document, "contact", &fallback.contact),
            social: section_or(document, "social", &fallback.social),
            navigation: section_or(document, "navigation", &fallback.navigation),
            branding: section_or(document, "branding", &fallback.branding),
            whatsapp_widget: section_or(document, "whatsappWidget", &fallback.whatsapp_widget),
        }
    }

    /// Click-to-chat link for the configured WhatsApp number. A missing or
    /// empty message uses the widget's default message.
    pub fn whatsapp_url(&self, message: Option<&str>) -> String {
        let text = message
            .filter(|text| !text.is_empty())
            .unwrap_or(self.whatsapp_widget.default_message.as_str());
        format!(
            "{WHATSAPP_BASE_URL}{}?text={}",
            self.contact.whatsapp,
            encode_component(text)
        )
    }
}

/// Percent-encode a query component with spaces as `%20`. Form encoding
/// already escapes a literal `+` as `%2B`, so every remaining `+` is a space.
fn encode_component(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::site_config::{document_from_value, merge};

    #[test]
    fn default_view_reads_bundled_values() {
        let view = SiteConfig::defaults();
        assert_eq!(view.contact.whatsapp, "201225119842");
        assert_eq!(view.navigation.links.len(), 5);
        assert!(view.whatsapp_widget.enabled);
    }

    #[test]
    fn view_follows_effective_document() {
        let patch = document_from_value(json!({
            "company": {"name": "Northwind"},
            "navigation": {"links": [{"path": "/", "label": "Start"}]}
        }))
        .expect("object");
        let effective = merge(&defaults(), &patch);

        let view = SiteConfig::from_document(&effective);

        assert_eq!(view.company.name, "Northwind");
        assert_eq!(view.company.slogan, SiteConfig::defaults().company.slogan);
        assert_eq!(
            view.navigation.links,
            vec![NavLink {
                path: "/".into(),
                label: "Start".into()
            }]
        );
    }

    #[test]
    fn mistyped_section_falls_back_to_default() {
        let patch = document_from_value(json!({"contact": {"latitude": "north"}})).expect("object");
        let effective = merge(&defaults(), &patch);

        let view = SiteConfig::from_document(&effective);

        assert_eq!(view.contact, SiteConfig::defaults().contact);
    }

    #[test]
    fn whatsapp_url_encodes_message() {
        let view = SiteConfig::defaults();
        let url = view.whatsapp_url(Some("Hi there & welcome"));
        assert!(url.starts_with("https://wa.me/201225119842?text="));
        assert!(url.ends_with("?text=Hi%20there%20%26%20welcome"));
    }

    #[test]
    fn whatsapp_url_keeps_literal_plus_distinct_from_space() {
        let url = SiteConfig::defaults().whatsapp_url(Some("1+1 = 2"));
        assert!(url.ends_with("?text=1%2B1%20%3D%202"));
    }

    #[test]
    fn whatsapp_url_falls_back_to_default_message_when_blank() {
        let view = SiteConfig::defaults();
        let expected = view.whatsapp_url(Some(view.whatsapp_widget.default_message.as_str()));
        assert_eq!(view.whatsapp_url(Some("")), expected);
        assert_eq!(view.whatsapp_url(None), expected);
        assert!(!expected.ends_with("?text="));
    }
}
