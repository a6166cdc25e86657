use serde_json::{Map, Value};

use super::Document;
use crate::domain::error::DomainError;

/// Set `value` at `path` inside `document`.
///
/// Missing (or `null`) intermediate objects are created. Numeric segments
/// address existing array elements.
pub fn set_path(document: &mut Document, path: &[String], value: Value) -> Result<(), DomainError> {
    let Some((last, parents)) = path.split_last() else {
        return Err(DomainError::validation("settings path must not be empty"));
    };
    if path.iter().any(|segment| segment.is_empty()) {
        return Err(DomainError::settings_path(path, "contains an empty segment"));
    }

    let mut root = Value::Object(std::mem::take(document));
    let result = assign(&mut root, path, parents, last, value);
    if let Value::Object(map) = root {
        *document = map;
    }
    result
}

fn assign(
    root: &mut Value,
    path: &[String],
    parents: &[String],
    last: &str,
    value: Value,
) -> Result<(), DomainError> {
    let mut cursor = root;
    for segment in parents {
        cursor = descend(cursor, path, segment)?;
    }

    match cursor {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = array_index(path, last, items.len())?;
            items[index] = value;
            Ok(())
        }
        _ => Err(DomainError::settings_path(
            path,
            "does not address an object or array",
        )),
    }
}

fn descend<'a>(
    cursor: &'a mut Value,
    path: &[String],
    segment: &str,
) -> Result<&'a mut Value, DomainError> {
    match cursor {
        Value::Object(map) => {
            let slot = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            Ok(slot)
        }
        Value::Array(items) => {
            let index = array_index(path, segment, items.len())?;
            Ok(&mut items[index])
        }
        _ => Err(DomainError::settings_path(
            path,
            "does not address an object or array",
        )),
    }
}

fn array_index(path: &[String], segment: &str, len: usize) -> Result<usize, DomainError> {
    match segment.parse::<usize>() {
        Ok(index) if index < len => Ok(index),
        Ok(_) => Err(DomainError::settings_path(path, "indexes past the end of an array")),
        Err(_) => Err(DomainError::settings_path(path, "uses a non-numeric array index")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::site_config::document_from_value;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sets_nested_value_creating_parents() {
        let mut doc = Document::new();
        set_path(&mut doc, &path(&["contact", "phone"]), json!("+1")).expect("set");
        assert_eq!(Value::Object(doc), json!({"contact": {"phone": "+1"}}));
    }

    #[test]
    fn replaces_null_parent_with_object() {
        let mut doc = document_from_value(json!({"home": null})).expect("object");
        set_path(&mut doc, &path(&["home", "hero", "badge"]), json!("New")).expect("set");
        assert_eq!(doc["home"]["hero"]["badge"], "New");
    }

    #[test]
    fn addresses_array_elements_by_index() {
        let mut doc = document_from_value(json!({
            "navigation": {"links": [{"label": "Home"}, {"label": "About"}]}
        }))
        .expect("object");

        set_path(
            &mut doc,
            &path(&["navigation", "links", "1", "label"]),
            json!("Team"),
        )
        .expect("set");

        assert_eq!(doc["navigation"]["links"][1]["label"], "Team");
        assert_eq!(doc["navigation"]["links"][0]["label"], "Home");
    }

    #[test]
    fn rejects_empty_path() {
        let mut doc = Document::new();
        let err = set_path(&mut doc, &[], json!(1)).expect_err("empty path");
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn rejects_descending_into_scalars() {
        let mut doc = document_from_value(json!({"company": {"name": "Acme"}})).expect("object");
        let err = set_path(&mut doc, &path(&["company", "name", "short"]), json!("A"))
            .expect_err("scalar parent");
        assert_eq!(
            err,
            DomainError::SettingsPath {
                path: "company.name.short".to_string(),
                reason: "does not address an object or array",
            }
        );
        assert_eq!(doc["company"]["name"], "Acme");
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut doc = document_from_value(json!({"list": [1]})).expect("object");
        let err = set_path(&mut doc, &path(&["list", "4"]), json!(2)).expect_err("range");
        assert!(matches!(err, DomainError::SettingsPath { .. }));
    }
}
