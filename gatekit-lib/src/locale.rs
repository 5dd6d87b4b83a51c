//! Localization post-processing for remote config payloads.
//!
//! Backend dashboards let operators enter per-language dictionaries anywhere
//! inside a remote-config JSON document. A payload that decodes directly is
//! used as-is; otherwise the tree is walked and every object whose keys all
//! look like language tags is collapsed to a single value, picked in the
//! order: exact preferred tag, English, primary-subtag match, first key.

use crate::{GatekitError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Check whether a string looks like a language tag (`en`, `de_DE`,
/// `zh-Hans`): a 2-3 letter primary subtag optionally followed by 1-8
/// character alphanumeric subtags separated by `-` or `_`.
pub fn is_language_tag(s: &str) -> bool {
    let mut parts = s.split(['-', '_']);
    let primary = match parts.next() {
        Some(p) => p,
        None => return false,
    };
    if !(2..=3).contains(&primary.len()) || !primary.bytes().all(|b| b.is_ascii_alphabetic()) {
        return false;
    }
    parts.all(|p| (1..=8).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_alphanumeric()))
}

/// Normalize a tag for comparison: ASCII-lowercase, `_` folded to `-`.
fn normalize(tag: &str) -> String {
    tag.to_ascii_lowercase().replace('_', "-")
}

/// The primary subtag of a normalized tag (`de-DE` → `de`).
fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

/// Pick the best value out of a language-keyed map.
///
/// Resolution order: exact preferred tag, then `en`, then the first key
/// sharing the preferred tag's primary subtag, then the first key. Returns
/// `None` only for an empty map.
pub fn resolve_language_map<'a>(map: &'a Map<String, Value>, preferred: &str) -> Option<&'a Value> {
    let preferred = normalize(preferred);

    if let Some((_, value)) = map.iter().find(|(k, _)| normalize(k) == preferred) {
        return Some(value);
    }
    if let Some((_, value)) = map.iter().find(|(k, _)| normalize(k) == "en") {
        return Some(value);
    }
    let primary = primary_subtag(&preferred);
    if let Some((_, value)) = map
        .iter()
        .find(|(k, _)| primary_subtag(&normalize(k)) == primary)
    {
        return Some(value);
    }
    map.values().next()
}

/// Walk a JSON tree bottom-up and collapse every non-empty object whose keys
/// all look like language tags into the value picked by
/// [`resolve_language_map`].
pub fn localize_value(value: Value, preferred: &str) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, localize_value(v, preferred)))
                .collect();
            if !map.is_empty() && map.keys().all(|k| is_language_tag(k)) {
                resolve_language_map(&map, preferred)
                    .cloned()
                    .unwrap_or(Value::Null)
            } else {
                Value::Object(map)
            }
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| localize_value(v, preferred))
                .collect(),
        ),
        other => other,
    }
}

/// Decode a remote-config payload into `T`.
///
/// Attempts a direct structured decode first; if that fails, parses the
/// payload into a generic tree, localizes language-keyed dictionaries for
/// `preferred`, and decodes again.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(raw), fields(payload_len = raw.len())))]
pub fn decode_localized<T: DeserializeOwned>(raw: &str, preferred: &str) -> Result<T> {
    match serde_json::from_str(raw) {
        Ok(decoded) => Ok(decoded),
        Err(direct_err) => {
            let tree: Value = serde_json::from_str(raw)
                .map_err(|_| GatekitError::Serialization(direct_err.to_string()))?;
            let localized = localize_value(tree, preferred);
            serde_json::from_value(localized).map_err(|err| GatekitError::Serialization(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn language_tag_detection() {
        assert!(is_language_tag("en"));
        assert!(is_language_tag("deu"));
        assert!(is_language_tag("de-DE"));
        assert!(is_language_tag("pt_BR"));
        assert!(is_language_tag("zh-Hans"));

        assert!(!is_language_tag(""));
        assert!(!is_language_tag("e"));
        assert!(!is_language_tag("title"));
        assert!(!is_language_tag("en-"));
        assert!(!is_language_tag("1x"));
        assert!(!is_language_tag("en-überlang"));
    }

    #[test]
    fn resolves_exact_language_first() {
        let value = json!({"en": "Hello", "de": "Hallo", "fr": "Bonjour"});
        assert_eq!(localize_value(value, "de"), json!("Hallo"));
    }

    #[test]
    fn exact_match_ignores_case_and_separator() {
        let value = json!({"PT_br": "Olá", "en": "Hello"});
        assert_eq!(localize_value(value, "pt-BR"), json!("Olá"));
    }

    #[test]
    fn falls_back_to_english() {
        let value = json!({"en": "Hello", "fr": "Bonjour"});
        assert_eq!(localize_value(value, "ja"), json!("Hello"));
    }

    #[test]
    fn falls_back_to_primary_subtag_match() {
        let value = json!({"de-AT": "Servus", "fr": "Bonjour"});
        assert_eq!(localize_value(value, "de-DE"), json!("Servus"));
    }

    #[test]
    fn falls_back_to_first_value() {
        let value = json!({"fr": "Bonjour", "it": "Ciao"});
        // Map iteration is key-ordered, so "fr" is first.
        assert_eq!(localize_value(value, "ja"), json!("Bonjour"));
    }

    #[test]
    fn non_language_objects_are_untouched() {
        let value = json!({"headline": "Hi", "cta": "Buy"});
        assert_eq!(
            localize_value(value.clone(), "en"),
            value
        );
    }

    #[test]
    fn nested_dictionaries_collapse_inside_structure() {
        let value = json!({
            "headline": {"en": "Go premium", "de": "Premium holen"},
            "features": [
                {"en": "No ads", "de": "Keine Werbung"},
                "static"
            ],
            "meta": {"version": 2}
        });
        let localized = localize_value(value, "de");
        assert_eq!(
            localized,
            json!({
                "headline": "Premium holen",
                "features": ["Keine Werbung", "static"],
                "meta": {"version": 2}
            })
        );
    }

    #[test]
    fn language_values_are_localized_before_collapse() {
        // The chosen language's value may itself contain dictionaries.
        let value = json!({
            "en": {"title": {"en": "Hi", "de": "Hallo"}},
            "de": {"title": {"en": "Hi", "de": "Hallo"}}
        });
        assert_eq!(localize_value(value, "de"), json!({"title": "Hallo"}));
    }

    #[test]
    fn decode_direct_when_payload_already_matches() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Config {
            headline: String,
        }
        let raw = r#"{"headline": "Go premium"}"#;
        let config: Config = decode_localized(raw, "de").unwrap();
        assert_eq!(config.headline, "Go premium");
    }

    #[test]
    fn decode_localizes_on_direct_failure() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Config {
            headline: String,
        }
        let raw = r#"{"headline": {"en": "Go premium", "de": "Premium holen"}}"#;
        let config: Config = decode_localized(raw, "de").unwrap();
        assert_eq!(config.headline, "Premium holen");
    }

    #[test]
    fn decode_invalid_json_reports_serialization_error() {
        let err = decode_localized::<serde_json::Value>("{not json", "en").unwrap_err();
        assert_eq!(err.code(), crate::GatekitErrorCode::Serialization);
    }
}
