//! Property tests for locale resolution.

use gatekit_lib::locale::{is_language_tag, localize_value};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const TAGS: &[&str] = &[
    "en", "en-US", "de", "de-DE", "de_AT", "fr", "pt-BR", "es", "it", "ja", "zh-Hans",
];

proptest! {
    #[test]
    fn collapse_always_picks_an_existing_value(
        keys in proptest::collection::hash_set(prop::sample::select(TAGS), 1..6),
        preferred in prop::sample::select(TAGS),
    ) {
        let mut map = Map::new();
        for (i, key) in keys.iter().enumerate() {
            map.insert(key.to_string(), json!(i as i64));
        }
        let values: Vec<Value> = map.values().cloned().collect();

        let localized = localize_value(Value::Object(map), preferred);
        prop_assert!(values.contains(&localized));
    }

    #[test]
    fn exact_preferred_tag_always_wins(
        others in proptest::collection::hash_set(prop::sample::select(TAGS), 0..5),
        preferred in prop::sample::select(TAGS),
    ) {
        let mut map = Map::new();
        for key in &others {
            map.insert(key.to_string(), json!("other"));
        }
        map.insert(preferred.to_string(), json!("target"));

        let localized = localize_value(Value::Object(map), preferred);
        prop_assert_eq!(localized, json!("target"));
    }

    #[test]
    fn english_beats_arbitrary_when_preferred_missing(
        others in proptest::collection::hash_set(
            prop::sample::select(&["fr", "it", "ja", "pt-BR"][..]), 1..4),
    ) {
        let mut map = Map::new();
        for key in &others {
            map.insert(key.to_string(), json!("other"));
        }
        map.insert("en".to_string(), json!("english"));

        // "ko" is a valid tag that never appears in the map.
        let localized = localize_value(Value::Object(map), "ko");
        prop_assert_eq!(localized, json!("english"));
    }

    #[test]
    fn non_language_maps_survive(
        keys in proptest::collection::hash_set("[a-z]{4,10}", 1..5),
    ) {
        let mut map = Map::new();
        for key in &keys {
            prop_assume!(!is_language_tag(key));
            map.insert(key.clone(), json!("value"));
        }
        let original = Value::Object(map);

        let localized = localize_value(original.clone(), "en");
        prop_assert_eq!(localized, original);
    }
}
