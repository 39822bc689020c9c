//! Property-based tests for parameter parsing and request getters

use armature_request::{FixedScope, ParameterBag, SanitizedRequest};
use armature_xss::{Params, Value};
use proptest::prelude::*;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_map(|s| s.to_string())
}

proptest! {
    #[test]
    fn prop_flat_query_strings_parse(
        pairs in prop::collection::vec((key_strategy(), "[ -~]{0,20}"), 0..6)
    ) {
        let encoded = serde_urlencoded::to_string(&pairs).unwrap();
        let bag = ParameterBag::from_query_string(&encoded).unwrap();

        for (key, _) in &pairs {
            let last = pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
            prop_assert_eq!(bag.get(key).and_then(Value::as_str), last);
        }
    }

    #[test]
    fn prop_arbitrary_query_strings_never_panic(query in "[ -~]{0,60}") {
        let _ = ParameterBag::from_query_string(&query);
    }

    #[test]
    fn prop_nested_nulls_survive_getters(key in key_strategy(), inner in key_strategy()) {
        let mut nested = Params::new();
        nested.insert(inner.clone(), Value::Null);

        let body: ParameterBag = [(key.clone(), Value::Array(nested))].into_iter().collect();
        let mut request = SanitizedRequest::new(ParameterBag::new(), body, FixedScope::Frontend);

        for cleaned in [
            request.get_post(&key),
            request.get_post_html(&key),
            request.get_post_raw(&key),
        ] {
            let cleaned = cleaned.as_array().cloned().unwrap_or_default();
            prop_assert_eq!(cleaned.get(&inner), Some(&Value::Null));
        }
    }
}
