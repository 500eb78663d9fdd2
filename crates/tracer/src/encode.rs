use serde::Serialize;

use crate::error::TraceError;

/// Encode an arbitrary producer value into a generic JSON tree.
///
/// Total over the usual scalar/map/list shapes; values serde cannot
/// represent as JSON (non-string map keys, serializer errors) fail with
/// `BadInput`. The tree is what gets persisted; downstream code never
/// sees the producer's own types.
pub fn encode_value<T: Serialize + ?Sized>(
    field: &str,
    value: &T,
) -> Result<serde_json::Value, TraceError> {
    serde_json::to_value(value)
        .map_err(|e| TraceError::BadInput(format!("{field} is not JSON-encodable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn scalars_maps_and_lists_encode() {
        assert_eq!(encode_value("x", "s").unwrap(), serde_json::json!("s"));
        assert_eq!(encode_value("x", &42i64).unwrap(), serde_json::json!(42));
        assert_eq!(encode_value("x", &1.5f64).unwrap(), serde_json::json!(1.5));
        assert_eq!(encode_value("x", &true).unwrap(), serde_json::json!(true));
        assert_eq!(
            encode_value("x", &vec![1, 2, 3]).unwrap(),
            serde_json::json!([1, 2, 3])
        );
        let map = BTreeMap::from([("a", 1), ("b", 2)]);
        assert_eq!(
            encode_value("x", &map).unwrap(),
            serde_json::json!({"a": 1, "b": 2})
        );
    }

    #[test]
    fn integer_and_float_stay_distinct() {
        let int = encode_value("x", &2i64).unwrap();
        let float = encode_value("x", &2.0f64).unwrap();
        assert!(int.as_i64().is_some());
        assert!(float.is_number() && float.as_f64() == Some(2.0));
        assert_ne!(int.to_string(), float.to_string());
    }

    #[test]
    fn non_string_map_keys_are_bad_input() {
        let map = BTreeMap::from([((1, 2), "v")]);
        let err = encode_value("metadata", &map).unwrap_err();
        match err {
            TraceError::BadInput(msg) => assert!(msg.starts_with("metadata")),
            other => panic!("expected BadInput, got {other:?}"),
        }
    }
}
