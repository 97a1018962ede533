//! JSONPath extraction from response bodies
//!
//! Records and pagination cursors are located with JSONPath expressions such
//! as `$.shipments[*]` and `$.nextPageUrl`. Paths are validated once when a
//! stream is defined, so a typo fails at startup instead of mid-sync.

use crate::error::{Error, Result};
use crate::types::Record;
use jsonpath_rust::JsonPath;
use serde_json::Value;

/// Evaluate a path and return every match
///
/// A path that matches nothing yields an empty list.
pub fn find_all(value: &Value, path: &str) -> Result<Vec<Value>> {
    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(matches) => Ok(matches),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

/// First non-null match of a path
pub fn first_match(value: &Value, path: &str) -> Result<Option<Value>> {
    Ok(find_all(value, path)?
        .into_iter()
        .find(|v| !v.is_null()))
}

/// Check that a path parses
pub fn validate_path(path: &str) -> Result<()> {
    find_all(&Value::Null, path).map(|_| ())
}

/// Truthiness of a JSON value as used by continuation flags
///
/// `false`, `null`, `0`, `""` and empty containers are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Pulls record objects out of a page body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordExtractor {
    path: String,
}

impl RecordExtractor {
    /// Create an extractor, rejecting paths that do not parse
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self { path })
    }

    /// The records path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Extract records in page order
    ///
    /// Every match must be a JSON object; anything else means the response
    /// is not shaped the way the stream expects.
    pub fn extract(&self, body: &Value, url: &str) -> Result<Vec<Record>> {
        find_all(body, &self.path)?
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Object(record) => Ok(record),
                other => Err(Error::malformed(
                    url,
                    format!(
                        "record {index} at '{}' is {}, expected an object",
                        self.path,
                        kind(&other)
                    ),
                )),
            })
            .collect()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_extract_records_in_order() {
        let body = json!({
            "shipments": [{"shipmentId": "a"}, {"shipmentId": "b"}, {"shipmentId": "c"}],
            "hasMore": false
        });
        let extractor = RecordExtractor::new("$.shipments[*]").unwrap();
        let records = extractor.extract(&body, "/v3/shipments/filter").unwrap();

        let ids: Vec<_> = records.iter().map(|r| r["shipmentId"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_missing_records_key_yields_nothing() {
        let extractor = RecordExtractor::new("$.returnItems[*]").unwrap();
        let records = extractor.extract(&json!({"nextUrl": null}), "/v2/returns").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_non_object_record_is_malformed() {
        let extractor = RecordExtractor::new("$.shipments[*]").unwrap();
        let err = extractor
            .extract(&json!({"shipments": [{"shipmentId": "a"}, 7]}), "/x")
            .unwrap_err();

        assert!(matches!(err, Error::MalformedResponse { .. }));
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_invalid_path_rejected() {
        assert!(RecordExtractor::new("$.shipments[").is_err());
        assert!(validate_path("$.nextPageUrl").is_ok());
    }

    #[test]
    fn test_first_match() {
        let body = json!({"nextPageUrl": "/v3/shipments/page-2", "empty": null});
        assert_eq!(
            first_match(&body, "$.nextPageUrl").unwrap(),
            Some(json!("/v3/shipments/page-2"))
        );
        assert_eq!(first_match(&body, "$.empty").unwrap(), None);
        assert_eq!(first_match(&body, "$.missing").unwrap(), None);
    }

    #[test_case(json!(true), true ; "true")]
    #[test_case(json!(false), false ; "false")]
    #[test_case(Value::Null, false ; "null")]
    #[test_case(json!(0), false ; "zero")]
    #[test_case(json!(1), true ; "one")]
    #[test_case(json!(""), false ; "empty string")]
    #[test_case(json!("yes"), true ; "string")]
    #[test_case(json!([]), false ; "empty array")]
    #[test_case(json!({"a": 1}), true ; "object")]
    fn test_is_truthy(value: Value, expected: bool) {
        assert_eq!(is_truthy(&value), expected);
    }
}
