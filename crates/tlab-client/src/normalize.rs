//! # Response Shape Normalization
//!
//! The backend is not uniform about collection responses: some endpoints
//! return a bare JSON array, paginated ones return a Spring page object
//! with the items under `content`. Field names also drifted between DTO
//! versions. All of that is absorbed here and in the `#[serde(alias)]`
//! attributes on the resource DTOs, never at call sites.
//!
//! ## Accepted collection shapes
//!
//! | Shape                     | Result          |
//! |---------------------------|-----------------|
//! | `[...]`                   | the array       |
//! | `{ "content": [...] }`    | `content`       |
//! | `null` / empty body       | empty list      |
//! | anything else             | empty list      |
//!
//! ## Accepted field aliases
//!
//! | DTO          | Canonical        | Aliases                   |
//! |--------------|------------------|---------------------------|
//! | Workshop     | `title`          | `workshopName`            |
//! | Enrollment   | `workshopTitle`  | `workshopName`            |
//! | Activity     | `titleEn`        | `titleDe`, `name` (via [`first_non_blank`]) |
//! | Group        | `titleEn`        | `titleDe`, `name` (via [`first_non_blank`]) |
//! | Performance  | `performanceDate`| `date`                    |
//! | Performance  | `venue`          | `venueName`               |

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::fetch::Payload;

/// Extract the item list from a collection response.
pub fn list_from(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("content") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Decode a collection response into typed items.
pub fn decode_list<T: DeserializeOwned>(payload: Payload, endpoint: &str) -> Result<Vec<T>, ApiError> {
    list_from(payload.into_json())
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|source| ApiError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
        })
        .collect()
}

/// First candidate that is present and not blank.
pub fn first_non_blank<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[test]
    fn bare_array_and_page_are_equivalent() {
        let bare = list_from(json!([{"id": 1}, {"id": 2}]));
        let page = list_from(json!({"content": [{"id": 1}, {"id": 2}], "totalElements": 2}));
        assert_eq!(bare, page);
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn unexpected_shapes_are_empty() {
        assert!(list_from(Value::Null).is_empty());
        assert!(list_from(json!({"items": [1]})).is_empty());
        assert!(list_from(json!("nope")).is_empty());
    }

    #[test]
    fn decode_list_from_empty_payload() {
        let items: Vec<Item> = decode_list(Payload::Empty, "GET /x").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn decode_list_reports_bad_items() {
        let payload = Payload::Json(json!([{"id": "one"}]));
        let err = decode_list::<Item>(payload, "GET /x").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn first_non_blank_skips_blanks() {
        assert_eq!(first_non_blank(&[None, Some("  "), Some("Yoga")]), Some("Yoga"));
        assert_eq!(first_non_blank(&[None, Some("")]), None);
    }
}
