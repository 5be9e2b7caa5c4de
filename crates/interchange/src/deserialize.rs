//! Deserialization from data product JSON into typed structs.
//!
//! The main entry point is [`from_data_product`], which takes a
//! `&serde_json::Value` and produces an unresolved [`DataProduct`].

use crate::locator::SchemaLocator;
use crate::schema::PropertyMap;
use crate::types::*;

/// Errors during data product and schema deserialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterchangeError {
    /// A structural field the pipeline depends on is missing or mistyped.
    #[error("malformed data product: {0}")]
    MalformedDataProduct(String),

    /// A schema locator does not have the `iglu:vendor/name/format/version` shape.
    #[error("invalid schema locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    /// A resolved schema document cannot be normalized.
    #[error("invalid schema '{locator}': {message}")]
    InvalidSchema { locator: String, message: String },
}

/// Deserialize a data product document.
///
/// Walks `includes.eventSpecs` in order. Event specs without an
/// `entities.tracked` list simply track no entities.
pub fn from_data_product(doc: &serde_json::Value) -> Result<DataProduct, InterchangeError> {
    let products = doc
        .get("data")
        .and_then(|d| d.as_array())
        .map(|arr| {
            arr.iter()
                .map(|p| ProductInfo {
                    id: optional_str(p, "id"),
                    name: optional_str(p, "name"),
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let specs_arr = doc
        .get("includes")
        .and_then(|i| i.get("eventSpecs"))
        .and_then(|e| e.as_array())
        .ok_or_else(|| {
            InterchangeError::MalformedDataProduct(
                "missing 'includes.eventSpecs' array".to_string(),
            )
        })?;

    let mut event_specs = Vec::with_capacity(specs_arr.len());
    for (index, obj) in specs_arr.iter().enumerate() {
        event_specs.push(parse_event_spec(obj, index)?);
    }

    Ok(DataProduct {
        products,
        event_specs,
        raw: doc.clone(),
    })
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn optional_str(obj: &serde_json::Value, field: &str) -> String {
    obj.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn parse_locator(text: &str) -> Result<SchemaLocator, InterchangeError> {
    text.parse()
}

fn parse_event_spec(obj: &serde_json::Value, index: usize) -> Result<EventSpec, InterchangeError> {
    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            InterchangeError::MalformedDataProduct(format!(
                "event spec #{} missing 'name' field",
                index
            ))
        })?
        .to_string();

    let malformed = |message: &str| {
        InterchangeError::MalformedDataProduct(format!("event spec '{}': {}", name, message))
    };

    let id = optional_str(obj, "id");

    let event = obj.get("event").ok_or_else(|| malformed("missing 'event' field"))?;
    let source = event
        .get("source")
        .and_then(|s| s.as_str())
        .ok_or_else(|| malformed("missing 'event.source' field"))?;
    let source = parse_locator(source)?;

    let overrides = event
        .get("schema")
        .and_then(|s| s.get("properties"))
        .map(PropertyMap::from_json);

    let tracked = match obj.get("entities").and_then(|e| e.get("tracked")) {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(arr)) => arr
            .iter()
            .map(|entity| {
                let source = entity
                    .get("source")
                    .and_then(|s| s.as_str())
                    .ok_or_else(|| malformed("tracked entity missing 'source' field"))?;
                Ok(TrackedEntityRef {
                    source: parse_locator(source)?,
                    schema: None,
                })
            })
            .collect::<Result<Vec<_>, InterchangeError>>()?,
        Some(_) => return Err(malformed("'entities.tracked' must be an array")),
    };

    Ok(EventSpec {
        id,
        name,
        event: EventRef {
            source,
            overrides,
            schema: None,
        },
        tracked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDocument;
    use serde_json::json;
    use std::sync::Arc;

    fn make_product(event_specs: Vec<serde_json::Value>) -> serde_json::Value {
        json!({
            "data": [{"id": "dp-1", "name": "Growth"}],
            "includes": {"eventSpecs": event_specs}
        })
    }

    #[test]
    fn test_empty_product() {
        let product = from_data_product(&make_product(vec![])).unwrap();
        assert_eq!(product.products.len(), 1);
        assert_eq!(product.display_name(), "Growth");
        assert!(product.event_specs.is_empty());
    }

    #[test]
    fn test_missing_event_specs() {
        let err = from_data_product(&json!({"data": []})).unwrap_err();
        match err {
            InterchangeError::MalformedDataProduct(msg) => {
                assert!(msg.contains("includes.eventSpecs"))
            }
            other => panic!("expected MalformedDataProduct, got {:?}", other),
        }
    }

    #[test]
    fn test_event_spec_fields() {
        let product = from_data_product(&make_product(vec![json!({
            "id": "es-1",
            "name": "Signup",
            "event": {"source": "iglu:com.acme/signup/jsonschema/1-0-0"},
            "entities": {"tracked": [
                {"source": "iglu:com.acme/user/jsonschema/1-0-0"},
                {"source": "iglu:com.acme/plan/jsonschema/2-0-0"}
            ]}
        })]))
        .unwrap();

        let spec = &product.event_specs[0];
        assert_eq!(spec.id, "es-1");
        assert_eq!(spec.name, "Signup");
        assert_eq!(spec.event.source.name, "signup");
        assert!(spec.event.overrides.is_none());
        assert_eq!(spec.tracked.len(), 2);
        assert_eq!(spec.tracked[1].source.version, "2-0-0");
        assert!(!product.is_resolved());
    }

    #[test]
    fn test_missing_entities_means_none_tracked() {
        let product = from_data_product(&make_product(vec![
            json!({"name": "A", "event": {"source": "iglu:com.acme/a/jsonschema/1-0-0"}}),
            json!({"name": "B", "event": {"source": "iglu:com.acme/b/jsonschema/1-0-0"}, "entities": {}}),
        ]))
        .unwrap();
        assert!(product.event_specs.iter().all(|s| s.tracked.is_empty()));
    }

    #[test]
    fn test_tracked_must_be_array() {
        let err = from_data_product(&make_product(vec![json!({
            "name": "A",
            "event": {"source": "iglu:com.acme/a/jsonschema/1-0-0"},
            "entities": {"tracked": "nope"}
        })]))
        .unwrap_err();
        assert!(matches!(err, InterchangeError::MalformedDataProduct(_)));
    }

    #[test]
    fn test_missing_event_source() {
        let err = from_data_product(&make_product(vec![json!({"name": "A", "event": {}})]))
            .unwrap_err();
        assert!(err.to_string().contains("event.source"));
    }

    #[test]
    fn test_invalid_locator_is_reported() {
        let err = from_data_product(&make_product(vec![json!({
            "name": "A",
            "event": {"source": "not-a-locator"}
        })]))
        .unwrap_err();
        assert!(matches!(err, InterchangeError::InvalidLocator { .. }));
    }

    #[test]
    fn test_inline_overrides_are_kept() {
        let product = from_data_product(&make_product(vec![json!({
            "name": "Signup",
            "event": {
                "source": "iglu:com.acme/signup/jsonschema/1-0-0",
                "schema": {"properties": {"plan": {"type": "string", "enum": ["pro"]}}}
            }
        })]))
        .unwrap();
        let overrides = product.event_specs[0].event.overrides.as_ref().unwrap();
        assert_eq!(
            overrides.get("plan").unwrap().enum_literals().unwrap(),
            vec!["pro"]
        );
    }

    #[test]
    fn test_resolved_json_contains_schemas() {
        let mut product = from_data_product(&make_product(vec![json!({
            "name": "Signup",
            "event": {"source": "iglu:com.acme/signup/jsonschema/1-0-0"},
            "entities": {"tracked": [{"source": "iglu:com.acme/user/jsonschema/1-0-0"}]}
        })]))
        .unwrap();

        let event_loc = product.event_specs[0].event.source.clone();
        let user_loc = product.event_specs[0].tracked[0].source.clone();
        let event_schema = SchemaDocument::from_json(
            &json!({"properties": {"plan": {"type": "string"}}}),
            &event_loc,
        )
        .unwrap();
        let user_schema = SchemaDocument::from_json(
            &json!({"properties": {"id": {"type": "string"}}}),
            &user_loc,
        )
        .unwrap();
        product.event_specs[0].event.schema = Some(Arc::new(event_schema));
        product.event_specs[0].tracked[0].schema = Some(Arc::new(user_schema));
        assert!(product.is_resolved());

        let out = product.to_resolved_json();
        let spec = &out["includes"]["eventSpecs"][0];
        assert_eq!(spec["event"]["schema"]["properties"]["plan"]["type"], "string");
        assert_eq!(
            spec["entities"]["tracked"][0]["schema"]["properties"]["id"]["type"],
            "string"
        );
    }
}
