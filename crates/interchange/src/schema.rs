//! Normalized JSON-Schema documents.
//!
//! Only the parts of a schema that drive template synthesis are typed:
//! the self-describing header, the top-level `properties` (in declared
//! order) and the `required` list. The original JSON is kept alongside so
//! the resolved data product can be written back out unchanged.

use std::collections::BTreeSet;

use crate::deserialize::InterchangeError;
use crate::locator::SchemaLocator;

/// The `self` block of a self-describing schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSelf {
    pub vendor: String,
    pub name: String,
    pub format: String,
    pub version: String,
}

impl From<&SchemaLocator> for SchemaSelf {
    fn from(loc: &SchemaLocator) -> Self {
        SchemaSelf {
            vendor: loc.vendor.clone(),
            name: loc.name.clone(),
            format: loc.format.clone(),
            version: loc.version.clone(),
        }
    }
}

/// A JSON-Schema primitive type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
    Other(String),
}

impl JsonType {
    fn parse(s: &str) -> Self {
        match s {
            "string" => JsonType::String,
            "number" => JsonType::Number,
            "integer" => JsonType::Integer,
            "boolean" => JsonType::Boolean,
            "object" => JsonType::Object,
            "array" => JsonType::Array,
            "null" => JsonType::Null,
            other => JsonType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Null => "null",
            JsonType::Other(s) => s,
        }
    }

    /// Whether a free-text control can faithfully hold a value of this type.
    fn is_scalar(&self) -> bool {
        matches!(
            self,
            JsonType::String | JsonType::Number | JsonType::Integer | JsonType::Boolean
        )
    }
}

/// A single property definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Declared `type`, normalized to a list (`"string"` and `["string"]`
    /// both become one entry). Empty when the property declares no type.
    pub types: Vec<JsonType>,
    /// `enum` literals in declared order.
    pub enum_values: Option<Vec<serde_json::Value>>,
    pub description: Option<String>,
}

impl PropertyDef {
    pub fn from_json(v: &serde_json::Value) -> Self {
        let types = match v.get("type") {
            Some(serde_json::Value::String(s)) => vec![JsonType::parse(s)],
            Some(serde_json::Value::Array(arr)) => arr
                .iter()
                .filter_map(|t| t.as_str().map(JsonType::parse))
                .collect(),
            _ => Vec::new(),
        };

        let enum_values = v.get("enum").and_then(|e| e.as_array()).cloned();

        let description = v
            .get("description")
            .and_then(|d| d.as_str())
            .map(|s| s.to_string());

        PropertyDef {
            types,
            enum_values,
            description,
        }
    }

    /// Human label for the declared type, e.g. `string` or `string, null`.
    pub fn type_label(&self) -> String {
        if self.types.is_empty() {
            return "any".to_string();
        }
        self.types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Enum literals rendered as control values. Strings are used verbatim,
    /// other literals use their JSON text.
    pub fn enum_literals(&self) -> Option<Vec<String>> {
        self.enum_values.as_ref().map(|values| {
            values
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
    }

    /// True when the property maps onto a control without loss: an enum,
    /// or a scalar type optionally unioned with `null`.
    pub fn is_supported(&self) -> bool {
        if self.enum_values.is_some() {
            return true;
        }
        let non_null: Vec<&JsonType> = self
            .types
            .iter()
            .filter(|t| **t != JsonType::Null)
            .collect();
        !non_null.is_empty() && non_null.iter().all(|t| t.is_scalar())
    }
}

/// Properties keyed by name, in declared order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap(Vec<(String, PropertyDef)>);

impl PropertyMap {
    /// Parse a JSON `properties` object. Relies on `serde_json`'s
    /// `preserve_order` feature to keep declaration order.
    pub fn from_json(v: &serde_json::Value) -> Self {
        let entries = v
            .as_object()
            .map(|obj| {
                obj.iter()
                    .map(|(k, pv)| (k.clone(), PropertyDef::from_json(pv)))
                    .collect()
            })
            .unwrap_or_default();
        PropertyMap(entries)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDef> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDef)> {
        self.0.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, PropertyDef)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (String, PropertyDef)>>(iter: I) -> Self {
        PropertyMap(iter.into_iter().collect())
    }
}

/// A resolved, normalized schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    pub self_desc: SchemaSelf,
    pub properties: PropertyMap,
    pub required: BTreeSet<String>,
    /// The document as received from the resolver.
    pub raw: serde_json::Value,
}

impl SchemaDocument {
    /// Normalize a schema JSON document.
    ///
    /// `locator` supplies the self-description when the document has no
    /// `self` block of its own (some catalog responses omit it).
    pub fn from_json(
        v: &serde_json::Value,
        locator: &SchemaLocator,
    ) -> Result<Self, InterchangeError> {
        if !v.is_object() {
            return Err(InterchangeError::InvalidSchema {
                locator: locator.to_string(),
                message: "schema document is not a JSON object".to_string(),
            });
        }

        let self_desc = match v.get("self") {
            Some(s) => parse_self(s).ok_or_else(|| InterchangeError::InvalidSchema {
                locator: locator.to_string(),
                message: "'self' must contain vendor, name, format and version".to_string(),
            })?,
            None => SchemaSelf::from(locator),
        };

        let properties = v
            .get("properties")
            .map(PropertyMap::from_json)
            .unwrap_or_default();

        let required = v
            .get("required")
            .and_then(|r| r.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(SchemaDocument {
            self_desc,
            properties,
            required,
            raw: v.clone(),
        })
    }

    /// The schema-declared name (`self.name`).
    pub fn name(&self) -> &str {
        &self.self_desc.name
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.contains(property)
    }
}

fn parse_self(v: &serde_json::Value) -> Option<SchemaSelf> {
    Some(SchemaSelf {
        vendor: v.get("vendor")?.as_str()?.to_string(),
        name: v.get("name")?.as_str()?.to_string(),
        format: v.get("format")?.as_str()?.to_string(),
        version: v.get("version")?.as_str()?.to_string(),
    })
}
