//! Typed structs representing a catalog data product.
//!
//! A data product is read once from the catalog JSON. The only mutation
//! after parsing is attaching the resolved [`SchemaDocument`]s to event
//! specs and tracked entities; schemas are shared by `Arc` so that two
//! references to the same locator point at the same document.

use std::sync::Arc;

use crate::locator::SchemaLocator;
use crate::schema::{PropertyMap, SchemaDocument};

/// Identity of the data product (one entry of the top-level `data` array).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    pub id: String,
    pub name: String,
}

/// A whole data product document.
#[derive(Debug, Clone)]
pub struct DataProduct {
    pub products: Vec<ProductInfo>,
    /// Event specifications in source order.
    pub event_specs: Vec<EventSpec>,
    /// The document as received, used to write the resolved copy back out.
    pub raw: serde_json::Value,
}

impl DataProduct {
    /// Comma-joined product names, as shown in the template manifest.
    pub fn display_name(&self) -> String {
        self.products
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The primary product (first entry of `data`), if any.
    pub fn primary(&self) -> Option<&ProductInfo> {
        self.products.first()
    }

    /// True once every event schema and entity schema has been attached.
    pub fn is_resolved(&self) -> bool {
        self.event_specs.iter().all(|spec| {
            spec.event.schema.is_some() && spec.tracked.iter().all(|e| e.schema.is_some())
        })
    }

    /// The raw document with every resolved schema written into it
    /// (`event.schema` and `entities.tracked[].schema`).
    pub fn to_resolved_json(&self) -> serde_json::Value {
        let mut out = self.raw.clone();
        let Some(specs) = out
            .get_mut("includes")
            .and_then(|i| i.get_mut("eventSpecs"))
            .and_then(|e| e.as_array_mut())
        else {
            return out;
        };

        for (raw_spec, spec) in specs.iter_mut().zip(&self.event_specs) {
            if let (Some(event), Some(schema)) =
                (raw_spec.get_mut("event"), spec.event.schema.as_ref())
            {
                if let Some(obj) = event.as_object_mut() {
                    obj.insert("schema".to_string(), schema.raw.clone());
                }
            }

            let tracked = raw_spec
                .get_mut("entities")
                .and_then(|e| e.get_mut("tracked"))
                .and_then(|t| t.as_array_mut());
            if let Some(tracked) = tracked {
                for (raw_entity, entity) in tracked.iter_mut().zip(&spec.tracked) {
                    if let (Some(obj), Some(schema)) =
                        (raw_entity.as_object_mut(), entity.schema.as_ref())
                    {
                        obj.insert("schema".to_string(), schema.raw.clone());
                    }
                }
            }
        }
        out
    }
}

/// An event specification.
#[derive(Debug, Clone)]
pub struct EventSpec {
    pub id: String,
    pub name: String,
    pub event: EventRef,
    /// Tracked entities in declared order. May repeat a locator.
    pub tracked: Vec<TrackedEntityRef>,
}

impl EventSpec {
    /// The resolved event schema, if attached.
    pub fn schema(&self) -> Option<&SchemaDocument> {
        self.event.schema.as_deref()
    }
}

/// The event an event specification tracks.
#[derive(Debug, Clone)]
pub struct EventRef {
    pub source: SchemaLocator,
    /// Inline `event.schema.properties` from the data product. Takes
    /// precedence over the resolved schema when rendering controls.
    pub overrides: Option<PropertyMap>,
    pub schema: Option<Arc<SchemaDocument>>,
}

/// A reference to a tracked entity.
#[derive(Debug, Clone)]
pub struct TrackedEntityRef {
    pub source: SchemaLocator,
    pub schema: Option<Arc<SchemaDocument>>,
}

impl TrackedEntityRef {
    pub fn schema(&self) -> Option<&SchemaDocument> {
        self.schema.as_deref()
    }
}
