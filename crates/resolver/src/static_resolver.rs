//! In-memory schema backend.
//!
//! Holds raw schema JSON keyed by locator. Useful for tests and for
//! callers that already have every schema at hand.

use std::collections::BTreeMap;

use tagsynth_interchange::{SchemaDocument, SchemaLocator};

use crate::error::ResolveError;
use crate::traits::SchemaResolver;

#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    schemas: BTreeMap<SchemaLocator, serde_json::Value>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locator: SchemaLocator, schema: serde_json::Value) {
        self.schemas.insert(locator, schema);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, locator: SchemaLocator, schema: serde_json::Value) -> Self {
        self.insert(locator, schema);
        self
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaResolver for StaticResolver {
    fn name(&self) -> &str {
        "static"
    }

    fn resolve(&self, locator: &SchemaLocator) -> Result<SchemaDocument, ResolveError> {
        let raw = self
            .schemas
            .get(locator)
            .ok_or_else(|| ResolveError::NotFound {
                locator: locator.to_string(),
            })?;
        Ok(SchemaDocument::from_json(raw, locator)?)
    }
}
