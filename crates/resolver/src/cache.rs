use std::collections::HashMap;
use std::sync::Arc;

use tagsynth_interchange::{SchemaDocument, SchemaLocator};

use crate::error::ResolveError;
use crate::traits::SchemaResolver;

/// Memoizing front for a [`SchemaResolver`].
///
/// The first request for a locator delegates to the backend; every later
/// request returns the same `Arc`, so all references to one locator share a
/// single document. Failures are not cached.
pub struct SchemaCache<R> {
    resolver: R,
    entries: HashMap<SchemaLocator, Arc<SchemaDocument>>,
    misses: usize,
}

impl<R: SchemaResolver> SchemaCache<R> {
    pub fn new(resolver: R) -> Self {
        SchemaCache {
            resolver,
            entries: HashMap::new(),
            misses: 0,
        }
    }

    /// Return the cached document for `locator`, resolving it on first use.
    pub fn get_or_resolve(
        &mut self,
        locator: &SchemaLocator,
    ) -> Result<Arc<SchemaDocument>, ResolveError> {
        if let Some(doc) = self.entries.get(locator) {
            tracing::trace!(%locator, "schema cache hit");
            return Ok(Arc::clone(doc));
        }

        self.misses += 1;
        tracing::debug!(%locator, backend = self.resolver.name(), "resolving schema");
        let doc = Arc::new(self.resolver.resolve(locator)?);
        self.entries.insert(locator.clone(), Arc::clone(&doc));
        Ok(doc)
    }

    pub fn contains(&self, locator: &SchemaLocator) -> bool {
        self.entries.contains_key(locator)
    }

    /// Number of distinct locators resolved so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of backend calls made (successful or not).
    pub fn backend_calls(&self) -> usize {
        self.misses
    }

    pub fn into_inner(self) -> R {
        self.resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticResolver;
    use serde_json::json;

    fn loc(s: &str) -> SchemaLocator {
        s.parse().unwrap()
    }

    #[test]
    fn second_lookup_shares_the_document() {
        let mut resolver = StaticResolver::new();
        resolver.insert(
            loc("iglu:com.acme/user/jsonschema/1-0-0"),
            json!({"properties": {"id": {"type": "string"}}}),
        );
        let mut cache = SchemaCache::new(resolver);

        let a = cache
            .get_or_resolve(&loc("iglu:com.acme/user/jsonschema/1-0-0"))
            .unwrap();
        let b = cache
            .get_or_resolve(&loc("iglu:com.acme/user/jsonschema/1-0-0"))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.backend_calls(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = SchemaCache::new(StaticResolver::new());
        let missing = loc("iglu:com.acme/missing/jsonschema/1-0-0");
        assert!(cache.get_or_resolve(&missing).unwrap_err().is_not_found());
        assert!(cache.get_or_resolve(&missing).is_err());
        assert!(!cache.contains(&missing));
        assert_eq!(cache.backend_calls(), 2);
    }
}
