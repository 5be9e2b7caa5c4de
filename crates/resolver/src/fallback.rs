use tagsynth_interchange::{SchemaDocument, SchemaLocator};

use crate::error::ResolveError;
use crate::traits::SchemaResolver;

/// Tries each backend in order until one holds the schema.
///
/// Only `NotFound` moves on to the next backend. Any other error aborts
/// the lookup so that an outage of the primary backend is never masked by
/// a stale copy elsewhere.
pub struct FallbackResolver {
    backends: Vec<Box<dyn SchemaResolver>>,
}

impl FallbackResolver {
    pub fn new() -> Self {
        FallbackResolver {
            backends: Vec::new(),
        }
    }

    pub fn push(&mut self, backend: Box<dyn SchemaResolver>) {
        self.backends.push(backend);
    }

    pub fn with(mut self, backend: impl SchemaResolver + 'static) -> Self {
        self.push(Box::new(backend));
        self
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for FallbackResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaResolver for FallbackResolver {
    fn name(&self) -> &str {
        "fallback"
    }

    fn resolve(&self, locator: &SchemaLocator) -> Result<SchemaDocument, ResolveError> {
        for backend in &self.backends {
            match backend.resolve(locator) {
                Ok(doc) => {
                    tracing::debug!(%locator, backend = backend.name(), "schema resolved");
                    return Ok(doc);
                }
                Err(e) if e.is_not_found() => {
                    tracing::info!(
                        %locator,
                        backend = backend.name(),
                        "schema not found, trying next backend"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(ResolveError::NotFound {
            locator: locator.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticResolver;
    use serde_json::json;

    struct Broken;

    impl SchemaResolver for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn resolve(&self, locator: &SchemaLocator) -> Result<SchemaDocument, ResolveError> {
            Err(ResolveError::Http {
                url: locator.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    fn loc(s: &str) -> SchemaLocator {
        s.parse().unwrap()
    }

    #[test]
    fn falls_through_on_not_found() {
        let user = loc("iglu:com.acme/user/jsonschema/1-0-0");
        let resolver = FallbackResolver::new()
            .with(StaticResolver::new())
            .with(StaticResolver::new().with(user.clone(), json!({"properties": {}})));
        assert_eq!(resolver.resolve(&user).unwrap().name(), "user");
    }

    #[test]
    fn first_backend_wins() {
        let user = loc("iglu:com.acme/user/jsonschema/1-0-0");
        let resolver = FallbackResolver::new()
            .with(StaticResolver::new().with(
                user.clone(),
                json!({"properties": {"a": {"type": "string"}}}),
            ))
            .with(StaticResolver::new().with(
                user.clone(),
                json!({"properties": {"b": {"type": "string"}}}),
            ));
        let doc = resolver.resolve(&user).unwrap();
        assert!(doc.properties.get("a").is_some());
    }

    #[test]
    fn other_errors_stop_the_chain() {
        let user = loc("iglu:com.acme/user/jsonschema/1-0-0");
        let resolver = FallbackResolver::new()
            .with(Broken)
            .with(StaticResolver::new().with(user.clone(), json!({"properties": {}})));
        assert!(matches!(
            resolver.resolve(&user),
            Err(ResolveError::Http { .. })
        ));
    }

    #[test]
    fn empty_chain_is_not_found() {
        let resolver = FallbackResolver::new();
        assert!(resolver
            .resolve(&loc("iglu:com.acme/user/jsonschema/1-0-0"))
            .unwrap_err()
            .is_not_found());
    }
}
