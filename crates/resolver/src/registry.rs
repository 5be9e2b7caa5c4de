//! Public schema registry backend (Iglu Central by default).
//!
//! Schemas are served unauthenticated at
//! `GET {base}/schemas/{vendor}/{name}/{format}/{version}`.

use tagsynth_interchange::{SchemaDocument, SchemaLocator};

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::http::{get_json, Fetched};
use crate::traits::SchemaResolver;

pub struct RegistryResolver {
    base_url: String,
    agent: ureq::Agent,
}

impl RegistryResolver {
    /// Returns `None` when the registry fallback is disabled in `config`.
    pub fn from_config(config: &ResolverConfig) -> Option<Self> {
        let base_url = config.registry_url.as_deref()?;
        Some(RegistryResolver {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: config.agent(),
        })
    }

    pub fn schema_url(&self, locator: &SchemaLocator) -> String {
        format!("{}/schemas/{}", self.base_url, locator.path())
    }
}

impl SchemaResolver for RegistryResolver {
    fn name(&self) -> &str {
        "registry"
    }

    fn resolve(&self, locator: &SchemaLocator) -> Result<SchemaDocument, ResolveError> {
        let url = self.schema_url(locator);
        tracing::debug!(%locator, %url, "fetching schema from public registry");
        match get_json(&self.agent, &url, &[])? {
            Fetched::Found(raw) => Ok(SchemaDocument::from_json(&raw, locator)?),
            Fetched::Missing => Err(ResolveError::NotFound {
                locator: locator.to_string(),
            }),
        }
    }
}
