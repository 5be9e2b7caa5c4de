//! Resolver configuration.
//!
//! Built once at process start (the CLI assembles it from the config file,
//! `.env` and the environment) and passed by reference into backend
//! construction. Nothing in this crate reads global state.

use std::time::Duration;

/// Default catalog API endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://console.snowplowanalytics.com/api/msc/v1";

/// Default public schema registry.
pub const DEFAULT_REGISTRY_URL: &str = "http://iglucentral.com";

/// Organization identity and API key pair for the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCredentials {
    pub organization_id: String,
    pub api_key_id: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// `None` disables the catalog backend entirely.
    pub credentials: Option<CatalogCredentials>,
    pub catalog_url: String,
    /// `None` disables the public registry fallback.
    pub registry_url: Option<String>,
    /// Global timeout applied to every HTTP request.
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            credentials: None,
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            registry_url: Some(DEFAULT_REGISTRY_URL.to_string()),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ResolverConfig {
    /// Catalog base URL without a trailing slash.
    pub fn catalog_base(&self) -> &str {
        self.catalog_url.trim_end_matches('/')
    }

    pub(crate) fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build()
            .into()
    }
}
