//! Configuration for `tagsynth`.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. `tagsynth.toml` (or the file passed with `--config`)
//! 2. a `.env` file in the working directory, loaded into the environment
//! 3. the process environment (`ORGANIZATION_ID`, `API_KEY_ID`, `API_KEY`)
//!
//! # Example
//!
//! ```toml
//! [catalog]
//! organization_id = "3f1c..."
//! api_key_id = "key-id"
//! api_key = "secret"
//!
//! [registry]
//! base_url = "http://iglucentral.com"
//!
//! [http]
//! timeout_secs = 30
//!
//! [output]
//! event_specification_context = false
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tagsynth_resolver::{CatalogCredentials, ResolverConfig, DEFAULT_CATALOG_URL, DEFAULT_REGISTRY_URL};

/// Config file read when `--config` is not given, if present.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "tagsynth.toml";

pub(crate) const ENV_ORGANIZATION_ID: &str = "ORGANIZATION_ID";
pub(crate) const ENV_API_KEY_ID: &str = "API_KEY_ID";
pub(crate) const ENV_API_KEY: &str = "API_KEY";

// ── File format ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub catalog: CatalogSection,
    pub registry: RegistrySection,
    pub http: HttpSection,
    pub output: OutputSection,
}

/// `[catalog]`: organization identity and API key pair.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CatalogSection {
    pub organization_id: Option<String>,
    pub api_key_id: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// `[registry]`: public schema registry used when the catalog misses.
/// An empty `base_url` disables it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RegistrySection {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HttpSection {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct OutputSection {
    pub event_specification_context: bool,
}

// ── Resolved settings ────────────────────────────────────────────────────────

/// Settings for one invocation. Built once in `main`, never mutated.
#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub resolver: ResolverConfig,
    pub event_specification_context: bool,
}

impl AppConfig {
    pub fn has_credentials(&self) -> bool {
        self.resolver.credentials.is_some()
    }
}

/// Read and parse a config file.
pub(crate) fn read_config_file(path: &Path) -> Result<FileConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// Load configuration for this process.
///
/// An explicit `path` must exist. Without one, `tagsynth.toml` in the
/// working directory is used when present.
pub(crate) fn load(path: Option<&Path>) -> Result<AppConfig, String> {
    let file = match path {
        Some(path) => read_config_file(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                read_config_file(default)?
            } else {
                FileConfig::default()
            }
        }
    };
    Ok(resolve(file, |key| std::env::var(key).ok()))
}

/// Merge a parsed file with environment overrides.
pub(crate) fn resolve(mut file: FileConfig, env: impl Fn(&str) -> Option<String>) -> AppConfig {
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    if let Some(v) = non_empty(ENV_ORGANIZATION_ID) {
        file.catalog.organization_id = Some(v);
    }
    if let Some(v) = non_empty(ENV_API_KEY_ID) {
        file.catalog.api_key_id = Some(v);
    }
    if let Some(v) = non_empty(ENV_API_KEY) {
        file.catalog.api_key = Some(v);
    }

    let credentials = match (
        file.catalog.organization_id,
        file.catalog.api_key_id,
        file.catalog.api_key,
    ) {
        (Some(organization_id), Some(api_key_id), Some(api_key)) => Some(CatalogCredentials {
            organization_id,
            api_key_id,
            api_key,
        }),
        (None, None, None) => None,
        _ => {
            tracing::warn!("catalog credentials are incomplete; catalog access disabled");
            None
        }
    };

    let registry_url = match file.registry.base_url {
        Some(url) if url.trim().is_empty() => None,
        Some(url) => Some(url),
        None => Some(DEFAULT_REGISTRY_URL.to_string()),
    };

    let defaults = ResolverConfig::default();
    AppConfig {
        resolver: ResolverConfig {
            credentials,
            catalog_url: file
                .catalog
                .base_url
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            registry_url,
            timeout: file
                .http
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        },
        event_specification_context: file.output.event_specification_context,
    }
}
