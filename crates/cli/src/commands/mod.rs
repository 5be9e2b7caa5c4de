//! Subcommand implementations.
//!
//! Each command returns `Err(message)` on failure; `main` reports it in
//! the selected output format and exits with status 1.

pub(crate) mod fetch;
pub(crate) mod generate;
pub(crate) mod resolve;

use std::path::Path;

use tagsynth_interchange::{from_data_product, DataProduct};
use tagsynth_resolver::{CatalogClient, DirectoryResolver, FallbackResolver, RegistryResolver};

use crate::config::AppConfig;
use crate::ResolutionArgs;

/// Authenticate against the catalog when credentials exist and the
/// network is allowed.
pub(crate) fn connect_catalog(
    config: &AppConfig,
    offline: bool,
) -> Result<Option<CatalogClient>, String> {
    if offline || !config.has_credentials() {
        return Ok(None);
    }
    CatalogClient::authenticate(&config.resolver)
        .map(Some)
        .map_err(|e| format!("catalog authentication failed: {}", e))
}

/// Read a data product from a file, or download it when `source` names no
/// file.
pub(crate) fn load_product(
    source: &str,
    catalog: Option<&CatalogClient>,
    offline: bool,
) -> Result<DataProduct, String> {
    let path = Path::new(source);
    let doc: serde_json::Value = if path.is_file() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("error reading '{}': {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("error parsing JSON in '{}': {}", path.display(), e))?
    } else if offline {
        return Err(format!(
            "'{}' is not a file and --offline forbids catalog access",
            source
        ));
    } else {
        let client = catalog.ok_or_else(|| {
            format!(
                "'{}' is not a file; set ORGANIZATION_ID, API_KEY_ID and API_KEY to fetch it from the catalog",
                source
            )
        })?;
        client
            .fetch_data_product(source)
            .map_err(|e| format!("error fetching data product '{}': {}", source, e))?
    };

    from_data_product(&doc).map_err(|e| format!("invalid data product '{}': {}", source, e))
}

/// Assemble the schema backends in lookup order: local directory, catalog,
/// public registry.
pub(crate) fn build_resolver(
    config: &AppConfig,
    resolution: &ResolutionArgs,
    catalog: Option<CatalogClient>,
) -> Result<FallbackResolver, String> {
    let mut chain = FallbackResolver::new();

    if let Some(dir) = &resolution.schemas {
        if !dir.is_dir() {
            return Err(format!("schema directory '{}' does not exist", dir.display()));
        }
        chain.push(Box::new(DirectoryResolver::new(dir.clone())));
    }

    if !resolution.offline {
        if let Some(client) = catalog {
            chain.push(Box::new(client));
        }
        if let Some(registry) = RegistryResolver::from_config(&config.resolver) {
            chain.push(Box::new(registry));
        }
    }

    if chain.is_empty() {
        return Err("no schema source available: pass --schemas or allow network access".to_string());
    }
    tracing::debug!(backends = chain.len(), "schema resolver chain assembled");
    Ok(chain)
}

/// Write `content` to `out`, or print it to stdout.
pub(crate) fn emit(content: &str, out: Option<&Path>) -> Result<(), String> {
    match out {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| format!("error writing '{}': {}", path.display(), e)),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
