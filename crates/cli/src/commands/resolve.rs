use std::path::Path;

use tagsynth_codegen::resolve_product;

use crate::commands::{build_resolver, connect_catalog, emit, load_product};
use crate::config::AppConfig;
use crate::{OutputFormat, ResolutionArgs};

pub(crate) fn cmd_resolve(
    source: &str,
    resolution: &ResolutionArgs,
    out: Option<&Path>,
    config: &AppConfig,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), String> {
    let catalog = connect_catalog(config, resolution.offline)?;
    let mut product = load_product(source, catalog.as_ref(), resolution.offline)?;
    let resolver = build_resolver(config, resolution, catalog)?;

    let index = resolve_product(&mut product, resolver)
        .map_err(|e| format!("schema resolution failed: {}", e))?;
    let resolved = serde_json::to_string_pretty(&product.to_resolved_json())
        .map_err(|e| format!("error serializing data product: {}", e))?;

    emit(&resolved, out)?;
    if let (Some(path), false) = (out, quiet) {
        match output {
            OutputFormat::Text => println!(
                "Resolved {} event specs and {} entities into {}",
                product.event_specs.len(),
                index.len(),
                path.display()
            ),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({
                    "path": path.display().to_string(),
                    "event_specs": product.event_specs.len(),
                    "entities": index.len(),
                })
            ),
        }
    }
    Ok(())
}
