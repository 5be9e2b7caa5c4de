use std::path::PathBuf;

use tagsynth_codegen::{generate_template, GenerateConfig};

use crate::commands::{build_resolver, connect_catalog, load_product};
use crate::config::AppConfig;
use crate::{OutputFormat, ResolutionArgs};

pub(crate) struct GenerateArgs {
    pub source: String,
    pub resolution: ResolutionArgs,
    pub out: PathBuf,
    pub intermediates: bool,
    pub permissions_template: Option<PathBuf>,
    pub event_specification_context: bool,
}

pub(crate) fn cmd_generate(
    args: &GenerateArgs,
    config: &AppConfig,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), String> {
    let permissions_template = match &args.permissions_template {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("error reading '{}': {}", path.display(), e))?;
            let value: serde_json::Value = serde_json::from_str(&content)
                .map_err(|e| format!("error parsing JSON in '{}': {}", path.display(), e))?;
            Some(value)
        }
        None => None,
    };

    let catalog = connect_catalog(config, args.resolution.offline)?;
    let product = load_product(&args.source, catalog.as_ref(), args.resolution.offline)?;
    let resolver = build_resolver(config, &args.resolution, catalog)?;

    let generate_config = GenerateConfig {
        event_specification_context: args.event_specification_context
            || config.event_specification_context,
        permissions_template,
    };

    let generated = generate_template(product, resolver, &generate_config)
        .map_err(|e| format!("template generation failed: {}", e))?;
    let written = generated
        .write_to(&args.out, args.intermediates)
        .map_err(|e| format!("template generation failed: {}", e))?;

    if !quiet {
        match output {
            OutputFormat::Text => {
                println!(
                    "Generated template for {} ({} event specs) in {}",
                    generated.product.display_name(),
                    generated.product.event_specs.len(),
                    args.out.display()
                );
            }
            OutputFormat::Json => {
                let files: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "data_product": generated.product.display_name(),
                        "event_specs": generated.product.event_specs.len(),
                        "files": files,
                    })
                );
            }
        }
    }
    Ok(())
}
