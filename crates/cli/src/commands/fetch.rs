use std::path::Path;

use tagsynth_resolver::CatalogClient;

use crate::config::AppConfig;
use crate::{commands::emit, OutputFormat};

pub(crate) fn cmd_fetch(
    id: &str,
    out: Option<&Path>,
    config: &AppConfig,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), String> {
    if !config.has_credentials() {
        return Err(
            "fetch needs catalog credentials: set ORGANIZATION_ID, API_KEY_ID and API_KEY"
                .to_string(),
        );
    }
    let client = CatalogClient::authenticate(&config.resolver)
        .map_err(|e| format!("catalog authentication failed: {}", e))?;
    let doc = client
        .fetch_data_product(id)
        .map_err(|e| format!("error fetching data product '{}': {}", id, e))?;
    let pretty = serde_json::to_string_pretty(&doc)
        .map_err(|e| format!("error serializing data product: {}", e))?;

    emit(&pretty, out)?;
    if let (Some(path), false) = (out, quiet) {
        match output {
            OutputFormat::Text => println!("Wrote data product {} to {}", id, path.display()),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({ "data_product": id, "path": path.display().to_string() })
            ),
        }
    }
    Ok(())
}
