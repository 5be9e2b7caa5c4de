//! Template bundle assembly.
//!
//! A `.tpl` file is a sequence of sections, each introduced by a marker
//! line. The section bodies are produced elsewhere; this module only adds
//! the manifest and stitches the sections together in the order the host
//! expects.

use serde::Serialize;

pub const INFO_MARKER: &str = "___INFO___";
pub const PARAMETERS_MARKER: &str = "___TEMPLATE_PARAMETERS___";
pub const CODE_MARKER: &str = "___SANDBOXED_JS_FOR_WEB_TEMPLATE___";
pub const PERMISSIONS_MARKER: &str = "___WEB_PERMISSIONS___";

#[derive(Debug, Clone, Serialize)]
struct Brand {
    id: &'static str,
    #[serde(rename = "displayName")]
    display_name: &'static str,
}

/// Manifest written under [`INFO_MARKER`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'static str,
    version: u32,
    security_groups: Vec<String>,
    display_name: String,
    brand: Brand,
    description: String,
    container_contexts: Vec<&'static str>,
}

impl TemplateInfo {
    /// Manifest for a template built from the named data products.
    pub fn for_products(product_names: &str) -> Self {
        TemplateInfo {
            kind: "TAG",
            id: "cvt_temp_public_id",
            version: 1,
            security_groups: Vec::new(),
            display_name: format!("Snowplow GTM Tag Template for {}", product_names),
            brand: Brand {
                id: "brand_dummy",
                display_name: "",
            },
            description: format!(
                "A custom template for a Snowplow Data Product based on {}",
                product_names
            ),
            container_contexts: vec!["WEB"],
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Concatenate the manifest, parameter JSON, dispatch source and
/// permission JSON under their markers.
pub fn assemble_bundle(
    product_names: &str,
    parameters_json: &str,
    dispatch_source: &str,
    permissions_json: &str,
) -> Result<String, serde_json::Error> {
    let info = serde_json::to_string_pretty(&TemplateInfo::for_products(product_names))?;

    let mut out = String::new();
    for (marker, body) in [
        (INFO_MARKER, info.as_str()),
        (PARAMETERS_MARKER, parameters_json),
        (CODE_MARKER, dispatch_source),
        (PERMISSIONS_MARKER, permissions_json),
    ] {
        out.push_str(marker);
        out.push_str("\n\n");
        out.push_str(body.trim_end());
        out.push_str("\n\n\n");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_appear_once_in_order() {
        let bundle = assemble_bundle("Growth", "[]", "data.gtmOnSuccess();\n", "[]").unwrap();
        let positions: Vec<usize> = [INFO_MARKER, PARAMETERS_MARKER, CODE_MARKER, PERMISSIONS_MARKER]
            .iter()
            .map(|m| {
                assert_eq!(bundle.matches(m).count(), 1, "marker {} repeated", m);
                bundle.find(m).unwrap()
            })
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn info_section_names_the_products() {
        let bundle = assemble_bundle("Growth,Retention", "[]", "", "[]").unwrap();
        let info_start = INFO_MARKER.len();
        let info_end = bundle.find(PARAMETERS_MARKER).unwrap();
        let info: serde_json::Value = serde_json::from_str(bundle[info_start..info_end].trim()).unwrap();

        assert_eq!(info["type"], "TAG");
        assert_eq!(info["version"], 1);
        assert_eq!(info["displayName"], "Snowplow GTM Tag Template for Growth,Retention");
        assert_eq!(
            info["description"],
            "A custom template for a Snowplow Data Product based on Growth,Retention"
        );
        assert_eq!(info["brand"]["id"], "brand_dummy");
        assert_eq!(info["containerContexts"], serde_json::json!(["WEB"]));
        assert_eq!(info["securityGroups"], serde_json::json!([]));
    }

    #[test]
    fn sections_are_embedded_verbatim() {
        let code = "const log = require('logToConsole');\nlog('x');";
        let bundle = assemble_bundle("Growth", "[{\"a\": 1}]", code, "[]").unwrap();
        assert!(bundle.contains(&format!("{}\n\n{}\n", CODE_MARKER, code)));
        assert!(bundle.contains(&format!("{}\n\n[{{\"a\": 1}}]\n", PARAMETERS_MARKER)));
    }
}
