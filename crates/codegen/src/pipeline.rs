//! End-to-end template generation.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tagsynth_interchange::DataProduct;
use tagsynth_resolver::{SchemaCache, SchemaResolver};

use crate::association::AssociationIndex;
use crate::bundle::assemble_bundle;
use crate::dispatch::{synthesize_dispatch, DispatchOptions};
use crate::error::CodegenError;
use crate::params::{synthesize_parameters, ParameterSet};
use crate::permissions::{build_permissions, default_template, PermissionDeclaration};

pub const TEMPLATE_FILE: &str = "gtm_template.tpl";
pub const DATA_PRODUCT_FILE: &str = "data_product.json";
pub const PARAMETERS_FILE: &str = "gtm_template_parameters.json";
pub const CODE_FILE: &str = "gtm_template_code.js";
pub const PERMISSIONS_FILE: &str = "gtm_template_permissions.json";

#[derive(Debug, Clone, Default)]
pub struct GenerateConfig {
    /// Seed every context list with an `event_specification` entity.
    pub event_specification_context: bool,
    /// Replaces the embedded permissions template.
    pub permissions_template: Option<Value>,
}

/// Every artifact of one run, rendered in memory.
#[derive(Debug, Clone)]
pub struct GeneratedTemplate {
    pub product: DataProduct,
    pub parameters: ParameterSet,
    pub dispatch_source: String,
    pub permission_declarations: Vec<PermissionDeclaration>,
    pub permissions: Value,
    pub bundle: String,
}

impl GeneratedTemplate {
    pub fn parameters_json(&self) -> Result<String, CodegenError> {
        self.parameters.to_json()
    }

    pub fn permissions_json(&self) -> Result<String, CodegenError> {
        Ok(serde_json::to_string_pretty(&self.permissions)?)
    }

    /// Write the bundle, plus the intermediate artifacts when asked, into
    /// `dir`. Returns the written paths.
    ///
    /// Everything is rendered and staged in a temporary directory inside
    /// `dir` first; files are moved into place only once all of them exist.
    pub fn write_to(&self, dir: &Path, intermediates: bool) -> Result<Vec<PathBuf>, CodegenError> {
        let mut files: Vec<(&str, String)> = vec![(TEMPLATE_FILE, self.bundle.clone())];
        if intermediates {
            files.push((
                DATA_PRODUCT_FILE,
                serde_json::to_string_pretty(&self.product.to_resolved_json())?,
            ));
            files.push((PARAMETERS_FILE, self.parameters_json()?));
            files.push((CODE_FILE, self.dispatch_source.clone()));
            files.push((PERMISSIONS_FILE, self.permissions_json()?));
        }

        fs::create_dir_all(dir).map_err(|e| io_error("create", dir, e))?;
        let staging = tempfile::Builder::new()
            .prefix(".tagsynth-")
            .tempdir_in(dir)
            .map_err(|e| io_error("stage output in", dir, e))?;

        for (name, content) in &files {
            let path = staging.path().join(name);
            fs::write(&path, content).map_err(|e| io_error("write", &path, e))?;
        }

        let mut written = Vec::with_capacity(files.len());
        for (name, _) in &files {
            let target = dir.join(name);
            fs::rename(staging.path().join(name), &target)
                .map_err(|e| io_error("move into place", &target, e))?;
            written.push(target);
        }

        tracing::info!(dir = %dir.display(), files = written.len(), "template written");
        Ok(written)
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> CodegenError {
    CodegenError::Io(format!("failed to {} '{}': {}", action, path.display(), e))
}

/// Attach every referenced schema to `product` and index tracked entities.
pub fn resolve_product<R: SchemaResolver>(
    product: &mut DataProduct,
    resolver: R,
) -> Result<AssociationIndex, CodegenError> {
    let mut cache = SchemaCache::new(resolver);
    AssociationIndex::build(&mut product.event_specs, &mut cache)
}

/// Resolve `product` and synthesize the complete template.
///
/// Nothing is written; call [`GeneratedTemplate::write_to`] on success.
pub fn generate_template<R: SchemaResolver>(
    mut product: DataProduct,
    resolver: R,
    config: &GenerateConfig,
) -> Result<GeneratedTemplate, CodegenError> {
    let index = resolve_product(&mut product, resolver)?;
    let parameters = synthesize_parameters(&product.event_specs, &index)?;

    let options = DispatchOptions {
        event_specification: if config.event_specification_context {
            product.primary().cloned()
        } else {
            None
        },
    };
    let dispatch = synthesize_dispatch(&product.event_specs, &parameters.event_entities, &options)?;
    let dispatch_source = dispatch.source();

    let template = match &config.permissions_template {
        Some(template) => template.clone(),
        None => default_template()?,
    };
    let permissions = build_permissions(&template, &dispatch.permissions)?;

    let bundle = assemble_bundle(
        &product.display_name(),
        &parameters.to_json()?,
        &dispatch_source,
        &serde_json::to_string_pretty(&permissions)?,
    )?;

    tracing::info!(
        product = %product.display_name(),
        event_specs = product.event_specs.len(),
        entities = index.len(),
        permissions = dispatch.permissions.len(),
        "template generated"
    );

    Ok(GeneratedTemplate {
        product,
        parameters,
        dispatch_source,
        permission_declarations: dispatch.permissions,
        permissions,
        bundle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tagsynth_interchange::from_data_product;
    use tagsynth_resolver::StaticResolver;

    fn resolver() -> StaticResolver {
        StaticResolver::new().with(
            "iglu:com.acme/signup/jsonschema/1-0-0".parse().unwrap(),
            json!({"properties": {"plan": {"type": "string"}}}),
        )
    }

    fn product(source: &str) -> DataProduct {
        from_data_product(&json!({
            "data": [{"id": "dp-1", "name": "Growth"}],
            "includes": {"eventSpecs": [
                {"id": "es-1", "name": "Signup", "event": {"source": source}}
            ]}
        }))
        .unwrap()
    }

    #[test]
    fn bundle_contains_every_section() {
        let generated = generate_template(
            product("iglu:com.acme/signup/jsonschema/1-0-0"),
            resolver(),
            &GenerateConfig::default(),
        )
        .unwrap();
        assert!(generated.product.is_resolved());
        assert!(generated.bundle.contains("Snowplow GTM Tag Template for Growth"));
        assert!(generated.bundle.contains("\"name\": \"Signup|plan\""));
        assert!(generated.bundle.contains(&generated.dispatch_source));
        assert!(generated.bundle.contains("__snowtype.trackSignupSignup"));
    }

    #[test]
    fn unresolved_schema_aborts() {
        let err = generate_template(
            product("iglu:com.acme/ghost/jsonschema/1-0-0"),
            resolver(),
            &GenerateConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CodegenError::UnresolvedSchema { .. }));
    }

    #[test]
    fn custom_permissions_template_is_used() {
        let config = GenerateConfig {
            permissions_template: Some(json!([
                {"instance": {"key": {"publicId": "access_globals"},
                              "param": [{"key": "keys", "value": {"type": 2}}]}}
            ])),
            ..GenerateConfig::default()
        };
        let generated = generate_template(
            product("iglu:com.acme/signup/jsonschema/1-0-0"),
            resolver(),
            &config,
        )
        .unwrap();
        let list = generated.permissions[0]["instance"]["param"][0]["value"]["listItem"]
            .as_array()
            .unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn write_to_leaves_no_staging_directory() {
        let generated = generate_template(
            product("iglu:com.acme/signup/jsonschema/1-0-0"),
            resolver(),
            &GenerateConfig::default(),
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let written = generated.write_to(dir.path(), true).unwrap();
        assert_eq!(written.len(), 5);

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                DATA_PRODUCT_FILE,
                TEMPLATE_FILE,
                CODE_FILE,
                PARAMETERS_FILE,
                PERMISSIONS_FILE
            ]
        );
    }
}
