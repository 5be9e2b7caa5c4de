//! Integration tests for the template generation pipeline.
//!
//! These tests run the complete flow from a data product fixture and a
//! directory of schemas to the written `.tpl` bundle and intermediates.

use std::fs;
use std::path::{Path, PathBuf};

use tagsynth_codegen::{generate_template, CodegenError, GenerateConfig, GeneratedTemplate};
use tagsynth_interchange::{from_data_product, DataProduct};
use tagsynth_resolver::DirectoryResolver;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> &'static Path {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/codegen -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
}

fn schemas_dir() -> PathBuf {
    workspace_root().join("fixtures/schemas")
}

fn read_product(name: &str) -> DataProduct {
    let path = workspace_root()
        .join("fixtures/data_products")
        .join(format!("{}.json", name));
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture '{}': {}", path.display(), e));
    let doc: serde_json::Value = serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("failed to parse fixture '{}': {}", path.display(), e));
    from_data_product(&doc).expect("fixture should deserialize")
}

fn generate(name: &str, config: &GenerateConfig) -> GeneratedTemplate {
    generate_template(
        read_product(name),
        DirectoryResolver::new(schemas_dir()),
        config,
    )
    .expect("generation failed")
}

fn permission_keys(permissions: &serde_json::Value) -> Vec<String> {
    let access = permissions
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["instance"]["key"]["publicId"] == "access_globals")
        .expect("access_globals permission");
    access["instance"]["param"][0]["value"]["listItem"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["mapValue"][0]["string"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_growth_parameter_tree() {
    let generated = generate("growth", &GenerateConfig::default());
    let params = &generated.parameters;

    let top: Vec<&str> = params.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        top,
        vec![
            "eventSpec",
            "Signup",
            "Login",
            "Plan upgrade",
            "user_entities",
            "cart_entities"
        ]
    );
    assert_eq!(
        params.parameters[0].option_values(),
        vec!["Signup", "Login", "Plan upgrade"]
    );

    let plan = params.find("Signup|plan").unwrap();
    assert_eq!(plan.option_values(), vec!["free", "pro"]);
    assert_eq!(plan.help.as_deref(), Some("Plan chosen at signup"));
    assert_eq!(
        params.find("Signup|email").unwrap().display_name,
        "email (string) * Required"
    );
    assert_eq!(
        params.find("Signup|referrals").unwrap().display_name,
        "referrals (integer, null)"
    );

    // inline override narrows the registry enum
    assert_eq!(
        params.find("Login|method").unwrap().option_values(),
        vec!["password", "sso"]
    );

    let user = params.find("user_entities").unwrap();
    let user_events: Vec<&str> = user
        .conditions()
        .iter()
        .map(|c| c.param_value.as_str())
        .collect();
    assert_eq!(user_events, vec!["Signup", "Login"]);
    assert_eq!(
        params.find("user|tier").unwrap().option_values(),
        vec!["gold", "silver", "3"]
    );

    let cart = params.find("cart_entities").unwrap();
    assert_eq!(cart.conditions().len(), 1);
}

#[test]
fn test_growth_dispatch_and_permissions_agree() {
    let generated = generate("growth", &GenerateConfig::default());

    let keys = permission_keys(&generated.permissions);
    assert_eq!(
        keys,
        vec![
            "__snowtype.trackSignupSignup",
            "__snowtype.trackLoginLogin",
            "__snowtype.trackSignupPlanUpgrade",
            "snowplow"
        ]
    );
    for key in keys.iter().filter(|k| k.starts_with("__snowtype.")) {
        assert!(
            generated
                .dispatch_source
                .contains(&format!("callInWindow('{}',", key)),
            "dispatch code should call {}",
            key
        );
    }

    let code = &generated.dispatch_source;
    assert!(code.contains(r#"var event_entity_map = {"Signup":["user"],"Login":["user","cart"]};"#));
    assert!(code.contains("case 'Plan upgrade': {"));
    assert!(code.contains(
        "context = context.concat([{schema: 'iglu:com.acme/cart/jsonschema/1-0-0', data: cart_context}]);"
    ));
    assert!(code.trim_end().ends_with("data.gtmOnSuccess();"));
}

#[test]
fn test_parameters_validate_against_schema() {
    let schema_path = workspace_root().join("schema/template-parameters-schema.json");
    let schema_src = fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    let validator = jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e));

    let generated = generate("growth", &GenerateConfig::default());
    let instance: serde_json::Value =
        serde_json::from_str(&generated.parameters_json().unwrap()).unwrap();
    if let Err(error) = validator.validate(&instance) {
        panic!("parameter tree does not match schema: {}", error);
    }
}

#[test]
fn test_generation_is_idempotent() {
    let first = generate("growth", &GenerateConfig::default());
    let second = generate("growth", &GenerateConfig::default());
    assert_eq!(
        first.parameters_json().unwrap(),
        second.parameters_json().unwrap()
    );
    assert_eq!(
        first.permissions_json().unwrap(),
        second.permissions_json().unwrap()
    );
    assert_eq!(first.bundle, second.bundle);
}

#[test]
fn test_event_specification_context() {
    let config = GenerateConfig {
        event_specification_context: true,
        ..GenerateConfig::default()
    };
    let generated = generate("growth", &config);
    assert!(generated.dispatch_source.contains(
        "data: {id: 'es-signup', name: 'Signup', data_product_id: '8f2b6a4e-1c3d-4e5f-9a7b-0c1d2e3f4a5b', data_product_name: 'Growth'}"
    ));
    assert!(!generated.dispatch_source.contains("var context = [];"));
}

#[test]
fn test_write_bundle_and_intermediates() {
    let generated = generate("growth", &GenerateConfig::default());
    let dir = tempfile::tempdir().expect("temp dir");

    let written = generated.write_to(dir.path(), true).expect("write failed");
    assert_eq!(written.len(), 5);

    let bundle = fs::read_to_string(dir.path().join("gtm_template.tpl")).unwrap();
    assert!(bundle.starts_with("___INFO___"));
    assert!(bundle.contains("\"displayName\": \"Snowplow GTM Tag Template for Growth\""));
    assert!(bundle.contains("___WEB_PERMISSIONS___"));

    let resolved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("data_product.json")).unwrap())
            .unwrap();
    assert_eq!(
        resolved["includes"]["eventSpecs"][1]["entities"]["tracked"][1]["schema"]["properties"]
            ["total"]["type"],
        "number"
    );

    let code = fs::read_to_string(dir.path().join("gtm_template_code.js")).unwrap();
    assert_eq!(code, generated.dispatch_source);
}

#[test]
fn test_bundle_only_without_intermediates() {
    let generated = generate("growth", &GenerateConfig::default());
    let dir = tempfile::tempdir().expect("temp dir");
    generated.write_to(dir.path(), false).expect("write failed");

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert!(dir.path().join("gtm_template.tpl").exists());
}

#[test]
fn test_unresolved_schema_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("out");
    let result = generate_template(
        read_product("unresolvable"),
        DirectoryResolver::new(schemas_dir()),
        &GenerateConfig::default(),
    )
    .and_then(|generated| generated.write_to(&out, true));
    match result {
        Err(CodegenError::UnresolvedSchema { locator }) => {
            assert_eq!(locator, "iglu:com.acme/ghost/jsonschema/1-0-0")
        }
        Err(other) => panic!("expected UnresolvedSchema, got {}", other),
        Ok(written) => panic!("generation should fail, wrote {:?}", written),
    }
    assert!(!out.exists(), "no output directory should be created");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
