//! Web permission declarations.
//!
//! The dispatch code may only touch globals the template declares. Each
//! declaration grants read, write and execute on one global key and is
//! appended to the `access_globals` entry of a static permissions template.

use serde_json::{json, Value};

use crate::dispatch::DispatchBranch;
use crate::error::CodegenError;

/// Permissions template used when no override is supplied.
pub const DEFAULT_PERMISSIONS_TEMPLATE: &str = include_str!("../templates/permissions_template.json");

/// Global every template is allowed to reach, declared after the
/// per-event capabilities.
pub const BASELINE_GLOBAL: &str = "snowplow";

const ACCESS_GLOBALS: &str = "access_globals";
const KEYS_PARAM: &str = "keys";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionDeclaration {
    pub key: String,
}

impl PermissionDeclaration {
    pub fn new(key: impl Into<String>) -> Self {
        PermissionDeclaration { key: key.into() }
    }

    /// GTM map value granting read, write and execute on `key`.
    pub fn to_json(&self) -> Value {
        let key_entry = |name: &str| json!({"type": 1, "string": name});
        let granted = json!({"type": 8, "boolean": true});
        json!({
            "type": 3,
            "mapKey": [
                key_entry("key"),
                key_entry("read"),
                key_entry("write"),
                key_entry("execute")
            ],
            "mapValue": [
                {"type": 1, "string": self.key},
                granted,
                granted,
                granted
            ]
        })
    }
}

/// One declaration per distinct capability, in branch order, followed by
/// the baseline global.
pub fn permission_declarations(branches: &[DispatchBranch]) -> Vec<PermissionDeclaration> {
    let mut out: Vec<PermissionDeclaration> = Vec::with_capacity(branches.len() + 1);
    let keys = branches
        .iter()
        .map(|b| b.capability.as_str())
        .chain(std::iter::once(BASELINE_GLOBAL));
    for key in keys {
        if !out.iter().any(|d| d.key == key) {
            out.push(PermissionDeclaration::new(key));
        }
    }
    out
}

/// Parse the embedded default template.
pub fn default_template() -> Result<Value, CodegenError> {
    serde_json::from_str(DEFAULT_PERMISSIONS_TEMPLATE)
        .map_err(|e| CodegenError::InvalidPermissionsTemplate(e.to_string()))
}

/// Append `declarations` to the `access_globals` keys list of `template`.
///
/// The template must be a JSON array of permission instances with an
/// `access_globals` entry whose `keys` param holds a list value.
pub fn build_permissions(
    template: &Value,
    declarations: &[PermissionDeclaration],
) -> Result<Value, CodegenError> {
    let mut permissions = template.clone();
    let entries = permissions.as_array_mut().ok_or_else(|| {
        CodegenError::InvalidPermissionsTemplate("template must be a JSON array".to_string())
    })?;

    let access = entries
        .iter_mut()
        .find(|entry| entry["instance"]["key"]["publicId"] == ACCESS_GLOBALS)
        .ok_or_else(|| {
            CodegenError::InvalidPermissionsTemplate(format!(
                "no '{}' permission in template",
                ACCESS_GLOBALS
            ))
        })?;

    let keys = access
        .get_mut("instance")
        .and_then(|i| i.get_mut("param"))
        .and_then(|p| p.as_array_mut())
        .and_then(|params| params.iter_mut().find(|p| p["key"] == KEYS_PARAM))
        .ok_or_else(|| {
            CodegenError::InvalidPermissionsTemplate(format!(
                "'{}' permission has no '{}' param",
                ACCESS_GLOBALS, KEYS_PARAM
            ))
        })?;

    let list = keys
        .get_mut("value")
        .and_then(|v| v.as_object_mut())
        .map(|v| v.entry("listItem").or_insert_with(|| Value::Array(Vec::new())))
        .and_then(|l| l.as_array_mut())
        .ok_or_else(|| {
            CodegenError::InvalidPermissionsTemplate(format!(
                "'{}' value is not a list",
                KEYS_PARAM
            ))
        })?;

    list.extend(declarations.iter().map(PermissionDeclaration::to_json));
    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::InitialContext;

    fn branch(capability: &str) -> DispatchBranch {
        DispatchBranch {
            event_name: "e".to_string(),
            capability: capability.to_string(),
            payload: Vec::new(),
            initial_context: InitialContext::Empty,
            entity_objects: Vec::new(),
            context_steps: Vec::new(),
        }
    }

    fn keys(permissions: &Value) -> Vec<String> {
        permissions[1]["instance"]["param"][0]["value"]["listItem"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["mapValue"][0]["string"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn declarations_are_deduplicated_and_end_with_baseline() {
        let decls = permission_declarations(&[
            branch("__snowtype.trackA"),
            branch("__snowtype.trackB"),
            branch("__snowtype.trackA"),
        ]);
        let names: Vec<&str> = decls.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(names, vec!["__snowtype.trackA", "__snowtype.trackB", "snowplow"]);
    }

    #[test]
    fn baseline_only_when_no_branches() {
        let decls = permission_declarations(&[]);
        assert_eq!(decls, vec![PermissionDeclaration::new("snowplow")]);
    }

    #[test]
    fn declaration_grants_all_access() {
        let value = PermissionDeclaration::new("__snowtype.trackA").to_json();
        assert_eq!(value["type"], 3);
        assert_eq!(value["mapKey"][0]["string"], "key");
        assert_eq!(value["mapKey"][3]["string"], "execute");
        assert_eq!(value["mapValue"][0]["string"], "__snowtype.trackA");
        for i in 1..4 {
            assert_eq!(value["mapValue"][i]["boolean"], true);
        }
    }

    #[test]
    fn default_template_receives_declarations() {
        let template = default_template().unwrap();
        let decls = vec![
            PermissionDeclaration::new("__snowtype.trackA"),
            PermissionDeclaration::new("snowplow"),
        ];
        let permissions = build_permissions(&template, &decls).unwrap();
        assert_eq!(keys(&permissions), vec!["__snowtype.trackA", "snowplow"]);
        assert_eq!(permissions[0]["instance"]["key"]["publicId"], "logging");
        // the template itself is untouched
        assert_eq!(keys(&template), Vec::<String>::new());
    }

    #[test]
    fn template_without_access_globals_is_rejected() {
        let template = json!([{"instance": {"key": {"publicId": "logging"}, "param": []}}]);
        let err = build_permissions(&template, &[]).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidPermissionsTemplate(_)));
    }

    #[test]
    fn non_array_template_is_rejected() {
        let err = build_permissions(&json!({}), &[]).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }
}
