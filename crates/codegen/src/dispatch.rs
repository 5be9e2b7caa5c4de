//! Dispatch code synthesis.
//!
//! Every event spec is first lowered to a [`DispatchBranch`], a small
//! intermediate form holding only names: which parameter feeds which
//! payload field, which entity objects to build, and which global to
//! call. [`render_dispatch`] then formats the whole program as sandboxed
//! JavaScript. Permission declarations are derived from the same branches,
//! so the called global and the declared global cannot drift apart.

use std::fmt::Write as _;

use tagsynth_interchange::{EventSpec, ProductInfo, SchemaDocument, TrackedEntityRef};

use crate::error::CodegenError;
use crate::naming::{
    capability_name, entity_variable, js_string, parameter_name, CONTEXT_GENERATOR,
    EVENT_SPEC_PARAM, NO_GENERATOR,
};
use crate::params::EventEntityNames;
use crate::permissions::{permission_declarations, PermissionDeclaration};

/// Locator of the entity describing which event specification fired.
pub const EVENT_SPECIFICATION_SCHEMA: &str =
    "iglu:com.snowplowanalytics.snowplow/event_specification/jsonschema/1-0-2";

#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// When set, every branch seeds its context list with an
    /// `event_specification` entity naming this product.
    pub event_specification: Option<ProductInfo>,
}

/// `'<field>': data['<parameter>']`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub field: String,
    pub parameter: String,
}

/// A per-entity object filled from manual fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityObject {
    pub variable: String,
    pub fields: Vec<FieldBinding>,
}

/// One entity's contribution to the context list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStep {
    pub generator_parameter: String,
    pub schema: String,
    pub variable: String,
}

/// The context list a branch starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialContext {
    Empty,
    EventSpecification {
        id: String,
        name: String,
        data_product_id: String,
        data_product_name: String,
    },
}

/// One `case` of the dispatch switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchBranch {
    pub event_name: String,
    pub capability: String,
    pub payload: Vec<FieldBinding>,
    pub initial_context: InitialContext,
    pub entity_objects: Vec<EntityObject>,
    pub context_steps: Vec<ContextStep>,
}

#[derive(Debug, Clone)]
pub struct DispatchProgram {
    pub event_entities: EventEntityNames,
    pub branches: Vec<DispatchBranch>,
}

#[derive(Debug, Clone)]
pub struct DispatchOutput {
    pub program: DispatchProgram,
    pub permissions: Vec<PermissionDeclaration>,
}

impl DispatchOutput {
    pub fn source(&self) -> String {
        render_dispatch(&self.program)
    }
}

/// Lower every event spec to a dispatch branch and derive the permission
/// declarations for the globals those branches call.
pub fn synthesize_dispatch(
    event_specs: &[EventSpec],
    event_entities: &EventEntityNames,
    options: &DispatchOptions,
) -> Result<DispatchOutput, CodegenError> {
    let branches = event_specs
        .iter()
        .map(|spec| lower_branch(spec, event_entities, options))
        .collect::<Result<Vec<_>, _>>()?;

    let permissions = permission_declarations(&branches);

    Ok(DispatchOutput {
        program: DispatchProgram {
            event_entities: event_entities.clone(),
            branches,
        },
        permissions,
    })
}

fn lower_branch(
    spec: &EventSpec,
    event_entities: &EventEntityNames,
    options: &DispatchOptions,
) -> Result<DispatchBranch, CodegenError> {
    let schema = spec
        .schema()
        .ok_or_else(|| CodegenError::UnresolvedSchema {
            locator: spec.event.source.to_string(),
        })?;

    let payload = schema
        .properties
        .names()
        .map(|property| FieldBinding {
            field: property.to_string(),
            parameter: parameter_name(&spec.name, property),
        })
        .collect();

    let mut entity_objects: Vec<EntityObject> = Vec::new();
    for entity in &spec.tracked {
        let entity_schema = entity_schema(entity)?;
        let variable = entity_variable(entity_schema.name());
        if entity_objects.iter().any(|o| o.variable == variable) {
            continue;
        }
        entity_objects.push(EntityObject {
            variable,
            fields: entity_schema
                .properties
                .names()
                .map(|property| FieldBinding {
                    field: property.to_string(),
                    parameter: parameter_name(entity_schema.name(), property),
                })
                .collect(),
        });
    }

    let mut context_steps = Vec::new();
    for entity_name in event_entities.get(&spec.name) {
        let Some(entity) = spec
            .tracked
            .iter()
            .find(|e| e.source.display_name() == entity_name.as_str())
        else {
            tracing::warn!(
                event = %spec.name,
                entity = %entity_name,
                "entity associated with event spec but not tracked by it"
            );
            continue;
        };
        let entity_schema = entity_schema(entity)?;
        context_steps.push(ContextStep {
            generator_parameter: parameter_name(entity_schema.name(), CONTEXT_GENERATOR),
            schema: entity.source.to_string(),
            variable: entity_variable(entity_schema.name()),
        });
    }

    let initial_context = match &options.event_specification {
        Some(product) => InitialContext::EventSpecification {
            id: spec.id.clone(),
            name: spec.name.clone(),
            data_product_id: product.id.clone(),
            data_product_name: product.name.clone(),
        },
        None => InitialContext::Empty,
    };

    Ok(DispatchBranch {
        event_name: spec.name.clone(),
        capability: capability_name(&spec.event.source, &spec.name),
        payload,
        initial_context,
        entity_objects,
        context_steps,
    })
}

fn entity_schema(entity: &TrackedEntityRef) -> Result<&SchemaDocument, CodegenError> {
    entity.schema().ok_or_else(|| CodegenError::UnresolvedSchema {
        locator: entity.source.to_string(),
    })
}

// ── Rendering ───────────────────────────────────────────────────────

/// Render `{'a': data['E|a'], ...}`.
pub fn render_object(fields: &[FieldBinding]) -> String {
    let entries: Vec<String> = fields
        .iter()
        .map(|f| format!("{}: data[{}]", js_string(&f.field), js_string(&f.parameter)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn render_initial_context(initial: &InitialContext) -> String {
    match initial {
        InitialContext::Empty => "[]".to_string(),
        InitialContext::EventSpecification {
            id,
            name,
            data_product_id,
            data_product_name,
        } => format!(
            "[{{schema: {}, data: {{id: {}, name: {}, data_product_id: {}, data_product_name: {}}}}}]",
            js_string(EVENT_SPECIFICATION_SCHEMA),
            js_string(id),
            js_string(name),
            js_string(data_product_id),
            js_string(data_product_name)
        ),
    }
}

fn render_branch(out: &mut String, branch: &DispatchBranch) {
    let _ = writeln!(out, "  case {}: {{", js_string(&branch.event_name));
    let _ = writeln!(
        out,
        "    var context = {};",
        render_initial_context(&branch.initial_context)
    );

    for object in &branch.entity_objects {
        let _ = writeln!(out, "    var {} = {{}};", object.variable);
        for field in &object.fields {
            let param = js_string(&field.parameter);
            let _ = writeln!(
                out,
                "    if (data[{param}] !== undefined) {{ {var}[{field}] = data[{param}]; }}",
                var = object.variable,
                field = js_string(&field.field),
            );
        }
    }

    for step in &branch.context_steps {
        let generator = js_string(&step.generator_parameter);
        let _ = writeln!(
            out,
            "    if (data[{generator}] !== {no}) {{ context = context.concat(data[{generator}]); }} \
             else {{ context = context.concat([{{schema: {schema}, data: {var}}}]); }}",
            no = js_string(NO_GENERATOR),
            schema = js_string(&step.schema),
            var = step.variable,
        );
    }

    let _ = writeln!(
        out,
        "    callInWindow({}, {}, context);",
        js_string(&branch.capability),
        render_object(&branch.payload)
    );
    let _ = writeln!(out, "    break;");
    let _ = writeln!(out, "  }}");
}

/// Render the complete sandboxed JavaScript for a dispatch program.
pub fn render_dispatch(program: &DispatchProgram) -> String {
    let mut out = String::new();
    out.push_str("const log = require('logToConsole');\n");
    out.push_str("const callInWindow = require('callInWindow');\n");
    out.push_str("log('data =', data);\n\n");
    let _ = writeln!(
        out,
        "var event_entity_map = {};\n",
        program.event_entities.to_json()
    );
    let _ = writeln!(out, "switch (data.{}) {{", EVENT_SPEC_PARAM);
    for branch in &program.branches {
        render_branch(&mut out, branch);
    }
    out.push_str("}\n\n");
    out.push_str("data.gtmOnSuccess();\n");
    out
}
