//! Parameter tree synthesis.
//!
//! Produces the template's UI definition: a top-level `eventSpec` select,
//! one group per event spec and one group per distinct entity. Groups are
//! shown by enabling conditions on the `eventSpec` value; an entity group
//! carries one condition per event spec that tracks it, and the host ORs
//! them together.

use std::collections::HashSet;

use serde::Serialize;
use tagsynth_interchange::{EventSpec, PropertyDef, SchemaDocument};

use crate::association::{AssociationIndex, EntityAssociation};
use crate::error::CodegenError;
use crate::naming::{
    entity_group_name, parameter_name, CONTEXT_GENERATOR, EVENT_SPEC_PARAM, NO_GENERATOR,
};

const GROUP_STYLE: &str = "ZIPPY_OPEN";

const GENERATOR_LABEL: &str =
    "Use below to create multiple entities using a Custom JavaScript variable.";

const GENERATOR_HELP: &str = "Set this to a Google Tag Manager variable that returns the \
function you want to execute when assigning a custom context to this event specification.";

const FIELDS_LABEL: &str = "Use the fields below to create a single entity. * Required fields";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterKind {
    Select,
    Text,
    Label,
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectItem {
    pub value: String,
    pub display_value: String,
}

impl SelectItem {
    fn literal(value: &str) -> Self {
        SelectItem {
            value: value.to_string(),
            display_value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionKind {
    Equals,
}

/// Makes a group visible while `param_name` holds exactly `param_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnablingCondition {
    pub param_name: String,
    pub param_value: String,
    #[serde(rename = "type")]
    pub kind: ConditionKind,
}

impl EnablingCondition {
    pub fn event_spec(name: &str) -> Self {
        EnablingCondition {
            param_name: EVENT_SPEC_PARAM.to_string(),
            param_value: name.to_string(),
            kind: ConditionKind::Equals,
        }
    }
}

/// A single control in the template UI, serialized with the host's
/// field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros_in_select: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select_items: Option<Vec<SelectItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_value_type: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_params: Option<Vec<ParameterDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabling_conditions: Option<Vec<EnablingCondition>>,
}

impl ParameterDescriptor {
    fn base(kind: ParameterKind, name: String, display_name: String) -> Self {
        ParameterDescriptor {
            kind,
            name,
            display_name,
            macros_in_select: None,
            select_items: None,
            simple_value_type: None,
            help: None,
            group_style: None,
            sub_params: None,
            enabling_conditions: None,
        }
    }

    pub fn select(name: String, display_name: String, items: Vec<SelectItem>) -> Self {
        ParameterDescriptor {
            select_items: Some(items),
            simple_value_type: Some(true),
            ..Self::base(ParameterKind::Select, name, display_name)
        }
    }

    pub fn text(name: String, display_name: String) -> Self {
        ParameterDescriptor {
            simple_value_type: Some(true),
            ..Self::base(ParameterKind::Text, name, display_name)
        }
    }

    pub fn label(name: String, display_name: String) -> Self {
        Self::base(ParameterKind::Label, name, display_name)
    }

    pub fn group(
        name: String,
        display_name: String,
        children: Vec<ParameterDescriptor>,
        conditions: Vec<EnablingCondition>,
    ) -> Self {
        ParameterDescriptor {
            group_style: Some(GROUP_STYLE.to_string()),
            sub_params: Some(children),
            enabling_conditions: Some(conditions),
            ..Self::base(ParameterKind::Group, name, display_name)
        }
    }

    fn with_macros(mut self, allowed: bool) -> Self {
        self.macros_in_select = Some(allowed);
        self
    }

    fn with_help(mut self, help: Option<String>) -> Self {
        self.help = help;
        self
    }

    pub fn children(&self) -> &[ParameterDescriptor] {
        self.sub_params.as_deref().unwrap_or(&[])
    }

    pub fn conditions(&self) -> &[EnablingCondition] {
        self.enabling_conditions.as_deref().unwrap_or(&[])
    }

    /// Option values of a SELECT, in order.
    pub fn option_values(&self) -> Vec<&str> {
        self.select_items
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|i| i.value.as_str())
            .collect()
    }

    /// Depth-first walk over this descriptor and all of its descendants.
    pub fn walk(&self) -> Vec<&ParameterDescriptor> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }
}

/// Event spec name → names of the entities it tracks (the locator's name
/// segment), in event source order. Event specs tracking nothing are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventEntityNames(Vec<(String, Vec<String>)>);

impl EventEntityNames {
    /// Invert `index`: for every event spec, collect the entities whose
    /// event list contains it.
    pub fn from_index(event_specs: &[EventSpec], index: &AssociationIndex) -> Self {
        let mut out: Vec<(String, Vec<String>)> = Vec::new();
        for spec in event_specs {
            if out.iter().any(|(name, _)| *name == spec.name) {
                continue;
            }
            let names: Vec<String> = index
                .entities_for(&spec.name)
                .map(|e| e.locator.display_name().to_string())
                .collect();
            if !names.is_empty() {
                out.push((spec.name.clone(), names));
            }
        }
        EventEntityNames(out)
    }

    pub fn get(&self, event: &str) -> &[String] {
        self.0
            .iter()
            .find(|(name, _)| name == event)
            .map(|(_, entities)| entities.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON object in event order.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .map(|(event, entities)| (event.clone(), serde_json::json!(entities)))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Output of [`synthesize_parameters`].
#[derive(Debug, Clone)]
pub struct ParameterSet {
    /// Top-level descriptors: the `eventSpec` select, then event groups,
    /// then entity groups.
    pub parameters: Vec<ParameterDescriptor>,
    pub event_entities: EventEntityNames,
}

impl ParameterSet {
    /// Find a descriptor anywhere in the tree by name.
    pub fn find(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters
            .iter()
            .flat_map(|p| p.walk())
            .find(|p| p.name == name)
    }

    pub fn to_json(&self) -> Result<String, CodegenError> {
        Ok(serde_json::to_string_pretty(&self.parameters)?)
    }
}

/// Build the parameter tree for resolved event specs.
///
/// Fails with [`CodegenError::UnresolvedSchema`] if an event schema was
/// never attached, and with [`CodegenError::DuplicateParameter`] if two
/// controls would share a name.
pub fn synthesize_parameters(
    event_specs: &[EventSpec],
    index: &AssociationIndex,
) -> Result<ParameterSet, CodegenError> {
    let mut names = NameRegistry::default();
    names.claim(EVENT_SPEC_PARAM)?;

    let select_items = event_specs
        .iter()
        .map(|spec| SelectItem::literal(&spec.name))
        .collect();
    let mut parameters = vec![ParameterDescriptor::select(
        EVENT_SPEC_PARAM.to_string(),
        "Select an event spec".to_string(),
        select_items,
    )
    .with_macros(false)];

    for spec in event_specs {
        parameters.push(event_group(spec, &mut names)?);
    }

    for entity in index.iter() {
        parameters.push(entity_group(entity, &mut names)?);
    }

    let event_entities = EventEntityNames::from_index(event_specs, index);

    tracing::debug!(
        groups = parameters.len() - 1,
        controls = names.len(),
        "parameter tree synthesized"
    );
    Ok(ParameterSet {
        parameters,
        event_entities,
    })
}

fn event_group(
    spec: &EventSpec,
    names: &mut NameRegistry,
) -> Result<ParameterDescriptor, CodegenError> {
    let schema = spec
        .schema()
        .ok_or_else(|| CodegenError::UnresolvedSchema {
            locator: spec.event.source.to_string(),
        })?;

    names.claim(&spec.name)?;

    let mut children = Vec::with_capacity(schema.properties.len());
    for (property, declared) in schema.properties.iter() {
        let shown = spec
            .event
            .overrides
            .as_ref()
            .and_then(|o| o.get(property))
            .unwrap_or(declared);
        let name = parameter_name(&spec.name, property);
        names.claim(&name)?;

        let control = match shown.enum_literals() {
            Some(values) => enum_control(name, property, &values),
            None => {
                let suffix = if schema.is_required(property) {
                    " * Required"
                } else {
                    ""
                };
                text_control(name, property, shown, suffix, &spec.name)
            }
        };
        children.push(control.with_help(shown.description.clone()));
    }

    Ok(ParameterDescriptor::group(
        spec.name.clone(),
        format!("{} Event Parameters", spec.name),
        children,
        vec![EnablingCondition::event_spec(&spec.name)],
    ))
}

fn entity_group(
    entity: &EntityAssociation,
    names: &mut NameRegistry,
) -> Result<ParameterDescriptor, CodegenError> {
    let schema: &SchemaDocument = &entity.schema;
    let entity_name = schema.name();
    let group_name = entity_group_name(entity_name);
    names.claim(&group_name)?;

    let mut children = Vec::with_capacity(schema.properties.len() + 3);

    let generator_label = format!("{}_context_generator_label", entity_name);
    names.claim(&generator_label)?;
    children.push(ParameterDescriptor::label(
        generator_label,
        GENERATOR_LABEL.to_string(),
    ));

    let generator = parameter_name(entity_name, CONTEXT_GENERATOR);
    names.claim(&generator)?;
    let locator_text = entity.locator.to_string();
    let source_parts = locator_text.split_once('/').map(|(_, rest)| rest).unwrap_or("");
    children.push(
        ParameterDescriptor::select(
            generator,
            format!("Context Generator for {}", source_parts),
            vec![SelectItem {
                value: NO_GENERATOR.to_string(),
                display_value: "No".to_string(),
            }],
        )
        .with_macros(true)
        .with_help(Some(GENERATOR_HELP.to_string())),
    );

    let fields_label = format!("{}_fields_label", entity_name);
    names.claim(&fields_label)?;
    children.push(ParameterDescriptor::label(
        fields_label,
        FIELDS_LABEL.to_string(),
    ));

    for (property, def) in schema.properties.iter() {
        let name = parameter_name(entity_name, property);
        names.claim(&name)?;

        let control = match def.enum_literals() {
            Some(values) => enum_control(name, property, &values).with_macros(true),
            None => {
                let suffix = if schema.is_required(property) { " *" } else { "" };
                text_control(name, property, def, suffix, entity_name)
            }
        };
        children.push(control.with_help(def.description.clone()));
    }

    let conditions = entity
        .events
        .iter()
        .map(|event| EnablingCondition::event_spec(event))
        .collect();

    Ok(ParameterDescriptor::group(
        group_name,
        format!("{} Entities", entity_name),
        children,
        conditions,
    ))
}

fn enum_control(name: String, property: &str, values: &[String]) -> ParameterDescriptor {
    let items = values.iter().map(|v| SelectItem::literal(v)).collect();
    ParameterDescriptor::select(name, property.to_string(), items)
}

fn text_control(
    name: String,
    property: &str,
    def: &PropertyDef,
    required_suffix: &str,
    owner: &str,
) -> ParameterDescriptor {
    if !def.is_supported() {
        tracing::debug!(
            owner,
            property,
            types = %def.type_label(),
            "unsupported property type, rendering as free text"
        );
    }
    ParameterDescriptor::text(
        name,
        format!("{} ({}){}", property, def.type_label(), required_suffix),
    )
}

/// Tracks every name emitted into the flat parameter namespace.
#[derive(Default)]
struct NameRegistry(HashSet<String>);

impl NameRegistry {
    fn claim(&mut self, name: &str) -> Result<(), CodegenError> {
        if self.0.insert(name.to_string()) {
            Ok(())
        } else {
            Err(CodegenError::DuplicateParameter {
                name: name.to_string(),
            })
        }
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}
