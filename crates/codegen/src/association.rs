//! Entity ↔ event spec association.
//!
//! Scans event specs in source order, resolves every schema they
//! reference through a [`SchemaCache`] and records, per entity locator,
//! the event specs that track it. Entities are kept in first-seen order;
//! that order fixes the order of entity groups in the parameter tree.

use std::sync::Arc;

use tagsynth_interchange::{EventSpec, SchemaDocument, SchemaLocator};
use tagsynth_resolver::{SchemaCache, SchemaResolver};

use crate::error::CodegenError;

/// One distinct tracked entity and the event specs that reference it.
#[derive(Debug, Clone)]
pub struct EntityAssociation {
    pub locator: SchemaLocator,
    pub schema: Arc<SchemaDocument>,
    /// Event spec names, in source order, without duplicates.
    pub events: Vec<String>,
}

impl EntityAssociation {
    /// Schema-declared entity name, used for parameter and group names.
    pub fn name(&self) -> &str {
        self.schema.name()
    }
}

/// Locator-keyed, insertion-ordered index of tracked entities.
#[derive(Debug, Clone, Default)]
pub struct AssociationIndex {
    entries: Vec<EntityAssociation>,
}

impl AssociationIndex {
    /// Resolve every event and entity schema referenced by `event_specs`,
    /// attach them to the specs, and index entity usage.
    ///
    /// A locator seen before reuses the cached document. A schema found
    /// in no backend fails the whole build with
    /// [`CodegenError::UnresolvedSchema`].
    pub fn build<R: SchemaResolver>(
        event_specs: &mut [EventSpec],
        cache: &mut SchemaCache<R>,
    ) -> Result<Self, CodegenError> {
        let mut index = AssociationIndex::default();

        for spec in event_specs.iter_mut() {
            let event_schema = cache.get_or_resolve(&spec.event.source)?;
            spec.event.schema = Some(event_schema);

            for entity in spec.tracked.iter_mut() {
                let schema = cache.get_or_resolve(&entity.source)?;
                entity.schema = Some(Arc::clone(&schema));
                index.record(&entity.source, schema, &spec.name);
            }
        }

        tracing::debug!(
            event_specs = event_specs.len(),
            entities = index.len(),
            schemas = cache.len(),
            "association index built"
        );
        Ok(index)
    }

    /// Index event specs whose schemas are already attached.
    pub fn from_resolved(event_specs: &[EventSpec]) -> Result<Self, CodegenError> {
        let mut index = AssociationIndex::default();
        for spec in event_specs {
            for entity in &spec.tracked {
                let schema = entity
                    .schema
                    .clone()
                    .ok_or_else(|| CodegenError::UnresolvedSchema {
                        locator: entity.source.to_string(),
                    })?;
                index.record(&entity.source, schema, &spec.name);
            }
        }
        Ok(index)
    }

    fn record(&mut self, locator: &SchemaLocator, schema: Arc<SchemaDocument>, event: &str) {
        match self.entries.iter_mut().find(|e| e.locator == *locator) {
            Some(entry) => {
                if !entry.events.iter().any(|e| e == event) {
                    entry.events.push(event.to_string());
                }
            }
            None => self.entries.push(EntityAssociation {
                locator: locator.clone(),
                schema,
                events: vec![event.to_string()],
            }),
        }
    }

    pub fn get(&self, locator: &SchemaLocator) -> Option<&EntityAssociation> {
        self.entries.iter().find(|e| e.locator == *locator)
    }

    /// Event spec names tracking `locator`; empty when untracked.
    pub fn events_for(&self, locator: &SchemaLocator) -> &[String] {
        self.get(locator).map(|e| e.events.as_slice()).unwrap_or(&[])
    }

    /// Entities tracked by `event`, in index order.
    pub fn entities_for<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a EntityAssociation> {
        self.entries
            .iter()
            .filter(move |e| e.events.iter().any(|name| name == event))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityAssociation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
