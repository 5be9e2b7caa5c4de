//! tagsynth-codegen: synthesizes a tag template from a data product.
//!
//! The pipeline runs strictly in order:
//!
//! 1. [`association`]: resolve schemas and index which entities each
//!    event spec tracks.
//! 2. [`params`]: build the parameter tree (one group per event spec and
//!    per distinct entity) and the event → entity-name map.
//! 3. [`dispatch`]: lower every event spec to a dispatch branch and render
//!    the sandboxed JavaScript.
//! 4. [`permissions`]: declare every global the dispatch code calls.
//! 5. [`bundle`]: concatenate everything into one `.tpl` document.
//!
//! [`pipeline::generate_template`] drives all five steps in memory.

pub mod association;
pub mod bundle;
pub mod dispatch;
pub mod error;
pub mod naming;
pub mod params;
pub mod permissions;
pub mod pipeline;

pub use association::{AssociationIndex, EntityAssociation};
pub use dispatch::{render_dispatch, synthesize_dispatch, DispatchOptions, DispatchOutput};
pub use error::CodegenError;
pub use params::{synthesize_parameters, EventEntityNames, ParameterDescriptor, ParameterSet};
pub use permissions::{build_permissions, PermissionDeclaration};
pub use pipeline::{generate_template, resolve_product, GenerateConfig, GeneratedTemplate};
