//! tagsynth-interchange: typed data product and schema documents.
//!
//! Provides typed structs for the data product JSON served by the
//! catalog (event specifications and their tracked entities), the
//! normalized JSON-Schema documents those specifications reference,
//! and the `iglu:` locators that tie the two together.
//!
//! The resolver, codegen and CLI crates all depend on this crate for
//! initial JSON parsing, then work on the typed representation.

pub mod deserialize;
pub mod locator;
pub mod schema;
pub mod types;

pub use deserialize::{from_data_product, InterchangeError};
pub use locator::SchemaLocator;
pub use schema::{JsonType, PropertyDef, PropertyMap, SchemaDocument, SchemaSelf};
pub use types::*;
