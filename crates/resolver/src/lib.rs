//! tagsynth-resolver: turns schema locators into schema documents.
//!
//! The codegen pipeline only sees the [`SchemaResolver`] trait. Backends:
//!
//! - [`CatalogClient`]: the organization's catalog API (authenticated).
//! - [`RegistryResolver`]: a public Iglu registry, used as fallback.
//! - [`DirectoryResolver`]: schemas on disk in registry layout.
//! - [`StaticResolver`]: in-memory documents.
//!
//! [`FallbackResolver`] chains backends and [`SchemaCache`] memoizes
//! resolved documents by locator so each schema is fetched once.

mod cache;
mod catalog;
mod config;
mod directory;
mod error;
mod fallback;
mod http;
mod registry;
mod static_resolver;
mod traits;

pub use cache::SchemaCache;
pub use catalog::{schema_hash, CatalogClient};
pub use config::{CatalogCredentials, ResolverConfig, DEFAULT_CATALOG_URL, DEFAULT_REGISTRY_URL};
pub use directory::DirectoryResolver;
pub use error::ResolveError;
pub use fallback::FallbackResolver;
pub use registry::RegistryResolver;
pub use static_resolver::StaticResolver;
pub use traits::SchemaResolver;
