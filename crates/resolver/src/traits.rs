use tagsynth_interchange::{SchemaDocument, SchemaLocator};

use crate::error::ResolveError;

/// The schema resolution capability consumed by the synthesis pipeline.
///
/// `resolve` is synchronous and blocking. Implementations return
/// `Err(ResolveError::NotFound)` when they do not hold the schema, which
/// lets a [`FallbackResolver`](crate::FallbackResolver) move on to the next
/// backend; any other error is treated as fatal by the caller.
pub trait SchemaResolver {
    /// Short backend name used in log output.
    fn name(&self) -> &str;

    /// Fetch and normalize the schema identified by `locator`.
    fn resolve(&self, locator: &SchemaLocator) -> Result<SchemaDocument, ResolveError>;
}

impl<R: SchemaResolver + ?Sized> SchemaResolver for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&self, locator: &SchemaLocator) -> Result<SchemaDocument, ResolveError> {
        (**self).resolve(locator)
    }
}

impl<R: SchemaResolver + ?Sized> SchemaResolver for &R {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&self, locator: &SchemaLocator) -> Result<SchemaDocument, ResolveError> {
        (**self).resolve(locator)
    }
}
