use tagsynth_interchange::InterchangeError;
use tagsynth_resolver::ResolveError;

/// Error type for template synthesis.
///
/// Every variant aborts the run: the parameter tree, dispatch code and
/// permissions must agree with each other, so no partial output is valid.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// A referenced schema was found in no backend.
    #[error("unresolved schema: {locator}")]
    UnresolvedSchema { locator: String },

    /// The data product is structurally unusable.
    #[error(transparent)]
    Interchange(#[from] InterchangeError),

    /// A backend failed for a reason other than absence.
    #[error("schema resolution failed: {0}")]
    Resolver(ResolveError),

    /// Two controls would share one name in the flat parameter namespace.
    #[error("duplicate parameter name '{name}'")]
    DuplicateParameter { name: String },

    #[error("invalid permissions template: {0}")]
    InvalidPermissionsTemplate(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<ResolveError> for CodegenError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotFound { locator } => CodegenError::UnresolvedSchema { locator },
            other => CodegenError::Resolver(other),
        }
    }
}

impl From<serde_json::Error> for CodegenError {
    fn from(e: serde_json::Error) -> Self {
        CodegenError::Serialize(e.to_string())
    }
}
