use tagsynth_interchange::InterchangeError;

/// All errors that can be returned by a `SchemaResolver` implementation.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No backend holds a schema for this locator.
    #[error("schema not found: {locator}")]
    NotFound { locator: String },

    /// The catalog has no data product with this id.
    #[error("data product not found: {id}")]
    DataProductNotFound { id: String },

    /// The catalog rejected the credentials or no credentials were configured.
    #[error("catalog authentication failed: {0}")]
    Auth(String),

    /// A transport-level or unexpected HTTP status failure.
    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// A response or file body could not be decoded.
    #[error("could not decode {what}: {message}")]
    Decode { what: String, message: String },

    /// Reading a schema from disk failed for a reason other than absence.
    #[error("could not read '{path}': {message}")]
    Io { path: String, message: String },

    /// The document was found but cannot be normalized.
    #[error(transparent)]
    Schema(#[from] InterchangeError),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}
