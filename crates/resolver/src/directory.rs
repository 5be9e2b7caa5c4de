//! Local directory schema backend.
//!
//! Reads schemas laid out the way a static Iglu registry serves them:
//! `<root>/<vendor>/<name>/<format>/<version>`, with or without a
//! `.json` suffix.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tagsynth_interchange::{SchemaDocument, SchemaLocator};

use crate::error::ResolveError;
use crate::traits::SchemaResolver;

#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryResolver { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, locator: &SchemaLocator) -> [PathBuf; 2] {
        let base = self
            .root
            .join(&locator.vendor)
            .join(&locator.name)
            .join(&locator.format);
        [
            base.join(&locator.version),
            base.join(format!("{}.json", locator.version)),
        ]
    }
}

impl SchemaResolver for DirectoryResolver {
    fn name(&self) -> &str {
        "directory"
    }

    fn resolve(&self, locator: &SchemaLocator) -> Result<SchemaDocument, ResolveError> {
        for path in self.candidates(locator) {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(ResolveError::Io {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })
                }
            };

            let raw: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| ResolveError::Decode {
                    what: path.display().to_string(),
                    message: e.to_string(),
                })?;
            tracing::debug!(%locator, path = %path.display(), "schema read from disk");
            return Ok(SchemaDocument::from_json(&raw, locator)?);
        }

        Err(ResolveError::NotFound {
            locator: locator.to_string(),
        })
    }
}
