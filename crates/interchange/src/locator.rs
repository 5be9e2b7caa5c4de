//! `iglu:` schema locators.
//!
//! A locator has the shape `iglu:<vendor>/<name>/<format>/<version>`,
//! e.g. `iglu:com.acme/signup/jsonschema/1-0-0`. It is used both to fetch
//! a schema and as the key that deduplicates schema references.

use std::fmt;
use std::str::FromStr;

use crate::deserialize::InterchangeError;

/// Prefix shared by every locator.
pub const IGLU_PREFIX: &str = "iglu:";

/// A parsed schema locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaLocator {
    pub vendor: String,
    pub name: String,
    pub format: String,
    pub version: String,
}

impl SchemaLocator {
    /// Registry path without the `iglu:` prefix: `vendor/name/format/version`.
    pub fn path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.vendor, self.name, self.format, self.version
        )
    }

    /// The segment that names the schema (third `:`/`/`-delimited segment
    /// of the full locator). Used as the display name of entities and as
    /// the source segment of generated capability names.
    pub fn display_name(&self) -> &str {
        &self.name
    }
}

impl FromStr for SchemaLocator {
    type Err = InterchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| InterchangeError::InvalidLocator {
            locator: s.to_string(),
            reason: reason.to_string(),
        };

        let rest = s
            .strip_prefix(IGLU_PREFIX)
            .ok_or_else(|| invalid("expected 'iglu:' prefix"))?;

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 4 {
            return Err(invalid("expected vendor/name/format/version"));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("empty path segment"));
        }

        Ok(SchemaLocator {
            vendor: parts[0].to_string(),
            name: parts[1].to_string(),
            format: parts[2].to_string(),
            version: parts[3].to_string(),
        })
    }
}

impl fmt::Display for SchemaLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", IGLU_PREFIX, self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_locator() {
        let loc: SchemaLocator = "iglu:com.acme/signup/jsonschema/1-0-0".parse().unwrap();
        assert_eq!(loc.vendor, "com.acme");
        assert_eq!(loc.name, "signup");
        assert_eq!(loc.format, "jsonschema");
        assert_eq!(loc.version, "1-0-0");
        assert_eq!(loc.display_name(), "signup");
        assert_eq!(loc.path(), "com.acme/signup/jsonschema/1-0-0");
    }

    #[test]
    fn display_restores_original_text() {
        let text = "iglu:com.snowplowanalytics.snowplow/web_page/jsonschema/1-0-0";
        let loc: SchemaLocator = text.parse().unwrap();
        assert_eq!(loc.to_string(), text);
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = "com.acme/signup/jsonschema/1-0-0"
            .parse::<SchemaLocator>()
            .unwrap_err();
        assert!(matches!(err, InterchangeError::InvalidLocator { .. }));
    }

    #[test]
    fn rejects_short_path() {
        assert!("iglu:com.acme/signup/1-0-0".parse::<SchemaLocator>().is_err());
        assert!("iglu:com.acme//jsonschema/1-0-0"
            .parse::<SchemaLocator>()
            .is_err());
    }
}
