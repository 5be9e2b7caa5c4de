//! Catalog API backend.
//!
//! Provides [`CatalogClient`], which encapsulates every HTTP interaction
//! with the organization's catalog: exchanging the API key for an access
//! token, downloading data products, and resolving schemas. Schemas are
//! addressed by an organization-scoped hash of the locator rather than by
//! the locator text itself.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tagsynth_interchange::{SchemaDocument, SchemaLocator};

use crate::config::{CatalogCredentials, ResolverConfig};
use crate::error::ResolveError;
use crate::http::{classify_http_error, get_json, Fetched};
use crate::traits::SchemaResolver;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
}

/// Authenticated client for the catalog API.
pub struct CatalogClient {
    base_url: String,
    organization_id: String,
    token: String,
    agent: ureq::Agent,
}

impl CatalogClient {
    /// Exchange the configured API key for an access token.
    ///
    /// GET `/organizations/{org}/credentials/v3/token`
    pub fn authenticate(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let credentials = config.credentials.as_ref().ok_or_else(|| {
            ResolveError::Auth(
                "no catalog credentials configured (ORGANIZATION_ID, API_KEY_ID, API_KEY)"
                    .to_string(),
            )
        })?;

        let agent = config.agent();
        let token = request_token(&agent, config.catalog_base(), credentials)?;
        tracing::info!(organization = %credentials.organization_id, "catalog token acquired");

        Ok(CatalogClient {
            base_url: config.catalog_base().to_string(),
            organization_id: credentials.organization_id.clone(),
            token,
            agent,
        })
    }

    /// Build a client around an access token obtained elsewhere.
    pub fn with_token(config: &ResolverConfig, organization_id: &str, token: &str) -> Self {
        CatalogClient {
            base_url: config.catalog_base().to_string(),
            organization_id: organization_id.to_string(),
            token: token.to_string(),
            agent: config.agent(),
        }
    }

    fn org_url(&self) -> String {
        format!("{}/organizations/{}", self.base_url, self.organization_id)
    }

    pub fn data_product_url(&self, data_product_id: &str) -> String {
        format!("{}/data-products/v2/{}", self.org_url(), data_product_id)
    }

    pub fn schema_url(&self, locator: &SchemaLocator) -> String {
        format!(
            "{}/data-structures/v1/{}/versions/{}",
            self.org_url(),
            schema_hash(&self.organization_id, locator),
            locator.version
        )
    }

    fn get(&self, url: &str) -> Result<Fetched, ResolveError> {
        let bearer = format!("Bearer {}", self.token);
        get_json(&self.agent, url, &[("authorization", bearer.as_str())])
    }

    /// Download a data product document.
    ///
    /// GET `/organizations/{org}/data-products/v2/{id}`
    pub fn fetch_data_product(&self, data_product_id: &str) -> Result<serde_json::Value, ResolveError> {
        let url = self.data_product_url(data_product_id);
        tracing::info!(data_product = data_product_id, "fetching data product");
        match self.get(&url)? {
            Fetched::Found(doc) => Ok(doc),
            Fetched::Missing => Err(ResolveError::DataProductNotFound {
                id: data_product_id.to_string(),
            }),
        }
    }
}

impl SchemaResolver for CatalogClient {
    fn name(&self) -> &str {
        "catalog"
    }

    fn resolve(&self, locator: &SchemaLocator) -> Result<SchemaDocument, ResolveError> {
        let url = self.schema_url(locator);
        match self.get(&url)? {
            Fetched::Found(raw) => Ok(SchemaDocument::from_json(&raw, locator)?),
            Fetched::Missing => Err(ResolveError::NotFound {
                locator: locator.to_string(),
            }),
        }
    }
}

fn request_token(
    agent: &ureq::Agent,
    base_url: &str,
    credentials: &CatalogCredentials,
) -> Result<String, ResolveError> {
    let url = format!(
        "{}/organizations/{}/credentials/v3/token",
        base_url, credentials.organization_id
    );

    let response = agent
        .get(&url)
        .header("X-API-Key-ID", credentials.api_key_id.as_str())
        .header("X-API-Key", credentials.api_key.as_str())
        .call()
        .map_err(|e| match classify_http_error(e, &url) {
            ResolveError::Http { url, message } => {
                ResolveError::Auth(format!("token request to {} failed: {}", url, message))
            }
            other => other,
        })?;

    let token: TokenResponse =
        response
            .into_body()
            .read_json()
            .map_err(|e| ResolveError::Decode {
                what: "token response".to_string(),
                message: e.to_string(),
            })?;
    Ok(token.access_token)
}

/// Organization-scoped key the catalog uses to address a data structure:
/// hex SHA-256 of `{org}-{vendor}-{name}-{format}`.
pub fn schema_hash(organization_id: &str, locator: &SchemaLocator) -> String {
    let key = format!(
        "{}-{}-{}-{}",
        organization_id, locator.vendor, locator.name, locator.format
    );
    format!("{:x}", Sha256::digest(key.as_bytes()))
}
