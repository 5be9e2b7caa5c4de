//! Shared blocking HTTP helpers for the catalog and registry backends.

use crate::error::ResolveError;

/// Outcome of a GET that may legitimately 404.
pub(crate) enum Fetched {
    Found(serde_json::Value),
    Missing,
}

/// GET `url` and decode the body as JSON.
///
/// 404 is reported as [`Fetched::Missing`]; 401/403 become
/// [`ResolveError::Auth`]; everything else non-2xx is an HTTP error.
pub(crate) fn get_json(
    agent: &ureq::Agent,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<Fetched, ResolveError> {
    let mut request = agent.get(url);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = match request.call() {
        Ok(r) => r,
        Err(ureq::Error::StatusCode(404)) => return Ok(Fetched::Missing),
        Err(e) => return Err(classify_http_error(e, url)),
    };

    let body = response
        .into_body()
        .read_json::<serde_json::Value>()
        .map_err(|e| ResolveError::Decode {
            what: format!("response from {}", url),
            message: e.to_string(),
        })?;
    Ok(Fetched::Found(body))
}

/// Convert a ureq error into a [`ResolveError`].
pub(crate) fn classify_http_error(err: ureq::Error, url: &str) -> ResolveError {
    match err {
        ureq::Error::StatusCode(status @ (401 | 403)) => {
            ResolveError::Auth(format!("{} returned {}", url, status))
        }
        ureq::Error::StatusCode(status) => ResolveError::Http {
            url: url.to_string(),
            message: format!("unexpected status {}", status),
        },
        other => ResolveError::Http {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}
