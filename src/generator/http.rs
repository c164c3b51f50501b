//! Script creation from a single URL.

use url::Url;

use crate::generator::GeneratorError;
use crate::loadtest::model::{Script, Step};

/// Builds a one-step `GET` script for `raw_url` under a fresh UUIDv4 id.
///
/// The URL must be absolute (scheme and host).
pub fn script_from_url(raw_url: &str) -> Result<Script, GeneratorError> {
    let trimmed = raw_url.trim();
    let parsed = Url::parse(trimmed).map_err(|e| GeneratorError::InvalidUrl {
        url: raw_url.to_owned(),
        reason: e.to_string(),
    })?;
    if !parsed.has_host() {
        return Err(GeneratorError::InvalidUrl {
            url: raw_url.to_owned(),
            reason: "URL has no host".to_string(),
        });
    }

    Ok(Script::new(
        uuid::Uuid::new_v4().to_string(),
        vec![Step::http("GET", trimmed)],
    ))
}
