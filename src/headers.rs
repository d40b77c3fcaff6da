use std::collections::BTreeMap;

use crate::config::StudioApiConfig;
use crate::error::StudioApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";

/// Build a deterministic header map for streaming chat requests.
pub fn build_headers(
    config: &StudioApiConfig,
) -> Result<BTreeMap<String, String>, StudioApiError> {
    if config.access_token.trim().is_empty() {
        return Err(StudioApiError::MissingAccessToken);
    }

    let mut headers = BTreeMap::new();
    headers.insert(
        HEADER_AUTHORIZATION.to_owned(),
        format!("Bearer {}", config.access_token.trim()),
    );
    headers.insert(HEADER_ACCEPT.to_owned(), "text/event-stream".to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}
