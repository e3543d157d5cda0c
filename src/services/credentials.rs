use reqwest::header::HeaderValue;

use crate::error::ChatError;

/// Describe a secret for logs without revealing any of its characters
pub fn describe_secret(secret: &str) -> String {
    if secret.is_empty() {
        "<empty>".into()
    } else {
        format!("set ({} chars)", secret.chars().count())
    }
}

/// Encode the upstream credential as a header value, flagged sensitive so it
/// never shows up in reqwest's debug output
pub fn api_key_header(api_key: &str) -> Result<HeaderValue, ChatError> {
    let mut value = HeaderValue::from_str(api_key.trim()).map_err(|_| {
        ChatError::ClientInit("API key contains characters not allowed in an HTTP header".into())
    })?;
    value.set_sensitive(true);
    Ok(value)
}
