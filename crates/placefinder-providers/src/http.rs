use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ProviderError;

pub(crate) const CONNECT_TIMEOUT_SECS: u64 = 10;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses `base_url` with any trailing slashes removed, so callers can append
/// path segments with a single `/`.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, ProviderError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| ProviderError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ProviderError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }

    Ok(trimmed.to_string())
}

/// Reads a short prefix of an error body for logging.
pub(crate) async fn error_snippet(response: reqwest::Response) -> String {
    const MAX_CHARS: usize = 300;
    response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://example.com/v1beta//").unwrap(),
            "https://example.com/v1beta"
        );
    }

    #[test]
    fn normalize_rejects_garbage() {
        let err = normalize_base_url("not a url").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidBaseUrl { .. }), "got {err:?}");
    }

    #[test]
    fn normalize_rejects_non_http_scheme() {
        let err = normalize_base_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidBaseUrl { .. }), "got {err:?}");
    }
}
