//! Adapter-level errors and API error-message extraction.

use thiserror::Error;

/// What went wrong talking to a remote API, before the failure is
/// narrowed into the calling port's error type.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    /// The server answered with an error; carries the extracted message.
    #[error("{0}")]
    Api(String),
}

/// Pull the most specific human-readable message out of an API error
/// body: `message`, then `error`, then the caller's fallback.
pub(crate) fn extract_error_message(body: &str, fallback: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback.to_owned();
    };

    for key in ["message", "error"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str())
            && !text.trim().is_empty()
        {
            return text.to_owned();
        }
    }
    fallback.to_owned()
}
