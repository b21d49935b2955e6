//! Client error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by control-plane calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The queried resource does not exist.
    ///
    /// The message keeps the `"<id>" not found` form the API itself uses, so
    /// callers matching on text see the same thing as callers matching on
    /// the variant.
    #[error("\"{id}\" not found")]
    NotFound { id: String },

    /// The API answered with an error envelope. Displays the message as sent.
    #[error("{message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Connection or protocol failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Token authentication failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Client configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Promote an API error to [`ClientError::NotFound`] when its message
    /// names `id` in the quoted not-found form.
    pub(crate) fn classify(self, id: &str) -> Self {
        match self {
            ClientError::Api { ref message, .. } if message.contains(&not_found_pattern(id)) => {
                ClientError::NotFound { id: id.to_string() }
            }
            other => other,
        }
    }

    /// True when this error reports that `id` does not exist.
    ///
    /// Accepts both the typed variant and any error whose text embeds
    /// `"<id>" not found`.
    pub fn is_not_found(&self, id: &str) -> bool {
        match self {
            ClientError::NotFound { id: missing } => missing == id,
            other => other.to_string().contains(&not_found_pattern(id)),
        }
    }
}

fn not_found_pattern(id: &str) -> String {
    format!("\"{}\" not found", id)
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
