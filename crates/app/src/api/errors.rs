//! Gateway errors.

use serde::Deserialize;
use storefront::cart::CartError;
use thiserror::Error;

const NOT_FOUND: u16 = 404;
const UNPROCESSABLE: u16 = 422;
const BAD_REQUEST: u16 = 400;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected locally, or a malformed payload from the server.
    #[error("{0}")]
    Validation(String),

    #[error("resource not found")]
    NotFound(Option<String>),

    #[error("request failed with status {status}")]
    Gateway { status: u16, message: Option<String> },

    #[error("could not reach the store")]
    Transport(#[source] reqwest::Error),
}

impl ApiError {
    /// Classify a non-success response from its status and body.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = error_message(body);

        match status {
            NOT_FOUND => Self::NotFound(message),
            BAD_REQUEST | UNPROCESSABLE => Self::Validation(
                message.unwrap_or_else(|| "the request was rejected".to_string()),
            ),
            _ => Self::Gateway { status, message },
        }
    }

    /// Message to show the shopper: the server's own wording when it sent one, `fallback`
    /// otherwise.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message)
            | Self::NotFound(Some(message))
            | Self::Gateway {
                message: Some(message),
                ..
            } => message.clone(),
            Self::NotFound(None) | Self::Gateway { message: None, .. } | Self::Transport(_) => {
                fallback.to_string()
            }
        }
    }

    pub(crate) fn malformed(what: impl std::fmt::Display) -> Self {
        Self::Validation(format!("malformed server response: {what}"))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error)
    }
}

impl From<CartError> for ApiError {
    fn from(error: CartError) -> Self {
        Self::malformed(error)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn error_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;

    parsed
        .message
        .or(parsed.error)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}
