//! Cart service errors.

use storefront::cart::CartError;
use thiserror::Error;

use crate::{api::ApiError, session::SessionError};

const FALLBACK: &str = "Something went wrong with your cart. Please try again.";

#[derive(Debug, Error)]
pub enum CartServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("no cart exists for this shopper yet")]
    NotFound,

    #[error("cart request failed")]
    Api(#[from] ApiError),

    #[error("session error")]
    Session(#[from] SessionError),
}

impl CartServiceError {
    /// Message to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotFound => "Your cart is empty.".to_string(),
            Self::Api(error) => error.user_message(FALLBACK),
            Self::Session(_) => FALLBACK.to_string(),
        }
    }
}

impl From<CartError> for CartServiceError {
    fn from(error: CartError) -> Self {
        Self::Validation(error.to_string())
    }
}
