//! Auth errors.

use thiserror::Error;

use crate::{api::ApiError, session::SessionError};

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("email and password are required")]
    MissingCredentials,

    #[error("login failed")]
    Api(#[from] ApiError),

    #[error("session error")]
    Session(#[from] SessionError),
}

impl AuthServiceError {
    /// Message to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredentials => "Please enter your email and password".to_string(),
            Self::Api(error) => error.user_message("Login failed. Please try again."),
            Self::Session(_) => "Login failed. Please try again.".to_string(),
        }
    }
}
