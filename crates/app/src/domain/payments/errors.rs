//! Payment return errors.

use storefront::payments::PaymentReturnError;
use thiserror::Error;

use crate::{api::ApiError, session::SessionError};

const FALLBACK: &str =
    "We could not confirm your payment. Please check your order history or contact support.";

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("return parameters could not be read")]
    Parameters(#[from] PaymentReturnError),

    #[error("return parameters do not name a known gateway")]
    UnknownGateway,

    #[error("no order is awaiting payment")]
    MissingOrder,

    #[error("payment finalization failed")]
    Finalize(#[source] ApiError),

    #[error("session error")]
    Session(#[from] SessionError),
}

impl ReconcileError {
    /// Message to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Finalize(error) => error.user_message(FALLBACK),
            Self::Parameters(_) | Self::UnknownGateway | Self::MissingOrder | Self::Session(_) => {
                FALLBACK.to_string()
            }
        }
    }
}
