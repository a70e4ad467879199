//! Order errors.

use storefront::{
    checkout::FormErrors,
    orders::{Order, OrderCode, OrderError},
};
use thiserror::Error;

use crate::{api::ApiError, session::SessionError};

const PAYMENT_FALLBACK: &str =
    "The payment could not be started. Your order is saved as pending and can be paid later.";

#[derive(Debug, Error)]
pub enum PaymentStartError {
    #[error("payment gateway request failed")]
    Gateway(#[from] ApiError),

    #[error("session error")]
    Session(#[from] SessionError),
}

impl PaymentStartError {
    /// Message to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Gateway(error) => error.user_message(PAYMENT_FALLBACK),
            Self::Session(_) => PAYMENT_FALLBACK.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrderDispatchError {
    #[error("shipping form is invalid")]
    InvalidForm(#[source] FormErrors),

    #[error("no items selected")]
    EmptySelection,

    #[error("cart has no id")]
    MissingCart,

    #[error("order creation failed")]
    OrderFailed(#[source] ApiError),

    #[error("payment could not be started for order {}", .order.code)]
    PaymentFailed {
        order: Order,
        #[source]
        source: PaymentStartError,
    },

    #[error("session error")]
    Session(#[from] SessionError),
}

impl OrderDispatchError {
    /// Message to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidForm(_) => "Please correct the highlighted shipping fields".to_string(),
            Self::EmptySelection => "Select at least one item to check out".to_string(),
            Self::MissingCart => "Your cart could not be found. Refresh and try again".to_string(),
            Self::OrderFailed(error) => match error.user_message("") {
                message if message.is_empty() => "Order failed".to_string(),
                message => format!("Order failed: {message}"),
            },
            Self::PaymentFailed { source, .. } => source.user_message(),
            Self::Session(_) => "Order failed".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrderHistoryError {
    #[error("no shopper identity")]
    NoIdentity,

    #[error("order {0} not found")]
    NotFound(OrderCode),

    #[error("order cannot change state")]
    Transition(#[from] OrderError),

    #[error("order request failed")]
    Api(#[from] ApiError),

    #[error("payment could not be started")]
    Payment(#[from] PaymentStartError),

    #[error("session error")]
    Session(#[from] SessionError),
}

impl OrderHistoryError {
    /// Message to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoIdentity => "Sign in to see your orders".to_string(),
            Self::NotFound(code) => format!("Order {code} was not found"),
            Self::Transition(error) => error.to_string(),
            Self::Api(error) => error.user_message("Your orders are unavailable right now"),
            Self::Payment(error) => error.user_message(),
            Self::Session(_) => "Your orders are unavailable right now".to_string(),
        }
    }
}
