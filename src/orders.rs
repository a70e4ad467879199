//! Orders

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::CartId,
    checkout::{PaymentMethod, ShippingAddress},
};

/// Errors raised by order values and local transition checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// An order code was empty.
    #[error("order code cannot be empty")]
    EmptyCode,

    /// The requested transition is not allowed from the current status.
    #[error("order {code} is {status} and cannot be {action}")]
    InvalidTransition {
        /// Order code.
        code: OrderCode,
        /// Current status.
        status: OrderStatus,
        /// Requested action, e.g. "canceled".
        action: &'static str,
    },

    /// The order cannot be paid again.
    #[error("order {0} has no outstanding online payment")]
    NothingToPay(OrderCode),
}

/// Server-assigned order code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Wrap an order code.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCode`] when the code is blank.
    pub fn new(code: impl Into<String>) -> Result<Self, OrderError> {
        let code = code.into();

        if code.trim().is_empty() {
            return Err(OrderError::EmptyCode);
        }

        Ok(Self(code))
    }

    /// Borrow the code as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order lifecycle. Transitions are decided by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting dispatch.
    Pending,

    /// Handed to the courier.
    Shipping,

    /// Received by the shopper.
    Completed,

    /// Canceled before dispatch.
    #[serde(alias = "cancelled")]
    Canceled,
}

impl OrderStatus {
    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Shipping => "shipping",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Order code.
    pub code: OrderCode,

    /// Current status.
    pub status: OrderStatus,

    /// Chosen payment method.
    pub payment_method: PaymentMethod,

    /// Amount charged.
    pub final_amount: Decimal,

    /// Whether an online payment has been received.
    pub is_paid: bool,

    /// Creation instant.
    pub created_at: Option<Timestamp>,
}

impl Order {
    /// Check that the order may be canceled.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] unless the order is pending.
    pub fn ensure_cancelable(&self) -> Result<(), OrderError> {
        self.ensure_status(OrderStatus::Pending, "canceled")
    }

    /// Check that the order may be confirmed as received.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] unless the order is shipping.
    pub fn ensure_receivable(&self) -> Result<(), OrderError> {
        self.ensure_status(OrderStatus::Shipping, "confirmed as received")
    }

    /// Check that a gateway payment can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NothingToPay`] unless the order is pending, unpaid and uses a
    /// redirecting payment method.
    pub fn ensure_payable(&self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Pending && !self.is_paid && self.payment_method.redirects()
        {
            return Ok(());
        }

        Err(OrderError::NothingToPay(self.code.clone()))
    }

    fn ensure_status(&self, expected: OrderStatus, action: &'static str) -> Result<(), OrderError> {
        if self.status == expected {
            return Ok(());
        }

        Err(OrderError::InvalidTransition {
            code: self.code.clone(),
            status: self.status,
            action,
        })
    }
}

/// Payload for creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Where to ship.
    pub shipping_address: ShippingAddress,

    /// How the shopper pays.
    pub payment_method: PaymentMethod,

    /// Cart the order is built from.
    pub cart_id: CartId,

    /// Applied coupon code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,

    /// Amount to charge, coupon-adjusted when a coupon was applied.
    pub final_amount: Decimal,
}

/// Snapshot persisted before a gateway redirect so the return page can finish the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    /// Order awaiting payment.
    pub order_code: OrderCode,

    /// Gateway used.
    pub payment_method: PaymentMethod,

    /// Amount sent to the gateway.
    pub amount: Decimal,

    /// Shipping address used for the order, when known. Retried payments from order history
    /// may not have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
}
