//! Orders

pub mod dispatch;
pub mod errors;
pub mod history;
mod payment;

pub use dispatch::{CheckoutRequest, DispatchOutcome, OrderDispatcher};
pub use errors::{OrderDispatchError, OrderHistoryError, PaymentStartError};
pub use history::OrderHistory;
