//! Payments

pub mod errors;
pub mod reconciler;

pub use errors::ReconcileError;
pub use reconciler::{
    PaymentReturnReconciler, RETRY_CHECKOUT_DELAY, ReconcileState, Reconciliation,
};
