//! Checkout

pub mod controller;
pub mod errors;

pub use controller::{CheckoutController, CouponOption};
pub use errors::CheckoutError;
