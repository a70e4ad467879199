//! Storefront services and page controllers.

pub mod auth;
pub mod carts;
pub mod checkout;
pub mod orders;
pub mod payments;
