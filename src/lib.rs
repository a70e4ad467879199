//! Storefront
//!
//! Client-side state for a storefront's cart and checkout: who the shopper is, what is in the
//! cart and selected, what a coupon does to the total, and what a payment gateway reported on
//! return. Nothing in this crate talks to the network; `storefront-app` drives it against the
//! remote API.

pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod identity;
pub mod notices;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod pricing;
