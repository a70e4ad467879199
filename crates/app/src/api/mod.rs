//! REST gateway
//!
//! One trait per backend resource, each with an HTTP implementation over [`ApiClient`] and a
//! `mockall` mock for tests. Responses are decoded through private wire schemas and converted
//! into validated `storefront` types at this boundary.

pub mod auth;
pub mod carts;
pub mod client;
pub mod errors;
pub mod orders;
pub mod payments;
pub mod promotions;

pub use auth::{AuthApi, HttpAuthApi, LoginSession};
pub use carts::{CartPayload, CartsApi, HttpCartsApi};
pub use client::{ApiClient, Envelope};
pub use errors::ApiError;
pub use orders::{HttpOrdersApi, OrdersApi};
pub use payments::{BankTransferConfirmation, HttpPaymentsApi, PaymentsApi, WalletReturn};
pub use promotions::{CouponQuote, HttpPromotionsApi, PromotionsApi};
