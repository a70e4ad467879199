//! Storefront client application: REST gateway, persisted session, and the checkout services
//! built on the `storefront` core.

pub mod api;
pub mod config;
pub mod context;
pub mod domain;
pub mod observability;
pub mod session;
pub mod views;

#[cfg(test)]
mod test;
