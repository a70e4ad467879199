//! Carts

pub mod controller;
pub mod errors;
pub mod service;

pub use controller::CartController;
pub use errors::CartServiceError;
pub use service::CartService;
