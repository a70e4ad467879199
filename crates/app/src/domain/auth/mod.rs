//! Auth

pub mod errors;
pub mod models;
pub mod service;

pub use errors::AuthServiceError;
pub use models::UserProfile;
pub use service::AuthService;
