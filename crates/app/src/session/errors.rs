//! Session errors.

use storefront::identity::IdentityError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store lock poisoned")]
    Poisoned,

    #[error("failed to access session file")]
    Io(#[from] std::io::Error),

    #[error("invalid session data")]
    Serde(#[from] serde_json::Error),

    #[error("invalid stored identity")]
    Identity(#[from] IdentityError),
}
