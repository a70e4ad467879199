//! Shopper identity: a bearer token for signed-in users, a guest id otherwise.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

/// Header carrying the bearer credential.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Header carrying the anonymous shopper's guest id.
pub const GUEST_ID_HEADER: &str = "X-Guest-Id";

/// Errors raised when constructing identity values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The bearer token was empty or whitespace.
    #[error("auth token cannot be empty")]
    EmptyToken,

    /// The guest id was empty or whitespace.
    #[error("guest id cannot be empty")]
    EmptyGuestId,
}

/// Bearer credential issued at login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmptyToken`] when the token is blank.
    pub fn new(token: impl Into<String>) -> Result<Self, IdentityError> {
        let token = token.into();

        if token.trim().is_empty() {
            return Err(IdentityError::EmptyToken);
        }

        Ok(Self(token))
    }

    /// Raw token, for building the `Authorization` header or persisting.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(**redacted**)")
    }
}

impl Drop for AuthToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Opaque identifier standing in for an anonymous shopper's cart ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(String);

impl GuestId {
    /// Wrap a guest id, usually one issued by the server.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmptyGuestId`] when the id is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(IdentityError::EmptyGuestId);
        }

        Ok(Self(id))
    }

    /// Generate a fresh random guest id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single identity channel attached to a request.
///
/// A request carries either a bearer token or a guest id, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Signed-in shopper.
    Authenticated(AuthToken),

    /// Anonymous shopper.
    Guest(GuestId),
}

impl Identity {
    /// Pick the identity to use from whatever is currently stored.
    ///
    /// The token always wins over the guest id.
    #[must_use]
    pub fn from_parts(token: Option<AuthToken>, guest: Option<GuestId>) -> Option<Self> {
        match (token, guest) {
            (Some(token), _) => Some(Self::Authenticated(token)),
            (None, Some(guest)) => Some(Self::Guest(guest)),
            (None, None) => None,
        }
    }

    /// Header name and value for this identity.
    #[must_use]
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Self::Authenticated(token) => {
                (AUTHORIZATION_HEADER, format!("Bearer {}", token.expose()))
            }
            Self::Guest(guest) => (GUEST_ID_HEADER, guest.as_str().to_string()),
        }
    }

    /// Whether this identity is a signed-in user.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The guest id, when this identity is anonymous.
    #[must_use]
    pub const fn guest_id(&self) -> Option<&GuestId> {
        match self {
            Self::Guest(guest) => Some(guest),
            Self::Authenticated(_) => None,
        }
    }
}
