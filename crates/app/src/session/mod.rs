//! Session
//!
//! Everything the storefront remembers between runs: credentials, the anonymous guest id, and
//! the order snapshots needed to finish a gateway payment after its redirect.

use std::{fmt, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use storefront::{
    checkout::ShippingAddress,
    identity::{AuthToken, GuestId, Identity},
    orders::{OrderCode, PendingOrder},
};
use tracing::debug;

use crate::domain::auth::UserProfile;

mod errors;
mod store;

pub use errors::SessionError;
pub use store::{FileSessionStore, MemorySessionStore, SessionKey, SessionStore};

/// Typed view over a [`SessionStore`].
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// A session that is forgotten when the process exits.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails or holds a blank token.
    pub fn auth_token(&self) -> Result<Option<AuthToken>, SessionError> {
        self.store
            .get(SessionKey::AuthToken)?
            .map(AuthToken::new)
            .transpose()
            .map_err(SessionError::from)
    }

    /// Stored guest id.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails or holds a blank id.
    pub fn guest_id(&self) -> Result<Option<GuestId>, SessionError> {
        self.store
            .get(SessionKey::GuestId)?
            .map(GuestId::new)
            .transpose()
            .map_err(SessionError::from)
    }

    /// Persist a guest id.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn store_guest_id(&self, guest: &GuestId) -> Result<(), SessionError> {
        self.store
            .set(SessionKey::GuestId, guest.as_str().to_string())
    }

    /// Forget the guest id.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn clear_guest_id(&self) -> Result<(), SessionError> {
        self.store.remove(SessionKey::GuestId)
    }

    /// Identity from what is stored, without creating anything.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn current_identity(&self) -> Result<Option<Identity>, SessionError> {
        Ok(Identity::from_parts(self.auth_token()?, self.guest_id()?))
    }

    /// Identity to send with a request. Generates and persists a guest id when the shopper has
    /// neither a token nor a guest id yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn resolve_identity(&self) -> Result<Identity, SessionError> {
        if let Some(identity) = self.current_identity()? {
            return Ok(identity);
        }

        let guest = GuestId::generate();
        self.store_guest_id(&guest)?;

        debug!(guest_id = %guest, "generated guest id");

        Ok(Identity::Guest(guest))
    }

    /// Store credentials after a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn sign_in(&self, token: &AuthToken, user: &UserProfile) -> Result<(), SessionError> {
        self.store
            .set(SessionKey::AuthToken, token.expose().to_string())?;
        self.put_json(SessionKey::CurrentUser, user)
    }

    /// Drop credentials.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.store.remove(SessionKey::AuthToken)?;
        self.store.remove(SessionKey::CurrentUser)
    }

    /// Profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails or the stored profile is malformed.
    pub fn current_user(&self) -> Result<Option<UserProfile>, SessionError> {
        self.get_json(SessionKey::CurrentUser)
    }

    /// Remember an order awaiting a bank-transfer return.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn save_pending_order(&self, pending: &PendingOrder) -> Result<(), SessionError> {
        self.put_json(SessionKey::PendingOrder, pending)
    }

    /// The order awaiting a bank-transfer return.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails or the snapshot is malformed.
    pub fn pending_order(&self) -> Result<Option<PendingOrder>, SessionError> {
        self.get_json(SessionKey::PendingOrder)
    }

    /// Forget the pending order snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn clear_pending_order(&self) -> Result<(), SessionError> {
        self.store.remove(SessionKey::PendingOrder)
    }

    /// Remember the shipping address used for the last order.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn save_shipping_address(&self, address: &ShippingAddress) -> Result<(), SessionError> {
        self.put_json(SessionKey::ShippingAddress, address)
    }

    /// Shipping address used for the last order.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails or the address is malformed.
    pub fn shipping_address(&self) -> Result<Option<ShippingAddress>, SessionError> {
        self.get_json(SessionKey::ShippingAddress)
    }

    /// Remember the order awaiting a wallet return.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn save_order_code(&self, code: &OrderCode) -> Result<(), SessionError> {
        self.store
            .set(SessionKey::CurrentOrderCode, code.as_str().to_string())
    }

    /// The order awaiting a wallet return.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn order_code(&self) -> Result<Option<OrderCode>, SessionError> {
        Ok(self
            .store
            .get(SessionKey::CurrentOrderCode)?
            .and_then(|code| OrderCode::new(code).ok()))
    }

    /// Forget every gateway snapshot once a payment return has been handled.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub fn clear_payment_snapshots(&self) -> Result<(), SessionError> {
        self.store.remove(SessionKey::PendingOrder)?;
        self.store.remove(SessionKey::CurrentOrderCode)
    }

    fn put_json<T: Serialize>(&self, key: SessionKey, value: &T) -> Result<(), SessionError> {
        self.store.set(key, serde_json::to_string(value)?)
    }

    fn get_json<T: DeserializeOwned>(&self, key: SessionKey) -> Result<Option<T>, SessionError> {
        self.store
            .get(key)?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(SessionError::from)
    }
}
