//! Cart data service.

use std::{fmt, sync::Arc};

use storefront::{
    cart::{
        Cart, VariationId,
        sequence::{Sequenced, Ticket},
    },
    identity::{AuthToken, GuestId, Identity},
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    api::{CartPayload, CartsApi},
    domain::carts::CartServiceError,
    session::Session,
};

/// Cart operations for the current shopper.
///
/// Every call attaches exactly one identity, creating a guest id on first use. Responses pass
/// through a [`Sequenced`] guard, so a slow response never overwrites a newer cart.
#[derive(Clone)]
pub struct CartService {
    api: Arc<dyn CartsApi>,
    session: Session,
    state: Arc<Mutex<Sequenced<Cart>>>,
}

impl fmt::Debug for CartService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartService")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl CartService {
    #[must_use]
    pub fn new(api: Arc<dyn CartsApi>, session: Session) -> Self {
        Self {
            api,
            session,
            state: Arc::new(Mutex::new(Sequenced::new())),
        }
    }

    /// Latest cart applied, if any request has completed.
    pub async fn current(&self) -> Option<Cart> {
        self.state.lock().await.current().cloned()
    }

    /// Forget the cached cart, e.g. after the shopper signs in or out.
    pub async fn reset(&self) {
        self.state.lock().await.reset();
    }

    /// Fold a guest cart into the account behind `token`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend refuses the merge.
    #[tracing::instrument(
        name = "carts.service.merge_guest_cart",
        skip(self, token),
        fields(guest_id = %guest),
        err
    )]
    pub async fn merge_guest_cart(
        &self,
        token: &AuthToken,
        guest: &GuestId,
    ) -> Result<(), CartServiceError> {
        self.api.merge_guest_cart(token, guest).await?;

        Ok(())
    }

    /// Fetch the cart, creating a guest identity if the shopper has none.
    ///
    /// # Errors
    ///
    /// Returns an error when the session or the backend fails.
    #[tracing::instrument(name = "carts.service.get_cart", skip(self), err)]
    pub async fn get_cart(&self) -> Result<Cart, CartServiceError> {
        let identity = self.session.resolve_identity()?;
        let ticket = self.issue().await;

        let payload = self.api.get_cart(&identity).await?;

        self.apply(&identity, ticket, payload).await
    }

    /// Fetch the cart only when the shopper already has an identity.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::NotFound`] without calling the backend when nothing is stored.
    #[tracing::instrument(name = "carts.service.get_existing_cart", skip(self), err)]
    pub async fn get_existing_cart(&self) -> Result<Cart, CartServiceError> {
        let Some(identity) = self.session.current_identity()? else {
            return Err(CartServiceError::NotFound);
        };

        let ticket = self.issue().await;
        let payload = self.api.get_cart(&identity).await?;

        self.apply(&identity, ticket, payload).await
    }

    /// Add units of a variation.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::Validation`] for a blank id or a quantity below one, without
    /// calling the backend.
    #[tracing::instrument(name = "carts.service.add_item", skip(self), err)]
    pub async fn add_item(
        &self,
        variation_id: &str,
        quantity: i64,
    ) -> Result<Cart, CartServiceError> {
        let variation = VariationId::new(variation_id)?;
        let quantity = validate_quantity(quantity)?;

        let identity = self.session.resolve_identity()?;
        let ticket = self.issue().await;
        let payload = self.api.add_item(&identity, &variation, quantity).await?;

        info!(variation_id = %variation, quantity, "added cart item");

        self.apply(&identity, ticket, payload).await
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::Validation`] for a blank id or a quantity below one, without
    /// calling the backend.
    #[tracing::instrument(name = "carts.service.update_item_quantity", skip(self), err)]
    pub async fn update_item_quantity(
        &self,
        variation_id: &str,
        quantity: i64,
    ) -> Result<Cart, CartServiceError> {
        let variation = VariationId::new(variation_id)?;
        let quantity = validate_quantity(quantity)?;

        let identity = self.session.resolve_identity()?;
        let ticket = self.issue().await;
        let payload = self
            .api
            .update_item(&identity, &variation, quantity)
            .await?;

        info!(variation_id = %variation, quantity, "updated cart item");

        self.apply(&identity, ticket, payload).await
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns an error when the session or the backend fails.
    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(variation_id = %variation),
        err
    )]
    pub async fn remove_item(&self, variation: &VariationId) -> Result<Cart, CartServiceError> {
        let identity = self.session.resolve_identity()?;
        let ticket = self.issue().await;
        let payload = self.api.remove_item(&identity, variation).await?;

        info!(variation_id = %variation, "removed cart item");

        self.apply(&identity, ticket, payload).await
    }

    /// Remove several lines. The returned cart may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::Validation`] for an empty list, without calling the backend.
    #[tracing::instrument(
        name = "carts.service.remove_items",
        skip(self, variations),
        fields(count = variations.len()),
        err
    )]
    pub async fn remove_items(
        &self,
        variations: &[VariationId],
    ) -> Result<Cart, CartServiceError> {
        if variations.is_empty() {
            return Err(CartServiceError::Validation(
                "Choose at least one item to remove".to_string(),
            ));
        }

        let identity = self.session.resolve_identity()?;
        let ticket = self.issue().await;
        let payload = self.api.remove_items(&identity, variations).await?;

        info!(count = variations.len(), "removed cart items");

        self.apply(&identity, ticket, payload).await
    }

    /// Empty the cart and forget the guest id.
    ///
    /// # Errors
    ///
    /// Returns an error when the session or the backend fails.
    #[tracing::instrument(name = "carts.service.clear_cart", skip(self), err)]
    pub async fn clear_cart(&self) -> Result<(), CartServiceError> {
        let identity = self.session.resolve_identity()?;
        let ticket = self.issue().await;

        self.api.clear_cart(&identity).await?;
        self.session.clear_guest_id()?;

        let mut state = self.state.lock().await;
        let id = state.current().and_then(|cart| cart.id().cloned());
        state.apply(ticket, Cart::empty(id));

        info!("cleared cart");

        Ok(())
    }

    async fn issue(&self) -> Ticket {
        self.state.lock().await.issue()
    }

    async fn apply(
        &self,
        identity: &Identity,
        ticket: Ticket,
        payload: CartPayload,
    ) -> Result<Cart, CartServiceError> {
        if let (Identity::Guest(sent), Some(issued)) = (identity, &payload.guest_id) {
            if sent != issued {
                self.session.store_guest_id(issued)?;
                debug!(guest_id = %issued, "stored server-issued guest id");
            }
        }

        let mut state = self.state.lock().await;

        if !state.apply(ticket, payload.cart.clone()) {
            debug!("dropped stale cart response");
        }

        Ok(state.current().cloned().unwrap_or(payload.cart))
    }
}

fn validate_quantity(quantity: i64) -> Result<u32, CartServiceError> {
    u32::try_from(quantity)
        .ok()
        .filter(|&quantity| quantity >= 1)
        .ok_or_else(|| CartServiceError::Validation("Quantity must be at least 1".to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storefront::identity::{AuthToken, GuestId};
    use testresult::TestResult;

    use super::*;
    use crate::{
        api::carts::MockCartsApi,
        domain::auth::UserProfile,
        test::{cart, payload, payload_with_guest},
    };

    fn service(api: MockCartsApi, session: &Session) -> CartService {
        CartService::new(Arc::new(api), session.clone())
    }

    #[tokio::test]
    async fn guest_without_identity_gets_one_and_keeps_server_id() -> TestResult {
        let session = Session::in_memory();
        let mut api = MockCartsApi::new();
        let cart = cart(&[("v-1", 100, 5, 1)])?;
        let returned = cart.clone();

        api.expect_get_cart()
            .withf(|identity| identity.guest_id().is_some())
            .times(1)
            .returning(move |_| Ok(payload_with_guest(returned.clone(), "server-guest")));

        let fetched = service(api, &session).get_cart().await?;

        assert_eq!(fetched, cart);
        assert_eq!(session.guest_id()?, Some(GuestId::new("server-guest")?));

        Ok(())
    }

    #[tokio::test]
    async fn authenticated_calls_never_store_guest_ids() -> TestResult {
        let session = Session::in_memory();
        session.sign_in(
            &AuthToken::new("tok")?,
            &UserProfile {
                id: None,
                name: None,
                email: "a@example.com".to_string(),
            },
        )?;

        let mut api = MockCartsApi::new();
        let cart = cart(&[])?;

        api.expect_get_cart()
            .withf(|identity| identity.is_authenticated())
            .returning(move |_| Ok(payload_with_guest(cart.clone(), "ignored")));

        service(api, &session).get_cart().await?;

        assert_eq!(session.guest_id()?, None);

        Ok(())
    }

    #[tokio::test]
    async fn existing_cart_needs_stored_identity() -> TestResult {
        let session = Session::in_memory();

        let result = service(MockCartsApi::new(), &session)
            .get_existing_cart()
            .await;

        assert!(
            matches!(result, Err(CartServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
        assert_eq!(session.guest_id()?, None, "no guest id should be created");

        Ok(())
    }

    #[tokio::test]
    async fn invalid_quantities_never_reach_the_backend() {
        let service = service(MockCartsApi::new(), &Session::in_memory());

        for quantity in [0, -3] {
            let result = service.add_item("v-1", quantity).await;

            assert!(
                matches!(result, Err(CartServiceError::Validation(_))),
                "quantity {quantity}: expected Validation, got {result:?}"
            );
        }

        let result = service.update_item_quantity("  ", 2).await;

        assert!(
            matches!(result, Err(CartServiceError::Validation(_))),
            "expected Validation, got {result:?}"
        );
    }

    #[tokio::test]
    async fn removing_nothing_is_rejected() {
        let result = service(MockCartsApi::new(), &Session::in_memory())
            .remove_items(&[])
            .await;

        assert!(
            matches!(result, Err(CartServiceError::Validation(_))),
            "expected Validation, got {result:?}"
        );
    }

    #[tokio::test]
    async fn add_item_sends_validated_values() -> TestResult {
        let mut api = MockCartsApi::new();
        let cart = cart(&[("v-1", 100, 5, 2)])?;

        api.expect_add_item()
            .withf(|_, variation, quantity| variation.as_str() == "v-1" && *quantity == 2)
            .times(1)
            .returning(move |_, _, _| Ok(payload(cart.clone())));

        let updated = service(api, &Session::in_memory()).add_item("v-1", 2).await?;

        assert_eq!(updated.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_always_drops_guest_id() -> TestResult {
        let session = Session::in_memory();
        session.store_guest_id(&GuestId::new("g-1")?)?;

        let mut api = MockCartsApi::new();
        api.expect_clear_cart().times(1).returning(|_| Ok(()));

        let service = service(api, &session);
        service.clear_cart().await?;

        assert_eq!(session.guest_id()?, None);
        assert!(service.current().await.is_some_and(|cart| cart.is_empty()));

        Ok(())
    }

    #[tokio::test]
    async fn stale_response_does_not_overwrite_newer_cart() -> TestResult {
        let session = Session::in_memory();
        let identity = session.resolve_identity()?;
        let service = service(MockCartsApi::new(), &session);

        let older = service.issue().await;
        let newer = service.issue().await;

        let newer_cart = cart(&[("v-1", 100, 5, 3)])?;
        let older_cart = cart(&[("v-1", 100, 5, 1)])?;

        service
            .apply(&identity, newer, payload(newer_cart.clone()))
            .await?;
        let returned = service.apply(&identity, older, payload(older_cart)).await?;

        assert_eq!(returned, newer_cart);
        assert_eq!(service.current().await, Some(newer_cart));

        Ok(())
    }
}
