//! App Context

use std::sync::Arc;

use storefront::checkout::LocationCatalog;
use thiserror::Error;

use crate::{
    api::{
        ApiClient, AuthApi, CartsApi, HttpAuthApi, HttpCartsApi, HttpOrdersApi, HttpPaymentsApi,
        HttpPromotionsApi, OrdersApi, PaymentsApi, PromotionsApi,
    },
    config::{ConfigError, StorefrontConfig},
    domain::{
        auth::AuthService,
        carts::{CartController, CartService},
        checkout::CheckoutController,
        orders::{OrderDispatcher, OrderHistory},
        payments::PaymentReturnReconciler,
    },
    session::{FileSessionStore, Session, SessionError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to open session store")]
    Session(#[from] SessionError),

    #[error("invalid configuration")]
    Config(#[from] ConfigError),
}

/// Services wired against one backend and one session.
#[derive(Clone)]
pub struct AppContext {
    pub session: Session,
    pub carts: CartService,
    pub auth: AuthService,
    pub carts_api: Arc<dyn CartsApi>,
    pub promotions: Arc<dyn PromotionsApi>,
    pub orders: Arc<dyn OrdersApi>,
    pub payments: Arc<dyn PaymentsApi>,
    pub catalog: Arc<LocationCatalog>,
}

impl AppContext {
    /// Build the context from configuration: HTTP gateways over the configured base URL and a
    /// session persisted to the configured file.
    ///
    /// # Errors
    ///
    /// Returns an error when the session file or the location catalog cannot be loaded.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, AppInitError> {
        let client = ApiClient::new(config.api.api_url.clone());
        let store = FileSessionStore::open(&config.session.session_file)?;

        Ok(Self::new(
            Session::new(Arc::new(store)),
            Arc::new(HttpCartsApi::new(client.clone())),
            Arc::new(HttpPromotionsApi::new(client.clone())),
            Arc::new(HttpOrdersApi::new(client.clone())),
            Arc::new(HttpPaymentsApi::new(client.clone())),
            Arc::new(HttpAuthApi::new(client)),
            config.location_catalog()?,
        ))
    }

    #[must_use]
    pub fn new(
        session: Session,
        carts_api: Arc<dyn CartsApi>,
        promotions: Arc<dyn PromotionsApi>,
        orders: Arc<dyn OrdersApi>,
        payments: Arc<dyn PaymentsApi>,
        auth_api: Arc<dyn AuthApi>,
        catalog: LocationCatalog,
    ) -> Self {
        let carts = CartService::new(Arc::clone(&carts_api), session.clone());

        Self {
            auth: AuthService::new(auth_api, carts.clone(), session.clone()),
            carts,
            session,
            carts_api,
            promotions,
            orders,
            payments,
            catalog: Arc::new(catalog),
        }
    }

    pub fn cart_controller(&self) -> CartController {
        CartController::new(self.carts.clone())
    }

    pub fn checkout_controller(&self) -> CheckoutController {
        CheckoutController::new(Arc::clone(&self.promotions), Arc::clone(&self.catalog))
    }

    pub fn order_dispatcher(&self) -> OrderDispatcher {
        OrderDispatcher::new(
            Arc::clone(&self.orders),
            Arc::clone(&self.payments),
            self.session.clone(),
        )
    }

    pub fn order_history(&self) -> OrderHistory {
        OrderHistory::new(
            Arc::clone(&self.orders),
            Arc::clone(&self.payments),
            self.session.clone(),
        )
    }

    /// A reconciler for one gateway return.
    pub fn payment_return(&self) -> PaymentReturnReconciler {
        PaymentReturnReconciler::new(
            Arc::clone(&self.payments),
            self.carts.clone(),
            self.session.clone(),
        )
    }
}
