//! The shopper's order history.

use std::{fmt, sync::Arc};

use storefront::{
    identity::Identity,
    orders::{Order, OrderCode, OrderError},
};
use tracing::info;

use crate::{
    api::{OrdersApi, PaymentsApi},
    domain::orders::{OrderHistoryError, payment::start_payment},
    session::Session,
};

pub struct OrderHistory {
    orders: Arc<dyn OrdersApi>,
    payments: Arc<dyn PaymentsApi>,
    session: Session,
}

impl fmt::Debug for OrderHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderHistory")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl OrderHistory {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersApi>,
        payments: Arc<dyn PaymentsApi>,
        session: Session,
    ) -> Self {
        Self {
            orders,
            payments,
            session,
        }
    }

    /// Orders for the current shopper, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`OrderHistoryError::NoIdentity`] when nobody is signed in and no guest id exists.
    #[tracing::instrument(name = "orders.history.list", skip(self), err)]
    pub async fn list(&self) -> Result<Vec<Order>, OrderHistoryError> {
        let identity = self.identity()?;

        Ok(self.orders.list_orders(&identity).await?)
    }

    /// Cancel a pending order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderHistoryError::Transition`] without a request unless the order is pending.
    #[tracing::instrument(name = "orders.history.cancel", skip(self), fields(order_code = %code), err)]
    pub async fn cancel(&self, code: &OrderCode) -> Result<Order, OrderHistoryError> {
        let (identity, order) = self.find(code).await?;

        order.ensure_cancelable()?;

        let canceled = self.orders.cancel_order(&identity, &order.code).await?;

        info!(order_code = %canceled.code, status = %canceled.status, "order canceled");

        Ok(canceled)
    }

    /// Confirm a shipped order arrived.
    ///
    /// # Errors
    ///
    /// Returns [`OrderHistoryError::Transition`] without a request unless the order is shipping.
    #[tracing::instrument(
        name = "orders.history.confirm_received",
        skip(self),
        fields(order_code = %code),
        err
    )]
    pub async fn confirm_received(&self, code: &OrderCode) -> Result<Order, OrderHistoryError> {
        let (identity, order) = self.find(code).await?;

        order.ensure_receivable()?;

        let received = self.orders.confirm_received(&identity, &order.code).await?;

        info!(order_code = %received.code, status = %received.status, "order received");

        Ok(received)
    }

    /// Start a new gateway payment for an unpaid pending order and return its URL.
    ///
    /// # Errors
    ///
    /// Returns [`OrderHistoryError::Transition`] when the order has nothing to pay online, or
    /// [`OrderHistoryError::Payment`] when the gateway fails.
    #[tracing::instrument(
        name = "orders.history.retry_payment",
        skip(self),
        fields(order_code = %code),
        err
    )]
    pub async fn retry_payment(&self, code: &OrderCode) -> Result<String, OrderHistoryError> {
        let (_, order) = self.find(code).await?;

        order.ensure_payable()?;

        let shipping_address = self.session.shipping_address()?;

        start_payment(&*self.payments, &self.session, &order, shipping_address)
            .await?
            .ok_or_else(|| OrderError::NothingToPay(order.code.clone()).into())
    }

    fn identity(&self) -> Result<Identity, OrderHistoryError> {
        self.session
            .current_identity()?
            .ok_or(OrderHistoryError::NoIdentity)
    }

    async fn find(&self, code: &OrderCode) -> Result<(Identity, Order), OrderHistoryError> {
        let identity = self.identity()?;

        let order = self
            .orders
            .list_orders(&identity)
            .await?
            .into_iter()
            .find(|order| &order.code == code)
            .ok_or_else(|| OrderHistoryError::NotFound(code.clone()))?;

        Ok((identity, order))
    }
}
