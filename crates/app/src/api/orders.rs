//! Order endpoints.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use storefront::{
    checkout::PaymentMethod,
    identity::Identity,
    orders::{NewOrder, Order, OrderCode, OrderStatus},
};

use crate::api::{ApiClient, ApiError};

#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Create an order from the cart.
    async fn create_order(&self, identity: &Identity, order: &NewOrder)
    -> Result<Order, ApiError>;

    /// Orders placed by the signed-in shopper, newest first.
    async fn list_orders(&self, identity: &Identity) -> Result<Vec<Order>, ApiError>;

    /// Cancel a pending order.
    async fn cancel_order(&self, identity: &Identity, code: &OrderCode)
    -> Result<Order, ApiError>;

    /// Confirm a shipped order arrived.
    async fn confirm_received(
        &self,
        identity: &Identity,
        code: &OrderCode,
    ) -> Result<Order, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpOrdersApi {
    client: ApiClient,
}

impl HttpOrdersApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn send_order(&self, request: reqwest::RequestBuilder) -> Result<Order, ApiError> {
        let record: OrderRecord = self.client.send(request).await?.into_data("order")?;

        record.try_into()
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersApi {
    #[tracing::instrument(
        name = "orders.api.create_order",
        skip(self, identity, order),
        fields(payment_method = %order.payment_method, cart_id = %order.cart_id),
        err
    )]
    async fn create_order(
        &self,
        identity: &Identity,
        order: &NewOrder,
    ) -> Result<Order, ApiError> {
        let request = self
            .client
            .request(Method::POST, "orders", Some(identity))?
            .json(order);

        self.send_order(request).await
    }

    #[tracing::instrument(name = "orders.api.list_orders", skip(self, identity), err)]
    async fn list_orders(&self, identity: &Identity) -> Result<Vec<Order>, ApiError> {
        let request = self
            .client
            .request(Method::GET, "orders/my-orders", Some(identity))?;

        let records: Vec<OrderRecord> = self.client.send(request).await?.data.unwrap_or_default();

        let mut orders = records
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.api.cancel_order",
        skip(self, identity),
        fields(order_code = %code),
        err
    )]
    async fn cancel_order(
        &self,
        identity: &Identity,
        code: &OrderCode,
    ) -> Result<Order, ApiError> {
        let path = format!("orders/{}/cancel", code.as_str());
        let request = self.client.request(Method::PUT, &path, Some(identity))?;

        self.send_order(request).await
    }

    #[tracing::instrument(
        name = "orders.api.confirm_received",
        skip(self, identity),
        fields(order_code = %code),
        err
    )]
    async fn confirm_received(
        &self,
        identity: &Identity,
        code: &OrderCode,
    ) -> Result<Order, ApiError> {
        let path = format!("orders/{}/confirm-received", code.as_str());
        let request = self.client.request(Method::PUT, &path, Some(identity))?;

        self.send_order(request).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderRecord {
    #[serde(alias = "code")]
    order_code: String,

    #[serde(default = "pending")]
    status: OrderStatus,

    payment_method: PaymentMethod,

    #[serde(alias = "totalAmount")]
    final_amount: Decimal,

    #[serde(default)]
    is_paid: bool,

    created_at: Option<Timestamp>,
}

const fn pending() -> OrderStatus {
    OrderStatus::Pending
}

impl TryFrom<OrderRecord> for Order {
    type Error = ApiError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            code: OrderCode::new(record.order_code).map_err(ApiError::malformed)?,
            status: record.status,
            payment_method: record.payment_method,
            final_amount: record.final_amount,
            is_paid: record.is_paid,
            created_at: record.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::api::client::{Envelope, decode};

    #[test]
    fn order_record_is_converted() -> TestResult {
        let envelope: Envelope<OrderRecord> = decode(
            br#"{"message": "Order created", "data": {
                "orderCode": "ORD-1", "status": "pending",
                "paymentMethod": "bank_transfer", "finalAmount": 150000,
                "createdAt": "2025-03-01T10:00:00Z"
            }}"#,
        )?;

        let order = Order::try_from(envelope.into_data("order")?)?;

        assert_eq!(order.code.as_str(), "ORD-1");
        assert_eq!(order.payment_method, PaymentMethod::BankTransfer);
        assert!(!order.is_paid);

        Ok(())
    }

    #[test]
    fn missing_status_defaults_to_pending() -> TestResult {
        let envelope: Envelope<OrderRecord> = decode(
            br#"{"data": {"code": "ORD-2", "paymentMethod": "cash_on_delivery", "totalAmount": 10}}"#,
        )?;

        let order = Order::try_from(envelope.into_data("order")?)?;

        assert_eq!(order.status, OrderStatus::Pending);

        Ok(())
    }

    #[test]
    fn blank_order_code_is_malformed() -> TestResult {
        let envelope: Envelope<OrderRecord> = decode(
            br#"{"data": {"orderCode": " ", "paymentMethod": "cash_on_delivery", "finalAmount": 10}}"#,
        )?;

        let result = Order::try_from(envelope.into_data("order")?);

        assert!(
            matches!(result, Err(ApiError::Validation(_))),
            "expected Validation, got {result:?}"
        );

        Ok(())
    }
}
