//! Payment gateway endpoints: bank-transfer (VNPay) and e-wallet (ZaloPay).

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront::{checkout::ShippingAddress, identity::Identity, orders::OrderCode};

use crate::api::{ApiClient, ApiError};

/// ZaloPay's `return_code` for a created order.
const WALLET_CREATED: i64 = 1;

/// Body of the bank-transfer confirmation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransferConfirmation {
    pub order_code: OrderCode,
    pub transaction_ref: String,
    pub amount: Decimal,

    /// Address saved when the order was placed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
}

/// Wallet return parameters echoed back to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletReturn {
    pub apptransid: String,
    pub status: String,
    pub zptransid: Option<String>,
}

#[automock]
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    /// Request a bank-transfer payment URL for `amount`.
    async fn create_bank_transfer(&self, amount: Decimal) -> Result<String, ApiError>;

    /// Request a wallet payment URL for an order.
    async fn create_wallet_payment(&self, order_code: &OrderCode) -> Result<String, ApiError>;

    /// Finalize a bank-transfer order after a successful return.
    async fn confirm_bank_transfer(
        &self,
        identity: &Identity,
        confirmation: &BankTransferConfirmation,
    ) -> Result<(), ApiError>;

    /// Report a wallet return to the server.
    async fn wallet_return(&self, params: &WalletReturn) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpPaymentsApi {
    client: ApiClient,
}

impl HttpPaymentsApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
struct BankTransferRequest {
    amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletRequest<'a> {
    order_code: &'a OrderCode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankTransferResponse {
    payment_url: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WalletResponse {
    order_url: Option<String>,
    return_code: Option<i64>,
    return_message: Option<String>,
}

impl BankTransferResponse {
    fn into_url(self) -> Result<String, ApiError> {
        self.payment_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(ApiError::Gateway {
                status: 200,
                message: self.message,
            })
    }
}

impl WalletResponse {
    fn into_url(self) -> Result<String, ApiError> {
        let created = self.return_code.is_none_or(|code| code == WALLET_CREATED);

        match self.order_url.filter(|url| !url.trim().is_empty()) {
            Some(url) if created => Ok(url),
            _ => Err(ApiError::Gateway {
                status: 200,
                message: self.return_message,
            }),
        }
    }
}

#[async_trait]
impl PaymentsApi for HttpPaymentsApi {
    #[tracing::instrument(name = "payments.api.create_bank_transfer", skip(self), err)]
    async fn create_bank_transfer(&self, amount: Decimal) -> Result<String, ApiError> {
        let request = self
            .client
            .request(Method::POST, "vnpay/create-payment", None)?
            .json(&BankTransferRequest { amount });

        self.client
            .send_raw::<BankTransferResponse>(request)
            .await?
            .into_url()
    }

    #[tracing::instrument(
        name = "payments.api.create_wallet_payment",
        skip(self),
        fields(order_code = %order_code),
        err
    )]
    async fn create_wallet_payment(&self, order_code: &OrderCode) -> Result<String, ApiError> {
        let request = self
            .client
            .request(Method::POST, "zalo-payment/create-payment", None)?
            .json(&WalletRequest { order_code });

        self.client
            .send_raw::<WalletResponse>(request)
            .await?
            .into_url()
    }

    #[tracing::instrument(
        name = "payments.api.confirm_bank_transfer",
        skip(self, identity, confirmation),
        fields(order_code = %confirmation.order_code),
        err
    )]
    async fn confirm_bank_transfer(
        &self,
        identity: &Identity,
        confirmation: &BankTransferConfirmation,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::POST, "vnpay/confirm-payment", Some(identity))?
            .json(confirmation);

        self.client
            .send::<serde_json::Value>(request)
            .await
            .map(|_envelope| ())
    }

    #[tracing::instrument(
        name = "payments.api.wallet_return",
        skip(self, params),
        fields(apptransid = %params.apptransid),
        err
    )]
    async fn wallet_return(&self, params: &WalletReturn) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::POST, "zalo-payment/return", None)?
            .json(params);

        self.client
            .send::<serde_json::Value>(request)
            .await
            .map(|_envelope| ())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::api::client::decode;

    #[test]
    fn bank_transfer_url_is_extracted() -> TestResult {
        let response: BankTransferResponse =
            decode(br#"{"paymentUrl": "https://sandbox.vnpayment.vn/pay?x=1"}"#)?;

        assert_eq!(response.into_url()?, "https://sandbox.vnpayment.vn/pay?x=1");

        Ok(())
    }

    #[test]
    fn missing_bank_transfer_url_is_gateway_error() -> TestResult {
        let response: BankTransferResponse = decode(br#"{"message": "Gateway down"}"#)?;

        let error = response.into_url().err().ok_or("expected an error")?;

        assert_eq!(error.user_message("fallback"), "Gateway down");

        Ok(())
    }

    #[test]
    fn wallet_rejection_surfaces_return_message() -> TestResult {
        let response: WalletResponse = decode(
            r#"{"return_code": 2, "return_message": "Giao dịch thất bại", "order_url": "https://x"}"#
                .as_bytes(),
        )?;

        let result = response.into_url();

        assert!(
            matches!(&result, Err(ApiError::Gateway { message: Some(m), .. }) if m == "Giao dịch thất bại"),
            "expected Gateway, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn bank_confirmation_carries_shipping_address() -> TestResult {
        let body = serde_json::to_value(BankTransferConfirmation {
            order_code: OrderCode::new("ORD-1")?,
            transaction_ref: "14012345".to_string(),
            amount: Decimal::from(150_000),
            shipping_address: Some(crate::test::address()),
        })?;

        assert_eq!(body["orderCode"], "ORD-1");
        assert_eq!(body["transactionRef"], "14012345");
        assert_eq!(body["shippingAddress"]["ward"], "Bến Nghé");

        Ok(())
    }

    #[test]
    fn wallet_confirmation_serializes_snake_keys() -> TestResult {
        let body = serde_json::to_value(WalletReturn {
            apptransid: "240101_42".to_string(),
            status: "1".to_string(),
            zptransid: Some("999".to_string()),
        })?;

        assert_eq!(body["apptransid"], "240101_42");
        assert_eq!(body["zptransid"], "999");

        Ok(())
    }
}
