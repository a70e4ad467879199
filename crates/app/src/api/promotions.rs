//! Promotion and coupon endpoints.

use std::str::FromStr;

use async_trait::async_trait;
use jiff::{Timestamp, civil::Date, tz::TimeZone};
use mockall::automock;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront::coupons::{DiscountType, Promotion};

use crate::api::{ApiClient, ApiError};

/// Server verdict on a coupon code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponQuote {
    /// Accepted code.
    pub code: String,

    /// Price after the discount.
    pub final_price: Decimal,
}

#[automock]
#[async_trait]
pub trait PromotionsApi: Send + Sync {
    /// Every promotion currently published.
    async fn list_promotions(&self) -> Result<Vec<Promotion>, ApiError>;

    /// Ask the server to price `original_price` with `code` applied.
    async fn apply_coupon(
        &self,
        code: &str,
        original_price: Decimal,
    ) -> Result<CouponQuote, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpPromotionsApi {
    client: ApiClient,
}

impl HttpPromotionsApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyRequest<'a> {
    code: &'a str,
    original_price: Decimal,
}

#[async_trait]
impl PromotionsApi for HttpPromotionsApi {
    #[tracing::instrument(name = "promotions.api.list_promotions", skip(self), err)]
    async fn list_promotions(&self) -> Result<Vec<Promotion>, ApiError> {
        let request = self.client.request(Method::GET, "promotions", None)?;

        let records: Vec<PromotionRecord> = self
            .client
            .send(request)
            .await?
            .data
            .unwrap_or_default();

        records.into_iter().map(Promotion::try_from).collect()
    }

    #[tracing::instrument(name = "promotions.api.apply_coupon", skip(self), err)]
    async fn apply_coupon(
        &self,
        code: &str,
        original_price: Decimal,
    ) -> Result<CouponQuote, ApiError> {
        let request = self
            .client
            .request(Method::POST, "promotions/apply", None)?
            .json(&ApplyRequest {
                code,
                original_price,
            });

        let record: QuoteRecord = self.client.send(request).await?.into_data("coupon quote")?;

        Ok(record.into_quote(code))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromotionRecord {
    code: String,

    description: Option<String>,

    discount_type: DiscountType,

    discount_value: Decimal,

    #[serde(alias = "maxDiscountAmount")]
    max_discount: Option<Decimal>,

    #[serde(alias = "minOrderAmount")]
    min_order_value: Option<Decimal>,

    #[serde(alias = "endDate")]
    expiry_date: Option<String>,
}

impl TryFrom<PromotionRecord> for Promotion {
    type Error = ApiError;

    fn try_from(record: PromotionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            code: record.code,
            description: record.description,
            discount_type: record.discount_type,
            discount_value: record.discount_value,
            max_discount: record.max_discount,
            min_order_value: record.min_order_value,
            expiry_date: record.expiry_date.as_deref().map(parse_expiry).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRecord {
    code: Option<String>,

    #[serde(alias = "discountedPrice", alias = "finalAmount")]
    final_price: Decimal,
}

impl QuoteRecord {
    fn into_quote(self, requested: &str) -> CouponQuote {
        CouponQuote {
            code: self.code.unwrap_or_else(|| requested.to_string()),
            final_price: self.final_price,
        }
    }
}

/// Accept RFC 3339 instants or bare dates, the latter meaning midnight UTC.
fn parse_expiry(raw: &str) -> Result<Timestamp, ApiError> {
    if let Ok(instant) = Timestamp::from_str(raw) {
        return Ok(instant);
    }

    Date::from_str(raw)
        .and_then(|date| date.to_zoned(TimeZone::UTC))
        .map(|zoned| zoned.timestamp())
        .map_err(|error| ApiError::malformed(format!("expiry date {raw}: {error}")))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::api::client::{Envelope, decode};

    #[test]
    fn promotions_are_converted() -> TestResult {
        let envelope: Envelope<Vec<PromotionRecord>> = decode(
            br#"{"data": [
                {"code": "SALE10", "discountType": "percentage", "discountValue": 10,
                 "maxDiscount": 50000, "minOrderValue": 200000,
                 "expiryDate": "2030-01-01T00:00:00.000Z"},
                {"code": "FLAT", "discountType": "fixed", "discountValue": 20000,
                 "endDate": "2030-06-30"}
            ]}"#,
        )?;

        let promotions = envelope
            .into_data("promotions")?
            .into_iter()
            .map(Promotion::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        assert_eq!(promotions.len(), 2);
        assert_eq!(promotions[0].discount_type, DiscountType::Percentage);
        assert_eq!(promotions[0].max_discount, Some(Decimal::from(50_000)));
        assert_eq!(
            promotions[1].expiry_date,
            Some(Timestamp::from_str("2030-06-30T00:00:00Z")?)
        );

        Ok(())
    }

    #[test]
    fn quote_falls_back_to_requested_code() -> TestResult {
        let envelope: Envelope<QuoteRecord> = decode(br#"{"data": {"finalPrice": 90000}}"#)?;

        let quote = envelope.into_data("quote")?.into_quote("SAVE10");

        assert_eq!(quote.code, "SAVE10");
        assert_eq!(quote.final_price, Decimal::from(90_000));

        Ok(())
    }

    #[test]
    fn garbage_expiry_is_malformed() {
        let result = parse_expiry("next tuesday");

        assert!(
            matches!(result, Err(ApiError::Validation(_))),
            "expected Validation, got {result:?}"
        );
    }
}
