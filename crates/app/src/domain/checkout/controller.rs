//! Checkout page state: shipping form, payment method and coupon.

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use rust_decimal::Decimal;
use storefront::{
    checkout::{FormErrors, LocationCatalog, PaymentMethod, ShippingAddress, ShippingForm},
    coupons::{CouponState, Promotion, PromotionStatus, normalize_code},
    notices::Notice,
    pricing::format_price,
};
use tracing::info;

use crate::{api::PromotionsApi, domain::checkout::CheckoutError};

/// A promotion as listed at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponOption {
    pub promotion: Promotion,
    pub status: PromotionStatus,

    /// Local estimate for display; the server price is authoritative.
    pub estimated_discount: Decimal,
}

impl CouponOption {
    /// Evaluate `promotion` against `order_total` at `now`.
    #[must_use]
    pub fn evaluate(promotion: Promotion, order_total: Decimal, now: Timestamp) -> Self {
        Self {
            status: promotion.status(order_total, now),
            estimated_discount: promotion.estimated_discount(order_total),
            promotion,
        }
    }
}

pub struct CheckoutController {
    promotions: Arc<dyn PromotionsApi>,
    catalog: Arc<LocationCatalog>,
    form: ShippingForm,
    payment_method: PaymentMethod,
    coupon: CouponState,
}

impl fmt::Debug for CheckoutController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutController")
            .field("form", &self.form)
            .field("payment_method", &self.payment_method)
            .field("coupon", &self.coupon)
            .finish_non_exhaustive()
    }
}

impl CheckoutController {
    #[must_use]
    pub fn new(promotions: Arc<dyn PromotionsApi>, catalog: Arc<LocationCatalog>) -> Self {
        Self {
            promotions,
            catalog,
            form: ShippingForm::default(),
            payment_method: PaymentMethod::CashOnDelivery,
            coupon: CouponState::new(),
        }
    }

    pub fn form(&self) -> &ShippingForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ShippingForm {
        &mut self.form
    }

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn coupon(&self) -> &CouponState {
        &self.coupon
    }

    /// Validate the shipping form, reporting every invalid field.
    ///
    /// # Errors
    ///
    /// Returns [`FormErrors`] when any field is invalid.
    pub fn validate(&self) -> Result<ShippingAddress, FormErrors> {
        self.form.validate(&self.catalog)
    }

    /// Update the coupon field. Emptying it drops the applied coupon without a request.
    pub fn set_coupon_input(&mut self, text: impl Into<String>) -> Option<Notice> {
        self.coupon
            .set_input(text)
            .then(|| Notice::info("Coupon removed"))
    }

    /// Price `order_total` with the code in the coupon field.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCoupon`]: the field is blank; nothing is sent.
    /// - [`CheckoutError::CouponRejected`]: the server refused the code; the discount is reset.
    #[tracing::instrument(name = "checkout.controller.apply_coupon", skip(self), err)]
    pub async fn apply_coupon(&mut self, order_total: Decimal) -> Result<Notice, CheckoutError> {
        let Some(code) = normalize_code(self.coupon.input()).map(str::to_string) else {
            return Err(CheckoutError::EmptyCoupon);
        };

        match self.promotions.apply_coupon(&code, order_total).await {
            Ok(quote) => {
                info!(code = %quote.code, final_price = %quote.final_price, "coupon applied");

                let message = format!(
                    "Coupon {} applied. You pay {}",
                    quote.code,
                    format_price(Some(quote.final_price))
                );
                self.coupon.accept(quote.code, order_total, quote.final_price);

                Ok(Notice::success(message))
            }
            Err(error) => {
                self.coupon.reject();

                Err(CheckoutError::CouponRejected(error))
            }
        }
    }

    /// Promotions with their eligibility against `order_total`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Promotions`] when the list cannot be fetched.
    #[tracing::instrument(name = "checkout.controller.coupon_options", skip(self), err)]
    pub async fn coupon_options(
        &self,
        order_total: Decimal,
        now: Timestamp,
    ) -> Result<Vec<CouponOption>, CheckoutError> {
        let promotions = self
            .promotions
            .list_promotions()
            .await
            .map_err(CheckoutError::Promotions)?;

        Ok(promotions
            .into_iter()
            .map(|promotion| CouponOption::evaluate(promotion, order_total, now))
            .collect())
    }

    /// Put a listed promotion's code in the field and apply it.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotSelectable`] without a request when the promotion is expired
    /// or the total is below its minimum, otherwise as [`Self::apply_coupon`].
    pub async fn select_promotion(
        &mut self,
        option: &CouponOption,
        order_total: Decimal,
    ) -> Result<Notice, CheckoutError> {
        if !option.status.is_selectable() {
            return Err(CheckoutError::NotSelectable {
                code: option.promotion.code.clone(),
                status: option.status,
            });
        }

        self.coupon.set_input(option.promotion.code.clone());

        self.apply_coupon(order_total).await
    }

    /// Drop a coupon priced against a different total, e.g. after the selection changed.
    pub fn reprice(&mut self, selected_total: Decimal) -> Option<Notice> {
        let dropped = self.coupon.drop_if_stale(selected_total)?;

        info!(code = %dropped.code, "dropped coupon priced for another total");

        Some(Notice::warning(format!(
            "Your selection changed. Apply coupon {} again",
            dropped.code
        )))
    }

    /// Amount to charge: the coupon price when it was priced against `selected_total`,
    /// `selected_total` otherwise.
    pub fn payable_amount(&self, selected_total: Decimal) -> Decimal {
        self.coupon.payable(selected_total)
    }
}
