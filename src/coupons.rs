//! Coupons
//!
//! Promotion eligibility against an order total, and the coupon field state used at checkout.
//! The server computes the real discounted price; the estimate here is for display only.

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How a promotion's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` percent off the order total.
    #[serde(alias = "percent")]
    Percentage,

    /// `discount_value` off the order total.
    #[serde(alias = "fixed_amount", alias = "amount")]
    Fixed,
}

/// A server-defined discount rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// Code the shopper types or picks.
    pub code: String,

    /// Human description.
    pub description: Option<String>,

    /// Discount kind.
    pub discount_type: DiscountType,

    /// Percent or amount, depending on `discount_type`.
    pub discount_value: Decimal,

    /// Cap on a percentage discount.
    pub max_discount: Option<Decimal>,

    /// Minimum order total for the promotion to apply.
    pub min_order_value: Option<Decimal>,

    /// Instant after which the promotion no longer applies.
    pub expiry_date: Option<Timestamp>,
}

/// Eligibility flags for a promotion against a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionStatus {
    /// The expiry instant has passed.
    pub is_expired: bool,

    /// The order total is below the minimum.
    pub not_meet_min_order: bool,
}

impl PromotionStatus {
    /// Whether the promotion can be picked.
    pub const fn is_selectable(self) -> bool {
        !self.is_expired && !self.not_meet_min_order
    }
}

impl Promotion {
    /// Evaluate eligibility against `order_total` at `now`.
    pub fn status(&self, order_total: Decimal, now: Timestamp) -> PromotionStatus {
        PromotionStatus {
            is_expired: self.expiry_date.is_some_and(|expiry| now >= expiry),
            not_meet_min_order: self
                .min_order_value
                .is_some_and(|minimum| order_total < minimum),
        }
    }

    /// Local estimate of the amount saved on `order_total`, never more than the total.
    pub fn estimated_discount(&self, order_total: Decimal) -> Decimal {
        let discount = match self.discount_type {
            DiscountType::Percentage => {
                let raw = (order_total * self.discount_value / Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

                self.max_discount.map_or(raw, |cap| raw.min(cap))
            }
            DiscountType::Fixed => self.discount_value,
        };

        discount.max(Decimal::ZERO).min(order_total)
    }
}

/// Trim a typed coupon code. Returns `None` when nothing is left.
pub fn normalize_code(code: &str) -> Option<&str> {
    let code = code.trim();

    (!code.is_empty()).then_some(code)
}

/// A coupon accepted by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    /// Accepted code.
    pub code: String,

    /// Total the server priced the coupon against.
    pub original_total: Decimal,

    /// Discounted price reported by the server.
    pub final_amount: Decimal,
}

impl AppliedCoupon {
    /// Whether this price still holds for `total`.
    pub fn prices(&self, total: Decimal) -> bool {
        self.original_total == total
    }
}

/// State of the checkout coupon field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponState {
    input: String,
    applied: Option<AppliedCoupon>,
}

impl CouponState {
    /// Empty field, no coupon applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the coupon field.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Update the field text. Emptying it drops any applied coupon.
    ///
    /// Returns `true` when an applied coupon was dropped.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        self.input = text.into();

        if self.input.is_empty() {
            return self.applied.take().is_some();
        }

        false
    }

    /// Record a coupon the server priced at `final_amount` for `original_total`.
    pub fn accept(
        &mut self,
        code: impl Into<String>,
        original_total: Decimal,
        final_amount: Decimal,
    ) {
        self.applied = Some(AppliedCoupon {
            code: code.into(),
            original_total,
            final_amount,
        });
    }

    /// Drop the applied coupon, leaving the field text alone.
    pub fn reject(&mut self) {
        self.applied = None;
    }

    /// The applied coupon, if any.
    pub fn applied(&self) -> Option<&AppliedCoupon> {
        self.applied.as_ref()
    }

    /// The applied coupon, only if it was priced against `total`.
    pub fn applied_to(&self, total: Decimal) -> Option<&AppliedCoupon> {
        self.applied.as_ref().filter(|applied| applied.prices(total))
    }

    /// Drop the applied coupon when it was priced against a different total.
    ///
    /// Returns the dropped coupon.
    pub fn drop_if_stale(&mut self, total: Decimal) -> Option<AppliedCoupon> {
        if self.applied.as_ref().is_some_and(|applied| !applied.prices(total)) {
            return self.applied.take();
        }

        None
    }

    /// Discounted amount when a coupon is applied.
    pub fn final_amount(&self) -> Option<Decimal> {
        self.applied.as_ref().map(|applied| applied.final_amount)
    }

    /// Amount to charge for `total`: the discounted amount when the coupon was priced against
    /// `total`, otherwise `total` itself.
    pub fn payable(&self, total: Decimal) -> Decimal {
        self.applied_to(total).map_or(total, |applied| applied.final_amount)
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    fn promotion(kind: DiscountType, value: i64) -> Promotion {
        Promotion {
            code: "SALE".to_string(),
            description: None,
            discount_type: kind,
            discount_value: Decimal::from(value),
            max_discount: None,
            min_order_value: None,
            expiry_date: None,
        }
    }

    #[test]
    fn promotion_without_limits_is_selectable() {
        let status = promotion(DiscountType::Fixed, 10).status(Decimal::from(5), Timestamp::now());

        assert!(status.is_selectable());
    }

    #[test]
    fn expired_promotion_is_not_selectable() -> TestResult {
        let now = Timestamp::now();
        let mut promotion = promotion(DiscountType::Fixed, 10);
        promotion.expiry_date = Some(now.checked_sub(SignedDuration::from_hours(1))?);

        let status = promotion.status(Decimal::from(100), now);

        assert!(status.is_expired);
        assert!(!status.is_selectable());

        Ok(())
    }

    #[test]
    fn future_expiry_is_selectable() -> TestResult {
        let now = Timestamp::now();
        let mut promotion = promotion(DiscountType::Fixed, 10);
        promotion.expiry_date = Some(now.checked_add(SignedDuration::from_hours(1))?);

        assert!(promotion.status(Decimal::from(100), now).is_selectable());

        Ok(())
    }

    #[test]
    fn total_below_minimum_is_flagged() {
        let mut promotion = promotion(DiscountType::Percentage, 10);
        promotion.min_order_value = Some(Decimal::from(500));

        let below = promotion.status(Decimal::from(499), Timestamp::now());
        let at = promotion.status(Decimal::from(500), Timestamp::now());

        assert!(below.not_meet_min_order);
        assert!(!at.not_meet_min_order);
    }

    #[test]
    fn percentage_estimate_respects_cap() {
        let mut promotion = promotion(DiscountType::Percentage, 10);

        assert_eq!(
            promotion.estimated_discount(Decimal::from(1_000)),
            Decimal::from(100)
        );

        promotion.max_discount = Some(Decimal::from(30));

        assert_eq!(
            promotion.estimated_discount(Decimal::from(1_000)),
            Decimal::from(30)
        );
    }

    #[test]
    fn fixed_estimate_never_exceeds_total() {
        let promotion = promotion(DiscountType::Fixed, 50);

        assert_eq!(
            promotion.estimated_discount(Decimal::from(20)),
            Decimal::from(20)
        );
    }

    #[test]
    fn blank_codes_normalize_to_none() {
        assert_eq!(normalize_code("   "), None);
        assert_eq!(normalize_code(" SAVE10 "), Some("SAVE10"));
    }

    #[test]
    fn clearing_input_drops_applied_coupon() {
        let mut state = CouponState::new();

        state.set_input("SAVE10");
        state.accept("SAVE10", Decimal::from(100), Decimal::from(90));

        assert_eq!(state.payable(Decimal::from(100)), Decimal::from(90));
        assert!(state.set_input(""));
        assert_eq!(state.final_amount(), None);
        assert_eq!(state.payable(Decimal::from(100)), Decimal::from(100));
    }

    #[test]
    fn editing_input_keeps_applied_coupon() {
        let mut state = CouponState::new();

        state.accept("SAVE10", Decimal::from(100), Decimal::from(90));

        assert!(!state.set_input("SAVE1"));
        assert_eq!(state.final_amount(), Some(Decimal::from(90)));
    }

    #[test]
    fn coupon_priced_for_another_total_is_not_charged() {
        let mut state = CouponState::new();

        state.accept("SAVE10", Decimal::from(1_000), Decimal::from(900));

        assert_eq!(state.payable(Decimal::from(100)), Decimal::from(100));
        assert_eq!(state.applied_to(Decimal::from(100)), None);
        assert_eq!(state.drop_if_stale(Decimal::from(1_000)), None);

        let dropped = state.drop_if_stale(Decimal::from(100));

        assert_eq!(dropped.map(|coupon| coupon.code), Some("SAVE10".to_string()));
        assert_eq!(state.applied(), None);
    }
}
