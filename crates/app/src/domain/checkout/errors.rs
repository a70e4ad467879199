//! Checkout errors.

use storefront::coupons::PromotionStatus;
use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("coupon code is empty")]
    EmptyCoupon,

    #[error("promotion {code} cannot be used")]
    NotSelectable {
        code: String,
        status: PromotionStatus,
    },

    #[error("coupon was rejected")]
    CouponRejected(#[source] ApiError),

    #[error("could not load promotions")]
    Promotions(#[source] ApiError),
}

impl CheckoutError {
    /// Message to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCoupon => "Please enter a coupon code".to_string(),
            Self::NotSelectable { status, .. } if status.is_expired => {
                "This promotion has expired".to_string()
            }
            Self::NotSelectable { .. } => {
                "Your order does not meet the minimum for this promotion".to_string()
            }
            Self::CouponRejected(error) => error.user_message("This coupon cannot be applied"),
            Self::Promotions(error) => error.user_message("Promotions are unavailable right now"),
        }
    }
}
