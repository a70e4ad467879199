//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError, CartId, CartItem, Variation, VariationId,
        quantity::{QuantityCommit, QuantityEditor, QuantityRejection},
        selection::{SelectAll, Selection},
        sequence::{Sequenced, Ticket},
    },
    checkout::{
        FieldError, FormErrors, FormField, LocationCatalog, PaymentMethod, ShippingAddress,
        ShippingForm,
    },
    coupons::{AppliedCoupon, CouponState, DiscountType, Promotion, PromotionStatus},
    identity::{AuthToken, GuestId, Identity, IdentityError},
    notices::{Notice, NoticeLevel},
    orders::{NewOrder, Order, OrderCode, OrderError, OrderStatus, PendingOrder},
    payments::{PaymentReturn, PaymentReturnError, ReturnStatus},
    pricing::{CONTACT_US, DisplayPrice, calculate_discount, format_price, is_valid_price},
};
