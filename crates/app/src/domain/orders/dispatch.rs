//! Order submission and payment dispatch.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use storefront::{
    cart::{CartId, VariationId},
    checkout::{FormErrors, PaymentMethod, ShippingAddress},
    notices::Notice,
    orders::{NewOrder, Order},
    pricing::format_price,
};
use tracing::{Span, info};

use crate::{
    api::{OrdersApi, PaymentsApi},
    domain::{
        carts::CartController,
        checkout::CheckoutController,
        orders::{OrderDispatchError, payment::start_payment},
    },
    session::Session,
};

/// Everything needed to place an order, gathered from the cart and checkout pages.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub address: Result<ShippingAddress, FormErrors>,
    pub cart_id: Option<CartId>,
    pub selected: Vec<VariationId>,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
    pub final_amount: Decimal,
}

impl CheckoutRequest {
    /// Snapshot the current page state.
    ///
    /// A coupon priced against a different total than the current selection is left out.
    #[must_use]
    pub fn gather(checkout: &CheckoutController, carts: &CartController) -> Self {
        let total = carts.selected_total();

        Self {
            address: checkout.validate(),
            cart_id: carts.cart().id().cloned(),
            selected: carts.selection().ids(),
            payment_method: checkout.payment_method(),
            coupon_code: checkout
                .coupon()
                .applied_to(total)
                .map(|coupon| coupon.code.clone()),
            final_amount: checkout.payable_amount(total),
        }
    }
}

/// How a placed order continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Cash on delivery: nothing left to do.
    Confirmed { order: Order },

    /// Send the shopper to the gateway.
    Redirect { order: Order, url: String },
}

impl DispatchOutcome {
    pub fn order(&self) -> &Order {
        match self {
            Self::Confirmed { order } | Self::Redirect { order, .. } => order,
        }
    }

    pub fn notice(&self) -> Notice {
        match self {
            Self::Confirmed { order } => Notice::success(format!(
                "Order {} placed. You will pay {} on delivery",
                order.code,
                format_price(Some(order.final_amount))
            )),
            Self::Redirect { order, .. } => Notice::info(format!(
                "Order {} created. Redirecting to payment",
                order.code
            )),
        }
    }
}

pub struct OrderDispatcher {
    orders: Arc<dyn OrdersApi>,
    payments: Arc<dyn PaymentsApi>,
    session: Session,
}

impl fmt::Debug for OrderDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderDispatcher")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl OrderDispatcher {
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

    /// Place an order from the page state and clear the cart selection once it is placed.
    ///
    /// # Errors
    ///
    /// As [`Self::submit`].
    pub async fn checkout(
        &self,
        checkout: &CheckoutController,
        carts: &mut CartController,
    ) -> Result<DispatchOutcome, OrderDispatchError> {
        let outcome = self.submit(CheckoutRequest::gather(checkout, carts)).await?;

        carts.clear_selection();

        Ok(outcome)
    }

    /// Check preconditions, create the order, then start its payment.
    ///
    /// A payment start failure leaves the order pending on the server; it is reported with the
    /// order so it can be paid later from order history.
    ///
    /// # Errors
    ///
    /// - [`OrderDispatchError::InvalidForm`], [`OrderDispatchError::EmptySelection`],
    ///   [`OrderDispatchError::MissingCart`]: checked in that order, before any request.
    /// - [`OrderDispatchError::OrderFailed`]: the order was not created.
    /// - [`OrderDispatchError::PaymentFailed`]: the order exists but the gateway failed.
    #[tracing::instrument(
        name = "orders.dispatch.submit",
        skip(self, request),
        fields(
            payment_method = %request.payment_method,
            order_code = tracing::field::Empty
        ),
        err
    )]
    pub async fn submit(
        &self,
        request: CheckoutRequest,
    ) -> Result<DispatchOutcome, OrderDispatchError> {
        let address = request.address.map_err(OrderDispatchError::InvalidForm)?;

        if request.selected.is_empty() {
            return Err(OrderDispatchError::EmptySelection);
        }

        let cart_id = request.cart_id.ok_or(OrderDispatchError::MissingCart)?;

        let identity = self.session.resolve_identity()?;

        let order = self
            .orders
            .create_order(
                &identity,
                &NewOrder {
                    shipping_address: address.clone(),
                    payment_method: request.payment_method,
                    cart_id,
                    coupon_code: request.coupon_code,
                    final_amount: request.final_amount,
                },
            )
            .await
            .map_err(OrderDispatchError::OrderFailed)?;

        Span::current().record("order_code", order.code.as_str());
        info!(order_code = %order.code, "order created");

        self.session.save_shipping_address(&address)?;

        match start_payment(&*self.payments, &self.session, &order, Some(address)).await {
            Ok(None) => Ok(DispatchOutcome::Confirmed { order }),
            Ok(Some(url)) => Ok(DispatchOutcome::Redirect { order, url }),
            Err(source) => Err(OrderDispatchError::PaymentFailed { order, source }),
        }
    }
}
