//! Gateway payment start, shared by checkout and order history.

use storefront::{
    checkout::{PaymentMethod, ShippingAddress},
    orders::{Order, PendingOrder},
};
use tracing::info;

use crate::{api::PaymentsApi, domain::orders::PaymentStartError, session::Session};

/// Request a gateway URL for `order`. Cash on delivery needs none and returns `None`.
///
/// Bank transfers persist the pending-order snapshot before asking for the URL; wallet payments
/// persist the order code once the URL is issued.
pub(crate) async fn start_payment(
    payments: &dyn PaymentsApi,
    session: &Session,
    order: &Order,
    shipping_address: Option<ShippingAddress>,
) -> Result<Option<String>, PaymentStartError> {
    match order.payment_method {
        PaymentMethod::CashOnDelivery => Ok(None),
        PaymentMethod::BankTransfer => {
            session.save_pending_order(&PendingOrder {
                order_code: order.code.clone(),
                payment_method: order.payment_method,
                amount: order.final_amount,
                shipping_address,
            })?;

            let url = payments.create_bank_transfer(order.final_amount).await?;

            info!(order_code = %order.code, "bank transfer started");

            Ok(Some(url))
        }
        PaymentMethod::OnlineWallet => {
            let url = payments.create_wallet_payment(&order.code).await?;

            session.save_order_code(&order.code)?;

            info!(order_code = %order.code, "wallet payment started");

            Ok(Some(url))
        }
    }
}
