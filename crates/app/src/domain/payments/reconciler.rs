//! Gateway return handling.
//!
//! The shopper comes back from the gateway with the outcome in the query string. A successful
//! return is finalized against the server once; anything else sends the shopper back to
//! checkout.

use std::{fmt, sync::Arc, time::Duration};

use storefront::{
    checkout::PaymentMethod,
    notices::Notice,
    orders::OrderCode,
    payments::PaymentReturn,
};
use tracing::{info, warn};

use crate::{
    api::{BankTransferConfirmation, PaymentsApi, WalletReturn},
    domain::{carts::CartService, payments::ReconcileError},
    session::Session,
};

/// Delay before a failed return goes back to checkout.
pub const RETRY_CHECKOUT_DELAY: Duration = Duration::from_secs(3);

/// Where a return leaves the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileState {
    /// The server accepted the payment.
    Completed { order_code: Option<OrderCode> },

    /// Finalization failed. Not retried; the order stays visible in order history.
    Failed,

    /// The gateway reported a failure; go back to checkout after `after`.
    RetryCheckout { after: Duration },
}

/// Result of handling one gateway return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub state: ReconcileState,
    pub notice: Notice,
}

impl Reconciliation {
    pub fn is_completed(&self) -> bool {
        matches!(self.state, ReconcileState::Completed { .. })
    }
}

/// Handles a single gateway return. [`Self::reconcile`] takes the reconciler by value so the
/// same return cannot be finalized twice.
pub struct PaymentReturnReconciler {
    payments: Arc<dyn PaymentsApi>,
    carts: CartService,
    session: Session,
}

impl fmt::Debug for PaymentReturnReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentReturnReconciler")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl PaymentReturnReconciler {
    #[must_use]
    pub fn new(payments: Arc<dyn PaymentsApi>, carts: CartService, session: Session) -> Self {
        Self {
            payments,
            carts,
            session,
        }
    }

    /// Parse a return URL or query string and reconcile it.
    pub async fn reconcile_url(self, input: &str) -> Reconciliation {
        match PaymentReturn::parse(input) {
            Ok(params) => self.reconcile(&params).await,
            Err(error) => {
                warn!(%error, "unreadable payment return");

                failed(&ReconcileError::from(error))
            }
        }
    }

    #[tracing::instrument(
        name = "payments.reconciler.reconcile",
        skip(self, params),
        fields(method = ?params.method, status = ?params.status)
    )]
    pub async fn reconcile(self, params: &PaymentReturn) -> Reconciliation {
        if !params.is_success() {
            info!(raw_status = ?params.raw_status, "payment not completed");

            return Reconciliation {
                state: ReconcileState::RetryCheckout {
                    after: RETRY_CHECKOUT_DELAY,
                },
                notice: Notice::error("Payment failed or was canceled. Returning to checkout."),
            };
        }

        match self.finalize(params).await {
            Ok(order_code) => {
                if let Err(error) = self.session.clear_payment_snapshots() {
                    warn!(%error, "failed to clear payment snapshots");
                }

                if let Err(error) = self.carts.get_cart().await {
                    warn!(%error, "failed to refresh cart after payment");
                }

                let message = match &order_code {
                    Some(code) => format!("Payment received. Order {code} is confirmed"),
                    None => "Payment received. Your order is confirmed".to_string(),
                };

                Reconciliation {
                    state: ReconcileState::Completed { order_code },
                    notice: Notice::success(message),
                }
            }
            Err(error) => {
                warn!(%error, "payment finalization failed");

                failed(&error)
            }
        }
    }

    async fn finalize(&self, params: &PaymentReturn) -> Result<Option<OrderCode>, ReconcileError> {
        let identity = self.session.resolve_identity()?;

        match params.method {
            Some(PaymentMethod::BankTransfer) => {
                let pending = self.session.pending_order()?;

                let order_code = match (&pending, &params.reference) {
                    (Some(pending), _) => pending.order_code.clone(),
                    (None, Some(reference)) => {
                        OrderCode::new(reference.clone()).map_err(|_empty| ReconcileError::MissingOrder)?
                    }
                    (None, None) => return Err(ReconcileError::MissingOrder),
                };

                let amount = params
                    .amount
                    .or_else(|| pending.as_ref().map(|pending| pending.amount))
                    .ok_or(ReconcileError::MissingOrder)?;

                let transaction_ref = params
                    .transaction_no
                    .clone()
                    .or_else(|| params.reference.clone())
                    .unwrap_or_else(|| order_code.to_string());

                let shipping_address = match pending.and_then(|pending| pending.shipping_address) {
                    Some(address) => Some(address),
                    None => self.session.shipping_address()?,
                };
                let has_address = shipping_address.is_some();

                self.payments
                    .confirm_bank_transfer(
                        &identity,
                        &BankTransferConfirmation {
                            order_code: order_code.clone(),
                            transaction_ref,
                            amount,
                            shipping_address,
                        },
                    )
                    .await
                    .map_err(ReconcileError::Finalize)?;

                info!(
                    order_code = %order_code,
                    has_address,
                    "bank transfer confirmed"
                );

                Ok(Some(order_code))
            }
            Some(PaymentMethod::OnlineWallet) => {
                let apptransid = params
                    .reference
                    .clone()
                    .ok_or(ReconcileError::MissingOrder)?;

                self.payments
                    .wallet_return(&WalletReturn {
                        apptransid,
                        status: params.raw_status.clone().unwrap_or_default(),
                        zptransid: params.transaction_no.clone(),
                    })
                    .await
                    .map_err(ReconcileError::Finalize)?;

                let order_code = self.session.order_code()?;

                info!(order_code = ?order_code.as_ref().map(OrderCode::as_str), "wallet payment confirmed");

                Ok(order_code)
            }
            Some(PaymentMethod::CashOnDelivery) | None => Err(ReconcileError::UnknownGateway),
        }
    }
}

fn failed(error: &ReconcileError) -> Reconciliation {
    Reconciliation {
        state: ReconcileState::Failed,
        notice: Notice::error(error.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use storefront::{notices::NoticeLevel, orders::PendingOrder};
    use testresult::TestResult;

    use super::*;
    use crate::{
        api::{ApiError, carts::MockCartsApi, payments::MockPaymentsApi},
        test::{address, cart, payload},
    };

    fn refreshing_cart() -> TestResult<MockCartsApi> {
        let mut carts = MockCartsApi::new();
        let current = cart(&[("v-9", 10_000, 3, 1)])?;
        carts
            .expect_get_cart()
            .times(1)
            .returning(move |_| Ok(payload(current.clone())));

        Ok(carts)
    }

    fn reconciler(payments: MockPaymentsApi, carts: MockCartsApi, session: &Session) -> PaymentReturnReconciler {
        PaymentReturnReconciler::new(
            Arc::new(payments),
            CartService::new(Arc::new(carts), session.clone()),
            session.clone(),
        )
    }

    fn pending_bank_order(session: &Session) -> TestResult {
        session.save_pending_order(&PendingOrder {
            order_code: OrderCode::new("ORD-1")?,
            payment_method: PaymentMethod::BankTransfer,
            amount: Decimal::from(150_000),
            shipping_address: Some(address()),
        })?;
        session.save_shipping_address(&address())?;

        Ok(())
    }

    #[tokio::test]
    async fn failed_status_returns_to_checkout() -> TestResult {
        let mut payments = MockPaymentsApi::new();
        payments.expect_confirm_bank_transfer().never();

        let mut carts = MockCartsApi::new();
        carts.expect_get_cart().never();

        let session = Session::in_memory();
        pending_bank_order(&session)?;

        let result = reconciler(payments, carts, &session)
            .reconcile_url("https://shop.example/payment-return?vnp_ResponseCode=24&vnp_TxnRef=ORD-1")
            .await;

        assert_eq!(
            result.state,
            ReconcileState::RetryCheckout {
                after: Duration::from_secs(3)
            }
        );
        assert_eq!(result.notice.level, NoticeLevel::Error);
        assert!(session.pending_order()?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn missing_status_returns_to_checkout() -> TestResult {
        let result = reconciler(MockPaymentsApi::new(), MockCartsApi::new(), &Session::in_memory())
            .reconcile_url("?foo=bar")
            .await;

        assert!(
            matches!(result.state, ReconcileState::RetryCheckout { .. }),
            "expected RetryCheckout, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn successful_bank_transfer_is_confirmed_once() -> TestResult {
        let mut payments = MockPaymentsApi::new();
        payments
            .expect_confirm_bank_transfer()
            .withf(|_, confirmation| {
                confirmation.order_code.as_str() == "ORD-1"
                    && confirmation.transaction_ref == "14012345"
                    && confirmation.amount == Decimal::from(150_000)
                    && confirmation.shipping_address == Some(address())
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let session = Session::in_memory();
        pending_bank_order(&session)?;

        let result = reconciler(payments, refreshing_cart()?, &session)
            .reconcile_url(
                "https://shop.example/payment-return?vnp_Amount=15000000&vnp_ResponseCode=00&vnp_TxnRef=ORD-1&vnp_TransactionNo=14012345",
            )
            .await;

        assert_eq!(
            result.state,
            ReconcileState::Completed {
                order_code: Some(OrderCode::new("ORD-1")?)
            }
        );
        assert_eq!(result.notice.level, NoticeLevel::Success);
        assert_eq!(session.pending_order()?, None);

        Ok(())
    }

    #[tokio::test]
    async fn finalize_failure_is_terminal() -> TestResult {
        let mut payments = MockPaymentsApi::new();
        payments
            .expect_confirm_bank_transfer()
            .times(1)
            .returning(|_, _| {
                Err(ApiError::Gateway {
                    status: 500,
                    message: Some("Invalid checksum".to_string()),
                })
            });

        let mut carts = MockCartsApi::new();
        carts.expect_get_cart().never();

        let session = Session::in_memory();
        pending_bank_order(&session)?;

        let result = reconciler(payments, carts, &session)
            .reconcile_url("vnp_Amount=15000000&vnp_ResponseCode=00&vnp_TxnRef=ORD-1")
            .await;

        assert_eq!(result.state, ReconcileState::Failed);
        assert_eq!(result.notice.message, "Invalid checksum");
        assert!(session.pending_order()?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn wallet_return_is_reported_with_order_code() -> TestResult {
        let mut payments = MockPaymentsApi::new();
        payments
            .expect_wallet_return()
            .withf(|params| {
                params.apptransid == "250101_ORD-2"
                    && params.status == "1"
                    && params.zptransid.as_deref() == Some("990001")
            })
            .times(1)
            .returning(|_| Ok(()));

        let session = Session::in_memory();
        session.save_order_code(&OrderCode::new("ORD-2")?)?;

        let result = reconciler(payments, refreshing_cart()?, &session)
            .reconcile_url("apptransid=250101_ORD-2&status=1&zptransid=990001&amount=150000")
            .await;

        assert!(result.is_completed(), "expected Completed, got {result:?}");
        assert_eq!(session.order_code()?, None);

        Ok(())
    }

    #[tokio::test]
    async fn bank_return_without_snapshot_or_reference_fails() -> TestResult {
        let mut payments = MockPaymentsApi::new();
        payments.expect_confirm_bank_transfer().never();

        let result = reconciler(payments, MockCartsApi::new(), &Session::in_memory())
            .reconcile_url("vnp_ResponseCode=00&vnp_Amount=100")
            .await;

        assert_eq!(result.state, ReconcileState::Failed);

        Ok(())
    }

    #[tokio::test]
    async fn bank_return_without_snapshot_uses_saved_address() -> TestResult {
        let mut payments = MockPaymentsApi::new();
        payments
            .expect_confirm_bank_transfer()
            .withf(|_, confirmation| {
                confirmation.order_code.as_str() == "ORD-5"
                    && confirmation.amount == Decimal::from(1)
                    && confirmation.shipping_address == Some(address())
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let session = Session::in_memory();
        session.save_shipping_address(&address())?;

        let result = reconciler(payments, refreshing_cart()?, &session)
            .reconcile_url("vnp_ResponseCode=00&vnp_Amount=100&vnp_TxnRef=ORD-5")
            .await;

        assert_eq!(
            result.state,
            ReconcileState::Completed {
                order_code: Some(OrderCode::new("ORD-5")?)
            }
        );

        Ok(())
    }
}
