use clap::Args;
use storefront_app::{
    context::AppContext,
    domain::payments::ReconcileState,
};

#[derive(Debug, Args)]
pub(crate) struct PaymentReturnArgs {
    /// Return URL or query string the gateway redirected to
    url: String,
}

pub(crate) async fn run(context: &AppContext, args: PaymentReturnArgs) -> Result<(), String> {
    let reconciliation = context.payment_return().reconcile_url(&args.url).await;

    match reconciliation.state {
        ReconcileState::Completed { .. } => {
            println!("{}", reconciliation.notice);

            Ok(())
        }
        ReconcileState::RetryCheckout { after } => {
            println!("{}", reconciliation.notice);

            tokio::time::sleep(after).await;

            Err("Run `storefront checkout` again to retry the payment".to_string())
        }
        ReconcileState::Failed => Err(reconciliation.notice.to_string()),
    }
}
