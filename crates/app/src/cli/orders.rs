use clap::{Args, Subcommand};
use storefront::orders::OrderCode;
use storefront_app::{context::AppContext, views};

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// List your orders, newest first
    List,
    /// Cancel a pending order
    Cancel(OrderArgs),
    /// Confirm a shipped order arrived
    Confirm(OrderArgs),
    /// Start a new gateway payment for an unpaid order
    RetryPayment(OrderArgs),
}

#[derive(Debug, Args)]
struct OrderArgs {
    /// Order code
    code: String,
}

impl OrderArgs {
    fn code(&self) -> Result<OrderCode, String> {
        OrderCode::new(self.code.as_str()).map_err(|error| error.to_string())
    }
}

pub(crate) async fn run(context: &AppContext, command: OrdersCommand) -> Result<(), String> {
    let history = context.order_history();

    match command.command {
        OrdersSubcommand::List => {
            let orders = history.list().await.map_err(|error| error.user_message())?;

            println!("{}", views::orders_table(&orders));
        }
        OrdersSubcommand::Cancel(args) => {
            let order = history
                .cancel(&args.code()?)
                .await
                .map_err(|error| error.user_message())?;

            println!("[ok] Order {} is {}", order.code, order.status);
        }
        OrdersSubcommand::Confirm(args) => {
            let order = history
                .confirm_received(&args.code()?)
                .await
                .map_err(|error| error.user_message())?;

            println!("[ok] Order {} is {}", order.code, order.status);
        }
        OrdersSubcommand::RetryPayment(args) => {
            let url = history
                .retry_payment(&args.code()?)
                .await
                .map_err(|error| error.user_message())?;

            println!("Complete the payment at: {url}");
        }
    }

    Ok(())
}
