use clap::{Parser, Subcommand};
use storefront::notices::{Notice, NoticeLevel};
use storefront_app::{config::StorefrontConfig, context::AppContext, observability};

mod auth;
mod cart;
mod checkout;
mod orders;
mod payment_return;
mod promotions;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront cart and checkout CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: StorefrontConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and merge any guest cart into the account
    Login(auth::LoginArgs),
    /// Sign out
    Logout,
    Cart(cart::CartCommand),
    /// List promotions and whether they apply to a total
    Promotions(promotions::PromotionsArgs),
    /// Place an order from selected cart lines
    Checkout(checkout::CheckoutArgs),
    /// Finish a payment from the gateway's return URL
    PaymentReturn(payment_return::PaymentReturnArgs),
    Orders(orders::OrdersCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init(&self.config.logging)
            .map_err(|error| format!("failed to initialize logging: {error}"))?;

        let context = AppContext::from_config(&self.config)
            .map_err(|error| format!("failed to initialize storefront: {error}"))?;

        match self.command {
            Commands::Login(args) => auth::login(&context, args).await,
            Commands::Logout => auth::logout(&context).await,
            Commands::Cart(command) => cart::run(&context, command).await,
            Commands::Promotions(args) => promotions::run(&context, args).await,
            Commands::Checkout(args) => checkout::run(&context, args).await,
            Commands::PaymentReturn(args) => payment_return::run(&context, args).await,
            Commands::Orders(command) => orders::run(&context, command).await,
        }
    }
}

/// Print a notice, failing the command when it reports an error.
fn report(notice: &Notice) -> Result<(), String> {
    if notice.level == NoticeLevel::Error {
        return Err(notice.to_string());
    }

    println!("{notice}");

    Ok(())
}
