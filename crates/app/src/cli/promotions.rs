use clap::Args;
use jiff::Timestamp;
use rust_decimal::Decimal;
use storefront::pricing::format_price;
use storefront_app::{context::AppContext, views};

#[derive(Debug, Args)]
pub(crate) struct PromotionsArgs {
    /// Order total to check eligibility against; defaults to the cart total
    #[arg(long)]
    total: Option<Decimal>,
}

pub(crate) async fn run(context: &AppContext, args: PromotionsArgs) -> Result<(), String> {
    let total = match args.total {
        Some(total) => total,
        None => context
            .carts
            .get_cart()
            .await
            .map_err(|error| error.user_message())?
            .total_price(),
    };

    let options = context
        .checkout_controller()
        .coupon_options(total, Timestamp::now())
        .await
        .map_err(|error| error.user_message())?;

    println!("Order total: {}", format_price(Some(total)));
    println!("{}", views::promotions_table(&options));

    Ok(())
}
