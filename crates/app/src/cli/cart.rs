use clap::{Args, Subcommand};
use storefront::cart::{VariationId, selection::Selection};
use storefront_app::{context::AppContext, domain::carts::CartController, views};

use super::report;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart
    Show,
    /// Add a variation to the cart
    Add(AddArgs),
    /// Set the quantity of a line, clamped to stock
    Update(UpdateArgs),
    /// Increase a line's quantity by one
    Increase(LineArgs),
    /// Decrease a line's quantity by one
    Decrease(LineArgs),
    /// Remove a line
    Remove(LineArgs),
    /// Remove several lines
    RemoveMany(RemoveManyArgs),
    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Variation id
    variation: String,

    /// Quantity to add
    #[arg(long, short, default_value_t = 1)]
    quantity: i64,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Variation id
    variation: String,

    /// New quantity
    quantity: String,
}

#[derive(Debug, Args)]
struct LineArgs {
    /// Variation id
    variation: String,
}

#[derive(Debug, Args)]
struct RemoveManyArgs {
    /// Variation ids
    #[arg(required = true)]
    variations: Vec<String>,
}

pub(crate) async fn run(context: &AppContext, command: CartCommand) -> Result<(), String> {
    let mut controller = context.cart_controller();

    if let CartSubcommand::Add(args) = &command.command {
        let cart = context
            .carts
            .add_item(&args.variation, args.quantity)
            .await
            .map_err(|error| error.user_message())?;

        println!("[ok] Added to cart");
        println!("{}", views::cart_table(&cart, &Selection::new()));

        return Ok(());
    }

    controller
        .load()
        .await
        .map_err(|error| error.user_message())?;

    let notice = match command.command {
        CartSubcommand::Show | CartSubcommand::Add(_) => None,
        CartSubcommand::Update(args) => {
            let id = variation_id(&args.variation)?;

            controller.set_draft(&id, args.quantity);
            controller.commit(&id).await
        }
        CartSubcommand::Increase(args) => Some(controller.increase(&variation_id(&args.variation)?).await),
        CartSubcommand::Decrease(args) => Some(controller.decrease(&variation_id(&args.variation)?).await),
        CartSubcommand::Remove(args) => Some(controller.remove(&variation_id(&args.variation)?).await),
        CartSubcommand::RemoveMany(args) => {
            for variation in &args.variations {
                let id = variation_id(variation)?;

                if !controller.toggle(&id) {
                    return Err(format!("{id} is not in the cart"));
                }
            }

            Some(controller.remove_selected().await)
        }
        CartSubcommand::Clear => Some(controller.clear().await),
    };

    if let Some(notice) = notice {
        report(&notice)?;
    }

    print_cart(&controller);

    Ok(())
}

fn variation_id(raw: &str) -> Result<VariationId, String> {
    VariationId::new(raw).map_err(|error| error.to_string())
}

fn print_cart(controller: &CartController) {
    println!("{}", views::cart_table(controller.cart(), controller.selection()));
}
