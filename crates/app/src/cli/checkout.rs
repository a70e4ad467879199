use clap::Args;
use storefront::{cart::VariationId, checkout::PaymentMethod};
use storefront_app::{context::AppContext, domain::orders::DispatchOutcome};

use super::report;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Variation ids to order; every line when omitted
    #[arg(long = "select", value_name = "VARIATION")]
    selected: Vec<String>,

    /// Payment method (cash_on_delivery, bank_transfer, online_wallet)
    #[arg(long, default_value = "cash_on_delivery")]
    payment: PaymentMethod,

    /// Coupon code to apply
    #[arg(long)]
    coupon: Option<String>,

    /// Recipient name
    #[arg(long)]
    full_name: String,

    /// Contact phone
    #[arg(long)]
    phone: String,

    /// Contact email
    #[arg(long)]
    email: String,

    /// Province code or name
    #[arg(long)]
    province: String,

    /// District code or name
    #[arg(long)]
    district: String,

    /// Ward code or name
    #[arg(long)]
    ward: String,

    /// Street
    #[arg(long)]
    street: String,

    /// House number, building, floor
    #[arg(long)]
    detail_address: String,
}

pub(crate) async fn run(context: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let mut carts = context.cart_controller();

    carts.load().await.map_err(|error| error.user_message())?;

    if args.selected.is_empty() {
        if let Some(notice) = carts.select_all() {
            report(&notice)?;
        }
    } else {
        for raw in &args.selected {
            let id = VariationId::new(raw.as_str()).map_err(|error| error.to_string())?;

            if !carts.toggle(&id) {
                return Err(format!("{id} is not in the cart"));
            }
        }
    }

    let mut checkout = context.checkout_controller();

    let form = checkout.form_mut();
    form.full_name = args.full_name;
    form.phone = args.phone;
    form.email = args.email;
    form.province = args.province;
    form.district = args.district;
    form.ward = args.ward;
    form.street = args.street;
    form.detail_address = args.detail_address;

    checkout.set_payment_method(args.payment);

    if let Some(code) = args.coupon {
        checkout.set_coupon_input(code);

        let notice = checkout
            .apply_coupon(carts.selected_total())
            .await
            .map_err(|error| error.user_message())?;

        report(&notice)?;
    }

    if let Some(notice) = checkout.reprice(carts.selected_total()) {
        report(&notice)?;
    }

    if let Err(errors) = checkout.validate() {
        for error in errors.iter() {
            eprintln!("  {}", error.message);
        }
    }

    let outcome = context
        .order_dispatcher()
        .checkout(&checkout, &mut carts)
        .await
        .map_err(|error| error.user_message())?;

    report(&outcome.notice())?;

    if let DispatchOutcome::Redirect { url, .. } = &outcome {
        println!("Complete the payment at: {url}");
        println!("Then run: storefront payment-return '<return url>'");
    }

    Ok(())
}
