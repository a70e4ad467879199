//! Terminal tables for carts, promotions and orders.

use storefront::{
    cart::{Cart, selection::Selection},
    orders::Order,
    pricing::format_price,
};
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Style, Theme, object::Columns},
};

use crate::domain::checkout::CouponOption;

/// Cart lines with their selection marks, followed by the cart total.
pub fn cart_table(cart: &Cart, selection: &Selection) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut builder = Builder::default();

    builder.push_record(["", "Variation", "Product", "Options", "Stock", "Qty", "Unit", "Total"]);

    for item in cart.items() {
        let variation = item.variation();

        builder.push_record([
            if selection.is_selected(item.id()) { "[x]" } else { "[ ]" }.to_string(),
            item.id().to_string(),
            variation.product_name.clone(),
            variation.options_label(),
            item.stock().to_string(),
            item.quantity().to_string(),
            format_price(variation.unit_price()),
            format_price(Some(item.line_total())),
        ]);
    }

    let table = finish(builder, 4..8);

    format!(
        "{table}\nCart total: {}\nSelected: {} item(s), {}",
        format_price(Some(cart.total_price())),
        selection.len(),
        format_price(Some(selection.selected_total(cart)))
    )
}

/// Promotions with their eligibility for the current total.
pub fn promotions_table(options: &[CouponOption]) -> String {
    if options.is_empty() {
        return "No promotions available.".to_string();
    }

    let mut builder = Builder::default();

    builder.push_record(["Code", "Description", "Min. order", "Expires", "Est. discount", "Status"]);

    for option in options {
        let promotion = &option.promotion;

        let status = if option.status.is_expired {
            "expired"
        } else if option.status.not_meet_min_order {
            "below minimum"
        } else {
            "available"
        };

        builder.push_record([
            promotion.code.clone(),
            promotion.description.clone().unwrap_or_default(),
            promotion
                .min_order_value
                .map_or_else(String::new, |min| format_price(Some(min))),
            promotion
                .expiry_date
                .map_or_else(String::new, |expiry| expiry.strftime("%Y-%m-%d").to_string()),
            format_price(Some(option.estimated_discount)),
            status.to_string(),
        ]);
    }

    finish(builder, 2..3).to_string()
}

/// Orders, newest first as given.
pub fn orders_table(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders yet.".to_string();
    }

    let mut builder = Builder::default();

    builder.push_record(["Order", "Placed", "Status", "Payment", "Paid", "Amount"]);

    for order in orders {
        builder.push_record([
            order.code.to_string(),
            order.created_at.map_or_else(String::new, |created| {
                created.strftime("%Y-%m-%d %H:%M").to_string()
            }),
            order.status.to_string(),
            order.payment_method.to_string(),
            if order.is_paid { "yes" } else { "no" }.to_string(),
            format_price(Some(order.final_amount)),
        ]);
    }

    finish(builder, 5..6).to_string()
}

fn finish(builder: Builder, numeric: std::ops::Range<usize>) -> Table {
    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Columns::new(numeric), Alignment::right());

    table
}
