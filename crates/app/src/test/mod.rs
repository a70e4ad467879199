//! Test fixtures shared by the service and controller tests.

use rust_decimal::Decimal;
use storefront::{
    cart::{Cart, CartId, CartItem, Variation, VariationId},
    checkout::{PaymentMethod, ShippingAddress, ShippingForm},
    identity::GuestId,
    orders::{Order, OrderCode, OrderStatus},
};
use testresult::TestResult;

use crate::api::CartPayload;

pub(crate) fn variation(id: &str, price: i64, stock: u32) -> TestResult<Variation> {
    Ok(Variation {
        id: VariationId::new(id)?,
        product_name: format!("Product {id}"),
        sale_price: None,
        final_price: Some(Decimal::from(price)),
        stock_quantity: stock,
        color: None,
        size: None,
        material: None,
    })
}

/// A cart with id `cart-1` holding `(variation id, unit price, stock, quantity)` lines.
pub(crate) fn cart(lines: &[(&str, i64, u32, u32)]) -> TestResult<Cart> {
    let items = lines
        .iter()
        .map(|&(id, price, stock, quantity)| Ok(CartItem::new(variation(id, price, stock)?, quantity)?))
        .collect::<TestResult<Vec<_>>>()?;

    let total = items.iter().map(CartItem::line_total).sum();

    Ok(Cart::new(Some(CartId::new("cart-1")?), items, total)?)
}

pub(crate) fn payload(cart: Cart) -> CartPayload {
    CartPayload {
        cart,
        guest_id: None,
    }
}

pub(crate) fn payload_with_guest(cart: Cart, guest: &str) -> CartPayload {
    CartPayload {
        cart,
        guest_id: GuestId::new(guest).ok(),
    }
}

pub(crate) fn order(code: &str, status: OrderStatus, method: PaymentMethod) -> TestResult<Order> {
    Ok(Order {
        code: OrderCode::new(code)?,
        status,
        payment_method: method,
        final_amount: Decimal::from(150_000),
        is_paid: false,
        created_at: None,
    })
}

pub(crate) fn shipping_form() -> ShippingForm {
    ShippingForm {
        full_name: "Nguyen Van A".to_string(),
        phone: "0901234567".to_string(),
        email: "a@example.com".to_string(),
        province: "79".to_string(),
        district: "760".to_string(),
        ward: "26740".to_string(),
        street: "Le Loi".to_string(),
        detail_address: "12A".to_string(),
    }
}

pub(crate) fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Nguyen Van A".to_string(),
        phone: "0901234567".to_string(),
        email: "a@example.com".to_string(),
        province: "Hồ Chí Minh".to_string(),
        district: "Quận 1".to_string(),
        ward: "Bến Nghé".to_string(),
        street: "Le Loi".to_string(),
        detail_address: "12A".to_string(),
    }
}
