//! Shipping validation, coupon state and payment return parsing.

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use storefront::prelude::*;
use testresult::TestResult;

fn form() -> ShippingForm {
    ShippingForm {
        full_name: "Tran Thi B".to_string(),
        phone: "0912345678".to_string(),
        email: "b@example.com".to_string(),
        province: "01".to_string(),
        district: "001".to_string(),
        ward: "00001".to_string(),
        street: "Doi Can".to_string(),
        detail_address: "Apt 4".to_string(),
    }
}

#[test]
fn valid_form_resolves_location_names() -> TestResult {
    let catalog = LocationCatalog::builtin()?;

    let address = form().validate(&catalog)?;

    assert_eq!(address.province, "Hà Nội");
    assert_eq!(address.district, "Ba Đình");
    assert_eq!(address.ward, "Phúc Xá");

    Ok(())
}

#[test]
fn every_invalid_field_is_reported() -> TestResult {
    let catalog = LocationCatalog::builtin()?;

    let mut invalid = form();
    invalid.email = "not-an-email".to_string();
    invalid.district = "999".to_string();

    let errors = invalid.validate(&catalog).err().ok_or("expected errors")?;

    assert!(errors.message(FormField::Email).is_some(), "email should be flagged");
    assert!(errors.message(FormField::District).is_some(), "district should be flagged");
    assert!(
        errors.message(FormField::Ward).is_none(),
        "ward is not reported until its district resolves"
    );

    Ok(())
}

#[test]
fn coupon_state_resets_on_rejection_and_clear() {
    let mut coupon = CouponState::new();

    coupon.set_input("SAVE10");
    coupon.accept("SAVE10", Decimal::from(1_000), Decimal::from(900));
    assert_eq!(coupon.payable(Decimal::from(1_000)), Decimal::from(900));

    coupon.reject();
    assert_eq!(coupon.final_amount(), None);
    assert_eq!(coupon.payable(Decimal::from(1_000)), Decimal::from(1_000));

    coupon.accept("SAVE10", Decimal::from(1_000), Decimal::from(900));
    assert!(coupon.set_input(""), "clearing the field should drop the applied coupon");
    assert_eq!(coupon.applied(), None);
}

#[test]
fn promotion_eligibility() -> TestResult {
    let now = Timestamp::now();

    let promotion = Promotion {
        code: "TET".to_string(),
        description: None,
        discount_type: DiscountType::Percentage,
        discount_value: Decimal::from(20),
        max_discount: Some(Decimal::from(50_000)),
        min_order_value: Some(Decimal::from(200_000)),
        expiry_date: Some(now.checked_add(SignedDuration::from_hours(1))?),
    };

    let status = promotion.status(Decimal::from(500_000), now);
    assert!(status.is_selectable(), "expected a selectable promotion, got {status:?}");
    assert_eq!(promotion.estimated_discount(Decimal::from(500_000)), Decimal::from(50_000));

    let below = promotion.status(Decimal::from(100_000), now);
    assert!(below.not_meet_min_order, "expected the minimum to fail");

    let later = now.checked_add(SignedDuration::from_hours(2))?;
    assert!(promotion.status(Decimal::from(500_000), later).is_expired, "expected expiry");

    Ok(())
}

#[test]
fn bank_transfer_return_is_decoded() -> TestResult {
    let params = PaymentReturn::parse(
        "https://shop.example/payment-return?vnp_Amount=15000000&vnp_ResponseCode=00&vnp_TxnRef=ORD-1&vnp_TransactionNo=14012345",
    )?;

    assert_eq!(params.method, Some(PaymentMethod::BankTransfer));
    assert!(params.is_success(), "response code 00 means success");
    assert_eq!(params.amount, Some(Decimal::from(150_000)));
    assert_eq!(params.reference.as_deref(), Some("ORD-1"));

    Ok(())
}

#[test]
fn wallet_failure_and_missing_status() -> TestResult {
    let failed = PaymentReturn::parse("apptransid=250101_ORD-2&status=-49")?;
    assert_eq!(failed.status, ReturnStatus::Failed);

    let missing = PaymentReturn::parse("https://shop.example/payment-return")?;
    assert_eq!(missing.status, ReturnStatus::Missing);

    Ok(())
}

#[test]
fn only_unpaid_gateway_orders_can_be_paid_again() -> TestResult {
    let mut order = Order {
        code: OrderCode::new("ORD-5")?,
        status: OrderStatus::Pending,
        payment_method: PaymentMethod::OnlineWallet,
        final_amount: Decimal::from(99_000),
        is_paid: false,
        created_at: None,
    };

    assert_eq!(order.ensure_payable(), Ok(()));
    assert_eq!(order.ensure_cancelable(), Ok(()));

    order.is_paid = true;
    assert!(order.ensure_payable().is_err(), "paid orders have nothing to pay");

    order.status = OrderStatus::Shipping;
    assert!(order.ensure_cancelable().is_err(), "shipping orders cannot be canceled");
    assert_eq!(order.ensure_receivable(), Ok(()));

    Ok(())
}
