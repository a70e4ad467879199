//! Checkout
//!
//! Shipping form validation and payment method selection. Validation checks every field and
//! reports all violations together rather than stopping at the first.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

pub mod locations;

pub use locations::{District, LocationCatalog, LocationCatalogError, Province, Ward};

const PHONE_MIN_DIGITS: usize = 9;
const PHONE_MAX_DIGITS: usize = 11;

/// Shipping form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// Recipient name.
    FullName,
    /// Contact phone.
    Phone,
    /// Contact email.
    Email,
    /// Province selection.
    Province,
    /// District selection.
    District,
    /// Ward selection.
    Ward,
    /// Street.
    Street,
    /// House number, building, floor.
    DetailAddress,
}

/// A single invalid field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Offending field.
    pub field: FormField,

    /// Inline message for the field.
    pub message: &'static str,
}

/// Every violation found in a shipping form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} shipping field(s) need attention", .0.len())]
pub struct FormErrors(SmallVec<[FieldError; 8]>);

impl FormErrors {
    /// All violations, in field order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// The message for `field`, if it is invalid.
    pub fn message(&self, field: FormField) -> Option<&'static str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    /// Number of invalid fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a returned error; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw shipping form input. Location fields hold catalog codes or names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingForm {
    /// Recipient name.
    pub full_name: String,
    /// Contact phone, digits only.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Province code or name.
    pub province: String,
    /// District code or name.
    pub district: String,
    /// Ward code or name.
    pub ward: String,
    /// Street.
    pub street: String,
    /// House number, building, floor.
    pub detail_address: String,
}

/// A validated shipping address, as sent with an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient name.
    pub full_name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Province name.
    pub province: String,
    /// District name.
    pub district: String,
    /// Ward name.
    pub ward: String,
    /// Street.
    pub street: String,
    /// House number, building, floor.
    pub detail_address: String,
}

impl ShippingForm {
    /// Validate every field against the location catalog.
    ///
    /// # Errors
    ///
    /// Returns [`FormErrors`] listing every invalid field.
    pub fn validate(&self, catalog: &LocationCatalog) -> Result<ShippingAddress, FormErrors> {
        let mut errors = SmallVec::new();
        let mut fail = |field, message| errors.push(FieldError { field, message });

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            fail(FormField::FullName, "Full name is required");
        }

        let phone = self.phone.trim();
        if !is_valid_phone(phone) {
            fail(FormField::Phone, "Phone number must be 9 to 11 digits");
        }

        let email = self.email.trim();
        if !validator::validate_email(email) {
            fail(FormField::Email, "Email address is invalid");
        }

        let province = catalog.province(&self.province);
        let district = province.and_then(|province| province.district(&self.district));
        let ward = district.and_then(|district| district.ward(&self.ward));

        // Only the first unresolved location level is reported.
        if province.is_none() {
            fail(FormField::Province, "Please choose a province");
        } else if district.is_none() {
            fail(FormField::District, "Please choose a district");
        } else if ward.is_none() {
            fail(FormField::Ward, "Please choose a ward");
        }

        let street = self.street.trim();
        if street.is_empty() {
            fail(FormField::Street, "Street is required");
        }

        let detail_address = self.detail_address.trim();
        if detail_address.is_empty() {
            fail(FormField::DetailAddress, "Address detail is required");
        }

        match (province, district, ward) {
            (Some(province), Some(district), Some(ward)) if errors.is_empty() => {
                Ok(ShippingAddress {
                    full_name: full_name.to_string(),
                    phone: phone.to_string(),
                    email: email.to_string(),
                    province: province.name.clone(),
                    district: district.name.clone(),
                    ward: ward.name.clone(),
                    street: street.to_string(),
                    detail_address: detail_address.to_string(),
                })
            }
            _ => Err(FormErrors(errors)),
        }
    }
}

fn is_valid_phone(phone: &str) -> bool {
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&phone.len())
        && phone.bytes().all(|byte| byte.is_ascii_digit())
}

/// Error parsing a [`PaymentMethod`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method \"{0}\"")]
pub struct UnknownPaymentMethod(String);

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Pay the courier.
    CashOnDelivery,

    /// Bank transfer through the card/bank gateway redirect.
    BankTransfer,

    /// E-wallet redirect.
    OnlineWallet,
}

impl PaymentMethod {
    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::BankTransfer => "bank_transfer",
            Self::OnlineWallet => "online_wallet",
        }
    }

    /// Whether paying requires a gateway redirect.
    pub const fn redirects(self) -> bool {
        !matches!(self, Self::CashOnDelivery)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cash_on_delivery" | "cod" => Ok(Self::CashOnDelivery),
            "bank_transfer" | "vnpay" => Ok(Self::BankTransfer),
            "online_wallet" | "wallet" | "zalopay" => Ok(Self::OnlineWallet),
            _ => Err(UnknownPaymentMethod(value.to_string())),
        }
    }
}
