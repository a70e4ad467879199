//! Payment gateway return parameters.
//!
//! After a gateway redirect the shopper lands back on the storefront with the outcome encoded in
//! the query string. Bank-transfer returns use `vnp_*` keys; wallet returns use `apptransid` and
//! `status`.

use rust_decimal::Decimal;
use thiserror::Error;
use url::{Url, form_urlencoded};

use crate::checkout::PaymentMethod;

const BANK_SUCCESS_CODE: &str = "00";
const WALLET_SUCCESS_CODE: &str = "1";

/// Errors raised while reading return parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentReturnError {
    /// An amount parameter was not a number.
    #[error("invalid amount \"{0}\" in payment return")]
    InvalidAmount(String),
}

/// Outcome reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnStatus {
    /// Payment captured.
    Success,

    /// The gateway reported a failure or cancellation.
    Failed,

    /// No status parameter was present.
    Missing,
}

/// Decoded return parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReturn {
    /// Gateway the parameters came from, when recognisable.
    pub method: Option<PaymentMethod>,

    /// Decoded outcome.
    pub status: ReturnStatus,

    /// Status code exactly as sent.
    pub raw_status: Option<String>,

    /// Merchant-side reference: the order code for bank transfers, `apptransid` for wallets.
    pub reference: Option<String>,

    /// Gateway-side transaction number.
    pub transaction_no: Option<String>,

    /// Amount paid, in major units.
    pub amount: Option<Decimal>,
}

impl PaymentReturn {
    /// Decode a full return URL, or a bare query string.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentReturnError::InvalidAmount`] when an amount is not numeric.
    pub fn parse(input: &str) -> Result<Self, PaymentReturnError> {
        match Url::parse(input) {
            Ok(url) => Self::from_query(url.query().unwrap_or_default()),
            Err(_relative) => Self::from_query(input.trim_start_matches('?')),
        }
    }

    /// Decode a query string without the leading `?`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentReturnError::InvalidAmount`] when an amount is not numeric.
    pub fn from_query(query: &str) -> Result<Self, PaymentReturnError> {
        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        let get = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
                .filter(|value| !value.is_empty())
        };

        if pairs.iter().any(|(name, _)| name.starts_with("vnp_")) {
            let raw_status = get("vnp_ResponseCode");

            let amount = get("vnp_Amount")
                .map(|value| parse_amount(&value).map(|minor| minor / Decimal::ONE_HUNDRED))
                .transpose()?;

            return Ok(Self {
                method: Some(PaymentMethod::BankTransfer),
                status: decode_status(raw_status.as_deref(), BANK_SUCCESS_CODE),
                raw_status,
                reference: get("vnp_TxnRef"),
                transaction_no: get("vnp_TransactionNo"),
                amount,
            });
        }

        if pairs.iter().any(|(name, _)| name == "apptransid") {
            let raw_status = get("status");

            let amount = get("amount")
                .map(|value| parse_amount(&value))
                .transpose()?;

            return Ok(Self {
                method: Some(PaymentMethod::OnlineWallet),
                status: decode_status(raw_status.as_deref(), WALLET_SUCCESS_CODE),
                raw_status,
                reference: get("apptransid"),
                transaction_no: get("zptransid"),
                amount,
            });
        }

        Ok(Self {
            method: None,
            status: ReturnStatus::Missing,
            raw_status: None,
            reference: None,
            transaction_no: None,
            amount: None,
        })
    }

    /// Whether the gateway reported a captured payment.
    pub fn is_success(&self) -> bool {
        self.status == ReturnStatus::Success
    }
}

fn decode_status(raw: Option<&str>, success: &str) -> ReturnStatus {
    match raw {
        None => ReturnStatus::Missing,
        Some(code) if code == success => ReturnStatus::Success,
        Some(_) => ReturnStatus::Failed,
    }
}

fn parse_amount(value: &str) -> Result<Decimal, PaymentReturnError> {
    value
        .parse::<Decimal>()
        .map_err(|_invalid| PaymentReturnError::InvalidAmount(value.to_string()))
}
