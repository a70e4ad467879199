//! Cart
//!
//! Snapshot of a shopper's cart as last reported by the server, plus the client-side state
//! machines layered over it: line selection, quantity editing and mutation sequencing.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::{effective_price, is_valid_price};

pub mod quantity;
pub mod selection;
pub mod sequence;

/// Errors raised when a cart snapshot breaks its invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A variation id was empty.
    #[error("variation id cannot be empty")]
    EmptyVariationId,

    /// A cart id was empty.
    #[error("cart id cannot be empty")]
    EmptyCartId,

    /// A line item had a zero quantity.
    #[error("quantity for {0} must be at least 1")]
    ZeroQuantity(VariationId),

    /// A price was negative.
    #[error("price for {0} is negative")]
    NegativePrice(VariationId),

    /// The same variation appeared on two lines.
    #[error("variation {0} appears more than once")]
    DuplicateVariation(VariationId),
}

/// Identifier of a purchasable product variation (a specific size/colour/material).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariationId(String);

impl VariationId {
    /// Wrap a variation id.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyVariationId`] when the id is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, CartError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(CartError::EmptyVariationId);
        }

        Ok(Self(id))
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server identifier of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(String);

impl CartId {
    /// Wrap a cart id.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCartId`] when the id is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, CartError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(CartError::EmptyCartId);
        }

        Ok(Self(id))
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only pricing, stock and display data for a variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variation {
    /// Variation id.
    pub id: VariationId,

    /// Name of the parent product.
    pub product_name: String,

    /// Sale price, when the variation is discounted.
    pub sale_price: Option<Decimal>,

    /// Regular price.
    pub final_price: Option<Decimal>,

    /// Units in stock.
    pub stock_quantity: u32,

    /// Colour label.
    pub color: Option<String>,

    /// Size label.
    pub size: Option<String>,

    /// Material name.
    pub material: Option<String>,
}

impl Variation {
    /// Price charged per unit.
    pub fn unit_price(&self) -> Option<Decimal> {
        effective_price(self.sale_price, self.final_price)
    }

    /// Short "colour / size / material" label, skipping missing parts.
    pub fn options_label(&self) -> String {
        [&self.color, &self.size, &self.material]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    variation: Variation,
    quantity: u32,
}

impl CartItem {
    /// Create a line, checking quantity and price invariants.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`]: the quantity is zero.
    /// - [`CartError::NegativePrice`]: a price is negative.
    pub fn new(variation: Variation, quantity: u32) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity(variation.id));
        }

        let negative = |price: Option<Decimal>| price.is_some() && !is_valid_price(price);

        if negative(variation.sale_price) || negative(variation.final_price) {
            return Err(CartError::NegativePrice(variation.id));
        }

        Ok(Self {
            variation,
            quantity,
        })
    }

    /// Variation id of this line.
    pub fn id(&self) -> &VariationId {
        &self.variation.id
    }

    /// Variation snapshot.
    pub fn variation(&self) -> &Variation {
        &self.variation
    }

    /// Quantity on this line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Units available according to the server.
    pub fn stock(&self) -> u32 {
        self.variation.stock_quantity
    }

    /// Unit price multiplied by quantity; zero when the variation has no price.
    pub fn line_total(&self) -> Decimal {
        self.variation
            .unit_price()
            .map_or(Decimal::ZERO, |price| price * Decimal::from(self.quantity))
    }
}

/// Cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    id: Option<CartId>,
    items: Vec<CartItem>,
    total_price: Decimal,
}

impl Cart {
    /// Build a cart from its lines.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DuplicateVariation`] when a variation appears on two lines.
    pub fn new(
        id: Option<CartId>,
        items: Vec<CartItem>,
        total_price: Decimal,
    ) -> Result<Self, CartError> {
        let mut seen = rustc_hash::FxHashSet::default();

        for item in &items {
            if !seen.insert(item.id()) {
                return Err(CartError::DuplicateVariation(item.id().clone()));
            }
        }

        Ok(Self {
            id,
            items,
            total_price,
        })
    }

    /// A cart with no lines.
    pub fn empty(id: Option<CartId>) -> Self {
        Self {
            id,
            items: Vec::new(),
            total_price: Decimal::ZERO,
        }
    }

    /// Server id of the cart, once one has been created.
    pub fn id(&self) -> Option<&CartId> {
        self.id.as_ref()
    }

    /// Lines in server order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by variation.
    pub fn item(&self, id: &VariationId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether the cart has a line for the variation.
    pub fn contains(&self, id: &VariationId) -> bool {
        self.item(id).is_some()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total reported by the server for every line.
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Ids of every line.
    pub fn ids(&self) -> impl Iterator<Item = &VariationId> {
        self.items.iter().map(CartItem::id)
    }
}
