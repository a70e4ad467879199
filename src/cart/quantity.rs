//! Stock-aware quantity editing for a single cart line.
//!
//! Buttons step the committed quantity directly. Free-text entry only touches a draft until it
//! is committed, so intermediate keystrokes never reach the server.

use thiserror::Error;

/// Why a quantity change was refused. The committed quantity is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityRejection {
    /// Increasing would exceed the stock reported by the server.
    #[error("only {stock} in stock")]
    MaxStock {
        /// Units in stock.
        stock: u32,
    },

    /// Quantities cannot go below one.
    #[error("quantity must be at least 1")]
    BelowMinimum,

    /// The draft was not a whole number.
    #[error("\"{0}\" is not a valid quantity")]
    NotANumber(String),

    /// Nothing is left in stock, so no quantity is valid.
    #[error("this item is out of stock")]
    OutOfStock,
}

/// Result of committing a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityCommit {
    /// The draft matched the committed quantity; nothing to send.
    Unchanged,

    /// The draft was accepted as typed.
    Accepted(u32),

    /// The draft exceeded stock and was clamped to it. The clamped value may equal the
    /// previous quantity, in which case there is nothing to send but the shopper still needs
    /// the max-stock warning.
    Clamped(u32),
}

impl QuantityCommit {
    /// Quantity to submit to the server, if it differs from `previous`.
    pub const fn submit(self, previous: u32) -> Option<u32> {
        match self {
            Self::Unchanged => None,
            Self::Accepted(quantity) | Self::Clamped(quantity) => {
                if quantity == previous {
                    None
                } else {
                    Some(quantity)
                }
            }
        }
    }
}

/// Quantity editor for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityEditor {
    committed: u32,
    draft: String,
}

impl QuantityEditor {
    /// Start editing from the server's quantity.
    pub fn new(committed: u32) -> Self {
        Self {
            committed,
            draft: committed.to_string(),
        }
    }

    /// Last committed quantity.
    pub const fn committed(&self) -> u32 {
        self.committed
    }

    /// Current text in the quantity field.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Step up by one.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityRejection::MaxStock`] when the new quantity would exceed `stock`.
    pub fn increase(&mut self, stock: u32) -> Result<u32, QuantityRejection> {
        let next = self.committed.saturating_add(1);

        if next > stock {
            return Err(QuantityRejection::MaxStock { stock });
        }

        Ok(self.set_committed(next))
    }

    /// Step down by one. A quantity the server left above `stock` drops straight to `stock`.
    ///
    /// # Errors
    ///
    /// - [`QuantityRejection::OutOfStock`]: `stock` is zero.
    /// - [`QuantityRejection::BelowMinimum`]: the quantity is already 1.
    pub fn decrease(&mut self, stock: u32) -> Result<u32, QuantityRejection> {
        if stock == 0 {
            return Err(QuantityRejection::OutOfStock);
        }

        if self.committed <= 1 {
            return Err(QuantityRejection::BelowMinimum);
        }

        Ok(self.set_committed((self.committed - 1).min(stock)))
    }

    /// Replace the draft text. Never submits anything.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Validate the draft against `stock` and commit it.
    ///
    /// A rejected draft reverts to the last committed value.
    ///
    /// # Errors
    ///
    /// - [`QuantityRejection::NotANumber`]: the draft is not a whole number.
    /// - [`QuantityRejection::BelowMinimum`]: the draft is below one.
    /// - [`QuantityRejection::OutOfStock`]: `stock` is zero.
    pub fn commit(&mut self, stock: u32) -> Result<QuantityCommit, QuantityRejection> {
        let outcome = self.evaluate_draft(stock);

        match outcome {
            Ok(QuantityCommit::Accepted(quantity) | QuantityCommit::Clamped(quantity)) => {
                self.set_committed(quantity);
            }
            Ok(QuantityCommit::Unchanged) | Err(_) => self.revert(),
        }

        outcome
    }

    /// Reset to a quantity confirmed by the server, or back after a failed update.
    pub fn sync(&mut self, quantity: u32) {
        self.set_committed(quantity);
    }

    /// Drop the draft and show the committed quantity again.
    pub fn revert(&mut self) {
        self.draft = self.committed.to_string();
    }

    fn evaluate_draft(&self, stock: u32) -> Result<QuantityCommit, QuantityRejection> {
        let text = self.draft.trim();

        let value: i64 = text
            .parse()
            .map_err(|_parse| QuantityRejection::NotANumber(text.to_string()))?;

        if value < 1 {
            return Err(QuantityRejection::BelowMinimum);
        }

        if stock == 0 {
            return Err(QuantityRejection::OutOfStock);
        }

        let (quantity, clamped) = match u32::try_from(value) {
            Ok(quantity) if quantity <= stock => (quantity, false),
            _ => (stock, true),
        };

        if clamped {
            Ok(QuantityCommit::Clamped(quantity))
        } else if quantity == self.committed {
            Ok(QuantityCommit::Unchanged)
        } else {
            Ok(QuantityCommit::Accepted(quantity))
        }
    }

    fn set_committed(&mut self, quantity: u32) -> u32 {
        self.committed = quantity;
        self.draft = quantity.to_string();

        quantity
    }
}
