//! Cart page state: line selection, per-line quantity editing and removal.
//!
//! Every shopper action returns a [`Notice`]; failures revert local state instead of
//! propagating.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use storefront::{
    cart::{
        Cart, CartItem, VariationId,
        quantity::{QuantityCommit, QuantityEditor, QuantityRejection},
        selection::{SelectAll, Selection},
    },
    notices::Notice,
};
use tracing::warn;

use crate::domain::carts::{CartService, CartServiceError};

#[derive(Debug)]
pub struct CartController {
    service: CartService,
    cart: Cart,
    selection: Selection,
    editors: FxHashMap<VariationId, QuantityEditor>,
}

impl CartController {
    #[must_use]
    pub fn new(service: CartService) -> Self {
        Self {
            service,
            cart: Cart::empty(None),
            selection: Selection::new(),
            editors: FxHashMap::default(),
        }
    }

    /// Load the cart. The selection starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart cannot be fetched.
    pub async fn load(&mut self) -> Result<&Cart, CartServiceError> {
        let cart = self.service.get_cart().await?;

        self.selection.clear();
        self.replace_cart(cart);

        Ok(&self.cart)
    }

    /// Re-fetch the cart, keeping the selection for lines that still exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart cannot be fetched.
    pub async fn refresh(&mut self) -> Result<&Cart, CartServiceError> {
        let cart = self.service.get_cart().await?;

        self.replace_cart(cart);

        Ok(&self.cart)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected lines, in cart order.
    pub fn selected_items(&self) -> impl Iterator<Item = &CartItem> {
        self.selection.items(&self.cart)
    }

    /// Total of the selected lines, computed from the current cart.
    pub fn selected_total(&self) -> Decimal {
        self.selection.selected_total(&self.cart)
    }

    /// Quantity editor for a line.
    pub fn editor(&self, id: &VariationId) -> Option<&QuantityEditor> {
        self.editors.get(id)
    }

    /// Flip selection of a line. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &VariationId) -> bool {
        if !self.cart.contains(id) {
            return false;
        }

        self.selection.toggle(id)
    }

    /// Select every line, or clear the selection when everything is already selected.
    pub fn select_all(&mut self) -> Option<Notice> {
        match self.selection.select_all(&self.cart) {
            SelectAll::NothingToSelect => Some(Notice::warning("Your cart is empty")),
            SelectAll::Selected(_) | SelectAll::Cleared => None,
        }
    }

    /// Deselect everything, e.g. after the selected lines were ordered.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Step a line's quantity up by one.
    pub async fn increase(&mut self, id: &VariationId) -> Notice {
        let Some((editor, stock)) = self.line_editor(id) else {
            return missing_line(id);
        };

        let previous = editor.committed();

        match editor.increase(stock) {
            Ok(quantity) => self.submit_quantity(id, quantity, previous).await,
            Err(rejection) => rejection_notice(&rejection),
        }
    }

    /// Step a line's quantity down by one.
    pub async fn decrease(&mut self, id: &VariationId) -> Notice {
        let Some((editor, stock)) = self.line_editor(id) else {
            return missing_line(id);
        };

        let previous = editor.committed();

        match editor.decrease(stock) {
            Ok(quantity) => self.submit_quantity(id, quantity, previous).await,
            Err(rejection) => rejection_notice(&rejection),
        }
    }

    /// Update the typed quantity of a line without submitting it.
    pub fn set_draft(&mut self, id: &VariationId, text: impl Into<String>) {
        if let Some(editor) = self.editors.get_mut(id) {
            editor.set_draft(text);
        }
    }

    /// Commit the typed quantity of a line. Returns `None` when it matches the current quantity.
    ///
    /// A draft above stock is clamped and always warns, even when the clamped quantity is the
    /// current one and nothing is sent.
    pub async fn commit(&mut self, id: &VariationId) -> Option<Notice> {
        let Some((editor, stock)) = self.line_editor(id) else {
            return Some(missing_line(id));
        };

        let previous = editor.committed();

        let commit = match editor.commit(stock) {
            Ok(commit) => commit,
            Err(rejection) => return Some(rejection_notice(&rejection)),
        };

        let submitted = match commit.submit(previous) {
            Some(quantity) => Some(self.submit_quantity(id, quantity, previous).await),
            None => None,
        };

        match (commit, submitted) {
            (_, Some(notice)) if notice.is_problem() => Some(notice),
            (QuantityCommit::Clamped(quantity), _) => Some(Notice::warning(format!(
                "Maximum stock reached: quantity set to {quantity}"
            ))),
            (_, submitted) => submitted,
        }
    }

    /// Remove a line and drop it from the selection.
    pub async fn remove(&mut self, id: &VariationId) -> Notice {
        match self.service.remove_item(id).await {
            Ok(cart) => {
                self.selection.remove(id);
                self.replace_cart(cart);

                Notice::success("Item removed from cart")
            }
            Err(error) => failure("Could not remove the item", &error),
        }
    }

    /// Remove every selected line.
    pub async fn remove_selected(&mut self) -> Notice {
        let ids = self.selection.ids();

        if ids.is_empty() {
            return Notice::warning("Select at least one item to remove");
        }

        match self.service.remove_items(&ids).await {
            Ok(cart) => {
                self.selection.clear();
                self.replace_cart(cart);

                Notice::success(format!("Removed {} item(s) from cart", ids.len()))
            }
            Err(error) => failure("Could not remove the selected items", &error),
        }
    }

    /// Empty the cart.
    pub async fn clear(&mut self) -> Notice {
        match self.service.clear_cart().await {
            Ok(()) => {
                self.selection.clear();
                self.replace_cart(Cart::empty(self.cart.id().cloned()));

                Notice::success("Cart cleared")
            }
            Err(error) => failure("Could not clear the cart", &error),
        }
    }

    fn line_editor(&mut self, id: &VariationId) -> Option<(&mut QuantityEditor, u32)> {
        let stock = self.cart.item(id)?.stock();
        let editor = self.editors.get_mut(id)?;

        Some((editor, stock))
    }

    async fn submit_quantity(&mut self, id: &VariationId, quantity: u32, previous: u32) -> Notice {
        match self
            .service
            .update_item_quantity(id.as_str(), i64::from(quantity))
            .await
        {
            Ok(cart) => {
                self.replace_cart(cart);

                Notice::success("Cart updated")
            }
            Err(error) => {
                if let Some(editor) = self.editors.get_mut(id) {
                    editor.sync(previous);
                }

                failure("Could not update the quantity", &error)
            }
        }
    }

    fn replace_cart(&mut self, cart: Cart) {
        self.selection.retain_existing(&cart);
        self.editors = cart
            .items()
            .iter()
            .map(|item| (item.id().clone(), QuantityEditor::new(item.quantity())))
            .collect();
        self.cart = cart;
    }
}

fn rejection_notice(rejection: &QuantityRejection) -> Notice {
    match rejection {
        QuantityRejection::MaxStock { stock } => {
            Notice::warning(format!("Maximum stock reached: only {stock} available"))
        }
        other => Notice::warning(other.to_string()),
    }
}

fn missing_line(id: &VariationId) -> Notice {
    Notice::warning(format!("Item {id} is no longer in your cart"))
}

fn failure(context: &str, error: &CartServiceError) -> Notice {
    warn!(error = %error, "{context}");

    Notice::error(format!("{context}: {}", error.user_message()))
}
