//! Line selection for checkout.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;

use crate::cart::{Cart, CartItem, VariationId};

/// Result of [`Selection::select_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAll {
    /// Every line is now selected.
    Selected(usize),

    /// Everything was already selected, so the selection was cleared.
    Cleared,

    /// The cart has no lines; nothing changed.
    NothingToSelect,
}

/// Which cart lines are candidates for checkout.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: FxHashSet<VariationId>,
}

impl Selection {
    /// An empty selection, as on cart load.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a line's membership. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &VariationId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Select every line, or clear when every line is already selected.
    pub fn select_all(&mut self, cart: &Cart) -> SelectAll {
        if cart.is_empty() {
            return SelectAll::NothingToSelect;
        }

        self.retain_existing(cart);

        if self.selected.len() == cart.len() {
            self.selected.clear();
            return SelectAll::Cleared;
        }

        self.selected = cart.ids().cloned().collect();

        SelectAll::Selected(self.selected.len())
    }

    /// Drop a line from the selection. Returns whether it was selected.
    pub fn remove(&mut self, id: &VariationId) -> bool {
        self.selected.remove(id)
    }

    /// Forget selected ids whose lines are no longer in the cart.
    pub fn retain_existing(&mut self, cart: &Cart) {
        self.selected.retain(|id| cart.contains(id));
    }

    /// Empty the selection.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Whether a line is selected.
    pub fn is_selected(&self, id: &VariationId) -> bool {
        self.selected.contains(id)
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in a stable order.
    pub fn ids(&self) -> Vec<VariationId> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Selected lines that are still present in `cart`, in cart order.
    pub fn items<'a>(&'a self, cart: &'a Cart) -> impl Iterator<Item = &'a CartItem> {
        cart.items()
            .iter()
            .filter(|item| self.selected.contains(item.id()))
    }

    /// Sum of the selected lines at their effective unit price.
    pub fn selected_total(&self, cart: &Cart) -> Decimal {
        self.items(cart).map(CartItem::line_total).sum()
    }
}
