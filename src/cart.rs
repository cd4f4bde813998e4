//! Single-selection state shared across the picker UI.

use parking_lot::Mutex;
use tracing::trace;

use crate::models::AssetId;

/// At most one selected item at any time.
///
/// Created at session start and shared explicitly (`Arc<SelectionCart>`)
/// with every consumer; there is no ambient global. The cart does not
/// push notifications: after a mutation, callers repaint the visible
/// slots' selected affordance themselves.
#[derive(Default)]
pub struct SelectionCart {
    selected: Mutex<Option<AssetId>>,
}

impl SelectionCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle selection of `item` and return the new state.
    ///
    /// Selecting the already-selected item clears the selection;
    /// selecting anything else replaces it. Never additive.
    pub fn toggle(&self, item: AssetId) -> Option<AssetId> {
        let mut selected = self.selected.lock();
        if *selected == Some(item) {
            *selected = None;
        } else {
            *selected = Some(item);
        }
        trace!(?item, new_state = ?*selected, "selection toggled");
        *selected
    }

    /// Read-only snapshot of the current selection.
    pub fn current(&self) -> Option<AssetId> {
        *self.selected.lock()
    }

    pub fn is_selected(&self, item: AssetId) -> bool {
        *self.selected.lock() == Some(item)
    }

    /// Force the empty selection, e.g. when the picker session ends.
    pub fn clear(&self) {
        *self.selected.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asset, MediaKind};

    fn id(name: &str) -> AssetId {
        Asset::new(format!("/videos/{name}").into(), MediaKind::Video, 0, 0).id()
    }

    #[test]
    fn test_toggle_selects_then_clears() {
        let cart = SelectionCart::new();
        let x = id("x.mp4");

        assert_eq!(cart.toggle(x), Some(x));
        assert!(cart.is_selected(x));
        assert_eq!(cart.toggle(x), None);
        assert_eq!(cart.current(), None);
    }

    #[test]
    fn test_toggle_replaces_never_adds() {
        let cart = SelectionCart::new();
        let x = id("x.mp4");
        let y = id("y.mp4");

        cart.toggle(x);
        assert_eq!(cart.toggle(y), Some(y));
        assert!(!cart.is_selected(x));
        assert!(cart.is_selected(y));
    }

    #[test]
    fn test_clear() {
        let cart = SelectionCart::new();
        cart.toggle(id("x.mp4"));
        cart.clear();
        assert_eq!(cart.current(), None);
    }

    #[test]
    fn test_starts_empty() {
        assert_eq!(SelectionCart::new().current(), None);
    }
}
