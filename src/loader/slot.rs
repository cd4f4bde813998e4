//! Per-slot request state and the weak edge to the display surface.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::AssetId;
use crate::store::{RequestHandle, Thumbnail};

/// Render target for one grid cell.
///
/// Implemented by the embedder. The loader only ever holds weak
/// references to surfaces, so a cell torn down mid-fetch simply makes a
/// late completion land nowhere.
pub trait DisplaySurface: Send + Sync {
    /// Replace the cell's imagery. `None` clears the cell (failed fetch).
    fn set_thumbnail(&self, thumbnail: Option<Arc<Thumbnail>>);
}

#[derive(Default)]
struct SlotState {
    current_asset: Option<AssetId>,
    in_flight: Option<RequestHandle>,
    completed_once: bool,
}

/// Request state for one reusable display slot.
///
/// A slot is created when the presenter binds a display position and is
/// rebound to different assets as the grid recycles. Invariant: a set
/// `in_flight` handle always belongs to a fetch issued for
/// `current_asset`, and a slot never tracks two live handles.
pub struct RequestSlot {
    state: Mutex<SlotState>,
    surface: Weak<dyn DisplaySurface>,
}

/// What happened when a completion was checked against a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompletionOutcome {
    /// The completion matches the slot's outstanding fetch.
    Applied,
    /// The slot has been reassigned since this fetch was issued.
    Stale,
}

impl RequestSlot {
    pub fn new(surface: Weak<dyn DisplaySurface>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SlotState::default()),
            surface,
        })
    }

    /// Convenience over [`RequestSlot::new`] for a concrete surface type.
    pub fn bound_to<S: DisplaySurface + 'static>(surface: &Arc<S>) -> Arc<Self> {
        let surface: Arc<dyn DisplaySurface> = surface.clone();
        let weak: Weak<dyn DisplaySurface> = Arc::downgrade(&surface);
        Self::new(weak)
    }

    /// Identity of the asset this slot last requested imagery for.
    pub fn current_asset(&self) -> Option<AssetId> {
        self.state.lock().current_asset
    }

    /// Handle of the outstanding fetch, if any.
    pub fn in_flight(&self) -> Option<RequestHandle> {
        self.state.lock().in_flight
    }

    /// Whether any fetch has ever completed for this slot.
    pub fn has_completed(&self) -> bool {
        self.state.lock().completed_once
    }

    pub(crate) fn surface(&self) -> Option<Arc<dyn DisplaySurface>> {
        self.surface.upgrade()
    }

    pub(crate) fn take_in_flight(&self) -> Option<RequestHandle> {
        self.state.lock().in_flight.take()
    }

    pub(crate) fn record_fetch(&self, asset: AssetId, handle: RequestHandle) {
        let mut state = self.state.lock();
        state.current_asset = Some(asset);
        state.in_flight = Some(handle);
    }

    /// Check a completion against the slot's outstanding fetch and, when
    /// it matches, mark the fetch finished.
    pub(crate) fn complete(&self, handle: RequestHandle) -> CompletionOutcome {
        let mut state = self.state.lock();
        if state.in_flight != Some(handle) {
            return CompletionOutcome::Stale;
        }
        state.in_flight = None;
        state.completed_once = true;
        CompletionOutcome::Applied
    }
}
