//! Thumbnail loading engine for reusable grid slots.
//!
//! - At most one outstanding fetch per slot; a rebind cancels the prior one
//! - Completions are delivered over a channel and applied on the presenter
//!   thread via `pump_completions`
//! - A completion is written to a slot only while slot, surface, and the
//!   slot's current in-flight handle all still agree; anything else is
//!   dropped quietly

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use flume::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::models::Asset;
use crate::store::{
    placeholder, AssetStore, ContentMode, FetchCompletion, RequestHandle, TargetSize,
};

mod slot;

pub use slot::{DisplaySurface, RequestSlot};

use slot::CompletionOutcome;

/// The core engine: decides per `load` call whether to cancel, fetch, or
/// short-circuit, and routes completions back to the right slot.
///
/// All `load` and `pump_completions` calls are expected from one logical
/// presenter thread; store workers may complete on any thread and only
/// ever touch the completion channel.
pub struct ThumbnailLoader {
    store: Arc<dyn AssetStore>,
    completion_tx: Sender<FetchCompletion>,
    completion_rx: Receiver<FetchCompletion>,
    pending: Mutex<HashMap<RequestHandle, Weak<RequestSlot>>>,
}

impl ThumbnailLoader {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        let (completion_tx, completion_rx) = flume::unbounded();
        Self {
            store,
            completion_tx,
            completion_rx,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Request imagery for `asset` into `slot`.
    ///
    /// A zero-area target paints the placeholder and issues nothing: the
    /// slot has no visible geometry yet and a fetch would be wasted. Any
    /// outstanding fetch for the slot is cancelled before the new one is
    /// issued. A slot that has never completed a load shows the
    /// placeholder while fetching; one that has keeps its last image so
    /// fast scrolling does not flash gray.
    pub fn load(
        &self,
        slot: &Arc<RequestSlot>,
        asset: &Asset,
        target: TargetSize,
        mode: ContentMode,
    ) {
        if target.is_zero_area() {
            trace!(asset = ?asset.id(), "zero-area target, placeholder only");
            if let Some(surface) = slot.surface() {
                surface.set_thumbnail(Some(placeholder()));
            }
            return;
        }

        if let Some(prior) = slot.take_in_flight() {
            trace!(handle = ?prior, "cancelling superseded fetch");
            self.store.cancel(prior);
            self.pending.lock().remove(&prior);
        }

        if !slot.has_completed() {
            if let Some(surface) = slot.surface() {
                surface.set_thumbnail(Some(placeholder()));
            }
        }

        let handle = self
            .store
            .fetch_thumbnail(asset, target, mode, self.completion_tx.clone());
        slot.record_fetch(asset.id(), handle);
        self.pending.lock().insert(handle, Arc::downgrade(slot));
    }

    /// Drain completed fetches and apply them to their slots.
    ///
    /// Call from the presenter thread. Returns the number of completions
    /// written to a surface. Completions for discarded slots, torn-down
    /// surfaces, or superseded handles are dropped, never applied.
    pub fn pump_completions(&self) -> usize {
        let mut applied = 0;

        while let Ok(done) = self.completion_rx.try_recv() {
            let slot = self
                .pending
                .lock()
                .remove(&done.handle)
                .and_then(|weak| weak.upgrade());

            let Some(slot) = slot else {
                trace!(handle = ?done.handle, "completion for discarded slot");
                continue;
            };

            match slot.complete(done.handle) {
                CompletionOutcome::Stale => {
                    trace!(handle = ?done.handle, "stale completion dropped");
                }
                CompletionOutcome::Applied => {
                    if let Some(error) = &done.error {
                        warn!(handle = ?done.handle, error = %error, "thumbnail fetch failed");
                    }
                    match slot.surface() {
                        Some(surface) => {
                            surface.set_thumbnail(done.thumbnail.clone());
                            applied += 1;
                        }
                        None => {
                            trace!(handle = ?done.handle, "surface torn down, dropping result");
                        }
                    }
                }
            }
        }

        self.pending.lock().retain(|_, weak| weak.strong_count() > 0);
        applied
    }

    /// Number of fetches the loader is still expecting a completion for.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}
