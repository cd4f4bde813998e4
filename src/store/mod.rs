//! Boundary contract to the asset provider.
//!
//! This module defines:
//! - `AssetStore` - the opaque provider of asynchronous thumbnail fetches
//! - `RequestHandle` - token correlating a fetch with its completion
//! - `Thumbnail` / `FetchCompletion` - decoded pixels and the message
//!   workers deliver back to the presenter thread
//! - `PoolAssetStore` - the built-in worker-pool implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::models::Asset;

pub mod pool;

pub use pool::{PoolAssetStore, PoolAssetStoreBuilder};

/// Side length of the generated placeholder image in pixels.
const PLACEHOLDER_SIDE: u32 = 64;

static NEXT_REQUEST_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque token identifying one outstanding fetch.
///
/// Handles are only ever compared and cancelled; they carry no other
/// meaning. Store implementations allocate them via [`RequestHandle::next`]
/// so handles stay unique across stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle(u64);

impl RequestHandle {
    pub fn next() -> Self {
        Self(NEXT_REQUEST_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Requested thumbnail geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A slot that has not been laid out yet reports a zero-area target.
    pub fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// How the source image is mapped onto the target rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentMode {
    /// Cover the whole target, cropping the source as needed.
    Fill,
    /// Fit inside the target, preserving the full source frame.
    Fit,
}

/// Decoded RGBA thumbnail pixels, shared as `Arc<Thumbnail>`.
#[derive(Clone)]
pub struct Thumbnail {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Thumbnail {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Placeholder shown while a slot has no real thumbnail.
///
/// Generated once and reused; solid dark gray so unloaded cells read as
/// empty rather than broken.
pub fn placeholder() -> Arc<Thumbnail> {
    static PLACEHOLDER: Lazy<Arc<Thumbnail>> = Lazy::new(|| {
        let side = PLACEHOLDER_SIDE;
        let mut rgba = vec![0u8; (side * side * 4) as usize];
        for chunk in rgba.chunks_exact_mut(4) {
            chunk[0] = 0x1a;
            chunk[1] = 0x1a;
            chunk[2] = 0x1a;
            chunk[3] = 0xff;
        }
        Arc::new(Thumbnail::from_rgba(side, side, rgba))
    });
    Arc::clone(&PLACEHOLDER)
}

/// Completion delivered by a store for one fetch.
///
/// `thumbnail` is `None` when the fetch failed; `error` then carries the
/// reason for logging. The handle always names the fetch that produced
/// this message, never the slot it may land in.
#[derive(Debug, Clone)]
pub struct FetchCompletion {
    pub handle: RequestHandle,
    pub thumbnail: Option<Arc<Thumbnail>>,
    pub error: Option<String>,
}

/// Asynchronous provider of thumbnail imagery.
///
/// Completions may be produced on any thread and are delivered over the
/// `reply` channel; the receiver is responsible for marshalling them back
/// to its own thread. A non-cancelled fetch delivers exactly one
/// completion. A cancelled fetch may or may not deliver one, so consumers
/// must re-validate against their own state on every message.
pub trait AssetStore: Send + Sync {
    /// Begin an asynchronous fetch. Returns immediately with the handle
    /// that will appear in the eventual [`FetchCompletion`].
    fn fetch_thumbnail(
        &self,
        asset: &Asset,
        target: TargetSize,
        mode: ContentMode,
        reply: flume::Sender<FetchCompletion>,
    ) -> RequestHandle;

    /// Best-effort cancellation. Idempotent; safe to call on handles that
    /// already completed or were never issued.
    fn cancel(&self, handle: RequestHandle);
}
