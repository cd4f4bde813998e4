//! gridpick - async thumbnail loading and selection state for
//! virtualized media picker grids.
//!
//! Reusable grid cells are rebound to different assets as the user
//! scrolls; every rebind must invalidate the outstanding fetch for the
//! previous asset and a late completion must never land in a cell that
//! has moved on. This crate is that engine, plus the small pieces of
//! session state a picker needs around it:
//!
//! - `loader` - per-slot fetch/cancel protocol with stale-completion
//!   rejection
//! - `store` - the asset-provider boundary and a worker-pool
//!   implementation decoding from source files
//! - `cart` - the single-selection state shared across the picker
//! - `gate` - run-once guard for first-appearance side effects
//! - `library` - video discovery and selected-item surfacing

pub mod cart;
pub mod gate;
pub mod library;
pub mod loader;
pub mod models;
pub mod store;

pub use cart::SelectionCart;
pub use gate::RunOnceGate;
pub use library::{move_to_first, VideoLibrary};
pub use loader::{DisplaySurface, RequestSlot, ThumbnailLoader};
pub use models::{Asset, AssetId, MediaKind};
pub use store::{
    AssetStore, ContentMode, FetchCompletion, PoolAssetStore, RequestHandle, TargetSize, Thumbnail,
};
