//! Worker-pool asset store decoding thumbnails from source files.
//!
//! - Bounded worker pool (2-3 threads) for thumbnail decoding
//! - Best-effort cancellation checked before decode and before delivery
//! - In-memory LRU of decoded thumbnails, no disk persistence
//! - Uses flume for communication between workers and the presenter thread

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use flume::{Receiver, Sender};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::models::{Asset, AssetId};

use super::{AssetStore, ContentMode, FetchCompletion, RequestHandle, TargetSize, Thumbnail};

/// Default number of worker threads.
const DEFAULT_WORKERS: usize = 2;

/// Maximum number of worker threads.
const MAX_WORKERS: usize = 4;

/// Maximum number of queued fetch jobs.
const MAX_QUEUE_SIZE: usize = 256;

/// Default capacity of the in-memory thumbnail cache (entries).
const DEFAULT_CACHE_ENTRIES: usize = 1024;

/// One queued fetch travelling to a worker.
struct FetchJob {
    handle: RequestHandle,
    asset_id: AssetId,
    path: PathBuf,
    target: TargetSize,
    mode: ContentMode,
    reply: Sender<FetchCompletion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    asset: AssetId,
    width: u32,
    height: u32,
    mode: ContentMode,
}

impl CacheKey {
    fn new(asset: AssetId, target: TargetSize, mode: ContentMode) -> Self {
        Self {
            asset,
            width: target.width,
            height: target.height,
            mode,
        }
    }
}

/// In-process [`AssetStore`] backed by a pool of decoder threads.
///
/// Fetches decode the asset's source file with the `image` crate and
/// deliver a [`FetchCompletion`] on the caller-supplied channel. Decoded
/// thumbnails are kept in a memory-only LRU keyed by (asset, size, mode);
/// cache hits complete synchronously but still allocate a fresh handle.
pub struct PoolAssetStore {
    job_tx: Sender<FetchJob>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    pending: Arc<Mutex<HashSet<RequestHandle>>>,
    cancelled: Arc<Mutex<HashSet<RequestHandle>>>,
    cache: Arc<Mutex<LruCache<CacheKey, Arc<Thumbnail>>>>,
}

impl PoolAssetStore {
    pub fn new(workers: usize) -> Self {
        PoolAssetStoreBuilder::new().workers(workers).build()
    }

    /// Number of fetches queued or decoding right now.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Number of thumbnails held in the memory cache.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Signal workers to stop and wait for them to finish.
    pub fn shutdown(&mut self) {
        debug!("Shutting down asset store pool");
        self.shutdown.store(true, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl AssetStore for PoolAssetStore {
    fn fetch_thumbnail(
        &self,
        asset: &Asset,
        target: TargetSize,
        mode: ContentMode,
        reply: Sender<FetchCompletion>,
    ) -> RequestHandle {
        let handle = RequestHandle::next();
        let key = CacheKey::new(asset.id(), target, mode);

        if let Some(hit) = self.cache.lock().get(&key).cloned() {
            trace!(?handle, asset = ?asset.id(), "memory cache hit");
            let _ = reply.send(FetchCompletion {
                handle,
                thumbnail: Some(hit),
                error: None,
            });
            return handle;
        }

        self.pending.lock().insert(handle);

        let job = FetchJob {
            handle,
            asset_id: asset.id(),
            path: asset.path().to_path_buf(),
            target,
            mode,
            reply: reply.clone(),
        };

        match self.job_tx.try_send(job) {
            Ok(()) => {}
            Err(flume::TrySendError::Full(job)) => {
                warn!(?handle, "fetch queue full, failing request");
                self.pending.lock().remove(&handle);
                let _ = job.reply.send(FetchCompletion {
                    handle,
                    thumbnail: None,
                    error: Some("fetch queue full".into()),
                });
            }
            Err(flume::TrySendError::Disconnected(job)) => {
                warn!(?handle, "fetch workers gone, failing request");
                self.pending.lock().remove(&handle);
                let _ = job.reply.send(FetchCompletion {
                    handle,
                    thumbnail: None,
                    error: Some("fetch workers stopped".into()),
                });
            }
        }

        handle
    }

    fn cancel(&self, handle: RequestHandle) {
        let is_pending = self.pending.lock().contains(&handle);
        if is_pending {
            trace!(?handle, "cancelling fetch");
            self.cancelled.lock().insert(handle);
        }
    }
}

impl Drop for PoolAssetStore {
    fn drop(&mut self) {
        if !self.shutdown.load(Ordering::Relaxed) {
            self.shutdown();
        }
    }
}

/// Worker thread loop.
fn worker_loop(
    worker_id: usize,
    job_rx: Receiver<FetchJob>,
    shutdown: Arc<AtomicBool>,
    pending: Arc<Mutex<HashSet<RequestHandle>>>,
    cancelled: Arc<Mutex<HashSet<RequestHandle>>>,
    cache: Arc<Mutex<LruCache<CacheKey, Arc<Thumbnail>>>>,
) {
    debug!(worker_id, "Thumbnail worker started");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        let job = match job_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(job) => job,
            Err(flume::RecvTimeoutError::Timeout) => continue,
            Err(flume::RecvTimeoutError::Disconnected) => break,
        };

        if cancelled.lock().remove(&job.handle) {
            trace!(handle = ?job.handle, "fetch cancelled before decode");
            pending.lock().remove(&job.handle);
            continue;
        }

        let decoded = decode_thumbnail(&job.path, job.target, job.mode);

        if cancelled.lock().remove(&job.handle) {
            trace!(handle = ?job.handle, "fetch cancelled before delivery");
            pending.lock().remove(&job.handle);
            continue;
        }

        let completion = match decoded {
            Ok(thumbnail) => {
                let thumbnail = Arc::new(thumbnail);
                let key = CacheKey::new(job.asset_id, job.target, job.mode);
                cache.lock().put(key, Arc::clone(&thumbnail));
                FetchCompletion {
                    handle: job.handle,
                    thumbnail: Some(thumbnail),
                    error: None,
                }
            }
            Err(e) => {
                warn!(path = ?job.path, error = ?e, "Failed to decode thumbnail");
                FetchCompletion {
                    handle: job.handle,
                    thumbnail: None,
                    error: Some(e.to_string()),
                }
            }
        };

        pending.lock().remove(&job.handle);
        if job.reply.send(completion).is_err() {
            trace!(worker_id, "completion receiver gone");
        }
        cancelled.lock().remove(&job.handle);
    }

    debug!(worker_id, "Thumbnail worker stopped");
}

/// Decode and scale one thumbnail.
fn decode_thumbnail(path: &Path, target: TargetSize, mode: ContentMode) -> Result<Thumbnail> {
    anyhow::ensure!(!target.is_zero_area(), "zero-area target size");

    let img = image::open(path).with_context(|| format!("Failed to load image: {:?}", path))?;

    let scaled = match mode {
        ContentMode::Fit => img.thumbnail(target.width, target.height),
        ContentMode::Fill => crop_to_aspect(&img, target).resize_exact(
            target.width,
            target.height,
            FilterType::CatmullRom,
        ),
    };

    let rgba = scaled.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    Ok(Thumbnail::from_rgba(width, height, rgba.into_raw()))
}

/// Center-crop the source to the target's aspect ratio.
fn crop_to_aspect(img: &DynamicImage, target: TargetSize) -> DynamicImage {
    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 {
        return img.clone();
    }

    let target_ar = target.width as f64 / target.height as f64;
    let src_ar = src_w as f64 / src_h as f64;

    let (crop_w, crop_h) = if src_ar > target_ar {
        (((src_h as f64) * target_ar).round() as u32, src_h)
    } else {
        (src_w, ((src_w as f64) / target_ar).round() as u32)
    };

    let crop_w = crop_w.clamp(1, src_w);
    let crop_h = crop_h.clamp(1, src_h);
    let x = (src_w - crop_w) / 2;
    let y = (src_h - crop_h) / 2;

    img.crop_imm(x, y, crop_w, crop_h)
}

/// Builder for [`PoolAssetStore`] with configuration options.
pub struct PoolAssetStoreBuilder {
    workers: usize,
    cache_entries: usize,
}

impl PoolAssetStoreBuilder {
    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            cache_entries: DEFAULT_CACHE_ENTRIES,
        }
    }

    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count;
        self
    }

    pub fn cache_entries(mut self, entries: usize) -> Self {
        self.cache_entries = entries;
        self
    }

    pub fn build(self) -> PoolAssetStore {
        let num_workers = self.workers.clamp(1, MAX_WORKERS);
        let cache_entries = self.cache_entries.max(1);

        let (job_tx, job_rx) = flume::bounded(MAX_QUEUE_SIZE);
        let shutdown = Arc::new(AtomicBool::new(false));
        let pending = Arc::new(Mutex::new(HashSet::new()));
        let cancelled = Arc::new(Mutex::new(HashSet::new()));
        let cache = Arc::new(Mutex::new(LruCache::new(
            NonZeroUsize::new(cache_entries).unwrap(),
        )));

        let mut workers = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let rx = job_rx.clone();
            let shutdown = Arc::clone(&shutdown);
            let pending = Arc::clone(&pending);
            let cancelled = Arc::clone(&cancelled);
            let cache = Arc::clone(&cache);

            let handle = thread::Builder::new()
                .name(format!("thumb-worker-{}", worker_id))
                .spawn(move || {
                    worker_loop(worker_id, rx, shutdown, pending, cancelled, cache);
                })
                .expect("Failed to spawn thumbnail worker");

            workers.push(handle);
        }

        debug!(num_workers, cache_entries, "Started asset store pool");

        PoolAssetStore {
            job_tx,
            workers,
            shutdown,
            pending,
            cancelled,
            cache,
        }
    }
}

impl Default for PoolAssetStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
