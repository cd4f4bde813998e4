use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a library media item.
///
/// Ids are allocated from a process-wide counter and are unique for the
/// lifetime of the process. Two `Asset` values compare equal exactly when
/// their ids match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(u64);

impl AssetId {
    fn next() -> Self {
        Self(NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" => Some(Self::Image),
            "webm" | "mp4" | "mkv" | "avi" | "mov" => Some(Self::Video),
            _ => None,
        }
    }
}

/// A single library media item. Immutable once obtained.
#[derive(Debug, Clone)]
pub struct Asset {
    id: AssetId,
    path: PathBuf,
    kind: MediaKind,
    mtime: i64,
    size: i64,
    duration_ms: Option<u32>,
}

impl Asset {
    pub fn new(path: PathBuf, kind: MediaKind, mtime: i64, size: i64) -> Self {
        Self {
            id: AssetId::next(),
            path,
            kind,
            mtime,
            size,
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// File modification timestamp (Unix seconds).
    pub fn mtime(&self) -> i64 {
        self.mtime
    }

    /// File size in bytes.
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Duration if known, for video items.
    pub fn duration(&self) -> Option<u32> {
        self.duration_ms
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Asset {}
