//! Video library backing the picker grid.
//!
//! Discovers video files under a root directory and keeps them ordered
//! newest first. The reload is the side effect the presenter guards with
//! a [`crate::gate::RunOnceGate`] on first appearance.

use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::cart::SelectionCart;
use crate::models::{Asset, MediaKind};

/// Move the element at `index` to the front, preserving the order of
/// everything else. Silently ignores `index == 0` and out-of-range
/// indices.
pub fn move_to_first<T>(items: &mut Vec<T>, index: usize) {
    if index == 0 || index >= items.len() {
        return;
    }
    let item = items.remove(index);
    items.insert(0, item);
}

/// All video assets found under one root directory.
pub struct VideoLibrary {
    root: PathBuf,
    items: Vec<Asset>,
}

impl VideoLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            items: Vec::new(),
        }
    }

    /// Rescan the root directory, replacing the item list. Unreadable
    /// entries are skipped.
    pub fn reload(&mut self) {
        let mut items = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let kind = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(MediaKind::from_extension);
            if kind != Some(MediaKind::Video) {
                trace!(?path, "skipping non-video entry");
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            items.push(Asset::new(
                path.to_path_buf(),
                MediaKind::Video,
                mtime,
                metadata.len() as i64,
            ));
        }

        items.sort_by(|a, b| b.mtime().cmp(&a.mtime()));
        debug!(count = items.len(), root = ?self.root, "reloaded video library");
        self.items = items;
    }

    pub fn items(&self) -> &[Asset] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Float the cart's selected asset to the front of the list, so a
    /// previously chosen item is the first thing the grid shows. No-op
    /// when nothing is selected or the selection is not in this library.
    pub fn surface_selected(&mut self, cart: &SelectionCart) {
        let Some(selected) = cart.current() else {
            return;
        };
        if let Some(index) = self.items.iter().position(|a| a.id() == selected) {
            move_to_first(&mut self.items, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_move_to_first_reorders() {
        let mut items = vec!['a', 'b', 'c'];
        move_to_first(&mut items, 2);
        assert_eq!(items, vec!['c', 'a', 'b']);
    }

    #[test]
    fn test_move_to_first_index_zero_is_noop() {
        let mut items = vec!['a', 'b', 'c'];
        move_to_first(&mut items, 0);
        assert_eq!(items, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_move_to_first_out_of_range_is_noop() {
        let mut items = vec!['a', 'b', 'c'];
        move_to_first(&mut items, 5);
        assert_eq!(items, vec!['a', 'b', 'c']);

        let mut empty: Vec<char> = Vec::new();
        move_to_first(&mut empty, 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_reload_keeps_only_videos() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("c.mov"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let mut library = VideoLibrary::new(dir.path());
        library.reload();

        assert_eq!(library.len(), 2);
        assert!(library.items().iter().all(|a| a.is_video()));
    }

    #[test]
    fn test_reload_orders_newest_first() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        fs::write(dir.path().join("b.webm"), b"x").unwrap();

        let mut library = VideoLibrary::new(dir.path());
        library.reload();

        let mtimes: Vec<i64> = library.items().iter().map(|a| a.mtime()).collect();
        let mut sorted = mtimes.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(mtimes, sorted);
    }

    #[test]
    fn test_reload_replaces_previous_items() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();

        let mut library = VideoLibrary::new(dir.path());
        library.reload();
        assert_eq!(library.len(), 1);

        library.reload();
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_surface_selected_floats_selection() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        fs::write(dir.path().join("b.mp4"), b"x").unwrap();
        fs::write(dir.path().join("c.mp4"), b"x").unwrap();

        let mut library = VideoLibrary::new(dir.path());
        library.reload();

        let cart = SelectionCart::new();
        let chosen = library.items()[2].id();
        cart.toggle(chosen);

        library.surface_selected(&cart);
        assert_eq!(library.items()[0].id(), chosen);
        assert_eq!(library.len(), 3);
    }

    #[test]
    fn test_surface_selected_with_empty_cart_is_noop() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        fs::write(dir.path().join("b.mp4"), b"x").unwrap();

        let mut library = VideoLibrary::new(dir.path());
        library.reload();
        let before: Vec<_> = library.items().iter().map(|a| a.id()).collect();

        library.surface_selected(&SelectionCart::new());
        let after: Vec<_> = library.items().iter().map(|a| a.id()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_surface_selected_unknown_asset_is_noop() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();

        let mut library = VideoLibrary::new(dir.path());
        library.reload();

        let cart = SelectionCart::new();
        cart.toggle(Asset::new("/elsewhere/z.mp4".into(), MediaKind::Video, 0, 0).id());

        library.surface_selected(&cart);
        assert_eq!(library.len(), 1);
    }
}
