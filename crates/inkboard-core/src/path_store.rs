//! Authoritative in-memory collection of the picture's paths.

use crate::frame::FrameRequester;
use crate::path::{Path, PathId, PathUpdate};
use kurbo::{Rect, Vec2};
use std::collections::{HashMap, HashSet};

/// All committed paths of the current picture, keyed by id.
///
/// Every mutation is keyed by id and handled per path: adding an existing id
/// or removing a missing one is a no-op for that path only. A batch that
/// changed anything requests a redraw.
#[derive(Debug, Default)]
pub struct PathStore {
    paths: HashMap<PathId, Path>,
    /// Draw order of paths (back to front).
    order: Vec<PathId>,
    frames: FrameRequester,
}

impl PathStore {
    pub fn new(frames: FrameRequester) -> Self {
        Self {
            paths: HashMap::new(),
            order: Vec::new(),
            frames,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, id: PathId) -> bool {
        self.paths.contains_key(&id)
    }

    pub fn get(&self, id: PathId) -> Option<&Path> {
        self.paths.get(&id)
    }

    /// Paths in draw order (back to front).
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.order.iter().filter_map(|id| self.paths.get(id))
    }

    /// Path ids in draw order.
    pub fn ids(&self) -> &[PathId] {
        &self.order
    }

    /// Memoized bounding box of a path.
    pub fn boundary(&self, id: PathId) -> Option<Rect> {
        self.paths.get(&id).map(Path::boundary)
    }

    /// Union of all path boundaries.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.iter().map(Path::boundary).reduce(|a, b| a.union(b))
    }

    /// Clones of the paths with the given ids; unknown ids are skipped.
    pub fn cloned(&self, ids: &[PathId]) -> Vec<Path> {
        ids.iter().filter_map(|id| self.paths.get(id).cloned()).collect()
    }

    /// Keep only the ids that still exist.
    pub fn retain_existing(&self, ids: impl IntoIterator<Item = PathId>) -> Vec<PathId> {
        ids.into_iter().filter(|id| self.contains(*id)).collect()
    }

    /// Insert paths whose ids are not present yet. Returns the number inserted.
    pub fn add_paths(&mut self, paths: Vec<Path>) -> usize {
        let mut inserted = 0;
        for path in paths {
            let id = path.id();
            if self.paths.contains_key(&id) {
                continue;
            }
            self.order.push(id);
            self.paths.insert(id, path);
            inserted += 1;
        }
        self.changed(inserted)
    }

    /// Remove paths by id. Returns the removed paths in draw order.
    pub fn take_paths(&mut self, ids: &[PathId]) -> Vec<Path> {
        let wanted: HashSet<PathId> = ids.iter().copied().collect();
        let mut removed = Vec::new();
        self.order.retain(|id| {
            if !wanted.contains(id) {
                return true;
            }
            if let Some(path) = self.paths.remove(id) {
                removed.push(path);
            }
            false
        });
        self.changed(removed.len());
        removed
    }

    /// Remove paths by id. Returns the number removed.
    pub fn remove_paths(&mut self, ids: &[PathId]) -> usize {
        self.take_paths(ids).len()
    }

    /// Replace existing paths or insert new ones. Returns the number touched.
    pub fn update_paths(&mut self, paths: Vec<Path>) -> usize {
        let count = paths.len();
        for path in paths {
            let id = path.id();
            if self.paths.insert(id, path).is_none() {
                self.order.push(id);
            }
        }
        self.changed(count)
    }

    /// Shift existing paths by `delta`. Returns the resulting offset updates.
    pub fn translate_paths(&mut self, ids: &[PathId], delta: Vec2) -> Vec<PathUpdate> {
        let mut updates = Vec::new();
        for id in ids {
            if let Some(path) = self.paths.get_mut(id) {
                path.translate(delta);
                updates.push(path.offset_update());
            }
        }
        self.changed(updates.len());
        updates
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        let count = self.paths.len();
        self.paths.clear();
        self.order.clear();
        self.changed(count);
    }

    fn changed(&self, count: usize) -> usize {
        if count > 0 {
            self.frames.request_redraw();
        }
        count
    }
}
