//! Remote picture store interface and an in-memory implementation.
//!
//! The engine only writes to the store (fire-and-forget) and watches it for
//! deltas. Whatever the store does with the writes, including echoing them
//! back, is merged idempotently by id.

use crate::observable::Subscription;
use crate::path::{Path, PathId, PathUpdate};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Changes to a picture reported by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathDelta {
    pub added_paths: Vec<Path>,
    pub removed_path_ids: Vec<PathId>,
    pub modified_paths: Vec<Path>,
}

impl PathDelta {
    pub fn is_empty(&self) -> bool {
        self.added_paths.is_empty() && self.removed_path_ids.is_empty() && self.modified_paths.is_empty()
    }
}

/// Access rights of the current user on a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub writable: bool,
}

pub type DeltaHandler = Box<dyn Fn(&PathDelta)>;
pub type PermissionHandler = Box<dyn Fn(Permission)>;

/// External store holding the pictures.
///
/// Watch callbacks may run at any time the store chooses; writes never report
/// failure to the engine.
pub trait PictureStore {
    fn watch_paths(&self, picture: &str, on_delta: DeltaHandler) -> Subscription;
    fn watch_permission(&self, picture: &str, on_change: PermissionHandler) -> Subscription;
    fn add_paths(&self, picture: &str, paths: &[Path]);
    fn remove_paths(&self, picture: &str, ids: &[PathId]);
    fn update_paths(&self, picture: &str, updates: &[PathUpdate]);
}

/// Write access to one picture of a store.
#[derive(Clone, Copy)]
pub struct RemoteWriter<'a> {
    store: &'a dyn PictureStore,
    picture: &'a str,
}

impl<'a> RemoteWriter<'a> {
    pub fn new(store: &'a dyn PictureStore, picture: &'a str) -> Self {
        Self { store, picture }
    }

    pub fn add_paths(&self, paths: &[Path]) {
        if !paths.is_empty() {
            self.store.add_paths(self.picture, paths);
        }
    }

    pub fn remove_paths(&self, ids: &[PathId]) {
        if !ids.is_empty() {
            self.store.remove_paths(self.picture, ids);
        }
    }

    pub fn update_paths(&self, updates: &[PathUpdate]) {
        if !updates.is_empty() {
            self.store.update_paths(self.picture, updates);
        }
    }
}

type SharedDeltaHandler = Rc<dyn Fn(&PathDelta)>;
type SharedPermissionHandler = Rc<dyn Fn(Permission)>;

struct PictureState {
    paths: HashMap<PathId, Path>,
    order: Vec<PathId>,
    writable: bool,
    pending: PathDelta,
    path_watchers: Vec<(u64, SharedDeltaHandler)>,
    permission_watchers: Vec<(u64, SharedPermissionHandler)>,
}

impl Default for PictureState {
    fn default() -> Self {
        Self {
            paths: HashMap::new(),
            order: Vec::new(),
            writable: true,
            pending: PathDelta::default(),
            path_watchers: Vec::new(),
            permission_watchers: Vec::new(),
        }
    }
}

#[derive(Default)]
struct MemoryState {
    pictures: HashMap<String, PictureState>,
    next_watch: u64,
}

impl MemoryState {
    fn next_id(&mut self) -> u64 {
        self.next_watch += 1;
        self.next_watch
    }
}

/// In-memory picture store.
///
/// Writes update the stored picture immediately and are queued as a delta
/// that describes the net change since the last flush, so applying its
/// removals, then additions, then modifications reproduces the picture.
/// [`MemoryPictureStore::flush`] delivers queued deltas to every watcher,
/// standing in for asynchronous delivery. New pictures are writable.
#[derive(Clone, Default)]
pub struct MemoryPictureStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryPictureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current paths of a picture in insertion order.
    pub fn paths(&self, picture: &str) -> Vec<Path> {
        let state = self.state.borrow();
        state
            .pictures
            .get(picture)
            .map(|p| p.order.iter().filter_map(|id| p.paths.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    pub fn is_writable(&self, picture: &str) -> bool {
        self.state
            .borrow()
            .pictures
            .get(picture)
            .is_none_or(|p| p.writable)
    }

    /// Change the permission of a picture, notifying permission watchers.
    pub fn set_writable(&self, picture: &str, writable: bool) {
        let handlers: Vec<SharedPermissionHandler> = {
            let mut state = self.state.borrow_mut();
            let entry = state.pictures.entry(picture.to_string()).or_default();
            if entry.writable == writable {
                return;
            }
            entry.writable = writable;
            entry.permission_watchers.iter().map(|(_, h)| Rc::clone(h)).collect()
        };
        log::info!("Picture {picture} is now {}", if writable { "writable" } else { "read-only" });
        for handler in handlers {
            handler(Permission { writable });
        }
    }

    /// Number of queued, undelivered changes across all pictures.
    pub fn pending_changes(&self) -> usize {
        self.state
            .borrow()
            .pictures
            .values()
            .map(|p| p.pending.added_paths.len() + p.pending.removed_path_ids.len() + p.pending.modified_paths.len())
            .sum()
    }

    /// Deliver queued deltas to watchers. Returns the number of deltas delivered.
    pub fn flush(&self) -> usize {
        let deliveries: Vec<(PathDelta, Vec<SharedDeltaHandler>)> = {
            let mut state = self.state.borrow_mut();
            state
                .pictures
                .values_mut()
                .filter(|p| !p.pending.is_empty())
                .map(|p| {
                    let delta = std::mem::take(&mut p.pending);
                    let handlers = p.path_watchers.iter().map(|(_, h)| Rc::clone(h)).collect();
                    (delta, handlers)
                })
                .collect()
        };
        let mut delivered = 0;
        for (delta, handlers) in deliveries {
            for handler in handlers {
                handler(&delta);
                delivered += 1;
            }
        }
        delivered
    }

    fn unwatch(state: &Weak<RefCell<MemoryState>>, picture: &str, id: u64) {
        if let Some(state) = state.upgrade() {
            if let Some(p) = state.borrow_mut().pictures.get_mut(picture) {
                p.path_watchers.retain(|(w, _)| *w != id);
                p.permission_watchers.retain(|(w, _)| *w != id);
            }
        }
    }
}

impl PictureStore for MemoryPictureStore {
    fn watch_paths(&self, picture: &str, on_delta: DeltaHandler) -> Subscription {
        let handler: SharedDeltaHandler = Rc::from(on_delta);
        let (id, initial) = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id();
            let entry = state.pictures.entry(picture.to_string()).or_default();
            entry.path_watchers.push((id, Rc::clone(&handler)));
            let initial = PathDelta {
                added_paths: entry.order.iter().filter_map(|i| entry.paths.get(i).cloned()).collect(),
                ..PathDelta::default()
            };
            (id, initial)
        };
        if !initial.is_empty() {
            handler(&initial);
        }

        let weak = Rc::downgrade(&self.state);
        let picture = picture.to_string();
        Subscription::new(move || Self::unwatch(&weak, &picture, id))
    }

    fn watch_permission(&self, picture: &str, on_change: PermissionHandler) -> Subscription {
        let handler: SharedPermissionHandler = Rc::from(on_change);
        let (id, writable) = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id();
            let entry = state.pictures.entry(picture.to_string()).or_default();
            entry.permission_watchers.push((id, Rc::clone(&handler)));
            (id, entry.writable)
        };
        handler(Permission { writable });

        let weak = Rc::downgrade(&self.state);
        let picture = picture.to_string();
        Subscription::new(move || Self::unwatch(&weak, &picture, id))
    }

    fn add_paths(&self, picture: &str, paths: &[Path]) {
        let mut state = self.state.borrow_mut();
        let entry = state.pictures.entry(picture.to_string()).or_default();
        for path in paths {
            if entry.paths.contains_key(&path.id()) {
                continue;
            }
            entry.order.push(path.id());
            entry.paths.insert(path.id(), path.clone());
            entry.pending.removed_path_ids.retain(|id| *id != path.id());
            entry.pending.added_paths.push(path.clone());
        }
    }

    fn remove_paths(&self, picture: &str, ids: &[PathId]) {
        let mut state = self.state.borrow_mut();
        let entry = state.pictures.entry(picture.to_string()).or_default();
        for id in ids {
            if entry.paths.remove(id).is_some() {
                entry.order.retain(|i| i != id);
                entry.pending.added_paths.retain(|p| p.id() != *id);
                entry.pending.modified_paths.retain(|p| p.id() != *id);
                entry.pending.removed_path_ids.push(*id);
            }
        }
    }

    fn update_paths(&self, picture: &str, updates: &[PathUpdate]) {
        let mut state = self.state.borrow_mut();
        let entry = state.pictures.entry(picture.to_string()).or_default();
        for update in updates {
            if let Some(path) = entry.paths.get_mut(&update.id) {
                path.set_offset(update.offset);
                let modified = path.clone();
                if let Some(added) = entry.pending.added_paths.iter_mut().find(|p| p.id() == update.id) {
                    *added = modified;
                    continue;
                }
                entry.pending.modified_paths.retain(|p| p.id() != update.id);
                entry.pending.modified_paths.push(modified);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::InkColor;
    use kurbo::{Point, Vec2};
    use std::cell::Cell;

    fn line() -> Path {
        Path::from_points(
            InkColor::black(),
            2.0,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        )
    }

    fn collect(store: &MemoryPictureStore, picture: &str) -> (Rc<RefCell<Vec<PathDelta>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.watch_paths(picture, Box::new(move |d: &PathDelta| sink.borrow_mut().push(d.clone())));
        (seen, sub)
    }

    #[test]
    fn test_writes_are_delivered_on_flush() {
        let store = MemoryPictureStore::new();
        let (seen, _sub) = collect(&store, "pic");
        let path = line();

        store.add_paths("pic", &[path.clone()]);
        assert!(seen.borrow().is_empty());
        assert_eq!(store.pending_changes(), 1);

        assert_eq!(store.flush(), 1);
        assert_eq!(seen.borrow()[0].added_paths, vec![path.clone()]);
        assert_eq!(store.paths("pic"), vec![path]);
        assert_eq!(store.flush(), 0);
    }

    #[test]
    fn test_updates_and_removals() {
        let store = MemoryPictureStore::new();
        let path = line();
        store.add_paths("pic", &[path.clone()]);
        store.flush();

        let (seen, _sub) = collect(&store, "pic");
        // Initial snapshot.
        assert_eq!(seen.borrow().len(), 1);

        store.update_paths(
            "pic",
            &[PathUpdate {
                id: path.id(),
                offset: Vec2::new(3.0, 4.0),
            }],
        );
        store.remove_paths("pic", &[PathId::new_v4()]);
        store.flush();
        let delta = seen.borrow()[1].clone();
        assert_eq!(delta.modified_paths.len(), 1);
        assert_eq!(delta.modified_paths[0].offset(), Vec2::new(3.0, 4.0));
        assert!(delta.removed_path_ids.is_empty());

        store.remove_paths("pic", &[path.id()]);
        store.flush();
        assert_eq!(seen.borrow()[2].removed_path_ids, vec![path.id()]);
        assert!(store.paths("pic").is_empty());
    }

    #[test]
    fn test_pending_delta_is_net_change() {
        let store = MemoryPictureStore::new();
        let (seen, _sub) = collect(&store, "pic");
        let gone = line();
        let back = line();
        store.add_paths("pic", &[back.clone()]);
        store.flush();

        store.add_paths("pic", &[gone.clone()]);
        store.remove_paths("pic", &[gone.id(), back.id()]);
        store.add_paths("pic", &[back.clone()]);
        store.flush();

        let delta = seen.borrow()[1].clone();
        assert!(delta.added_paths.iter().all(|p| p.id() != gone.id()));
        assert_eq!(delta.added_paths, vec![back]);
        assert_eq!(delta.removed_path_ids, vec![gone.id()]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let store = MemoryPictureStore::new();
        let (seen, sub) = collect(&store, "pic");
        sub.unsubscribe();
        store.add_paths("pic", &[line()]);
        store.flush();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_permission_changes() {
        let store = MemoryPictureStore::new();
        let writable = Rc::new(Cell::new(None));
        let sink = Rc::clone(&writable);
        let _sub = store.watch_permission("pic", Box::new(move |p: Permission| sink.set(Some(p.writable))));
        assert_eq!(writable.get(), Some(true));

        store.set_writable("pic", false);
        assert_eq!(writable.get(), Some(false));
        assert!(!store.is_writable("pic"));
    }

    #[test]
    fn test_remote_writer_skips_empty_batches() {
        let store = MemoryPictureStore::new();
        let writer = RemoteWriter::new(&store, "pic");
        writer.add_paths(&[]);
        writer.remove_paths(&[]);
        writer.update_paths(&[]);
        assert_eq!(store.pending_changes(), 0);
        writer.add_paths(&[line()]);
        assert_eq!(store.pending_changes(), 1);
    }
}
