//! Undo/redo operation log.

use crate::frame::FrameRequester;
use crate::lasso::{Lasso, LassoId, LassoSession};
use crate::observable::Observable;
use crate::path::{Path, PathId};
use crate::path_store::PathStore;
use crate::remote::RemoteWriter;
use kurbo::Vec2;
use std::collections::VecDeque;

/// A reversible change to the picture.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Paths drawn locally.
    Add { paths: Vec<Path> },
    /// Paths erased, cut or deleted. Holds the removed paths for undo.
    Remove { paths: Vec<Path> },
    /// Paths moved by a lasso drag.
    Move {
        path_ids: Vec<PathId>,
        delta: Vec2,
        lasso_id: Option<LassoId>,
    },
    /// Paths pasted from the clipboard; `paths` are inserted shifted by `offset`.
    Paste { paths: Vec<Path>, offset: Vec2 },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Remove { .. } => "remove",
            Operation::Move { .. } => "move",
            Operation::Paste { .. } => "paste",
        }
    }
}

/// Everything an operation touches when applied.
pub struct OperationTarget<'a> {
    pub paths: &'a mut PathStore,
    pub lasso: &'a mut LassoSession,
    pub remote: Option<RemoteWriter<'a>>,
}

impl OperationTarget<'_> {
    fn insert(&mut self, paths: Vec<Path>) {
        if let Some(remote) = &self.remote {
            remote.add_paths(&paths);
        }
        self.paths.add_paths(paths);
    }

    fn remove(&mut self, ids: &[PathId]) {
        self.paths.remove_paths(ids);
        if let Some(remote) = &self.remote {
            remote.remove_paths(ids);
        }
        if let Some(lasso) = self.lasso.current_mut() {
            lasso.retain_existing(self.paths);
        }
    }

    fn translate(&mut self, ids: &[PathId], delta: Vec2) {
        let updates = self.paths.translate_paths(ids, delta);
        if let Some(remote) = &self.remote {
            remote.update_paths(&updates);
        }
    }

    fn translate_lasso(&mut self, lasso_id: Option<LassoId>, delta: Vec2) {
        if let Some(lasso) = self.lasso.current_mut().filter(|l| Some(l.id()) == lasso_id) {
            lasso.translate(delta);
        }
    }
}

fn ids_of(paths: &[Path]) -> Vec<PathId> {
    paths.iter().map(Path::id).collect()
}

fn shifted(paths: &[Path], offset: Vec2) -> Vec<Path> {
    paths
        .iter()
        .map(|path| {
            let mut path = path.clone();
            path.translate(offset);
            path
        })
        .collect()
}

/// Done and undone operation stacks.
///
/// Pushing anything other than a redo clears the undone stack.
#[derive(Debug)]
pub struct OperationLog {
    done: VecDeque<Operation>,
    undone: Vec<Operation>,
    can_undo: Observable<bool>,
    can_redo: Observable<bool>,
    max_history: Option<usize>,
    frames: FrameRequester,
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new(None, FrameRequester::default())
    }
}

impl OperationLog {
    pub fn new(max_history: Option<usize>, frames: FrameRequester) -> Self {
        Self {
            done: VecDeque::new(),
            undone: Vec::new(),
            can_undo: Observable::new(false),
            can_redo: Observable::new(false),
            max_history,
            frames,
        }
    }

    /// Observable "undo available" flag.
    pub fn can_undo(&self) -> &Observable<bool> {
        &self.can_undo
    }

    /// Observable "redo available" flag.
    pub fn can_redo(&self) -> &Observable<bool> {
        &self.can_redo
    }

    pub fn done(&self) -> &VecDeque<Operation> {
        &self.done
    }

    pub fn undone(&self) -> &[Operation] {
        &self.undone
    }

    /// Record `op` and apply its effect.
    pub fn do_operation(&mut self, op: Operation, target: &mut OperationTarget<'_>, is_redo: bool) {
        log::debug!("Do {} (redo: {is_redo})", op.name());
        match &op {
            Operation::Add { paths } => target.insert(paths.clone()),
            Operation::Remove { paths } => target.remove(&ids_of(paths)),
            Operation::Move {
                path_ids,
                delta,
                lasso_id,
            } => {
                target.translate(path_ids, *delta);
                // A fresh move comes from a drag that already moved the outline.
                if is_redo {
                    target.translate_lasso(*lasso_id, *delta);
                }
            }
            Operation::Paste { paths, offset } => {
                let pasted = shifted(paths, *offset);
                let ids = ids_of(&pasted);
                let bounds = pasted.iter().map(Path::boundary).reduce(|a, b| a.union(b));
                target.insert(pasted);
                if let Some(bounds) = bounds {
                    target.lasso.set(Lasso::rectangle(bounds, ids));
                }
            }
        }

        self.done.push_back(op);
        if let Some(max) = self.max_history {
            while self.done.len() > max {
                self.done.pop_front();
            }
        }
        if !is_redo {
            self.undone.clear();
        }
        self.refresh();
    }

    /// Apply the inverse of `op` and record it as undone.
    pub fn undo_operation(&mut self, op: Operation, target: &mut OperationTarget<'_>) {
        log::debug!("Undo {}", op.name());
        match &op {
            Operation::Add { paths } => target.remove(&ids_of(paths)),
            Operation::Remove { paths } => target.insert(paths.clone()),
            Operation::Move {
                path_ids,
                delta,
                lasso_id,
            } => {
                target.translate(path_ids, -*delta);
                target.translate_lasso(*lasso_id, -*delta);
            }
            Operation::Paste { paths, .. } => {
                let ids = ids_of(paths);
                let selects_paste = target
                    .lasso
                    .current()
                    .is_some_and(|lasso| {
                        !lasso.selected().is_empty() && lasso.selected().iter().all(|id| ids.contains(id))
                    });
                if selects_paste {
                    target.lasso.clear();
                }
                target.remove(&ids);
            }
        }
        self.undone.push(op);
        self.refresh();
    }

    /// Undo the latest operation. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, target: &mut OperationTarget<'_>) -> bool {
        match self.done.pop_back() {
            Some(op) => {
                self.undo_operation(op, target);
                true
            }
            None => false,
        }
    }

    /// Redo the latest undone operation. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, target: &mut OperationTarget<'_>) -> bool {
        match self.undone.pop() {
            Some(op) => {
                self.do_operation(op, target, true);
                true
            }
            None => false,
        }
    }

    fn refresh(&mut self) {
        self.can_undo.set(!self.done.is_empty());
        self.can_redo.set(!self.undone.is_empty());
        self.frames.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::InkColor;
    use crate::remote::MemoryPictureStore;
    use kurbo::Point;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn line(x: f64) -> Path {
        Path::from_points(
            InkColor::black(),
            2.0,
            vec![Point::new(x, 0.0), Point::new(x + 10.0, 10.0)],
        )
    }

    fn sorted(store: &PathStore) -> Vec<Path> {
        let mut paths: Vec<Path> = store.iter().cloned().collect();
        paths.sort_by_key(Path::id);
        paths
    }

    struct Fixture {
        paths: PathStore,
        lasso: LassoSession,
        log: OperationLog,
    }

    impl Fixture {
        fn new() -> Self {
            let mut paths = PathStore::default();
            paths.add_paths(vec![line(0.0), line(50.0)]);
            Self {
                paths,
                lasso: LassoSession::new(),
                log: OperationLog::default(),
            }
        }

        fn run(&mut self, f: impl FnOnce(&mut OperationLog, &mut OperationTarget<'_>)) {
            let mut target = OperationTarget {
                paths: &mut self.paths,
                lasso: &mut self.lasso,
                remote: None,
            };
            f(&mut self.log, &mut target);
        }
    }

    fn assert_undo_restores(op: impl FnOnce(&PathStore) -> Operation) {
        let mut fx = Fixture::new();
        let before = sorted(&fx.paths);
        let op = op(&fx.paths);
        fx.run(|log, t| log.do_operation(op, t, false));
        assert_ne!(sorted(&fx.paths), before);
        fx.run(|log, t| assert!(log.undo(t)));
        assert_eq!(sorted(&fx.paths), before);
    }

    #[test]
    fn test_undo_restores_add() {
        assert_undo_restores(|_| Operation::Add {
            paths: vec![line(100.0)],
        });
    }

    #[test]
    fn test_undo_restores_remove() {
        assert_undo_restores(|store| Operation::Remove {
            paths: store.cloned(&store.ids()[..1]),
        });
    }

    #[test]
    fn test_undo_restores_move() {
        assert_undo_restores(|store| Operation::Move {
            path_ids: store.ids().to_vec(),
            delta: Vec2::new(8.0, -4.0),
            lasso_id: None,
        });
    }

    #[test]
    fn test_undo_restores_paste() {
        assert_undo_restores(|_| Operation::Paste {
            paths: vec![line(200.0)],
            offset: Vec2::new(20.0, 20.0),
        });
    }

    #[test]
    fn test_redo_semantics() {
        let mut fx = Fixture::new();
        let a = line(300.0);
        let b = line(400.0);
        fx.run(|log, t| log.do_operation(Operation::Add { paths: vec![a.clone()] }, t, false));
        fx.run(|log, t| log.do_operation(Operation::Add { paths: vec![b.clone()] }, t, false));
        fx.run(|log, t| assert!(log.undo(t)));
        assert!(!fx.paths.contains(b.id()));
        assert!(fx.log.can_redo().get());

        fx.run(|log, t| assert!(log.redo(t)));
        assert!(fx.paths.contains(b.id()));
        assert!(!fx.log.can_redo().get());
        assert!(fx.log.can_undo().get());
    }

    #[test]
    fn test_new_operation_clears_redo() {
        let mut fx = Fixture::new();
        fx.run(|log, t| log.do_operation(Operation::Add { paths: vec![line(1.0)] }, t, false));
        fx.run(|log, t| assert!(log.undo(t)));
        assert_eq!(fx.log.undone().len(), 1);
        fx.run(|log, t| log.do_operation(Operation::Add { paths: vec![line(2.0)] }, t, false));
        assert!(fx.log.undone().is_empty());
        assert!(!fx.log.can_redo().get());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut fx = Fixture::new();
        fx.run(|log, t| {
            assert!(!log.undo(t));
            assert!(!log.redo(t));
        });
        assert!(!fx.log.can_undo().get());
        assert_eq!(fx.paths.len(), 2);
    }

    #[test]
    fn test_flags_notify_subscribers() {
        let mut fx = Fixture::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = fx.log.can_undo().subscribe(move |v| sink.borrow_mut().push(*v));
        fx.run(|log, t| log.do_operation(Operation::Add { paths: vec![line(1.0)] }, t, false));
        fx.run(|log, t| assert!(log.undo(t)));
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_history_cap_drops_oldest() {
        let mut fx = Fixture::new();
        fx.log = OperationLog::new(Some(2), FrameRequester::default());
        for x in [1.0, 2.0, 3.0] {
            fx.run(|log, t| log.do_operation(Operation::Add { paths: vec![line(x)] }, t, false));
        }
        assert_eq!(fx.log.done().len(), 2);
        assert!(matches!(
            &fx.log.done()[0],
            Operation::Add { paths } if paths[0].points()[0].x == 2.0
        ));

        fx.run(|log, t| assert!(log.undo(t)));
        fx.run(|log, t| assert!(log.undo(t)));
        fx.run(|log, t| assert!(!log.undo(t)));
    }

    #[test]
    fn test_paste_selects_and_undo_clears_selection() {
        let mut fx = Fixture::new();
        let source = line(500.0);
        fx.run(|log, t| {
            log.do_operation(
                Operation::Paste {
                    paths: vec![source.clone()],
                    offset: Vec2::new(20.0, 20.0),
                },
                t,
                false,
            )
        });
        let pasted = fx.paths.get(source.id()).unwrap();
        assert_eq!(pasted.offset(), Vec2::new(20.0, 20.0));
        let lasso = fx.lasso.current().unwrap();
        assert!(lasso.is_closed());
        assert_eq!(lasso.selected(), &[source.id()]);

        fx.run(|log, t| assert!(log.undo(t)));
        assert!(fx.lasso.current().is_none());
    }

    #[test]
    fn test_undo_paste_keeps_unrelated_empty_lasso() {
        let mut fx = Fixture::new();
        let source = line(500.0);
        let paste = Operation::Paste {
            paths: vec![source],
            offset: Vec2::ZERO,
        };
        fx.run(|log, t| log.do_operation(paste, t, false));
        let empty = Lasso::rectangle(kurbo::Rect::new(-50.0, -50.0, -10.0, -10.0), Vec::new());
        let empty_id = empty.id();
        fx.lasso.set(empty);

        fx.run(|log, t| assert!(log.undo(t)));
        assert_eq!(fx.lasso.current().map(Lasso::id), Some(empty_id));
    }

    #[test]
    fn test_move_undo_moves_lasso_back() {
        let mut fx = Fixture::new();
        let ids = fx.paths.ids().to_vec();
        let lasso = Lasso::rectangle(kurbo::Rect::new(-5.0, -5.0, 100.0, 20.0), ids.clone());
        let lasso_id = lasso.id();
        fx.lasso.set(lasso);
        let op = Operation::Move {
            path_ids: ids,
            delta: Vec2::new(10.0, 0.0),
            lasso_id: Some(lasso_id),
        };
        fx.run(|log, t| log.do_operation(op, t, false));
        assert_eq!(fx.lasso.current().unwrap().offset(), Vec2::ZERO);
        fx.run(|log, t| assert!(log.undo(t)));
        assert_eq!(fx.lasso.current().unwrap().offset(), Vec2::new(-10.0, 0.0));
        fx.run(|log, t| assert!(log.redo(t)));
        assert_eq!(fx.lasso.current().unwrap().offset(), Vec2::ZERO);
    }

    #[test]
    fn test_operations_are_persisted() {
        let remote = MemoryPictureStore::new();
        let mut paths = PathStore::default();
        let mut lasso = LassoSession::new();
        let mut log = OperationLog::default();
        let a = line(0.0);
        {
            let mut target = OperationTarget {
                paths: &mut paths,
                lasso: &mut lasso,
                remote: Some(RemoteWriter::new(&remote, "pic")),
            };
            log.do_operation(Operation::Add { paths: vec![a.clone()] }, &mut target, false);
            log.do_operation(
                Operation::Move {
                    path_ids: vec![a.id()],
                    delta: Vec2::new(1.0, 2.0),
                    lasso_id: None,
                },
                &mut target,
                false,
            );
        }
        let stored = remote.paths("pic");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].offset(), Vec2::new(1.0, 2.0));

        let mut target = OperationTarget {
            paths: &mut paths,
            lasso: &mut lasso,
            remote: Some(RemoteWriter::new(&remote, "pic")),
        };
        log.undo(&mut target);
        log.undo(&mut target);
        assert!(remote.paths("pic").is_empty());
    }
}
