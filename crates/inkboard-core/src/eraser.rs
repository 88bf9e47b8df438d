//! Proximity erasing.
//!
//! The eraser removes whole paths: a path is hit as soon as one of its samples
//! comes within `(path width + eraser width)` of a sample of the eraser's
//! motion. Hits are staged while the gesture runs and committed at its end.

use crate::geometry::{self, points_bounds, rects_overlap, sample_motion};
use crate::path::{Path, PathId};
use crate::path_store::PathStore;
use kurbo::Point;
use std::collections::HashSet;

/// Default spacing of samples along the eraser's motion (world units).
pub const ERASER_STEP: f64 = 2.0;

/// Sampling parameters for one hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraserParams {
    /// Eraser width in world units.
    pub width: f64,
    /// Spacing of eraser motion samples.
    pub step: f64,
    /// Spacing of polyline path samples.
    pub spacing: f64,
}

impl Default for EraserParams {
    fn default() -> Self {
        Self {
            width: 10.0,
            step: ERASER_STEP,
            spacing: geometry::POLYLINE_SAMPLE_SPACING,
        }
    }
}

/// Whether any sample of `path` lies within reach of any eraser sample.
pub fn path_hit(path: &Path, eraser: &[Point], params: &EraserParams) -> bool {
    let reach = path.width() + params.width;
    let reach_sq = reach * reach;

    let Some(bounds) = points_bounds(eraser) else {
        return false;
    };
    if !rects_overlap(bounds.inflate(reach, reach), path.boundary()) {
        return false;
    }

    geometry::visit_path_samples(path, params.spacing, |sample| {
        eraser.iter().any(|e| (*e - sample).hypot2() <= reach_sq)
    })
}

/// Ids of paths in `store` hit by the eraser moving from `from` to `to`.
///
/// A tap (`from` is `None`) tests the single point `to`. Paths in `skip` are
/// not tested again.
pub fn find_hits(
    store: &PathStore,
    from: Option<Point>,
    to: Point,
    params: &EraserParams,
    skip: &HashSet<PathId>,
) -> Vec<PathId> {
    let eraser = match from {
        Some(from) => sample_motion(from, to, params.step),
        None => vec![to],
    };
    store
        .iter()
        .filter(|path| !skip.contains(&path.id()))
        .filter(|path| path_hit(path, &eraser, params))
        .map(Path::id)
        .collect()
}

/// Erase gesture in progress: staged hits and the last eraser position.
#[derive(Debug, Clone, Default)]
pub struct EraseGesture {
    erasing: Vec<PathId>,
    staged: HashSet<PathId>,
    last_point: Option<Point>,
}

impl EraseGesture {
    /// Start erasing with a tap at `point`.
    pub fn begin(store: &PathStore, point: Point, params: &EraserParams) -> Self {
        let mut gesture = Self::default();
        gesture.extend(store, point, params);
        gesture
    }

    /// Move the eraser to `point`, staging every newly hit path.
    ///
    /// Returns the number of new hits.
    pub fn extend(&mut self, store: &PathStore, point: Point, params: &EraserParams) -> usize {
        let hits = find_hits(store, self.last_point, point, params, &self.staged);
        self.last_point = Some(point);
        for id in &hits {
            self.staged.insert(*id);
            self.erasing.push(*id);
        }
        hits.len()
    }

    /// Paths staged for removal, in hit order.
    pub fn erasing(&self) -> &[PathId] {
        &self.erasing
    }

    pub fn is_erasing(&self, id: PathId) -> bool {
        self.staged.contains(&id)
    }

    /// Finish the gesture, returning the staged ids that still exist.
    pub fn commit(self, store: &PathStore) -> Vec<PathId> {
        let staged = self.erasing.len();
        let ids = store.retain_existing(self.erasing);
        if ids.len() < staged {
            log::warn!("Dropped {} erased path(s) removed meanwhile", staged - ids.len());
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::InkColor;

    fn params(width: f64) -> EraserParams {
        EraserParams {
            width,
            ..EraserParams::default()
        }
    }

    fn store_with(paths: Vec<Path>) -> PathStore {
        let mut store = PathStore::default();
        store.add_paths(paths);
        store
    }

    fn horizontal(width: f64) -> Path {
        Path::from_points(
            InkColor::black(),
            width,
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        )
    }

    #[test]
    fn test_eraser_hits_line_and_spares_far_path() {
        let line = horizontal(2.0);
        let far = Path::from_points(
            InkColor::black(),
            2.0,
            vec![Point::new(1000.0, 1000.0), Point::new(1100.0, 1050.0)],
        );
        let store = store_with(vec![line.clone(), far.clone()]);

        let mut gesture = EraseGesture::begin(&store, Point::new(50.0, 1.0), &params(3.0));
        gesture.extend(&store, Point::new(52.0, 1.0), &params(3.0));
        assert_eq!(gesture.erasing(), &[line.id()]);
        assert!(!gesture.is_erasing(far.id()));

        let ids = gesture.commit(&store);
        assert_eq!(ids, vec![line.id()]);
    }

    #[test]
    fn test_threshold_is_width_plus_eraser() {
        let line = horizontal(2.0);
        let eraser = [Point::new(50.0, 4.9)];
        assert!(path_hit(&line, &eraser, &params(3.0)));
        let eraser = [Point::new(50.0, 5.1)];
        assert!(!path_hit(&line, &eraser, &params(3.0)));
    }

    #[test]
    fn test_fast_motion_is_sampled() {
        // A thin vertical stroke crossed by one long eraser motion.
        let thin = Path::from_points(
            InkColor::black(),
            0.5,
            vec![Point::new(50.0, -10.0), Point::new(50.0, 10.0)],
        );
        let store = store_with(vec![thin.clone()]);
        let hits = find_hits(
            &store,
            Some(Point::new(0.0, 0.0)),
            Point::new(100.0, 0.0),
            &params(0.5),
            &HashSet::new(),
        );
        assert_eq!(hits, vec![thin.id()]);
    }

    #[test]
    fn test_offset_is_honoured() {
        let mut line = horizontal(1.0);
        line.translate(kurbo::Vec2::new(0.0, 200.0));
        let store = store_with(vec![line.clone()]);
        let none = find_hits(&store, None, Point::new(50.0, 0.0), &params(1.0), &HashSet::new());
        assert!(none.is_empty());
        let hit = find_hits(&store, None, Point::new(50.0, 200.0), &params(1.0), &HashSet::new());
        assert_eq!(hit, vec![line.id()]);
    }

    #[test]
    fn test_stale_ids_dropped_on_commit() {
        let a = horizontal(2.0);
        let mut store = store_with(vec![a.clone()]);
        let gesture = EraseGesture::begin(&store, Point::new(10.0, 0.0), &params(3.0));
        assert_eq!(gesture.erasing(), &[a.id()]);

        store.remove_paths(&[a.id()]);
        assert!(gesture.commit(&store).is_empty());
    }

    #[test]
    fn test_each_path_staged_once() {
        let line = horizontal(2.0);
        let store = store_with(vec![line.clone()]);
        let mut gesture = EraseGesture::begin(&store, Point::new(10.0, 0.0), &params(3.0));
        assert_eq!(gesture.extend(&store, Point::new(20.0, 0.0), &params(3.0)), 0);
        assert_eq!(gesture.erasing().len(), 1);
    }
}
