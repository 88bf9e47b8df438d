//! Lasso selection: polygon drawing, overlap selection and drag preview.

use crate::geometry::{self, point_in_polygon, points_bounds, polyline_length, rects_overlap};
use crate::path::PathId;
use crate::path_store::PathStore;
use kurbo::{Point, Rect, Vec2};
use std::cell::Cell;
use uuid::Uuid;

/// Unique identifier for lassos.
pub type LassoId = Uuid;

/// Lassos shorter than this on screen (pixels) are treated as accidental taps.
pub const LASSO_MIN_LENGTH: f64 = 50.0;

/// A selection polygon.
///
/// `points` are world coordinates as drawn; `offset` is the display offset
/// accumulated by dragging. `pending_delta` is the part of the drag that has
/// not been committed as a move yet.
#[derive(Debug, Clone)]
pub struct Lasso {
    id: LassoId,
    points: Vec<Point>,
    is_closed: bool,
    offset: Vec2,
    selected: Vec<PathId>,
    pending_delta: Vec2,
    /// Cached un-offset bounding box.
    bounds: Cell<Option<Rect>>,
}

impl Lasso {
    /// Start an open lasso at `start`.
    pub fn new(start: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            is_closed: false,
            offset: Vec2::ZERO,
            selected: Vec::new(),
            pending_delta: Vec2::ZERO,
            bounds: Cell::new(None),
        }
    }

    /// A closed rectangular lasso selecting `selected`.
    pub fn rectangle(rect: Rect, selected: Vec<PathId>) -> Self {
        let mut lasso = Self::new(Point::new(rect.x0, rect.y0));
        lasso.points.extend([
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ]);
        lasso.is_closed = true;
        lasso.selected = selected;
        lasso
    }

    pub fn id(&self) -> LassoId {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Ids of the selected paths.
    pub fn selected(&self) -> &[PathId] {
        &self.selected
    }

    pub fn is_selected(&self, id: PathId) -> bool {
        self.selected.contains(&id)
    }

    pub fn pending_delta(&self) -> Vec2 {
        self.pending_delta
    }

    /// Append a point unless it repeats the last one.
    pub fn push_point(&mut self, point: Point) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        self.bounds.set(None);
        true
    }

    /// Length of the drawn outline (world units).
    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }

    /// Polygon vertices with the offset applied.
    pub fn polygon(&self) -> Vec<Point> {
        self.points.iter().map(|p| *p + self.offset).collect()
    }

    /// Bounding box of the drawn points, ignoring the offset.
    pub fn original_bounds(&self) -> Rect {
        if let Some(rect) = self.bounds.get() {
            return rect;
        }
        let rect = points_bounds(&self.points).unwrap_or(Rect::ZERO);
        self.bounds.set(Some(rect));
        rect
    }

    /// Bounding box at the current offset.
    pub fn bounds(&self) -> Rect {
        self.original_bounds() + self.offset
    }

    /// Whether `point` lies inside the (offset) polygon.
    pub fn contains(&self, point: Point) -> bool {
        rects_overlap(self.bounds(), Rect::from_points(point, point))
            && point_in_polygon(point - self.offset, &self.points)
    }

    /// Close the lasso and select every path that overlaps it.
    pub fn close(&mut self, store: &PathStore, spacing: f64) {
        self.is_closed = true;
        self.selected = overlapping_paths(store, &self.polygon(), spacing);
    }

    /// Drag by `delta`: moves the outline and accumulates the uncommitted delta.
    pub fn drag_by(&mut self, delta: Vec2) {
        self.offset += delta;
        self.pending_delta += delta;
    }

    /// Move the outline without touching the pending delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Take the uncommitted drag delta, resetting it to zero.
    pub fn take_pending_delta(&mut self) -> Vec2 {
        std::mem::replace(&mut self.pending_delta, Vec2::ZERO)
    }

    /// Drop ids that no longer exist in `store`.
    pub fn retain_existing(&mut self, store: &PathStore) {
        self.selected.retain(|id| store.contains(*id));
    }
}

/// Ids of paths with at least one sample inside `polygon`, in draw order.
pub fn overlapping_paths(store: &PathStore, polygon: &[Point], spacing: f64) -> Vec<PathId> {
    let Some(bounds) = points_bounds(polygon) else {
        return Vec::new();
    };
    store
        .iter()
        .filter(|path| rects_overlap(bounds, path.boundary()))
        .filter(|path| geometry::visit_path_samples(path, spacing, |p| point_in_polygon(p, polygon)))
        .map(|path| path.id())
        .collect()
}

/// A finished lasso drag ready to be recorded as a move.
#[derive(Debug, Clone, PartialEq)]
pub struct LassoMove {
    pub lasso_id: LassoId,
    pub path_ids: Vec<PathId>,
    pub delta: Vec2,
}

/// The interaction session's lasso state.
#[derive(Debug, Default)]
pub struct LassoSession {
    lasso: Option<Lasso>,
    last_drag_point: Option<Point>,
}

impl LassoSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Lasso> {
        self.lasso.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Lasso> {
        self.lasso.as_mut()
    }

    /// Replace the current lasso.
    pub fn set(&mut self, lasso: Lasso) {
        self.lasso = Some(lasso);
        self.last_drag_point = None;
    }

    pub fn clear(&mut self) {
        self.lasso = None;
        self.last_drag_point = None;
    }

    /// Preview offset of a path being dragged, if it is selected.
    pub fn preview_offset(&self, id: PathId) -> Option<Vec2> {
        self.lasso
            .as_ref()
            .filter(|lasso| lasso.pending_delta != Vec2::ZERO && lasso.is_selected(id))
            .map(|lasso| lasso.pending_delta)
    }

    /// Whether `point` falls inside the current closed lasso.
    pub fn hit_closed(&self, point: Point) -> bool {
        self.lasso
            .as_ref()
            .is_some_and(|lasso| lasso.is_closed && lasso.contains(point))
    }

    /// Start a new open lasso at `point`, discarding the old one.
    pub fn start(&mut self, point: Point) {
        self.set(Lasso::new(point));
    }

    /// Extend the open lasso.
    pub fn extend(&mut self, point: Point) {
        if let Some(lasso) = self.lasso.as_mut().filter(|l| !l.is_closed) {
            lasso.push_point(point);
        }
    }

    /// Close the open lasso if it is long enough on screen, else discard it.
    ///
    /// Returns whether a lasso was kept.
    pub fn finish_drawing(&mut self, store: &PathStore, scale: f64, min_length: f64, spacing: f64) -> bool {
        let Some(lasso) = self.lasso.as_mut() else {
            return false;
        };
        let screen_length = lasso.length() * scale;
        if screen_length < min_length {
            log::debug!("Discarding lasso of {screen_length:.1}px");
            self.clear();
            return false;
        }
        lasso.close(store, spacing);
        log::debug!("Lasso {} selected {} path(s)", lasso.id, lasso.selected.len());
        true
    }

    /// Begin dragging the closed lasso from `point`.
    pub fn start_drag(&mut self, point: Point) {
        self.last_drag_point = Some(point);
    }

    /// Drag to `point`. Returns the applied delta.
    pub fn drag_to(&mut self, point: Point) -> Vec2 {
        let (Some(lasso), Some(last)) = (self.lasso.as_mut(), self.last_drag_point) else {
            return Vec2::ZERO;
        };
        let delta = point - last;
        lasso.drag_by(delta);
        self.last_drag_point = Some(point);
        delta
    }

    /// End the drag, returning the move to commit when the lasso moved.
    pub fn finish_drag(&mut self, store: &PathStore) -> Option<LassoMove> {
        self.last_drag_point = None;
        let lasso = self.lasso.as_mut()?;
        let delta = lasso.take_pending_delta();
        if delta == Vec2::ZERO {
            return None;
        }
        let before = lasso.selected.len();
        lasso.retain_existing(store);
        if lasso.selected.len() < before {
            log::warn!("Dropped {} selected path(s) removed meanwhile", before - lasso.selected.len());
        }
        if lasso.selected.is_empty() {
            return None;
        }
        Some(LassoMove {
            lasso_id: lasso.id,
            path_ids: lasso.selected.clone(),
            delta,
        })
    }
}
