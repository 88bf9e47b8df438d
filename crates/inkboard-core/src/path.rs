//! Ink paths: the strokes that make up a picture.

use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use uuid::Uuid;

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for paths.
pub type PathId = Uuid;

/// Serializable ink color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl InkColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Format as a CSS hex color (`#rrggbb`, or `#rrggbbaa` when translucent).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. Anything else is rejected.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
                255,
            )),
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }
}

impl Default for InkColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for InkColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<InkColor> for Color {
    fn from(color: InkColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Milliseconds since the UNIX epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A freehand stroke.
///
/// `points` are stored in world coordinates in drawing order. Moving a path
/// only changes `offset`, which is applied on top of the stored points, so a
/// move never rewrites the point list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    pub(crate) id: PathId,
    /// Stroke color.
    pub color: InkColor,
    width: f64,
    points: Vec<Point>,
    /// Whether `points` is a chained cubic Bézier (`p0, c1, c2, p3, c1, c2, p3, ...`)
    /// rather than a polyline.
    pub is_bezier: bool,
    offset: Vec2,
    /// Creation time in milliseconds since the UNIX epoch.
    pub timestamp: u64,
    /// Cached bounding box; `None` means it must be recomputed.
    #[serde(skip)]
    boundary: Cell<Option<Rect>>,
}

impl Path {
    /// Create a new empty path.
    pub fn new(color: InkColor, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            width,
            points: Vec::new(),
            is_bezier: false,
            offset: Vec2::ZERO,
            timestamp: now_millis(),
            boundary: Cell::new(None),
        }
    }

    /// Create a polyline path from existing points.
    pub fn from_points(color: InkColor, width: f64, points: Vec<Point>) -> Self {
        let mut path = Self::new(color, width);
        path.points = points;
        path
    }

    pub fn id(&self) -> PathId {
        self.id
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        self.invalidate();
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point unless it equals the last one. Returns whether it was added.
    pub fn push_point(&mut self, point: Point) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        self.invalidate();
        true
    }

    /// Replace the point list and its interpretation.
    pub fn set_points(&mut self, points: Vec<Point>, is_bezier: bool) {
        self.points = points;
        self.is_bezier = is_bezier;
        self.invalidate();
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.invalidate();
    }

    /// Shift the path by `delta` (world units).
    pub fn translate(&mut self, delta: Vec2) {
        self.set_offset(self.offset + delta);
    }

    /// Points with the offset applied.
    pub fn world_points(&self) -> impl Iterator<Item = Point> + '_ {
        let offset = self.offset;
        self.points.iter().map(move |p| *p + offset)
    }

    /// Offset-aware bounding box, inflated by half the stroke width.
    ///
    /// Computed on first access after a mutation and memoized until the next one.
    pub fn boundary(&self) -> Rect {
        if let Some(rect) = self.boundary.get() {
            return rect;
        }
        let rect = self.compute_boundary();
        self.boundary.set(Some(rect));
        rect
    }

    /// Whether the boundary cache currently holds a value.
    pub fn has_cached_boundary(&self) -> bool {
        self.boundary.get().is_some()
    }

    fn compute_boundary(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        let mut rect = Rect::from_points(*first, *first);
        for point in &self.points[1..] {
            rect = rect.union_pt(*point);
        }
        let half = self.width / 2.0;
        rect.inflate(half, half) + self.offset
    }

    fn invalidate(&self) {
        self.boundary.set(None);
    }

    /// Build the renderable outline in world coordinates.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.world_points();
        let Some(first) = points.next() else {
            return path;
        };
        path.move_to(first);
        if self.is_bezier {
            let rest: Vec<Point> = points.collect();
            for chunk in rest.chunks_exact(3) {
                path.curve_to(chunk[0], chunk[1], chunk[2]);
            }
        } else {
            for point in points {
                path.line_to(point);
            }
        }
        path
    }

    /// Partial update describing this path's current offset.
    pub fn offset_update(&self) -> PathUpdate {
        PathUpdate {
            id: self.id,
            offset: self.offset,
        }
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.color == other.color
            && self.width == other.width
            && self.points == other.points
            && self.is_bezier == other.is_bezier
            && self.offset == other.offset
            && self.timestamp == other.timestamp
    }
}

/// Partial path update sent to the picture store after a move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathUpdate {
    pub id: PathId,
    pub offset: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> Path {
        Path::from_points(
            InkColor::black(),
            2.0,
            vec![Point::new(0.0, 0.0), Point::new(100.0, 50.0), Point::new(50.0, 100.0)],
        )
    }

    #[test]
    fn test_boundary_includes_half_width() {
        let path = sample_path();
        let bounds = path.boundary();
        assert!((bounds.x0 + 1.0).abs() < f64::EPSILON);
        assert!((bounds.y0 + 1.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 101.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 101.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_follows_offset() {
        let mut path = sample_path();
        let before = path.boundary();
        assert!(path.has_cached_boundary());

        path.translate(Vec2::new(10.0, -5.0));
        assert!(!path.has_cached_boundary());

        let after = path.boundary();
        assert!((after.x0 - (before.x0 + 10.0)).abs() < 1e-9);
        assert!((after.y1 - (before.y1 - 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_push_point_deduplicates() {
        let mut path = Path::new(InkColor::black(), 1.0);
        assert!(path.push_point(Point::new(1.0, 1.0)));
        assert!(!path.push_point(Point::new(1.0, 1.0)));
        assert!(path.push_point(Point::new(2.0, 1.0)));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_set_points_invalidates_cache() {
        let mut path = sample_path();
        let _ = path.boundary();
        path.set_points(vec![Point::new(500.0, 500.0), Point::new(510.0, 500.0)], false);
        assert!(path.boundary().x0 > 400.0);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(InkColor::from_hex("#ff0000"), Some(InkColor::new(255, 0, 0, 255)));
        assert_eq!(InkColor::from_hex("#0f0"), Some(InkColor::new(0, 255, 0, 255)));
        assert_eq!(InkColor::from_hex("#00000080"), Some(InkColor::new(0, 0, 0, 128)));
        assert_eq!(InkColor::from_hex("red"), None);
        assert_eq!(InkColor::from_hex("#12345"), None);
        assert_eq!(InkColor::new(18, 52, 86, 255).to_hex(), "#123456");
        assert_eq!(InkColor::new(18, 52, 86, 16).to_hex(), "#12345610");
    }

    #[test]
    fn test_bezier_outline_uses_curves() {
        let mut path = Path::new(InkColor::black(), 1.0);
        path.set_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 1.0),
                Point::new(3.0, 0.0),
            ],
            true,
        );
        let outline = path.to_bez_path();
        assert_eq!(outline.elements().len(), 2);
        assert!(matches!(outline.elements()[1], kurbo::PathEl::CurveTo(..)));
    }

    #[test]
    fn test_equality_ignores_cache() {
        let path = sample_path();
        let copy = path.clone();
        let _ = path.boundary();
        assert_eq!(path, copy);
    }
}
