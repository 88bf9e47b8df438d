//! Geometry helpers shared by the eraser and the lasso.
//!
//! Both tools work on the same discrete samples of a path: polylines are
//! walked at a fixed world-unit spacing, cubic segments at a step count
//! derived from their chord length.

use crate::path::Path;
use kurbo::{CubicBez, ParamCurve, Point, Rect, Vec2};

/// Distance between samples along polyline segments (world units).
pub const POLYLINE_SAMPLE_SPACING: f64 = 1.0;

/// Extra distance the containment ray extends past the polygon.
const RAY_OVERSHOOT: f64 = 1000.0;

/// Visit sample points of `segment` every `spacing` units, both ends included.
///
/// Returns `true` as soon as `visit` does. A zero-length segment yields nothing.
fn visit_segment(a: Point, b: Point, spacing: f64, visit: &mut impl FnMut(Point) -> bool) -> bool {
    let delta = b - a;
    let len = delta.hypot();
    if len < f64::EPSILON {
        return false;
    }
    let dir = delta / len;
    let steps = (len / spacing).floor() as usize;
    for i in 0..=steps {
        if visit(a + dir * (i as f64 * spacing)) {
            return true;
        }
    }
    if (steps as f64) * spacing < len {
        return visit(b);
    }
    false
}

/// Visit `cubic` at evenly spaced parameters. The step count comes from the
/// chord length, with at least one step so both ends are always visited.
fn visit_cubic(cubic: CubicBez, spacing: f64, visit: &mut impl FnMut(Point) -> bool) -> bool {
    let net = (cubic.p1 - cubic.p0).hypot() + (cubic.p2 - cubic.p1).hypot() + (cubic.p3 - cubic.p2).hypot();
    if net < f64::EPSILON {
        return false;
    }
    let chord = (cubic.p3 - cubic.p0).hypot();
    let steps = (chord / spacing).ceil().max(1.0) as usize;
    for i in 0..=steps {
        if visit(cubic.eval(i as f64 / steps as f64)) {
            return true;
        }
    }
    false
}

/// Walk the rendered sample points of `path` (offset applied) until `visit` returns `true`.
///
/// Returns whether the walk was stopped early.
pub fn visit_path_samples(path: &Path, spacing: f64, mut visit: impl FnMut(Point) -> bool) -> bool {
    let offset = path.offset();
    let points = path.points();
    if path.is_bezier {
        let Some(&first) = points.first() else {
            return false;
        };
        let mut start = first + offset;
        for chunk in points[1..].chunks_exact(3) {
            let cubic = CubicBez::new(start, chunk[0] + offset, chunk[1] + offset, chunk[2] + offset);
            if visit_cubic(cubic, spacing, &mut visit) {
                return true;
            }
            start = cubic.p3;
        }
        false
    } else {
        points
            .windows(2)
            .any(|w| visit_segment(w[0] + offset, w[1] + offset, spacing, &mut visit))
    }
}

/// Collect all sample points of `path`.
pub fn path_samples(path: &Path, spacing: f64) -> Vec<Point> {
    let mut samples = Vec::new();
    visit_path_samples(path, spacing, |p| {
        samples.push(p);
        false
    });
    samples
}

/// Sample the straight motion from `from` to `to` every `spacing` units.
///
/// A degenerate motion (a tap) yields just `to`.
pub fn sample_motion(from: Point, to: Point, spacing: f64) -> Vec<Point> {
    let mut samples = Vec::new();
    let moved = visit_segment(from, to, spacing, &mut |p| {
        samples.push(p);
        false
    });
    debug_assert!(!moved);
    if samples.is_empty() {
        samples.push(to);
    }
    samples
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).hypot()).sum()
}

/// Bounding box of a point list, or `None` when empty.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    Some(rest.iter().fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p)))
}

/// Whether two rectangles share at least one point (edges included).
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Closed-segment intersection test based on 2D cross products.
///
/// Parallel segments only intersect when they are collinear and overlap.
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let r: Vec2 = p2 - p1;
    let s: Vec2 = q2 - q1;
    let qp: Vec2 = q1 - p1;
    let denom = r.cross(s);

    if denom.abs() < f64::EPSILON {
        if qp.cross(r).abs() > f64::EPSILON {
            return false;
        }
        let rr = r.dot(r);
        if rr < f64::EPSILON {
            // `p` is a single point lying on the line through `q`.
            let ss = s.dot(s);
            if ss < f64::EPSILON {
                return qp.hypot2() < f64::EPSILON;
            }
            let t = (p1 - q1).dot(s) / ss;
            return (0.0..=1.0).contains(&t);
        }
        let t0 = qp.dot(r) / rr;
        let t1 = t0 + s.dot(r) / rr;
        let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        return hi >= 0.0 && lo <= 1.0;
    }

    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Ray-casting point-in-polygon test.
///
/// The ray runs from `point` to `(max_x + 1000, point.y)`; an odd number of
/// edge crossings (closing edge included) means inside.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let max_x = polygon.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let ray_end = Point::new(max_x + RAY_OVERSHOOT, point.y);

    let mut crossings = 0usize;
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        if segments_intersect(point, ray_end, a, b) {
            crossings += 1;
        }
    }
    crossings % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::InkColor;

    #[test]
    fn test_segments_cross() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ));
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(5.0, 0.0),
            Point::new(6.0, -1.0),
        ));
    }

    #[test]
    fn test_parallel_segments() {
        // Parallel, not collinear.
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 1.0),
        ));
        // Collinear and overlapping.
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(15.0, 0.0),
        ));
        // Collinear, disjoint.
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(11.0, 0.0),
            Point::new(15.0, 0.0),
        ));
    }

    #[test]
    fn test_point_in_unit_square() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(-5.0, 5.0), &square));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upwards.
        let u = [
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 20.0), &u));
        assert!(!point_in_polygon(Point::new(15.0, 20.0), &u));
        assert!(point_in_polygon(Point::new(25.0, 20.0), &u));
    }

    #[test]
    fn test_polyline_samples_are_spaced() {
        let path = Path::from_points(
            InkColor::black(),
            1.0,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        );
        let samples = path_samples(&path, 1.0);
        assert_eq!(samples.len(), 11);
        assert!((samples[10].x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_samples_apply_offset() {
        let mut path = Path::from_points(
            InkColor::black(),
            1.0,
            vec![Point::new(0.0, 0.0), Point::new(2.5, 0.0)],
        );
        path.translate(Vec2::new(100.0, 100.0));
        let samples = path_samples(&path, 1.0);
        assert!(samples.iter().all(|p| (p.y - 100.0).abs() < 1e-9));
        assert!((samples.last().map(|p| p.x).unwrap_or_default() - 102.5).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_segment_has_no_samples() {
        let path = Path::from_points(
            InkColor::black(),
            1.0,
            vec![Point::new(3.0, 3.0), Point::new(3.0, 3.0)],
        );
        assert!(path_samples(&path, 1.0).is_empty());
    }

    #[test]
    fn test_bezier_samples_follow_curve() {
        let mut path = Path::new(InkColor::black(), 1.0);
        path.set_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
            ],
            true,
        );
        let samples = path_samples(&path, 1.0);
        assert_eq!(samples.len(), 11);
        assert!((samples[0].x).abs() < 1e-9);
        let last = samples[samples.len() - 1];
        assert!((last.x - 10.0).abs() < 1e-9 && last.y.abs() < 1e-9);
    }

    #[test]
    fn test_curved_segment_steps_follow_chord() {
        let mut path = Path::new(InkColor::black(), 1.0);
        path.set_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 100.0),
                Point::new(4.0, 100.0),
                Point::new(4.0, 0.0),
            ],
            true,
        );
        let samples = path_samples(&path, 1.0);
        assert_eq!(samples.len(), 5);
        // t = 0.5 lands on the top of the arch.
        assert!((samples[2].x - 2.0).abs() < 1e-9);
        assert!((samples[2].y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_closed_loop_cubic_keeps_its_end_samples() {
        let mut path = Path::new(InkColor::black(), 1.0);
        path.set_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(20.0, 20.0),
                Point::new(-20.0, 20.0),
                Point::new(0.0, 0.0),
            ],
            true,
        );
        let samples = path_samples(&path, 1.0);
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_motion_sampling() {
        let samples = sample_motion(Point::new(0.0, 0.0), Point::new(5.0, 0.0), 2.0);
        assert_eq!(samples.len(), 4); // 0, 2, 4 and the endpoint 5
        let tap = sample_motion(Point::new(1.0, 1.0), Point::new(1.0, 1.0), 2.0);
        assert_eq!(tap, vec![Point::new(1.0, 1.0)]);
    }

    #[test]
    fn test_polyline_length() {
        let pts = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(3.0, 10.0)];
        assert!((polyline_length(&pts) - 11.0).abs() < 1e-9);
    }
}
