//! Freehand stroke smoothing.
//!
//! A raw polyline is approximated by a chain of cubic Bézier segments using
//! least-squares fitting (Schneider, "An Algorithm for Automatically Fitting
//! Digitized Curves", Graphics Gems 1990): tangents are estimated at the ends,
//! points are parameterized by chord length, the fit is refined with
//! Newton-Raphson reparameterization and otherwise split at the point of
//! maximum error.

use crate::path::Path;
use kurbo::{CubicBez, ParamCurve, ParamCurveDeriv, Point, Vec2};

/// Default smoothing tolerance in screen pixels.
pub const SMOOTHING_CONSTANT: f64 = 5.0;

/// Reparameterization passes tried before splitting.
const MAX_REPARAMETERIZE_ITERATIONS: usize = 20;

/// World-space tolerance that corresponds to `constant` screen pixels at `scale`.
pub fn smoothing_tolerance(constant: f64, scale: f64) -> f64 {
    constant / scale
}

/// Fit cubic segments through `points` so that no point is farther than
/// `tolerance` from the curve at its parameter.
///
/// Consecutive duplicates are ignored. Fewer than two distinct points yield
/// no segments.
pub fn fit_curve(points: &[Point], tolerance: f64) -> Vec<CubicBez> {
    let mut distinct: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if distinct.last() != Some(&p) {
            distinct.push(p);
        }
    }
    if distinct.len() < 2 {
        return Vec::new();
    }

    let last = distinct.len() - 1;
    let left_tangent = normalize(distinct[1] - distinct[0]);
    let right_tangent = normalize(distinct[last - 1] - distinct[last]);

    let mut segments = Vec::new();
    fit_cubic(&distinct, left_tangent, right_tangent, tolerance, &mut segments);
    segments
}

/// Flatten segments into one point list: the first segment's start point,
/// followed by `c1, c2, end` of every segment (`1 + 3n` points).
pub fn flatten_segments(segments: &[CubicBez]) -> Vec<Point> {
    let Some(first) = segments.first() else {
        return Vec::new();
    };
    let mut points = Vec::with_capacity(1 + segments.len() * 3);
    points.push(first.p0);
    for seg in segments {
        points.extend([seg.p1, seg.p2, seg.p3]);
    }
    points
}

/// Replace a raw polyline path with its smoothed Bézier approximation.
///
/// Returns whether the path was changed.
pub fn smooth_path(path: &mut Path, tolerance: f64) -> bool {
    if path.is_bezier || path.len() < 2 {
        return false;
    }
    let segments = fit_curve(path.points(), tolerance);
    if segments.is_empty() {
        return false;
    }
    let count = segments.len();
    path.set_points(flatten_segments(&segments), true);
    log::debug!("Smoothed path {} into {} segment(s)", path.id(), count);
    true
}

fn fit_cubic(points: &[Point], left_tangent: Vec2, right_tangent: Vec2, tolerance: f64, out: &mut Vec<CubicBez>) {
    let first = points[0];
    let last = points[points.len() - 1];

    if points.len() == 2 {
        let dist = (last - first).hypot() / 3.0;
        out.push(CubicBez::new(
            first,
            first + left_tangent * dist,
            last + right_tangent * dist,
            last,
        ));
        return;
    }

    let tolerance_sq = tolerance * tolerance;
    let mut params = chord_length_parameterize(points);
    let mut bez = generate_bezier(points, &params, left_tangent, right_tangent);
    let (mut max_error, mut split) = compute_max_error(points, &bez, &params);

    if max_error <= tolerance_sq {
        out.push(bez);
        return;
    }

    // Close enough to be worth refining before giving up and splitting.
    if max_error <= tolerance_sq * 16.0 {
        for _ in 0..MAX_REPARAMETERIZE_ITERATIONS {
            let refined = reparameterize(&bez, points, &params);
            let candidate = generate_bezier(points, &refined, left_tangent, right_tangent);
            let (error, candidate_split) = compute_max_error(points, &candidate, &refined);
            if error <= tolerance_sq {
                out.push(candidate);
                return;
            }
            if error >= max_error {
                break;
            }
            params = refined;
            bez = candidate;
            max_error = error;
            split = candidate_split;
        }
    }

    let mut center = points[split - 1] - points[split + 1];
    if center.hypot2() < f64::EPSILON {
        let d = points[split - 1] - points[split];
        center = Vec2::new(-d.y, d.x);
    }
    let center_tangent = normalize(center);

    fit_cubic(&points[..=split], left_tangent, center_tangent, tolerance, out);
    fit_cubic(&points[split..], -center_tangent, right_tangent, tolerance, out);
}

/// Least-squares control points for fixed end tangents and parameters.
fn generate_bezier(points: &[Point], params: &[f64], left_tangent: Vec2, right_tangent: Vec2) -> CubicBez {
    let first = points[0];
    let last = points[points.len() - 1];
    let base = CubicBez::new(first, first, last, last);

    let mut c = [[0.0f64; 2]; 2];
    let mut x = [0.0f64; 2];
    for (&p, &u) in points.iter().zip(params) {
        let a0 = left_tangent * (3.0 * (1.0 - u) * (1.0 - u) * u);
        let a1 = right_tangent * (3.0 * (1.0 - u) * u * u);
        c[0][0] += a0.dot(a0);
        c[0][1] += a0.dot(a1);
        c[1][1] += a1.dot(a1);
        let tmp = p - base.eval(u);
        x[0] += a0.dot(tmp);
        x[1] += a1.dot(tmp);
    }
    c[1][0] = c[0][1];

    let det_c0_c1 = c[0][0] * c[1][1] - c[1][0] * c[0][1];
    let det_c0_x = c[0][0] * x[1] - c[1][0] * x[0];
    let det_x_c1 = x[0] * c[1][1] - x[1] * c[0][1];
    let (alpha_l, alpha_r) = if det_c0_c1.abs() < f64::EPSILON {
        (0.0, 0.0)
    } else {
        (det_x_c1 / det_c0_c1, det_c0_x / det_c0_c1)
    };

    let seg_length = (last - first).hypot();
    let epsilon = 1.0e-6 * seg_length;
    if alpha_l < epsilon || alpha_r < epsilon {
        // Wu/Barsky heuristic.
        let dist = seg_length / 3.0;
        return CubicBez::new(first, first + left_tangent * dist, last + right_tangent * dist, last);
    }
    CubicBez::new(first, first + left_tangent * alpha_l, last + right_tangent * alpha_r, last)
}

fn reparameterize(bez: &CubicBez, points: &[Point], params: &[f64]) -> Vec<f64> {
    points
        .iter()
        .zip(params)
        .map(|(&p, &u)| newton_raphson_root_find(bez, p, u))
        .collect()
}

/// One Newton-Raphson step towards the parameter of the point on `bez` closest to `point`.
fn newton_raphson_root_find(bez: &CubicBez, point: Point, u: f64) -> f64 {
    let d1 = bez.deriv();
    let d2 = d1.deriv();
    let diff = bez.eval(u) - point;
    let q1 = d1.eval(u).to_vec2();
    let q2 = d2.eval(u).to_vec2();
    let numerator = diff.dot(q1);
    let denominator = q1.dot(q1) + diff.dot(q2);
    if denominator.abs() < f64::EPSILON {
        u
    } else {
        u - numerator / denominator
    }
}

fn chord_length_parameterize(points: &[Point]) -> Vec<f64> {
    let mut params = Vec::with_capacity(points.len());
    let mut total = 0.0;
    params.push(0.0);
    for w in points.windows(2) {
        total += (w[1] - w[0]).hypot();
        params.push(total);
    }
    if total > 0.0 {
        for u in &mut params {
            *u /= total;
        }
    }
    params
}

/// Largest squared deviation over interior points and the index where it occurs.
fn compute_max_error(points: &[Point], bez: &CubicBez, params: &[f64]) -> (f64, usize) {
    let mut max_error = 0.0;
    let mut split = points.len() / 2;
    for i in 1..points.len() - 1 {
        let error = (bez.eval(params[i]) - points[i]).hypot2();
        if error >= max_error {
            max_error = error;
            split = i;
        }
    }
    (max_error, split)
}

fn normalize(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len < f64::EPSILON { Vec2::ZERO } else { v / len }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::InkColor;
    use kurbo::ParamCurveNearest;

    fn arc(samples: usize, radius: f64) -> Vec<Point> {
        (0..=samples)
            .map(|i| {
                let t = std::f64::consts::PI * i as f64 / samples as f64;
                Point::new(radius * t.cos(), radius * t.sin())
            })
            .collect()
    }

    #[test]
    fn test_tolerance_scales_inversely() {
        assert!((smoothing_tolerance(SMOOTHING_CONSTANT, 1.0) - 5.0).abs() < f64::EPSILON);
        assert!((smoothing_tolerance(SMOOTHING_CONSTANT, 2.0) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_straight_line_is_one_segment() {
        let points: Vec<Point> = (0..20).map(|i| Point::new(i as f64 * 5.0, 0.0)).collect();
        let segments = fit_curve(&points, 1.0);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].p0, points[0]);
        assert_eq!(segments[0].p3, points[19]);
    }

    #[test]
    fn test_fit_stays_within_tolerance() {
        let points = arc(60, 100.0);
        let tolerance = 0.5;
        let segments = fit_curve(&points, tolerance);
        assert!(!segments.is_empty());
        for p in &points {
            let nearest = segments
                .iter()
                .map(|seg| seg.nearest(*p, 1e-6).distance_sq.sqrt())
                .fold(f64::INFINITY, f64::min);
            assert!(nearest <= tolerance + 1e-6, "{p:?} is {nearest} away");
        }
    }

    #[test]
    fn test_tighter_tolerance_needs_more_segments() {
        let zigzag: Vec<Point> = (0..40)
            .map(|i| Point::new(i as f64 * 4.0, if i % 2 == 0 { 0.0 } else { 6.0 }))
            .collect();
        let loose = fit_curve(&zigzag, 20.0).len();
        let tight = fit_curve(&zigzag, 0.5).len();
        assert!(tight > loose);
    }

    #[test]
    fn test_flatten_shares_endpoints() {
        let segments = fit_curve(&arc(40, 50.0), 0.1);
        assert!(segments.len() > 1);
        let flat = flatten_segments(&segments);
        assert_eq!(flat.len(), 1 + 3 * segments.len());
        for (i, seg) in segments.iter().enumerate() {
            assert_eq!(flat[3 * i], seg.p0);
            assert_eq!(flat[3 * i + 3], seg.p3);
        }
    }

    #[test]
    fn test_degenerate_input() {
        assert!(fit_curve(&[], 1.0).is_empty());
        assert!(fit_curve(&[Point::new(1.0, 1.0), Point::new(1.0, 1.0)], 1.0).is_empty());
        assert!(flatten_segments(&[]).is_empty());
    }

    #[test]
    fn test_smooth_path_marks_bezier() {
        let mut path = Path::from_points(InkColor::black(), 3.0, arc(30, 80.0));
        let start = path.points()[0];
        let end = path.points()[30];
        assert!(smooth_path(&mut path, 1.0));
        assert!(path.is_bezier);
        assert_eq!(path.len() % 3, 1);
        assert_eq!(path.points()[0], start);
        assert_eq!(path.points()[path.len() - 1], end);
        // Already smoothed.
        assert!(!smooth_path(&mut path, 1.0));
    }
}
