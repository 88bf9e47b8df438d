//! Pen: freehand strokes.

use super::ToolContext;
use crate::history::Operation;
use crate::path::{InkColor, Path};
use crate::smoothing::{smooth_path, smoothing_tolerance};
use kurbo::Point;

/// Start a stroke at `screen`.
pub(crate) fn begin(ctx: &mut ToolContext<'_>, screen: Point, color: InkColor, width: f64) -> Path {
    let mut path = Path::new(color, width);
    path.push_point(ctx.world(screen));
    ctx.request_redraw();
    path
}

/// Extend the live stroke. Points are kept raw until the stroke ends.
pub(crate) fn update(ctx: &mut ToolContext<'_>, path: &mut Path, screen: Point) {
    if path.push_point(ctx.world(screen)) {
        ctx.request_redraw();
    }
}

/// Smooth and commit the stroke; single-point taps are dropped.
pub(crate) fn finish(ctx: &mut ToolContext<'_>, mut path: Path) {
    ctx.request_redraw();
    if path.len() < 2 {
        log::debug!("Discarding single-point stroke");
        return;
    }
    let tolerance = smoothing_tolerance(ctx.config.smoothing_constant, ctx.viewport.scale());
    smooth_path(&mut path, tolerance);
    log::debug!("Committing stroke {} ({} points)", path.id(), path.len());
    ctx.commit(Operation::Add { paths: vec![path] });
}
