//! Lasso: draw a selection polygon or drag an existing one.

use super::ToolContext;
use crate::history::Operation;
use kurbo::Point;

/// What a lasso press started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LassoPress {
    Drawing,
    Dragging,
}

/// Start dragging when pressing inside the closed lasso, else start a new one.
pub(crate) fn begin(ctx: &mut ToolContext<'_>, screen: Point) -> LassoPress {
    let point = ctx.world(screen);
    ctx.request_redraw();
    if ctx.lasso.hit_closed(point) {
        ctx.lasso.start_drag(point);
        LassoPress::Dragging
    } else {
        ctx.lasso.start(point);
        LassoPress::Drawing
    }
}

pub(crate) fn extend(ctx: &mut ToolContext<'_>, screen: Point) {
    let point = ctx.world(screen);
    ctx.lasso.extend(point);
    ctx.request_redraw();
}

pub(crate) fn drag(ctx: &mut ToolContext<'_>, screen: Point) {
    let point = ctx.world(screen);
    if ctx.lasso.drag_to(point) != kurbo::Vec2::ZERO {
        ctx.request_redraw();
    }
}

pub(crate) fn finish_drawing(ctx: &mut ToolContext<'_>) {
    let scale = ctx.viewport.scale();
    ctx.lasso.finish_drawing(
        ctx.paths,
        scale,
        ctx.config.lasso_min_length,
        ctx.config.polyline_sample_spacing,
    );
    ctx.request_redraw();
}

pub(crate) fn finish_drag(ctx: &mut ToolContext<'_>) {
    let Some(moved) = ctx.lasso.finish_drag(ctx.paths) else {
        return;
    };
    log::debug!("Moving {} path(s) by {:?}", moved.path_ids.len(), moved.delta);
    ctx.commit(Operation::Move {
        path_ids: moved.path_ids,
        delta: moved.delta,
        lasso_id: Some(moved.lasso_id),
    });
}
