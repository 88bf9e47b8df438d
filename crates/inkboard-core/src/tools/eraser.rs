//! Eraser: stage hit paths while moving, remove them on release.

use super::ToolContext;
use crate::eraser::EraseGesture;
use crate::history::Operation;
use kurbo::Point;

pub(crate) fn begin(ctx: &mut ToolContext<'_>, screen: Point) -> EraseGesture {
    let params = ctx.eraser_params();
    let gesture = EraseGesture::begin(ctx.paths, ctx.world(screen), &params);
    if !gesture.erasing().is_empty() {
        ctx.request_redraw();
    }
    gesture
}

pub(crate) fn update(ctx: &mut ToolContext<'_>, gesture: &mut EraseGesture, screen: Point) {
    let params = ctx.eraser_params();
    let point = ctx.world(screen);
    if gesture.extend(ctx.paths, point, &params) > 0 {
        ctx.request_redraw();
    }
}

pub(crate) fn finish(ctx: &mut ToolContext<'_>, gesture: EraseGesture) {
    let ids = gesture.commit(ctx.paths);
    if ids.is_empty() {
        return;
    }
    log::debug!("Erasing {} path(s)", ids.len());
    let paths = ctx.paths.cloned(&ids);
    ctx.commit(Operation::Remove { paths });
}
