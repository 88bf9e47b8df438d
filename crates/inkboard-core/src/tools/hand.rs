//! Hand: one-pointer pan and two-pointer pinch zoom.

use super::ToolContext;
use crate::input::PointerId;
use kurbo::Point;

/// Last known position of a pointer taking part in a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPointer {
    pub id: PointerId,
    pub position: Point,
}

/// Pan by the pointer's screen movement.
pub(crate) fn pan(ctx: &mut ToolContext<'_>, last: &mut Point, screen: Point) {
    let delta = screen - *last;
    *last = screen;
    if delta.hypot2() > 0.0 {
        ctx.viewport.pan(delta);
    }
}

/// Move one pinch pointer: pan by the centroid change, then zoom around
/// the new centroid by the change in pointer distance.
pub(crate) fn pinch(
    ctx: &mut ToolContext<'_>,
    first: &mut TrackedPointer,
    second: &mut TrackedPointer,
    id: PointerId,
    screen: Point,
) {
    let old_centroid = first.position.midpoint(second.position);
    let old_distance = (first.position - second.position).hypot();

    if first.id == id {
        first.position = screen;
    } else if second.id == id {
        second.position = screen;
    } else {
        return;
    }

    let new_centroid = first.position.midpoint(second.position);
    let new_distance = (first.position - second.position).hypot();

    ctx.viewport.pan(new_centroid - old_centroid);
    if old_distance > f64::EPSILON && new_distance > f64::EPSILON {
        ctx.viewport.zoom_at(new_centroid, new_distance / old_distance);
    }
}
