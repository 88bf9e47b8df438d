//! Backend-independent draw items for one frame.

use crate::renderer::RenderContext;
use inkboard_core::geometry::rects_overlap;
use inkboard_core::{Lasso, PathId, Viewport};
use kurbo::{Affine, BezPath, Rect};
use peniko::Color;

/// Thickness of a scrollbar thumb in logical pixels.
const SCROLLBAR_THICKNESS: f64 = 6.0;
/// Gap between a thumb and the element edge.
const SCROLLBAR_MARGIN: f64 = 2.0;
/// Shortest thumb that is still easy to see.
const SCROLLBAR_MIN_LENGTH: f64 = 20.0;

/// A single thing to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    /// A stroke in world coordinates. `id` is `None` for the stroke being drawn.
    Stroke {
        id: Option<PathId>,
        path: BezPath,
        color: Color,
        width: f64,
    },
    /// The lasso outline in world coordinates.
    Lasso { outline: BezPath, closed: bool },
    /// A scrollbar thumb in element coordinates (logical pixels).
    ScrollbarThumb { rect: Rect, opacity: f64 },
}

/// Build the ordered draw items for the board in `ctx`.
///
/// Committed paths come first in draw order, skipping paths staged by the
/// eraser and shifting lasso-selected paths by the drag preview. The live
/// stroke, the lasso outline and the scrollbar thumbs follow.
pub fn build_display_list(ctx: &RenderContext) -> Vec<DrawItem> {
    let board = ctx.board;
    let viewport = board.viewport();
    let visible = viewport.visible_world_rect();
    let erasing = board.router().erasing();
    let mut items = Vec::with_capacity(board.paths().len() + 3);

    for path in board.paths().iter() {
        if erasing.contains(&path.id()) {
            continue;
        }
        let preview = board.lasso().preview_offset(path.id());
        let bounds = match preview {
            Some(delta) => path.boundary() + delta,
            None => path.boundary(),
        };
        if !rects_overlap(bounds, visible) {
            continue;
        }
        let mut outline = path.to_bez_path();
        if let Some(delta) = preview {
            outline.apply_affine(Affine::translate(delta));
        }
        items.push(DrawItem::Stroke {
            id: Some(path.id()),
            path: outline,
            color: path.color.into(),
            width: path.width(),
        });
    }

    if let Some(live) = board.router().live_path() {
        items.push(DrawItem::Stroke {
            id: None,
            path: live.to_bez_path(),
            color: live.color.into(),
            width: live.width(),
        });
    }

    if let Some(lasso) = board.lasso().current() {
        items.push(DrawItem::Lasso {
            outline: lasso_outline(lasso),
            closed: lasso.is_closed(),
        });
    }

    if ctx.scrollbar_opacity > 0.0 {
        for rect in scrollbar_thumbs(viewport, board.paths().content_bounds()) {
            items.push(DrawItem::ScrollbarThumb {
                rect,
                opacity: ctx.scrollbar_opacity,
            });
        }
    }
    items
}

fn lasso_outline(lasso: &Lasso) -> BezPath {
    let mut outline = BezPath::new();
    let mut points = lasso.polygon().into_iter();
    let Some(first) = points.next() else {
        return outline;
    };
    outline.move_to(first);
    for point in points {
        outline.line_to(point);
    }
    if lasso.is_closed() {
        outline.close_path();
    }
    outline
}

/// Scrollbar thumbs for the scrollable extent: the content together with the
/// visible area. An axis whose extent fits in view gets no thumb.
pub fn scrollbar_thumbs(viewport: &Viewport, content: Option<Rect>) -> Vec<Rect> {
    let Some(content) = content else {
        return Vec::new();
    };
    let visible = viewport.visible_world_rect();
    let extent = content.union(visible);
    let size = viewport.size;
    let mut thumbs = Vec::new();

    if extent.width() > visible.width() + f64::EPSILON {
        let (start, length) = thumb_span(extent.x0, extent.width(), visible.x0, visible.width(), size.width);
        let y1 = size.height - SCROLLBAR_MARGIN;
        thumbs.push(Rect::new(start, y1 - SCROLLBAR_THICKNESS, start + length, y1));
    }
    if extent.height() > visible.height() + f64::EPSILON {
        let (start, length) = thumb_span(extent.y0, extent.height(), visible.y0, visible.height(), size.height);
        let x1 = size.width - SCROLLBAR_MARGIN;
        thumbs.push(Rect::new(x1 - SCROLLBAR_THICKNESS, start, x1, start + length));
    }
    thumbs
}

/// Thumb start and length along a track of `track` pixels.
fn thumb_span(extent_start: f64, extent_len: f64, view_start: f64, view_len: f64, track: f64) -> (f64, f64) {
    let length = (track * view_len / extent_len).clamp(SCROLLBAR_MIN_LENGTH.min(track), track);
    let travel = extent_len - view_len;
    let fraction = if travel > 0.0 {
        ((view_start - extent_start) / travel).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (fraction * (track - length), length)
}
