//! Viewport module for scroll/zoom transforms.

use crate::frame::FrameRequester;
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Viewport maps between screen (page) coordinates and world coordinates.
///
/// The scroll offset is expressed in scaled world units: a world point `w`
/// appears at element position `w * scale - scroll`. Scroll changes are
/// buffered as a pending value and committed once per frame by
/// [`Viewport::commit_scroll`]; conversions always use the latest value.
#[derive(Debug, Clone)]
pub struct Viewport {
    scroll: Vec2,
    pending_scroll: Option<Vec2>,
    scale: f64,
    /// Minimum allowed scale.
    pub min_scale: f64,
    /// Maximum allowed scale.
    pub max_scale: f64,
    /// Device pixel ratio of the rendering surface.
    pub device_pixel_ratio: f64,
    /// Position of the element's top-left corner on the page.
    pub element_origin: Point,
    /// Logical element size.
    pub size: Size,
    frames: FrameRequester,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.1, 10.0)
    }
}

impl Viewport {
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        Self {
            scroll: Vec2::ZERO,
            pending_scroll: None,
            scale: 1.0,
            min_scale,
            max_scale,
            device_pixel_ratio: 1.0,
            element_origin: Point::ZERO,
            size: Size::new(800.0, 600.0),
            frames: FrameRequester::default(),
        }
    }

    /// Route scroll-commit and redraw requests to `frames`.
    pub fn set_frame_requester(&mut self, frames: FrameRequester) {
        self.frames = frames;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scroll offset used for conversions (pending if any, else committed).
    pub fn scroll(&self) -> Vec2 {
        self.pending_scroll.unwrap_or(self.scroll)
    }

    /// Last committed scroll offset.
    pub fn committed_scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll.is_some()
    }

    /// Resize the element and update its page position and pixel ratio.
    pub fn resize(&mut self, origin: Point, size: Size, device_pixel_ratio: f64) {
        self.element_origin = origin;
        self.size = size;
        self.device_pixel_ratio = device_pixel_ratio;
        self.frames.request_redraw();
    }

    /// Convert a screen point to world coordinates.
    ///
    /// With `ignore_scroll` only the element origin is removed, yielding
    /// element-relative coordinates.
    pub fn to_canvas(&self, screen: Point, ignore_scroll: bool) -> Point {
        let local = screen - self.element_origin;
        if ignore_scroll {
            return local.to_point();
        }
        let scroll = self.scroll();
        Point::new((local.x + scroll.x) / self.scale, (local.y + scroll.y) / self.scale)
    }

    /// Convert a world point to screen coordinates.
    pub fn to_screen(&self, world: Point) -> Point {
        let scroll = self.scroll();
        Point::new(
            world.x * self.scale - scroll.x + self.element_origin.x,
            world.y * self.scale - scroll.y + self.element_origin.y,
        )
    }

    /// Set the scroll offset, to be committed on the next frame.
    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.pending_scroll = Some(scroll);
        self.frames.request_scroll_commit();
        self.frames.request_redraw();
    }

    /// Scroll by `delta` (scaled world units).
    pub fn scroll_by(&mut self, delta: Vec2) {
        self.set_scroll(self.scroll() + delta);
    }

    /// Drag the content by a screen-space delta.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.scroll_by(-screen_delta);
    }

    /// Apply the pending scroll. Returns whether anything changed.
    pub fn commit_scroll(&mut self) -> bool {
        match self.pending_scroll.take() {
            Some(scroll) => {
                self.scroll = scroll;
                true
            }
            None => false,
        }
    }

    /// Zoom by `factor`, keeping the screen point `anchor` fixed.
    ///
    /// The factor is reduced to whatever the scale clamp allows; the actually
    /// applied factor is returned.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> f64 {
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        let r = new_scale / self.scale;
        if (r - 1.0).abs() < f64::EPSILON {
            return 1.0;
        }
        let a = anchor - self.element_origin;
        let scroll = self.scroll();
        self.scale = new_scale;
        self.set_scroll(Vec2::new(a.x * (r - 1.0) + r * scroll.x, a.y * (r - 1.0) + r * scroll.y));
        r
    }

    /// Zoom around the element center.
    pub fn zoom_center(&mut self, factor: f64) -> f64 {
        let center = self.element_origin + self.size.to_vec2() / 2.0;
        self.zoom_at(center, factor)
    }

    /// Return to scale 1 around the element center.
    pub fn reset_zoom(&mut self) {
        self.zoom_center(1.0 / self.scale);
    }

    /// World to physical-pixel transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.device_pixel_ratio)
            * Affine::translate(-self.scroll())
            * Affine::scale(self.scale)
    }

    /// World-space rectangle currently visible in the element.
    pub fn visible_world_rect(&self) -> Rect {
        let scroll = self.scroll();
        Rect::new(
            scroll.x / self.scale,
            scroll.y / self.scale,
            (scroll.x + self.size.width) / self.scale,
            (scroll.y + self.size.height) / self.scale,
        )
    }
}
