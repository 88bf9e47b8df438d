//! Vello-based renderer implementation.

use crate::display_list::{DrawItem, build_display_list};
use crate::renderer::{RenderContext, Renderer};
use kurbo::{Affine, BezPath, Cap, Join, RoundedRect, Stroke};
use peniko::{Color, Fill};
use vello::Scene;

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Lasso outline color.
    selection_color: Color,
    /// Current zoom level (for zoom-independent outlines).
    zoom: f64,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            selection_color: Color::from_rgba8(59, 130, 246, 255),
            zoom: 1.0,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn render_stroke(&mut self, path: &BezPath, color: Color, width: f64, transform: Affine) {
        let stroke = Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round);
        self.scene.stroke(&stroke, transform, color, None, path);
    }

    /// Closed lassos get a translucent fill and a dashed outline.
    /// Stroke width and dash pattern are scaled inversely with zoom.
    fn render_lasso(&mut self, outline: &BezPath, closed: bool, transform: Affine) {
        let stroke_width = 1.0 / self.zoom;
        if closed {
            self.scene.fill(
                Fill::NonZero,
                transform,
                self.selection_color.with_alpha(0.1),
                None,
                outline,
            );
            let dash_len = 4.0 / self.zoom;
            let stroke = Stroke::new(stroke_width).with_dashes(0.0, [dash_len, dash_len]);
            self.scene.stroke(&stroke, transform, self.selection_color, None, outline);
        } else {
            let stroke = Stroke::new(stroke_width);
            self.scene.stroke(&stroke, transform, self.selection_color, None, outline);
        }
    }

    fn render_scrollbar(&mut self, rect: kurbo::Rect, color: Color, opacity: f64, transform: Affine) {
        let thumb = RoundedRect::from_rect(rect, rect.width().min(rect.height()) / 2.0);
        let alpha = color.components[3] * opacity as f32;
        self.scene.fill(Fill::NonZero, transform, color.with_alpha(alpha), None, &thumb);
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        self.selection_color = ctx.selection_color;

        let viewport = ctx.board.viewport();
        self.zoom = viewport.scale();
        let world_transform = viewport.transform();
        let screen_transform = Affine::scale(viewport.device_pixel_ratio);

        for item in build_display_list(ctx) {
            match item {
                DrawItem::Stroke { path, color, width, .. } => {
                    self.render_stroke(&path, color, width, world_transform);
                }
                DrawItem::Lasso { outline, closed } => self.render_lasso(&outline, closed, world_transform),
                DrawItem::ScrollbarThumb { rect, opacity } => {
                    self.render_scrollbar(rect, ctx.scrollbar_color, opacity, screen_transform);
                }
            }
        }
        log::trace!("Built scene at zoom {:.2}", self.zoom);
    }
}
