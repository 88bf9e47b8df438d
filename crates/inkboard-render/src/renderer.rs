//! Renderer trait abstraction.

use inkboard_core::Whiteboard;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The board to render.
    pub board: &'a Whiteboard,
    /// Background color.
    pub background_color: Color,
    /// Lasso outline color.
    pub selection_color: Color,
    /// Scrollbar thumb color at full opacity.
    pub scrollbar_color: Color,
    /// Current scrollbar opacity in `0.0..=1.0`.
    pub scrollbar_opacity: f64,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(board: &'a Whiteboard) -> Self {
        Self {
            board,
            background_color: Color::from_rgba8(255, 255, 255, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255),
            scrollbar_color: Color::from_rgba8(0, 0, 0, 110),
            scrollbar_opacity: 0.0,
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the scrollbar opacity.
    pub fn with_scrollbar_opacity(mut self, opacity: f64) -> Self {
        self.scrollbar_opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the scene for a frame.
    ///
    /// Called only for frames that requested a redraw.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
