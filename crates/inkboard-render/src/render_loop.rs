//! Per-frame driver.

use crate::renderer::{RenderContext, Renderer};
use crate::scrollbar::ScrollbarFade;
use inkboard_core::{EngineConfig, Whiteboard};

/// Runs once per display frame: merges remote changes, commits the pending
/// scroll and rebuilds the scene only when something changed.
#[derive(Debug)]
pub struct RenderLoop {
    fade: ScrollbarFade,
    last_opacity: f64,
    scenes_built: u64,
}

impl RenderLoop {
    pub fn new(fade_frames: u32) -> Self {
        Self {
            fade: ScrollbarFade::new(fade_frames),
            last_opacity: 0.0,
            scenes_built: 0,
        }
    }

    /// Create a render loop using the board's configured fade length.
    pub fn for_board(board: &Whiteboard) -> Self {
        Self::new(board.config().scrollbar_fade_frames)
    }

    /// Advance one frame. Returns whether the scene was rebuilt.
    pub fn tick(&mut self, board: &mut Whiteboard, renderer: &mut dyn Renderer) -> bool {
        let work = board.begin_frame();
        if work.commit_scroll {
            self.fade.show();
        }
        let opacity = self.fade.advance();
        let fading = opacity != self.last_opacity;
        self.last_opacity = opacity;

        if !work.redraw && !fading {
            return false;
        }
        renderer.build_scene(&RenderContext::new(board).with_scrollbar_opacity(opacity));
        self.scenes_built += 1;
        true
    }

    /// Whether another tick is needed even without new input.
    pub fn is_animating(&self) -> bool {
        self.fade.is_visible() || self.last_opacity > 0.0
    }

    pub fn scenes_built(&self) -> u64 {
        self.scenes_built
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new(EngineConfig::default().scrollbar_fade_frames)
    }
}
