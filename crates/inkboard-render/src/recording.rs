//! Headless renderer that keeps every display list it was asked to draw.

use crate::display_list::{DrawItem, build_display_list};
use crate::renderer::{RenderContext, Renderer};

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Vec<Vec<DrawItem>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scenes built so far.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn last_frame(&self) -> Option<&[DrawItem]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn frames(&self) -> &[Vec<DrawItem>] {
        &self.frames
    }
}

impl Renderer for RecordingRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.frames.push(build_display_list(ctx));
    }
}
