//! Tool system for the whiteboard.
//!
//! Each tool has its own handler module. Handlers receive a [`ToolContext`]
//! with exactly the engine parts a gesture may touch and the gesture state
//! they own; the router decides which handler runs.

pub(crate) mod eraser;
pub(crate) mod hand;
pub(crate) mod lasso;
pub(crate) mod pen;

use crate::config::EngineConfig;
use crate::eraser::EraserParams;
use crate::frame::FrameRequester;
use crate::history::{Operation, OperationLog, OperationTarget};
use crate::lasso::LassoSession;
use crate::path_store::PathStore;
use crate::remote::RemoteWriter;
use crate::viewport::Viewport;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
    Lasso,
    Hand,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Pen, Tool::Eraser, Tool::Lasso, Tool::Hand];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pen => "pen",
            Tool::Eraser => "eraser",
            Tool::Lasso => "lasso",
            Tool::Hand => "hand",
        }
    }

    /// Whether the tool changes the picture.
    pub fn edits(&self) -> bool {
        !matches!(self, Tool::Hand)
    }
}

/// Engine parts available to tool handlers during one event.
pub struct ToolContext<'a> {
    pub viewport: &'a mut Viewport,
    pub paths: &'a mut PathStore,
    pub lasso: &'a mut LassoSession,
    pub log: &'a mut OperationLog,
    pub remote: Option<RemoteWriter<'a>>,
    pub frames: &'a FrameRequester,
    pub config: &'a EngineConfig,
}

impl ToolContext<'_> {
    /// Screen to world conversion at the current viewport.
    pub fn world(&self, screen: Point) -> Point {
        self.viewport.to_canvas(screen, false)
    }

    /// Eraser sampling parameters at the current scale.
    pub fn eraser_params(&self) -> EraserParams {
        EraserParams {
            width: self.config.eraser_width / self.viewport.scale(),
            step: self.config.eraser_step,
            spacing: self.config.polyline_sample_spacing,
        }
    }

    /// Record and apply an operation.
    pub fn commit(&mut self, op: Operation) {
        let mut target = OperationTarget {
            paths: &mut *self.paths,
            lasso: &mut *self.lasso,
            remote: self.remote,
        };
        self.log.do_operation(op, &mut target, false);
    }

    pub fn request_redraw(&self) {
        self.frames.request_redraw();
    }
}
