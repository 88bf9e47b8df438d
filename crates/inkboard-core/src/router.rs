//! Pointer, wheel and tool routing.
//!
//! The router owns the single [`Interaction`] in progress. A gesture owns the
//! pointer that started it; the only exception is the second pointer of a
//! hand pinch.

use crate::config::EngineConfig;
use crate::eraser::EraseGesture;
use crate::input::{PointerEvent, PointerId, PointerPhase, WheelEvent};
use crate::path::{InkColor, Path, PathId};
use crate::tools::hand::{self, TrackedPointer};
use crate::tools::lasso::LassoPress;
use crate::tools::{Tool, ToolContext, eraser, lasso, pen};
use kurbo::Point;

/// Gesture currently in progress.
#[derive(Debug, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Drawing {
        pointer: PointerId,
        path: Path,
    },
    Erasing {
        pointer: PointerId,
        gesture: EraseGesture,
    },
    Lassoing {
        pointer: PointerId,
    },
    DraggingLasso {
        pointer: PointerId,
    },
    Panning {
        pointer: PointerId,
        last: Point,
    },
    PinchZooming {
        first: TrackedPointer,
        second: TrackedPointer,
    },
}

impl Interaction {
    /// Whether the pointer takes part in this interaction.
    pub fn owns(&self, id: PointerId) -> bool {
        match self {
            Interaction::Idle => false,
            Interaction::Drawing { pointer, .. }
            | Interaction::Erasing { pointer, .. }
            | Interaction::Lassoing { pointer }
            | Interaction::DraggingLasso { pointer }
            | Interaction::Panning { pointer, .. } => *pointer == id,
            Interaction::PinchZooming { first, second } => first.id == id || second.id == id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Drawing { .. } => "drawing",
            Interaction::Erasing { .. } => "erasing",
            Interaction::Lassoing { .. } => "lassoing",
            Interaction::DraggingLasso { .. } => "dragging_lasso",
            Interaction::Panning { .. } => "panning",
            Interaction::PinchZooming { .. } => "pinch_zooming",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Whether the interaction edits the picture when it ends.
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            Interaction::Drawing { .. }
                | Interaction::Erasing { .. }
                | Interaction::Lassoing { .. }
                | Interaction::DraggingLasso { .. }
        )
    }
}

/// Routes input to the active tool.
#[derive(Debug)]
pub struct InputRouter {
    tool: Tool,
    writable: bool,
    interaction: Interaction,
    /// Color of new strokes.
    pub color: InkColor,
    /// World width of new strokes.
    pub width: f64,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl InputRouter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tool: Tool::default(),
            writable: true,
            interaction: Interaction::Idle,
            color: config.default_color,
            width: config.default_width,
        }
    }

    /// Selected tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Tool that actually handles input; read-only pictures only pan.
    pub fn effective_tool(&self) -> Tool {
        if self.writable || !self.tool.edits() { self.tool } else { Tool::Hand }
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Stroke being drawn, if any.
    pub fn live_path(&self) -> Option<&Path> {
        match &self.interaction {
            Interaction::Drawing { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Paths staged by the eraser gesture in progress.
    pub fn erasing(&self) -> &[PathId] {
        match &self.interaction {
            Interaction::Erasing { gesture, .. } => gesture.erasing(),
            _ => &[],
        }
    }

    /// Change the write permission. Losing it abandons any editing gesture.
    pub fn set_writable(&mut self, ctx: &mut ToolContext<'_>, writable: bool) {
        if self.writable == writable {
            return;
        }
        log::info!("Picture is now {}", if writable { "writable" } else { "read-only" });
        self.writable = writable;
        if !writable {
            if self.interaction.is_editing() {
                self.abort_gesture(ctx);
            }
            ctx.lasso.clear();
            ctx.request_redraw();
        }
    }

    /// Switch tools, finishing the current gesture and dropping the lasso.
    pub fn select_tool(&mut self, ctx: &mut ToolContext<'_>, tool: Tool) {
        self.finish_gesture(ctx);
        if ctx.lasso.current().is_some() {
            ctx.lasso.clear();
            ctx.request_redraw();
        }
        log::debug!("Tool: {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
    }

    /// Handle a pointer event. Returns whether the event was consumed.
    pub fn handle_pointer(&mut self, ctx: &mut ToolContext<'_>, event: PointerEvent) -> bool {
        if event.phase.is_end() {
            if !self.interaction.owns(event.id) {
                return false;
            }
            self.pointer_move(ctx, event.id, event.position);
            self.pointer_up(ctx, event.id);
            return true;
        }
        match event.phase {
            PointerPhase::Down => self.pointer_down(ctx, event.id, event.position),
            _ => self.pointer_move(ctx, event.id, event.position),
        }
    }

    /// Wheel: command modifier zooms at the cursor, otherwise scrolls.
    pub fn handle_wheel(&mut self, ctx: &mut ToolContext<'_>, event: WheelEvent) {
        if event.modifiers.command() {
            if event.delta.y == 0.0 {
                return;
            }
            let factor = if event.delta.y > 0.0 {
                1.0 / ctx.config.wheel_zoom_factor
            } else {
                ctx.config.wheel_zoom_factor
            };
            ctx.viewport.zoom_at(event.position, factor);
        } else {
            ctx.viewport.scroll_by(event.delta);
        }
    }

    /// End the gesture in progress as if its pointer was released.
    pub fn finish_gesture(&mut self, ctx: &mut ToolContext<'_>) {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle | Interaction::Panning { .. } | Interaction::PinchZooming { .. } => {}
            Interaction::Drawing { path, .. } => pen::finish(ctx, path),
            Interaction::Erasing { gesture, .. } => eraser::finish(ctx, gesture),
            Interaction::Lassoing { .. } => lasso::finish_drawing(ctx),
            Interaction::DraggingLasso { .. } => lasso::finish_drag(ctx),
        }
    }

    /// Drop the gesture in progress without recording anything.
    pub fn abort_gesture(&mut self, ctx: &mut ToolContext<'_>) {
        let interaction = std::mem::take(&mut self.interaction);
        log::debug!("Aborting {} gesture", interaction.name());
        match interaction {
            Interaction::Lassoing { .. } => ctx.lasso.clear(),
            Interaction::DraggingLasso { .. } => {
                if let Some(lasso) = ctx.lasso.current_mut() {
                    let delta = lasso.take_pending_delta();
                    lasso.translate(-delta);
                }
            }
            _ => {}
        }
        ctx.request_redraw();
    }

    fn pointer_down(&mut self, ctx: &mut ToolContext<'_>, id: PointerId, position: Point) -> bool {
        match &self.interaction {
            Interaction::Idle => {}
            Interaction::Panning { pointer, last } if *pointer != id && !self.effective_tool().edits() => {
                self.interaction = Interaction::PinchZooming {
                    first: TrackedPointer {
                        id: *pointer,
                        position: *last,
                    },
                    second: TrackedPointer { id, position },
                };
                return true;
            }
            _ => return false,
        }

        self.interaction = match self.effective_tool() {
            Tool::Pen => Interaction::Drawing {
                pointer: id,
                path: pen::begin(ctx, position, self.color, self.width),
            },
            Tool::Eraser => Interaction::Erasing {
                pointer: id,
                gesture: eraser::begin(ctx, position),
            },
            Tool::Lasso => match lasso::begin(ctx, position) {
                LassoPress::Drawing => Interaction::Lassoing { pointer: id },
                LassoPress::Dragging => Interaction::DraggingLasso { pointer: id },
            },
            Tool::Hand => Interaction::Panning {
                pointer: id,
                last: position,
            },
        };
        true
    }

    fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, id: PointerId, position: Point) -> bool {
        if !self.interaction.owns(id) {
            return false;
        }
        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::Drawing { path, .. } => pen::update(ctx, path, position),
            Interaction::Erasing { gesture, .. } => eraser::update(ctx, gesture, position),
            Interaction::Lassoing { .. } => lasso::extend(ctx, position),
            Interaction::DraggingLasso { .. } => lasso::drag(ctx, position),
            Interaction::Panning { last, .. } => hand::pan(ctx, last, position),
            Interaction::PinchZooming { first, second } => hand::pinch(ctx, first, second, id, position),
        }
        true
    }

    fn pointer_up(&mut self, ctx: &mut ToolContext<'_>, id: PointerId) {
        if let Interaction::PinchZooming { first, second } = &self.interaction {
            let remaining = if first.id == id { *second } else { *first };
            self.interaction = Interaction::Panning {
                pointer: remaining.id,
                last: remaining.position,
            };
            return;
        }
        self.finish_gesture(ctx);
    }
}
