//! Input events and commands for mouse/touch/pen and keyboard.

use crate::tools::Tool;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Identifier of a pointer (mouse, pen or one touch contact).
pub type PointerId = u64;

/// Phase of a pointer event. `Cancel` is handled exactly like `Up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

impl PointerPhase {
    /// Whether this phase ends the pointer's gesture.
    pub fn is_end(self) -> bool {
        matches!(self, PointerPhase::Up | PointerPhase::Cancel)
    }
}

/// A pointer event in screen (page) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    #[serde(default)]
    pub id: PointerId,
    pub phase: PointerPhase,
    pub position: Point,
}

impl PointerEvent {
    pub fn new(id: PointerId, phase: PointerPhase, position: Point) -> Self {
        Self { id, phase, position }
    }

    pub fn down(id: PointerId, x: f64, y: f64) -> Self {
        Self::new(id, PointerPhase::Down, Point::new(x, y))
    }

    pub fn moved(id: PointerId, x: f64, y: f64) -> Self {
        Self::new(id, PointerPhase::Move, Point::new(x, y))
    }

    pub fn up(id: PointerId, x: f64, y: f64) -> Self {
        Self::new(id, PointerPhase::Up, Point::new(x, y))
    }

    pub fn cancel(id: PointerId, x: f64, y: f64) -> Self {
        Self::new(id, PointerPhase::Cancel, Point::new(x, y))
    }
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A mouse wheel or trackpad scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    /// Scroll amount in screen pixels.
    pub delta: Vec2,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// Keyboard and toolbar commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    /// Delete the lasso selection.
    Delete,
    SelectTool(Tool),
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

impl Command {
    /// Map a key press to a command.
    ///
    /// `key` is a logical key name such as `"z"`, `"Delete"` or `"+"`.
    pub fn from_shortcut(key: &str, modifiers: Modifiers) -> Option<Self> {
        if modifiers.command() {
            return match key.to_ascii_lowercase().as_str() {
                "z" if modifiers.shift => Some(Command::Redo),
                "z" => Some(Command::Undo),
                "y" => Some(Command::Redo),
                "c" => Some(Command::Copy),
                "x" => Some(Command::Cut),
                "v" => Some(Command::Paste),
                "=" | "+" => Some(Command::ZoomIn),
                "-" => Some(Command::ZoomOut),
                "0" => Some(Command::ResetZoom),
                _ => None,
            };
        }
        match key {
            "Delete" | "Backspace" => Some(Command::Delete),
            "p" | "P" => Some(Command::SelectTool(Tool::Pen)),
            "e" | "E" => Some(Command::SelectTool(Tool::Eraser)),
            "l" | "L" => Some(Command::SelectTool(Tool::Lasso)),
            "h" | "H" => Some(Command::SelectTool(Tool::Hand)),
            _ => None,
        }
    }

    /// Whether the command changes the picture.
    pub fn mutates_picture(&self) -> bool {
        matches!(
            self,
            Command::Undo | Command::Redo | Command::Cut | Command::Paste | Command::Delete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        }
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(Command::from_shortcut("z", ctrl()), Some(Command::Undo));
        assert_eq!(
            Command::from_shortcut(
                "Z",
                Modifiers {
                    shift: true,
                    ..ctrl()
                }
            ),
            Some(Command::Redo)
        );
        assert_eq!(
            Command::from_shortcut(
                "v",
                Modifiers {
                    meta: true,
                    ..Modifiers::default()
                }
            ),
            Some(Command::Paste)
        );
        assert_eq!(Command::from_shortcut("Delete", Modifiers::default()), Some(Command::Delete));
        assert_eq!(
            Command::from_shortcut("e", Modifiers::default()),
            Some(Command::SelectTool(Tool::Eraser))
        );
        assert_eq!(Command::from_shortcut("q", Modifiers::default()), None);
    }

    #[test]
    fn test_cancel_ends_gesture() {
        assert!(PointerPhase::Cancel.is_end());
        assert!(PointerPhase::Up.is_end());
        assert!(!PointerPhase::Move.is_end());
    }

    #[test]
    fn test_event_json() {
        let event: PointerEvent =
            serde_json::from_str(r#"{ "phase": "cancel", "position": { "x": 1.0, "y": 2.0 } }"#).unwrap();
        assert_eq!(event, PointerEvent::cancel(0, 1.0, 2.0));

        let command: Command = serde_json::from_str(r#"{ "select_tool": "lasso" }"#).unwrap();
        assert_eq!(command, Command::SelectTool(Tool::Lasso));
    }
}
