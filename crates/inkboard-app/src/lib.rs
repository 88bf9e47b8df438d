//! Inkboard Replay
//!
//! Drives a [`Whiteboard`] over an in-memory picture store from a JSON script
//! of input events, without a window or GPU.
//!
//! ## Script format
//!
//! ```json
//! {
//!   "picture": "demo",
//!   "events": [
//!     { "type": "resize", "width": 800, "height": 600 },
//!     { "type": "pointer", "id": 1, "phase": "down", "position": { "x": 10, "y": 10 } },
//!     { "type": "pointer", "id": 1, "phase": "up", "position": { "x": 90, "y": 40 } },
//!     { "type": "key", "key": "z", "modifiers": { "ctrl": true } },
//!     { "type": "command", "command": { "select_tool": "lasso" } },
//!     { "type": "tick" },
//!     { "type": "remote_flush" }
//!   ]
//! }
//! ```

use inkboard_core::input::Modifiers;
use inkboard_core::{
    Command, ConfigError, EngineConfig, MemoryPictureStore, Path, PointerEvent, WheelEvent, Whiteboard,
};
use inkboard_render::{RecordingRenderer, RenderLoop};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::path::{Path as FsPath, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Usage(String),
}

/// One scripted input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    Pointer(PointerEvent),
    Wheel(WheelEvent),
    /// A key press, mapped through the keyboard shortcuts.
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Command {
        command: Command,
    },
    Resize {
        width: f64,
        height: f64,
        #[serde(default = "default_pixel_ratio")]
        device_pixel_ratio: f64,
    },
    /// Change the write permission on the store side.
    Permission {
        writable: bool,
    },
    /// Deliver queued store changes to watchers.
    RemoteFlush,
    /// Run one display frame.
    Tick,
}

fn default_pixel_ratio() -> f64 {
    1.0
}

fn default_picture() -> String {
    "replay".to_string()
}

/// A picture id and the events to play on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    #[serde(default = "default_picture")]
    pub picture: String,
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<FsPath>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub picture: String,
    /// Paths as persisted in the store.
    pub paths: Vec<Path>,
    pub scenes_built: u64,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl ReplayOutcome {
    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Play `script` against a fresh in-memory store.
///
/// Queued store changes are flushed and a last frame is run at the end, so
/// the outcome reflects a settled board.
pub fn replay(config: EngineConfig, script: &Script) -> ReplayOutcome {
    let store = MemoryPictureStore::new();
    let mut board = Whiteboard::new(config, Rc::new(store.clone()), script.picture.as_str());
    let mut render_loop = RenderLoop::for_board(&board);
    let mut renderer = RecordingRenderer::new();

    for (index, event) in script.events.iter().enumerate() {
        log::trace!("Event {index}: {event:?}");
        match event {
            ScriptEvent::Pointer(pointer) => {
                board.handle_pointer(*pointer);
            }
            ScriptEvent::Wheel(wheel) => board.handle_wheel(*wheel),
            ScriptEvent::Key { key, modifiers } => match Command::from_shortcut(key, *modifiers) {
                Some(command) => {
                    board.execute(command);
                }
                None => log::debug!("No shortcut for key {key:?}"),
            },
            ScriptEvent::Command { command } => {
                board.execute(*command);
            }
            ScriptEvent::Resize {
                width,
                height,
                device_pixel_ratio,
            } => board.resize(Point::ZERO, Size::new(*width, *height), *device_pixel_ratio),
            ScriptEvent::Permission { writable } => store.set_writable(&script.picture, *writable),
            ScriptEvent::RemoteFlush => {
                store.flush();
            }
            ScriptEvent::Tick => {
                render_loop.tick(&mut board, &mut renderer);
            }
        }
    }

    store.flush();
    render_loop.tick(&mut board, &mut renderer);
    log::info!(
        "Replayed {} event(s) on {}: {} path(s), {} scene(s)",
        script.events.len(),
        script.picture,
        board.paths().len(),
        render_loop.scenes_built()
    );

    ReplayOutcome {
        picture: script.picture.clone(),
        paths: store.paths(&script.picture),
        scenes_built: render_loop.scenes_built(),
        can_undo: board.history().can_undo().get(),
        can_redo: board.history().can_redo().get(),
    }
}
