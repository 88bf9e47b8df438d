//! Inkboard Core Library
//!
//! Platform-agnostic drawing and interaction engine for the Inkboard whiteboard:
//! path model, viewport transform, curve smoothing, erasing, lasso selection,
//! undo/redo history and the clipboard payload codec.

pub mod board;
pub mod clipboard;
pub mod config;
pub mod eraser;
pub mod frame;
pub mod geometry;
pub mod history;
pub mod input;
pub mod lasso;
pub mod observable;
pub mod path;
pub mod path_store;
pub mod remote;
pub mod router;
pub mod smoothing;
pub mod tools;
pub mod viewport;

pub use board::Whiteboard;
pub use clipboard::{ClipboardBackend, ClipboardError, MemoryClipboard};
pub use config::{ConfigError, EngineConfig};
pub use frame::{FrameRequester, FrameScheduler, FrameWork};
pub use history::{Operation, OperationLog};
pub use input::{Command, PointerEvent, PointerId, PointerPhase, WheelEvent};
pub use lasso::{Lasso, LassoId, LassoSession};
pub use observable::{Observable, Subscription};
pub use path::{InkColor, Path, PathId, PathUpdate};
pub use path_store::PathStore;
pub use remote::{MemoryPictureStore, PathDelta, Permission, PictureStore};
pub use router::{InputRouter, Interaction};
pub use tools::Tool;
pub use viewport::Viewport;

#[cfg(all(feature = "native-clipboard", not(target_arch = "wasm32")))]
pub use clipboard::SystemClipboard;
