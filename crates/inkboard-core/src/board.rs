//! The whiteboard engine.
//!
//! [`Whiteboard`] owns every component of one open picture and is the entry
//! point for input events, commands and frame ticks. Remote changes reported
//! by the picture store are queued and merged before each of those.

use crate::clipboard::{self, ClipboardBackend, MemoryClipboard};
use crate::config::EngineConfig;
use crate::frame::{FrameRequester, FrameScheduler, FrameWork};
use crate::history::{Operation, OperationLog, OperationTarget};
use crate::input::{Command, PointerEvent, WheelEvent};
use crate::lasso::LassoSession;
use crate::observable::{Observable, Subscription};
use crate::path::{InkColor, PathId};
use crate::path_store::PathStore;
use crate::remote::{PathDelta, Permission, PictureStore, RemoteWriter};
use crate::router::InputRouter;
use crate::tools::{Tool, ToolContext};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Change reported by the picture store, waiting to be merged.
#[derive(Debug, Clone)]
enum RemoteEvent {
    Paths(PathDelta),
    Permission(Permission),
}

type Inbox = Rc<RefCell<VecDeque<RemoteEvent>>>;

/// One open picture: paths, viewport, tools, history and remote sync.
pub struct Whiteboard {
    config: EngineConfig,
    picture_id: String,
    scheduler: FrameScheduler,
    frames: FrameRequester,
    viewport: Viewport,
    paths: PathStore,
    lasso: LassoSession,
    log: OperationLog,
    router: InputRouter,
    store: Rc<dyn PictureStore>,
    clipboard: Box<dyn ClipboardBackend>,
    inbox: Inbox,
    writable: Observable<bool>,
    subscriptions: Vec<Subscription>,
}

impl Whiteboard {
    /// Open `picture_id` from `store` with a process-local clipboard.
    pub fn new(config: EngineConfig, store: Rc<dyn PictureStore>, picture_id: impl Into<String>) -> Self {
        Self::with_clipboard(config, store, picture_id, Box::new(MemoryClipboard::new()))
    }

    /// Open `picture_id` from `store` using `clipboard` for copy and paste.
    pub fn with_clipboard(
        config: EngineConfig,
        store: Rc<dyn PictureStore>,
        picture_id: impl Into<String>,
        clipboard: Box<dyn ClipboardBackend>,
    ) -> Self {
        let picture_id = picture_id.into();
        let scheduler = FrameScheduler::new();
        let frames = scheduler.requester();
        let mut viewport = Viewport::new(config.min_scale, config.max_scale);
        viewport.set_frame_requester(frames.clone());

        let inbox: Inbox = Rc::default();
        let paths_inbox = Rc::clone(&inbox);
        let permission_inbox = Rc::clone(&inbox);
        let subscriptions = vec![
            store.watch_paths(
                &picture_id,
                Box::new(move |delta: &PathDelta| {
                    paths_inbox
                        .borrow_mut()
                        .push_back(RemoteEvent::Paths(delta.clone()))
                }),
            ),
            store.watch_permission(
                &picture_id,
                Box::new(move |permission: Permission| {
                    permission_inbox
                        .borrow_mut()
                        .push_back(RemoteEvent::Permission(permission))
                }),
            ),
        ];

        log::info!("Opening picture {picture_id}");
        let mut board = Self {
            paths: PathStore::new(frames.clone()),
            lasso: LassoSession::new(),
            log: OperationLog::new(config.max_history, frames.clone()),
            router: InputRouter::new(&config),
            writable: Observable::new(true),
            config,
            picture_id,
            scheduler,
            frames,
            viewport,
            store,
            clipboard,
            inbox,
            subscriptions,
        };
        board.pump_remote();
        board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn picture_id(&self) -> &str {
        &self.picture_id
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn paths(&self) -> &PathStore {
        &self.paths
    }

    pub fn lasso(&self) -> &LassoSession {
        &self.lasso
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn history(&self) -> &OperationLog {
        &self.log
    }

    /// Whether the current user may edit the picture.
    pub fn writable(&self) -> &Observable<bool> {
        &self.writable
    }

    /// Handle for requesting work on the next frame.
    pub fn frame_requester(&self) -> FrameRequester {
        self.frames.clone()
    }

    /// Whether a frame has work queued.
    pub fn has_pending_frame(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Color and world width of new strokes.
    pub fn set_stroke_style(&mut self, color: InkColor, width: f64) {
        self.router.color = color;
        self.router.width = width;
    }

    /// Update the element geometry after a layout change.
    pub fn resize(&mut self, origin: Point, size: Size, device_pixel_ratio: f64) {
        self.viewport.resize(origin, size, device_pixel_ratio);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        self.pump_remote();
        let (router, mut ctx) = self.split();
        router.handle_pointer(&mut ctx, event)
    }

    pub fn handle_wheel(&mut self, event: WheelEvent) {
        self.pump_remote();
        let (router, mut ctx) = self.split();
        router.handle_wheel(&mut ctx, event);
    }

    /// Run a keyboard or toolbar command. Returns whether it had an effect.
    pub fn execute(&mut self, command: Command) -> bool {
        self.pump_remote();
        if command.mutates_picture() {
            if !self.router.is_writable() {
                log::debug!("Ignoring {command:?} on a read-only picture");
                return false;
            }
            let (router, mut ctx) = self.split();
            router.finish_gesture(&mut ctx);
        }

        match command {
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::Copy => self.copy(),
            Command::Cut => self.copy() && self.delete_selection(),
            Command::Paste => self.paste(),
            Command::Delete => self.delete_selection(),
            Command::SelectTool(tool) => {
                let (router, mut ctx) = self.split();
                router.select_tool(&mut ctx, tool);
                true
            }
            Command::ZoomIn => {
                self.viewport.zoom_center(self.config.button_zoom_factor);
                true
            }
            Command::ZoomOut => {
                self.viewport.zoom_center(1.0 / self.config.button_zoom_factor);
                true
            }
            Command::ResetZoom => {
                self.viewport.reset_zoom();
                true
            }
        }
    }

    /// Merge remote changes, then take the work for this frame.
    ///
    /// A pending scroll is committed here, so the scene built for the frame
    /// sees the final viewport.
    pub fn begin_frame(&mut self) -> FrameWork {
        self.pump_remote();
        let work = self.scheduler.take();
        if work.commit_scroll {
            self.viewport.commit_scroll();
        }
        work
    }

    /// Merge queued remote events. Returns the number merged.
    pub fn pump_remote(&mut self) -> usize {
        let mut merged = 0;
        loop {
            let Some(event) = self.inbox.borrow_mut().pop_front() else {
                break;
            };
            match event {
                RemoteEvent::Paths(delta) => self.merge_delta(delta),
                RemoteEvent::Permission(permission) => {
                    let (router, mut ctx) = self.split();
                    router.set_writable(&mut ctx, permission.writable);
                    self.writable.set(permission.writable);
                }
            }
            merged += 1;
        }
        merged
    }

    fn merge_delta(&mut self, delta: PathDelta) {
        let removed = self.paths.remove_paths(&delta.removed_path_ids);
        let added = self.paths.add_paths(delta.added_paths);
        let modified = self.paths.update_paths(delta.modified_paths);
        if removed > 0 {
            if let Some(lasso) = self.lasso.current_mut() {
                lasso.retain_existing(&self.paths);
            }
        }
        log::debug!("Merged remote delta: +{added} -{removed} ~{modified}");
    }

    fn split(&mut self) -> (&mut InputRouter, ToolContext<'_>) {
        let ctx = ToolContext {
            viewport: &mut self.viewport,
            paths: &mut self.paths,
            lasso: &mut self.lasso,
            log: &mut self.log,
            remote: Some(RemoteWriter::new(self.store.as_ref(), &self.picture_id)),
            frames: &self.frames,
            config: &self.config,
        };
        (&mut self.router, ctx)
    }

    fn undo(&mut self) -> bool {
        let mut target = OperationTarget {
            paths: &mut self.paths,
            lasso: &mut self.lasso,
            remote: Some(RemoteWriter::new(self.store.as_ref(), &self.picture_id)),
        };
        self.log.undo(&mut target)
    }

    fn redo(&mut self) -> bool {
        if matches!(self.log.undone().last(), Some(Operation::Paste { .. })) {
            self.select_lasso_tool();
        }
        let mut target = OperationTarget {
            paths: &mut self.paths,
            lasso: &mut self.lasso,
            remote: Some(RemoteWriter::new(self.store.as_ref(), &self.picture_id)),
        };
        self.log.redo(&mut target)
    }

    /// Ids selected by the closed lasso that still exist.
    fn selection(&self) -> Vec<PathId> {
        self.lasso
            .current()
            .filter(|lasso| lasso.is_closed())
            .map(|lasso| self.paths.retain_existing(lasso.selected().iter().copied()))
            .unwrap_or_default()
    }

    fn copy(&mut self) -> bool {
        let ids = self.selection();
        if ids.is_empty() {
            return false;
        }
        let paths = self.paths.cloned(&ids);
        let written = clipboard::encode(&paths).and_then(|html| self.clipboard.write_html(&html));
        match written {
            Ok(()) => {
                log::debug!("Copied {} path(s)", paths.len());
                true
            }
            Err(e) => {
                log::error!("Failed to copy to clipboard: {e}");
                false
            }
        }
    }

    fn delete_selection(&mut self) -> bool {
        let ids = self.selection();
        if ids.is_empty() {
            return false;
        }
        let paths = self.paths.cloned(&ids);
        let (_, mut ctx) = self.split();
        ctx.commit(Operation::Remove { paths });
        ctx.lasso.clear();
        ctx.request_redraw();
        true
    }

    fn paste(&mut self) -> bool {
        let html = match self.clipboard.read_html() {
            Ok(Some(html)) => html,
            Ok(None) => return false,
            Err(e) => {
                log::warn!("Failed to read clipboard: {e}");
                return false;
            }
        };
        let paths = match clipboard::decode(&html) {
            Ok(paths) if !paths.is_empty() => paths,
            Ok(_) => return false,
            Err(e) => {
                log::warn!("Ignoring clipboard content: {e}");
                return false;
            }
        };
        log::debug!("Pasting {} path(s)", paths.len());
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        self.select_lasso_tool();
        let (_, mut ctx) = self.split();
        ctx.commit(Operation::Paste { paths, offset });
        true
    }

    /// Switch to the lasso, the only tool that can drag a pasted selection.
    fn select_lasso_tool(&mut self) {
        if self.router.tool() != Tool::Lasso {
            let (router, mut ctx) = self.split();
            router.select_tool(&mut ctx, Tool::Lasso);
        }
    }
}

impl std::fmt::Debug for Whiteboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Whiteboard")
            .field("picture_id", &self.picture_id)
            .field("paths", &self.paths.len())
            .field("tool", &self.router.tool())
            .field("interaction", &self.router.interaction().name())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
