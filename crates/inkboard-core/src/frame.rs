//! Per-frame work coalescing.
//!
//! Any number of redraw or scroll-commit requests made between two frames
//! collapse into a single unit of [`FrameWork`], taken once per tick.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct FrameFlags {
    redraw: Cell<bool>,
    commit_scroll: Cell<bool>,
    /// Total requests since creation, coalesced or not.
    requests: Cell<u64>,
}

/// Cloneable handle used by components to ask for work on the next frame.
#[derive(Debug, Clone, Default)]
pub struct FrameRequester {
    flags: Rc<FrameFlags>,
}

impl FrameRequester {
    /// Ask for the scene to be rebuilt on the next frame.
    pub fn request_redraw(&self) {
        self.flags.redraw.set(true);
        self.bump();
    }

    /// Ask for the pending viewport scroll to be committed on the next frame.
    pub fn request_scroll_commit(&self) {
        self.flags.commit_scroll.set(true);
        self.bump();
    }

    fn bump(&self) {
        self.flags.requests.set(self.flags.requests.get() + 1);
    }
}

/// Work collected for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameWork {
    pub redraw: bool,
    pub commit_scroll: bool,
}

impl FrameWork {
    pub fn is_empty(&self) -> bool {
        !self.redraw && !self.commit_scroll
    }
}

/// Owner of the pending-frame flags.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    flags: Rc<FrameFlags>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle sharing this scheduler's flags.
    pub fn requester(&self) -> FrameRequester {
        FrameRequester {
            flags: Rc::clone(&self.flags),
        }
    }

    /// Whether anything is waiting for the next frame.
    pub fn is_pending(&self) -> bool {
        self.flags.redraw.get() || self.flags.commit_scroll.get()
    }

    /// Take and clear the pending work.
    pub fn take(&self) -> FrameWork {
        FrameWork {
            redraw: self.flags.redraw.replace(false),
            commit_scroll: self.flags.commit_scroll.replace(false),
        }
    }

    /// Number of requests made so far, including coalesced ones.
    pub fn request_count(&self) -> u64 {
        self.flags.requests.get()
    }
}
