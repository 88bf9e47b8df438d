//! Inkboard Render Library
//!
//! Turns a [`inkboard_core::Whiteboard`] into an ordered display list and
//! renders it. The default implementation uses Vello for GPU-accelerated
//! rendering; [`RecordingRenderer`] keeps the display lists for headless use.

mod display_list;
mod recording;
mod render_loop;
mod renderer;
mod scrollbar;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use display_list::{DrawItem, build_display_list, scrollbar_thumbs};
pub use recording::RecordingRenderer;
pub use render_loop::RenderLoop;
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use scrollbar::ScrollbarFade;

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
