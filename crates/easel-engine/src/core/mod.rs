//! Contracts between the window runtime and an application.
//!
//! The runtime owns the event loop, the window and its GPU context; an
//! [`App`] sees them only through a [`FrameCtx`] for the duration of one
//! callback.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
