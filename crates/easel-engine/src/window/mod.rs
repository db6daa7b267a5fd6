//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, and wires them to the wgpu
//! backend and an [`App`](crate::core::App).

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
pub use winit::window::CursorIcon;
