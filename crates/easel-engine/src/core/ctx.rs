use winit::dpi::PhysicalPosition;
use winit::window::{CursorIcon, Window, WindowId};

use crate::coords::Vec2;
use crate::device::WgpuGpu;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `(width, height)` in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys = self.window.inner_size();
        let scale = self.window.scale_factor();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(scale);
        (logi.width as f32, logi.height as f32)
    }

    /// Converts a cursor position reported by winit (physical pixels, top-left
    /// origin) to backing-store pixels.
    ///
    /// Backing size tracks `round(logical × density)`, which is the physical
    /// size up to rounding, so the position passes through unchanged.
    pub fn cursor_to_backing(&self, position: PhysicalPosition<f64>) -> Vec2 {
        Vec2::new(position.x as f32, position.y as f32)
    }

    pub fn set_cursor(&self, cursor: CursorIcon) {
        self.window.set_cursor(cursor);
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

/// Context passed to [`App`](super::App) callbacks.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `WgpuGpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut WgpuGpu<'w>,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}
