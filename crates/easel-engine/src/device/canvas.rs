use winit::dpi::LogicalSize;
use winit::window::Window;

use crate::canvas::CanvasSurface;

/// A window viewed as a canvas: logical size in display points, pixel
/// density from the scale factor.
///
/// Setting the backing size only marks the swapchain for reconfiguration;
/// [`WgpuGpu`](super::WgpuGpu) applies it before acquiring the next frame.
pub struct WindowCanvas<'w> {
    window: &'w Window,
    backing: (u32, u32),
    resize_pending: bool,
}

impl<'w> WindowCanvas<'w> {
    pub fn new(window: &'w Window) -> Self {
        let size = window.inner_size();
        Self {
            window,
            backing: (size.width, size.height),
            resize_pending: false,
        }
    }

    pub fn window(&self) -> &'w Window {
        self.window
    }

    pub(crate) fn resize_pending(&self) -> bool {
        self.resize_pending
    }

    pub(crate) fn resize_applied(&mut self) {
        self.resize_pending = false;
    }
}

impl CanvasSurface for WindowCanvas<'_> {
    fn logical_size(&self) -> (f64, f64) {
        let size: LogicalSize<f64> = self.window.inner_size().to_logical(self.window.scale_factor());
        (size.width, size.height)
    }

    fn pixel_density(&self) -> f64 {
        self.window.scale_factor()
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.backing = (width, height);
        self.resize_pending = true;
    }
}
