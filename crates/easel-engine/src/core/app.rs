use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
pub trait App {
    /// Called once, after the window and its GPU context exist and before the
    /// first redraw. An error ends the run.
    fn init(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<()>;

    /// Called for window events the runtime does not consume itself.
    fn on_window_event(&mut self, ctx: &mut FrameCtx<'_, '_>, event: &WindowEvent) -> AppControl {
        let _ = (ctx, event);
        AppControl::Continue
    }

    /// Called when the window needs repainting (exposure, resize, DPI change
    /// or an explicit [`FrameCtx::request_redraw`]).
    fn on_redraw(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
