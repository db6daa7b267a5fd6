/// What the backend did about a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next frame may render.
    Reconfigured,
    /// Transient error; this frame is dropped.
    SkipFrame,
    /// Unrecoverable (commonly OOM); the surface is unusable from now on.
    Fatal,
}
