//! wgpu backend of [`GpuApi`](crate::gpu::GpuApi).
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface, lazily following the canvas backing size
//! - turning linked programs and vertex arrays into cached render pipelines
//! - acquiring, drawing into and presenting frames

mod canvas;
mod error;
mod frame;
mod gpu;
mod init;
mod pipeline;
mod surface;

pub use canvas::WindowCanvas;
pub use error::SurfaceErrorAction;
pub use gpu::WgpuGpu;
pub use init::GpuInit;
