//! Easel engine crate.
//!
//! A small 2D rendering core over a GL-style GPU interface: shader programs,
//! vertex buffers and layouts, uniforms, canvas sizing and a one-draw scene,
//! plus the wgpu/winit runtime that hosts it and the instructional lessons
//! built on top.

pub mod canvas;
pub mod coords;
pub mod error;
pub mod gpu;
pub mod shader;

pub mod geometry;
pub mod layout;
pub mod program;
pub mod uniform;

pub mod interaction;
pub mod lesson;
pub mod scene;

pub mod core;
pub mod device;
pub mod logging;
pub mod window;
