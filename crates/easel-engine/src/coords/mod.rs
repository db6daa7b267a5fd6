//! Coordinate and color types shared by the scene and the GPU backends.
//!
//! Canonical CPU space:
//! - Backing-store pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Vertex shaders convert to clip space using the `u_resolution` uniform.

mod color;
mod rect;
mod vec2;

pub use color::ColorRgba;
pub use rect::Rect;
pub use vec2::Vec2;
