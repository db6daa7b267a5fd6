//! One drawable scene and the state that drives it.
//!
//! A [`Scene`] owns the GPU objects built at startup (program, geometry,
//! layout) and replays the fixed render sequence against a [`RenderState`]
//! each time it is asked to draw.

mod config;
mod render;
mod state;

pub use config::SceneConfig;
pub use render::Scene;
pub use state::RenderState;

/// Uniform carrying the backing-store size in pixels.
pub const U_RESOLUTION: &str = "u_resolution";
/// Uniform carrying the fill color.
pub const U_COLOR: &str = "u_color";
/// Uniform carrying the translation in pixels.
pub const U_TRANSLATION: &str = "u_translation";
