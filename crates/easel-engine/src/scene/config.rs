use crate::coords::ColorRgba;
use crate::gpu::Primitive;

/// Fixed per-scene parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneConfig {
    /// Color the backing store is cleared to before each draw.
    pub clear_color: ColorRgba,
    pub primitive: Primitive,
    /// Whether `u_color` is pushed on every render.
    pub drives_color: bool,
    /// Whether `u_translation` is pushed on every render.
    pub drives_translation: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_color: ColorRgba::transparent(),
            primitive: Primitive::Triangles,
            drives_color: true,
            drives_translation: false,
        }
    }
}
