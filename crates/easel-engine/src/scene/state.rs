use rand::Rng;

use crate::coords::{ColorRgba, Vec2};

/// Per-interaction mutable input of a render.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderState {
    /// Offset in backing-store pixels.
    pub translation: Vec2,
    pub color: ColorRgba,
}

impl RenderState {
    pub fn new(translation: Vec2, color: ColorRgba) -> Self {
        Self { translation, color }
    }

    /// No translation and a random opaque color.
    pub fn with_random_color<R: Rng>(rng: &mut R) -> Self {
        Self::new(Vec2::zero(), ColorRgba::random_opaque(rng))
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(Vec2::zero(), ColorRgba::black())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn random_state_starts_untranslated_and_opaque() {
        let mut rng = StdRng::seed_from_u64(11);
        let state = RenderState::with_random_color(&mut rng);

        assert_eq!(state.translation, Vec2::zero());
        assert_eq!(state.color.a, 1.0);
    }
}
