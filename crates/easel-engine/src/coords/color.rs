use rand::Rng;

/// Straight-alpha RGBA color with channels in `[0, 1]`.
///
/// This is the canonical in-memory color representation. Byte encodings
/// (`to_unorm8`) only exist as a transport format for vertex buffers.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Random opaque color, each channel uniform in `[0, 1)`.
    pub fn random_opaque<R: Rng>(rng: &mut R) -> Self {
        Self::new(rng.r#gen(), rng.r#gen(), rng.r#gen(), 1.0)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Encodes the color as normalized bytes (`0.0 → 0`, `1.0 → 255`).
    ///
    /// Channels outside `[0, 1]` are clamped.
    #[inline]
    pub fn to_unorm8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Decodes normalized bytes back to `[0, 1]` channels.
    #[inline]
    pub fn from_unorm8(bytes: [u8; 4]) -> Self {
        let d = |b: u8| b as f32 / 255.0;
        Self::new(d(bytes[0]), d(bytes[1]), d(bytes[2]), d(bytes[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn unorm8_endpoints() {
        assert_eq!(ColorRgba::white().to_unorm8(), [255, 255, 255, 255]);
        assert_eq!(ColorRgba::transparent().to_unorm8(), [0, 0, 0, 0]);
    }

    #[test]
    fn unorm8_clamps_out_of_range() {
        assert_eq!(ColorRgba::new(-0.5, 2.0, 0.5, 1.0).to_unorm8(), [0, 255, 128, 255]);
    }

    #[test]
    fn from_unorm8_restores_endpoints() {
        assert_eq!(ColorRgba::from_unorm8([255, 0, 255, 0]), ColorRgba::new(1.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn random_opaque_stays_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let c = ColorRgba::random_opaque(&mut rng);
            assert!((0.0..1.0).contains(&c.r));
            assert!((0.0..1.0).contains(&c.g));
            assert!((0.0..1.0).contains(&c.b));
            assert_eq!(c.a, 1.0);
        }
    }
}
