use crate::coords::{Rect, Vec2};

/// Two triangles covering x ∈ [10, 80], y ∈ [20, 30].
pub fn rectangle() -> [f32; 12] {
    Rect::from_corners(Vec2::new(10.0, 20.0), Vec2::new(80.0, 30.0)).triangles()
}

/// The letter F at the origin, 100 × 150 pixels: a left column and two rungs.
pub fn letter_f() -> [f32; 36] {
    let parts = [
        Rect::new(0.0, 0.0, 30.0, 150.0),
        Rect::new(30.0, 0.0, 70.0, 30.0),
        Rect::new(30.0, 60.0, 37.0, 30.0),
    ];

    let mut out = [0.0; 36];
    for (chunk, rect) in out.chunks_exact_mut(12).zip(parts) {
        chunk.copy_from_slice(&rect.triangles());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_matches_reference_triangles() {
        assert_eq!(
            rectangle(),
            [10.0, 20.0, 80.0, 20.0, 10.0, 30.0, 10.0, 30.0, 80.0, 20.0, 80.0, 30.0]
        );
    }

    #[test]
    fn letter_f_has_three_quads() {
        let f = letter_f();
        assert_eq!(&f[..12], &[0.0, 0.0, 30.0, 0.0, 0.0, 150.0, 0.0, 150.0, 30.0, 0.0, 30.0, 150.0]);
        assert_eq!(&f[24..], &[30.0, 60.0, 67.0, 60.0, 30.0, 90.0, 30.0, 90.0, 67.0, 60.0, 67.0, 90.0]);
    }
}
