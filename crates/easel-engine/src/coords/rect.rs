use super::Vec2;

/// Axis-aligned rectangle in pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Builds a rectangle from two opposite corners.
    #[inline]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Rect::new(a.x, a.y, b.x - a.x, b.y - a.y).normalized()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Two triangles covering the rectangle, as six `(x, y)` pairs.
    ///
    /// Vertex order: `(x0,y0) (x1,y0) (x0,y1)` then `(x0,y1) (x1,y0) (x1,y1)`.
    pub fn triangles(self) -> [f32; 12] {
        let r = self.normalized();
        let (x0, y0) = (r.origin.x, r.origin.y);
        let (x1, y1) = (x0 + r.size.x, y0 + r.size.y);
        [
            x0, y0, x1, y0, x0, y1, //
            x0, y1, x1, y0, x1, y1,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── normalized ────────────────────────────────────────────────────────

    #[test]
    fn normalized_positive_is_identity() {
        let rect = r(1.0, 2.0, 10.0, 20.0);
        assert_eq!(rect.normalized(), rect);
    }

    #[test]
    fn normalized_negative_width() {
        let rect = r(10.0, 0.0, -4.0, 5.0);
        let n = rect.normalized();
        assert_eq!(n.origin.x, 6.0);
        assert_eq!(n.size.x, 4.0);
    }

    #[test]
    fn from_corners_orders_points() {
        let rect = Rect::from_corners(Vec2::new(80.0, 30.0), Vec2::new(10.0, 20.0));
        assert_eq!(rect, r(10.0, 20.0, 70.0, 10.0));
    }

    // ── triangles ─────────────────────────────────────────────────────────

    #[test]
    fn triangles_cover_corners_in_lesson_order() {
        let t = r(10.0, 20.0, 70.0, 10.0).triangles();
        assert_eq!(
            t,
            [10.0, 20.0, 80.0, 20.0, 10.0, 30.0, 10.0, 30.0, 80.0, 20.0, 80.0, 30.0]
        );
    }

    #[test]
    fn empty_rect_reports_empty() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
