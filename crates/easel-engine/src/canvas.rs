//! Backing-store size reconciliation.
//!
//! A canvas has a logical size (display units) and a pixel density; the GPU
//! renders into a backing store whose size must be `round(logical × density)`.
//! The logical size can change between frames without any event reaching the
//! renderer, so the sizes are reconciled before every draw.

/// Surface the GPU presents into.
pub trait CanvasSurface {
    /// Logical `(width, height)` in display units.
    fn logical_size(&self) -> (f64, f64);

    /// Physical pixels per logical unit.
    fn pixel_density(&self) -> f64;

    /// Current backing-store `(width, height)` in physical pixels.
    fn backing_size(&self) -> (u32, u32);

    /// Requests a new backing-store size.
    fn set_backing_size(&mut self, width: u32, height: u32);
}

/// Snapshot of the inputs that determine the backing-store size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanvasSize {
    pub logical_width: f64,
    pub logical_height: f64,
    pub pixel_density: f64,
}

impl CanvasSize {
    pub fn of<S: CanvasSurface + ?Sized>(surface: &S) -> Self {
        let (logical_width, logical_height) = surface.logical_size();
        Self {
            logical_width,
            logical_height,
            pixel_density: surface.pixel_density(),
        }
    }

    /// `(round(w × density), round(h × density))`, saturating at the `u32` range.
    pub fn backing(&self) -> (u32, u32) {
        (
            to_pixels(self.logical_width * self.pixel_density),
            to_pixels(self.logical_height * self.pixel_density),
        )
    }
}

fn to_pixels(v: f64) -> u32 {
    if v.is_finite() { v.round().clamp(0.0, u32::MAX as f64) as u32 } else { 0 }
}

/// Result of [`reconcile_size`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SizeReconcile {
    pub changed: bool,
    pub backing_width: u32,
    pub backing_height: u32,
}

/// Brings the surface's backing size in line with its logical size and density.
///
/// The surface is only touched when the computed size differs from its current
/// backing size.
pub fn reconcile_size<S: CanvasSurface + ?Sized>(surface: &mut S) -> SizeReconcile {
    let (backing_width, backing_height) = CanvasSize::of(surface).backing();
    let changed = surface.backing_size() != (backing_width, backing_height);

    if changed {
        log::debug!("canvas backing size -> {backing_width}x{backing_height}");
        surface.set_backing_size(backing_width, backing_height);
    }

    SizeReconcile {
        changed,
        backing_width,
        backing_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::headless::HeadlessCanvas;

    fn backing_width(logical: f64, density: f64) -> u32 {
        CanvasSize {
            logical_width: logical,
            logical_height: 10.0,
            pixel_density: density,
        }
        .backing()
        .0
    }

    #[test]
    fn rounds_scaled_size() {
        assert_eq!(backing_width(100.0, 1.5), 150);
        assert_eq!(backing_width(101.0, 1.33), 134);
        assert_eq!(backing_width(3.0, 1.5), 5); // 4.5 rounds up
    }

    #[test]
    fn degenerate_sizes_become_zero() {
        assert_eq!(backing_width(-10.0, 2.0), 0);
        assert_eq!(backing_width(f64::NAN, 1.0), 0);
    }

    #[test]
    fn first_reconcile_applies_new_size() {
        let mut canvas = HeadlessCanvas::new(100.0, 50.0, 2.0);
        let r = reconcile_size(&mut canvas);
        assert!(r.changed);
        assert_eq!((r.backing_width, r.backing_height), (200, 100));
        assert_eq!(canvas.backing_size(), (200, 100));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut canvas = HeadlessCanvas::new(101.0, 80.0, 1.33);
        let first = reconcile_size(&mut canvas);
        let second = reconcile_size(&mut canvas);
        assert!(!second.changed);
        assert_eq!(
            (first.backing_width, first.backing_height),
            (second.backing_width, second.backing_height)
        );
        assert_eq!(canvas.backing_size(), (134, 106));
        assert_eq!(canvas.resize_count(), 1);
    }

    #[test]
    fn density_change_triggers_resize() {
        let mut canvas = HeadlessCanvas::new(100.0, 100.0, 1.0);
        reconcile_size(&mut canvas);
        canvas.set_pixel_density(2.0);
        let r = reconcile_size(&mut canvas);
        assert!(r.changed);
        assert_eq!(canvas.backing_size(), (200, 200));
    }
}
