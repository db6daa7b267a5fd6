use crate::coords::ColorRgba;

/// The swapchain image currently being drawn into.
///
/// Held from the first draw (or clear) of a frame until `present`; holding it
/// prevents acquisition of the next one.
pub(crate) struct Frame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl Frame {
    pub fn new(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self { surface_texture, view }
    }

    /// Starts a pass on this frame, clearing it first when `clear` is set.
    pub fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: Option<wgpu::Color>,
    ) -> wgpu::RenderPass<'e> {
        let load = match clear {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("easel pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

pub(crate) fn clear_color(c: ColorRgba) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}

/// A viewport rectangle as passed to `viewport`: origin at the bottom-left.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Clips to a `target_w × target_h` image and flips to a top-left origin.
    ///
    /// Returns `[x, y, w, h]` for `set_viewport`, or `None` when nothing of
    /// the viewport is inside the target.
    pub fn to_target(self, target_w: u32, target_h: u32) -> Option<[f32; 4]> {
        let clip = |start: i32, len: u32, max: u32| {
            let lo = i64::from(start).clamp(0, i64::from(max));
            let hi = (i64::from(start) + i64::from(len)).clamp(0, i64::from(max));
            (lo, hi)
        };

        let (x0, x1) = clip(self.x, self.width, target_w);
        let (y0, y1) = clip(self.y, self.height, target_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let top = i64::from(target_h) - y1;
        Some([x0 as f32, top as f32, (x1 - x0) as f32, (y1 - y0) as f32])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_viewport_maps_to_whole_target() {
        assert_eq!(Viewport::full(300, 150).to_target(300, 150), Some([0.0, 0.0, 300.0, 150.0]));
    }

    #[test]
    fn viewport_is_clipped_and_flipped() {
        let vp = Viewport { x: -10, y: 20, width: 60, height: 200 };
        assert_eq!(vp.to_target(100, 100), Some([0.0, 0.0, 50.0, 80.0]));

        let vp = Viewport { x: 10, y: 10, width: 20, height: 30 };
        assert_eq!(vp.to_target(100, 100), Some([10.0, 60.0, 20.0, 30.0]));
    }

    #[test]
    fn empty_or_outside_viewport_is_rejected() {
        assert_eq!(Viewport::full(0, 0).to_target(100, 100), None);
        assert_eq!(Viewport { x: 200, y: 0, width: 10, height: 10 }.to_target(100, 100), None);
        assert_eq!(Viewport::full(10, 10).to_target(0, 0), None);
    }
}
