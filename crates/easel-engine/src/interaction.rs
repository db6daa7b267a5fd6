//! Turning UI axis input into redraws.

use crate::canvas::CanvasSurface;
use crate::gpu::GpuApi;
use crate::scene::{RenderState, Scene};

/// One of the two translation axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// `0 → X`, `1 → Y`.
    pub fn from_index(index: usize) -> Option<Axis> {
        match index {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// Valid input range for `axis`: `[0, backing dimension]`.
pub fn axis_range<S: CanvasSurface + ?Sized>(canvas: &S, axis: Axis) -> (f32, f32) {
    let (w, h) = canvas.backing_size();
    let max = match axis {
        Axis::X => w,
        Axis::Y => h,
    };
    (0.0, max as f32)
}

/// Borrows everything a redraw needs for the duration of one input event.
pub struct InteractionBridge<'a, G: GpuApi> {
    pub gpu: &'a mut G,
    pub scene: &'a mut Scene,
    pub state: &'a mut RenderState,
}

impl<'a, G: GpuApi> InteractionBridge<'a, G> {
    pub fn new(gpu: &'a mut G, scene: &'a mut Scene, state: &'a mut RenderState) -> Self {
        Self { gpu, scene, state }
    }

    /// Sets one translation component and redraws before returning.
    pub fn on_axis_change(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.state.translation.x = value,
            Axis::Y => self.state.translation.y = value,
        }
        log::trace!("axis {axis:?} -> {value}");
        self.scene.render(self.gpu, self.state);
    }

    /// Index-based form of [`on_axis_change`](Self::on_axis_change) for
    /// callers that only know the slider number. Unknown indices are ignored.
    pub fn on_axis_index_change(&mut self, index: usize, value: f32) {
        match Axis::from_index(index) {
            Some(axis) => self.on_axis_change(axis, value),
            None => log::warn!("ignoring input for unknown axis {index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{ColorRgba, Rect, Vec2};
    use crate::geometry::GeometryBuffer;
    use crate::gpu::headless::{GpuCall, HeadlessCanvas, HeadlessGpu};
    use crate::layout::{AttributeSlot, VertexLayout};
    use crate::program::ProgramBuilder;
    use crate::scene::SceneConfig;
    use crate::shader::ShaderStage;

    const VS: &str = r#"
        @group(0) @binding(0) var<uniform> u_resolution: vec2<f32>;
        @group(0) @binding(1) var<uniform> u_translation: vec2<f32>;
        @vertex
        fn vs_main(@location(0) a_position: vec2<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>((a_position + u_translation) / u_resolution, 0.0, 1.0);
        }
    "#;

    const FS: &str = r#"
        @group(0) @binding(2) var<uniform> u_color: vec4<f32>;
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return u_color;
        }
    "#;

    fn setup() -> (HeadlessGpu, Scene) {
        let mut gpu = HeadlessGpu::new(HeadlessCanvas::new(300.0, 150.0, 1.0));
        let program = ProgramBuilder::new("interaction test")
            .build(&mut gpu, &ShaderStage::vertex(VS), &ShaderStage::fragment(FS))
            .unwrap();
        let rect = Rect::from_corners(Vec2::new(10.0, 20.0), Vec2::new(80.0, 30.0)).triangles();
        let buffer = GeometryBuffer::with_data(&mut gpu, 2, &rect);
        let layout = VertexLayout::new(AttributeSlot::float32("a_position", 2), &buffer)
            .bind(&mut gpu, &program)
            .unwrap();
        let config = SceneConfig {
            drives_translation: true,
            ..SceneConfig::default()
        };
        let scene = Scene::new(&gpu, config, program, buffer, layout).unwrap();
        (gpu, scene)
    }

    fn last_translation(gpu: &HeadlessGpu) -> Option<[f32; 2]> {
        gpu.calls().iter().rev().find_map(|c| match c {
            GpuCall::Uniform2f { location, value } if location.index == 1 => Some(*value),
            _ => None,
        })
    }

    #[test]
    fn axis_change_moves_only_that_axis() {
        let (mut gpu, mut scene) = setup();
        let mut state = RenderState::new(Vec2::new(7.0, 13.0), ColorRgba::black());

        InteractionBridge::new(&mut gpu, &mut scene, &mut state).on_axis_change(Axis::X, 42.0);

        assert_eq!(last_translation(&gpu), Some([42.0, 13.0]));
        assert_eq!(state.translation, Vec2::new(42.0, 13.0));
    }

    #[test]
    fn every_event_redraws() {
        let (mut gpu, mut scene) = setup();
        let mut state = RenderState::default();

        let mut bridge = InteractionBridge::new(&mut gpu, &mut scene, &mut state);
        bridge.on_axis_index_change(0, 10.0);
        bridge.on_axis_index_change(1, 20.0);
        bridge.on_axis_index_change(2, 30.0);

        let draws = gpu
            .calls()
            .iter()
            .filter(|c| matches!(c, GpuCall::DrawArrays { .. }))
            .count();
        assert_eq!(draws, 2);
        assert_eq!(last_translation(&gpu), Some([10.0, 20.0]));
    }

    #[test]
    fn range_tracks_backing_size() {
        let mut canvas = HeadlessCanvas::new(100.0, 40.0, 1.5);
        crate::canvas::reconcile_size(&mut canvas);

        assert_eq!(axis_range(&canvas, Axis::X), (0.0, 150.0));
        assert_eq!(axis_range(&canvas, Axis::Y), (0.0, 60.0));
        assert_eq!(Axis::from_index(1), Some(Axis::Y));
        assert_eq!(Axis::from_index(2), None);
    }
}
