use crate::canvas::reconcile_size;
use crate::coords::Vec2;
use crate::error::{SetupError, UniformError};
use crate::geometry::GeometryBuffer;
use crate::gpu::{ClearMask, GpuApi, UniformKind};
use crate::layout::VertexLayoutState;
use crate::program::{ActiveProgram, Program};
use crate::uniform::{UniformBinder, UniformValue};

use super::{RenderState, SceneConfig, U_COLOR, U_RESOLUTION, U_TRANSLATION};

/// Program, geometry and layout of one drawable, plus the fixed render
/// sequence that draws them.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    program: Program,
    positions: GeometryBuffer,
    attributes: Vec<GeometryBuffer>,
    layout: VertexLayoutState,
    uniforms: UniformBinder,
}

impl Scene {
    /// Assembles a scene from already-built parts.
    ///
    /// Every uniform the scene drives is resolved up front; a declared
    /// uniform of the wrong shape fails here instead of at draw time.
    pub fn new<G: GpuApi>(
        gpu: &G,
        config: SceneConfig,
        program: Program,
        positions: GeometryBuffer,
        layout: VertexLayoutState,
    ) -> Result<Self, SetupError> {
        let mut uniforms = UniformBinder::new();

        let driven = [
            (U_RESOLUTION, UniformKind::Vec2, true),
            (U_COLOR, UniformKind::Vec4, config.drives_color),
            (U_TRANSLATION, UniformKind::Vec2, config.drives_translation),
        ];
        for (name, expected, enabled) in driven {
            if !enabled {
                continue;
            }
            let Some(handle) = uniforms.resolve(gpu, &program, name) else {
                if gpu.uniform_declared(program.id(), name) {
                    return Err(UniformError::Unsupported {
                        name: name.to_string(),
                        expected,
                    }
                    .into());
                }
                continue;
            };
            if handle.kind() != expected {
                return Err(UniformError::KindMismatch {
                    name: name.to_string(),
                    expected,
                    actual: handle.kind(),
                }
                .into());
            }
        }

        Ok(Self {
            config,
            program,
            positions,
            attributes: Vec::new(),
            layout,
            uniforms,
        })
    }

    /// Hands ownership of an extra attribute buffer to the scene.
    pub fn with_buffer(mut self, buffer: GeometryBuffer) -> Self {
        self.attributes.push(buffer);
        self
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[inline]
    pub fn program(&self) -> &Program {
        &self.program
    }

    #[inline]
    pub fn layout(&self) -> &VertexLayoutState {
        &self.layout
    }

    #[inline]
    pub fn positions(&self) -> &GeometryBuffer {
        &self.positions
    }

    /// Vertices the next render will draw.
    pub fn vertex_count(&self) -> u32 {
        self.layout.vertex_count(&self.positions)
    }

    /// Replaces the position data. The layout keeps pointing at the same buffer.
    pub fn upload_positions<G: GpuApi>(&mut self, gpu: &mut G, data: &[f32]) {
        self.positions.upload(gpu, data);
    }

    /// Draws one frame:
    ///
    /// 1. reconcile the canvas backing size,
    /// 2. set the viewport to the full backing store,
    /// 3. clear color and depth,
    /// 4. activate the program and bind the layout,
    /// 5. push the driven uniforms,
    /// 6. draw every vertex of the position buffer,
    /// 7. present.
    pub fn render<G: GpuApi>(&mut self, gpu: &mut G, state: &RenderState) {
        let size = reconcile_size(gpu.canvas_mut());
        if size.changed {
            log::debug!("backing store resized to {}x{}", size.backing_width, size.backing_height);
        }

        gpu.viewport(0, 0, size.backing_width, size.backing_height);
        gpu.clear_color(self.config.clear_color);
        gpu.clear(ClearMask::COLOR_DEPTH);

        let count = self.vertex_count();
        let resolution = Vec2::new(size.backing_width as f32, size.backing_height as f32);

        let mut pass = self.program.activate(gpu);
        pass.bind_layout(&self.layout);

        drive(&mut self.uniforms, &mut pass, U_RESOLUTION, resolution);
        if self.config.drives_color {
            drive(&mut self.uniforms, &mut pass, U_COLOR, state.color);
        }
        if self.config.drives_translation {
            drive(&mut self.uniforms, &mut pass, U_TRANSLATION, state.translation);
        }

        if count > 0 {
            pass.draw_arrays(self.config.primitive, 0, count);
        } else {
            log::debug!("position buffer holds no whole vertex; draw skipped");
        }

        gpu.present();
    }
}

fn drive<G: GpuApi>(
    uniforms: &mut UniformBinder,
    pass: &mut ActiveProgram<'_, G>,
    name: &str,
    value: impl Into<UniformValue>,
) {
    if let Err(e) = uniforms.push(pass, name, value) {
        log::error!("{e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{ColorRgba, Rect};
    use crate::gpu::Primitive;
    use crate::gpu::headless::{GpuCall, HeadlessCanvas, HeadlessGpu};
    use crate::layout::{AttributeSlot, VertexLayout};
    use crate::program::ProgramBuilder;
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

    fn scene(canvas: HeadlessCanvas, config: SceneConfig, positions: &[f32]) -> (HeadlessGpu, Scene) {
        let mut gpu = HeadlessGpu::new(canvas);
        let program = ProgramBuilder::new("scene test")
            .build(&mut gpu, &ShaderStage::vertex(VS), &ShaderStage::fragment(FS))
            .unwrap();
        let buffer = GeometryBuffer::with_data(&mut gpu, 2, positions);
        let layout = VertexLayout::new(AttributeSlot::float32("a_position", 2), &buffer)
            .bind(&mut gpu, &program)
            .unwrap();
        let scene = Scene::new(&gpu, config, program, buffer, layout).unwrap();
        gpu.take_calls();
        (gpu, scene)
    }

    fn uniform2f_value(call: &GpuCall) -> [f32; 2] {
        match call {
            GpuCall::Uniform2f { value, .. } => *value,
            other => panic!("expected a vec2 write, got {other:?}"),
        }
    }

    fn rectangle() -> [f32; 12] {
        Rect::from_corners(Vec2::new(10.0, 20.0), Vec2::new(80.0, 30.0)).triangles()
    }

    #[test]
    fn rectangle_draws_two_triangles() {
        let (mut gpu, mut scene) = scene(HeadlessCanvas::new(300.0, 150.0, 1.0), SceneConfig::default(), &rectangle());

        scene.render(&mut gpu, &RenderState::default());
        assert_eq!(gpu.last_draw(), Some((Primitive::Triangles, 0, 6)));
    }

    #[test]
    fn draw_covers_every_uploaded_vertex() {
        for n in [1usize, 3, 7, 18] {
            let data: Vec<f32> = (0..n * 2).map(|i| i as f32).collect();
            let (mut gpu, mut scene) = scene(HeadlessCanvas::new(10.0, 10.0, 1.0), SceneConfig::default(), &data);

            scene.render(&mut gpu, &RenderState::default());
            assert_eq!(gpu.last_draw(), Some((Primitive::Triangles, 0, n as u32)));
        }
    }

    #[test]
    fn render_follows_the_fixed_sequence() {
        let config = SceneConfig {
            clear_color: ColorRgba::white(),
            drives_translation: true,
            ..SceneConfig::default()
        };
        let (mut gpu, mut scene) = scene(HeadlessCanvas::new(100.0, 50.0, 2.0), config, &rectangle());
        let program = scene.program().id();
        let vao = scene.layout().vao();

        scene.render(&mut gpu, &RenderState::new(Vec2::new(5.0, 6.0), ColorRgba::black()));

        let calls = gpu.take_calls();
        let kinds: Vec<&str> = calls
            .iter()
            .map(|c| match c {
                GpuCall::Viewport { .. } => "viewport",
                GpuCall::ClearColor { .. } => "clear_color",
                GpuCall::Clear { .. } => "clear",
                GpuCall::UseProgram { .. } => "use_program",
                GpuCall::BindVertexArray { .. } => "bind_vertex_array",
                GpuCall::Uniform2f { .. } => "uniform2f",
                GpuCall::Uniform4f { .. } => "uniform4f",
                GpuCall::DrawArrays { .. } => "draw_arrays",
                GpuCall::Present => "present",
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            [
                "viewport",
                "clear_color",
                "clear",
                "use_program",
                "bind_vertex_array",
                "uniform2f",
                "uniform4f",
                "uniform2f",
                "draw_arrays",
                "present",
            ]
        );

        assert_eq!(calls[0], GpuCall::Viewport { x: 0, y: 0, width: 200, height: 100 });
        assert_eq!(calls[1], GpuCall::ClearColor { color: ColorRgba::white() });
        assert_eq!(calls[2], GpuCall::Clear { mask: ClearMask::COLOR_DEPTH });
        assert_eq!(calls[3], GpuCall::UseProgram { program });
        assert_eq!(calls[4], GpuCall::BindVertexArray { vao });
        assert_eq!(uniform2f_value(&calls[5]), [200.0, 100.0]);
        assert_eq!(uniform2f_value(&calls[7]), [5.0, 6.0]);
    }

    #[test]
    fn resize_is_picked_up_before_the_viewport() {
        let (mut gpu, mut scene) = scene(HeadlessCanvas::new(100.0, 100.0, 1.0), SceneConfig::default(), &rectangle());
        scene.render(&mut gpu, &RenderState::default());

        gpu.canvas_mut().set_logical_size(101.0, 80.0);
        gpu.canvas_mut().set_pixel_density(1.33);
        gpu.take_calls();
        scene.render(&mut gpu, &RenderState::default());

        assert_eq!(gpu.calls()[0], GpuCall::Viewport { x: 0, y: 0, width: 134, height: 106 });
    }

    #[test]
    fn reupload_changes_vertex_count() {
        let (mut gpu, mut scene) = scene(HeadlessCanvas::new(10.0, 10.0, 1.0), SceneConfig::default(), &rectangle());
        scene.upload_positions(&mut gpu, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);

        scene.render(&mut gpu, &RenderState::default());
        assert_eq!(gpu.last_draw(), Some((Primitive::Triangles, 0, 3)));
    }

    #[test]
    fn translation_is_not_pushed_unless_driven() {
        let (mut gpu, mut scene) = scene(HeadlessCanvas::new(10.0, 10.0, 1.0), SceneConfig::default(), &rectangle());
        scene.render(&mut gpu, &RenderState::new(Vec2::new(9.0, 9.0), ColorRgba::black()));

        let writes = gpu
            .calls()
            .iter()
            .filter(|c| matches!(c, GpuCall::Uniform2f { .. }))
            .count();
        assert_eq!(writes, 1);
    }

    #[test]
    fn wrongly_typed_driven_uniform_fails_setup() {
        let mut gpu = HeadlessGpu::new(HeadlessCanvas::new(10.0, 10.0, 1.0));
        let fs = r#"
            @group(0) @binding(2) var<uniform> u_color: vec2<f32>;
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(u_color, 0.0, 1.0);
            }
        "#;
        let program = ProgramBuilder::new("bad color")
            .build(&mut gpu, &ShaderStage::vertex(VS), &ShaderStage::fragment(fs))
            .unwrap();
        let buffer = GeometryBuffer::with_data(&mut gpu, 2, &rectangle());
        let layout = VertexLayout::new(AttributeSlot::float32("a_position", 2), &buffer)
            .bind(&mut gpu, &program)
            .unwrap();

        let err = Scene::new(&gpu, SceneConfig::default(), program, buffer, layout).unwrap_err();
        assert!(matches!(
            err,
            SetupError::Uniform(UniformError::KindMismatch { expected: UniformKind::Vec4, .. })
        ));
    }

    #[test]
    fn unsupported_driven_uniform_type_fails_setup() {
        let mut gpu = HeadlessGpu::new(HeadlessCanvas::new(10.0, 10.0, 1.0));
        let vs = r#"
            @group(0) @binding(0) var<uniform> u_resolution: vec2<f32>;
            @group(0) @binding(1) var<uniform> u_translation: vec3<f32>;
            @vertex
            fn vs_main(@location(0) a_position: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>((a_position + u_translation.xy) / u_resolution, 0.0, 1.0);
            }
        "#;
        let program = ProgramBuilder::new("vec3 translation")
            .build(&mut gpu, &ShaderStage::vertex(vs), &ShaderStage::fragment(FS))
            .unwrap();
        let buffer = GeometryBuffer::with_data(&mut gpu, 2, &rectangle());
        let layout = VertexLayout::new(AttributeSlot::float32("a_position", 2), &buffer)
            .bind(&mut gpu, &program)
            .unwrap();
        let config = SceneConfig {
            drives_translation: true,
            ..SceneConfig::default()
        };

        let err = Scene::new(&gpu, config, program, buffer, layout).unwrap_err();
        assert!(matches!(
            err,
            SetupError::Uniform(UniformError::Unsupported { ref name, expected: UniformKind::Vec2 })
                if name == "u_translation"
        ));
    }
}
