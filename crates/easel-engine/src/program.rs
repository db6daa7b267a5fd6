//! Program construction and activation.

use crate::error::ProgramError;
use crate::gpu::{GpuApi, Primitive, ProgramId, ShaderId, VertexArrayId};
use crate::layout::VertexLayoutState;
use crate::shader::ShaderStage;

/// A successfully linked vertex + fragment program.
///
/// Only [`ProgramBuilder::build`] creates one, so holding a `Program` means
/// both stages compiled and linking succeeded.
#[derive(Debug, PartialEq, Eq)]
pub struct Program {
    id: ProgramId,
}

impl Program {
    #[inline]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// Makes this program current and returns the guard through which its
    /// uniforms are set and its draws are issued.
    pub fn activate<'g, G: GpuApi>(&self, gpu: &'g mut G) -> ActiveProgram<'g, G> {
        gpu.use_program(self.id);
        ActiveProgram {
            gpu,
            program: self.id,
            layout: None,
        }
    }
}

/// Compiles and links shader stages into a [`Program`].
#[derive(Debug, Clone)]
pub struct ProgramBuilder {
    label: String,
}

impl ProgramBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    /// Builds a program from one vertex and one fragment stage.
    ///
    /// On any failure every object created so far is deleted again; no
    /// partial program survives.
    pub fn build<G: GpuApi>(
        &self,
        gpu: &mut G,
        vertex: &ShaderStage,
        fragment: &ShaderStage,
    ) -> Result<Program, ProgramError> {
        let vs = self.compile_stage(gpu, vertex)?;
        let fs = match self.compile_stage(gpu, fragment) {
            Ok(fs) => fs,
            Err(e) => {
                gpu.delete_shader(vs);
                return Err(e);
            }
        };

        let program = gpu.create_program();
        gpu.attach_shader(program, vs);
        gpu.attach_shader(program, fs);
        gpu.link_program(program);

        if !gpu.program_linked(program) {
            let log = gpu.program_info_log(program);
            log::error!("{}: link failed:\n{log}", self.label);
            gpu.delete_program(program);
            gpu.delete_shader(vs);
            gpu.delete_shader(fs);
            return Err(ProgramError::Link { log });
        }

        log::debug!("{}: linked program {program:?}", self.label);
        Ok(Program { id: program })
    }

    fn compile_stage<G: GpuApi>(
        &self,
        gpu: &mut G,
        stage: &ShaderStage,
    ) -> Result<ShaderId, ProgramError> {
        let shader = gpu.create_shader(stage.kind());
        gpu.compile_shader(shader, stage.source());

        if gpu.shader_compiled(shader) {
            return Ok(shader);
        }

        let log = gpu.shader_info_log(shader);
        log::error!("{}: {} shader failed to compile:\n{log}", self.label, stage.kind());
        gpu.delete_shader(shader);
        Err(ProgramError::Compile {
            stage: stage.kind(),
            log,
        })
    }
}

/// Borrow of the GPU while a program is current.
///
/// Setting uniforms and drawing go through this guard, so "activate program →
/// set its uniforms → draw" is the only order the API allows.
pub struct ActiveProgram<'g, G: GpuApi> {
    pub(crate) gpu: &'g mut G,
    pub(crate) program: ProgramId,
    layout: Option<VertexArrayId>,
}

impl<'g, G: GpuApi> ActiveProgram<'g, G> {
    #[inline]
    pub fn program(&self) -> ProgramId {
        self.program
    }

    #[inline]
    pub fn gpu(&self) -> &G {
        &*self.gpu
    }

    /// Makes `layout` the sole source of vertex input for subsequent draws.
    pub fn bind_layout(&mut self, layout: &VertexLayoutState) {
        if layout.program() != self.program {
            log::warn!(
                "vertex layout was resolved against {:?} but {:?} is active",
                layout.program(),
                self.program
            );
        }
        self.gpu.bind_vertex_array(layout.vao());
        self.layout = Some(layout.vao());
    }

    /// Issues a non-indexed draw over `count` vertices starting at `first`.
    ///
    /// Skipped (with an error log) when no layout has been bound.
    pub fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        if self.layout.is_none() {
            log::error!("draw skipped: no vertex layout bound for {:?}", self.program);
            return;
        }
        self.gpu.draw_arrays(primitive, first, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryBuffer;
    use crate::gpu::ShaderKind;
    use crate::gpu::headless::{GpuCall, HeadlessCanvas, HeadlessGpu};
    use crate::layout::{AttributeSlot, VertexLayout};

    const VS: &str = r#"
        @group(0) @binding(0) var<uniform> u_resolution: vec2<f32>;
        @vertex
        fn vs_main(@location(0) a_position: vec2<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(a_position / u_resolution, 0.0, 1.0);
        }
    "#;

    const FS: &str = r#"
        @group(0) @binding(1) var<uniform> u_color: vec4<f32>;
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return u_color;
        }
    "#;

    const FS_VARYING: &str = r#"
        @fragment
        fn fs_main(@location(0) v_color: vec4<f32>) -> @location(0) vec4<f32> {
            return v_color;
        }
    "#;

    fn gpu() -> HeadlessGpu {
        HeadlessGpu::new(HeadlessCanvas::new(100.0, 100.0, 1.0))
    }

    fn deleted_shaders(gpu: &HeadlessGpu) -> Vec<ShaderId> {
        gpu.calls()
            .iter()
            .filter_map(|c| match c {
                GpuCall::DeleteShader { shader } => Some(*shader),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn build_yields_program_with_position_input() {
        let mut gpu = gpu();
        let program = ProgramBuilder::new("test")
            .build(&mut gpu, &ShaderStage::vertex(VS), &ShaderStage::fragment(FS))
            .unwrap();

        assert!(gpu.program_linked(program.id()));
        assert_eq!(gpu.attrib_location(program.id(), "a_position"), Some(0));
    }

    #[test]
    fn malformed_vertex_stage_is_named_and_released() {
        let mut gpu = gpu();
        let err = ProgramBuilder::new("test")
            .build(
                &mut gpu,
                &ShaderStage::vertex("@vertex fn vs_main( {"),
                &ShaderStage::fragment(FS),
            )
            .unwrap_err();

        assert!(matches!(err, ProgramError::Compile { stage: ShaderKind::Vertex, .. }));
        assert!(!err.log().is_empty());
        assert_eq!(deleted_shaders(&gpu).len(), 1);
        assert!(!gpu.calls().iter().any(|c| matches!(c, GpuCall::CreateProgram { .. })));
    }

    #[test]
    fn malformed_fragment_stage_releases_both_stages() {
        let mut gpu = gpu();
        let err = ProgramBuilder::new("test")
            .build(
                &mut gpu,
                &ShaderStage::vertex(VS),
                &ShaderStage::fragment("@fragment fn fs_main() -> @location(0) vec4<f32> { return nope; }"),
            )
            .unwrap_err();

        assert!(matches!(err, ProgramError::Compile { stage: ShaderKind::Fragment, .. }));
        assert_eq!(deleted_shaders(&gpu).len(), 2);
        assert!(!gpu.calls().iter().any(|c| matches!(c, GpuCall::CreateProgram { .. })));
    }

    #[test]
    fn link_failure_releases_program_and_stages() {
        let mut gpu = gpu();
        let err = ProgramBuilder::new("test")
            .build(&mut gpu, &ShaderStage::vertex(VS), &ShaderStage::fragment(FS_VARYING))
            .unwrap_err();

        assert!(matches!(err, ProgramError::Link { .. }));
        assert!(err.log().contains("v_color"));
        assert!(gpu.calls().iter().any(|c| matches!(c, GpuCall::DeleteProgram { .. })));
        assert_eq!(deleted_shaders(&gpu).len(), 2);
    }

    #[test]
    fn activate_uses_program() {
        let mut gpu = gpu();
        let program = ProgramBuilder::new("test")
            .build(&mut gpu, &ShaderStage::vertex(VS), &ShaderStage::fragment(FS))
            .unwrap();

        let pass = program.activate(&mut gpu);
        assert_eq!(pass.program(), program.id());
        drop(pass);
        assert_eq!(gpu.current_program(), Some(program.id()));
    }

    #[test]
    fn draw_without_layout_is_skipped() {
        let mut gpu = gpu();
        let program = ProgramBuilder::new("test")
            .build(&mut gpu, &ShaderStage::vertex(VS), &ShaderStage::fragment(FS))
            .unwrap();

        program.activate(&mut gpu).draw_arrays(Primitive::Triangles, 0, 3);
        assert_eq!(gpu.last_draw(), None);
    }

    #[test]
    fn last_bound_layout_feeds_the_draw() {
        let mut gpu = gpu();
        let program = ProgramBuilder::new("test")
            .build(&mut gpu, &ShaderStage::vertex(VS), &ShaderStage::fragment(FS))
            .unwrap();
        let pos_a = GeometryBuffer::with_data(&mut gpu, 2, &[0.0f32; 12]);
        let pos_b = GeometryBuffer::with_data(&mut gpu, 2, &[0.0f32; 6]);
        let a = VertexLayout::new(AttributeSlot::float32("a_position", 2), &pos_a)
            .bind(&mut gpu, &program)
            .unwrap();
        let b = VertexLayout::new(AttributeSlot::float32("a_position", 2), &pos_b)
            .bind(&mut gpu, &program)
            .unwrap();

        let mut pass = program.activate(&mut gpu);
        pass.bind_layout(&a);
        pass.bind_layout(&b);
        pass.draw_arrays(Primitive::Triangles, 0, b.vertex_count(&pos_b));
        drop(pass);

        let calls = gpu.calls();
        let draw = calls.iter().rposition(|c| matches!(c, GpuCall::DrawArrays { .. })).unwrap();
        let bound = calls[..draw].iter().rev().find_map(|c| match c {
            GpuCall::BindVertexArray { vao } => Some(*vao),
            _ => None,
        });
        assert_eq!(bound, Some(b.vao()));
        assert_ne!(a.vao(), b.vao());
        assert_eq!(gpu.last_draw(), Some((Primitive::Triangles, 0, 3)));
    }
}
