//! GPU capability interface.
//!
//! `GpuApi` is the seam between the rendering core and a concrete GPU. Every
//! object is addressed by an explicit handle: there is no implicit "currently
//! bound buffer", and attribute pointers name their vertex array and buffer
//! directly. Activation state (`use_program`, `bind_vertex_array`) only
//! selects what the next `draw_arrays` consumes.
//!
//! Backends:
//! - [`crate::device::WgpuGpu`]: a wgpu device presenting into a window.
//! - [`headless::HeadlessGpu`]: CPU-only, records every call.

pub mod headless;
mod objects;
mod types;

pub(crate) use objects::ObjectTable;
pub use types::{
    AttribPointer, BufferId, BufferUsage, ClearMask, NumericType, Primitive, ProgramId, ScalarClass,
    ShaderId, ShaderKind, UniformKind, UniformLocation, VertexArrayId,
};

use crate::canvas::CanvasSurface;
use crate::coords::ColorRgba;

pub trait GpuApi {
    /// Drawing surface the default framebuffer presents to.
    type Canvas: CanvasSurface;

    fn canvas(&self) -> &Self::Canvas;
    fn canvas_mut(&mut self) -> &mut Self::Canvas;

    // ── shaders ───────────────────────────────────────────────────────────

    fn create_shader(&mut self, kind: ShaderKind) -> ShaderId;
    fn compile_shader(&mut self, shader: ShaderId, source: &str);
    fn shader_compiled(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&mut self, shader: ShaderId);

    // ── programs ──────────────────────────────────────────────────────────

    fn create_program(&mut self) -> ProgramId;
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);
    fn link_program(&mut self, program: ProgramId);
    fn program_linked(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn delete_program(&mut self, program: ProgramId);
    fn use_program(&mut self, program: ProgramId);

    /// Location of a vertex input, `None` if the linked program has no such input.
    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32>;

    /// Scalar family the vertex input `name` is declared with.
    fn attrib_scalar(&self, program: ProgramId, name: &str) -> Option<ScalarClass>;

    /// Location of a uniform, `None` if absent or of a type the binder cannot drive.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Whether the linked program declares a uniform called `name`, whatever its type.
    fn uniform_declared(&self, program: ProgramId, name: &str) -> bool;

    fn uniform2f(&mut self, location: UniformLocation, value: [f32; 2]);
    fn uniform4f(&mut self, location: UniformLocation, value: [f32; 4]);

    // ── buffers & vertex arrays ───────────────────────────────────────────

    fn create_buffer(&mut self) -> BufferId;

    /// Replaces the whole content of `buffer`.
    fn buffer_data(&mut self, buffer: BufferId, bytes: &[u8], usage: BufferUsage);

    fn create_vertex_array(&mut self) -> VertexArrayId;
    fn bind_vertex_array(&mut self, vao: VertexArrayId);
    fn enable_vertex_attrib(&mut self, vao: VertexArrayId, location: u32);
    fn vertex_attrib_pointer(
        &mut self,
        vao: VertexArrayId,
        location: u32,
        buffer: BufferId,
        pointer: AttribPointer,
    );

    // ── frame ─────────────────────────────────────────────────────────────

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    fn clear_color(&mut self, color: ColorRgba);
    fn clear(&mut self, mask: ClearMask);
    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32);

    /// Commits the frame to the canvas.
    fn present(&mut self);
}
