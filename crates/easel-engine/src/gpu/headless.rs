//! CPU-only backend.
//!
//! `HeadlessGpu` performs the same shader compilation, linking and reflection
//! as the wgpu backend but, instead of touching a device, appends every call to
//! an inspectable log. It backs the test-suite and the `--headless` dry run.

use std::collections::HashMap;

use crate::canvas::CanvasSurface;
use crate::coords::ColorRgba;

use super::{
    AttribPointer, BufferId, BufferUsage, ClearMask, GpuApi, ObjectTable, Primitive, ProgramId,
    ScalarClass, ShaderId, ShaderKind, UniformLocation, VertexArrayId,
};

/// One recorded GPU call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CreateShader { shader: ShaderId, kind: ShaderKind },
    CompileShader { shader: ShaderId, ok: bool },
    DeleteShader { shader: ShaderId },
    CreateProgram { program: ProgramId },
    AttachShader { program: ProgramId, shader: ShaderId },
    LinkProgram { program: ProgramId, ok: bool },
    DeleteProgram { program: ProgramId },
    UseProgram { program: ProgramId },
    CreateBuffer { buffer: BufferId },
    BufferData { buffer: BufferId, len: usize, usage: BufferUsage },
    CreateVertexArray { vao: VertexArrayId },
    BindVertexArray { vao: VertexArrayId },
    EnableVertexAttrib { vao: VertexArrayId, location: u32 },
    VertexAttribPointer { vao: VertexArrayId, location: u32, buffer: BufferId, pointer: AttribPointer },
    Uniform2f { location: UniformLocation, value: [f32; 2] },
    Uniform4f { location: UniformLocation, value: [f32; 4] },
    Viewport { x: i32, y: i32, width: u32, height: u32 },
    ClearColor { color: ColorRgba },
    Clear { mask: ClearMask },
    DrawArrays { primitive: Primitive, first: u32, count: u32 },
    Present,
}

/// In-memory canvas with a settable logical size and pixel density.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessCanvas {
    logical: (f64, f64),
    density: f64,
    backing: (u32, u32),
    resizes: usize,
}

impl HeadlessCanvas {
    /// Creates a canvas whose backing store has not been sized yet (`0×0`).
    pub fn new(logical_width: f64, logical_height: f64, pixel_density: f64) -> Self {
        Self {
            logical: (logical_width, logical_height),
            density: pixel_density,
            backing: (0, 0),
            resizes: 0,
        }
    }

    pub fn set_logical_size(&mut self, width: f64, height: f64) {
        self.logical = (width, height);
    }

    pub fn set_pixel_density(&mut self, density: f64) {
        self.density = density;
    }

    /// Number of times the backing store has been resized.
    pub fn resize_count(&self) -> usize {
        self.resizes
    }
}

impl CanvasSurface for HeadlessCanvas {
    fn logical_size(&self) -> (f64, f64) {
        self.logical
    }

    fn pixel_density(&self) -> f64 {
        self.density
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.backing = (width, height);
        self.resizes += 1;
    }
}

/// Recording GPU backend.
pub struct HeadlessGpu {
    canvas: HeadlessCanvas,
    objects: ObjectTable,
    calls: Vec<GpuCall>,
    buffers: HashMap<BufferId, Vec<u8>>,
    uniforms: HashMap<UniformLocation, Vec<f32>>,
    current_program: Option<ProgramId>,
    current_vao: Option<VertexArrayId>,
}

impl HeadlessGpu {
    pub fn new(canvas: HeadlessCanvas) -> Self {
        Self {
            canvas,
            objects: ObjectTable::default(),
            calls: Vec::new(),
            buffers: HashMap::new(),
            uniforms: HashMap::new(),
            current_program: None,
            current_vao: None,
        }
    }

    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    /// Drains the call log.
    pub fn take_calls(&mut self) -> Vec<GpuCall> {
        std::mem::take(&mut self.calls)
    }

    /// `(primitive, first, count)` of the most recent draw.
    pub fn last_draw(&self) -> Option<(Primitive, u32, u32)> {
        self.calls.iter().rev().find_map(|c| match *c {
            GpuCall::DrawArrays { primitive, first, count } => Some((primitive, first, count)),
            _ => None,
        })
    }

    /// Last value written to `location`.
    pub fn uniform_value(&self, location: UniformLocation) -> Option<&[f32]> {
        self.uniforms.get(&location).map(Vec::as_slice)
    }

    /// Current content of `buffer`.
    pub fn buffer_bytes(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    fn record(&mut self, call: GpuCall) {
        log::trace!("gpu: {call:?}");
        self.calls.push(call);
    }

    fn write_uniform(&mut self, location: UniformLocation, value: &[f32]) {
        if self.current_program != Some(location.program) {
            log::warn!(
                "uniform written to program {:?} while {:?} is in use",
                location.program,
                self.current_program
            );
        }
        self.uniforms.insert(location, value.to_vec());
    }
}

impl GpuApi for HeadlessGpu {
    type Canvas = HeadlessCanvas;

    fn canvas(&self) -> &HeadlessCanvas {
        &self.canvas
    }

    fn canvas_mut(&mut self) -> &mut HeadlessCanvas {
        &mut self.canvas
    }

    fn create_shader(&mut self, kind: ShaderKind) -> ShaderId {
        let shader = self.objects.create_shader(kind);
        self.record(GpuCall::CreateShader { shader, kind });
        shader
    }

    fn compile_shader(&mut self, shader: ShaderId, source: &str) {
        let ok = self.objects.compile_shader(shader, source);
        self.record(GpuCall::CompileShader { shader, ok });
    }

    fn shader_compiled(&self, shader: ShaderId) -> bool {
        self.objects.shader_compiled(shader)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.objects.shader_info_log(shader)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.objects.delete_shader(shader);
        self.record(GpuCall::DeleteShader { shader });
    }

    fn create_program(&mut self) -> ProgramId {
        let program = self.objects.create_program();
        self.record(GpuCall::CreateProgram { program });
        program
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        self.objects.attach_shader(program, shader);
        self.record(GpuCall::AttachShader { program, shader });
    }

    fn link_program(&mut self, program: ProgramId) {
        let ok = self.objects.link_program(program);
        self.record(GpuCall::LinkProgram { program, ok });
    }

    fn program_linked(&self, program: ProgramId) -> bool {
        self.objects.linked(program).is_some()
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.objects.program_info_log(program)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.objects.delete_program(program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.record(GpuCall::DeleteProgram { program });
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
        self.record(GpuCall::UseProgram { program });
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.objects.attrib_location(program, name)
    }

    fn attrib_scalar(&self, program: ProgramId, name: &str) -> Option<ScalarClass> {
        self.objects.attrib_scalar(program, name)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.objects.uniform_location(program, name)
    }

    fn uniform_declared(&self, program: ProgramId, name: &str) -> bool {
        self.objects.uniform_declared(program, name)
    }

    fn uniform2f(&mut self, location: UniformLocation, value: [f32; 2]) {
        self.write_uniform(location, &value);
        self.record(GpuCall::Uniform2f { location, value });
    }

    fn uniform4f(&mut self, location: UniformLocation, value: [f32; 4]) {
        self.write_uniform(location, &value);
        self.record(GpuCall::Uniform4f { location, value });
    }

    fn create_buffer(&mut self) -> BufferId {
        let buffer = self.objects.create_buffer();
        self.buffers.insert(buffer, Vec::new());
        self.record(GpuCall::CreateBuffer { buffer });
        buffer
    }

    fn buffer_data(&mut self, buffer: BufferId, bytes: &[u8], usage: BufferUsage) {
        if self.objects.set_buffer_len(buffer, bytes.len()) {
            self.buffers.insert(buffer, bytes.to_vec());
        }
        self.record(GpuCall::BufferData { buffer, len: bytes.len(), usage });
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        let vao = self.objects.create_vertex_array();
        self.record(GpuCall::CreateVertexArray { vao });
        vao
    }

    fn bind_vertex_array(&mut self, vao: VertexArrayId) {
        self.current_vao = Some(vao);
        self.record(GpuCall::BindVertexArray { vao });
    }

    fn enable_vertex_attrib(&mut self, vao: VertexArrayId, location: u32) {
        self.objects.enable_vertex_attrib(vao, location);
        self.record(GpuCall::EnableVertexAttrib { vao, location });
    }

    fn vertex_attrib_pointer(
        &mut self,
        vao: VertexArrayId,
        location: u32,
        buffer: BufferId,
        pointer: AttribPointer,
    ) {
        self.objects.vertex_attrib_pointer(vao, location, buffer, pointer);
        self.record(GpuCall::VertexAttribPointer { vao, location, buffer, pointer });
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.record(GpuCall::Viewport { x, y, width, height });
    }

    fn clear_color(&mut self, color: ColorRgba) {
        self.record(GpuCall::ClearColor { color });
    }

    fn clear(&mut self, mask: ClearMask) {
        self.record(GpuCall::Clear { mask });
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        if self.current_program.is_none() {
            log::warn!("draw_arrays with no program in use");
        }
        if self.current_vao.is_none() {
            log::warn!("draw_arrays with no vertex array bound");
        }
        self.record(GpuCall::DrawArrays { primitive, first, count });
    }

    fn present(&mut self) {
        self.record(GpuCall::Present);
    }
}
