//! Backend-independent object bookkeeping.
//!
//! Both backends keep shader/program/vertex-array state here and layer their
//! own resources (or call logs) on top.

use std::collections::{BTreeMap, HashMap};

use crate::shader::{ProgramReflection, StageReflection, link_stages, reflect_stage};

use super::{AttribPointer, BufferId, ProgramId, ScalarClass, ShaderId, ShaderKind, UniformLocation, VertexArrayId};

pub(crate) struct ShaderObject {
    pub kind: ShaderKind,
    pub compiled: Option<StageReflection>,
    pub log: String,
}

pub(crate) struct ProgramObject {
    pub attached: Vec<ShaderId>,
    pub linked: Option<ProgramReflection>,
    pub log: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub(crate) struct AttributeState {
    pub enabled: bool,
    pub source: Option<(BufferId, AttribPointer)>,
}

#[derive(Default)]
pub(crate) struct VertexArrayObject {
    pub attributes: BTreeMap<u32, AttributeState>,
}

impl VertexArrayObject {
    /// Enabled attributes with a registered source, ordered by location.
    pub fn active_attributes(&self) -> impl Iterator<Item = (u32, BufferId, AttribPointer)> + '_ {
        self.attributes.iter().filter_map(|(&loc, a)| match a.source {
            Some((buffer, ptr)) if a.enabled => Some((loc, buffer, ptr)),
            _ => None,
        })
    }
}

#[derive(Default)]
pub(crate) struct ObjectTable {
    next_id: u32,
    shaders: HashMap<ShaderId, ShaderObject>,
    programs: HashMap<ProgramId, ProgramObject>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayObject>,
    buffers: HashMap<BufferId, usize>,
}

impl ObjectTable {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    // ── shaders ───────────────────────────────────────────────────────────

    pub fn create_shader(&mut self, kind: ShaderKind) -> ShaderId {
        let id = ShaderId(self.alloc());
        self.shaders.insert(
            id,
            ShaderObject {
                kind,
                compiled: None,
                log: String::new(),
            },
        );
        id
    }

    /// Compiles `source` into `shader`. Returns whether compilation succeeded.
    pub fn compile_shader(&mut self, shader: ShaderId, source: &str) -> bool {
        let Some(obj) = self.shaders.get_mut(&shader) else {
            log::warn!("compile_shader: unknown shader {shader:?}");
            return false;
        };

        match reflect_stage(obj.kind, source) {
            Ok(reflection) => {
                obj.compiled = Some(reflection);
                obj.log.clear();
                true
            }
            Err(log) => {
                obj.compiled = None;
                obj.log = log;
                false
            }
        }
    }

    pub fn shader(&self, shader: ShaderId) -> Option<&ShaderObject> {
        self.shaders.get(&shader)
    }

    pub fn shader_compiled(&self, shader: ShaderId) -> bool {
        self.shader(shader).is_some_and(|s| s.compiled.is_some())
    }

    pub fn shader_info_log(&self, shader: ShaderId) -> String {
        self.shader(shader).map(|s| s.log.clone()).unwrap_or_default()
    }

    pub fn delete_shader(&mut self, shader: ShaderId) -> bool {
        self.shaders.remove(&shader).is_some()
    }

    // ── programs ──────────────────────────────────────────────────────────

    pub fn create_program(&mut self) -> ProgramId {
        let id = ProgramId(self.alloc());
        self.programs.insert(
            id,
            ProgramObject {
                attached: Vec::new(),
                linked: None,
                log: String::new(),
            },
        );
        id
    }

    pub fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        match self.programs.get_mut(&program) {
            Some(p) if !p.attached.contains(&shader) => p.attached.push(shader),
            Some(_) => {}
            None => log::warn!("attach_shader: unknown program {program:?}"),
        }
    }

    /// Links the attached stages. Returns whether linking succeeded.
    pub fn link_program(&mut self, program: ProgramId) -> bool {
        let Some(p) = self.programs.get(&program) else {
            log::warn!("link_program: unknown program {program:?}");
            return false;
        };

        let result = self.stage_for(p, ShaderKind::Vertex).and_then(|vs| {
            let fs = self.stage_for(p, ShaderKind::Fragment)?;
            link_stages(vs, fs)
        });

        let Some(p) = self.programs.get_mut(&program) else { return false };
        match result {
            Ok(reflection) => {
                p.linked = Some(reflection);
                p.log.clear();
                true
            }
            Err(log) => {
                p.linked = None;
                p.log = log;
                false
            }
        }
    }

    fn stage_for(&self, program: &ProgramObject, kind: ShaderKind) -> Result<&StageReflection, String> {
        let mut attached = program
            .attached
            .iter()
            .filter_map(|id| self.shaders.get(id))
            .filter(|s| s.kind == kind);

        let shader = attached
            .next()
            .ok_or_else(|| format!("no {kind} shader attached"))?;
        if attached.next().is_some() {
            return Err(format!("more than one {kind} shader attached"));
        }
        shader
            .compiled
            .as_ref()
            .ok_or_else(|| format!("attached {kind} shader is not compiled"))
    }

    pub fn program(&self, program: ProgramId) -> Option<&ProgramObject> {
        self.programs.get(&program)
    }

    pub fn linked(&self, program: ProgramId) -> Option<&ProgramReflection> {
        self.program(program).and_then(|p| p.linked.as_ref())
    }

    /// `(vertex, fragment)` shaders a linked program was built from.
    pub fn linked_stages(&self, program: ProgramId) -> Option<(ShaderId, ShaderId)> {
        let p = self.programs.get(&program)?;
        p.linked.as_ref()?;

        let find = |kind: ShaderKind| {
            p.attached
                .iter()
                .copied()
                .find(|id| self.shaders.get(id).is_some_and(|s| s.kind == kind))
        };
        Some((find(ShaderKind::Vertex)?, find(ShaderKind::Fragment)?))
    }

    pub fn program_info_log(&self, program: ProgramId) -> String {
        self.program(program).map(|p| p.log.clone()).unwrap_or_default()
    }

    pub fn delete_program(&mut self, program: ProgramId) -> bool {
        self.programs.remove(&program).is_some()
    }

    pub fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.linked(program)?.attribute(name).map(|a| a.location)
    }

    pub fn attrib_scalar(&self, program: ProgramId, name: &str) -> Option<ScalarClass> {
        self.linked(program)?.attribute(name).map(|a| a.scalar)
    }

    pub fn uniform_declared(&self, program: ProgramId, name: &str) -> bool {
        self.linked(program).is_some_and(|p| p.uniform(name).is_some())
    }

    pub fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let (index, decl) = self.linked(program)?.uniform(name)?;
        let Some(kind) = decl.kind else {
            log::debug!("uniform `{name}` has a type that cannot be set as vec2/vec4");
            return None;
        };
        Some(UniformLocation { program, index, kind })
    }

    // ── buffers ───────────────────────────────────────────────────────────

    pub fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.alloc());
        self.buffers.insert(id, 0);
        id
    }

    /// Records the new byte length of `buffer`. Returns `false` for unknown buffers.
    pub fn set_buffer_len(&mut self, buffer: BufferId, len: usize) -> bool {
        match self.buffers.get_mut(&buffer) {
            Some(l) => {
                *l = len;
                true
            }
            None => {
                log::warn!("buffer_data: unknown buffer {buffer:?}");
                false
            }
        }
    }

    pub fn buffer_len(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.get(&buffer).copied()
    }

    // ── vertex arrays ─────────────────────────────────────────────────────

    pub fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId(self.alloc());
        self.vertex_arrays.insert(id, VertexArrayObject::default());
        id
    }

    pub fn vertex_array(&self, vao: VertexArrayId) -> Option<&VertexArrayObject> {
        self.vertex_arrays.get(&vao)
    }

    pub fn enable_vertex_attrib(&mut self, vao: VertexArrayId, location: u32) -> bool {
        let Some(v) = self.vertex_arrays.get_mut(&vao) else {
            log::warn!("enable_vertex_attrib: unknown vertex array {vao:?}");
            return false;
        };
        v.attributes.entry(location).or_default().enabled = true;
        true
    }

    pub fn vertex_attrib_pointer(
        &mut self,
        vao: VertexArrayId,
        location: u32,
        buffer: BufferId,
        pointer: AttribPointer,
    ) -> bool {
        if !self.buffers.contains_key(&buffer) {
            log::warn!("vertex_attrib_pointer: unknown buffer {buffer:?}");
            return false;
        }
        let Some(v) = self.vertex_arrays.get_mut(&vao) else {
            log::warn!("vertex_attrib_pointer: unknown vertex array {vao:?}");
            return false;
        };
        v.attributes.entry(location).or_default().source = Some((buffer, pointer));
        true
    }
}
