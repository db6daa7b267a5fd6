//! Named uniform resolution and type-checked writes.

use std::collections::HashMap;

use crate::coords::{ColorRgba, Vec2};
use crate::error::UniformError;
use crate::gpu::{GpuApi, ProgramId, UniformKind, UniformLocation};
use crate::program::{ActiveProgram, Program};

/// A uniform value of one of the supported shapes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Vec2([f32; 2]),
    Vec4([f32; 4]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec4(_) => UniformKind::Vec4,
        }
    }

    /// Builds a value of `kind` from loose components, rejecting the wrong arity.
    pub fn from_slice(kind: UniformKind, values: &[f32]) -> Result<Self, UniformError> {
        let arity = UniformError::Arity { kind, got: values.len() };
        match kind {
            UniformKind::Vec2 => values.try_into().map(UniformValue::Vec2).map_err(|_| arity),
            UniformKind::Vec4 => values.try_into().map(UniformValue::Vec4).map_err(|_| arity),
        }
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v.to_array())
    }
}

impl From<ColorRgba> for UniformValue {
    fn from(c: ColorRgba) -> Self {
        UniformValue::Vec4(c.to_array())
    }
}

/// A resolved uniform of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformHandle {
    name: String,
    location: UniformLocation,
}

impl UniformHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> UniformLocation {
        self.location
    }

    pub fn kind(&self) -> UniformKind {
        self.location.kind
    }
}

/// Resolves uniform names once per program and pushes values through the
/// active program.
///
/// Misses are cached too, so a name the program does not declare is warned
/// about once and silently skipped afterwards.
#[derive(Debug, Default)]
pub struct UniformBinder {
    resolved: HashMap<(ProgramId, String), Option<UniformHandle>>,
}

impl UniformBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<G: GpuApi>(&mut self, gpu: &G, program: &Program, name: &str) -> Option<UniformHandle> {
        self.resolve_in(gpu, program.id(), name)
    }

    fn resolve_in<G: GpuApi>(&mut self, gpu: &G, program: ProgramId, name: &str) -> Option<UniformHandle> {
        let key = (program, name.to_string());
        if let Some(cached) = self.resolved.get(&key) {
            return cached.clone();
        }

        let handle = gpu
            .uniform_location(program, name)
            .map(|location| UniformHandle { name: name.to_string(), location });
        if handle.is_none() {
            if gpu.uniform_declared(program, name) {
                log::warn!("uniform `{name}` of {program:?} is not a vec2 or vec4; writes will be skipped");
            } else {
                log::warn!("uniform `{name}` is not declared by {program:?}; writes will be skipped");
            }
        }

        self.resolved.insert(key, handle.clone());
        handle
    }

    /// Resolves `name` against the active program and writes `value` to it.
    pub fn push<G: GpuApi>(
        &mut self,
        pass: &mut ActiveProgram<'_, G>,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<(), UniformError> {
        let handle = self.resolve_in(pass.gpu(), pass.program(), name);
        pass.set_uniform(handle.as_ref(), value.into())
    }
}

impl<G: GpuApi> ActiveProgram<'_, G> {
    /// Writes `value` to a resolved uniform of this program.
    ///
    /// An unresolved handle (`None`) is a no-op. Values of the wrong shape
    /// or aimed at another program are rejected before reaching the GPU.
    pub fn set_uniform(&mut self, handle: Option<&UniformHandle>, value: UniformValue) -> Result<(), UniformError> {
        let Some(handle) = handle else {
            return Ok(());
        };

        if handle.location.program != self.program {
            return Err(UniformError::InactiveProgram {
                name: handle.name.clone(),
            });
        }
        if handle.location.kind != value.kind() {
            return Err(UniformError::KindMismatch {
                name: handle.name.clone(),
                expected: handle.location.kind,
                actual: value.kind(),
            });
        }

        match value {
            UniformValue::Vec2(v) => self.gpu.uniform2f(handle.location, v),
            UniformValue::Vec4(v) => self.gpu.uniform4f(handle.location, v),
        }
        Ok(())
    }
}
