//! Shader stage sources and their reflection.
//!
//! Sources are WGSL. A stage is "compiled" by parsing and validating it with
//! naga and recording its interface (vertex inputs, inter-stage locations and
//! group-0 uniforms); a program is "linked" by checking two stage interfaces
//! against each other.

mod reflect;

pub use reflect::{InterfaceVar, ProgramReflection, StageReflection, UniformDecl};
pub(crate) use reflect::{link_stages, reflect_stage};

use crate::gpu::ShaderKind;

/// Immutable shader source for one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStage {
    kind: ShaderKind,
    source: String,
}

impl ShaderStage {
    pub fn new(kind: ShaderKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn vertex(source: impl Into<String>) -> Self {
        Self::new(ShaderKind::Vertex, source)
    }

    pub fn fragment(source: impl Into<String>) -> Self {
        Self::new(ShaderKind::Fragment, source)
    }

    #[inline]
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }
}
