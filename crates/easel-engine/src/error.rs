//! Error taxonomy of the rendering core.
//!
//! Construction-phase errors (`ProgramError`, `LayoutError`,
//! `SetupError::MissingCapability`) abort initialization. Unresolved input
//! names are not errors at all: they are logged and skipped.

use thiserror::Error;

use crate::gpu::{NumericType, ScalarClass, ShaderKind, UniformKind};

/// Failure to turn two shader sources into a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderKind, log: String },

    #[error("program failed to link:\n{log}")]
    Link { log: String },
}

impl ProgramError {
    /// Compiler or linker diagnostic text.
    pub fn log(&self) -> &str {
        match self {
            ProgramError::Compile { log, .. } | ProgramError::Link { log } => log,
        }
    }
}

/// Invalid attribute slot or unusable vertex layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("attribute `{name}`: {components} × {numeric_type} has no vertex format")]
    UnsupportedFormat {
        name: String,
        components: u8,
        numeric_type: NumericType,
    },

    #[error("attribute `{name}`: stride {stride} is smaller than one value ({size} bytes)")]
    StrideTooSmall { name: String, stride: u32, size: u32 },

    #[error("attribute `{name}`: stride {stride} / offset {offset} are not 4-byte aligned")]
    Misaligned { name: String, stride: u32, offset: u32 },

    #[error("attribute `{name}` reads {expected} but the buffer holds {actual}")]
    TypeMismatch {
        name: String,
        expected: NumericType,
        actual: NumericType,
    },

    #[error("attribute `{name}` decodes to {decoded} values but the shader input is {declared}")]
    InputTypeMismatch {
        name: String,
        decoded: ScalarClass,
        declared: ScalarClass,
    },

    #[error("position input `{name}` is not an input of the program")]
    MissingPosition { name: String },
}

/// Caller contract violation when setting a uniform. Rejected values never
/// reach the GPU.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniformError {
    #[error("{kind} takes {} components, got {got}", .kind.components())]
    Arity { kind: UniformKind, got: usize },

    #[error("uniform `{name}` is a {expected}, got a {actual}")]
    KindMismatch {
        name: String,
        expected: UniformKind,
        actual: UniformKind,
    },

    #[error("uniform `{name}` is declared with a type that cannot hold a {expected}")]
    Unsupported { name: String, expected: UniformKind },

    #[error("uniform `{name}` belongs to a program that is not active")]
    InactiveProgram { name: String },
}

/// Anything that prevents a scene from being set up.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("GPU capability unavailable: {0}")]
    MissingCapability(String),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Uniform(#[from] UniformError),
}
