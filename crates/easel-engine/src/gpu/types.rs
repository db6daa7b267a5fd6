use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Opaque shader stage object.
    ShaderId
);
handle!(
    /// Opaque program object (linked or not).
    ProgramId
);
handle!(
    /// Opaque GPU buffer object.
    BufferId
);
handle!(
    /// Opaque vertex-array (attribute decode state) object.
    VertexArrayId
);

/// Pipeline stage a shader source is compiled for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
        })
    }
}

/// Element type of a vertex attribute in buffer memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NumericType {
    Float32,
    Uint8,
}

impl NumericType {
    #[inline]
    pub const fn size_bytes(self) -> u32 {
        match self {
            NumericType::Float32 => 4,
            NumericType::Uint8 => 1,
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumericType::Float32 => "float32",
            NumericType::Uint8 => "uint8",
        })
    }
}

/// Scalar family of a shader input, or of the values an attribute decodes to.
///
/// Normalized integers decode to floats.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarClass {
    Float,
    Uint,
    Sint,
    /// Anything a vertex fetch cannot produce.
    Other,
}

impl fmt::Display for ScalarClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarClass::Float => "float",
            ScalarClass::Uint => "unsigned integer",
            ScalarClass::Sint => "signed integer",
            ScalarClass::Other => "non-numeric",
        })
    }
}

/// Decode descriptor registered for one attribute location.
///
/// `stride == 0` means tightly packed (`components × element size`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttribPointer {
    pub components: u8,
    pub numeric_type: NumericType,
    pub normalize: bool,
    pub stride: u32,
    pub offset: u32,
}

impl AttribPointer {
    /// Bytes occupied by one attribute value.
    #[inline]
    pub const fn size_bytes(&self) -> u32 {
        self.components as u32 * self.numeric_type.size_bytes()
    }

    /// Distance between consecutive vertices, resolving `stride == 0`.
    #[inline]
    pub const fn effective_stride(&self) -> u32 {
        if self.stride == 0 { self.size_bytes() } else { self.stride }
    }

    /// What the shader receives for this attribute.
    #[inline]
    pub const fn decoded_scalar(&self) -> ScalarClass {
        match (self.numeric_type, self.normalize) {
            (NumericType::Float32, _) | (NumericType::Uint8, true) => ScalarClass::Float,
            (NumericType::Uint8, false) => ScalarClass::Uint,
        }
    }
}

/// Buffer usage hint. Geometry here is uploaded once and drawn many times.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    #[default]
    Static,
}

/// Primitive topology for `draw_arrays`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Primitive {
    #[default]
    Triangles,
    TriangleStrip,
    Lines,
}

/// Which attachments `clear` resets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: ClearMask = ClearMask { color: true, depth: false };
    pub const COLOR_DEPTH: ClearMask = ClearMask { color: true, depth: true };
}

/// Shape of a uniform value the binder can drive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Vec2,
    Vec4,
}

impl UniformKind {
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            UniformKind::Vec2 => 2,
            UniformKind::Vec4 => 4,
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UniformKind::Vec2 => "vec2",
            UniformKind::Vec4 => "vec4",
        })
    }
}

/// Resolved uniform slot of one linked program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    pub program: ProgramId,
    pub index: u32,
    pub kind: UniformKind,
}
