//! Attribute slots and the vertex layouts built from them.

use crate::error::LayoutError;
use crate::geometry::GeometryBuffer;
use crate::gpu::{AttribPointer, BufferId, GpuApi, NumericType, ProgramId, VertexArrayId};
use crate::program::Program;

/// How one named vertex-shader input reads its buffer.
///
/// `stride_bytes == 0` means tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    pub name: String,
    pub component_count: u8,
    pub numeric_type: NumericType,
    pub normalize: bool,
    pub stride_bytes: u32,
    pub offset_bytes: u32,
}

impl AttributeSlot {
    pub fn new(name: impl Into<String>, component_count: u8, numeric_type: NumericType) -> Self {
        Self {
            name: name.into(),
            component_count,
            numeric_type,
            normalize: false,
            stride_bytes: 0,
            offset_bytes: 0,
        }
    }

    /// Unnormalized `f32` components.
    pub fn float32(name: impl Into<String>, component_count: u8) -> Self {
        Self::new(name, component_count, NumericType::Float32)
    }

    /// `u8` components mapped to `[0, 1]`.
    pub fn unorm8(name: impl Into<String>, component_count: u8) -> Self {
        Self::new(name, component_count, NumericType::Uint8).normalized(true)
    }

    pub fn normalized(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_stride(mut self, stride_bytes: u32) -> Self {
        self.stride_bytes = stride_bytes;
        self
    }

    pub fn with_offset(mut self, offset_bytes: u32) -> Self {
        self.offset_bytes = offset_bytes;
        self
    }

    pub fn pointer(&self) -> AttribPointer {
        AttribPointer {
            components: self.component_count,
            numeric_type: self.numeric_type,
            normalize: self.normalize,
            stride: self.stride_bytes,
            offset: self.offset_bytes,
        }
    }

    /// Checks that the slot describes a decodable vertex format.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let supported = matches!(
            (self.numeric_type, self.component_count),
            (NumericType::Float32, 2..=4) | (NumericType::Uint8, 2 | 4)
        );
        if !supported {
            return Err(LayoutError::UnsupportedFormat {
                name: self.name.clone(),
                components: self.component_count,
                numeric_type: self.numeric_type,
            });
        }

        let pointer = self.pointer();
        let size = pointer.size_bytes();
        if self.stride_bytes != 0 && self.stride_bytes < size {
            return Err(LayoutError::StrideTooSmall {
                name: self.name.clone(),
                stride: self.stride_bytes,
                size,
            });
        }

        if pointer.effective_stride() % 4 != 0 || self.offset_bytes % size.min(4) != 0 {
            return Err(LayoutError::Misaligned {
                name: self.name.clone(),
                stride: self.stride_bytes,
                offset: self.offset_bytes,
            });
        }

        Ok(())
    }
}

/// Number of whole vertices `pointer` can read from `byte_len` bytes.
pub fn vertex_count_for(byte_len: usize, pointer: &AttribPointer) -> u32 {
    let size = pointer.size_bytes() as usize;
    let stride = pointer.effective_stride() as usize;
    let offset = pointer.offset as usize;

    if stride == 0 || byte_len < offset + size {
        return 0;
    }
    ((byte_len - offset - size) / stride + 1) as u32
}

/// Builder pairing attribute slots with the buffers they read.
///
/// The first pair is the position input; it must resolve against the
/// program. Every other input is optional.
#[derive(Debug)]
pub struct VertexLayout<'b> {
    position: (AttributeSlot, &'b GeometryBuffer),
    attributes: Vec<(AttributeSlot, &'b GeometryBuffer)>,
}

impl<'b> VertexLayout<'b> {
    pub fn new(position: AttributeSlot, buffer: &'b GeometryBuffer) -> Self {
        Self {
            position: (position, buffer),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, slot: AttributeSlot, buffer: &'b GeometryBuffer) -> Self {
        self.attributes.push((slot, buffer));
        self
    }

    /// Resolves every slot against `program` and records the decode state
    /// into a fresh vertex array.
    ///
    /// Every slot is validated and resolved before any GPU object is created.
    pub fn bind<G: GpuApi>(self, gpu: &mut G, program: &Program) -> Result<VertexLayoutState, LayoutError> {
        for (slot, buffer) in std::iter::once(&self.position).chain(&self.attributes) {
            slot.validate()?;
            if slot.numeric_type != buffer.numeric_type() {
                return Err(LayoutError::TypeMismatch {
                    name: slot.name.clone(),
                    expected: slot.numeric_type,
                    actual: buffer.numeric_type(),
                });
            }
            check_packing(slot, buffer);
        }

        let (position, position_buffer) = &self.position;
        let position_location = resolve(gpu, program, position)?.ok_or_else(|| LayoutError::MissingPosition {
            name: position.name.clone(),
        })?;

        let mut resolved = Vec::with_capacity(self.attributes.len());
        for (slot, buffer) in &self.attributes {
            resolved.push((resolve(gpu, program, slot)?, slot, *buffer));
        }

        let vao = gpu.create_vertex_array();
        let mut bound = vec![BoundAttribute {
            name: position.name.clone(),
            location: position_location,
            buffer: position_buffer.id(),
        }];
        enable(gpu, vao, position_location, position, position_buffer);

        let position_pointer = position.pointer();
        let vertices = vertex_count_for(position_buffer.byte_len(), &position_pointer);
        let mut skipped = Vec::new();

        for (location, slot, buffer) in resolved {
            let Some(location) = location else {
                log::warn!("attribute `{}` is not an input of {:?}; skipped", slot.name, program.id());
                skipped.push(slot.name.clone());
                continue;
            };

            let available = vertex_count_for(buffer.byte_len(), &slot.pointer());
            if available < vertices {
                log::warn!(
                    "attribute `{}` covers {available} vertices but position covers {vertices}",
                    slot.name
                );
            }

            enable(gpu, vao, location, slot, buffer);
            bound.push(BoundAttribute {
                name: slot.name.clone(),
                location,
                buffer: buffer.id(),
            });
        }

        log::debug!("vertex layout {vao:?} for {:?}: {} bound, {} skipped", program.id(), bound.len(), skipped.len());

        Ok(VertexLayoutState {
            vao,
            program: program.id(),
            position_buffer: position_buffer.id(),
            position_pointer,
            bound,
            skipped,
        })
    }
}

/// Location of `slot` in `program`, checking that the shader input takes the
/// scalar family the slot decodes to.
fn resolve<G: GpuApi>(gpu: &G, program: &Program, slot: &AttributeSlot) -> Result<Option<u32>, LayoutError> {
    let Some(location) = gpu.attrib_location(program.id(), &slot.name) else {
        return Ok(None);
    };

    let decoded = slot.pointer().decoded_scalar();
    match gpu.attrib_scalar(program.id(), &slot.name) {
        Some(declared) if declared != decoded => Err(LayoutError::InputTypeMismatch {
            name: slot.name.clone(),
            decoded,
            declared,
        }),
        _ => Ok(Some(location)),
    }
}

/// Tightly packed data must hold whole values of the slot reading it.
fn check_packing(slot: &AttributeSlot, buffer: &GeometryBuffer) {
    if slot.stride_bytes != 0 || slot.offset_bytes != 0 {
        return;
    }
    debug_assert!(
        buffer.len() % usize::from(slot.component_count) == 0,
        "attribute `{}`: {} components is not a multiple of {}",
        slot.name,
        buffer.len(),
        slot.component_count
    );
    if slot.component_count != buffer.components_per_vertex() {
        log::warn!(
            "attribute `{}` reads {} components per vertex from a buffer of {}",
            slot.name,
            slot.component_count,
            buffer.components_per_vertex()
        );
    }
}

fn enable<G: GpuApi>(gpu: &mut G, vao: VertexArrayId, location: u32, slot: &AttributeSlot, buffer: &GeometryBuffer) {
    gpu.enable_vertex_attrib(vao, location);
    gpu.vertex_attrib_pointer(vao, location, buffer.id(), slot.pointer());
}

/// An attribute that resolved to a program input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAttribute {
    pub name: String,
    pub location: u32,
    pub buffer: BufferId,
}

/// Recorded vertex decode state for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayoutState {
    vao: VertexArrayId,
    program: ProgramId,
    position_buffer: BufferId,
    position_pointer: AttribPointer,
    bound: Vec<BoundAttribute>,
    skipped: Vec<String>,
}

impl VertexLayoutState {
    #[inline]
    pub fn vao(&self) -> VertexArrayId {
        self.vao
    }

    #[inline]
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Attributes wired to program inputs, position first.
    pub fn bound(&self) -> &[BoundAttribute] {
        &self.bound
    }

    /// Names of attributes the program does not declare.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Vertices drawable from the current contents of `position`.
    pub fn vertex_count(&self, position: &GeometryBuffer) -> u32 {
        debug_assert_eq!(position.id(), self.position_buffer, "not this layout's position buffer");
        vertex_count_for(position.byte_len(), &self.position_pointer)
    }
}
