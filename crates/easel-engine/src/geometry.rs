//! Vertex data uploaded to GPU buffers.

use crate::gpu::{BufferId, BufferUsage, GpuApi, NumericType};

/// Element types a [`GeometryBuffer`] can hold.
pub trait Component: bytemuck::Pod {
    const NUMERIC_TYPE: NumericType;
}

impl Component for f32 {
    const NUMERIC_TYPE: NumericType = NumericType::Float32;
}

impl Component for u8 {
    const NUMERIC_TYPE: NumericType = NumericType::Uint8;
}

/// A GPU buffer of tightly packed vertex components.
///
/// The buffer owns its element type and the number of components per vertex;
/// how those bytes are decoded is decided later by an
/// [`AttributeSlot`](crate::layout::AttributeSlot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryBuffer {
    id: BufferId,
    numeric_type: NumericType,
    components_per_vertex: u8,
    len: usize,
}

impl GeometryBuffer {
    /// Allocates an empty buffer object.
    pub fn new<G: GpuApi>(gpu: &mut G, numeric_type: NumericType, components_per_vertex: u8) -> Self {
        Self {
            id: gpu.create_buffer(),
            numeric_type,
            components_per_vertex,
            len: 0,
        }
    }

    /// Allocates a buffer and uploads `data` into it.
    pub fn with_data<T: Component, G: GpuApi>(
        gpu: &mut G,
        components_per_vertex: u8,
        data: &[T],
    ) -> Self {
        let mut buffer = Self::new(gpu, T::NUMERIC_TYPE, components_per_vertex);
        buffer.upload(gpu, data);
        buffer
    }

    /// Replaces the buffer contents with `data`.
    ///
    /// `data` must be non-empty and hold a whole number of vertices.
    pub fn upload<T: Component, G: GpuApi>(&mut self, gpu: &mut G, data: &[T]) {
        debug_assert_eq!(T::NUMERIC_TYPE, self.numeric_type, "component type does not match buffer");
        debug_assert!(!data.is_empty(), "uploading empty vertex data");
        debug_assert!(
            data.len() % usize::from(self.components_per_vertex) == 0,
            "{} components is not a multiple of {} per vertex",
            data.len(),
            self.components_per_vertex
        );

        gpu.buffer_data(self.id, bytemuck::cast_slice(data), BufferUsage::Static);
        self.len = data.len();
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[inline]
    pub fn numeric_type(&self) -> NumericType {
        self.numeric_type
    }

    #[inline]
    pub fn components_per_vertex(&self) -> u8 {
        self.components_per_vertex
    }

    /// Number of components uploaded.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.len * self.numeric_type.size_bytes() as usize
    }

    /// Whole vertices held, assuming tightly packed data.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.len / usize::from(self.components_per_vertex.max(1))
    }
}
