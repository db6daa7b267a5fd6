//! Programs and vertex arrays as wgpu pipeline state.

use std::rc::Rc;

use crate::gpu::{AttribPointer, BufferId, NumericType, Primitive, ScalarClass};
use crate::shader::ProgramReflection;

/// wgpu vertex format that decodes `pointer`, if there is one.
///
/// Non-normalized `u8` stays integer (`Uint8xN`); wgpu has no scaled formats.
pub(crate) fn vertex_format(pointer: &AttribPointer) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;

    Some(match (pointer.numeric_type, pointer.components, pointer.normalize) {
        (NumericType::Float32, 2, _) => F::Float32x2,
        (NumericType::Float32, 3, _) => F::Float32x3,
        (NumericType::Float32, 4, _) => F::Float32x4,
        (NumericType::Uint8, 2, true) => F::Unorm8x2,
        (NumericType::Uint8, 4, true) => F::Unorm8x4,
        (NumericType::Uint8, 2, false) => F::Uint8x2,
        (NumericType::Uint8, 4, false) => F::Uint8x4,
        _ => return None,
    })
}

pub(crate) fn topology(primitive: Primitive) -> wgpu::PrimitiveTopology {
    match primitive {
        Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
        Primitive::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        Primitive::Lines => wgpu::PrimitiveTopology::LineList,
    }
}

/// One vertex-buffer slot of a pipeline: a buffer range read with one stride
/// by one or more attributes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VertexBufferPlan {
    pub buffer: BufferId,
    /// Byte offset the slot's range starts at.
    pub base_offset: u64,
    pub stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexBufferPlan {
    /// Whole vertices readable from a buffer holding `buffer_len` bytes.
    pub fn vertex_capacity(&self, buffer_len: u64) -> u64 {
        let end = self
            .attributes
            .iter()
            .map(|a| a.offset + a.format.size())
            .max()
            .unwrap_or(0);

        match buffer_len.checked_sub(self.base_offset + end) {
            Some(rest) => rest / self.stride + 1,
            None => 0,
        }
    }

    pub fn layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// Groups attribute pointers into vertex-buffer slots.
///
/// Attributes sharing a buffer, stride and base offset become one
/// interleaved slot. An offset larger than the stride moves the slot's range
/// start instead.
pub(crate) fn plan_vertex_buffers(
    attributes: impl IntoIterator<Item = (u32, BufferId, AttribPointer)>,
) -> Result<Vec<VertexBufferPlan>, String> {
    let mut plans: Vec<VertexBufferPlan> = Vec::new();

    for (location, buffer, pointer) in attributes {
        let format = vertex_format(&pointer).ok_or_else(|| {
            format!(
                "location {location}: {} × {} has no vertex format",
                pointer.components, pointer.numeric_type
            )
        })?;

        let stride = u64::from(pointer.effective_stride());
        let offset = u64::from(pointer.offset);
        let relative = offset % stride;
        if relative + format.size() > stride {
            return Err(format!(
                "location {location}: attribute at offset {offset} straddles the {stride}-byte stride"
            ));
        }
        let base_offset = offset - relative;

        let attribute = wgpu::VertexAttribute {
            format,
            offset: relative,
            shader_location: location,
        };

        match plans
            .iter_mut()
            .find(|p| p.buffer == buffer && p.stride == stride && p.base_offset == base_offset)
        {
            Some(plan) => plan.attributes.push(attribute),
            None => plans.push(VertexBufferPlan {
                buffer,
                base_offset,
                stride,
                attributes: vec![attribute],
            }),
        }
    }

    Ok(plans)
}

/// GPU-side state of a linked program: shader modules, one uniform buffer per
/// declared uniform and the bind group exposing them at group 0.
pub(crate) struct LinkedProgram {
    vertex: Rc<wgpu::ShaderModule>,
    fragment: Rc<wgpu::ShaderModule>,
    vertex_entry: String,
    fragment_entry: String,
    inputs: Vec<(u32, ScalarClass)>,
    uniforms: Vec<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
    layout: wgpu::PipelineLayout,
}

impl LinkedProgram {
    /// Creates the uniform buffers, bind group and pipeline layout for `reflection`.
    pub fn new(
        device: &wgpu::Device,
        vertex: Rc<wgpu::ShaderModule>,
        fragment: Rc<wgpu::ShaderModule>,
        reflection: &ProgramReflection,
    ) -> Self {
        let uniforms: Vec<wgpu::Buffer> = reflection
            .uniforms
            .iter()
            .map(|u| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(u.name.as_str()),
                    size: uniform_buffer_size(u.size),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let entries: Vec<wgpu::BindGroupLayoutEntry> = reflection
            .uniforms
            .iter()
            .map(|u| wgpu::BindGroupLayoutEntry {
                binding: u.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("easel uniforms bgl"),
            entries: &entries,
        });

        let bind_group = (!uniforms.is_empty()).then(|| {
            let entries: Vec<wgpu::BindGroupEntry> = reflection
                .uniforms
                .iter()
                .zip(&uniforms)
                .map(|(u, buffer)| wgpu::BindGroupEntry {
                    binding: u.binding,
                    resource: buffer.as_entire_binding(),
                })
                .collect();

            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("easel uniforms"),
                layout: &bind_group_layout,
                entries: &entries,
            })
        });

        let group0 = [&bind_group_layout];
        let bind_group_layouts: &[&wgpu::BindGroupLayout] = if bind_group.is_some() { &group0 } else { &[] };
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("easel pipeline layout"),
            bind_group_layouts,
            immediate_size: 0,
        });

        Self {
            vertex,
            fragment,
            vertex_entry: reflection.vertex_entry.clone(),
            fragment_entry: reflection.fragment_entry.clone(),
            inputs: reflection.attributes.iter().map(|a| (a.location, a.scalar)).collect(),
            uniforms,
            bind_group,
            layout,
        }
    }

    /// Checks that `active` feeds every vertex input with values of the
    /// scalar family the shader declares.
    pub fn check_inputs(&self, active: impl IntoIterator<Item = (u32, BufferId, AttribPointer)>) -> Result<(), String> {
        check_inputs(&self.inputs, active)
    }

    /// Group 0, or `None` when the program declares no uniforms.
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    /// Queues `bytes` for the uniform buffer at `index` (binding order).
    pub fn write_uniform(&self, queue: &wgpu::Queue, index: u32, bytes: &[u8]) {
        match self.uniforms.get(index as usize) {
            Some(buffer) => queue.write_buffer(buffer, 0, bytes),
            None => log::warn!("uniform index {index} out of range"),
        }
    }

    /// Render pipeline drawing `plans` with this program's stages into a
    /// `format` target. Blending replaces the target.
    pub fn build_pipeline(
        &self,
        device: &wgpu::Device,
        plans: &[VertexBufferPlan],
        primitive: Primitive,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = plans.iter().map(VertexBufferPlan::layout).collect();

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("easel pipeline"),
            layout: Some(&self.layout),

            vertex: wgpu::VertexState {
                module: &self.vertex,
                entry_point: Some(self.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.fragment,
                entry_point: Some(self.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: topology(primitive),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

fn check_inputs(
    inputs: &[(u32, ScalarClass)],
    active: impl IntoIterator<Item = (u32, BufferId, AttribPointer)>,
) -> Result<(), String> {
    let active: Vec<_> = active.into_iter().collect();
    for &(location, declared) in inputs {
        let Some((_, _, pointer)) = active.iter().find(|(loc, _, _)| *loc == location) else {
            return Err(format!("vertex input at location {location} has no enabled attribute"));
        };
        let decoded = pointer.decoded_scalar();
        if decoded != declared {
            return Err(format!(
                "vertex input at location {location} is {declared} but its attribute decodes to {decoded}"
            ));
        }
    }
    Ok(())
}

/// Uniform buffers are sized up to a 16-byte multiple.
fn uniform_buffer_size(declared: u32) -> u64 {
    u64::from(declared.max(16)).next_multiple_of(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptr(components: u8, numeric_type: NumericType, normalize: bool, stride: u32, offset: u32) -> AttribPointer {
        AttribPointer { components, numeric_type, normalize, stride, offset }
    }

    #[test]
    fn formats_follow_type_and_normalization() {
        assert_eq!(vertex_format(&ptr(2, NumericType::Float32, false, 0, 0)), Some(wgpu::VertexFormat::Float32x2));
        assert_eq!(vertex_format(&ptr(4, NumericType::Uint8, true, 0, 0)), Some(wgpu::VertexFormat::Unorm8x4));
        assert_eq!(vertex_format(&ptr(4, NumericType::Uint8, false, 0, 0)), Some(wgpu::VertexFormat::Uint8x4));
        assert_eq!(vertex_format(&ptr(3, NumericType::Uint8, true, 0, 0)), None);
        assert_eq!(vertex_format(&ptr(1, NumericType::Float32, false, 0, 0)), None);
    }

    #[test]
    fn separate_buffers_get_separate_slots() {
        let plans = plan_vertex_buffers([
            (0, BufferId(1), ptr(2, NumericType::Float32, false, 0, 0)),
            (1, BufferId(2), ptr(4, NumericType::Uint8, true, 0, 0)),
        ])
        .unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].stride, 8);
        assert_eq!(plans[1].stride, 4);
        assert_eq!(plans[1].attributes[0].shader_location, 1);
    }

    #[test]
    fn interleaved_attributes_share_a_slot() {
        let plans = plan_vertex_buffers([
            (0, BufferId(1), ptr(2, NumericType::Float32, false, 24, 0)),
            (1, BufferId(1), ptr(4, NumericType::Float32, false, 24, 8)),
        ])
        .unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].attributes[1].offset, 8);
        assert_eq!(plans[0].vertex_capacity(48), 2);
        assert_eq!(plans[0].vertex_capacity(47), 1);
    }

    #[test]
    fn offset_past_stride_moves_the_range_start() {
        let plans = plan_vertex_buffers([(0, BufferId(1), ptr(2, NumericType::Float32, false, 0, 16))]).unwrap();

        assert_eq!(plans[0].base_offset, 16);
        assert_eq!(plans[0].attributes[0].offset, 0);
        assert_eq!(plans[0].vertex_capacity(48), 4);
        assert_eq!(plans[0].vertex_capacity(16), 0);
    }

    #[test]
    fn straddling_attribute_is_rejected() {
        assert!(plan_vertex_buffers([(0, BufferId(1), ptr(2, NumericType::Float32, false, 12, 8))]).is_err());
    }

    #[test]
    fn uniform_buffers_round_up() {
        assert_eq!(uniform_buffer_size(8), 16);
        assert_eq!(uniform_buffer_size(16), 16);
        assert_eq!(uniform_buffer_size(20), 32);
    }

    #[test]
    fn inputs_need_a_matching_scalar_family() {
        let inputs = [(0, ScalarClass::Float), (1, ScalarClass::Float)];
        let buffer = BufferId(1);
        let position = (0, buffer, ptr(2, NumericType::Float32, false, 0, 0));

        let unorm = (1, buffer, ptr(4, NumericType::Uint8, true, 0, 0));
        assert_eq!(check_inputs(&inputs, [position, unorm]), Ok(()));

        let raw = (1, buffer, ptr(4, NumericType::Uint8, false, 0, 0));
        let err = check_inputs(&inputs, [position, raw]).unwrap_err();
        assert!(err.contains("location 1"), "{err}");

        let err = check_inputs(&inputs, [position]).unwrap_err();
        assert!(err.contains("no enabled attribute"), "{err}");
    }
}
