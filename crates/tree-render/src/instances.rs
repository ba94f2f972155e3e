use crate::mesh::{self, Vertex};
use glam::{Mat4, Vec4};
use tree_core::{InstanceTransform, LayerId};
use wgpu::util::DeviceExt;

/// GPU side of one instanced layer: a static mesh plus growable
/// transform and color buffers and a model-matrix uniform.
pub(crate) struct LayerBuffers {
    pub(crate) mesh: wgpu::Buffer,
    pub(crate) vertex_count: u32,
    pub(crate) transforms: wgpu::Buffer,
    pub(crate) colors: wgpu::Buffer,
    pub(crate) capacity: usize,
    pub(crate) count: u32,
    pub(crate) model: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

fn instance_buffer(device: &wgpu::Device, label: &str, bytes: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: bytes.max(16),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl LayerBuffers {
    pub(crate) fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, id: LayerId) -> Self {
        let (kind, radius) = mesh::mesh_for(id);
        let vertices = mesh::build(kind, radius);
        let mesh = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(id.name()),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let model = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("layer_model"),
            contents: bytemuck::cast_slice(&Mat4::IDENTITY.to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("layer_bg"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model.as_entire_binding(),
            }],
        });
        Self {
            mesh,
            vertex_count: vertices.len() as u32,
            transforms: instance_buffer(device, "layer_transforms", 0),
            colors: instance_buffer(device, "layer_colors", 0),
            capacity: 0,
            count: 0,
            model,
            bind_group,
        }
    }

    pub(crate) fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        model: Mat4,
        transforms: &[InstanceTransform],
        colors: Option<&[Vec4]>,
    ) {
        if transforms.len() > self.capacity {
            let capacity = transforms.len().next_power_of_two();
            self.transforms = instance_buffer(
                device,
                "layer_transforms",
                (capacity * std::mem::size_of::<InstanceTransform>()) as u64,
            );
            // a grown layer must resend colors; the core does so whenever the count changes
            self.colors = instance_buffer(
                device,
                "layer_colors",
                (capacity * std::mem::size_of::<Vec4>()) as u64,
            );
            self.capacity = capacity;
        }
        queue.write_buffer(&self.model, 0, bytemuck::cast_slice(&model.to_cols_array()));
        if !transforms.is_empty() {
            queue.write_buffer(&self.transforms, 0, bytemuck::cast_slice(transforms));
        }
        if let Some(colors) = colors {
            let n = colors.len().min(self.capacity);
            if n > 0 {
                queue.write_buffer(&self.colors, 0, bytemuck::cast_slice(&colors[..n]));
            }
        }
        self.count = transforms.len() as u32;
    }
}

pub(crate) const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
pub(crate) const TRANSFORM_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![3 => Float32x3, 4 => Float32, 5 => Float32x4];
pub(crate) const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![6 => Float32x4];

pub(crate) fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
    [
        // slot 0: mesh
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRS,
        },
        // slot 1: per-instance transform
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceTransform>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &TRANSFORM_ATTRS,
        },
        // slot 2: per-instance color, emissive in w
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vec4>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &COLOR_ATTRS,
        },
    ]
}
