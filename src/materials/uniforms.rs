//! Uniform blocks as laid out in the WGSL shaders.
//!
//! WGSL aligns `vec3<f32>` to 16 bytes, so a scalar either follows a vec3 in
//! its last lane or an explicit padding field fills it.

use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PortalUniform {
    pub color_start: [f32; 3],
    pub time: f32,
    pub color_end: [f32; 3],
    _padding: f32,
}

impl PortalUniform {
    pub fn new(time: f32, color_start: [f32; 3], color_end: [f32; 3]) -> Self {
        Self {
            color_start,
            time,
            color_end,
            _padding: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleUniform {
    pub time: f32,
    pub pixel_ratio: f32,
    pub size: f32,
    pub strength: f32,
    pub resolution: [f32; 2],
    _padding: [f32; 2],
}

impl ParticleUniform {
    pub fn new(
        time: f32,
        pixel_ratio: f32,
        size: f32,
        strength: f32,
        resolution: [f32; 2],
    ) -> Self {
        Self {
            time,
            pixel_ratio,
            size,
            strength,
            resolution,
            _padding: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LampUniform {
    pub color: [f32; 3],
    _padding: f32,
}

impl LampUniform {
    pub fn new(color: [f32; 3]) -> Self {
        Self {
            color,
            _padding: 0.0,
        }
    }
}

/// A uniform buffer with the bind group that exposes it at binding 0.
///
/// `revision` is the material revision last written to the buffer, so the
/// renderer uploads only what changed since the previous frame.
#[derive(Debug)]
pub struct UniformBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub revision: Option<u64>,
}

impl UniformBinding {
    /// Create the buffer with `contents` and bind it against `layout`.
    ///
    /// # Arguments
    ///
    /// * `layout` is a [`uniform_layout`] with the stages reading the block
    /// * `label` names both the buffer and the bind group
    /// * `contents` is the initial value, usually zeroed until the first sync
    pub fn new<T: bytemuck::Pod>(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        contents: T,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[contents]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(label),
        });
        Self {
            buffer,
            bind_group,
            revision: None,
        }
    }

    /// Upload `contents` unless `revision` was already written.
    pub fn sync<T: bytemuck::Pod>(&mut self, queue: &wgpu::Queue, revision: u64, contents: T) {
        if self.revision == Some(revision) {
            return;
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[contents]));
        self.revision = Some(revision);
    }
}

/// Layout for a single uniform buffer at binding 0.
pub fn uniform_layout(
    device: &wgpu::Device,
    visibility: wgpu::ShaderStages,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}
