use crate::{
    data_structures::model::Vertex,
    particles::FireflyInstance,
    pipelines::{PipelineOptions, mk_render_pipeline},
};

/// Vertices per firefly quad (two triangles, expanded in the vertex shader).
pub const QUAD_VERTICES: u32 = 6;

/// Additive, depth-tested but not depth-writing point sprites.
///
/// One instance per firefly; the quad corners come from the vertex index.
///
/// # Arguments
///
/// * `camera_bind_group_layout` is bound at group 0
/// * `fireflies_bind_group_layout` holds the particle uniform (time, size,
///   pixel ratio, target resolution) at group 1
pub fn mk_fireflies_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    fireflies_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Fireflies Pipeline Layout"),
        bind_group_layouts: &[
            Some(camera_bind_group_layout),
            Some(fireflies_bind_group_layout),
        ],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Fireflies Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("fireflies.wgsl").into()),
    };
    let additive = wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    };
    mk_render_pipeline(
        device,
        "Fireflies Pipeline",
        &layout,
        color_format,
        PipelineOptions {
            blend: Some(additive),
            depth_write: false,
            cull_mode: None,
            ..Default::default()
        },
        &[FireflyInstance::desc()],
        shader,
    )
}
