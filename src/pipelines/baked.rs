use crate::{
    data_structures::model::{ModelVertex, Vertex},
    pipelines::{PipelineOptions, mk_render_pipeline},
};

/// Unlit pipeline that shows the baked lighting texture as is.
///
/// # Arguments
///
/// * `color_format` is the format of the offscreen scene target
/// * `camera_bind_group_layout` is bound at group 0
/// * `texture_bind_group_layout` holds the baked texture and sampler at group 1
pub fn mk_baked_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    texture_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Baked Pipeline Layout"),
        bind_group_layouts: &[
            Some(camera_bind_group_layout),
            Some(texture_bind_group_layout),
        ],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Baked Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("baked.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        "Baked Pipeline",
        &layout,
        color_format,
        PipelineOptions::default(),
        &[ModelVertex::desc()],
        shader,
    )
}
