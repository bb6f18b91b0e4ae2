use crate::{
    data_structures::model::{ModelVertex, Vertex},
    pipelines::{PipelineOptions, mk_render_pipeline},
};

/// Flat, unlit colour for the two lamp meshes.
///
/// # Arguments
///
/// * `color_format` is the format of the offscreen scene target
/// * `camera_bind_group_layout` is bound at group 0
/// * `lamp_bind_group_layout` holds the lamp colour uniform at group 1
pub fn mk_lamp_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    lamp_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Lamp Pipeline Layout"),
        bind_group_layouts: &[
            Some(camera_bind_group_layout),
            Some(lamp_bind_group_layout),
        ],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Lamp Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("lamp.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        "Lamp Pipeline",
        &layout,
        color_format,
        PipelineOptions::default(),
        &[ModelVertex::desc()],
        shader,
    )
}
