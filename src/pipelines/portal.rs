use crate::{
    data_structures::model::{ModelVertex, Vertex},
    pipelines::{PipelineOptions, mk_render_pipeline},
};

/// The portal surface: animated Perlin noise blended between two colours.
///
/// The portal plane is visible from both sides, so nothing is culled.
///
/// # Arguments
///
/// * `color_format` is the format of the offscreen scene target
/// * `portal_bind_group_layout` holds the portal uniform (both colours and
///   the elapsed time) at group 1
pub fn mk_portal_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    portal_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Portal Pipeline Layout"),
        bind_group_layouts: &[
            Some(camera_bind_group_layout),
            Some(portal_bind_group_layout),
        ],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Portal Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("portal.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        "Portal Pipeline",
        &layout,
        color_format,
        PipelineOptions {
            cull_mode: None,
            ..Default::default()
        },
        &[ModelVertex::desc()],
        shader,
    )
}
