use crate::pipelines::{PipelineOptions, mk_render_pipeline};

/// Draws the offscreen scene target onto the surface with one full-screen
/// triangle, scaling it to the window size.
pub fn mk_blit_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    texture_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Blit Pipeline Layout"),
        bind_group_layouts: &[Some(texture_bind_group_layout)],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Blit Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        "Blit Pipeline",
        &layout,
        surface_format,
        PipelineOptions {
            depth_format: None,
            cull_mode: None,
            ..Default::default()
        },
        &[],
        shader,
    )
}
