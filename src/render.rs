//! Scene rendering.
//!
//! The scene is drawn into an offscreen target sized by the viewport's
//! render pixel ratio, then stretched onto the window surface. Uniform
//! buffers are only rewritten when their material's revision moved.

use std::iter;

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        model::{DrawMesh, GpuMesh},
        texture::Texture,
    },
    error::SurfaceError,
    materials::{
        Material, MaterialRole,
        uniforms::{LampUniform, ParticleUniform, PortalUniform, UniformBinding, uniform_layout},
    },
    particles::FireflyInstance,
    pipelines::{
        baked::mk_baked_pipeline, blit::mk_blit_pipeline, fireflies::QUAD_VERTICES,
        fireflies::mk_fireflies_pipeline, lamp::mk_lamp_pipeline, portal::mk_portal_pipeline,
        texture_bind_group, texture_layout,
    },
    state::PortalState,
};

#[derive(Debug)]
struct Pipelines {
    baked: wgpu::RenderPipeline,
    lamp: wgpu::RenderPipeline,
    portal: wgpu::RenderPipeline,
    fireflies: wgpu::RenderPipeline,
    blit: wgpu::RenderPipeline,
}

/// Offscreen colour and depth attachments plus the bind group that samples
/// the colour attachment during the blit.
#[derive(Debug)]
struct SceneTarget {
    size: [u32; 2],
    color: Texture,
    depth: Texture,
    blit_bind_group: wgpu::BindGroup,
}

impl SceneTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layout: &wgpu::BindGroupLayout,
        size: [u32; 2],
    ) -> Self {
        let size = [size[0].max(1), size[1].max(1)];
        let color = Texture::create_render_target(device, size, format, "scene_target");
        let depth = Texture::create_depth_texture(device, size, "depth_texture");
        let blit_bind_group = texture_bind_group(device, layout, &color, "blit_bind_group");
        Self {
            size,
            color,
            depth,
            blit_bind_group,
        }
    }
}

/// Something drawn on top of the finished frame, straight onto the surface
/// texture, before it is presented.
pub trait Overlay {
    fn draw(
        &mut self,
        ctx: &Context,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    );
}

/// Draws [`PortalState`] with one pipeline per material role.
///
/// Owns the pipelines, one [`UniformBinding`] per animated material, the
/// firefly instance buffer and the offscreen scene target.
#[derive(Debug)]
pub struct Renderer {
    pipelines: Pipelines,
    texture_layout: wgpu::BindGroupLayout,
    lamp: UniformBinding,
    portal: UniformBinding,
    fireflies: UniformBinding,
    /// Bind group of the baked texture, once it has loaded.
    baked: Option<wgpu::BindGroup>,
    firefly_instances: wgpu::Buffer,
    firefly_count: u32,
    target: SceneTarget,
}

impl Renderer {
    /// Build every pipeline and GPU buffer the room needs.
    ///
    /// The firefly field is uploaded once here; it never changes afterwards.
    ///
    /// # Arguments
    ///
    /// * `ctx` provides the device, the surface format and the camera layout
    /// * `state` supplies the fireflies to upload
    /// * `render_size` is the offscreen target size in pixels, the viewport's
    ///   logical size times its render pixel ratio
    pub fn new(ctx: &Context, state: &PortalState<GpuMesh>, render_size: [u32; 2]) -> Self {
        let device = &ctx.device;
        let format = ctx.config.format;
        let camera_layout = &ctx.camera.bind_group_layout;

        let texture_layout = texture_layout(device, "texture_bind_group_layout");
        let lamp_layout = uniform_layout(device, wgpu::ShaderStages::FRAGMENT, "lamp_layout");
        let portal_layout = uniform_layout(device, wgpu::ShaderStages::FRAGMENT, "portal_layout");
        let fireflies_layout = uniform_layout(
            device,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            "fireflies_layout",
        );

        let pipelines = Pipelines {
            baked: mk_baked_pipeline(device, format, camera_layout, &texture_layout),
            lamp: mk_lamp_pipeline(device, format, camera_layout, &lamp_layout),
            portal: mk_portal_pipeline(device, format, camera_layout, &portal_layout),
            fireflies: mk_fireflies_pipeline(device, format, camera_layout, &fireflies_layout),
            blit: mk_blit_pipeline(device, format, &texture_layout),
        };

        let lamp = UniformBinding::new(device, &lamp_layout, "lamp_uniform", LampUniform::zeroed());
        let portal = UniformBinding::new(
            device,
            &portal_layout,
            "portal_uniform",
            PortalUniform::zeroed(),
        );
        let fireflies = UniformBinding::new(
            device,
            &fireflies_layout,
            "fireflies_uniform",
            ParticleUniform::zeroed(),
        );

        // A zero-sized vertex buffer is not allowed, so an empty field still
        // gets one (never drawn) instance.
        let mut instances = state.fireflies.instances();
        let firefly_count = instances.len() as u32;
        if instances.is_empty() {
            instances.push(FireflyInstance::zeroed());
        }
        let firefly_instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Firefly Instance Buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let target = SceneTarget::new(device, format, &texture_layout, render_size);
        log::info!(
            "renderer ready: {firefly_count} fireflies, scene target {}x{}",
            target.size[0],
            target.size[1]
        );

        Self {
            pipelines,
            texture_layout,
            lamp,
            portal,
            fireflies,
            baked: None,
            firefly_instances,
            firefly_count,
            target,
        }
    }

    pub fn set_baked_texture(&mut self, device: &wgpu::Device, texture: &Texture) {
        self.baked = Some(texture_bind_group(
            device,
            &self.texture_layout,
            texture,
            "baked_bind_group",
        ));
    }

    pub fn has_baked_texture(&self) -> bool {
        self.baked.is_some()
    }

    pub fn target_size(&self) -> [u32; 2] {
        self.target.size
    }

    /// Recreate the offscreen target. A no-op when the size is unchanged.
    pub fn resize_target(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat, size: [u32; 2]) {
        let size = [size[0].max(1), size[1].max(1)];
        if size == self.target.size {
            return;
        }
        self.target = SceneTarget::new(device, format, &self.texture_layout, size);
        // The firefly uniform carries the target resolution.
        self.fireflies.revision = None;
    }

    fn sync_uniforms(&mut self, queue: &wgpu::Queue, state: &PortalState<GpuMesh>) {
        let resolution = [self.target.size[0] as f32, self.target.size[1] as f32];
        let materials = &state.materials;
        for id in materials.ids() {
            let revision = materials.revision(id);
            match materials.get(id) {
                Material::Lamp(lamp) => self.lamp.sync(queue, revision, lamp.to_uniform()),
                Material::Portal(portal) => self.portal.sync(queue, revision, portal.to_uniform()),
                Material::Particle(particle) => {
                    self.fireflies
                        .sync(queue, revision, particle.to_uniform(resolution))
                }
                Material::Baked(_) => {}
            }
        }
    }

    /// Draw one frame and present it. The surface must be configured.
    pub fn render(
        &mut self,
        ctx: &Context,
        state: &PortalState<GpuMesh>,
        overlay: Option<&mut dyn Overlay>,
    ) -> Result<(), SurfaceError> {
        ctx.write_camera(state.camera.uniform());
        self.sync_uniforms(&ctx.queue, state);

        let output = match ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture) => texture,
            wgpu::CurrentSurfaceTexture::Suboptimal(texture) => {
                log::debug!("presenting to a suboptimal surface");
                texture
            }
            wgpu::CurrentSurfaceTexture::Timeout => return Err(SurfaceError::Timeout),
            wgpu::CurrentSurfaceTexture::Occluded => return Err(SurfaceError::Occluded),
            wgpu::CurrentSurfaceTexture::Outdated => return Err(SurfaceError::Outdated),
            wgpu::CurrentSurfaceTexture::Lost => return Err(SurfaceError::Lost),
            wgpu::CurrentSurfaceTexture::Validation => return Err(SurfaceError::Validation),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target.color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(state.background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.target.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);

            if let Some(model) = &state.model {
                for node in &model.children {
                    // Children without a binding keep the baked material.
                    let id = node.material.unwrap_or(state.materials.baked());
                    let material_group = match state.materials.get(id).role() {
                        MaterialRole::Baked => match &self.baked {
                            Some(group) => {
                                render_pass.set_pipeline(&self.pipelines.baked);
                                group
                            }
                            None => continue,
                        },
                        MaterialRole::Lamp => {
                            render_pass.set_pipeline(&self.pipelines.lamp);
                            &self.lamp.bind_group
                        }
                        MaterialRole::Portal => {
                            render_pass.set_pipeline(&self.pipelines.portal);
                            &self.portal.bind_group
                        }
                        MaterialRole::Particle => {
                            log::warn!("node {} is bound to the particle material", node.name);
                            continue;
                        }
                    };
                    render_pass.set_bind_group(1, material_group, &[]);
                    for mesh in &node.meshes {
                        render_pass.draw_mesh(mesh);
                    }
                }
            }

            if self.firefly_count > 0 {
                render_pass.set_pipeline(&self.pipelines.fireflies);
                render_pass.set_bind_group(1, &self.fireflies.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.firefly_instances.slice(..));
                render_pass.draw(0..QUAD_VERTICES, 0..self.firefly_count);
            }
        }
        {
            let mut blit_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            blit_pass.set_pipeline(&self.pipelines.blit);
            blit_pass.set_bind_group(0, &self.target.blit_bind_group, &[]);
            blit_pass.draw(0..3, 0..1);
        }
        if let Some(overlay) = overlay {
            overlay.draw(ctx, &mut encoder, &view);
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
