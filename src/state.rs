//! Application state owned by the frame loop driver.
//!
//! Everything the frame loop, the resize handler and the debug panel touch
//! lives here and is passed by `&mut` into whichever of them runs. The event
//! loop dispatches one callback at a time, so there is never more than one
//! writer.

use crate::{
    bindings,
    camera::CameraRig,
    color::Color,
    config::{DebugSettings, PortalConfig},
    data_structures::model::{GpuMesh, Model},
    error::PortalError,
    materials::MaterialSet,
    particles::{self, ParticleField},
    viewport::{ResizeOutcome, Viewport},
};

#[derive(Debug)]
pub struct PortalState<M = GpuMesh> {
    pub settings: DebugSettings,
    pub materials: MaterialSet,
    /// Colour the frame is cleared to.
    pub background: Color,
    pub viewport: Viewport,
    pub camera: CameraRig,
    pub fireflies: ParticleField,
    /// The room model, once it has loaded and its materials are bound.
    pub model: Option<Model<M>>,
}

impl<M> PortalState<M> {
    /// Build the state with a freshly generated firefly field.
    pub fn new(config: &PortalConfig, viewport: Viewport) -> Self {
        let fireflies = particles::generate(config.fireflies.count);
        Self::with_fireflies(config, viewport, fireflies)
    }

    pub fn with_fireflies(
        config: &PortalConfig,
        viewport: Viewport,
        fireflies: ParticleField,
    ) -> Self {
        let materials = MaterialSet::new(
            &config.assets.baked_texture,
            &config.debug,
            &config.fireflies,
            viewport.particle_pixel_ratio(),
        );
        Self {
            settings: config.debug,
            materials,
            background: config.debug.background_color,
            viewport,
            camera: CameraRig::new(&config.camera, viewport.width, viewport.height),
            fireflies,
            model: None,
        }
    }

    /// Apply a viewport change to the camera and the particle material.
    ///
    /// Resizing the render target is left to the caller, which owns the
    /// surface.
    pub fn on_resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> ResizeOutcome {
        let outcome = self.viewport.on_resize(width, height, device_pixel_ratio);
        self.camera.projection.set_aspect(outcome.aspect);
        self.materials
            .set_particle_pixel_ratio(outcome.particle_pixel_ratio);
        outcome
    }

    /// Bind materials to the model's named children and keep it for drawing.
    /// On error the model is dropped and the state is left untouched.
    pub fn attach_model(&mut self, mut model: Model<M>) -> Result<(), PortalError> {
        bindings::on_model_loaded(&mut model, &self.materials)?;
        self.model = Some(model);
        Ok(())
    }
}
