use std::cell::Cell;

use portal_room::{
    PortalConfig,
    data_structures::model::{Model, ModelNode},
    frame::{Clock, FrameHost},
    materials::TimeUniform,
    particles::ParticleField,
    state::PortalState,
    viewport::Viewport,
};

/// A clock the test advances by hand.
#[derive(Default)]
pub(crate) struct ManualClock(Cell<f32>);

impl ManualClock {
    pub(crate) fn set(&self, t: f32) {
        self.0.set(t);
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> f32 {
        self.0.get()
    }
}

/// Records the uniform times it was asked to render with.
#[derive(Default)]
pub(crate) struct RecordingHost {
    pub(crate) rendered: Vec<(f32, f32)>,
    pub(crate) requested: u32,
}

impl FrameHost<()> for RecordingHost {
    type Error = std::convert::Infallible;

    fn render(&mut self, state: &PortalState<()>) -> Result<(), Self::Error> {
        self.rendered.push((
            state.materials.portal_material().time(),
            state.materials.particle_material().time(),
        ));
        Ok(())
    }

    fn request_next_frame(&mut self) {
        self.requested += 1;
    }
}

pub(crate) fn state() -> PortalState<()> {
    PortalState::with_fireflies(
        &PortalConfig::default(),
        Viewport::new(1024.0, 768.0, 1.0),
        ParticleField::default(),
    )
}

/// A model with the given top-level children and no meshes.
pub(crate) fn model(names: &[&str]) -> Model<()> {
    Model::new(
        names
            .iter()
            .map(|name| ModelNode::new(*name, Vec::new()))
            .collect(),
    )
}
