//! Frame clock and per-frame update loop.
//!
//! Every tick follows the same order:
//! 1. read the elapsed time from the [`Clock`]
//! 2. write it into every time-dependent uniform
//! 3. advance the orbit camera by one damping step
//! 4. render once through the [`FrameHost`], unless it is not ready yet
//! 5. ask the host for the next frame
//!
//! The host is a trait so the loop can run against a recording fake in tests
//! and against the wgpu renderer in the application.

use instant::Instant;

use crate::state::PortalState;

/// Monotonic time source. Starts at zero when created and is never reset.
pub trait Clock {
    fn elapsed_secs(&self) -> f32;
}

#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Rendering backend as seen by the frame loop.
pub trait FrameHost<M> {
    type Error;

    /// Whether [`render`](Self::render) may be called. A window surface is
    /// not ready until it has been configured with a non-zero size.
    fn is_ready(&self) -> bool {
        true
    }

    /// Upload changed uniforms and draw the scene once.
    fn render(&mut self, state: &PortalState<M>) -> Result<(), Self::Error>;

    /// Schedule the next tick (once per display refresh on real hosts).
    fn request_next_frame(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Rendering,
}

#[derive(Debug)]
pub struct FrameLoop<C = SystemClock> {
    clock: C,
    state: FrameState,
    frames: u64,
}

impl FrameLoop<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for FrameLoop<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FrameLoop<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            state: FrameState::Idle,
            frames: 0,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Ticks run so far, failed renders included.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run one frame and return the time it was rendered at.
    ///
    /// The next frame is requested even when rendering fails; the error is
    /// handed back for the host to deal with. A host that is not ready is
    /// skipped for this frame, but time and camera still advance.
    pub fn tick<M, H>(&mut self, app: &mut PortalState<M>, host: &mut H) -> Result<f32, H::Error>
    where
        H: FrameHost<M>,
    {
        self.state = FrameState::Rendering;

        let elapsed = self.clock.elapsed_secs();
        app.materials.set_time(elapsed);
        app.camera.update();
        let rendered = if host.is_ready() {
            host.render(app)
        } else {
            log::trace!("host not ready, skipping render");
            Ok(())
        };
        host.request_next_frame();

        self.frames += 1;
        self.state = FrameState::Idle;
        rendered.map(|_| elapsed)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        config::PortalConfig, materials::TimeUniform, particles::ParticleField, viewport::Viewport,
    };

    struct ManualClock(Cell<f32>);

    impl Clock for ManualClock {
        fn elapsed_secs(&self) -> f32 {
            self.0.get()
        }
    }

    #[derive(Default)]
    struct FailingHost {
        requested: u32,
    }

    impl FrameHost<()> for FailingHost {
        type Error = &'static str;

        fn render(&mut self, _: &PortalState<()>) -> Result<(), Self::Error> {
            Err("surface lost")
        }

        fn request_next_frame(&mut self) {
            self.requested += 1;
        }
    }

    #[derive(Default)]
    struct UnconfiguredHost {
        rendered: u32,
        requested: u32,
    }

    impl FrameHost<()> for UnconfiguredHost {
        type Error = &'static str;

        fn is_ready(&self) -> bool {
            false
        }

        fn render(&mut self, _: &PortalState<()>) -> Result<(), Self::Error> {
            self.rendered += 1;
            Err("surface not configured")
        }

        fn request_next_frame(&mut self) {
            self.requested += 1;
        }
    }

    fn app() -> PortalState<()> {
        PortalState::with_fireflies(
            &PortalConfig::default(),
            Viewport::new(800.0, 600.0, 1.0),
            ParticleField::default(),
        )
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.elapsed_secs();
        let b = clock.elapsed_secs();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn failed_render_still_schedules_the_next_frame() {
        let mut app = app();
        let mut frame_loop = FrameLoop::with_clock(ManualClock(Cell::new(0.5)));
        let mut host = FailingHost::default();

        assert_eq!(frame_loop.tick(&mut app, &mut host), Err("surface lost"));
        assert_eq!(host.requested, 1);
        assert_eq!(frame_loop.state(), FrameState::Idle);
        assert_eq!(frame_loop.frames(), 1);
        assert_eq!(app.materials.portal_material().time(), 0.5);
    }

    #[test]
    fn unconfigured_host_is_not_rendered_but_keeps_the_loop_alive() {
        let mut app = app();
        let mut frame_loop = FrameLoop::with_clock(ManualClock(Cell::new(1.25)));
        let mut host = UnconfiguredHost::default();

        assert_eq!(frame_loop.tick(&mut app, &mut host), Ok(1.25));
        assert_eq!(frame_loop.tick(&mut app, &mut host), Ok(1.25));
        assert_eq!(host.rendered, 0);
        assert_eq!(host.requested, 2);
        assert_eq!(frame_loop.frames(), 2);
        assert_eq!(app.materials.portal_material().time(), 1.25);
    }
}
