//! Viewport size tracking.
//!
//! The renderer and the firefly shader clamp the device pixel ratio
//! differently. The renderer draws at most at the logical resolution after a
//! resize, while the firefly size keeps scaling up to a ratio of 2. At startup
//! both use 2.

use crate::camera::aspect_ratio;

/// Render target pixel-ratio cap applied at startup.
pub const STARTUP_RENDER_PIXEL_RATIO_CAP: f32 = 2.0;
/// Render target pixel-ratio cap applied on every resize.
pub const RESIZE_RENDER_PIXEL_RATIO_CAP: f32 = 1.0;
/// Pixel-ratio cap for the firefly size uniform.
pub const PARTICLE_PIXEL_RATIO_CAP: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Logical width, i.e. physical pixels divided by the pixel ratio.
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

/// What a resize asks the camera, the renderer and the particle material to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeOutcome {
    pub aspect: f32,
    pub render_size: [u32; 2],
    pub render_pixel_ratio: f32,
    pub particle_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.width, self.height)
    }

    pub fn particle_pixel_ratio(&self) -> f32 {
        self.pixel_ratio.min(PARTICLE_PIXEL_RATIO_CAP)
    }

    /// Surface size in physical pixels for a given pixel-ratio cap.
    pub fn render_size(&self, cap: f32) -> [u32; 2] {
        let ratio = self.pixel_ratio.min(cap);
        [
            (self.width * ratio).round().max(0.0) as u32,
            (self.height * ratio).round().max(0.0) as u32,
        ]
    }

    /// Sizes and ratios used before the first resize event.
    pub fn startup(&self) -> ResizeOutcome {
        ResizeOutcome {
            aspect: self.aspect(),
            render_size: self.render_size(STARTUP_RENDER_PIXEL_RATIO_CAP),
            render_pixel_ratio: self.pixel_ratio.min(STARTUP_RENDER_PIXEL_RATIO_CAP),
            particle_pixel_ratio: self.particle_pixel_ratio(),
        }
    }

    pub fn on_resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> ResizeOutcome {
        self.width = width;
        self.height = height;
        self.pixel_ratio = device_pixel_ratio;
        ResizeOutcome {
            aspect: self.aspect(),
            render_size: self.render_size(RESIZE_RENDER_PIXEL_RATIO_CAP),
            render_pixel_ratio: self.pixel_ratio.min(RESIZE_RENDER_PIXEL_RATIO_CAP),
            particle_pixel_ratio: self.particle_pixel_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_to_hidpi() {
        let mut viewport = Viewport::new(1024.0, 768.0, 1.0);
        let outcome = viewport.on_resize(800.0, 600.0, 2.0);
        assert!((outcome.aspect - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(outcome.particle_pixel_ratio, 2.0);
        assert_eq!(outcome.render_pixel_ratio, 1.0);
        assert_eq!(outcome.render_size, [800, 600]);
    }

    #[test]
    fn startup_renders_at_up_to_twice_the_logical_size() {
        let viewport = Viewport::new(800.0, 600.0, 3.0);
        let outcome = viewport.startup();
        assert_eq!(outcome.render_size, [1600, 1200]);
        assert_eq!(outcome.particle_pixel_ratio, 2.0);
    }

    #[test]
    fn low_density_displays_are_not_clamped() {
        let mut viewport = Viewport::new(800.0, 600.0, 1.0);
        let outcome = viewport.on_resize(640.0, 480.0, 0.5);
        assert_eq!(outcome.particle_pixel_ratio, 0.5);
        assert_eq!(outcome.render_size, [320, 240]);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut once = Viewport::new(1.0, 1.0, 1.0);
        let first = once.on_resize(800.0, 600.0, 2.0);
        let mut twice = Viewport::new(1.0, 1.0, 1.0);
        twice.on_resize(800.0, 600.0, 2.0);
        let second = twice.on_resize(800.0, 600.0, 2.0);
        assert_eq!(once, twice);
        assert_eq!(first, second);
    }
}
