//! Scene configuration.
//!
//! All knobs live in [`PortalConfig`]. [`crate::run`] uses the defaults, which
//! reproduce the portal room as it was authored.

use cgmath::Point3;

use crate::color::Color;

#[derive(Clone, Debug, Default)]
pub struct PortalConfig {
    pub assets: AssetPaths,
    pub debug: DebugSettings,
    pub fireflies: FireflySettings,
    pub camera: CameraSettings,
}

/// Asset locations relative to the `assets/` base directory.
#[derive(Clone, Debug)]
pub struct AssetPaths {
    pub model: String,
    pub baked_texture: String,
    /// Where a geometry decoder bundle would be looked up. Compressed meshes
    /// are rejected by the loader, so this is informational only.
    pub decoder: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            model: "portalroom.glb".to_string(),
            baked_texture: "TexturePortalRoom.jpg".to_string(),
            decoder: "draco/".to_string(),
        }
    }
}

/// The colours exposed on the debug panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugSettings {
    pub background_color: Color,
    pub portal_color_start: Color,
    pub portal_color_end: Color,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            background_color: Color::from_rgb8(0x20, 0x07, 0x2c),
            portal_color_start: Color::from_rgb8(0xdd, 0xbb, 0xec),
            portal_color_end: Color::from_rgb8(0x71, 0x2f, 0x7f),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FireflySettings {
    pub count: u32,
    /// Point size in pixels before scale, pixel ratio and depth are applied.
    pub size: f32,
    pub strength: f32,
}

impl Default for FireflySettings {
    fn default() -> Self {
        Self {
            count: 30,
            size: 300.0,
            strength: 0.05,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CameraSettings {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub damping_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            near: 0.1,
            far: 100.0,
            position: Point3::new(4.0, 2.0, 4.0),
            target: Point3::new(0.0, 0.0, 0.0),
            damping_factor: 0.05,
        }
    }
}
