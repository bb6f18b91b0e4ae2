//! portal-room
//!
//! A small baked-lighting scene: a room model textured with one baked
//! lightmap, two glowing lamps, an animated portal surface and a cloud of
//! drifting fireflies. Runs natively and in the browser (WebGL).
//!
//! High-level modules
//! - `app`: window, event loop and asset-load plumbing
//! - `bindings`: which material each named model child is drawn with
//! - `camera`: perspective projection and damped orbit controls
//! - `color`: sRGB colours as chosen in the debug panel
//! - `config`: asset paths, initial colours and tuning constants
//! - `context`: GPU device, surface and camera uniform
//! - `data_structures`: meshes, models and textures
//! - `debug_panel`: named colour controls and their setters
//! - `frame`: frame clock and per-frame update loop
//! - `gui`: native egui window for the debug panel
//! - `materials`: material arena and uniform blocks
//! - `particles`: firefly field generation
//! - `pipelines`: render pipelines and shaders
//! - `render`: per-frame drawing
//! - `resources`: model and texture loading
//! - `state`: the state every handler mutates
//! - `viewport`: resize handling and pixel-ratio clamps
//!

pub mod app;
pub mod bindings;
pub mod camera;
pub mod color;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod debug_panel;
pub mod error;
pub mod frame;
#[cfg(not(target_arch = "wasm32"))]
pub mod gui;
pub mod materials;
pub mod particles;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod state;
pub mod viewport;

pub use app::{PortalEvent, run, run_with};
pub use color::Color;
pub use config::PortalConfig;
pub use error::PortalError;
