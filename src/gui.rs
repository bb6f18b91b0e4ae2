//! Native debug panel window.
//!
//! One egui colour button per [`DebugPanel`](crate::debug_panel::DebugPanel)
//! control, painted onto the surface after the scene. Picked colours leave
//! the window as [`PortalEvent::SetDebugColor`], the same event the web page
//! sends, so both hosts change the scene through one path.

use std::fmt;

use winit::{event::WindowEvent, window::Window};

use crate::{app::PortalEvent, color::Color, context::Context, render::Overlay};

/// A colour the user picked in the panel window.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorEdit {
    pub name: String,
    pub color: Color,
}

impl From<ColorEdit> for PortalEvent {
    fn from(edit: ColorEdit) -> Self {
        PortalEvent::SetDebugColor {
            name: edit.name,
            value: edit.color.to_string(),
        }
    }
}

/// Lay out the panel window and return the controls changed this pass.
pub fn color_controls(ctx: &egui::Context, controls: &[(String, Color)]) -> Vec<ColorEdit> {
    let mut edits = Vec::new();
    egui::Window::new("Debug")
        .resizable(false)
        .default_pos(egui::pos2(12.0, 12.0))
        .show(ctx, |ui| {
            for (name, color) in controls {
                ui.horizontal(|ui| {
                    let mut rgb = color.to_rgb8();
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        edits.push(ColorEdit {
                            name: name.clone(),
                            color: Color::from_rgb8(rgb[0], rgb[1], rgb[2]),
                        });
                    }
                    ui.label(name.as_str());
                });
            }
        });
    edits
}

/// Output of the last UI pass, waiting to be painted.
struct GuiFrame {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    pixels_per_point: f32,
}

pub struct DebugGui {
    egui: egui::Context,
    winit: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    frame: Option<GuiFrame>,
}

impl DebugGui {
    pub fn new(ctx: &Context) -> Self {
        let egui = egui::Context::default();
        let window = ctx.window();
        let winit = egui_winit::State::new(
            egui.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(ctx.device.limits().max_texture_dimension_2d as usize),
        );
        let renderer = egui_wgpu::Renderer::new(
            &ctx.device,
            ctx.config.format,
            egui_wgpu::RendererOptions::default(),
        );
        Self {
            egui,
            winit,
            renderer,
            frame: None,
        }
    }

    /// Hand a window event to egui. Returns true when the panel used it, in
    /// which case the orbit controls must not see it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit.on_window_event(window, event).consumed
    }

    /// Run the panel for this frame against the current control values.
    pub fn run(&mut self, window: &Window, controls: &[(String, Color)]) -> Vec<ColorEdit> {
        let raw_input = self.winit.take_egui_input(window);
        let mut edits = Vec::new();
        let output = self.egui.run(raw_input, |ctx| {
            edits.extend(color_controls(ctx, controls));
        });
        self.winit
            .handle_platform_output(window, output.platform_output);

        let paint_jobs = self.egui.tessellate(output.shapes, output.pixels_per_point);
        self.frame = Some(GuiFrame {
            paint_jobs,
            textures: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        });
        edits
    }
}

impl fmt::Debug for DebugGui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugGui")
            .field("frame_pending", &self.frame.is_some())
            .finish_non_exhaustive()
    }
}

impl Overlay for DebugGui {
    fn draw(
        &mut self,
        ctx: &Context,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [ctx.config.width, ctx.config.height],
            pixels_per_point: frame.pixels_per_point,
        };

        for (id, delta) in &frame.textures.set {
            self.renderer
                .update_texture(&ctx.device, &ctx.queue, *id, delta);
        }
        let callbacks = self.renderer.update_buffers(
            &ctx.device,
            &ctx.queue,
            encoder,
            &frame.paint_jobs,
            &screen,
        );
        if !callbacks.is_empty() {
            ctx.queue.submit(callbacks);
        }
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Debug Panel Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &frame.paint_jobs, &screen);
        }
        for id in &frame.textures.free {
            self.renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::PortalConfig,
        debug_panel::{BACKGROUND_COLOR, DebugPanel, PORTAL_COLOR_START},
        particles::ParticleField,
        state::PortalState,
        viewport::Viewport,
    };

    fn state() -> PortalState<()> {
        PortalState::with_fireflies(
            &PortalConfig::default(),
            Viewport::new(800.0, 600.0, 1.0),
            ParticleField::default(),
        )
    }

    fn controls(panel: &DebugPanel<()>) -> Vec<(String, Color)> {
        panel
            .controls()
            .map(|(name, color)| (name.to_string(), color))
            .collect()
    }

    fn apply(panel: &mut DebugPanel<()>, state: Option<&mut PortalState<()>>, event: PortalEvent) {
        match event {
            PortalEvent::SetDebugColor { name, value } => {
                panel.set_or_defer(state, &name, &value).unwrap();
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn picked_colour_reaches_the_portal_material() {
        let mut state = state();
        let mut panel = DebugPanel::portal_room(&state.settings);
        let edit = ColorEdit {
            name: PORTAL_COLOR_START.to_string(),
            color: Color::from_rgb8(0x12, 0xab, 0x00),
        };

        apply(&mut panel, Some(&mut state), edit.into());

        assert_eq!(
            state.materials.portal_material().color_start().to_rgb8(),
            [0x12, 0xab, 0x00]
        );
        assert_eq!(panel.value(PORTAL_COLOR_START), Some(Color::from_rgb8(0x12, 0xab, 0x00)));
    }

    #[test]
    fn pick_before_the_scene_exists_is_replayed() {
        let mut state = state();
        let mut panel = DebugPanel::portal_room(&state.settings);
        let edit = ColorEdit {
            name: BACKGROUND_COLOR.to_string(),
            color: Color::BLACK,
        };

        apply(&mut panel, None, edit.into());
        assert_ne!(state.background, Color::BLACK);

        assert_eq!(panel.apply_deferred(&mut state), 1);
        assert_eq!(state.background, Color::BLACK);
    }

    #[test]
    fn idle_panel_reports_no_edits() {
        let panel: DebugPanel<()> = DebugPanel::portal_room(&PortalConfig::default().debug);
        let controls = controls(&panel);
        let ctx = egui::Context::default();
        let mut edits = Vec::new();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            edits.extend(color_controls(ctx, &controls));
        });
        assert!(edits.is_empty());
        assert!(!output.shapes.is_empty());
    }
}
