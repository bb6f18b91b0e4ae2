//! Window and event loop driver.
//!
//! The winit [`ApplicationHandler`] owns the GPU [`Context`], the
//! [`Renderer`] and the [`PortalState`]. Asset loads run as futures (on the
//! tokio runtime natively, on the browser's microtask queue on the web) and
//! report back through [`PortalEvent`]s, so every state change happens on
//! the event loop thread.
//!
//! Natively the debug panel is an egui window drawn over the scene; on the
//! web the page calls [`set_debug_color`]. Both end up as
//! [`PortalEvent::SetDebugColor`].

use std::{fmt::Debug, sync::Arc};

use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::PortalConfig,
    context::Context,
    data_structures::{
        model::{GpuMesh, Model},
        texture::Texture,
    },
    debug_panel::DebugPanel,
    error::{PortalError, SurfaceError},
    frame::{FrameHost, FrameLoop},
    render::{Overlay, Renderer},
    resources::{load_model_gltf, load_texture},
    state::PortalState,
    viewport::Viewport,
};

#[cfg(not(target_arch = "wasm32"))]
use crate::gui::DebugGui;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Pixels of trackpad scrolling that count as one wheel notch.
const PIXELS_PER_NOTCH: f64 = 50.0;

pub enum PortalEvent {
    /// GPU setup finished (the web sets up asynchronously).
    #[cfg(target_arch = "wasm32")]
    Initialized(anyhow::Result<Graphics>),
    ModelLoaded(Result<Model<GpuMesh>, PortalError>),
    TextureLoaded(Result<Texture, PortalError>),
    /// A debug panel widget changed one of its colours.
    SetDebugColor { name: String, value: String },
}

impl Debug for PortalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(result) => f
                .debug_tuple("Initialized")
                .field(&result.as_ref().map(|_| "Graphics"))
                .finish(),
            Self::ModelLoaded(result) => f
                .debug_tuple("ModelLoaded")
                .field(&result.as_ref().map(|model| model.children.len()))
                .finish(),
            Self::TextureLoaded(result) => f
                .debug_tuple("TextureLoaded")
                .field(&result.as_ref().map(|_| "Texture"))
                .finish(),
            Self::SetDebugColor { name, value } => f
                .debug_struct("SetDebugColor")
                .field("name", name)
                .field("value", value)
                .finish(),
        }
    }
}

/// Everything that exists once the window has a GPU behind it.
#[derive(Debug)]
pub struct Graphics {
    ctx: Context,
    renderer: Renderer,
    state: PortalState,
    /// Set once the surface has been configured with a non-zero size.
    is_surface_configured: bool,
    #[cfg(not(target_arch = "wasm32"))]
    gui: DebugGui,
}

impl Graphics {
    async fn new(window: Arc<Window>, config: &PortalConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let scale = ctx.window.scale_factor() as f32;
        let size = ctx.window.inner_size();
        let viewport = Viewport::new(
            size.width as f32 / scale,
            size.height as f32 / scale,
            scale,
        );
        let state = PortalState::new(config, viewport);
        let renderer = Renderer::new(&ctx, &state, viewport.startup().render_size);
        #[cfg(not(target_arch = "wasm32"))]
        let gui = DebugGui::new(&ctx);
        Ok(Self {
            ctx,
            renderer,
            state,
            is_surface_configured: false,
            #[cfg(not(target_arch = "wasm32"))]
            gui,
        })
    }

    /// Configure the surface to the window's current size.
    fn configure_surface(&mut self) {
        let size = self.ctx.window.inner_size();
        self.is_surface_configured = self.ctx.resize([size.width, size.height]);
        if !self.is_surface_configured {
            log::debug!("surface not configured yet: window is {}x{}", size.width, size.height);
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let scale = self.ctx.window.scale_factor() as f32;
        let outcome = self.state.on_resize(
            size.width as f32 / scale,
            size.height as f32 / scale,
            scale,
        );
        if self.ctx.resize([size.width, size.height]) {
            self.is_surface_configured = true;
            self.renderer.resize_target(
                &self.ctx.device,
                self.ctx.config.format,
                outcome.render_size,
            );
        }
        log::debug!("resized to {}x{} @{scale}: {outcome:?}", size.width, size.height);
    }
}

/// The wgpu renderer as seen by the frame loop.
struct GpuHost<'a> {
    ctx: &'a Context,
    renderer: &'a mut Renderer,
    configured: bool,
    overlay: Option<&'a mut dyn Overlay>,
}

impl FrameHost<GpuMesh> for GpuHost<'_> {
    type Error = SurfaceError;

    fn is_ready(&self) -> bool {
        self.configured
    }

    fn render(&mut self, state: &PortalState) -> Result<(), Self::Error> {
        let overlay = self
            .overlay
            .as_mut()
            .map(|overlay| &mut **overlay as &mut dyn Overlay);
        self.renderer.render(self.ctx, state, overlay)
    }

    fn request_next_frame(&mut self) {
        self.ctx.window.request_redraw();
    }
}

#[derive(Debug, Default)]
struct Pointer {
    dragging: bool,
    last: Option<PhysicalPosition<f64>>,
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<PortalEvent>,
    config: PortalConfig,
    graphics: Option<Graphics>,
    frame_loop: FrameLoop,
    debug_panel: DebugPanel,
    pointer: Pointer,
}

impl App {
    fn new(event_loop: &EventLoop<PortalEvent>, config: PortalConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(target_arch = "wasm32")]
        PROXY.with_borrow_mut(|slot| *slot = Some(proxy.clone()));
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy,
            debug_panel: DebugPanel::portal_room(&config.debug),
            config,
            graphics: None,
            frame_loop: FrameLoop::new(),
            pointer: Pointer::default(),
        })
    }

    /// Surface setup after the GPU is ready, then start loading the room.
    ///
    /// Colour changes that arrived while the GPU was still starting are
    /// applied here.
    fn on_initialized(&mut self, mut graphics: Graphics) {
        graphics.configure_surface();
        if self.debug_panel.has_deferred() {
            let applied = self.debug_panel.apply_deferred(&mut graphics.state);
            log::info!("applied {applied} colour change(s) made during startup");
        }
        self.spawn_asset_loads(&graphics.ctx);
        graphics.ctx.window.request_redraw();
        self.graphics = Some(graphics);
    }

    fn spawn_asset_loads(&self, ctx: &Context) {
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();
        let assets = self.config.assets.clone();
        let proxy = self.proxy.clone();
        log::info!(
            "loading {} and {} (decoder path {})",
            assets.model,
            assets.baked_texture,
            assets.decoder
        );
        let load = async move {
            let (model, texture) = futures::join!(
                load_model_gltf(&assets.model, &device),
                load_texture(&assets.baked_texture, &device, &queue),
            );
            for event in [
                PortalEvent::TextureLoaded(texture),
                PortalEvent::ModelLoaded(model),
            ] {
                if proxy.send_event(event).is_err() {
                    log::warn!("event loop closed before the assets arrived");
                }
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(load);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load);
    }

    fn render_frame(&mut self) {
        let Some(graphics) = &mut self.graphics else {
            return;
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let controls: Vec<_> = self
                .debug_panel
                .controls()
                .map(|(name, color)| (name.to_string(), color))
                .collect();
            for edit in graphics.gui.run(&graphics.ctx.window, &controls) {
                if self.proxy.send_event(edit.into()).is_err() {
                    log::warn!("event loop closed, dropping colour change");
                }
            }
        }

        let Graphics {
            ctx,
            renderer,
            state,
            is_surface_configured,
            #[cfg(not(target_arch = "wasm32"))]
            gui,
        } = graphics;
        #[cfg(not(target_arch = "wasm32"))]
        let overlay: Option<&mut dyn Overlay> = Some(gui);
        #[cfg(target_arch = "wasm32")]
        let overlay: Option<&mut dyn Overlay> = None;
        let mut host = GpuHost {
            ctx: &*ctx,
            renderer,
            configured: *is_surface_configured,
            overlay,
        };
        match self.frame_loop.tick(state, &mut host) {
            Ok(_) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(e) if e.needs_reconfigure() => {
                let size = ctx.window.inner_size();
                *is_surface_configured = ctx.resize([size.width, size.height]);
            }
            Err(e @ (SurfaceError::Timeout | SurfaceError::Occluded)) => {
                log::debug!("skipped frame: {e}")
            }
            Err(e) => log::error!("Unable to render {e}"),
        }
    }
}

impl ApplicationHandler<PortalEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Portal Room");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create the window: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self
                .async_runtime
                .block_on(Graphics::new(window, &self.config))
            {
                Ok(graphics) => self.on_initialized(graphics),
                Err(e) => {
                    log::error!("App initialization failed: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let graphics = Graphics::new(window, &config).await;
                if proxy.send_event(PortalEvent::Initialized(graphics)).is_err() {
                    log::warn!("event loop closed during initialization");
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: PortalEvent) {
        log::debug!("{event:?}");
        match event {
            #[cfg(target_arch = "wasm32")]
            PortalEvent::Initialized(result) => match result {
                Ok(graphics) => self.on_initialized(graphics),
                Err(e) => log::error!("App initialization failed: {e:#}"),
            },
            PortalEvent::ModelLoaded(result) => {
                let Some(graphics) = &mut self.graphics else {
                    log::warn!("dropping room model: no GPU context");
                    return;
                };
                match result.and_then(|model| graphics.state.attach_model(model)) {
                    Ok(()) => log::info!("room model ready"),
                    Err(e) => log::error!("room model unavailable: {:#}", anyhow::Error::from(e)),
                }
            }
            PortalEvent::TextureLoaded(result) => {
                let Some(graphics) = &mut self.graphics else {
                    log::warn!("dropping baked texture: no GPU context");
                    return;
                };
                match result {
                    Ok(texture) => {
                        graphics
                            .renderer
                            .set_baked_texture(&graphics.ctx.device, &texture);
                        log::info!("baked texture ready");
                    }
                    Err(e) => {
                        log::error!("baked texture unavailable: {:#}", anyhow::Error::from(e))
                    }
                }
            }
            PortalEvent::SetDebugColor { name, value } => {
                let state = self.graphics.as_mut().map(|graphics| &mut graphics.state);
                if let Err(e) = self.debug_panel.set_or_defer(state, &name, &value) {
                    log::warn!("{e}");
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(graphics) = &mut self.graphics else {
            return;
        };

        #[cfg(not(target_arch = "wasm32"))]
        let consumed = graphics.gui.on_window_event(&graphics.ctx.window, &event);
        #[cfg(target_arch = "wasm32")]
        let consumed = {
            let _ = graphics;
            false
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(graphics) = &mut self.graphics {
                    graphics.resize(size);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(),
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                // Presses on the panel never start an orbit drag.
                self.pointer.dragging = button_state == ElementState::Pressed && !consumed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last), Some(graphics)) =
                    (self.pointer.dragging, self.pointer.last, &mut self.graphics)
                {
                    graphics.state.camera.controls.handle_drag(
                        (position.x - last.x) as f32,
                        (position.y - last.y) as f32,
                        graphics.ctx.config.height as f32,
                    );
                }
                self.pointer.last = Some(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.dragging = false;
                self.pointer.last = None;
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_NOTCH) as f32,
                };
                if let Some(graphics) = &mut self.graphics {
                    graphics.state.camera.controls.handle_scroll(notches);
                }
            }
            _ => {}
        }
    }
}

#[cfg(target_arch = "wasm32")]
thread_local! {
    static PROXY: std::cell::RefCell<Option<EventLoopProxy<PortalEvent>>> =
        const { std::cell::RefCell::new(None) };
}

/// Entry point for the page's debug panel: set one colour control.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_debug_color(name: String, value: String) -> Result<(), JsValue> {
    PROXY.with_borrow(|proxy| match proxy {
        Some(proxy) => proxy
            .send_event(PortalEvent::SetDebugColor { name, value })
            .map_err(|e| JsValue::from_str(&e.to_string())),
        None => Err(JsValue::from_str("the portal room is not running")),
    })
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

/// Open the portal room with the default configuration.
pub fn run() -> anyhow::Result<()> {
    run_with(PortalConfig::default())
}

pub fn run_with(config: PortalConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)?;
    }

    let event_loop: EventLoop<PortalEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
