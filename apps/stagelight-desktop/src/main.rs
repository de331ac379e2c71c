use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use stagelight_driver::{controls, Bindings, ControlState, FrameDriver, FrameTimer};
use stagelight_input::{OrbitAction, PointerButton, PointerTracker};
use stagelight_render_wgpu::{OrbitCamera, SceneFramePass, WgpuSceneRenderer};
use stagelight_scene::{SceneGraph, ScenePreset};
use stagelight_tools::SceneInspector;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "stagelight-desktop", about = "Interactive stagelight scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene preset to load
    #[arg(long, default_value = "studio")]
    preset: ScenePreset,
}

/// Application state.
struct AppState {
    scene: SceneGraph,
    driver: FrameDriver,
    controls: ControlState,
    camera: OrbitCamera,
    tracker: PointerTracker,
    timer: FrameTimer,
    preset: ScenePreset,
    /// Eye position the preset suggests; "reset view" returns here.
    home_eye: Vec3,
    show_panel: bool,
    /// Origin for the monotonic frame timestamps handed to the driver.
    started: Instant,
}

impl AppState {
    fn new(preset: ScenePreset) -> Result<Self> {
        let built = preset.build();
        let bindings = Bindings::from_preset(&built)?;

        let mut camera = OrbitCamera::default();
        camera.look_from(built.eye);

        Ok(Self {
            scene: built.scene,
            driver: FrameDriver::new(bindings),
            controls: ControlState::default(),
            camera,
            tracker: PointerTracker::new(),
            timer: FrameTimer::new(60),
            preset,
            home_eye: built.eye,
            show_panel: true,
            started: Instant::now(),
        })
    }

    /// Milliseconds since the app started; the timestamp the driver sees.
    fn timestamp_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Apply queued pointer gestures to the camera.
    fn update_camera(&mut self) {
        for action in self.tracker.drain() {
            match action {
                OrbitAction::Orbit(delta) => self.camera.orbit(delta.x, delta.y),
                OrbitAction::Pan(delta) => self.camera.pan(delta.x, delta.y),
                OrbitAction::Zoom(steps) => self.camera.zoom(steps),
            }
        }
    }

    fn reset_view(&mut self) {
        self.camera.look_from(self.home_eye);
        tracing::info!("camera reset");
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool, event_loop: &ActiveEventLoop) {
        if !pressed {
            return;
        }
        match key {
            KeyCode::F1 => {
                self.show_panel = !self.show_panel;
            }
            KeyCode::KeyR => {
                self.reset_view();
            }
            KeyCode::Escape => {
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = SceneInspector::summary(&self.scene);

        egui::SidePanel::left("controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Stagelight");
                ui.separator();
                ui.label(format!("Preset: {}", self.preset));
                ui.label(format!("{:.0} fps", self.timer.fps()));
                ui.label(format!(
                    "Nodes: {} ({} meshes, {} lights)",
                    summary.nodes, summary.meshes, summary.lights
                ));
                ui.separator();

                ui.heading("Sphere");
                let mut rgb = self.controls.sphere_color.to_array();
                ui.horizontal(|ui| {
                    if ui.color_edit_button_rgb(&mut rgb).changed() {
                        self.controls.sphere_color = rgb.into();
                    }
                    ui.label("color");
                });
                ui.checkbox(&mut self.controls.wireframe, "wireframe");
                ui.add(
                    egui::Slider::new(&mut self.controls.speed, controls::SPEED_RANGE)
                        .text("speed"),
                );

                ui.separator();
                ui.heading("Spot light");
                ui.add(
                    egui::Slider::new(&mut self.controls.angle, controls::ANGLE_RANGE)
                        .text("angle"),
                );
                ui.add(
                    egui::Slider::new(&mut self.controls.penumbra, controls::PENUMBRA_RANGE)
                        .text("penumbra"),
                );
                ui.add(
                    egui::Slider::new(&mut self.controls.intensity, controls::INTENSITY_RANGE)
                        .text("intensity"),
                );

                ui.separator();
                if ui.button("Reset view (R)").clicked() {
                    self.reset_view();
                }
                ui.small("F1: Toggle panel | LMB: Orbit | RMB: Pan | Wheel: Zoom");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuSceneRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Stagelight")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("stagelight_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = size.width as f32 / size.height.max(1) as f32;

        let renderer = WgpuSceneRenderer::new(&device, surface_format, size.width, size.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(egui_winit) = &mut self.egui_winit {
            let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.camera.aspect = config.width as f32 / config.height.max(1) as f32;
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed, event_loop);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let mapped = match button {
                    MouseButton::Left => Some(PointerButton::Primary),
                    MouseButton::Right => Some(PointerButton::Secondary),
                    _ => None,
                };
                if let Some(mapped) = mapped {
                    self.state
                        .tracker
                        .set_button(mapped, state == ElementState::Pressed);
                    if let Some(window) = &self.window {
                        window.set_cursor_visible(!self.state.tracker.dragging());
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.state.tracker.scroll(steps);
            }
            WindowEvent::RedrawRequested => {
                self.state.timer.tick();
                self.state.update_camera();

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                // The frame tick: controls, transforms, one render call.
                if let Some(renderer) = &self.renderer {
                    let mut pass = SceneFramePass {
                        renderer,
                        device,
                        queue,
                        view: &view,
                    };
                    let timestamp = self.state.timestamp_ms();
                    let render_view = self.state.camera.render_view();
                    self.state.driver.on_frame(
                        &mut self.state.scene,
                        &self.state.controls,
                        timestamp,
                        &mut pass,
                        &render_view,
                    );
                }

                let raw_input = self
                    .egui_winit
                    .as_mut()
                    .unwrap()
                    .take_egui_input(self.window.as_ref().unwrap());
                let full_output = self.egui_ctx.run(raw_input, |ctx| {
                    self.state.draw_ui(ctx);
                });

                self.egui_winit.as_mut().unwrap().handle_platform_output(
                    self.window.as_ref().unwrap(),
                    full_output.platform_output,
                );

                let paint_jobs = self
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [
                        self.config.as_ref().unwrap().width,
                        self.config.as_ref().unwrap().height,
                    ],
                    pixels_per_point: full_output.pixels_per_point,
                };

                {
                    let egui_renderer = self.egui_renderer.as_mut().unwrap();
                    for (id, image_delta) in &full_output.textures_delta.set {
                        egui_renderer.update_texture(device, queue, *id, image_delta);
                    }
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("egui_encoder"),
                        });
                    egui_renderer.update_buffers(
                        device,
                        queue,
                        &mut encoder,
                        &paint_jobs,
                        &screen_descriptor,
                    );
                    {
                        let mut pass = encoder
                            .begin_render_pass(&wgpu::RenderPassDescriptor {
                                label: Some("egui_pass"),
                                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                    view: &view,
                                    resolve_target: None,
                                    ops: wgpu::Operations {
                                        load: wgpu::LoadOp::Load,
                                        store: wgpu::StoreOp::Store,
                                    },
                                })],
                                depth_stencil_attachment: None,
                                ..Default::default()
                            })
                            .forget_lifetime();
                        egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
                    }
                    queue.submit(std::iter::once(encoder.finish()));
                    for id in &full_output.textures_delta.free {
                        egui_renderer.free_texture(id);
                    }
                }

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.tracker.motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(preset = %cli.preset, "stagelight-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let state = AppState::new(cli.preset)?;
    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
