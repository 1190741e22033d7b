mod frame;
mod input;
mod locomotion;
mod timing;
mod view_mode;

pub use frame::FrameOrchestrator;
pub use view_mode::{CaptureRequest, ViewEvent, ViewMode, ViewModeController};

use crate::config::{ConfigError, TourConfig};
use crate::render::pick::Picker;
use crate::render::{FirstPersonRig, OverlayRenderer, Projection, RenderError};
use crate::scene::SceneState;
use crate::ui::OverlayState;
use glam::Vec3;
use input::KeyState;
use locomotion::LocomotionController;

use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "Scene Tour";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to set up rendering: {0}")]
    Render(#[from] RenderError),
}

/// While walking with the pointer captured, the exit key gives the pointer
/// back instead of being routed to the mode machine.
fn exit_key_releases_capture(mode: ViewMode, captured: bool, key: &str, exit_key: &str) -> bool {
    mode == ViewMode::SceneView && captured && key == exit_key
}

struct App {
    scene: SceneState,
    controller: ViewModeController<FirstPersonRig>,
    orchestrator: FrameOrchestrator,
    keys: KeyState,
    overlay: OverlayState,
    window: Option<Arc<Window>>,
    renderer: Option<OverlayRenderer>,
    target_frame_duration: Duration,
    next_frame_time: Instant,
    error: Option<AppError>,
}

impl App {
    fn new(config: TourConfig, scene: SceneState) -> Result<Self, AppError> {
        config.validate()?;

        let rig = FirstPersonRig::new(
            Vec3::from_array(config.start_position),
            Projection {
                fov_y_deg: config.fov_y_deg,
                aspect: 16.0 / 9.0,
                near: config.near,
                far: config.far,
            },
        );
        let locomotion =
            LocomotionController::new(rig, config.move_speed, config.bindings.clone())?;
        let controller = ViewModeController::new(
            locomotion,
            Picker::new(config.pick_range)?,
            config.exit_key.clone(),
            config.look_sensitivity,
        )?;
        let orchestrator = FrameOrchestrator::new(config.max_frame_dt)?;

        Ok(Self {
            scene,
            controller,
            orchestrator,
            keys: KeyState::new(),
            overlay: OverlayState::new(),
            window: None,
            renderer: None,
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
            error: None,
        })
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.controller
            .locomotion_mut()
            .rig_mut()
            .set_viewport(new_size.width, new_size.height);
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(new_size.width, new_size.height);
        }
    }

    fn dispatch(&mut self, event: ViewEvent) {
        let request = self.controller.handle(event, &mut self.overlay);
        self.apply_capture(request);
    }

    /// Left click. The overlay has no widgets, so a click always reaches the
    /// mode machine, including one that lands on the capture prompt.
    fn pointer_confirm(&mut self) -> Option<CaptureRequest> {
        let request = self.controller.handle(ViewEvent::PointerConfirm, &mut self.overlay);
        self.apply_capture(request);
        request
    }

    /// Carry out a capture change on the window and report the outcome back.
    fn apply_capture(&mut self, request: Option<CaptureRequest>) {
        let (Some(request), Some(window)) = (request, self.window.clone()) else {
            return;
        };
        match request {
            CaptureRequest::Acquire => {
                let grabbed = window
                    .set_cursor_grab(CursorGrabMode::Locked)
                    .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
                match grabbed {
                    Ok(()) => {
                        window.set_cursor_visible(false);
                        self.dispatch(ViewEvent::CaptureAcquired);
                    }
                    Err(err) => log::warn!("Pointer capture refused: {}", err),
                }
            }
            CaptureRequest::Release => {
                if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                    log::warn!("Failed to release pointer: {}", err);
                }
                window.set_cursor_visible(true);
                self.dispatch(ViewEvent::CaptureLost);
            }
        }
    }

    fn render(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        self.orchestrator.tick(
            Instant::now(),
            &mut self.controller,
            &self.keys,
            &self.scene,
            &mut self.overlay,
            renderer,
        );
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(1280u32, 720u32))
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                self.error = Some(err.into());
                event_loop.exit();
                return;
            }
        };

        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let renderer = match OverlayRenderer::new(window.clone(), WINDOW_TITLE.to_string()) {
            Ok(renderer) => renderer,
            Err(err) => {
                log::error!("Failed to set up rendering: {}", err);
                self.error = Some(err.into());
                event_loop.exit();
                return;
            }
        };
        self.renderer = Some(renderer);
        self.handle_resize(window.inner_size());
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(renderer) = &mut self.renderer {
            renderer.on_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                event_loop.exit();
            }
            WindowEvent::Focused(false) => {
                if self.controller.is_captured() {
                    self.apply_capture(Some(CaptureRequest::Release));
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let Some(key) = self.keys.handle_key(&event.logical_key, event.state) else {
                    return;
                };
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let release = exit_key_releases_capture(
                    self.controller.mode(),
                    self.controller.is_captured(),
                    &key,
                    self.controller.exit_key(),
                );
                self.dispatch(ViewEvent::KeyPressed(key));
                if release {
                    self.apply_capture(Some(CaptureRequest::Release));
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.pointer_confirm();
            }
            WindowEvent::Resized(new_size) => {
                log::debug!("Window resized to {}x{}", new_size.width, new_size.height);
                self.handle_resize(new_size);
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.controller
                .on_pointer_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run(config: TourConfig, scene: SceneState) -> Result<(), AppError> {
    log::info!(
        "Touring {} objects; click to capture the pointer, {} to release",
        scene.objects().len(),
        config.exit_key
    );

    let mut app = App::new(config, scene)?;
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
