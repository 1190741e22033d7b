//! Window frame backend.
//!
//! Every frame is built as egui shapes: the scene wireframe on the background
//! layer, then the reticle, capture prompt and status line. The tessellated
//! result is painted through [`GpuSurface`]. The window title mirrors the
//! prompt, the aimed-at object and the status line.

use super::egui_host::EguiHost;
use super::gpu::{GpuSurface, RenderError};
use super::{wireframe, FrameRenderer, FrameView};
use crate::app::ViewMode;
use std::sync::Arc;
use winit::event::WindowEvent;
use winit::window::Window;

/// `base - prompt or focus - status`, skipping empty parts.
pub fn window_title(base: &str, frame: &FrameView<'_>) -> String {
    let mut parts = vec![base.to_string()];
    let focus = frame.outlined().map(|object| &object.name);
    if frame.overlay.prompt_visible() {
        parts.push("click to explore".to_string());
    } else if frame.mode == ViewMode::ModelView {
        if let Some(name) = focus {
            parts.push(format!("inspecting {} (Esc to return)", name));
        }
    } else if let Some(name) = focus {
        match frame.outlined_distance() {
            Some(distance) => parts.push(format!("{} at {:.1} m", name, distance)),
            None => parts.push(name.clone()),
        }
    }
    if !frame.overlay.status().is_empty() {
        parts.push(frame.overlay.status().to_string());
    }
    parts.join(" - ")
}

pub struct OverlayRenderer {
    window: Arc<Window>,
    egui: EguiHost,
    gpu: GpuSurface,
    base_title: String,
    last_title: String,
    frame_index: u64,
}

impl OverlayRenderer {
    pub fn new(window: Arc<Window>, base_title: String) -> Result<Self, RenderError> {
        let gpu = GpuSurface::new(window.clone())?;
        let egui = EguiHost::new(&window);
        Ok(Self {
            window,
            egui,
            gpu,
            base_title,
            last_title: String::new(),
            frame_index: 0,
        })
    }

    pub fn on_window_event(&mut self, event: &WindowEvent) {
        self.egui.on_window_event(&self.window, event);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    fn sync_title(&mut self, title: String) {
        if title != self.last_title {
            self.window.set_title(&title);
            self.last_title = title;
        }
    }
}

impl FrameRenderer for OverlayRenderer {
    fn render(&mut self, frame: &FrameView<'_>) {
        self.frame_index = self.frame_index.wrapping_add(1);
        let output = self.egui.run_ui(&self.window, frame.captured, |ctx| {
            let shapes = wireframe::scene_shapes(frame, ctx.screen_rect());
            ctx.layer_painter(egui::LayerId::background()).extend(shapes);
            frame.overlay.draw(ctx);
        });

        log::trace!(
            "frame {}: {} objects, outline={:?}, mode={:?}, {} primitives",
            self.frame_index,
            frame.objects.len(),
            frame.outlined().map(|object| object.id),
            frame.mode,
            output.clipped_primitives.len(),
        );

        if let Err(err) = self.gpu.paint(&output) {
            log::warn!("Frame {} not presented: {}", self.frame_index, err);
        }
        self.sync_title(window_title(&self.base_title, frame));
    }
}
