use winit::event::WindowEvent;
use winit::window::Window;

/// Tessellated egui output ready for the GPU.
pub struct OverlayFrame {
    pub clipped_primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// egui context bound to the main window.
pub struct EguiHost {
    context: egui::Context,
    winit_state: egui_winit::State,
}

impl EguiHost {
    pub fn new(window: &Window) -> Self {
        let context = egui::Context::default();
        let winit_state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        Self {
            context,
            winit_state,
        }
    }

    /// Feed a window event to egui. The overlay has no widgets to focus, so
    /// whether egui wanted the event is not reported back.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) {
        let _ = self.winit_state.on_window_event(window, event);
    }

    /// Build one frame. Platform output (cursor icon, visibility) is only
    /// applied when the pointer is free; while captured the host owns the
    /// cursor.
    pub fn run_ui<F>(&mut self, window: &Window, pointer_captured: bool, run_ui: F) -> OverlayFrame
    where
        F: FnMut(&egui::Context),
    {
        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.context.run(raw_input, run_ui);
        if !pointer_captured {
            self.winit_state
                .handle_platform_output(window, full_output.platform_output);
        }
        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, pixels_per_point);

        OverlayFrame {
            clipped_primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point,
        }
    }
}
