use crate::app::ViewMode;
use crate::scene::ObjectId;

const RETICLE_IDLE_PX: f32 = 3.0;
const RETICLE_HOVER_PX: f32 = 54.0;
const RETICLE_HOVER_ALPHA: f32 = 0.4;
const RETICLE_TWEEN_SECS: f32 = 0.2;

/// Visual cue emitted by the interaction core. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    HighlightEntered(ObjectId),
    HighlightExited(ObjectId),
    ModeEntered(ViewMode),
    ModeExited(ViewMode),
    PromptShown,
    PromptHidden,
}

pub trait EffectSink {
    fn cue(&mut self, cue: Cue);
}

#[cfg(test)]
impl EffectSink for Vec<Cue> {
    fn cue(&mut self, cue: Cue) {
        self.push(cue);
    }
}

/// Linear ease from the current value to a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl Tween {
    pub fn settled(value: f32, duration: f32) -> Self {
        Self {
            from: value,
            to: value,
            elapsed: duration,
            duration,
        }
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn retarget(&mut self, to: f32) {
        if (to - self.to).abs() <= f32::EPSILON {
            return;
        }
        self.from = self.value();
        self.to = to;
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
    }
}

/// Cursor reticle, capture prompt and status line.
#[derive(Debug, Clone)]
pub struct OverlayState {
    reticle_size: Tween,
    reticle_alpha: Tween,
    hovering: bool,
    inspecting: bool,
    prompt_visible: bool,
    status: String,
}

impl OverlayState {
    pub fn new() -> Self {
        Self {
            reticle_size: Tween::settled(RETICLE_IDLE_PX, RETICLE_TWEEN_SECS),
            reticle_alpha: Tween::settled(0.0, RETICLE_TWEEN_SECS),
            hovering: false,
            inspecting: false,
            prompt_visible: true,
            status: String::new(),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.reticle_size.advance(dt);
        self.reticle_alpha.advance(dt);
    }

    pub fn reticle_size(&self) -> f32 {
        self.reticle_size.value()
    }

    pub fn reticle_alpha(&self) -> f32 {
        self.reticle_alpha.value()
    }

    pub fn reticle_visible(&self) -> bool {
        !self.inspecting
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }

    fn retarget_reticle(&mut self) {
        if self.hovering {
            self.reticle_size.retarget(RETICLE_HOVER_PX);
            self.reticle_alpha.retarget(RETICLE_HOVER_ALPHA);
        } else {
            self.reticle_size.retarget(RETICLE_IDLE_PX);
            self.reticle_alpha.retarget(0.0);
        }
    }

    pub fn draw(&self, ctx: &egui::Context) {
        let screen = ctx.screen_rect();
        if self.reticle_visible() {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("reticle"),
            ));
            let fill = egui::Color32::from_black_alpha((self.reticle_alpha() * 255.0) as u8);
            painter.circle(
                screen.center(),
                self.reticle_size() * 0.5,
                fill,
                egui::Stroke::new(1.0, egui::Color32::WHITE),
            );
        }

        if self.prompt_visible {
            egui::Area::new(egui::Id::new("capture_prompt"))
                .interactable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.heading("Click to explore");
                    ui.label("WASD to move, mouse to look, Esc to release the pointer");
                });
        } else if self.inspecting {
            egui::Area::new(egui::Id::new("inspect_hint"))
                .interactable(false)
                .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
                .show(ctx, |ui| {
                    ui.label("Esc to return");
                });
        }

        if !self.status.is_empty() {
            egui::Area::new(egui::Id::new("status_line"))
                .interactable(false)
                .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
                .show(ctx, |ui| {
                    ui.label(egui::RichText::new(&self.status).monospace());
                });
        }
    }
}

impl EffectSink for OverlayState {
    fn cue(&mut self, cue: Cue) {
        match cue {
            Cue::HighlightEntered(_) => self.hovering = true,
            Cue::HighlightExited(_) => self.hovering = false,
            Cue::ModeEntered(ViewMode::ModelView) => self.inspecting = true,
            Cue::ModeExited(ViewMode::ModelView) => self.inspecting = false,
            Cue::ModeEntered(ViewMode::SceneView) | Cue::ModeExited(ViewMode::SceneView) => {}
            Cue::PromptShown => self.prompt_visible = true,
            Cue::PromptHidden => self.prompt_visible = false,
        }
        self.retarget_reticle();
    }
}
