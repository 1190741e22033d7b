use super::input::KeyState;
use super::timing::FrameTiming;
use super::view_mode::ViewModeController;
use crate::config::{validate_frame_delta, ConfigError};
use crate::render::{FrameRenderer, FrameView, PointerLockRig};
use crate::scene::SceneState;
use crate::ui::OverlayState;
use glam::Vec2;
use std::time::Instant;

/// Drives one interaction tick per rendered frame.
pub struct FrameOrchestrator {
    timing: FrameTiming,
}

impl FrameOrchestrator {
    pub fn new(max_frame_dt: f32) -> Result<Self, ConfigError> {
        validate_frame_delta(max_frame_dt)?;
        Ok(Self {
            timing: FrameTiming::new(max_frame_dt),
        })
    }

    /// Returns the elapsed seconds used for this tick.
    pub fn tick<R: PointerLockRig>(
        &mut self,
        now: Instant,
        controller: &mut ViewModeController<R>,
        keys: &KeyState,
        scene: &SceneState,
        overlay: &mut OverlayState,
        renderer: &mut dyn FrameRenderer,
    ) -> f32 {
        let elapsed = self.timing.update(now);

        controller.tick(keys, scene.objects(), elapsed, overlay);
        overlay.advance(elapsed);

        let rig = controller.rig();
        let pose = rig.pose();
        let aim_ray = rig.aim_ray(Vec2::ZERO);
        if let Some(status) = self.timing.status_line(now, pose.position) {
            overlay.set_status(status);
        }

        renderer.render(&FrameView {
            pose,
            aim_ray,
            objects: scene.objects(),
            highlighted: controller.highlighted(),
            selected: controller.selected(),
            mode: controller.mode(),
            captured: controller.is_captured(),
            overlay: &*overlay,
            elapsed,
        });
        elapsed
    }
}
