mod camera;
mod egui_host;
mod egui_overlay;
mod gpu;
pub mod pick;
mod wireframe;

pub use camera::{CameraPose, FirstPersonRig, PointerLockRig, Projection};
pub use egui_overlay::OverlayRenderer;
pub use gpu::RenderError;

use crate::app::ViewMode;
use crate::scene::{ObjectId, SceneObject};
use crate::ui::OverlayState;
use pick::Ray;

/// Everything a backend needs to draw one frame after the interaction tick.
pub struct FrameView<'a> {
    pub pose: CameraPose,
    /// Ray through the screen center for this frame's pose.
    pub aim_ray: Ray,
    pub objects: &'a [SceneObject],
    pub highlighted: Option<ObjectId>,
    pub selected: Option<ObjectId>,
    pub mode: ViewMode,
    pub captured: bool,
    pub overlay: &'a OverlayState,
    pub elapsed: f32,
}

impl FrameView<'_> {
    /// Object drawn with the selection outline, if any.
    pub fn outlined(&self) -> Option<&SceneObject> {
        let id = match self.mode {
            ViewMode::SceneView => self.highlighted?,
            ViewMode::ModelView => self.selected?,
        };
        self.objects.iter().find(|object| object.id == id)
    }

    /// Distance along the aim ray to the outlined object.
    pub fn outlined_distance(&self) -> Option<f32> {
        let id = self.outlined()?.id;
        pick::intersect_all(&self.aim_ray, self.objects, f32::MAX)
            .into_iter()
            .find(|(hit_id, _)| *hit_id == id)
            .map(|(_, hit)| hit.distance)
    }
}

pub trait FrameRenderer {
    fn render(&mut self, frame: &FrameView<'_>);
}
