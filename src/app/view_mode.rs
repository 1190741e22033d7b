//! Free-roam / inspect mode machine.
//!
//! The controller owns the mode, the locomotion rig and the picker. It never
//! touches the OS cursor: when capture must change it hands a
//! [`CaptureRequest`] back to the host, and the host reports the outcome as a
//! [`ViewEvent`].

use super::input::KeyState;
use super::locomotion::LocomotionController;
use crate::config::{normalize_binding, validate_look_sensitivity, ConfigError};
use crate::render::pick::{Pickable, Picker};
use crate::render::PointerLockRig;
use crate::scene::ObjectId;
use crate::ui::{Cue, EffectSink};
use glam::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Walking around with the aim reticle.
    #[default]
    SceneView,
    /// Focused on a selected object.
    ModelView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    PointerConfirm,
    KeyPressed(String),
    CaptureAcquired,
    CaptureLost,
}

/// Host action needed to keep OS pointer capture in step with the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRequest {
    Acquire,
    Release,
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// Hooks run when entering and leaving the inspect view, e.g. framing the
/// selected object and restoring the walk camera afterwards.
pub trait InspectTransition {
    fn enter(&mut self, camera_position: Vec3, object: ObjectId) -> Result<(), TransitionError>;
    fn leave(&mut self) -> Result<(), TransitionError>;
}

/// Leaves the camera where it is.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnframedInspect;

impl InspectTransition for UnframedInspect {
    fn enter(&mut self, _camera_position: Vec3, _object: ObjectId) -> Result<(), TransitionError> {
        Err(TransitionError::NotImplemented("inspect camera framing"))
    }

    fn leave(&mut self) -> Result<(), TransitionError> {
        Err(TransitionError::NotImplemented("walk camera restore"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    EnterModelView(ObjectId),
    ExitModelView,
    RequestCapture,
    Engage,
    Suspend,
    Ignore,
}

fn transition(
    mode: ViewMode,
    captured: bool,
    highlighted: Option<ObjectId>,
    event: &ViewEvent,
    exit_key: &str,
) -> Transition {
    match (mode, event) {
        (ViewMode::SceneView, ViewEvent::PointerConfirm) => match (captured, highlighted) {
            (false, _) => Transition::RequestCapture,
            (true, Some(id)) => Transition::EnterModelView(id),
            (true, None) => Transition::Ignore,
        },
        (ViewMode::ModelView, ViewEvent::PointerConfirm) => Transition::Ignore,
        (ViewMode::ModelView, ViewEvent::KeyPressed(key)) if key == exit_key => {
            Transition::ExitModelView
        }
        (_, ViewEvent::KeyPressed(_)) => Transition::Ignore,
        (ViewMode::SceneView, ViewEvent::CaptureAcquired) if !captured => Transition::Engage,
        (ViewMode::SceneView, ViewEvent::CaptureLost) if captured => Transition::Suspend,
        (_, ViewEvent::CaptureAcquired | ViewEvent::CaptureLost) => Transition::Ignore,
    }
}

pub struct ViewModeController<R> {
    mode: ViewMode,
    locomotion: LocomotionController<R>,
    picker: Picker,
    selected: Option<ObjectId>,
    exit_key: String,
    look_sensitivity: f32,
    inspect: Box<dyn InspectTransition>,
}

impl<R: PointerLockRig> ViewModeController<R> {
    pub fn new(
        locomotion: LocomotionController<R>,
        picker: Picker,
        exit_key: String,
        look_sensitivity: f32,
    ) -> Result<Self, ConfigError> {
        validate_look_sensitivity(look_sensitivity)?;
        if exit_key.trim().is_empty() {
            return Err(ConfigError::EmptyBinding("exit"));
        }
        Ok(Self {
            mode: ViewMode::SceneView,
            locomotion,
            picker,
            selected: None,
            exit_key: normalize_binding(&exit_key),
            look_sensitivity,
            inspect: Box::new(UnframedInspect),
        })
    }

    pub fn with_inspect(mut self, inspect: Box<dyn InspectTransition>) -> Self {
        self.inspect = inspect;
        self
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_captured(&self) -> bool {
        self.locomotion.is_capturing()
    }

    pub fn highlighted(&self) -> Option<ObjectId> {
        self.picker.highlighted()
    }

    /// Last object confirmed for inspection. Kept after returning to the walk.
    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn exit_key(&self) -> &str {
        &self.exit_key
    }

    pub fn rig(&self) -> &R {
        self.locomotion.rig()
    }

    pub fn locomotion_mut(&mut self) -> &mut LocomotionController<R> {
        &mut self.locomotion
    }

    /// Capture may only be asked for while walking.
    pub fn request_capture(&self) -> Option<CaptureRequest> {
        match self.mode {
            ViewMode::SceneView if !self.is_captured() => Some(CaptureRequest::Acquire),
            ViewMode::SceneView | ViewMode::ModelView => None,
        }
    }

    pub fn handle(&mut self, event: ViewEvent, effects: &mut dyn EffectSink) -> Option<CaptureRequest> {
        let step = transition(
            self.mode,
            self.is_captured(),
            self.picker.highlighted(),
            &event,
            &self.exit_key,
        );
        match step {
            Transition::EnterModelView(id) => {
                log::info!("Inspecting object {}", id);
                self.locomotion.disengage();
                self.selected = Some(id);
                self.mode = ViewMode::ModelView;
                effects.cue(Cue::ModeEntered(ViewMode::ModelView));
                let position = self.locomotion.rig().pose().position;
                if let Err(err) = self.inspect.enter(position, id) {
                    log::debug!("Inspect entry hook skipped: {}", err);
                }
                Some(CaptureRequest::Release)
            }
            Transition::ExitModelView => {
                log::info!("Returning to scene view");
                self.mode = ViewMode::SceneView;
                if let Err(err) = self.inspect.leave() {
                    log::debug!("Inspect exit hook skipped: {}", err);
                }
                effects.cue(Cue::ModeExited(ViewMode::ModelView));
                effects.cue(Cue::PromptShown);
                self.request_capture()
            }
            Transition::RequestCapture => self.request_capture(),
            Transition::Engage => {
                log::debug!("Pointer captured");
                self.locomotion.engage();
                effects.cue(Cue::PromptHidden);
                None
            }
            Transition::Suspend => {
                log::debug!("Pointer capture lost; walking suspended");
                self.locomotion.disengage();
                effects.cue(Cue::PromptShown);
                None
            }
            Transition::Ignore => None,
        }
    }

    /// Raw pointer motion in pixels. Only turns the rig while walking with
    /// the pointer captured.
    pub fn on_pointer_motion(&mut self, dx: f32, dy: f32) {
        if self.mode != ViewMode::SceneView {
            return;
        }
        self.locomotion
            .look(dx * self.look_sensitivity, -dy * self.look_sensitivity);
    }

    /// Movement first, then picking, so the aim ray sees this frame's pose.
    pub fn tick<P: Pickable>(
        &mut self,
        keys: &KeyState,
        candidates: &[P],
        elapsed: f32,
        effects: &mut dyn EffectSink,
    ) {
        match self.mode {
            ViewMode::SceneView if self.is_captured() => {
                self.locomotion.tick(keys, elapsed);
                let ray = self.locomotion.rig().aim_ray(Vec2::ZERO);
                self.picker.tick(&ray, candidates, effects);
            }
            ViewMode::SceneView | ViewMode::ModelView => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::locomotion::tests::RecordingRig;
    use crate::config::MoveBindings;
    use crate::render::pick::{Hit, Ray};

    /// Hit when the ray origin's x lies in [min_x, max_x].
    struct Column {
        id: ObjectId,
        min_x: f32,
        max_x: f32,
    }

    impl Pickable for Column {
        fn id(&self) -> ObjectId {
            self.id
        }
        fn intersects_ray(&self, ray: &Ray) -> Option<Hit> {
            let x = ray.origin.x;
            (x >= self.min_x && x <= self.max_x).then(|| Hit {
                distance: 5.0,
                point: ray.at(5.0),
            })
        }
    }

    fn controller() -> ViewModeController<RecordingRig> {
        let locomotion =
            LocomotionController::new(RecordingRig::default(), 10.0, MoveBindings::default())
                .unwrap();
        ViewModeController::new(
            locomotion,
            Picker::new(100.0).unwrap(),
            "Escape".to_string(),
            0.002,
        )
        .unwrap()
    }

    fn column(id: ObjectId) -> Vec<Column> {
        vec![Column {
            id,
            min_x: -1.0,
            max_x: 1.0,
        }]
    }

    /// Captured and hovering object 7.
    fn hovering() -> (ViewModeController<RecordingRig>, Vec<Column>, Vec<Cue>) {
        let mut vm = controller();
        let mut cues = Vec::new();
        vm.handle(ViewEvent::CaptureAcquired, &mut cues);
        let scene = column(7);
        vm.tick(&KeyState::new(), &scene, 0.016, &mut cues);
        assert_eq!(vm.highlighted(), Some(7));
        (vm, scene, cues)
    }

    #[test]
    fn starts_in_scene_view_uncaptured() {
        let vm = controller();
        assert_eq!(vm.mode(), ViewMode::SceneView);
        assert!(!vm.is_captured());
        assert_eq!(vm.request_capture(), Some(CaptureRequest::Acquire));
    }

    #[test]
    fn click_before_capture_requests_it() {
        let mut vm = controller();
        let mut cues = Vec::new();
        assert_eq!(
            vm.handle(ViewEvent::PointerConfirm, &mut cues),
            Some(CaptureRequest::Acquire)
        );
        assert_eq!(vm.mode(), ViewMode::SceneView);
    }

    #[test]
    fn capture_acquired_hides_prompt_once() {
        let mut vm = controller();
        let mut cues = Vec::new();
        vm.handle(ViewEvent::CaptureAcquired, &mut cues);
        vm.handle(ViewEvent::CaptureAcquired, &mut cues);
        assert!(vm.is_captured());
        assert_eq!(cues, vec![Cue::PromptHidden]);
    }

    #[test]
    fn confirm_without_highlight_keeps_mode() {
        let mut vm = controller();
        let mut cues = Vec::new();
        vm.handle(ViewEvent::CaptureAcquired, &mut cues);
        assert_eq!(vm.handle(ViewEvent::PointerConfirm, &mut cues), None);
        assert_eq!(vm.mode(), ViewMode::SceneView);
        assert!(vm.is_captured());
    }

    #[test]
    fn confirm_on_highlight_enters_model_view() {
        let (mut vm, _scene, mut cues) = hovering();
        let request = vm.handle(ViewEvent::PointerConfirm, &mut cues);
        assert_eq!(request, Some(CaptureRequest::Release));
        assert_eq!(vm.mode(), ViewMode::ModelView);
        assert_eq!(vm.selected(), Some(7));
        assert!(!vm.is_captured());
        assert_eq!(cues.last(), Some(&Cue::ModeEntered(ViewMode::ModelView)));
    }

    #[test]
    fn model_view_ignores_movement_look_and_picking() {
        let (mut vm, scene, mut cues) = hovering();
        vm.handle(ViewEvent::PointerConfirm, &mut cues);
        let before = vm.rig().clone();
        let highlight = vm.highlighted();

        let mut keys = KeyState::new();
        for key in ["w", "a", "s", "d"] {
            keys.press(key);
            vm.handle(ViewEvent::KeyPressed(key.to_string()), &mut cues);
        }
        let empty: Vec<Column> = Vec::new();
        for _ in 0..10 {
            vm.on_pointer_motion(40.0, -25.0);
            vm.tick(&keys, &empty, 0.1, &mut cues);
            vm.tick(&keys, &scene, 0.1, &mut cues);
        }
        vm.handle(ViewEvent::PointerConfirm, &mut cues);
        vm.handle(ViewEvent::CaptureLost, &mut cues);
        vm.handle(ViewEvent::CaptureAcquired, &mut cues);

        assert_eq!(vm.mode(), ViewMode::ModelView);
        assert_eq!(vm.highlighted(), highlight);
        let after = vm.rig();
        assert_eq!(after.forward, before.forward);
        assert_eq!(after.right, before.right);
        assert_eq!(after.yaw, before.yaw);
        assert!(!after.locked);
    }

    #[test]
    fn exit_key_in_scene_view_is_ignored() {
        let (mut vm, _scene, mut cues) = hovering();
        let cue_count = cues.len();
        assert_eq!(
            vm.handle(ViewEvent::KeyPressed("Escape".to_string()), &mut cues),
            None
        );
        assert_eq!(vm.mode(), ViewMode::SceneView);
        assert_eq!(cues.len(), cue_count);
    }

    #[test]
    fn round_trip_restores_capture_path() {
        let (mut vm, scene, mut cues) = hovering();
        vm.handle(ViewEvent::PointerConfirm, &mut cues);
        // Host releases the pointer as asked; the loss is expected here.
        vm.handle(ViewEvent::CaptureLost, &mut cues);

        let request = vm.handle(ViewEvent::KeyPressed("Escape".to_string()), &mut cues);
        assert_eq!(request, Some(CaptureRequest::Acquire));
        assert_eq!(vm.mode(), ViewMode::SceneView);
        assert!(cues.contains(&Cue::ModeExited(ViewMode::ModelView)));
        assert_eq!(cues.last(), Some(&Cue::PromptShown));
        assert_eq!(vm.selected(), Some(7));

        vm.handle(ViewEvent::CaptureAcquired, &mut cues);
        assert!(vm.is_captured());

        let mut keys = KeyState::new();
        keys.press("w");
        vm.tick(&keys, &scene, 0.5, &mut cues);
        assert!((vm.rig().forward - 5.0).abs() < 1e-5);
    }

    #[test]
    fn capture_loss_suspends_walking_until_reacquired() {
        let mut vm = controller();
        let mut cues = Vec::new();
        vm.handle(ViewEvent::CaptureAcquired, &mut cues);
        vm.handle(ViewEvent::CaptureLost, &mut cues);
        assert_eq!(cues.last(), Some(&Cue::PromptShown));

        let mut keys = KeyState::new();
        keys.press("w");
        vm.on_pointer_motion(100.0, 0.0);
        vm.tick(&keys, &column(1), 1.0, &mut cues);
        assert_eq!(vm.rig().forward, 0.0);
        assert_eq!(vm.rig().yaw, 0.0);
        assert_eq!(vm.highlighted(), None);

        vm.handle(ViewEvent::CaptureAcquired, &mut cues);
        vm.tick(&keys, &column(1), 1.0, &mut cues);
        assert!((vm.rig().forward - 10.0).abs() < 1e-5);
    }

    #[test]
    fn movement_runs_before_picking() {
        // Object sits 3 units to the right; strafing there in one tick must
        // highlight it on that same tick.
        let mut vm = controller();
        let mut cues = Vec::new();
        vm.handle(ViewEvent::CaptureAcquired, &mut cues);
        let scene = vec![Column {
            id: 4,
            min_x: 2.5,
            max_x: 3.5,
        }];
        let mut keys = KeyState::new();
        keys.press("d");
        vm.tick(&keys, &scene, 0.3, &mut cues);
        assert_eq!(vm.highlighted(), Some(4));
    }

    #[test]
    fn pointer_motion_turns_while_captured() {
        let mut vm = controller();
        let mut cues = Vec::new();
        vm.handle(ViewEvent::CaptureAcquired, &mut cues);
        vm.on_pointer_motion(100.0, 50.0);
        assert!((vm.rig().yaw - 0.2).abs() < 1e-6);
        assert!((vm.rig().pitch + 0.1).abs() < 1e-6);
    }

    #[test]
    fn custom_inspect_hooks_are_called() {
        use std::cell::RefCell;
        use std::rc::Rc;

        #[derive(Default)]
        struct Log(Rc<RefCell<Vec<String>>>);
        impl InspectTransition for Log {
            fn enter(&mut self, _p: Vec3, object: ObjectId) -> Result<(), TransitionError> {
                self.0.borrow_mut().push(format!("enter {}", object));
                Ok(())
            }
            fn leave(&mut self) -> Result<(), TransitionError> {
                self.0.borrow_mut().push("leave".to_string());
                Ok(())
            }
        }

        let calls = Rc::new(RefCell::new(Vec::new()));
        let (vm, _scene, mut cues) = hovering();
        let mut vm = vm.with_inspect(Box::new(Log(calls.clone())));
        vm.handle(ViewEvent::PointerConfirm, &mut cues);
        vm.handle(ViewEvent::KeyPressed("Escape".to_string()), &mut cues);
        assert_eq!(*calls.borrow(), vec!["enter 7".to_string(), "leave".to_string()]);
    }

    #[test]
    fn default_inspect_hooks_report_not_implemented() {
        let mut hooks = UnframedInspect;
        assert!(matches!(
            hooks.enter(Vec3::ZERO, 1),
            Err(TransitionError::NotImplemented(_))
        ));
        assert!(matches!(hooks.leave(), Err(TransitionError::NotImplemented(_))));
    }

    #[test]
    fn rejects_invalid_sensitivity() {
        let locomotion =
            LocomotionController::new(RecordingRig::default(), 10.0, MoveBindings::default())
                .unwrap();
        let result = ViewModeController::new(
            locomotion,
            Picker::new(100.0).unwrap(),
            "Escape".to_string(),
            -1.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn single_character_exit_key_is_lowercased() {
        let locomotion =
            LocomotionController::new(RecordingRig::default(), 10.0, MoveBindings::default())
                .unwrap();
        let vm = ViewModeController::new(
            locomotion,
            Picker::new(100.0).unwrap(),
            "Q".to_string(),
            0.002,
        )
        .unwrap();
        assert_eq!(vm.exit_key(), "q");
        assert_eq!(controller().exit_key(), "Escape");
    }
}
