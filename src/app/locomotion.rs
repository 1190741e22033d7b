use super::input::KeyState;
use crate::config::{validate_speed, ConfigError, MoveBindings};
use crate::render::PointerLockRig;
use glam::Vec2;

/// Unit-or-zero movement intent: `x` is strafe (right positive), `y` is
/// forward. Opposite keys cancel.
pub fn movement_intent(keys: &KeyState, bindings: &MoveBindings) -> Vec2 {
    let axis = |positive: &str, negative: &str| -> f32 {
        let mut value = 0.0;
        if keys.is_down(positive) {
            value += 1.0;
        }
        if keys.is_down(negative) {
            value -= 1.0;
        }
        value
    };
    let intent = Vec2::new(
        axis(&bindings.right, &bindings.left),
        axis(&bindings.forward, &bindings.backward),
    );
    intent.normalize_or_zero()
}

/// Walks a pointer-lock rig from held keys.
pub struct LocomotionController<R> {
    rig: R,
    speed: f32,
    bindings: MoveBindings,
}

impl<R: PointerLockRig> LocomotionController<R> {
    pub fn new(rig: R, speed: f32, bindings: MoveBindings) -> Result<Self, ConfigError> {
        validate_speed(speed)?;
        bindings.validate()?;
        Ok(Self {
            rig,
            speed,
            bindings: bindings.normalized(),
        })
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    /// Host-side access for viewport changes. Capture and movement go
    /// through the controller.
    pub fn rig_mut(&mut self) -> &mut R {
        &mut self.rig
    }

    pub fn is_capturing(&self) -> bool {
        self.rig.is_locked()
    }

    pub fn engage(&mut self) {
        self.rig.lock();
    }

    pub fn disengage(&mut self) {
        self.rig.unlock();
    }

    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        if self.rig.is_locked() {
            self.rig.turn(yaw_delta, pitch_delta);
        }
    }

    pub fn tick(&mut self, keys: &KeyState, elapsed: f32) {
        if !self.rig.is_locked() {
            return;
        }
        let step = movement_intent(keys, &self.bindings) * (self.speed * elapsed.max(0.0));
        if step == Vec2::ZERO {
            return;
        }
        self.rig.move_right(step.x);
        self.rig.move_forward(step.y);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{movement_intent, LocomotionController};
    use crate::app::input::KeyState;
    use crate::config::MoveBindings;
    use crate::render::pick::Ray;
    use crate::render::{CameraPose, FirstPersonRig, PointerLockRig, Projection};
    use winit::event::ElementState;
    use winit::keyboard::Key;
    use glam::{Mat4, Vec2, Vec3};

    /// Rig that only accumulates relative moves.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordingRig {
        pub forward: f32,
        pub right: f32,
        pub yaw: f32,
        pub pitch: f32,
        pub locked: bool,
    }

    impl PointerLockRig for RecordingRig {
        fn move_forward(&mut self, distance: f32) {
            self.forward += distance;
        }
        fn move_right(&mut self, distance: f32) {
            self.right += distance;
        }
        fn turn(&mut self, yaw_delta: f32, pitch_delta: f32) {
            self.yaw += yaw_delta;
            self.pitch += pitch_delta;
        }
        fn lock(&mut self) {
            self.locked = true;
        }
        fn unlock(&mut self) {
            self.locked = false;
        }
        fn is_locked(&self) -> bool {
            self.locked
        }
        fn aim_ray(&self, _ndc: Vec2) -> Ray {
            Ray::new(Vec3::new(self.right, 0.0, -self.forward), Vec3::NEG_Z)
        }
        fn pose(&self) -> CameraPose {
            CameraPose {
                position: Vec3::new(self.right, 0.0, -self.forward),
                view: Mat4::IDENTITY,
                projection: Mat4::IDENTITY,
            }
        }
    }

    fn held(keys: &[&str]) -> KeyState {
        let mut state = KeyState::new();
        for key in keys {
            state.press(key);
        }
        state
    }

    fn locked_controller(speed: f32) -> LocomotionController<RecordingRig> {
        let mut controller =
            LocomotionController::new(RecordingRig::default(), speed, MoveBindings::default())
                .unwrap();
        controller.engage();
        controller
    }

    #[test]
    fn intent_is_zero_or_unit_for_every_combination() {
        let bindings = MoveBindings::default();
        let names = ["w", "s", "a", "d"];
        for mask in 0u8..16 {
            let pressed: Vec<&str> = names
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, name)| *name)
                .collect();
            let len = movement_intent(&held(&pressed), &bindings).length();
            assert!(
                len == 0.0 || (len - 1.0).abs() < 1e-6,
                "keys {:?} gave length {}",
                pressed,
                len
            );
        }
    }

    #[test]
    fn opposite_keys_cancel() {
        let bindings = MoveBindings::default();
        assert_eq!(movement_intent(&held(&["w", "s"]), &bindings), Vec2::ZERO);
        assert_eq!(movement_intent(&held(&["a", "d"]), &bindings), Vec2::ZERO);
    }

    #[test]
    fn forward_for_one_second_covers_speed() {
        let mut controller = locked_controller(10.0);
        controller.tick(&held(&["w"]), 1.0);
        assert!((controller.rig().forward - 10.0).abs() < 1e-5);
        assert_eq!(controller.rig().right, 0.0);
    }

    #[test]
    fn diagonal_is_not_faster_than_axial() {
        let mut controller = locked_controller(10.0);
        controller.tick(&held(&["w", "d"]), 1.0);
        let rig = controller.rig();
        let magnitude = Vec2::new(rig.right, rig.forward).length();
        assert!((magnitude - 10.0).abs() < 1e-4, "got {}", magnitude);
    }

    #[test]
    fn many_small_ticks_match_one_large_tick() {
        let mut rig = FirstPersonRig::new(
            Vec3::new(0.0, 0.0, 20.0),
            Projection {
                fov_y_deg: 75.0,
                aspect: 1.0,
                near: 1.0,
                far: 100.0,
            },
        );
        rig.lock();
        let mut controller =
            LocomotionController::new(rig, 10.0, MoveBindings::default()).unwrap();
        let keys = held(&["w"]);
        for _ in 0..60 {
            controller.tick(&keys, 1.0 / 60.0);
        }
        let p = controller.rig().position();
        assert!((p.z - 10.0).abs() < 1e-3);
        assert!(p.x.abs() < 1e-4);
    }

    #[test]
    fn unlocked_rig_does_not_move() {
        let mut controller =
            LocomotionController::new(RecordingRig::default(), 10.0, MoveBindings::default())
                .unwrap();
        controller.tick(&held(&["w", "a"]), 1.0);
        controller.look(0.5, 0.5);
        assert_eq!(controller.rig().forward, 0.0);
        assert_eq!(controller.rig().right, 0.0);
        assert_eq!(controller.rig().yaw, 0.0);
    }

    #[test]
    fn negative_elapsed_is_treated_as_zero() {
        let mut controller = locked_controller(10.0);
        controller.tick(&held(&["w"]), -1.0);
        assert_eq!(controller.rig().forward, 0.0);
    }

    #[test]
    fn rejects_invalid_speed() {
        let bindings = MoveBindings::default();
        assert!(LocomotionController::new(RecordingRig::default(), 0.0, bindings.clone()).is_err());
        assert!(
            LocomotionController::new(RecordingRig::default(), f32::NAN, bindings).is_err()
        );
    }

    #[test]
    fn uppercase_binding_matches_typed_key() {
        let bindings = MoveBindings {
            forward: "W".to_string(),
            ..MoveBindings::default()
        };
        let mut controller =
            LocomotionController::new(RecordingRig::default(), 10.0, bindings).unwrap();
        controller.engage();
        let mut keys = KeyState::new();
        keys.handle_key(&Key::Character("W".into()), ElementState::Pressed);
        controller.tick(&keys, 1.0);
        assert!((controller.rig().forward - 10.0).abs() < 1e-5);
    }
}
