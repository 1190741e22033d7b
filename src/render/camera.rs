use crate::render::pick::Ray;
use glam::{Mat4, Vec2, Vec3};

/// Keeps the view just short of straight up / straight down.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// What the locomotion layer needs from a first-person camera rig.
///
/// `lock`/`unlock` only track the capture flag; grabbing the OS cursor is the
/// host's job.
pub trait PointerLockRig {
    fn move_forward(&mut self, distance: f32);
    fn move_right(&mut self, distance: f32);
    fn turn(&mut self, yaw_delta: f32, pitch_delta: f32);
    fn lock(&mut self);
    fn unlock(&mut self);
    fn is_locked(&self) -> bool;
    fn aim_ray(&self, ndc: Vec2) -> Ray;
    fn pose(&self) -> CameraPose;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// Yaw/pitch camera that walks on the ground plane.
///
/// Yaw 0 faces +X; the default rig faces -Z.
#[derive(Debug, Clone, Copy)]
pub struct FirstPersonRig {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    locked: bool,
    projection: Projection,
}

impl FirstPersonRig {
    pub fn new(position: Vec3, projection: Projection) -> Self {
        Self {
            position,
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            locked: false,
            projection,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.projection.set_viewport(width, height);
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        camera_basis(self.yaw, self.pitch)
    }

    fn ground_axes(&self) -> (Vec3, Vec3) {
        let forward = Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin());
        let right = Vec3::new(-self.yaw.sin(), 0.0, self.yaw.cos());
        (forward, right)
    }
}

impl PointerLockRig for FirstPersonRig {
    fn move_forward(&mut self, distance: f32) {
        let (forward, _) = self.ground_axes();
        self.position += forward * distance;
    }

    fn move_right(&mut self, distance: f32) {
        let (_, right) = self.ground_axes();
        self.position += right * distance;
    }

    fn turn(&mut self, yaw_delta: f32, pitch_delta: f32) {
        if !(yaw_delta.is_finite() && pitch_delta.is_finite()) {
            return;
        }
        self.yaw = wrap_angle(self.yaw + yaw_delta);
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
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

    fn aim_ray(&self, ndc: Vec2) -> Ray {
        let (forward, right, up) = self.basis();
        let tan_half = (self.projection.fov_y_deg.to_radians() * 0.5).tan();
        let direction = forward
            + right * (ndc.x * tan_half * self.projection.aspect)
            + up * (ndc.y * tan_half);
        Ray::new(self.position, direction)
    }

    fn pose(&self) -> CameraPose {
        let (forward, _, up) = self.basis();
        CameraPose {
            position: self.position,
            view: Mat4::look_to_rh(self.position, forward, up),
            projection: self.projection.matrix(),
        }
    }
}

fn camera_basis(yaw: f32, pitch: f32) -> (Vec3, Vec3, Vec3) {
    let cos_pitch = pitch.cos();
    let forward = Vec3::new(yaw.cos() * cos_pitch, pitch.sin(), yaw.sin() * cos_pitch);
    let right = Vec3::new(-yaw.sin(), 0.0, yaw.cos());
    let up = right.cross(forward).normalize_or_zero();
    (forward, right, up)
}

fn wrap_angle(angle: f32) -> f32 {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    (angle + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI
}
