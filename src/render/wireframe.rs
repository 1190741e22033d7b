//! Scene geometry as egui line work, projected through the camera pose.

use super::{CameraPose, FrameView};
use crate::scene::{SceneObject, Shape};
use egui::{Color32, Pos2, Rect, Stroke};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Clip-space w below which a point counts as behind the camera.
const MIN_W: f32 = 1e-3;
const GRID_HALF_EXTENT: f32 = 50.0;
const GRID_STEP: f32 = 5.0;
const GRID_Y: f32 = -0.5;
const SPHERE_SEGMENTS: usize = 32;

#[rustfmt::skip]
const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 3), (3, 2), (2, 0),
    (4, 5), (5, 7), (7, 6), (6, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

struct Projector {
    view_proj: Mat4,
    screen: Rect,
}

impl Projector {
    fn new(pose: &CameraPose, screen: Rect) -> Self {
        Self {
            view_proj: pose.projection * pose.view,
            screen,
        }
    }

    fn to_screen(&self, clip: Vec4) -> Pos2 {
        let ndc = Vec2::new(clip.x / clip.w, clip.y / clip.w);
        Pos2::new(
            self.screen.left() + (ndc.x + 1.0) * 0.5 * self.screen.width(),
            self.screen.top() + (1.0 - ndc.y) * 0.5 * self.screen.height(),
        )
    }

    /// Segment endpoints in screen space, cut at the camera plane.
    fn segment(&self, a: Vec3, b: Vec3) -> Option<[Pos2; 2]> {
        let mut ca = self.view_proj * a.extend(1.0);
        let mut cb = self.view_proj * b.extend(1.0);
        if ca.w < MIN_W && cb.w < MIN_W {
            return None;
        }
        if ca.w < MIN_W {
            ca = ca.lerp(cb, (MIN_W - ca.w) / (cb.w - ca.w));
        } else if cb.w < MIN_W {
            cb = cb.lerp(ca, (MIN_W - cb.w) / (ca.w - cb.w));
        }
        Some([self.to_screen(ca), self.to_screen(cb)])
    }

    fn line(&self, shapes: &mut Vec<egui::Shape>, a: Vec3, b: Vec3, stroke: Stroke) {
        if let Some(points) = self.segment(a, b) {
            shapes.push(egui::Shape::line_segment(points, stroke));
        }
    }
}

fn color32(color: [f32; 3]) -> Color32 {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(color[0]), channel(color[1]), channel(color[2]))
}

fn object_shapes(
    projector: &Projector,
    object: &SceneObject,
    camera_axes: (Vec3, Vec3),
    stroke: Stroke,
    shapes: &mut Vec<egui::Shape>,
) {
    let center = Vec3::from(object.position);
    match object.shape {
        Shape::Cuboid { half_extents } => {
            let half = Vec3::from(half_extents);
            let corners: Vec<Vec3> = (0..8)
                .map(|i| {
                    let sign = Vec3::new(
                        if i & 1 == 0 { -1.0 } else { 1.0 },
                        if i & 2 == 0 { -1.0 } else { 1.0 },
                        if i & 4 == 0 { -1.0 } else { 1.0 },
                    );
                    center + half * sign
                })
                .collect();
            for (a, b) in CUBE_EDGES {
                projector.line(shapes, corners[a], corners[b], stroke);
            }
        }
        Shape::Sphere { radius } => {
            // Silhouette ring facing the camera.
            let (right, up) = camera_axes;
            let ring: Vec<Vec3> = (0..=SPHERE_SEGMENTS)
                .map(|i| {
                    let angle = i as f32 / SPHERE_SEGMENTS as f32 * std::f32::consts::TAU;
                    center + (right * angle.cos() + up * angle.sin()) * radius
                })
                .collect();
            for pair in ring.windows(2) {
                projector.line(shapes, pair[0], pair[1], stroke);
            }
        }
    }
}

/// Ground grid plus one outline per object. The outlined object is drawn
/// last with a heavier white stroke.
pub fn scene_shapes(frame: &FrameView<'_>, screen: Rect) -> Vec<egui::Shape> {
    let projector = Projector::new(&frame.pose, screen);
    let camera_to_world = frame.pose.view.inverse();
    let camera_axes = (
        camera_to_world.x_axis.truncate(),
        camera_to_world.y_axis.truncate(),
    );
    let mut shapes = Vec::new();

    let grid_stroke = Stroke::new(1.0, Color32::from_gray(48));
    let lines = (GRID_HALF_EXTENT * 2.0 / GRID_STEP) as i32;
    for i in 0..=lines {
        let offset = -GRID_HALF_EXTENT + i as f32 * GRID_STEP;
        projector.line(
            &mut shapes,
            Vec3::new(offset, GRID_Y, -GRID_HALF_EXTENT),
            Vec3::new(offset, GRID_Y, GRID_HALF_EXTENT),
            grid_stroke,
        );
        projector.line(
            &mut shapes,
            Vec3::new(-GRID_HALF_EXTENT, GRID_Y, offset),
            Vec3::new(GRID_HALF_EXTENT, GRID_Y, offset),
            grid_stroke,
        );
    }

    let outlined = frame.outlined().map(|object| object.id);
    for object in frame.objects.iter().filter(|o| Some(o.id) != outlined) {
        let stroke = Stroke::new(1.5, color32(object.color));
        object_shapes(&projector, object, camera_axes, stroke, &mut shapes);
    }
    if let Some(object) = frame.outlined() {
        let stroke = Stroke::new(3.0, Color32::WHITE);
        object_shapes(&projector, object, camera_axes, stroke, &mut shapes);
    }
    shapes
}
