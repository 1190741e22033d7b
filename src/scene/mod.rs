pub mod serialization;

use crate::render::pick::{Hit, Pickable, Ray};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashSet;

pub type ObjectId = u32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("object id {0} is used more than once")]
    DuplicateId(ObjectId),
    #[error("no object ids left to allocate")]
    IdsExhausted,
}

/// Red, green, blue, yellow.
pub const PALETTE: [[f32; 3]; 4] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
];

/// Geometry used for aim-ray tests. Cuboids are axis-aligned.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Cuboid { half_extents: [f32; 3] },
    Sphere { radius: f32 },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub position: [f32; 3],
    pub shape: Shape,
    pub color: [f32; 3],
}

impl Pickable for SceneObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn intersects_ray(&self, ray: &Ray) -> Option<Hit> {
        let center = glam::Vec3::from(self.position);
        let distance = match self.shape {
            Shape::Cuboid { half_extents } => {
                let half = glam::Vec3::from(half_extents);
                ray_aabb(ray, center - half, center + half)
            }
            Shape::Sphere { radius } => ray_sphere(ray, center, radius),
        }?;
        Some(Hit {
            distance,
            point: ray.at(distance),
        })
    }
}

/// Pickable objects in insertion order.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct SceneState {
    objects: Vec<SceneObject>,
    #[serde(default)]
    next_id: ObjectId,
}

impl SceneState {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    /// Unit cubes scattered on the ground plane within `±half_extent`.
    pub fn scattered_cubes(count: usize, half_extent: f32, seed: u64) -> Result<Self, SceneError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scene = Self::new();
        for index in 0..count {
            let x = -half_extent + rng.gen::<f32>() * half_extent * 2.0;
            let z = -half_extent + rng.gen::<f32>() * half_extent * 2.0;
            let color = PALETTE[rng.gen_range(0..PALETTE.len())];
            scene.add_object(
                format!("Cube {}", index + 1),
                [x, 0.0, z],
                Shape::Cuboid {
                    half_extents: [0.5, 0.5, 0.5],
                },
                color,
            )?;
        }
        Ok(scene)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn add_object(
        &mut self,
        name: String,
        position: [f32; 3],
        shape: Shape,
        color: [f32; 3],
    ) -> Result<ObjectId, SceneError> {
        let id = self.next_id.max(1);
        self.next_id = id.checked_add(1).ok_or(SceneError::IdsExhausted)?;
        self.objects.push(SceneObject {
            id,
            name,
            position,
            shape,
            color,
        });
        Ok(id)
    }

    /// Checks ids read back from a file and moves allocation past them.
    pub(crate) fn validate_ids(&mut self) -> Result<(), SceneError> {
        let mut seen = HashSet::with_capacity(self.objects.len());
        for object in &self.objects {
            if !seen.insert(object.id) {
                return Err(SceneError::DuplicateId(object.id));
            }
        }
        let max_id = self.objects.iter().map(|object| object.id).max().unwrap_or(0);
        let after_max = max_id.checked_add(1).ok_or(SceneError::IdsExhausted)?;
        self.next_id = self.next_id.max(after_max);
        Ok(())
    }
}

fn ray_aabb(ray: &Ray, min: glam::Vec3, max: glam::Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        if dir.abs() < 1e-8 {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }
        let t0 = (min[axis] - origin) / dir;
        let t1 = (max[axis] - origin) / dir;
        let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }
    // Front faces only: a ray starting inside the box does not hit it.
    (t_near >= 0.0).then_some(t_near)
}

fn ray_sphere(ray: &Ray, center: glam::Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::{SceneError, SceneObject, SceneState, Shape};
    use crate::render::pick::{Pickable, Ray};
    use glam::Vec3;

    fn cube_at(scene: &mut SceneState, x: f32, z: f32) -> u32 {
        scene
            .add_object(
                "cube".to_string(),
                [x, 0.0, z],
                Shape::Cuboid {
                    half_extents: [0.5, 0.5, 0.5],
                },
                [1.0, 1.0, 1.0],
            )
            .unwrap()
    }

    #[test]
    fn scatter_is_deterministic_for_a_seed() {
        let a = SceneState::scattered_cubes(3, 25.0, 7).unwrap();
        let b = SceneState::scattered_cubes(3, 25.0, 7).unwrap();
        assert_eq!(a.objects(), b.objects());
        assert_eq!(a.objects().len(), 3);
        for object in a.objects() {
            assert!(object.position[0].abs() <= 25.0);
            assert!(object.position[2].abs() <= 25.0);
            assert_eq!(object.position[1], 0.0);
        }
    }

    #[test]
    fn ids_are_unique_in_insertion_order() {
        let mut scene = SceneState::new();
        let a = cube_at(&mut scene, 0.0, 0.0);
        let b = cube_at(&mut scene, 1.0, 0.0);
        let c = cube_at(&mut scene, 2.0, 0.0);
        assert_eq!((a, b, c), (1, 2, 3));
        let ids: Vec<u32> = scene.objects().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn allocation_stops_at_the_last_id() {
        let mut scene = SceneState::new();
        scene.next_id = u32::MAX;
        let result = scene.add_object(
            "last".to_string(),
            [0.0; 3],
            Shape::Sphere { radius: 1.0 },
            [1.0; 3],
        );
        assert_eq!(result, Err(SceneError::IdsExhausted));
        assert!(scene.objects().is_empty());
    }

    fn sphere(id: u32) -> SceneObject {
        SceneObject {
            id,
            name: format!("s{}", id),
            position: [0.0; 3],
            shape: Shape::Sphere { radius: 1.0 },
            color: [1.0; 3],
        }
    }

    #[test]
    fn validation_rejects_duplicate_ids() {
        let mut scene = SceneState {
            objects: vec![sphere(4), sphere(9), sphere(4)],
            next_id: 0,
        };
        assert_eq!(scene.validate_ids(), Err(SceneError::DuplicateId(4)));
    }

    #[test]
    fn validation_rejects_id_at_the_top_of_the_range() {
        let mut scene = SceneState {
            objects: vec![sphere(u32::MAX)],
            next_id: 0,
        };
        assert_eq!(scene.validate_ids(), Err(SceneError::IdsExhausted));
    }

    #[test]
    fn validation_moves_allocation_past_loaded_ids() {
        let mut scene = SceneState {
            objects: vec![sphere(4), sphere(9)],
            next_id: 0,
        };
        scene.validate_ids().unwrap();
        assert_eq!(cube_at(&mut scene, 0.0, 0.0), 10);
    }

    #[test]
    fn ray_hits_cube_front_face() {
        let mut scene = SceneState::new();
        cube_at(&mut scene, 0.0, 0.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = scene.objects()[0].intersects_ray(&ray).unwrap();
        assert!((hit.distance - 9.5).abs() < 1e-5);
        assert!((hit.point.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn ray_parallel_to_slab_outside_misses() {
        let mut scene = SceneState::new();
        cube_at(&mut scene, 0.0, 0.0);
        let ray = Ray::new(Vec3::new(0.0, 2.0, 10.0), Vec3::NEG_Z);
        assert!(scene.objects()[0].intersects_ray(&ray).is_none());
    }

    #[test]
    fn ray_pointing_away_misses() {
        let mut scene = SceneState::new();
        cube_at(&mut scene, 0.0, 0.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(scene.objects()[0].intersects_ray(&ray).is_none());
    }

    #[test]
    fn sphere_hit_distance() {
        let mut scene = SceneState::new();
        scene
            .add_object(
                "ball".to_string(),
                [0.0, 0.0, 0.0],
                Shape::Sphere { radius: 2.0 },
                [1.0, 1.0, 1.0],
            )
            .unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = scene.objects()[0].intersects_ray(&ray).unwrap();
        assert!((hit.distance - 8.0).abs() < 1e-5);
    }
}
