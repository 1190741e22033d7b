//! Aim-ray picking
//!
//! While the pointer is captured the camera casts a ray through the screen
//! center each frame and the `Picker` decides which scene object, if any, is
//! highlighted.
//!
//! ## Policy
//!
//! - **Hysteresis**: the currently highlighted object is re-tested first. While
//!   it still intersects, nothing else is considered and no cue fires.
//! - **First match**: otherwise candidates are scanned in insertion order and
//!   the first one hit within range wins, regardless of distance.

use crate::config::{validate_pick_range, ConfigError};
use crate::scene::ObjectId;
use crate::ui::{Cue, EffectSink};
use glam::Vec3;

// ========================================================================
// Ray / Hit
// ========================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance along the ray to the entry point.
    pub distance: f32,
    pub point: Vec3,
}

/// Anything with an identity that an aim ray can hit.
pub trait Pickable {
    fn id(&self) -> ObjectId;
    fn intersects_ray(&self, ray: &Ray) -> Option<Hit>;
}

fn hit_within<P: Pickable>(ray: &Ray, candidate: &P, range: f32) -> Option<Hit> {
    candidate
        .intersects_ray(ray)
        .filter(|hit| hit.distance >= 0.0 && hit.distance <= range)
}

/// All hits within `range`, nearest first. Ties keep candidate order.
pub fn intersect_all<P: Pickable>(ray: &Ray, candidates: &[P], range: f32) -> Vec<(ObjectId, Hit)> {
    let mut hits: Vec<(ObjectId, Hit)> = candidates
        .iter()
        .filter_map(|candidate| hit_within(ray, candidate, range).map(|hit| (candidate.id(), hit)))
        .collect();
    hits.sort_by(|a, b| a.1.distance.total_cmp(&b.1.distance));
    hits
}

// ========================================================================
// Picker
// ========================================================================

#[derive(Debug, Clone)]
pub struct Picker {
    highlighted: Option<ObjectId>,
    range: f32,
}

impl Picker {
    pub fn new(range: f32) -> Result<Self, ConfigError> {
        validate_pick_range(range)?;
        Ok(Self {
            highlighted: None,
            range,
        })
    }

    pub fn highlighted(&self) -> Option<ObjectId> {
        self.highlighted
    }

    /// Run one picking pass and return the highlighted object afterwards.
    pub fn tick<P: Pickable>(
        &mut self,
        ray: &Ray,
        candidates: &[P],
        effects: &mut dyn EffectSink,
    ) -> Option<ObjectId> {
        if let Some(current) = self.highlighted {
            let still_hit = candidates
                .iter()
                .find(|candidate| candidate.id() == current)
                .and_then(|candidate| hit_within(ray, candidate, self.range))
                .is_some();
            if still_hit {
                return Some(current);
            }
        }

        let found = candidates
            .iter()
            .find(|candidate| hit_within(ray, *candidate, self.range).is_some())
            .map(|candidate| candidate.id());

        match (self.highlighted, found) {
            (previous, Some(id)) => {
                if let Some(previous) = previous {
                    effects.cue(Cue::HighlightExited(previous));
                }
                log::debug!("Highlight entered object {}", id);
                self.highlighted = Some(id);
                effects.cue(Cue::HighlightEntered(id));
            }
            (Some(previous), None) => {
                log::debug!("Highlight exited object {}", previous);
                self.highlighted = None;
                effects.cue(Cue::HighlightExited(previous));
            }
            (None, None) => {}
        }

        self.highlighted
    }
}

// ========================================================================
// Tests
// ========================================================================
