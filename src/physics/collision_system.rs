//! Brute-force collision sweep over registered participants
//!
//! Participants are entity ids registered by [`Collider::on_awake`]. Each
//! sweep snapshots world-space bounds for the ids that are still alive,
//! active, and carry an effectively enabled collider, then tests every
//! unordered pair. Quadratic, fine for the few hundred entities this engine
//! targets.

use crate::ecs::scene::Scene;
use crate::ecs::EntityId;
use crate::foundation::math::Vec2;
use crate::physics::{Aabb, Collider, Layers};
use crate::transform::TransformArena;

/// One unordered overlapping pair found by a sweep, with `a` registered
/// before `b`
#[derive(Debug, Clone, Copy)]
pub struct ContactPair {
    /// Earlier-registered participant
    pub a: EntityId,
    /// Later-registered participant
    pub b: EntityId,
    /// Midpoint of the two box centers
    pub point: Vec2,
    /// Contact normal, screen-space up
    pub normal: Vec2,
}

/// Closest solid hit along a ray
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// Entity whose bounds were hit
    pub entity: EntityId,
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec2,
}

struct Snapshot {
    entity: EntityId,
    bounds: Aabb,
    layers: Layers,
    mask: Layers,
}

/// Registry of collision participants plus the sweep and spatial queries
#[derive(Default)]
pub struct CollisionSystem {
    participants: Vec<EntityId>,
    participant_warn_threshold: usize,
}

impl CollisionSystem {
    /// Empty system with warnings disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Warn once per sweep when the participant count exceeds `threshold`.
    /// Zero disables the warning.
    pub fn set_participant_warn_threshold(&mut self, threshold: usize) {
        self.participant_warn_threshold = threshold;
    }

    /// Enroll an entity in future sweeps. Ignores duplicates.
    pub fn register(&mut self, entity: EntityId) {
        if !self.participants.contains(&entity) {
            self.participants.push(entity);
        }
    }

    /// Withdraw an entity from future sweeps. No-op for unknown ids.
    pub fn unregister(&mut self, entity: EntityId) {
        self.participants.retain(|&other| other != entity);
    }

    /// Whether the entity is enrolled
    pub fn is_registered(&self, entity: EntityId) -> bool {
        self.participants.contains(&entity)
    }

    /// Number of enrolled entities, swept or not
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Drop every participant
    pub fn clear(&mut self) {
        self.participants.clear();
    }

    /// One sweep: every unordered pair of live participants whose layer
    /// filter passes and whose world bounds strictly overlap. Pure with
    /// respect to the scene; event publication is the caller's job.
    pub fn detect(&self, scene: &Scene, transforms: &mut TransformArena) -> Vec<ContactPair> {
        if self.participant_warn_threshold > 0
            && self.participants.len() > self.participant_warn_threshold
        {
            log::warn!(
                "collision sweep over {} participants (threshold {})",
                self.participants.len(),
                self.participant_warn_threshold
            );
        }

        let snapshots = self.snapshot(scene, transforms);
        let mut contacts = Vec::new();
        for i in 0..snapshots.len() {
            for j in (i + 1)..snapshots.len() {
                let (a, b) = (&snapshots[i], &snapshots[j]);
                if !Layers::should_collide(a.layers, a.mask, b.layers, b.mask) {
                    continue;
                }
                if !a.bounds.overlaps(&b.bounds) {
                    continue;
                }
                contacts.push(ContactPair {
                    a: a.entity,
                    b: b.entity,
                    point: (a.bounds.center() + b.bounds.center()) / 2.0,
                    normal: Vec2::new(0.0, -1.0),
                });
            }
        }
        contacts
    }

    /// Ids of live participants whose bounds overlap `area`
    pub fn query_aabb(
        &self,
        area: &Aabb,
        scene: &Scene,
        transforms: &mut TransformArena,
    ) -> Vec<EntityId> {
        self.snapshot(scene, transforms)
            .into_iter()
            .filter(|s| s.bounds.overlaps(area))
            .map(|s| s.entity)
            .collect()
    }

    /// Ids of live participants whose bounds contain `point` (inclusive)
    pub fn query_point(
        &self,
        point: Vec2,
        scene: &Scene,
        transforms: &mut TransformArena,
    ) -> Vec<EntityId> {
        self.snapshot(scene, transforms)
            .into_iter()
            .filter(|s| s.bounds.contains_point(point))
            .map(|s| s.entity)
            .collect()
    }

    /// Closest participant hit along a ray, within `max_distance`. Returns
    /// `None` for a zero-length direction or when nothing was hit.
    pub fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        scene: &Scene,
        transforms: &mut TransformArena,
    ) -> Option<RaycastHit> {
        let length = direction.norm();
        if length < f32::EPSILON {
            return None;
        }
        let direction = direction / length;

        let mut closest: Option<RaycastHit> = None;
        for s in self.snapshot(scene, transforms) {
            let Some(distance) = s.bounds.intersect_ray(origin, direction) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if closest.as_ref().is_none_or(|hit| distance < hit.distance) {
                closest = Some(RaycastHit {
                    entity: s.entity,
                    distance,
                    point: origin + direction * distance,
                });
            }
        }
        closest
    }

    /// World bounds of every participant that is still alive, active, and
    /// carrying an effectively enabled collider. Stale registrations are
    /// skipped, not purged; unregistration belongs to the collider's destroy
    /// path.
    fn snapshot(&self, scene: &Scene, transforms: &mut TransformArena) -> Vec<Snapshot> {
        let mut snapshots = Vec::with_capacity(self.participants.len());
        for &entity in &self.participants {
            let Some(game_object) = scene.get(entity) else {
                continue;
            };
            if !game_object.is_active() || game_object.is_destroyed() {
                continue;
            }
            if !game_object.is_component_enabled::<Collider>() {
                continue;
            }
            let Some(collider) = game_object.component::<Collider>() else {
                continue;
            };
            snapshots.push(Snapshot {
                entity,
                bounds: collider.world_bounds(game_object.transform(), transforms),
                layers: collider.layers(),
                mask: collider.mask(),
            });
        }
        snapshots
    }
}
