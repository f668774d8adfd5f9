//! Collision detection: axis-aligned bounds, layer filtering, collider
//! components, and the per-frame O(n^2) sweep

pub mod bounds;
pub mod collider;
pub mod collision_system;
pub mod layers;

pub use bounds::Aabb;
pub use collider::{Collider, ColliderShape};
pub use collision_system::{CollisionSystem, ContactPair, RaycastHit};
pub use layers::Layers;

use crate::ecs::EntityId;
use crate::foundation::math::Vec2;

/// Payload of a collision or trigger event, as seen from one side of the
/// contact
#[derive(Debug, Clone, Copy)]
pub struct CollisionEvent {
    /// The entity this event is addressed to
    pub entity: EntityId,
    /// The entity it overlapped
    pub other: EntityId,
    /// Contact point, midpoint of the two world-space box centers
    pub point: Vec2,
    /// Contact normal; always screen-space up in this engine
    pub normal: Vec2,
}
