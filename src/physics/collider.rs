//! Collider behavior unit: attaches a filtered bounding volume to an entity

use crate::ecs::behavior::{Behavior, Context};
use crate::foundation::math::Vec2;
use crate::physics::{Aabb, Layers};
use crate::platform::Surface;
use crate::transform::{TransformArena, TransformId};
use std::any::Any;

/// Collision volume shape. Every shape is swept as its axis-aligned
/// bounding box; circles use their enclosing square.
#[derive(Debug, Clone)]
pub enum ColliderShape {
    /// Rectangle with full extents
    Box {
        /// Full width
        width: f32,
        /// Full height
        height: f32,
    },
    /// Circle, swept as its bounding square
    Circle {
        /// Radius
        radius: f32,
    },
    /// Placeholder for polygon volumes. Not yet swept; reports zero size
    /// and therefore never overlaps anything.
    Polygon(Vec<Vec2>),
}

impl ColliderShape {
    /// Full extents of the shape's local bounding box
    fn extents(&self) -> Vec2 {
        match self {
            Self::Box { width, height } => Vec2::new(*width, *height),
            Self::Circle { radius } => Vec2::new(radius * 2.0, radius * 2.0),
            Self::Polygon(_) => Vec2::new(0.0, 0.0),
        }
    }
}

/// Behavior unit giving its owner a collision volume.
///
/// Registers the owner with the collision system on awake and unregisters
/// on destroy; the sweep itself lives in
/// [`CollisionSystem`](crate::physics::CollisionSystem).
#[derive(Debug, Clone)]
pub struct Collider {
    shape: ColliderShape,
    offset: Vec2,
    is_trigger: bool,
    layers: Layers,
    mask: Layers,
}

impl Collider {
    /// Box collider centered on the owner's transform
    pub fn new_box(width: f32, height: f32) -> Self {
        Self::new(ColliderShape::Box { width, height })
    }

    /// Circle collider centered on the owner's transform
    pub fn new_circle(radius: f32) -> Self {
        Self::new(ColliderShape::Circle { radius })
    }

    /// Collider with an explicit shape. New colliders belong to every layer
    /// and collide with every layer until narrowed.
    pub fn new(shape: ColliderShape) -> Self {
        if let ColliderShape::Polygon(points) = &shape {
            log::warn!(
                "polygon collider ({} points) is not swept; it will report zero size",
                points.len()
            );
        }
        Self {
            shape,
            offset: Vec2::new(0.0, 0.0),
            is_trigger: false,
            layers: Layers::ALL,
            mask: Layers::ALL,
        }
    }

    /// Restrict group membership and the set of groups collided with
    pub fn with_layers(mut self, layers: Layers, mask: Layers) -> Self {
        self.layers = layers;
        self.mask = mask;
        self
    }

    /// Mark as a sensor: overlaps publish trigger events instead of
    /// collision events
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Displace the volume from the owner's transform origin, in local units
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// The collision volume shape
    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// Local-space displacement from the owner's transform
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Whether overlaps are reported as triggers
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Group membership
    pub fn layers(&self) -> Layers {
        self.layers
    }

    /// Groups this collider collides with
    pub fn mask(&self) -> Layers {
        self.mask
    }

    /// World-space bounding box: centered at the owner's world position plus
    /// the scaled offset, extents scaled by the absolute world scale
    pub fn world_bounds(&self, transform: TransformId, transforms: &mut TransformArena) -> Aabb {
        let position = transforms.world_position(transform);
        let scale = transforms.world_scale(transform);
        let center = position + self.offset.component_mul(&scale);
        let extents = self.shape.extents();
        Aabb::from_center(
            center,
            extents.x * scale.x.abs(),
            extents.y * scale.y.abs(),
        )
    }
}

impl Behavior for Collider {
    fn on_awake(&mut self, ctx: &mut Context) {
        let id = ctx.entity_id();
        ctx.services.collision.register(id);
    }

    fn on_destroy(&mut self, ctx: &mut Context) {
        let id = ctx.entity_id();
        ctx.services.collision.unregister(id);
    }

    fn update(&mut self, _ctx: &mut Context, _delta_ms: f32) {}

    fn render(&mut self, _ctx: &mut Context, _surface: &mut dyn Surface) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
