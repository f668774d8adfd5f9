//! Behavior units and their lifecycle state machine
//!
//! A [`Behavior`] is a unit of per-frame logic attached to a game object.
//! Lifecycle: Constructed -> Awoken -> Started, each entered once, with an
//! orthogonal Enabled/Disabled toggle and a terminal Destroyed state. The
//! flags live in [`BehaviorSlot`], the wrapper the owning entity stores.
//!
//! Hooks receive a [`Context`]: the owning entity's metadata plus the
//! [`Services`] bundle (transform arena, event bus, collision system)
//! threaded down from the engine, so no behavior ever reaches for global
//! state. Hooks are plain calls with no error recovery; a panicking hook is
//! a programming error, not a recoverable condition.

use crate::ecs::game_object::EntityMeta;
use crate::ecs::EntityId;
use crate::events::{EventBus, EventData, Listener, OwnerTag, SubscribeOptions, SubscriptionId};
use crate::foundation::math::Vec2;
use crate::physics::{CollisionEvent, CollisionSystem};
use crate::platform::Surface;
use crate::transform::{TransformArena, TransformId};
use std::any::{Any, TypeId};

/// Mutable engine state handed to every lifecycle hook and frame pass
pub struct Services<'a> {
    /// Shared transform hierarchy
    pub transforms: &'a mut TransformArena,
    /// Shared event bus
    pub events: &'a mut EventBus,
    /// Shared collision registry
    pub collision: &'a mut CollisionSystem,
}

/// Per-call view a behavior hook runs against: the owning entity plus the
/// engine services.
pub struct Context<'a, 'b> {
    /// Metadata of the owning entity
    pub entity: &'a mut EntityMeta,
    /// Engine services
    pub services: &'a mut Services<'b>,
    unit_type: TypeId,
}

impl<'a, 'b> Context<'a, 'b> {
    pub(crate) fn new(
        entity: &'a mut EntityMeta,
        unit_type: TypeId,
        services: &'a mut Services<'b>,
    ) -> Self {
        Self {
            entity,
            services,
            unit_type,
        }
    }

    /// Id of the owning entity
    pub fn entity_id(&self) -> EntityId {
        self.entity.id()
    }

    /// Transform node of the owning entity
    pub fn transform(&self) -> TransformId {
        self.entity.transform()
    }

    /// Owner tag for subscriptions registered by this unit
    pub fn owner_tag(&self) -> OwnerTag {
        OwnerTag::new(self.entity.id(), self.unit_type)
    }

    /// Subscribe to an event kind, automatically tagged with this unit's
    /// owner so the subscription dies with the unit.
    pub fn subscribe(
        &mut self,
        kind: &str,
        options: SubscribeOptions,
        listener: Listener,
    ) -> SubscriptionId {
        let tag = self.owner_tag();
        self.services.events.subscribe(kind, options.owned_by(tag), listener)
    }

    /// Publish an event through the shared bus
    pub fn publish(&mut self, kind: &str, data: EventData) -> bool {
        self.services.events.publish(kind, data)
    }

    /// World-space position of the owning entity
    pub fn world_position(&mut self) -> Vec2 {
        let id = self.entity.transform();
        self.services.transforms.world_position(id)
    }

    /// Offset the owning entity's local position
    pub fn translate(&mut self, delta: Vec2) {
        let id = self.entity.transform();
        self.services.transforms.translate(id, delta);
    }

    /// Set the owning entity's local position
    pub fn set_position(&mut self, position: Vec2) {
        let id = self.entity.transform();
        self.services.transforms.set_position(id, position);
    }
}

/// An attachable unit of per-frame logic with a defined lifecycle.
///
/// `update` and `render` are deliberately required: every concrete unit
/// states its per-frame behavior explicitly, even if as a no-op.
pub trait Behavior: Any {
    /// One-time hook, fired before the first `on_start`
    fn on_awake(&mut self, _ctx: &mut Context) {}
    /// One-time hook, fired after `on_awake`
    fn on_start(&mut self, _ctx: &mut Context) {}
    /// Fired on a disabled -> enabled transition
    fn on_enable(&mut self, _ctx: &mut Context) {}
    /// Fired on an enabled -> disabled transition
    fn on_disable(&mut self, _ctx: &mut Context) {}
    /// Fired exactly once when the unit is destroyed
    fn on_destroy(&mut self, _ctx: &mut Context) {}
    /// Fired for each overlap reported by the collision sweep
    fn on_collision(&mut self, _ctx: &mut Context, _contact: &CollisionEvent) {}

    /// Per-frame logic; `delta_ms` is the driver-clamped frame delta
    fn update(&mut self, ctx: &mut Context, delta_ms: f32);
    /// Per-frame drawing against the opaque surface
    fn render(&mut self, ctx: &mut Context, surface: &mut dyn Surface);

    /// Upcast for typed component lookup
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for typed component lookup
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A behavior unit plus its lifecycle flags, as stored by the owning entity
pub struct BehaviorSlot {
    type_id: TypeId,
    type_name: &'static str,
    behavior: Box<dyn Behavior>,
    enabled: bool,
    visible: bool,
    awoken: bool,
    started: bool,
    destroyed: bool,
}

impl BehaviorSlot {
    pub(crate) fn new<T: Behavior>(behavior: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            behavior: Box::new(behavior),
            enabled: true,
            visible: true,
            awoken: false,
            started: false,
            destroyed: false,
        }
    }

    /// `TypeId` of the concrete behavior type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the concrete behavior type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The unit's own enabled flag (not the composite check)
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The unit's own visibility flag, consulted by render passes
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Whether `on_awake` has run
    pub fn awoken(&self) -> bool {
        self.awoken
    }

    /// Whether `on_start` has run
    pub fn started(&self) -> bool {
        self.started
    }

    /// Whether the unit reached its terminal state
    pub fn destroyed(&self) -> bool {
        self.destroyed
    }

    /// Composite enablement: own flag AND owner active AND not destroyed
    pub fn is_effectively_enabled(&self, owner_active: bool) -> bool {
        self.enabled && owner_active && !self.destroyed
    }

    /// Composite visibility used by render passes
    pub fn is_effectively_visible(&self, owner_active: bool) -> bool {
        self.visible && owner_active && !self.destroyed
    }

    pub(crate) fn behavior(&self) -> &dyn Behavior {
        self.behavior.as_ref()
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut dyn Behavior {
        self.behavior.as_mut()
    }

    /// Idempotent: fires `on_awake` the first time only
    pub(crate) fn awake(&mut self, ctx: &mut Context) {
        if self.awoken || self.destroyed {
            return;
        }
        self.behavior.on_awake(ctx);
        self.awoken = true;
    }

    /// Idempotent: fires `on_start` once, awaking the unit first if needed
    pub(crate) fn start(&mut self, ctx: &mut Context) {
        if self.destroyed {
            return;
        }
        if !self.awoken {
            self.awake(ctx);
        }
        if self.started {
            return;
        }
        self.behavior.on_start(ctx);
        self.started = true;
    }

    /// Toggle the unit's own flag, firing `on_enable`/`on_disable` on
    /// transitions only
    pub(crate) fn set_enabled(&mut self, enabled: bool, ctx: &mut Context) {
        if self.destroyed || self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.behavior.on_enable(ctx);
        } else {
            self.behavior.on_disable(ctx);
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Terminal transition: fires `on_destroy` and drops every event
    /// subscription this unit registered. Owned by entity destruction; not
    /// called twice.
    pub(crate) fn destroy(&mut self, ctx: &mut Context) {
        if self.destroyed {
            return;
        }
        self.behavior.on_destroy(ctx);
        let tag = OwnerTag::new(ctx.entity.id(), self.type_id);
        ctx.services.events.clear_owner(tag);
        self.destroyed = true;
        log::trace!("destroyed {} on '{}'", self.type_name, ctx.entity.name);
    }
}
