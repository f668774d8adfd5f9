//! Game objects: entity containers driving the component lifecycle
//!
//! A [`GameObject`] holds freeform identity (name, tag, layer), activation
//! flags, exactly one transform node allocated at construction, and an
//! insertion-ordered set of behavior units keyed by concrete type, with at
//! most one unit per type (replace-on-add).

use crate::ecs::behavior::{Behavior, BehaviorSlot, Context, Services};
use crate::ecs::EntityId;
use crate::events::{topics, EventData};
use crate::physics::CollisionEvent;
use crate::platform::Surface;
use crate::transform::{TransformArena, TransformId};
use std::any::TypeId;

/// Entity metadata, exposed to behavior hooks through [`Context`]
pub struct EntityMeta {
    pub(crate) id: EntityId,
    /// Display name
    pub name: String,
    pub(crate) tag: String,
    pub(crate) layer: i32,
    pub(crate) active: bool,
    pub(crate) destroyed: bool,
    pub(crate) awoken: bool,
    pub(crate) started: bool,
    pub(crate) transform: TransformId,
}

impl EntityMeta {
    /// Scene-assigned id; the default (null) id until registered
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Classification tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Draw/query ordering layer
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Whether the entity participates in update/collision passes
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the entity reached its terminal state
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The entity's transform node
    pub fn transform(&self) -> TransformId {
        self.transform
    }
}

type UpdateHook = Box<dyn FnMut(&mut Context, f32)>;
type RenderHook = Box<dyn FnMut(&mut Context, &mut dyn Surface)>;

/// A uniquely identified container of behavior units plus one transform
pub struct GameObject {
    meta: EntityMeta,
    units: Vec<BehaviorSlot>,
    update_hook: Option<UpdateHook>,
    render_hook: Option<RenderHook>,
}

impl GameObject {
    /// Create a game object, allocating its root transform in `transforms`.
    ///
    /// The transform exists for the object's whole life; it is freed only
    /// when the scene reaps the destroyed object.
    pub fn new(name: &str, transforms: &mut TransformArena) -> Self {
        Self {
            meta: EntityMeta {
                id: EntityId::default(),
                name: name.to_string(),
                tag: String::new(),
                layer: 0,
                active: true,
                destroyed: false,
                awoken: false,
                started: false,
                transform: transforms.alloc(),
            },
            units: Vec::new(),
            update_hook: None,
            render_hook: None,
        }
    }

    // --- identity ----------------------------------------------------------

    /// Scene-assigned id; null until the object is added to a scene
    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Classification tag
    pub fn tag(&self) -> &str {
        &self.meta.tag
    }

    /// Set the tag. Once registered in a scene, use
    /// [`crate::ecs::Scene::set_entity_tag`] so the tag index stays
    /// consistent.
    pub fn set_tag(&mut self, tag: &str) {
        self.meta.tag = tag.to_string();
    }

    /// Draw/query ordering layer
    pub fn layer(&self) -> i32 {
        self.meta.layer
    }

    /// Set the layer. Once registered in a scene, use
    /// [`crate::ecs::Scene::set_entity_layer`] so the layer index stays
    /// consistent.
    pub fn set_layer(&mut self, layer: i32) {
        self.meta.layer = layer;
    }

    /// Transform node owned by this object
    pub fn transform(&self) -> TransformId {
        self.meta.transform
    }

    /// Whether the object participates in update/collision passes
    pub fn is_active(&self) -> bool {
        self.meta.active
    }

    /// Whether [`GameObject::destroy`] has run
    pub fn is_destroyed(&self) -> bool {
        self.meta.destroyed
    }

    /// Metadata view
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    // --- components ----------------------------------------------------------

    /// Attach a behavior unit, replacing (and destroying) any existing unit
    /// of the same concrete type. If the object has already been awoken or
    /// started, the new unit is caught up immediately.
    pub fn add_component<T: Behavior>(&mut self, unit: T, services: &mut Services) {
        let type_id = TypeId::of::<T>();
        if let Some(index) = self.find_slot_index(type_id) {
            let mut old = self.units.remove(index);
            let mut ctx = Context::new(&mut self.meta, type_id, services);
            old.destroy(&mut ctx);
            log::debug!(
                "replaced {} on '{}'",
                old.type_name(),
                self.meta.name
            );
        }

        self.units.push(BehaviorSlot::new(unit));
        let Self { meta, units, .. } = self;
        let slot = units.last_mut().expect("just pushed");
        if meta.awoken {
            slot.awake(&mut Context::new(&mut *meta, type_id, &mut *services));
        }
        if meta.started {
            slot.start(&mut Context::new(&mut *meta, type_id, &mut *services));
        }
    }

    /// Exact-type lookup; a base-type query never finds a derived
    /// registration. Returns `None` on a miss.
    pub fn component<T: Behavior>(&self) -> Option<&T> {
        self.find_slot(TypeId::of::<T>())
            .and_then(|slot| slot.behavior().as_any().downcast_ref::<T>())
    }

    /// Mutable exact-type lookup
    pub fn component_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        let type_id = TypeId::of::<T>();
        self.units
            .iter_mut()
            .find(|slot| slot.type_id() == type_id)
            .and_then(|slot| slot.behavior_mut().as_any_mut().downcast_mut::<T>())
    }

    /// Whether a unit of type `T` is attached
    pub fn has_component<T: Behavior>(&self) -> bool {
        self.find_slot(TypeId::of::<T>()).is_some()
    }

    /// Destroy and remove the unit of type `T`. No-op when absent.
    pub fn remove_component<T: Behavior>(&mut self, services: &mut Services) -> bool {
        let type_id = TypeId::of::<T>();
        let Some(index) = self.find_slot_index(type_id) else {
            return false;
        };
        let mut old = self.units.remove(index);
        let mut ctx = Context::new(&mut self.meta, type_id, services);
        old.destroy(&mut ctx);
        true
    }

    /// Composite enablement of the unit of type `T`:
    /// `unit.enabled && self.active && !unit.destroyed`. `false` when absent.
    pub fn is_component_enabled<T: Behavior>(&self) -> bool {
        self.find_slot(TypeId::of::<T>())
            .is_some_and(|slot| slot.is_effectively_enabled(self.meta.active))
    }

    /// Toggle the unit's own enabled flag, firing transition hooks.
    /// Returns `false` when no unit of type `T` is attached.
    pub fn set_component_enabled<T: Behavior>(
        &mut self,
        enabled: bool,
        services: &mut Services,
    ) -> bool {
        let type_id = TypeId::of::<T>();
        let Self { meta, units, .. } = self;
        let Some(slot) = units.iter_mut().find(|slot| slot.type_id() == type_id) else {
            return false;
        };
        slot.set_enabled(enabled, &mut Context::new(&mut *meta, type_id, services));
        true
    }

    /// Toggle the unit's visibility flag (consulted by render passes only).
    /// Returns `false` when no unit of type `T` is attached.
    pub fn set_component_visible<T: Behavior>(&mut self, visible: bool) -> bool {
        let type_id = TypeId::of::<T>();
        let Some(slot) = self
            .units
            .iter_mut()
            .find(|slot| slot.type_id() == type_id)
        else {
            return false;
        };
        slot.set_visible(visible);
        true
    }

    /// Number of attached units, destroyed or not
    pub fn component_count(&self) -> usize {
        self.units.len()
    }

    // --- lifecycle ----------------------------------------------------------

    /// Toggle activation. An inactive -> active transition fires `on_enable`
    /// on every live enabled unit (and a lifecycle event); the reverse fires
    /// `on_disable`.
    pub fn set_active(&mut self, active: bool, services: &mut Services) {
        if self.meta.destroyed || self.meta.active == active {
            return;
        }
        self.meta.active = active;
        let Self { meta, units, .. } = self;
        for slot in units.iter_mut() {
            if slot.destroyed() || !slot.enabled() {
                continue;
            }
            let type_id = slot.type_id();
            let mut ctx = Context::new(&mut *meta, type_id, &mut *services);
            if active {
                slot.behavior_mut().on_enable(&mut ctx);
            } else {
                slot.behavior_mut().on_disable(&mut ctx);
            }
        }
        let topic = if active {
            topics::ENTITY_ENABLED
        } else {
            topics::ENTITY_DISABLED
        };
        services.events.publish(topic, EventData::Entity(meta.id));
    }

    /// Run `on_awake` across all units, once. Called by the scene when it
    /// finishes loading, or implicitly when a unit joins a live object.
    pub(crate) fn awake(&mut self, services: &mut Services) {
        if self.meta.awoken || self.meta.destroyed {
            return;
        }
        self.meta.awoken = true;
        let Self { meta, units, .. } = self;
        for slot in units.iter_mut() {
            let type_id = slot.type_id();
            slot.awake(&mut Context::new(&mut *meta, type_id, &mut *services));
        }
    }

    /// Run `on_start` across all units, once, after [`GameObject::awake`]
    pub(crate) fn start(&mut self, services: &mut Services) {
        if self.meta.started || self.meta.destroyed {
            return;
        }
        self.awake(services);
        self.meta.started = true;
        let Self { meta, units, .. } = self;
        for slot in units.iter_mut() {
            let type_id = slot.type_id();
            slot.start(&mut Context::new(&mut *meta, type_id, &mut *services));
        }
    }

    /// Update every effectively-enabled unit in insertion order, then the
    /// entity-level update hook. No-op while inactive or destroyed.
    pub fn update(&mut self, delta_ms: f32, services: &mut Services) {
        if !self.meta.active || self.meta.destroyed {
            return;
        }
        let Self { meta, units, .. } = self;
        for slot in units.iter_mut() {
            if !slot.is_effectively_enabled(meta.active) {
                continue;
            }
            let type_id = slot.type_id();
            let mut ctx = Context::new(&mut *meta, type_id, &mut *services);
            slot.behavior_mut().update(&mut ctx, delta_ms);
        }
        if let Some(mut hook) = self.update_hook.take() {
            let mut ctx = Context::new(&mut self.meta, TypeId::of::<()>(), services);
            hook(&mut ctx, delta_ms);
            self.update_hook = Some(hook);
        }
    }

    /// Render every visible unit in insertion order, then the entity-level
    /// render hook. Mirrors [`GameObject::update`] but filters on visibility
    /// rather than enablement.
    pub fn render(&mut self, surface: &mut dyn Surface, services: &mut Services) {
        if !self.meta.active || self.meta.destroyed {
            return;
        }
        let Self { meta, units, .. } = self;
        for slot in units.iter_mut() {
            if !slot.is_effectively_visible(meta.active) {
                continue;
            }
            let type_id = slot.type_id();
            let mut ctx = Context::new(&mut *meta, type_id, &mut *services);
            slot.behavior_mut().render(&mut ctx, surface);
        }
        if let Some(mut hook) = self.render_hook.take() {
            let mut ctx = Context::new(&mut self.meta, TypeId::of::<()>(), services);
            hook(&mut ctx, surface);
            self.render_hook = Some(hook);
        }
    }

    /// Fan a collision contact out to every effectively-enabled unit
    pub(crate) fn dispatch_collision(&mut self, contact: &CollisionEvent, services: &mut Services) {
        if !self.meta.active || self.meta.destroyed {
            return;
        }
        let Self { meta, units, .. } = self;
        for slot in units.iter_mut() {
            if !slot.is_effectively_enabled(meta.active) {
                continue;
            }
            let type_id = slot.type_id();
            let mut ctx = Context::new(&mut *meta, type_id, &mut *services);
            slot.behavior_mut().on_collision(&mut ctx, contact);
        }
    }

    /// Irreversibly destroy this object: every unit's `on_destroy` runs, the
    /// unit map is cleared along with any remaining subscriptions the object
    /// owns, a destroy lifecycle event fires, and the object reports itself
    /// destroyed so the scene removes it on the next update pass. Idempotent.
    pub fn destroy(&mut self, services: &mut Services) {
        if self.meta.destroyed {
            return;
        }
        let Self { meta, units, .. } = self;
        for slot in units.iter_mut() {
            let type_id = slot.type_id();
            slot.destroy(&mut Context::new(&mut *meta, type_id, &mut *services));
        }
        units.clear();
        services.events.clear_entity(meta.id);
        services.events.publish(topics::ENTITY_DESTROYED, EventData::Entity(meta.id));
        meta.destroyed = true;
        log::debug!("destroyed game object '{}'", meta.name);
    }

    /// Install the entity-level update hook, invoked after the unit pass
    pub fn set_update_hook(&mut self, hook: UpdateHook) {
        self.update_hook = Some(hook);
    }

    /// Install the entity-level render hook, invoked after the unit pass
    pub fn set_render_hook(&mut self, hook: RenderHook) {
        self.render_hook = Some(hook);
    }

    pub(crate) fn is_awoken(&self) -> bool {
        self.meta.awoken
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.meta.id = id;
    }

    pub(crate) fn set_tag_internal(&mut self, tag: String) {
        self.meta.tag = tag;
    }

    pub(crate) fn set_layer_internal(&mut self, layer: i32) {
        self.meta.layer = layer;
    }

    fn find_slot(&self, type_id: TypeId) -> Option<&BehaviorSlot> {
        self.units.iter().find(|slot| slot.type_id() == type_id)
    }

    fn find_slot_index(&self, type_id: TypeId) -> Option<usize> {
        self.units.iter().position(|slot| slot.type_id() == type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::behavior::Context;
    use crate::Engine;
    use std::any::Any;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Probe {
        destroys: Rc<Cell<u32>>,
        marker: u32,
    }

    impl Probe {
        fn new(destroys: &Rc<Cell<u32>>, marker: u32) -> Self {
            Self {
                destroys: Rc::clone(destroys),
                marker,
            }
        }
    }

    impl Behavior for Probe {
        fn on_destroy(&mut self, _ctx: &mut Context) {
            self.destroys.set(self.destroys.get() + 1);
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

    #[test]
    fn test_replace_on_add() {
        let mut engine = Engine::new();
        let mut entity = GameObject::new("e", &mut engine.transforms);
        let mut services = engine.services();
        let destroys = Rc::new(Cell::new(0));

        entity.add_component(Probe::new(&destroys, 1), &mut services);
        entity.add_component(Probe::new(&destroys, 2), &mut services);

        assert_eq!(entity.component_count(), 1);
        assert_eq!(destroys.get(), 1);
        assert_eq!(entity.component::<Probe>().unwrap().marker, 2);
    }

    #[test]
    fn test_added_unit_catches_up_to_lifecycle() {
        let mut engine = Engine::new();
        let mut entity = GameObject::new("e", &mut engine.transforms);
        let mut services = engine.services();
        entity.awake(&mut services);
        entity.start(&mut services);

        let destroys = Rc::new(Cell::new(0));
        entity.add_component(Probe::new(&destroys, 1), &mut services);

        // Reaching into the slot directly: the late unit must have been
        // awoken and started immediately.
        let slot = entity.find_slot(TypeId::of::<Probe>()).unwrap();
        assert!(slot.awoken());
        assert!(slot.started());
    }

    #[test]
    fn test_component_lookup_miss_returns_none() {
        let mut engine = Engine::new();
        let entity = GameObject::new("e", &mut engine.transforms);
        assert!(entity.component::<Probe>().is_none());
        assert!(!entity.has_component::<Probe>());
    }

    #[test]
    fn test_inactive_owner_disables_units() {
        // Scenario: the composite check includes the owner's active state.
        let mut engine = Engine::new();
        let mut entity = GameObject::new("e", &mut engine.transforms);
        let mut services = engine.services();
        let destroys = Rc::new(Cell::new(0));
        entity.add_component(Probe::new(&destroys, 1), &mut services);

        assert!(entity.is_active());
        assert!(entity.is_component_enabled::<Probe>());

        entity.set_active(false, &mut services);
        assert!(!entity.is_component_enabled::<Probe>());
        // The unit's own flag did not change.
        let slot = entity.find_slot(TypeId::of::<Probe>()).unwrap();
        assert!(slot.enabled());
    }

    #[test]
    fn test_destroy_is_idempotent_and_cascades() {
        let mut engine = Engine::new();
        let mut entity = GameObject::new("e", &mut engine.transforms);
        let mut services = engine.services();
        let destroys = Rc::new(Cell::new(0));
        entity.add_component(Probe::new(&destroys, 1), &mut services);

        entity.destroy(&mut services);
        entity.destroy(&mut services);

        assert!(entity.is_destroyed());
        assert_eq!(destroys.get(), 1);
        assert_eq!(entity.component_count(), 0);
    }

    #[test]
    fn test_remove_component() {
        let mut engine = Engine::new();
        let mut entity = GameObject::new("e", &mut engine.transforms);
        let mut services = engine.services();
        let destroys = Rc::new(Cell::new(0));
        entity.add_component(Probe::new(&destroys, 1), &mut services);

        assert!(entity.remove_component::<Probe>(&mut services));
        assert!(!entity.remove_component::<Probe>(&mut services));
        assert_eq!(destroys.get(), 1);
        assert!(entity.component::<Probe>().is_none());
    }
}
