//! Scene registry: the live entity set for one loaded level or screen
//!
//! Owns every registered [`GameObject`], keeps secondary indices by tag and
//! layer, and drives the per-frame update/render passes. Loading walks a
//! four-state machine (NotLoaded -> Loading -> Loaded -> Unloading ->
//! NotLoaded); concrete scenes plug gameplay in through [`SceneHooks`].

use crate::ecs::behavior::Services;
use crate::ecs::game_object::GameObject;
use crate::ecs::EntityId;
use crate::engine::Engine;
use crate::platform::Surface;
use slotmap::SlotMap;
use std::collections::HashMap;

/// Load-state machine of a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// Initial state; also reached again after an unload completes
    NotLoaded,
    /// The populate hook is running
    Loading,
    /// Update and render passes are live
    Loaded,
    /// The depopulate hook is running
    Unloading,
}

/// Seams where gameplay-specific scene code plugs into the core.
///
/// The populate/depopulate hooks run synchronously inside
/// [`Scene::load`]/[`Scene::unload`]; the per-frame hooks run after the
/// entity passes.
pub trait SceneHooks {
    /// Create and register this scene's initial entities
    fn populate(&mut self, _scene: &mut Scene, _engine: &mut Engine) {}
    /// Tear down scene-owned resources before the entity set is drained
    fn depopulate(&mut self, _scene: &mut Scene, _engine: &mut Engine) {}
    /// Scene-level logic, after all entities updated
    fn on_update(&mut self, _scene: &mut Scene, _services: &mut Services, _delta_ms: f32) {}
    /// Scene-level drawing, after all entities rendered
    fn on_render(&mut self, _scene: &mut Scene, _services: &mut Services, _surface: &mut dyn Surface) {}
}

/// Registry owning the live set of game objects for one scene
pub struct Scene {
    name: String,
    entities: SlotMap<EntityId, GameObject>,
    order: Vec<EntityId>,
    by_tag: HashMap<String, Vec<EntityId>>,
    by_layer: HashMap<i32, Vec<EntityId>>,
    state: SceneState,
    hooks: Option<Box<dyn SceneHooks>>,
}

impl Scene {
    /// Create an empty, not-loaded scene
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entities: SlotMap::with_key(),
            order: Vec::new(),
            by_tag: HashMap::new(),
            by_layer: HashMap::new(),
            state: SceneState::NotLoaded,
            hooks: None,
        }
    }

    /// Create a scene with gameplay hooks attached
    pub fn with_hooks(name: &str, hooks: Box<dyn SceneHooks>) -> Self {
        let mut scene = Self::new(name);
        scene.hooks = Some(hooks);
        scene
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current load state
    pub fn state(&self) -> SceneState {
        self.state
    }

    /// Number of registered game objects
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the scene holds no game objects
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // --- registry --------------------------------------------------------

    /// Register a game object, assign its id, and index it by tag and layer.
    ///
    /// Objects added while the scene is Loaded are awoken and started at the
    /// top of the next [`Scene::update`], so they join that frame's passes.
    pub fn add_game_object(&mut self, game_object: GameObject) -> EntityId {
        let id = self.entities.insert_with_key(|key| {
            let mut game_object = game_object;
            game_object.assign_id(key);
            game_object
        });
        self.order.push(id);
        let entity = &self.entities[id];
        if !entity.tag().is_empty() {
            self.by_tag.entry(entity.tag().to_string()).or_default().push(id);
        }
        self.by_layer.entry(entity.layer()).or_default().push(id);
        log::trace!("scene '{}': added '{}'", self.name, self.entities[id].name());
        id
    }

    /// Destroy (if still alive) and remove a game object, dropping it from
    /// every index and freeing its transform. Returns `false` for unknown
    /// ids.
    pub fn remove_game_object(&mut self, id: EntityId, services: &mut Services) -> bool {
        if !self.entities.contains_key(id) {
            return false;
        }
        if let Some(entity) = self.entities.get_mut(id) {
            entity.destroy(services);
        }
        self.remove_internal(id, services);
        true
    }

    /// Borrow a game object by id; `None` for unknown ids
    pub fn get(&self, id: EntityId) -> Option<&GameObject> {
        self.entities.get(id)
    }

    /// Mutably borrow a game object by id
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.entities.get_mut(id)
    }

    /// Ids of every object registered under `tag`, in insertion order
    pub fn find_by_tag(&self, tag: &str) -> &[EntityId] {
        self.by_tag.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Ids of every object on `layer`, in insertion order
    pub fn find_by_layer(&self, layer: i32) -> &[EntityId] {
        self.by_layer.get(&layer).map_or(&[], Vec::as_slice)
    }

    /// First object whose display name matches, by linear scan
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.order
            .iter()
            .copied()
            .find(|&id| self.entities.get(id).is_some_and(|e| e.name() == name))
    }

    /// Ids in insertion order
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Retag a registered object, keeping the tag index consistent
    pub fn set_entity_tag(&mut self, id: EntityId, tag: &str) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let old = entity.tag().to_string();
        entity.set_tag_internal(tag.to_string());
        if !old.is_empty() {
            Self::unindex(&mut self.by_tag, &old, id);
        }
        if !tag.is_empty() {
            self.by_tag.entry(tag.to_string()).or_default().push(id);
        }
    }

    /// Move a registered object to another layer, keeping the layer index
    /// consistent
    pub fn set_entity_layer(&mut self, id: EntityId, layer: i32) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let old = entity.layer();
        if old == layer {
            return;
        }
        entity.set_layer_internal(layer);
        Self::unindex(&mut self.by_layer, &old, id);
        self.by_layer.entry(layer).or_default().push(id);
    }

    // --- load state machine --------------------------------------------------

    /// Drive NotLoaded -> Loading -> Loaded: run the populate hook, then
    /// awake every entity, then start every entity (two full passes, so
    /// `on_start` can rely on every sibling having completed `on_awake`).
    /// No-op in any state but NotLoaded.
    pub fn load(&mut self, engine: &mut Engine) {
        if self.state != SceneState::NotLoaded {
            log::debug!(
                "scene '{}': load ignored in state {:?}",
                self.name,
                self.state
            );
            return;
        }
        log::info!("scene '{}': loading", self.name);
        self.state = SceneState::Loading;

        let mut hooks = self.hooks.take();
        if let Some(hooks) = hooks.as_mut() {
            hooks.populate(self, engine);
        }
        self.hooks = hooks;

        let order = self.order.clone();
        let mut services = engine.services();
        for &id in &order {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.awake(&mut services);
            }
        }
        for &id in &order {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.start(&mut services);
            }
        }

        self.state = SceneState::Loaded;
        log::info!("scene '{}': loaded {} entities", self.name, self.len());
    }

    /// Drive Loaded -> Unloading -> NotLoaded: run the depopulate hook, then
    /// destroy and drain every entity. No-op in any state but Loaded.
    pub fn unload(&mut self, engine: &mut Engine) {
        if self.state != SceneState::Loaded {
            log::debug!(
                "scene '{}': unload ignored in state {:?}",
                self.name,
                self.state
            );
            return;
        }
        log::info!("scene '{}': unloading", self.name);
        self.state = SceneState::Unloading;

        let mut hooks = self.hooks.take();
        if let Some(hooks) = hooks.as_mut() {
            hooks.depopulate(self, engine);
        }
        self.hooks = hooks;

        let mut services = engine.services();
        for id in self.order.clone() {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.destroy(&mut services);
            }
            self.remove_internal(id, &mut services);
        }

        self.state = SceneState::NotLoaded;
    }

    // --- frame passes ----------------------------------------------------------

    /// One update pass: catch up entities added since load, reap destroyed
    /// entities, update the remaining active ones in insertion order, then
    /// the scene-level hook. No-op unless Loaded.
    pub fn update(&mut self, delta_ms: f32, services: &mut Services) {
        if self.state != SceneState::Loaded {
            return;
        }

        // Entities registered after load() reach liveness here, with the
        // same awake-all-then-start-all ordering load() gives the initial
        // set.
        let pending: Vec<EntityId> = self
            .order
            .iter()
            .copied()
            .filter(|&id| self.entities.get(id).is_some_and(|e| !e.is_awoken()))
            .collect();
        for &id in &pending {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.awake(services);
            }
        }
        for &id in &pending {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.start(services);
            }
        }

        let dead: Vec<EntityId> = self
            .order
            .iter()
            .copied()
            .filter(|&id| self.entities.get(id).is_none_or(GameObject::is_destroyed))
            .collect();
        for id in dead {
            self.remove_internal(id, services);
        }

        for id in self.order.clone() {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.update(delta_ms, services);
            }
        }

        let mut hooks = self.hooks.take();
        if let Some(hooks) = hooks.as_mut() {
            hooks.on_update(self, services, delta_ms);
        }
        self.hooks = hooks;
    }

    /// One render pass: clear the surface, render active entities sorted
    /// ascending by layer (insertion order for equal layers), then the
    /// scene-level hook. No-op unless Loaded.
    pub fn render(&mut self, surface: &mut dyn Surface, services: &mut Services) {
        if self.state != SceneState::Loaded {
            return;
        }
        surface.clear();

        let mut pass = self.order.clone();
        // Stable sort: insertion order survives within a layer.
        pass.sort_by_key(|&id| self.entities.get(id).map_or(0, GameObject::layer));
        for id in pass {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.render(surface, services);
            }
        }

        let mut hooks = self.hooks.take();
        if let Some(hooks) = hooks.as_mut() {
            hooks.on_render(self, services, surface);
        }
        self.hooks = hooks;
    }

    // --- internals --------------------------------------------------------

    fn remove_internal(&mut self, id: EntityId, services: &mut Services) {
        let Some(entity) = self.entities.remove(id) else {
            return;
        };
        self.order.retain(|&other| other != id);
        if !entity.tag().is_empty() {
            Self::unindex(&mut self.by_tag, entity.tag(), id);
        }
        Self::unindex(&mut self.by_layer, &entity.layer(), id);
        services.transforms.free(entity.transform());
        services.collision.unregister(id);
    }

    fn unindex<K, Q>(index: &mut HashMap<K, Vec<EntityId>>, key: &Q, id: EntityId)
    where
        K: std::hash::Hash + Eq + std::borrow::Borrow<Q>,
        Q: std::hash::Hash + Eq + ?Sized,
    {
        if let Some(bucket) = index.get_mut(key) {
            bucket.retain(|&other| other != id);
            if bucket.is_empty() {
                index.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::behavior::{Behavior, Context};
    use crate::platform::NullSurface;
    use crate::Engine;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
        label: String,
    }

    impl Recorder {
        fn new(log: &Rc<RefCell<Vec<String>>>, label: &str) -> Self {
            Self {
                log: Rc::clone(log),
                label: label.to_string(),
            }
        }
        fn push(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}:{}", self.label, what));
        }
    }

    impl Behavior for Recorder {
        fn on_awake(&mut self, _ctx: &mut Context) {
            self.push("awake");
        }
        fn on_start(&mut self, _ctx: &mut Context) {
            self.push("start");
        }
        fn update(&mut self, _ctx: &mut Context, _delta_ms: f32) {
            self.push("update");
        }
        fn render(&mut self, _ctx: &mut Context, _surface: &mut dyn Surface) {
            self.push("render");
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct CountingHooks {
        populates: Rc<RefCell<u32>>,
    }

    impl SceneHooks for CountingHooks {
        fn populate(&mut self, scene: &mut Scene, engine: &mut Engine) {
            *self.populates.borrow_mut() += 1;
            scene.add_game_object(GameObject::new("from-hook", &mut engine.transforms));
        }
    }

    fn spawn(scene: &mut Scene, engine: &mut Engine, name: &str, tag: &str, layer: i32) -> super::EntityId {
        let mut entity = GameObject::new(name, &mut engine.transforms);
        entity.set_tag(tag);
        entity.set_layer(layer);
        scene.add_game_object(entity)
    }

    #[test]
    fn test_load_twice_is_noop() {
        let populates = Rc::new(RefCell::new(0));
        let mut engine = Engine::new();
        let mut scene = Scene::with_hooks(
            "s",
            Box::new(CountingHooks {
                populates: Rc::clone(&populates),
            }),
        );

        scene.load(&mut engine);
        scene.load(&mut engine);

        assert_eq!(scene.state(), SceneState::Loaded);
        assert_eq!(*populates.borrow(), 1);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_load_awakes_all_before_starting_any() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        for label in ["a", "b"] {
            let mut entity = GameObject::new(label, &mut engine.transforms);
            let mut services = engine.services();
            entity.add_component(Recorder::new(&log, label), &mut services);
            scene.add_game_object(entity);
        }

        scene.load(&mut engine);
        assert_eq!(
            *log.borrow(),
            vec!["a:awake", "b:awake", "a:start", "b:start"]
        );
    }

    #[test]
    fn test_entities_added_after_load_catch_up_on_next_update() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        scene.load(&mut engine);

        for label in ["a", "b"] {
            let mut entity = GameObject::new(label, &mut engine.transforms);
            let mut services = engine.services();
            entity.add_component(Recorder::new(&log, label), &mut services);
            scene.add_game_object(entity);
        }
        // Nothing fires until the next update pass.
        assert!(log.borrow().is_empty());

        let mut services = engine.services();
        scene.update(16.0, &mut services);
        assert_eq!(
            *log.borrow(),
            vec![
                "a:awake", "b:awake", "a:start", "b:start", "a:update", "b:update"
            ]
        );
    }

    #[test]
    fn test_update_reaps_destroyed_entities_and_indices() {
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        let a = spawn(&mut scene, &mut engine, "a", "platform", 1);
        let b = spawn(&mut scene, &mut engine, "b", "platform", 1);
        scene.load(&mut engine);
        assert_eq!(scene.find_by_tag("platform"), &[a, b]);

        let mut services = engine.services();
        scene.get_mut(a).unwrap().destroy(&mut services);
        // Destroyed but not yet reaped.
        assert!(scene.get(a).is_some());

        scene.update(16.0, &mut services);
        assert!(scene.get(a).is_none());
        assert_eq!(scene.find_by_tag("platform"), &[b]);
        assert_eq!(scene.find_by_layer(1), &[b]);
    }

    #[test]
    fn test_index_buckets_are_pruned() {
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        let a = spawn(&mut scene, &mut engine, "a", "only", 7);
        let mut services = engine.services();

        assert!(scene.remove_game_object(a, &mut services));
        assert!(scene.find_by_tag("only").is_empty());
        assert!(scene.find_by_layer(7).is_empty());
        assert!(!scene.remove_game_object(a, &mut services));
    }

    #[test]
    fn test_update_ignored_unless_loaded() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        let mut entity = GameObject::new("a", &mut engine.transforms);
        {
            let mut services = engine.services();
            entity.add_component(Recorder::new(&log, "a"), &mut services);
        }
        scene.add_game_object(entity);

        let mut services = engine.services();
        scene.update(16.0, &mut services);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_render_sorts_by_layer_stable() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        // Insertion order: c(5), a(1), b(1). Render must be a, b, c.
        for (label, layer) in [("c", 5), ("a", 1), ("b", 1)] {
            let mut entity = GameObject::new(label, &mut engine.transforms);
            entity.set_layer(layer);
            let mut services = engine.services();
            entity.add_component(Recorder::new(&log, label), &mut services);
            scene.add_game_object(entity);
        }
        scene.load(&mut engine);
        log.borrow_mut().clear();

        let mut services = engine.services();
        let mut surface = NullSurface::default();
        scene.render(&mut surface, &mut services);
        assert_eq!(*log.borrow(), vec!["a:render", "b:render", "c:render"]);
    }

    #[test]
    fn test_unload_drains_everything() {
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        spawn(&mut scene, &mut engine, "a", "t", 0);
        scene.load(&mut engine);

        scene.unload(&mut engine);
        assert_eq!(scene.state(), SceneState::NotLoaded);
        assert!(scene.is_empty());
        assert!(engine.transforms.is_empty());
    }

    #[test]
    fn test_retag_and_relayer_keep_indices_consistent() {
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        let a = spawn(&mut scene, &mut engine, "a", "old", 1);

        scene.set_entity_tag(a, "new");
        assert!(scene.find_by_tag("old").is_empty());
        assert_eq!(scene.find_by_tag("new"), &[a]);

        scene.set_entity_layer(a, 3);
        assert!(scene.find_by_layer(1).is_empty());
        assert_eq!(scene.find_by_layer(3), &[a]);
    }

    #[test]
    fn test_find_by_name() {
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        let a = spawn(&mut scene, &mut engine, "hero", "", 0);
        assert_eq!(scene.find_by_name("hero"), Some(a));
        assert_eq!(scene.find_by_name("villain"), None);
    }
}
