//! Engine core: owns the shared services and drives the frame
//!
//! Frame order is fixed: entity updates, then the collision sweep (with its
//! event fan-out), then rendering. The host owns the real loop and clock;
//! [`Engine::step`] is a convenience that ticks the built-in timer.

use crate::config::EngineConfig;
use crate::ecs::behavior::Services;
use crate::ecs::scene::Scene;
use crate::events::{topics, EventBus, EventData};
use crate::foundation::time::Timer;
use crate::physics::{Collider, CollisionEvent, CollisionSystem, ContactPair};
use crate::platform::Surface;
use crate::transform::TransformArena;

/// Owner of the shared engine services and the frame driver
pub struct Engine {
    /// Shared transform hierarchy
    pub transforms: TransformArena,
    /// Shared event bus
    pub events: EventBus,
    /// Shared collision registry
    pub collision: CollisionSystem,
    config: EngineConfig,
    timer: Timer,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine with an explicit configuration
    pub fn with_config(config: EngineConfig) -> Self {
        let mut collision = CollisionSystem::new();
        collision.set_participant_warn_threshold(config.collision.participant_warn_threshold);
        let timer = Timer::with_max_delta(config.timing.max_delta_ms);
        Self {
            transforms: TransformArena::new(),
            events: EventBus::new(),
            collision,
            config,
            timer,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Borrow the three shared services as one bundle
    pub fn services(&mut self) -> Services<'_> {
        Services {
            transforms: &mut self.transforms,
            events: &mut self.events,
            collision: &mut self.collision,
        }
    }

    /// One simulation frame: entity updates first, then the collision sweep
    /// with its event fan-out. `delta_ms` comes from the host's clock.
    pub fn update(&mut self, scene: &mut Scene, delta_ms: f32) {
        let mut services = Services {
            transforms: &mut self.transforms,
            events: &mut self.events,
            collision: &mut self.collision,
        };
        scene.update(delta_ms, &mut services);
        self.sweep(scene);
    }

    /// One render frame
    pub fn render(&mut self, scene: &mut Scene, surface: &mut dyn Surface) {
        let mut services = Services {
            transforms: &mut self.transforms,
            events: &mut self.events,
            collision: &mut self.collision,
        };
        scene.render(surface, &mut services);
    }

    /// Tick the built-in timer and run a full frame (update plus render).
    /// Returns the clamped delta in milliseconds.
    pub fn step(&mut self, scene: &mut Scene, surface: &mut dyn Surface) -> f32 {
        let delta_ms = self.timer.tick();
        self.update(scene, delta_ms);
        self.render(scene, surface);
        delta_ms
    }

    /// Detect overlaps and fan each contact out to both sides: a bus event
    /// on the side's own topic (trigger colliders hear `trigger`, solid ones
    /// `collision`), then the `on_collision` hook on the side's units.
    fn sweep(&mut self, scene: &mut Scene) {
        let contacts = self.collision.detect(scene, &mut self.transforms);
        for contact in contacts {
            self.notify_side(scene, &contact, false);
            self.notify_side(scene, &contact, true);
        }
    }

    fn notify_side(&mut self, scene: &mut Scene, contact: &ContactPair, flipped: bool) {
        let (me, other) = if flipped {
            (contact.b, contact.a)
        } else {
            (contact.a, contact.b)
        };
        let is_trigger = scene
            .get(me)
            .and_then(|entity| entity.component::<Collider>())
            .is_some_and(Collider::is_trigger);
        let event = CollisionEvent {
            entity: me,
            other,
            point: contact.point,
            normal: contact.normal,
        };
        let topic = if is_trigger {
            topics::TRIGGER
        } else {
            topics::COLLISION
        };
        self.events.publish(topic, EventData::Collision(event));

        if let Some(entity) = scene.get_mut(me) {
            let mut services = Services {
                transforms: &mut self.transforms,
                events: &mut self.events,
                collision: &mut self.collision,
            };
            entity.dispatch_collision(&event, &mut services);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::behavior::{Behavior, Context};
    use crate::ecs::GameObject;
    use crate::foundation::math::Vec2;
    use crate::platform::NullSurface;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Tracer {
        log: Rc<RefCell<Vec<String>>>,
        label: String,
    }

    impl Tracer {
        fn new(log: &Rc<RefCell<Vec<String>>>, label: &str) -> Self {
            Self {
                log: Rc::clone(log),
                label: label.to_string(),
            }
        }
    }

    impl Behavior for Tracer {
        fn update(&mut self, _ctx: &mut Context, _delta_ms: f32) {
            self.log.borrow_mut().push(format!("{}:update", self.label));
        }
        fn on_collision(&mut self, _ctx: &mut Context, contact: &CollisionEvent) {
            self.log
                .borrow_mut()
                .push(format!("{}:collision:{:?}", self.label, contact.other));
        }
        fn render(&mut self, _ctx: &mut Context, _surface: &mut dyn Surface) {
            self.log.borrow_mut().push(format!("{}:render", self.label));
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn spawn(
        engine: &mut Engine,
        scene: &mut Scene,
        label: &str,
        position: Vec2,
        collider: Collider,
        log: &Rc<RefCell<Vec<String>>>,
    ) -> crate::ecs::EntityId {
        let mut entity = GameObject::new(label, &mut engine.transforms);
        engine.transforms.set_position(entity.transform(), position);
        let mut services = engine.services();
        entity.add_component(Tracer::new(log, label), &mut services);
        entity.add_component(collider, &mut services);
        scene.add_game_object(entity)
    }

    #[test]
    fn test_frame_runs_updates_before_collision_hooks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        spawn(
            &mut engine,
            &mut scene,
            "a",
            Vec2::new(0.0, 0.0),
            Collider::new_box(50.0, 50.0),
            &log,
        );
        spawn(
            &mut engine,
            &mut scene,
            "b",
            Vec2::new(40.0, 0.0),
            Collider::new_box(50.0, 50.0),
            &log,
        );
        scene.load(&mut engine);

        engine.update(&mut scene, 16.0);
        let log = log.borrow();
        assert_eq!(&log[..2], &["a:update", "b:update"]);
        assert!(log[2].starts_with("a:collision"));
        assert!(log[3].starts_with("b:collision"));
    }

    #[test]
    fn test_trigger_and_solid_sides_use_their_own_topics() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        let solid = spawn(
            &mut engine,
            &mut scene,
            "solid",
            Vec2::new(0.0, 0.0),
            Collider::new_box(50.0, 50.0),
            &log,
        );
        let sensor = spawn(
            &mut engine,
            &mut scene,
            "sensor",
            Vec2::new(10.0, 0.0),
            Collider::new_box(50.0, 50.0).as_trigger(),
            &log,
        );
        scene.load(&mut engine);

        let seen = Rc::new(RefCell::new(Vec::new()));
        for topic in [topics::COLLISION, topics::TRIGGER] {
            let seen = Rc::clone(&seen);
            engine.events.subscribe(
                topic,
                Default::default(),
                Box::new(move |_bus, event| {
                    if let EventData::Collision(contact) = event.data() {
                        seen.borrow_mut().push((event.kind().to_string(), contact.entity));
                    }
                    Ok(())
                }),
            );
        }

        engine.update(&mut scene, 16.0);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&(topics::COLLISION.to_string(), solid)));
        assert!(seen.contains(&(topics::TRIGGER.to_string(), sensor)));
    }

    #[test]
    fn test_step_drives_update_and_render() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        spawn(
            &mut engine,
            &mut scene,
            "a",
            Vec2::new(0.0, 0.0),
            Collider::new_box(10.0, 10.0),
            &log,
        );
        scene.load(&mut engine);

        let mut surface = NullSurface::default();
        let delta = engine.step(&mut scene, &mut surface);
        assert!(delta >= 0.0);
        assert_eq!(*log.borrow(), vec!["a:update", "a:render"]);
    }

    #[test]
    fn test_entity_spawned_after_load_joins_the_sweep() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        spawn(
            &mut engine,
            &mut scene,
            "a",
            Vec2::new(0.0, 0.0),
            Collider::new_box(50.0, 50.0),
            &log,
        );
        scene.load(&mut engine);
        engine.update(&mut scene, 16.0);
        assert!(!log.borrow().iter().any(|entry| entry.contains("collision")));

        let b = spawn(
            &mut engine,
            &mut scene,
            "b",
            Vec2::new(40.0, 0.0),
            Collider::new_box(50.0, 50.0),
            &log,
        );
        engine.update(&mut scene, 16.0);
        assert!(engine.collision.is_registered(b));
        assert!(log.borrow().iter().any(|entry| entry.starts_with("a:collision")));
        assert!(log.borrow().iter().any(|entry| entry.starts_with("b:collision")));
    }

    #[test]
    fn test_moving_apart_stops_contacts() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let mut scene = Scene::new("s");
        spawn(
            &mut engine,
            &mut scene,
            "a",
            Vec2::new(0.0, 0.0),
            Collider::new_box(50.0, 50.0),
            &log,
        );
        let b = spawn(
            &mut engine,
            &mut scene,
            "b",
            Vec2::new(40.0, 0.0),
            Collider::new_box(50.0, 50.0),
            &log,
        );
        scene.load(&mut engine);

        engine.update(&mut scene, 16.0);
        assert!(log.borrow().iter().any(|entry| entry.contains("collision")));

        log.borrow_mut().clear();
        let node = scene.get(b).unwrap().transform();
        engine.transforms.set_position(node, Vec2::new(200.0, 0.0));
        engine.update(&mut scene, 16.0);
        assert!(!log.borrow().iter().any(|entry| entry.contains("collision")));
    }
}
