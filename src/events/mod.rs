//! Synchronous publish/subscribe event bus
//!
//! Key principles:
//! - Listeners run in descending priority order, stable for equal priority
//! - A failing listener is logged and skipped, never aborts dispatch
//! - "once" registrations are dropped after their single invocation
//! - Subscriptions can be tagged with an owner and cleared in bulk when a
//!   behavior unit or entity is destroyed
//!
//! Dispatch is synchronous and reentrant-unsafe by design: a listener that
//! mutates the same kind's subscriber list mid-dispatch may be skipped or
//! retained until the dispatch finishes. Publishing a different kind from
//! inside a listener is fine.

use crate::ecs::EntityId;
use crate::foundation::math::Vec2;
use crate::physics::CollisionEvent;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Well-known event kinds published by the core itself.
pub mod topics {
    /// A non-trigger collider overlapped another collider this sweep
    pub const COLLISION: &str = "collision";
    /// A trigger collider overlapped another collider this sweep
    pub const TRIGGER: &str = "trigger";
    /// An entity transitioned inactive -> active
    pub const ENTITY_ENABLED: &str = "entity_enabled";
    /// An entity transitioned active -> inactive
    pub const ENTITY_DISABLED: &str = "entity_disabled";
    /// An entity was destroyed
    pub const ENTITY_DESTROYED: &str = "entity_destroyed";
}

/// Error returned by a listener to signal a local failure.
///
/// Dispatch logs the error and continues with the remaining listeners.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl From<String> for ListenerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for ListenerError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Typed payload carried by an [`Event`]
#[derive(Debug, Clone, Default)]
pub enum EventData {
    /// No payload
    #[default]
    None,
    /// An entity id (lifecycle events)
    Entity(EntityId),
    /// A collision or trigger contact
    Collision(CollisionEvent),
    /// A point in world space
    Point(Vec2),
    /// A numeric payload
    Number(f64),
    /// A free-form text payload
    Text(String),
}

/// A dispatched event, passed mutably to every listener in turn
#[derive(Debug)]
pub struct Event {
    kind: String,
    data: EventData,
    default_prevented: bool,
}

impl Event {
    fn new(kind: &str, data: EventData) -> Self {
        Self {
            kind: kind.to_string(),
            data,
            default_prevented: false,
        }
    }

    /// The event kind this event was published under
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The event payload
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Ask the publisher to skip the event's default action.
    ///
    /// [`EventBus::publish`] returns `false` when any listener called this.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether some listener prevented the default action
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Identifies the behavior unit (or entity) that owns a subscription, so the
/// bus can drop every registration of a destroyed owner at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerTag {
    /// Owning entity
    pub entity: EntityId,
    /// Concrete behavior type that registered the subscription
    pub unit: TypeId,
}

impl OwnerTag {
    /// Create an owner tag for a unit of type `unit` on `entity`
    pub fn new(entity: EntityId, unit: TypeId) -> Self {
        Self { entity, unit }
    }
}

/// Registration options for [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscribeOptions {
    /// Higher priority listeners observe events first; default 0
    pub priority: i32,
    /// Drop the registration after its first invocation
    pub once: bool,
    /// Owner for bulk cleanup on destruction
    pub owner: Option<OwnerTag>,
}

impl SubscribeOptions {
    /// Set the dispatch priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Request single-fire semantics
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Tag the subscription with an owner
    pub fn owned_by(mut self, owner: OwnerTag) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Token returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Boxed listener callback.
///
/// Listeners receive the bus itself so they can publish follow-up events;
/// see the module docs for the reentrancy caveat.
pub type Listener = Box<dyn FnMut(&mut EventBus, &mut Event) -> Result<(), ListenerError>>;

struct Registration {
    id: SubscriptionId,
    priority: i32,
    seq: u64,
    once: bool,
    owner: Option<OwnerTag>,
    listener: Listener,
}

/// String-kinded event bus with priority-ordered synchronous dispatch
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<String, Vec<Registration>>,
    next_id: u64,
    dispatch_depth: u32,
    // Unsubscribes that raced an in-flight dispatch; settled when the
    // dispatched list is merged back.
    tombstones: HashSet<SubscriptionId>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kind`.
    ///
    /// The kind's listener list is re-sorted on every registration: priority
    /// descending, registration order for equal priority.
    pub fn subscribe(
        &mut self,
        kind: &str,
        options: SubscribeOptions,
        listener: Listener,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let entries = self.listeners.entry(kind.to_string()).or_default();
        entries.push(Registration {
            id,
            priority: options.priority,
            seq: self.next_id,
            once: options.once,
            owner: options.owner,
            listener,
        });
        Self::sort_entries(entries);
        id
    }

    /// Remove a registration by token. Returns whether anything was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for entries in self.listeners.values_mut() {
            if let Some(index) = entries.iter().position(|entry| entry.id == id) {
                entries.remove(index);
                return true;
            }
        }
        if self.dispatch_depth > 0 {
            // The target may be in a list currently taken out for dispatch.
            self.tombstones.insert(id);
        }
        false
    }

    /// Clear one kind's listeners, or every listener when `kind` is `None`
    pub fn unsubscribe_all(&mut self, kind: Option<&str>) {
        match kind {
            Some(kind) => {
                self.listeners.remove(kind);
            }
            None => self.listeners.clear(),
        }
    }

    /// Drop every subscription registered under `owner`
    pub fn clear_owner(&mut self, owner: OwnerTag) {
        self.retain(|entry| entry.owner != Some(owner));
    }

    /// Drop every subscription owned by any unit of `entity`
    pub fn clear_entity(&mut self, entity: EntityId) {
        self.retain(|entry| entry.owner.map(|tag| tag.entity) != Some(entity));
    }

    /// Publish an event to every listener registered for `kind`, in priority
    /// order. Returns `true` unless a listener prevented the default action.
    pub fn publish(&mut self, kind: &str, data: EventData) -> bool {
        let mut event = Event::new(kind, data);
        let Some(mut entries) = self.listeners.remove(kind) else {
            return true;
        };

        self.dispatch_depth += 1;
        let mut kept = Vec::with_capacity(entries.len());
        for mut entry in entries.drain(..) {
            let outcome = (entry.listener)(self, &mut event);
            if let Err(error) = outcome {
                log::error!("listener for '{}' failed: {}", kind, error);
            }
            if !entry.once {
                kept.push(entry);
            }
        }
        self.dispatch_depth -= 1;

        // Listeners registered for this kind during dispatch land in a fresh
        // list; merge and restore priority order.
        if let Some(added) = self.listeners.remove(kind) {
            kept.extend(added);
        }
        if !self.tombstones.is_empty() {
            kept.retain(|entry| !self.tombstones.remove(&entry.id));
        }
        if self.dispatch_depth == 0 {
            self.tombstones.clear();
        }
        if !kept.is_empty() {
            Self::sort_entries(&mut kept);
            self.listeners.insert(kind.to_string(), kept);
        }

        !event.default_prevented
    }

    /// Number of live registrations for `kind`
    pub fn listener_count(&self, kind: &str) -> usize {
        self.listeners.get(kind).map_or(0, Vec::len)
    }

    fn retain(&mut self, keep: impl Fn(&Registration) -> bool) {
        self.listeners.retain(|_, entries| {
            entries.retain(&keep);
            !entries.is_empty()
        });
    }

    fn sort_entries(entries: &mut [Registration]) {
        entries.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
    }
}
