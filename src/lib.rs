//! # Pogo
//!
//! A lightweight entity-component core for 2D games.
//!
//! ## Features
//!
//! - **Game Objects**: entity containers driving a well-defined component lifecycle
//! - **Transform Hierarchy**: parent/child 2D transforms with cached world values
//! - **Collision Detection**: pairwise AABB broad phase with layer/mask filtering
//! - **Event Bus**: synchronous publish/subscribe with priorities and once semantics
//!
//! Rendering, audio, input, and persistence stay outside the core; the
//! [`platform`] module defines the seams they plug into.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pogo::prelude::*;
//!
//! let mut engine = Engine::new();
//! let mut scene = Scene::new("level-1");
//!
//! let mut player = GameObject::new("player", &mut engine.transforms);
//! player.set_tag("player");
//! let mut services = engine.services();
//! player.add_component(
//!     Collider::new_box(50.0, 50.0).with_layers(Layers::PLAYER, Layers::PLATFORM),
//!     &mut services,
//! );
//! scene.add_game_object(player);
//!
//! scene.load(&mut engine);
//! // per frame, driven by the game loop:
//! engine.update(&mut scene, 16.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod foundation;
pub mod events;
pub mod transform;
pub mod ecs;
pub mod physics;
pub mod platform;

mod config;
mod engine;

pub use config::{CollisionConfig, ConfigError, EngineConfig, LoggingConfig, TimingConfig};
pub use engine::Engine;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        ecs::{
            Behavior, Context, EntityId, EntityMeta, GameObject, Scene, SceneHooks, SceneState,
            Services,
        },
        events::{topics, Event, EventBus, EventData, SubscribeOptions},
        foundation::{math::Vec2, time::Timer},
        physics::{Aabb, Collider, ColliderShape, CollisionEvent, CollisionSystem, Layers},
        platform::Surface,
        transform::{TransformArena, TransformId},
        Engine, EngineConfig,
    };
}
