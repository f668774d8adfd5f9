//! Entity-component core
//!
//! [`GameObject`]s own [`Behavior`] units keyed by concrete type and drive
//! their lifecycle; the [`Scene`] registry owns the live set of game objects
//! and runs the per-frame update/render passes.

pub mod behavior;
pub mod game_object;
pub mod scene;

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle to a [`GameObject`] registered in a [`Scene`]
    pub struct EntityId;
}

pub use behavior::{Behavior, BehaviorSlot, Context, Services};
pub use game_object::{EntityMeta, GameObject};
pub use scene::{Scene, SceneHooks, SceneState};
