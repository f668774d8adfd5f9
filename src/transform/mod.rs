//! Hierarchical 2D transforms with cached world-space values
//!
//! Nodes live in an arena ([`TransformArena`]) and reference each other by
//! [`TransformId`], so parent links and child lists are non-owning and the
//! hierarchy never forms an ownership cycle. Every entity owns exactly one
//! node, allocated at construction.
//!
//! Mutating any local value (or reparenting) eagerly marks the whole subtree
//! dirty; world values are recomputed lazily on read, resolving the parent
//! chain first. Composition is `world = parent.world ⊕ local`: translation
//! additive, rotation additive, scale componentwise multiplicative.

use crate::foundation::math::{component_mul, Vec2};
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Stable handle to a node in a [`TransformArena`]
    pub struct TransformId;
}

/// Errors raised by hierarchy mutations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// Reparenting would place a node under its own descendant (or itself)
    #[error("reparenting would create a cycle")]
    CycleDetected,
}

#[derive(Debug, Clone)]
struct Node {
    local_position: Vec2,
    local_rotation: f32,
    local_scale: Vec2,
    parent: Option<TransformId>,
    children: Vec<TransformId>,
    world_position: Vec2,
    world_rotation: f32,
    world_scale: Vec2,
    dirty: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            local_position: Vec2::zeros(),
            local_rotation: 0.0,
            local_scale: Vec2::new(1.0, 1.0),
            parent: None,
            children: Vec::new(),
            world_position: Vec2::zeros(),
            world_rotation: 0.0,
            world_scale: Vec2::new(1.0, 1.0),
            dirty: true,
        }
    }
}

/// Arena owning every transform node in the process.
///
/// Accessing a freed or foreign id is a programming error and panics.
#[derive(Default)]
pub struct TransformArena {
    nodes: SlotMap<TransformId, Node>,
}

impl TransformArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a root node with identity local values
    pub fn alloc(&mut self) -> TransformId {
        self.nodes.insert(Node::default())
    }

    /// Free a node, detaching it from its parent. Surviving children are
    /// re-rooted: they keep their local values and are marked dirty.
    pub fn free(&mut self, id: TransformId) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        if let Some(parent) = node.parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|&child| child != id);
            }
        }
        for child in node.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
            self.mark_subtree_dirty(child);
        }
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: TransformId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // --- local accessors -------------------------------------------------

    /// Local position relative to the parent
    pub fn position(&self, id: TransformId) -> Vec2 {
        self.nodes[id].local_position
    }

    /// Local rotation in radians
    pub fn rotation(&self, id: TransformId) -> f32 {
        self.nodes[id].local_rotation
    }

    /// Local scale factors
    pub fn scale(&self, id: TransformId) -> Vec2 {
        self.nodes[id].local_scale
    }

    /// Parent node, if any
    pub fn parent(&self, id: TransformId) -> Option<TransformId> {
        self.nodes[id].parent
    }

    /// Child nodes, in attach order
    pub fn children(&self, id: TransformId) -> &[TransformId] {
        &self.nodes[id].children
    }

    // --- local mutators ---------------------------------------------------

    /// Set the local position and invalidate the subtree
    pub fn set_position(&mut self, id: TransformId, position: Vec2) {
        self.nodes[id].local_position = position;
        self.mark_subtree_dirty(id);
    }

    /// Offset the local position and invalidate the subtree
    pub fn translate(&mut self, id: TransformId, delta: Vec2) {
        self.nodes[id].local_position += delta;
        self.mark_subtree_dirty(id);
    }

    /// Set the local rotation (radians) and invalidate the subtree
    pub fn set_rotation(&mut self, id: TransformId, radians: f32) {
        self.nodes[id].local_rotation = radians;
        self.mark_subtree_dirty(id);
    }

    /// Add to the local rotation (radians) and invalidate the subtree
    pub fn rotate(&mut self, id: TransformId, radians: f32) {
        self.nodes[id].local_rotation += radians;
        self.mark_subtree_dirty(id);
    }

    /// Set the local scale and invalidate the subtree
    pub fn set_scale(&mut self, id: TransformId, scale: Vec2) {
        self.nodes[id].local_scale = scale;
        self.mark_subtree_dirty(id);
    }

    /// Reattach `id` under `new_parent` (or detach to root with `None`).
    ///
    /// Fails fast with [`TransformError::CycleDetected`] if `new_parent` is
    /// `id` itself or one of its descendants.
    pub fn set_parent(
        &mut self,
        id: TransformId,
        new_parent: Option<TransformId>,
    ) -> Result<(), TransformError> {
        if let Some(candidate) = new_parent {
            let mut cursor = Some(candidate);
            while let Some(current) = cursor {
                if current == id {
                    return Err(TransformError::CycleDetected);
                }
                cursor = self.nodes[current].parent;
            }
        }

        if let Some(old_parent) = self.nodes[id].parent {
            if let Some(parent_node) = self.nodes.get_mut(old_parent) {
                parent_node.children.retain(|&child| child != id);
            }
        }
        self.nodes[id].parent = new_parent;
        if let Some(parent) = new_parent {
            self.nodes[parent].children.push(id);
        }
        self.mark_subtree_dirty(id);
        Ok(())
    }

    // --- world accessors ---------------------------------------------------

    /// World-space position, recomputing stale caches up the parent chain
    pub fn world_position(&mut self, id: TransformId) -> Vec2 {
        self.resolve(id);
        self.nodes[id].world_position
    }

    /// World-space rotation in radians
    pub fn world_rotation(&mut self, id: TransformId) -> f32 {
        self.resolve(id);
        self.nodes[id].world_rotation
    }

    /// World-space scale factors
    pub fn world_scale(&mut self, id: TransformId) -> Vec2 {
        self.resolve(id);
        self.nodes[id].world_scale
    }

    /// Recompute `id`'s cached world values if stale. Parents are resolved
    /// first; children's dirty flags stay set until they are read themselves.
    fn resolve(&mut self, id: TransformId) {
        if !self.nodes[id].dirty {
            return;
        }
        match self.nodes[id].parent {
            None => {
                let node = &mut self.nodes[id];
                node.world_position = node.local_position;
                node.world_rotation = node.local_rotation;
                node.world_scale = node.local_scale;
                node.dirty = false;
            }
            Some(parent) => {
                self.resolve(parent);
                let (parent_position, parent_rotation, parent_scale) = {
                    let parent_node = &self.nodes[parent];
                    (
                        parent_node.world_position,
                        parent_node.world_rotation,
                        parent_node.world_scale,
                    )
                };
                let node = &mut self.nodes[id];
                node.world_position = parent_position + node.local_position;
                node.world_rotation = parent_rotation + node.local_rotation;
                node.world_scale = component_mul(parent_scale, node.local_scale);
                node.dirty = false;
            }
        }
    }

    fn mark_subtree_dirty(&mut self, root: TransformId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id];
            node.dirty = true;
            stack.extend_from_slice(&node.children);
        }
    }

    #[cfg(test)]
    fn is_dirty(&self, id: TransformId) -> bool {
        self.nodes[id].dirty
    }
}
