//! Collision layer bitmasks and the symmetric filter rule

use bitflags::bitflags;

bitflags! {
    /// Collision group membership. A collider belongs to one or more layers
    /// and carries a mask of the layers it is willing to collide with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Layers: u32 {
        /// Catch-all group for colliders with no explicit assignment
        const DEFAULT        = 1 << 0;
        /// Player-controlled entities
        const PLAYER         = 1 << 1;
        /// Static walkable geometry
        const PLATFORM       = 1 << 2;
        /// Hazards and blockers
        const OBSTACLE       = 1 << 3;
        /// Pickups
        const ITEM           = 1 << 4;
        /// Short-lived fired objects
        const PROJECTILE     = 1 << 5;
        /// Non-solid sensor regions
        const TRIGGER_VOLUME = 1 << 6;
        /// Every group, current and future
        const ALL            = u32::MAX;
    }
}

impl Layers {
    /// Numbered custom group, for games that outgrow the named set.
    /// `group(0)` aliases [`Layers::DEFAULT`]. Only groups 0 through 31
    /// exist; higher numbers yield the empty set, which collides with
    /// nothing.
    pub fn group(n: u32) -> Self {
        Self::from_bits_retain(1u32.checked_shl(n).unwrap_or(0))
    }

    /// Symmetric filter: a pair collides only when each side's membership
    /// intersects the other side's mask.
    pub fn should_collide(a_layers: Self, a_mask: Self, b_layers: Self, b_mask: Self) -> bool {
        a_layers.intersects(b_mask) && b_layers.intersects(a_mask)
    }
}

impl Default for Layers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_requires_both_directions() {
        // Player wants platforms; platform wants everyone.
        assert!(Layers::should_collide(
            Layers::PLAYER,
            Layers::PLATFORM,
            Layers::PLATFORM,
            Layers::ALL,
        ));
        // Player wants platforms, but the platform ignores players.
        assert!(!Layers::should_collide(
            Layers::PLAYER,
            Layers::PLATFORM,
            Layers::PLATFORM,
            Layers::OBSTACLE,
        ));
    }

    #[test]
    fn test_disjoint_layers_never_collide() {
        assert!(!Layers::should_collide(
            Layers::ITEM,
            Layers::ALL,
            Layers::PROJECTILE,
            Layers::PLATFORM,
        ));
    }

    #[test]
    fn test_group_aliases_named_layers() {
        assert_eq!(Layers::group(0), Layers::DEFAULT);
        assert_eq!(Layers::group(2), Layers::PLATFORM);
        // Unnamed groups are still usable.
        let custom = Layers::group(12);
        assert!(Layers::should_collide(custom, Layers::ALL, Layers::ALL, Layers::ALL));
    }

    #[test]
    fn test_group_out_of_range_is_empty() {
        assert_eq!(Layers::group(32), Layers::empty());
        assert_eq!(Layers::group(100), Layers::empty());
        assert!(!Layers::should_collide(
            Layers::group(40),
            Layers::ALL,
            Layers::ALL,
            Layers::ALL,
        ));
    }
}
