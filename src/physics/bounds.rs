//! Axis-aligned bounding boxes in screen space (y grows downward)

use crate::foundation::math::Vec2;

/// Axis-aligned rectangle given by its top-left corner and extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Horizontal extent, non-negative
    pub width: f32,
    /// Vertical extent, non-negative
    pub height: f32,
}

impl Aabb {
    /// Build from the top-left corner
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from a center point and full extents
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict-inequality overlap test. Boxes that merely share an edge do
    /// not overlap, and a zero-extent box overlaps nothing.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Inclusive point containment
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Ray intersection by the 2D slab method. `direction` must be
    /// normalized; the return value is the distance along the ray to the
    /// entry point, or 0.0 when the origin starts inside. `None` when the
    /// ray misses.
    pub fn intersect_ray(&self, origin: Vec2, direction: Vec2) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..2 {
            let (lo, hi) = if axis == 0 {
                (self.x, self.right())
            } else {
                (self.y, self.bottom())
            };
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < f32::EPSILON {
                // Parallel to this slab; must already be inside it.
                if o < lo || o > hi {
                    return None;
                }
            } else {
                let inv = 1.0 / d;
                let mut t0 = (lo - o) * inv;
                let mut t1 = (hi - o) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return None;
                }
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}
