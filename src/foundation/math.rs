//! 2D math primitives and small helpers
//!
//! Thin aliases over nalgebra so the rest of the crate never names the
//! library directly.

/// 2D vector of f32 components
pub type Vec2 = nalgebra::Vector2<f32>;

/// Componentwise vector division with an explicit zero check.
///
/// Returns `None` if any component of `rhs` is zero. This is the only
/// degenerate-geometry guard in the crate; everything else lets the
/// arithmetic produce whatever it produces.
pub fn try_component_div(lhs: Vec2, rhs: Vec2) -> Option<Vec2> {
    if rhs.x == 0.0 || rhs.y == 0.0 {
        return None;
    }
    Some(Vec2::new(lhs.x / rhs.x, lhs.y / rhs.y))
}

/// Componentwise vector multiplication
pub fn component_mul(lhs: Vec2, rhs: Vec2) -> Vec2 {
    Vec2::new(lhs.x * rhs.x, lhs.y * rhs.y)
}

/// Wrap an angle in radians to the `(-PI, PI]` range
pub fn wrap_angle(radians: f32) -> f32 {
    use std::f32::consts::PI;
    let mut a = radians % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}
