//! Foundation utilities: math, timing, and logging
//!
//! Small leaf modules with no dependencies on the rest of the crate.

pub mod logging;
pub mod math;
pub mod time;
