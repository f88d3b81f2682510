//! Core constants
//!
//! Map geometry and time units shared by every module.

/// Map dimensions (including the permanent outer ring)
pub const GXM: i32 = 80;
pub const GYM: i32 = 70;

/// First and last coordinates that count as in bounds
pub const X_BOUND_1: i32 = 1;
pub const X_BOUND_2: i32 = GXM - 2;
pub const Y_BOUND_1: i32 = 1;
pub const Y_BOUND_2: i32 = GYM - 2;

/// Elapsed-time units per player turn
pub const BASELINE_DELAY: i64 = 10;
