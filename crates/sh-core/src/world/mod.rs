//! World state
//!
//! Persistent property tables shared by the player and levels.

mod props;

pub use props::{PropValue, Props, PropsError};
