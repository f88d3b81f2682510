//! sh-core: Shoals terrain and tide simulation
//!
//! This crate contains the height-field terrain model, the Shoals level
//! generator and the tide engine, with no I/O dependencies.
//! It is designed to be pure and testable: all randomness goes through
//! [`RngStreams`] and all state lives in [`GameState`].

pub mod dungeon;
pub mod player;
pub mod shoals;
pub mod world;

mod consts;
mod rng;
mod state;

pub use consts::*;
pub use rng::{GameRng, IntRange, RngScope, RngStream, RngStreams};
pub use state::GameState;
