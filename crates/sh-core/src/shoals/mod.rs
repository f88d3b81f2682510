//! The Shoals: island levels built from a height field, and the tide that
//! floods and drains their shores

mod config;
mod connect;
mod generate;
mod reconcile;
mod terrain;
mod tide;

pub use config::{
    CALL_TIDE_VELOCITY, ConfigError, HIGH_CALLED_TIDE, HIGH_TIDE, LOW_TIDE, PEAK_TIDE_VELOCITY,
    TIDE_CALL_RADIUS, TIDE_DECEL_MARGIN, TIDE_MULTIPLIER, TideConfig,
};
pub use connect::{CONNECT_TARGET_HEIGHT, connect_point};
pub use generate::{SHOALS_MARGIN, build_shoals_level, pick_vault_island};
pub use reconcile::postprocess_level;
pub use terrain::{
    SHT_FLOOR, SHT_ROCK, SHT_SHALLOW_WATER, SHT_STONE, TideDirection, feature_by_height,
    feature_height, tide_height_change, tide_passable, tide_susceptible,
};
pub use tide::{
    ShoalsState, TIDE_CALL_TURN_PROP, TIDE_HEIGHT_PROP, TIDE_SEED_PROP, TIDE_UPDATE_TIME_PROP,
    TIDE_VELOCITY_PROP, TideCaller, TideState, apply_tide, apply_tide_at, apply_tides, force_tide,
    release_tide,
};
