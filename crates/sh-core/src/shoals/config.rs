//! Tide tuning
//!
//! The raw tide height divided by `multiplier` is the tide actually applied
//! to terrain, so a larger multiplier means a slower visible tide: with a
//! multiplier of X the tide advances visibly about once every X turns.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid tide bounds: low {low}, high {high}")]
    InvalidBounds { low: i32, high: i32 },

    #[error("Invalid tide granularity: {0} (must be 1..3000)")]
    InvalidGranularity(i32),
}

/// Tide simulation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TideConfig {
    /// Raw tide units per visible tide step
    pub multiplier: i32,
    /// Lowest raw tide
    pub low_tide: i32,
    /// Highest raw tide
    pub high_tide: i32,
    /// Cap on the local tide bonus around a tide caller
    pub high_called_tide: i32,
    /// Distance from a bound within which the tide slows down
    pub decel_margin: i32,
    /// Fastest natural tide velocity
    pub peak_velocity: i32,
    /// Velocity while a monster calls the tide
    pub call_velocity: i32,
    /// Radius around a tide caller that gets the local bonus
    pub call_radius: i32,
}

pub const TIDE_MULTIPLIER: i32 = 30;
pub const LOW_TIDE: i32 = -18 * TIDE_MULTIPLIER;
pub const HIGH_TIDE: i32 = 25 * TIDE_MULTIPLIER;
pub const HIGH_CALLED_TIDE: i32 = 50;
pub const TIDE_DECEL_MARGIN: i32 = 8;
pub const PEAK_TIDE_VELOCITY: i32 = 2;
pub const CALL_TIDE_VELOCITY: i32 = 21;
pub const TIDE_CALL_RADIUS: i32 = 8;

impl Default for TideConfig {
    fn default() -> Self {
        Self {
            multiplier: TIDE_MULTIPLIER,
            low_tide: LOW_TIDE,
            high_tide: HIGH_TIDE,
            high_called_tide: HIGH_CALLED_TIDE,
            decel_margin: TIDE_DECEL_MARGIN,
            peak_velocity: PEAK_TIDE_VELOCITY,
            call_velocity: CALL_TIDE_VELOCITY,
            call_radius: TIDE_CALL_RADIUS,
        }
    }
}

impl TideConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TideConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.low_tide < 0 && self.high_tide > 0) {
            return Err(ConfigError::InvalidBounds {
                low: self.low_tide,
                high: self.high_tide,
            });
        }
        if self.multiplier <= 0 {
            return Err(ConfigError::InvalidGranularity(self.multiplier));
        }
        Ok(())
    }

    /// Span of one full tide swing, in raw units
    pub fn tide_unit(&self) -> i32 {
        self.high_tide - self.low_tide
    }

    /// Change the multiplier, rescaling the bounds to match
    pub fn with_granularity(&self, multiplier: i32) -> Result<Self, ConfigError> {
        if !(1..3000).contains(&multiplier) {
            return Err(ConfigError::InvalidGranularity(multiplier));
        }
        Ok(Self {
            low_tide: self.low_tide * multiplier / self.multiplier,
            high_tide: self.high_tide * multiplier / self.multiplier,
            multiplier,
            ..self.clone()
        })
    }
}
