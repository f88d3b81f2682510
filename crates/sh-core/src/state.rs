//! Game state threaded through the tide and level passes

use serde::{Deserialize, Serialize};

use crate::dungeon::Level;
use crate::player::You;
use crate::rng::RngStreams;
use crate::shoals::{self, ShoalsState, TideConfig};

/// Everything a running Shoals game needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Player character
    pub player: You,

    /// Current level
    pub current_level: Level,

    /// Random number generators
    pub rng: RngStreams,

    /// Tide context, rebuilt on restore
    #[serde(skip)]
    pub shoals: ShoalsState,

    /// Messages for the current turn
    #[serde(skip)]
    pub messages: Vec<String>,
}

impl GameState {
    pub fn new(seed: u64, level: Level) -> Self {
        Self {
            player: You::new("Player"),
            current_level: level,
            rng: RngStreams::new(seed),
            shoals: ShoalsState::default(),
            messages: Vec::new(),
        }
    }

    /// Replace the tide configuration
    pub fn with_tide_config(mut self, config: TideConfig) -> Self {
        self.shoals = ShoalsState::new(config);
        self
    }

    /// Add a message to display
    pub fn message(&mut self, msg: impl Into<String>) {
        self.messages.push(msg.into());
    }

    /// Clear messages
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Let one player turn pass, moving the tide along with it
    pub fn take_turn(&mut self) {
        self.player.pass_turns(1);
        shoals::apply_tides(self, 1, false);
    }

    /// Catch up on `turns` turns spent away from the level
    pub fn return_after(&mut self, turns: i64) {
        self.player.pass_turns(turns);
        shoals::apply_tides(self, turns, true);
    }
}
