//! Player state
//!
//! Only the parts of the player the tide cares about: position, clocks and
//! the persistent property table the tide state is stored in.

use serde::{Deserialize, Serialize};

use crate::BASELINE_DELAY;
use crate::dungeon::Coord;
use crate::world::Props;

/// The player character
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct You {
    /// Player name
    pub name: String,

    /// Current position on the level
    pub pos: Coord,

    /// Player turns taken
    pub num_turns: i64,

    /// Game time elapsed, in `BASELINE_DELAY` units per turn
    pub elapsed_time: i64,

    /// Persistent properties (survive level changes)
    pub props: Props,
}

impl You {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Advance both clocks by `turns` full turns
    pub fn pass_turns(&mut self, turns: i64) {
        self.num_turns += turns;
        self.elapsed_time += turns * BASELINE_DELAY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_turns() {
        let mut you = You::new("Tester");
        you.pass_turns(3);
        assert_eq!(you.num_turns, 3);
        assert_eq!(you.elapsed_time, 3 * BASELINE_DELAY);
    }
}
