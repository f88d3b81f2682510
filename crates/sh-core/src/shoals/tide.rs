//! Tide simulation for Shoals levels
//!
//! The tide is a single scalar that swings between the configured low and
//! high bounds, slowing near each bound and bouncing off it. The scalar is
//! kept in the player's properties so every Shoals level shares one tide.
//! Whenever the visible tide changes, a wavefront spreads out from the map
//! corners (and any `tide_seed` markers) and converts floor to shallow water
//! or back, depending on each cell's height.

use serde::{Deserialize, Serialize};

use crate::dungeon::{Branch, CellFlags, Coord, Enchantments, Feature, Level, MonsterId, in_bounds};
use crate::player::You;
use crate::rng::{GameRng, RngStream};
use crate::world::{Props, PropsError};
use crate::{BASELINE_DELAY, GXM, GYM, GameState};

use super::config::TideConfig;
use super::terrain::{
    TideDirection, feature_by_height, tide_height_change, tide_passable, tide_susceptible,
};

/// Player and level property holding the raw tide height
pub const TIDE_HEIGHT_PROP: &str = "shoals-tide-height";
/// Player property holding the tide velocity
pub const TIDE_VELOCITY_PROP: &str = "shoals-tide-velocity";
/// Player property holding the elapsed time of the last tide update
pub const TIDE_UPDATE_TIME_PROP: &str = "shoals-tide-update-time";
/// Monster property holding the turn it started calling the tide
pub const TIDE_CALL_TURN_PROP: &str = "tide-call-turn";
/// Marker property that makes a marker an extra wavefront seed
pub const TIDE_SEED_PROP: &str = "tide_seed";

/// Raw tide scalars as stored in the player's properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TideState {
    /// Raw tide height
    pub height: i32,
    /// Change applied on the next step
    pub velocity: i32,
    /// Elapsed game time of the last update
    pub updated_at: i64,
}

impl TideState {
    /// A slack tide about to rise
    pub fn initial(config: &TideConfig) -> Self {
        Self {
            height: 0,
            velocity: config.peak_velocity,
            updated_at: 0,
        }
    }

    pub fn from_props(props: &Props) -> Result<Self, PropsError> {
        Ok(Self {
            height: props.get_int(TIDE_HEIGHT_PROP)?,
            velocity: props.get_int(TIDE_VELOCITY_PROP)?,
            updated_at: props.get_long(TIDE_UPDATE_TIME_PROP)?,
        })
    }

    pub fn store(&self, props: &mut Props) {
        props.set_int(TIDE_HEIGHT_PROP, self.height);
        props.set_int(TIDE_VELOCITY_PROP, self.velocity);
        props.set_long(TIDE_UPDATE_TIME_PROP, self.updated_at);
    }

    /// Advance the tide by one turn.
    ///
    /// A called tide surges at the call velocity. Otherwise the velocity
    /// doubles until it reaches the peak, halves inside the deceleration
    /// margin and reverses when the tide hits a bound.
    pub fn run_tide(&mut self, config: &TideConfig, called: bool) {
        let tide = &mut self.height;
        let acc = &mut self.velocity;

        if called {
            *acc = config.call_velocity;
        } else if acc.abs() > config.peak_velocity {
            *acc = -config.peak_velocity;
        }

        *tide = (*tide + *acc).clamp(config.low_tide, config.high_tide);
        if (*tide == config.high_tide && *acc > 0) || (*tide == config.low_tide && *acc < 0) {
            *acc = -*acc;
        }

        let in_decel_margin = (*tide - config.high_tide).abs() < config.decel_margin
            || (*tide - config.low_tide).abs() < config.decel_margin;
        if (acc.abs() > 1) == in_decel_margin {
            *acc = if in_decel_margin { *acc / 2 } else { *acc * 2 };
        }
    }
}

/// A monster currently calling the tide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TideCaller {
    pub pos: Coord,
    /// Turns since the call began, at least 1
    pub called_turns: i64,
    /// Extra tide right under the caller
    pub called_peak: i32,
}

impl TideCaller {
    /// The first monster on the level calling the tide, if any
    pub fn find(level: &Level, you: &You, config: &TideConfig) -> Option<Self> {
        let mons = level
            .monsters
            .iter()
            .find(|m| m.has_ench(Enchantments::TIDE))?;
        let call_turn = mons.props.get_long(TIDE_CALL_TURN_PROP).unwrap_or(0);
        let called_turns = (you.num_turns - call_turn).max(1);
        let called_peak = i64::from(config.high_called_tide).min(called_turns * 5) as i32;
        Some(Self {
            pos: mons.pos,
            called_turns,
            called_peak,
        })
    }
}

/// Transient tide context owned by the game state
#[derive(Debug, Clone, Default)]
pub struct ShoalsState {
    /// Direction of the last propagating update
    pub direction: TideDirection,
    /// Set only while an update is running
    pub caller: Option<TideCaller>,
    pub config: TideConfig,
}

impl ShoalsState {
    pub fn new(config: TideConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Tide at `c`, raised near a tide caller
    pub fn tide_at(&self, c: Coord, base_tide: i32) -> i32 {
        let Some(caller) = self.caller else {
            return base_tide;
        };
        let radius = self.config.call_radius;
        if c.grid_distance(caller.pos) > radius {
            return base_tide;
        }
        let distance = f64::from(c.distance2(caller.pos)).sqrt() as i32;
        if distance > radius {
            return base_tide;
        }
        base_tide + (caller.called_peak - distance * 3).max(0)
    }
}

fn tide_available(level: &Level) -> bool {
    level.in_branch(Branch::Shoals) && level.heightmap.is_some()
}

/// Make sure both property tables hold tide values
fn init_tide(you: &mut You, level: &mut Level, config: &TideConfig) {
    if !you.props.exists(TIDE_HEIGHT_PROP) {
        TideState::initial(config).store(&mut you.props);
    }
    if !level.properties.exists(TIDE_HEIGHT_PROP) {
        level.properties.set_int(TIDE_HEIGHT_PROP, 0);
    }
}

/// Advance the tide by `turns_elapsed` turns and update the terrain.
///
/// Does nothing off the Shoals, on a level without a height field, or when
/// no time passed and `force` is unset. Terrain is only touched when the
/// visible tide changed, a monster is calling the tide, or `force` is set.
pub fn apply_tides(state: &mut GameState, turns_elapsed: i64, force: bool) {
    if !tide_available(&state.current_level) || (turns_elapsed == 0 && !force) {
        return;
    }

    let GameState {
        player,
        current_level: level,
        rng,
        shoals,
        ..
    } = state;
    let mut rng = rng.scoped(RngStream::Tide);
    let config = shoals.config.clone();

    init_tide(player, level, &config);
    let mut tide = TideState::from_props(&player.props).unwrap_or_else(|err| {
        log::warn!("resetting unreadable tide state: {err}");
        TideState::initial(&config)
    });

    // Another Shoals level may have been running the tide meanwhile.
    let mut turns = turns_elapsed;
    if turns > 1 {
        let since_update = (player.elapsed_time - tide.updated_at) / BASELINE_DELAY;
        if since_update < turns {
            log::trace!("tide catch-up clamped from {turns} to {since_update} turns");
            turns = since_update;
        }
    }
    let unit = i64::from(config.tide_unit());
    if turns > unit * 2 {
        turns = turns % unit + unit;
        log::trace!("tide catch-up folded to {turns} turns");
    }

    shoals.caller = TideCaller::find(level, player, &config);

    let old_tide = level.properties.get_int(TIDE_HEIGHT_PROP).unwrap_or(0);
    for _ in 0..turns {
        tide.run_tide(&config, shoals.caller.is_some());
    }
    tide.updated_at = player.elapsed_time;
    tide.store(&mut player.props);
    level.properties.set_int(TIDE_HEIGHT_PROP, tide.height);

    if force
        || shoals.caller.is_some()
        || old_tide / config.multiplier != tide.height / config.multiplier
    {
        shoals.direction = if tide.height > old_tide {
            TideDirection::Rising
        } else {
            TideDirection::Falling
        };
        let changed = propagate_tide(level, shoals, tide.height / config.multiplier, &mut rng);
        log::debug!(
            "tide {old_tide} -> {} ({:?}), {changed} cells changed",
            tide.height,
            shoals.direction
        );
    }

    shoals.caller = None;
}

/// Spread a visible tide of `tide` over the current level
pub fn apply_tide(state: &mut GameState, tide: i32) -> usize {
    if !tide_available(&state.current_level) {
        return 0;
    }
    let GameState {
        current_level,
        rng,
        shoals,
        ..
    } = state;
    let mut rng = rng.scoped(RngStream::Tide);
    propagate_tide(current_level, shoals, tide, &mut rng)
}

/// Two-page wavefront from the corners and seed markers.
///
/// Only cells that were wet before this update carry the tide on; a cell
/// that just dried out carries it on half the time so a falling tide can
/// still drain what lies behind it. Returns the number of converted cells.
fn propagate_tide(
    level: &mut Level,
    shoals: &ShoalsState,
    tide: i32,
    rng: &mut GameRng,
) -> usize {
    let mut current = vec![
        Coord::new(1, 1),
        Coord::new(GXM - 2, 1),
        Coord::new(1, GYM - 2),
        Coord::new(GXM - 2, GYM - 2),
    ];
    current.extend(level.marker_positions_by_prop(TIDE_SEED_PROP));
    let mut next = Vec::new();

    let mut seen = vec![false; (GXM * GYM) as usize];
    let idx = |c: Coord| (c.y * GXM + c.x) as usize;
    let mut changed = 0;

    while !current.is_empty() {
        for &c in &current {
            let cell = level.cell(c);
            let herefeat = cell.feat;
            let temporary = cell.is_temp_terrain();
            let was_wet = !temporary && tide_passable(herefeat, rng);
            seen[idx(c)] = true;
            if !temporary
                && tide_susceptible(herefeat)
                && apply_tide_at(level, shoals, c, shoals.tide_at(c, tide))
            {
                changed += 1;
            }

            let is_wet = level.feat(c).is_water();
            if was_wet && (is_wet || rng.coinflip()) {
                for adj in c.adjacent() {
                    if !in_bounds(adj) || seen[idx(adj)] {
                        continue;
                    }
                    let feat = level.feat(adj);
                    if tide_passable(feat, rng) || tide_susceptible(feat) {
                        next.push(adj);
                        seen[idx(adj)] = true;
                    } else if level.cell(adj).is_bloody() && rng.one_in(15) {
                        level.cell_mut(adj).flags.remove(CellFlags::BLOODY);
                    }
                }
            }
        }
        current.clear();
        std::mem::swap(&mut current, &mut next);
    }
    changed
}

/// Convert the cell at `c` for a local tide of `tide`.
///
/// Never raises a wall or opens deep water, and ignores changes that go
/// against the current tide direction. Returns whether the cell changed.
pub fn apply_tide_at(level: &mut Level, shoals: &ShoalsState, c: Coord, tide: i32) -> bool {
    if level.cell(c).is_tide_immune() {
        return false;
    }
    let Some(height) = level.heightmap.as_ref().map(|hf| hf[c]) else {
        return false;
    };

    let newfeat = match feature_by_height(height - tide) {
        feat if feat.is_wall() => Feature::Floor,
        Feature::DeepWater => Feature::ShallowWater,
        feat => feat,
    };
    let oldfeat = level.feat(c);
    if oldfeat == newfeat || tide_height_change(oldfeat, newfeat) != shoals.direction {
        return false;
    }
    level.set_feat(c, newfeat);
    true
}

/// Stop a monster's tide call and let the tide settle back
pub fn release_tide(state: &mut GameState, id: MonsterId) {
    if !state.current_level.in_branch(Branch::Shoals) {
        return;
    }
    let Some(mons) = state.current_level.monster_mut(id) else {
        return;
    };
    mons.enchantments.remove(Enchantments::TIDE);
    let msg = format!("The tide is released from {}'s call.", mons.name);
    state.message(msg);
    apply_tides(state, 0, true);
}

/// Push the tide up or down by `increment` visible steps.
///
/// Returns false if the current level has no tide.
pub fn force_tide(state: &mut GameState, increment: i32) -> bool {
    if !tide_available(&state.current_level) {
        return false;
    }
    let config = state.shoals.config.clone();
    init_tide(&mut state.player, &mut state.current_level, &config);

    let props = &mut state.player.props;
    let height = props.get_int(TIDE_HEIGHT_PROP).unwrap_or(0);
    let height = (height + increment * config.multiplier).clamp(config.low_tide, config.high_tide);
    props.set_int(TIDE_HEIGHT_PROP, height);

    state.shoals.direction = if increment > 0 {
        TideDirection::Rising
    } else {
        TideDirection::Falling
    };
    apply_tide(state, height / config.multiplier);
    true
}
