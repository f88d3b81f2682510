//! Shoals level generator and tide runner
//!
//! Builds a Shoals level (or restores a saved game), lets turns pass and
//! reports how the tide reshaped the coastline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use sh_core::dungeon::{Branch, Level, LevelId};
use sh_core::shoals::{
    TideConfig, TideState, build_shoals_level, force_tide, pick_vault_island, postprocess_level,
};
use sh_core::{GameRng, GameState, RngStream};
use sh_save::{default_save_path, load_game, save_game};

/// Generate a Shoals level and run its tide
#[derive(Parser, Debug)]
#[command(name = "shoals")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Random seed for level generation and the tide
    #[arg(long)]
    seed: Option<u64>,

    /// Depth within the Shoals
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i32).range(1..=5))]
    depth: i32,

    /// Turns to simulate
    #[arg(short = 't', long, default_value_t = 100)]
    turns: u32,

    /// Tide configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Tide inertia: raw tide units per visible step
    #[arg(long)]
    granularity: Option<i32>,

    /// Push the tide by this many visible steps before running
    #[arg(long, allow_hyphen_values = true)]
    force_tide: Option<i32>,

    /// Player name, used for the default save path
    #[arg(short = 'u', long = "name", default_value = "Player")]
    name: String,

    /// Save the game here afterwards
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Save to the default location for the player name
    #[arg(long, conflicts_with = "save")]
    save_default: bool,

    /// Resume a saved game instead of generating a level
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Print the tide every N turns
    #[arg(long, value_name = "N")]
    report_every: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TideConfig::from_path(path)
            .with_context(|| format!("reading tide config {}", path.display()))?,
        None => TideConfig::default(),
    };
    if let Some(granularity) = args.granularity {
        config = config.with_granularity(granularity)?;
    }

    let mut state = match &args.load {
        Some(path) => load_game(path)
            .with_context(|| format!("loading {}", path.display()))?
            .with_tide_config(config),
        None => new_game(&args, config),
    };

    if let Some(steps) = args.force_tide
        && !force_tide(&mut state, steps)
    {
        log::warn!("no tide on {}", state.current_level.id);
    }

    for turn in 1..=args.turns {
        state.take_turn();
        if let Some(every) = args.report_every
            && every > 0
            && turn % every == 0
        {
            report_tide(&state);
        }
    }

    for msg in &state.messages {
        println!("{msg}");
    }
    println!(
        "{} after {} turns (seed {})",
        state.current_level.id,
        state.player.num_turns,
        state.rng.seed()
    );
    for (feat, n) in state.current_level.census() {
        println!("  {:<16} {n}", feat.to_string());
    }
    report_tide(&state);

    let save_path = if args.save_default {
        Some(default_save_path(&args.name))
    } else {
        args.save.clone()
    };
    if let Some(path) = save_path {
        save_game(&state, &path).with_context(|| format!("saving {}", path.display()))?;
        println!("saved to {}", path.display());
    }

    Ok(())
}

/// Generate a fresh Shoals level and enter it
fn new_game(args: &Args, config: TideConfig) -> GameState {
    let seed = args.seed.unwrap_or_else(|| GameRng::from_entropy().seed());
    let level = Level::new(LevelId::new(Branch::Shoals, args.depth));
    let mut state = GameState::new(seed, level).with_tide_config(config);
    state.player.name = args.name.clone();

    let mut plan = build_shoals_level(&mut state.current_level, &mut state.rng);
    if state.current_level.id.at_branch_bottom()
        && let Some(site) = pick_vault_island(&mut plan, state.rng.stream(RngStream::LevelGen))
    {
        log::info!("rune hut site reserved at {site}");
    }

    postprocess_level(&mut state);
    state
}

fn report_tide(state: &GameState) {
    match TideState::from_props(&state.player.props) {
        Ok(tide) => println!(
            "turn {}: tide {} (velocity {}, visible {})",
            state.player.num_turns,
            tide.height,
            tide.velocity,
            tide.height / state.shoals.config.multiplier
        ),
        Err(err) => println!("turn {}: no tide ({err})", state.player.num_turns),
    }
}
