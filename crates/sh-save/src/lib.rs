//! sh-save: Save/restore for Shoals game state
//!
//! A save is one JSON document: a [`SaveHeader`] describing the game and
//! the tide at save time, then the full [`GameState`]. The tide itself
//! lives in the player's and the level's property tables, so restoring the
//! state restores the tide with it.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sh_core::GameState;
use sh_core::shoals::{TIDE_HEIGHT_PROP, TideState};

/// Format version written into every header
pub const FORMAT_VERSION: u32 = 1;

const MAGIC: &str = "SHRS";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no save at {0}")]
    Missing(PathBuf),

    #[error("save I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed save: {0}")]
    Format(#[from] serde_json::Error),

    #[error("not a Shoals save (magic {0:?})")]
    BadMagic(String),

    #[error("save format {found} is not supported (expected {FORMAT_VERSION})")]
    UnsupportedVersion { found: u32 },
}

/// Tide snapshot stored in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TideSummary {
    /// Global tide height
    pub height: i32,
    /// Global tide velocity
    pub velocity: i32,
    /// Tide the level was last shaped for
    pub level_height: Option<i32>,
}

impl TideSummary {
    fn of(state: &GameState) -> Option<Self> {
        let tide = TideState::from_props(&state.player.props).ok()?;
        Some(Self {
            height: tide.height,
            velocity: tide.velocity,
            level_height: state
                .current_level
                .properties
                .get_int(TIDE_HEIGHT_PROP)
                .ok(),
        })
    }
}

/// What a save holds, readable without building the game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveHeader {
    pub magic: String,
    pub version: u32,
    pub player_name: String,
    pub turns: i64,
    /// Level name, e.g. `Shoals:3`
    pub level: String,
    pub seed: u64,
    /// Absent when the game had not met the tide yet
    pub tide: Option<TideSummary>,
    /// Seconds since the epoch
    pub saved_at: u64,
}

impl SaveHeader {
    pub fn describe(state: &GameState) -> Self {
        let saved_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self {
            magic: MAGIC.to_owned(),
            version: FORMAT_VERSION,
            player_name: state.player.name.clone(),
            turns: state.player.num_turns,
            level: state.current_level.id.to_string(),
            seed: state.rng.seed(),
            tide: TideSummary::of(state),
            saved_at,
        }
    }

    pub fn check(&self) -> Result<(), SaveError> {
        if self.magic != MAGIC {
            return Err(SaveError::BadMagic(self.magic.clone()));
        }
        if self.version != FORMAT_VERSION {
            return Err(SaveError::UnsupportedVersion { found: self.version });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SaveRef<'a> {
    header: SaveHeader,
    state: &'a GameState,
}

#[derive(Deserialize)]
struct SaveOwned {
    header: SaveHeader,
    state: GameState,
}

#[derive(Deserialize)]
struct HeaderOnly {
    header: SaveHeader,
}

fn open(path: &Path) -> Result<BufReader<File>, SaveError> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(SaveError::Missing(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Write `state` to `path`, creating parent directories as needed
pub fn save_game(state: &GameState, path: impl AsRef<Path>) -> Result<SaveHeader, SaveError> {
    let path = path.as_ref();
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }

    let save = SaveRef {
        header: SaveHeader::describe(state),
        state,
    };
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &save)?;
    log::debug!("saved {} turn {} to {}", save.header.level, save.header.turns, path.display());
    Ok(save.header)
}

/// Read a game back. The tide configuration is not saved; callers
/// reapply their own.
pub fn load_game(path: impl AsRef<Path>) -> Result<GameState, SaveError> {
    let save: SaveOwned = serde_json::from_reader(open(path.as_ref())?)?;
    save.header.check()?;
    Ok(save.state)
}

/// Read just the header of a save
pub fn load_header(path: impl AsRef<Path>) -> Result<SaveHeader, SaveError> {
    let save: HeaderOnly = serde_json::from_reader(open(path.as_ref())?)?;
    save.header.check()?;
    Ok(save.header)
}

pub fn save_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// Remove a save; a save that is already gone is not an error
pub fn delete_save(path: impl AsRef<Path>) -> Result<(), SaveError> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
        _ => Ok(()),
    }
}

/// Per-player save location under the user's data directory
pub fn default_save_path(player_name: &str) -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shoals")
        .join("saves")
        .join(format!("{player_name}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_core::dungeon::{Branch, Level, LevelId};
    use sh_core::shoals::{apply_tides, build_shoals_level, force_tide};

    fn shoals_game() -> GameState {
        let mut state = GameState::new(2718, Level::new(LevelId::new(Branch::Lair, 1)));
        let mut level = Level::new(LevelId::new(Branch::Shoals, 2));
        build_shoals_level(&mut level, &mut state.rng);
        state.current_level = level;
        state
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("shoals-save-{}", std::process::id()))
            .join(format!("{name}.json"))
    }

    #[test]
    fn test_tide_survives_restore() {
        let path = scratch("tide");
        let mut state = shoals_game();
        for _ in 0..37 {
            state.take_turn();
        }
        force_tide(&mut state, 2);

        let header = save_game(&state, &path).unwrap();
        assert!(save_exists(&path));
        let loaded = load_game(&path).unwrap();

        let before = TideState::from_props(&state.player.props).unwrap();
        let after = TideState::from_props(&loaded.player.props).unwrap();
        assert_eq!(before, after);
        assert_eq!(header.tide.map(|t| t.height), Some(before.height));
        assert_eq!(
            loaded.current_level.properties.get_int(TIDE_HEIGHT_PROP),
            state.current_level.properties.get_int(TIDE_HEIGHT_PROP)
        );
        assert_eq!(loaded.current_level.heightmap, state.current_level.heightmap);
        assert_eq!(loaded.rng.seed(), 2718);

        delete_save(&path).unwrap();
        assert!(!save_exists(&path));
        delete_save(&path).unwrap();
    }

    #[test]
    fn test_restored_game_keeps_running() {
        let path = scratch("resume");
        let mut state = shoals_game();
        state.return_after(120);
        save_game(&state, &path).unwrap();

        let mut loaded = load_game(&path).unwrap();
        loaded.player.pass_turns(5);
        apply_tides(&mut loaded, 5, false);
        let tide = TideState::from_props(&loaded.player.props).unwrap();
        assert_eq!(tide.updated_at, loaded.player.elapsed_time);

        delete_save(&path).unwrap();
    }

    #[test]
    fn test_header_without_tide() {
        let path = scratch("header");
        let mut state = shoals_game();
        state.player.name = "Mariner".to_owned();
        save_game(&state, &path).unwrap();

        let header = load_header(&path).unwrap();
        assert_eq!(header.player_name, "Mariner");
        assert_eq!(header.level, "Shoals:2");
        assert_eq!(header.seed, 2718);
        assert!(header.tide.is_none());

        delete_save(&path).unwrap();
    }

    #[test]
    fn test_header_check() {
        let header = SaveHeader::describe(&shoals_game());
        assert!(header.check().is_ok());

        let foreign = SaveHeader {
            magic: "NHRS".to_owned(),
            ..header.clone()
        };
        assert!(matches!(foreign.check(), Err(SaveError::BadMagic(m)) if m == "NHRS"));

        let future = SaveHeader {
            version: FORMAT_VERSION + 1,
            ..header
        };
        assert!(matches!(
            future.check(),
            Err(SaveError::UnsupportedVersion { found }) if found == FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn test_missing_save() {
        let path = scratch("never-written");
        assert!(matches!(load_game(&path), Err(SaveError::Missing(p)) if p == path));
    }

    #[test]
    fn test_default_path_per_player() {
        let path = default_save_path("Mariner");
        assert!(path.ends_with("shoals/saves/Mariner.json"));
    }
}
