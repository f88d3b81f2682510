//! Height fix-up for terrain placed by vaults

use crate::GameState;
use crate::dungeon::{Branch, rectangle};

use super::terrain::{feature_by_height, feature_height, tide_susceptible};
use super::tide::apply_tides;

/// Give vault terrain heights that agree with its features, then run the
/// tide once so the level matches the current tide.
pub fn postprocess_level(state: &mut GameState) {
    let level = &mut state.current_level;
    if !level.in_branch(Branch::Shoals) {
        return;
    }
    let Some(field) = level.heightmap.as_mut() else {
        return;
    };

    let mut reseeded = 0;
    for c in rectangle(1) {
        let cell = &level.cells[c.x as usize][c.y as usize];
        if !cell.in_vault() || cell.is_tide_immune() {
            continue;
        }
        let feat = cell.feat;
        if !tide_susceptible(feat) && !feat.is_solid() {
            continue;
        }
        // Vaults get flat heights per feature, no contours.
        if feat != feature_by_height(field[c]) {
            field[c] = feature_height(feat);
            reseeded += 1;
        }
    }
    log::debug!("reseeded {reseeded} vault heights on {}", level.id);

    apply_tides(state, 0, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{CellFlags, Coord, Feature, Level, LevelId, MapMask};
    use crate::shoals::terrain::{SHT_FLOOR, SHT_ROCK, SHT_STONE};
    use crate::shoals::tide::TIDE_HEIGHT_PROP;

    fn vault_state() -> GameState {
        let mut level = Level::new(LevelId::new(Branch::Shoals, 5));
        level.init_heightmap(-100);
        for c in rectangle(1) {
            level.set_feat(c, Feature::DeepWater);
        }
        GameState::new(3, level)
    }

    #[test]
    fn test_vault_heights_follow_features() {
        let mut state = vault_state();
        let floor = Coord::new(30, 30);
        let wall = Coord::new(31, 30);
        let outside = Coord::new(40, 40);
        for (c, feat) in [
            (floor, Feature::Floor),
            (wall, Feature::StoneWall),
            (outside, Feature::Floor),
        ] {
            state.current_level.set_feat(c, feat);
        }
        for c in [floor, wall] {
            state.current_level.cell_mut(c).map_mask.insert(MapMask::VAULT);
        }

        postprocess_level(&mut state);

        let field = state.current_level.heightmap.as_ref().unwrap();
        assert_eq!(field[floor], SHT_FLOOR);
        assert_eq!(field[wall], SHT_STONE);
        assert_eq!(field[outside], -100);
        assert_eq!(state.current_level.feat(floor), Feature::Floor);
    }

    #[test]
    fn test_tide_immune_vault_cells_skipped() {
        let mut state = vault_state();
        let c = Coord::new(20, 20);
        state.current_level.set_feat(c, Feature::Tree);
        let cell = state.current_level.cell_mut(c);
        cell.map_mask.insert(MapMask::VAULT);
        cell.flags.insert(CellFlags::TIDE_IMMUNE);

        postprocess_level(&mut state);
        assert_eq!(state.current_level.heightmap.as_ref().unwrap()[c], -100);

        // Without the flag the tree is treated as rock.
        state.current_level.cell_mut(c).flags = CellFlags::empty();
        postprocess_level(&mut state);
        assert_eq!(state.current_level.heightmap.as_ref().unwrap()[c], SHT_ROCK);
    }

    #[test]
    fn test_runs_tide() {
        let mut state = vault_state();
        postprocess_level(&mut state);
        assert!(state.player.props.exists(TIDE_HEIGHT_PROP));
    }
}
