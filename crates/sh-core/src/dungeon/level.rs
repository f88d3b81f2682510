//! Level structure
//!
//! Terrain grid plus the bits of level state the Shoals code reads:
//! markers, the monsters that may be calling the tide, level properties and
//! the height field while it exists.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::world::Props;
use crate::{GXM, GYM};

use super::cell::{Cell, Feature};
use super::coord::{Coord, in_bounds, map_bounds};
use super::height::HeightField;

/// Create default cells grid
fn default_cells() -> Vec<Vec<Cell>> {
    vec![vec![Cell::new(Feature::RockWall); GYM as usize]; GXM as usize]
}

/// Dungeon branches
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Branch {
    #[default]
    Dungeon,
    Lair,
    Shoals,
    Swamp,
}

impl Branch {
    /// Number of levels in the branch
    pub const fn depth(&self) -> i32 {
        match self {
            Branch::Dungeon => 27,
            Branch::Lair => 8,
            Branch::Shoals | Branch::Swamp => 5,
        }
    }
}

/// Level identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LevelId {
    pub branch: Branch,
    /// 1-based depth within the branch
    pub depth: i32,
}

impl LevelId {
    pub const fn new(branch: Branch, depth: i32) -> Self {
        Self { branch, depth }
    }

    /// Last level of its branch
    pub const fn at_branch_bottom(&self) -> bool {
        self.depth == self.branch.depth()
    }
}

impl core::fmt::Display for LevelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.branch, self.depth)
    }
}

/// A map marker placed by level design, carrying free-form properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub pos: Coord,
    pub props: Props,
}

impl Marker {
    pub fn new(pos: Coord) -> Self {
        Self {
            pos,
            props: Props::new(),
        }
    }
}

bitflags::bitflags! {
    /// Monster enchantments the level code looks at
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Enchantments: u16 {
        /// Calling the tide
        const TIDE = 0x01;
    }
}

impl Serialize for Enchantments {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Enchantments {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u16::deserialize(deserializer)?;
        Ok(Enchantments::from_bits_truncate(bits))
    }
}

/// Monster identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MonsterId(pub u32);

/// Minimal monster record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    pub pos: Coord,
    pub enchantments: Enchantments,
    pub props: Props,
}

impl Monster {
    pub fn new(id: MonsterId, name: impl Into<String>, pos: Coord) -> Self {
        Self {
            id,
            name: name.into(),
            pos,
            enchantments: Enchantments::empty(),
            props: Props::new(),
        }
    }

    pub fn has_ench(&self, ench: Enchantments) -> bool {
        self.enchantments.contains(ench)
    }
}

/// Complete level structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Level identifier
    pub id: LevelId,

    /// Map cells, indexed `[x][y]`
    #[serde(default = "default_cells")]
    pub cells: Vec<Vec<Cell>>,

    /// Height field, present while generating or while the level is active
    pub heightmap: Option<HeightField>,

    /// Level-design markers
    pub markers: Vec<Marker>,

    /// Monsters on the level
    pub monsters: Vec<Monster>,

    /// Level-local persistent properties
    pub properties: Props,
}

impl Level {
    /// Create a level of solid rock
    pub fn new(id: LevelId) -> Self {
        Self {
            id,
            cells: default_cells(),
            heightmap: None,
            markers: Vec::new(),
            monsters: Vec::new(),
            properties: Props::new(),
        }
    }

    pub fn in_branch(&self, branch: Branch) -> bool {
        self.id.branch == branch
    }

    pub fn cell(&self, c: Coord) -> &Cell {
        assert!(map_bounds(c), "cell access out of bounds at {c}");
        &self.cells[c.x as usize][c.y as usize]
    }

    pub fn cell_mut(&mut self, c: Coord) -> &mut Cell {
        assert!(map_bounds(c), "cell access out of bounds at {c}");
        &mut self.cells[c.x as usize][c.y as usize]
    }

    pub fn feat(&self, c: Coord) -> Feature {
        self.cell(c).feat
    }

    pub fn set_feat(&mut self, c: Coord, feat: Feature) {
        self.cell_mut(c).feat = feat;
    }

    /// True if any of the eight neighbours has `feat`
    pub fn has_adjacent_feat(&self, c: Coord, feat: Feature) -> bool {
        c.adjacent()
            .any(|adj| map_bounds(adj) && self.feat(adj) == feat)
    }

    /// Replace every `from` with `to` in the inclusive box `tl..=br`
    pub fn replace_area(&mut self, tl: Coord, br: Coord, from: Feature, to: Feature) {
        for p in super::coord::rectangle_between(tl, br) {
            if map_bounds(p) && self.feat(p) == from {
                self.set_feat(p, to);
            }
        }
    }

    /// Create the height field.
    ///
    /// # Panics
    /// If the level already has one.
    pub fn init_heightmap(&mut self, initial_height: i32) {
        self.set_heightmap(HeightField::new(GXM, GYM, initial_height));
    }

    /// Install a height field built elsewhere.
    ///
    /// # Panics
    /// If the level already has one.
    pub fn set_heightmap(&mut self, field: HeightField) {
        assert!(
            self.heightmap.is_none(),
            "height field already initialised on {}",
            self.id
        );
        self.heightmap = Some(field);
    }

    /// Drop the height field once the level no longer needs it
    pub fn discard_heightmap(&mut self) {
        self.heightmap = None;
    }

    /// Positions of markers that have `prop` set
    pub fn marker_positions_by_prop(&self, prop: &str) -> Vec<Coord> {
        self.markers
            .iter()
            .filter(|m| m.props.is_set(prop) && in_bounds(m.pos))
            .map(|m| m.pos)
            .collect()
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|m| m.id == id)
    }

    /// Count cells of each feature, for diagnostics
    pub fn census(&self) -> Vec<(Feature, usize)> {
        use strum::IntoEnumIterator;
        Feature::iter()
            .map(|feat| {
                let n = self
                    .cells
                    .iter()
                    .flatten()
                    .filter(|cell| cell.feat == feat)
                    .count();
                (feat, n)
            })
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_level_is_rock() {
        let level = Level::new(LevelId::new(Branch::Shoals, 1));
        assert_eq!(level.feat(Coord::new(5, 5)), Feature::RockWall);
        assert_eq!(
            level.census(),
            vec![(Feature::RockWall, (GXM * GYM) as usize)]
        );
    }

    #[test]
    #[should_panic(expected = "already initialised")]
    fn test_double_heightmap_init_panics() {
        let mut level = Level::new(LevelId::new(Branch::Shoals, 1));
        level.init_heightmap(0);
        level.init_heightmap(0);
    }

    #[test]
    fn test_marker_lookup() {
        let mut level = Level::new(LevelId::new(Branch::Shoals, 2));
        let mut seed = Marker::new(Coord::new(10, 12));
        seed.props.set_bool("tide_seed", true);
        level.markers.push(seed);
        level.markers.push(Marker::new(Coord::new(3, 3)));

        assert_eq!(
            level.marker_positions_by_prop("tide_seed"),
            vec![Coord::new(10, 12)]
        );
    }

    #[test]
    fn test_branch_bottom() {
        assert!(LevelId::new(Branch::Shoals, 5).at_branch_bottom());
        assert!(!LevelId::new(Branch::Shoals, 4).at_branch_bottom());
    }
}
