//! Map cell types

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Terrain feature of a single map cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Feature {
    #[default]
    RockWall = 0,
    StoneWall = 1,
    Tree = 2,
    ClosedDoor = 3,
    OpenDoor = 4,
    Floor = 5,
    ShallowWater = 6,
    DeepWater = 7,
    OpenSea = 8,
    Lava = 9,
    StoneStairsDown = 10,
    StoneStairsUp = 11,
}

impl Feature {
    /// Check if this is a wall type
    pub const fn is_wall(&self) -> bool {
        matches!(self, Feature::RockWall | Feature::StoneWall)
    }

    /// Check if this blocks movement outright
    pub const fn is_solid(&self) -> bool {
        matches!(
            self,
            Feature::RockWall
                | Feature::StoneWall
                | Feature::Tree
                | Feature::ClosedDoor
                | Feature::OpenSea
        )
    }

    /// Check if this is a water type
    pub const fn is_water(&self) -> bool {
        matches!(
            self,
            Feature::ShallowWater | Feature::DeepWater | Feature::OpenSea
        )
    }

    /// Check if this is anything the tide considers wet
    pub const fn is_watery(&self) -> bool {
        self.is_water()
    }
}

bitflags! {
    /// Per-cell property flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        /// Blood spatter on the ground
        const BLOODY = 0x01;
        /// The tide never alters this cell
        const TIDE_IMMUNE = 0x02;
        /// Terrain here is a temporary effect that will revert
        const TEMP_TERRAIN = 0x04;
    }
}

bitflags! {
    /// What kind of authored content covers a cell
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct MapMask: u8 {
        const VAULT = 0x01;
    }
}

// Manual serde impls for the flag types
impl Serialize for CellFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(CellFlags::from_bits_truncate(bits))
    }
}

impl Serialize for MapMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MapMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(MapMask::from_bits_truncate(bits))
    }
}

/// A single map cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Actual terrain type
    pub feat: Feature,

    /// Cell property flags
    pub flags: CellFlags,

    /// Authored-content mask
    pub map_mask: MapMask,
}

impl Cell {
    pub const fn new(feat: Feature) -> Self {
        Self {
            feat,
            flags: CellFlags::empty(),
            map_mask: MapMask::empty(),
        }
    }

    pub fn is_tide_immune(&self) -> bool {
        self.flags.contains(CellFlags::TIDE_IMMUNE)
    }

    pub fn is_temp_terrain(&self) -> bool {
        self.flags.contains(CellFlags::TEMP_TERRAIN)
    }

    pub fn is_bloody(&self) -> bool {
        self.flags.contains(CellFlags::BLOODY)
    }

    pub fn in_vault(&self) -> bool {
        self.map_mask.contains(MapMask::VAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_water_is_never_solid() {
        for feat in Feature::iter().filter(Feature::is_water) {
            assert!(!feat.is_wall(), "{feat} should not be a wall");
        }
    }

    #[test]
    fn test_walls_are_solid() {
        for feat in Feature::iter().filter(Feature::is_wall) {
            assert!(feat.is_solid());
        }
    }

    #[test]
    fn test_flag_serde_roundtrip() {
        let mut cell = Cell::new(Feature::Floor);
        cell.flags.insert(CellFlags::BLOODY | CellFlags::TIDE_IMMUNE);
        cell.map_mask.insert(MapMask::VAULT);
        let json = serde_json::to_string(&cell).unwrap();
        let back: Cell = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cell);
        assert!(back.is_bloody() && back.is_tide_immune() && back.in_vault());
    }
}
