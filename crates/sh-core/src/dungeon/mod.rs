//! Dungeon system
//!
//! Contains the level structure, cells, coordinates, the height field and
//! island placement.

mod cell;
mod coord;
mod height;
mod island;
mod level;
mod pathfind;

pub use cell::{Cell, CellFlags, Feature, MapMask};
pub use coord::{Coord, in_bounds, map_bounds, rectangle, rectangle_between};
pub use height::HeightField;
pub use island::{IslandPlan, MAX_ISLAND_SPOT_ATTEMPTS};
pub use level::{Branch, Enchantments, Level, LevelId, Marker, Monster, MonsterId};
pub use pathfind::{flood_find_nearest, join_the_dots};
