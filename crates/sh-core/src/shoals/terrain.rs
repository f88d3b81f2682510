//! Height thresholds and terrain classification for the Shoals

use serde::{Deserialize, Serialize};

use crate::dungeon::Feature;
use crate::rng::GameRng;

pub const SHT_STONE: i32 = 400;
pub const SHT_ROCK: i32 = 135;
pub const SHT_FLOOR: i32 = 0;
pub const SHT_SHALLOW_WATER: i32 = -30;

/// Which way the tide moved on its last visible update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TideDirection {
    Rising,
    #[default]
    Falling,
}

/// Terrain for a given height
pub const fn feature_by_height(height: i32) -> Feature {
    if height >= SHT_STONE {
        Feature::StoneWall
    } else if height >= SHT_ROCK {
        Feature::RockWall
    } else if height >= SHT_FLOOR {
        Feature::Floor
    } else if height >= SHT_SHALLOW_WATER {
        Feature::ShallowWater
    } else {
        Feature::DeepWater
    }
}

/// Representative height for a feature.
///
/// Many features share a height, so this does not invert
/// [`feature_by_height`]; it only seeds heights for placed terrain.
pub const fn feature_height(feat: Feature) -> i32 {
    match feat {
        Feature::StoneWall => SHT_STONE,
        Feature::Floor => SHT_FLOOR,
        Feature::ShallowWater => SHT_SHALLOW_WATER,
        Feature::DeepWater => SHT_SHALLOW_WATER - 1,
        _ if feat.is_solid() => SHT_ROCK,
        _ => SHT_FLOOR,
    }
}

/// Features the tide may convert
pub const fn tide_susceptible(feat: Feature) -> bool {
    matches!(feat, Feature::Floor | Feature::ShallowWater)
}

/// Features the tide can spread through. Consumes RNG for closed doors only.
pub fn tide_passable(feat: Feature, rng: &mut GameRng) -> bool {
    feat.is_watery()
        || feat == Feature::OpenDoor
        // The tide sometimes laps past closed doors of rooms near the water
        || (feat == Feature::ClosedDoor && rng.one_in(3))
}

/// The tide direction implied by turning `oldfeat` into `newfeat`
pub const fn tide_height_change(oldfeat: Feature, newfeat: Feature) -> TideDirection {
    // A lower-looking feature means the water came up.
    if feature_height(newfeat) - feature_height(oldfeat) < 0 {
        TideDirection::Rising
    } else {
        TideDirection::Falling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Solidity order: deep water < shallow < floor < rock < stone
    fn solidity(feat: Feature) -> u8 {
        match feat {
            Feature::DeepWater => 0,
            Feature::ShallowWater => 1,
            Feature::Floor => 2,
            Feature::RockWall => 3,
            Feature::StoneWall => 4,
            other => panic!("unexpected feature {other}"),
        }
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(feature_by_height(SHT_STONE), Feature::StoneWall);
        assert_eq!(feature_by_height(SHT_STONE - 1), Feature::RockWall);
        assert_eq!(feature_by_height(SHT_ROCK - 1), Feature::Floor);
        assert_eq!(feature_by_height(SHT_FLOOR - 1), Feature::ShallowWater);
        assert_eq!(feature_by_height(SHT_SHALLOW_WATER - 1), Feature::DeepWater);
    }

    #[test]
    fn test_feature_height_seeds() {
        assert_eq!(feature_height(Feature::Tree), SHT_ROCK);
        assert_eq!(feature_height(Feature::OpenDoor), SHT_FLOOR);
        for feat in [
            Feature::StoneWall,
            Feature::Floor,
            Feature::ShallowWater,
            Feature::DeepWater,
        ] {
            assert_eq!(feature_by_height(feature_height(feat)), feat);
        }
    }

    #[test]
    fn test_height_change_direction() {
        assert_eq!(
            tide_height_change(Feature::Floor, Feature::ShallowWater),
            TideDirection::Rising
        );
        assert_eq!(
            tide_height_change(Feature::ShallowWater, Feature::Floor),
            TideDirection::Falling
        );
    }

    #[test]
    fn test_closed_door_pass_rate() {
        let mut rng = GameRng::new(12345);
        let trials = 10_000;
        let passed = (0..trials)
            .filter(|_| tide_passable(Feature::ClosedDoor, &mut rng))
            .count();
        let rate = passed as f64 / trials as f64;
        assert!((rate - 1.0 / 3.0).abs() < 0.02, "pass rate {rate}");
    }

    #[test]
    fn test_passable_without_rng() {
        let mut rng = GameRng::new(1);
        assert!(tide_passable(Feature::DeepWater, &mut rng));
        assert!(tide_passable(Feature::OpenDoor, &mut rng));
        assert!(!tide_passable(Feature::Floor, &mut rng));
        assert!(!tide_passable(Feature::RockWall, &mut rng));
    }

    proptest! {
        #[test]
        fn classification_is_monotonic(a in -2000i32..2000, b in -2000i32..2000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(solidity(feature_by_height(lo)) <= solidity(feature_by_height(hi)));
        }
    }
}
