//! Dungeon parameters, difficulty progression and structural validation.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

pub const LEVEL_COUNT_RANGE: RangeInclusive<u32> = 1..=20;
pub const LEVEL_DIMENSION_RANGE: RangeInclusive<u32> = 20..=200;
pub const ROOMS_PER_LEVEL_RANGE: RangeInclusive<u32> = 3..=50;
pub const SCALING_FACTOR_RANGE: RangeInclusive<f64> = 0.0..=10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Classic,
    Horror,
    Magical,
    Mechanical,
    Natural,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Horror => "horror",
            Self::Magical => "magical",
            Self::Mechanical => "mechanical",
            Self::Natural => "natural",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProgression {
    pub base_difficulty: i32,
    pub scaling_factor: f64,
    pub max_difficulty: i32,
}

impl DifficultyProgression {
    /// `min(floor(base + (level - 1) * scaling), max)` for a 1-based level.
    pub fn for_level(&self, level_number: u32) -> i32 {
        let raw = f64::from(self.base_difficulty)
            + f64::from(level_number.saturating_sub(1)) * self.scaling_factor;
        (raw.floor() as i32).min(self.max_difficulty)
    }
}

impl Default for DifficultyProgression {
    fn default() -> Self {
        Self { base_difficulty: 2, scaling_factor: 1.5, max_difficulty: 10 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonParams {
    pub level_count: u32,
    pub level_width: u32,
    pub level_height: u32,
    pub rooms_per_level: u32,
    pub theme: Theme,
    pub difficulty: DifficultyProgression,
    /// Overrides the generated complex name.
    pub name: Option<String>,
}

impl Default for DungeonParams {
    fn default() -> Self {
        Self {
            level_count: 3,
            level_width: 40,
            level_height: 40,
            rooms_per_level: 8,
            theme: Theme::Classic,
            difficulty: DifficultyProgression::default(),
            name: None,
        }
    }
}

impl DungeonParams {
    pub fn validate(&self) -> Result<(), GenerationError> {
        check_range("level_count", self.level_count, &LEVEL_COUNT_RANGE)?;
        check_range("level_width", self.level_width, &LEVEL_DIMENSION_RANGE)?;
        check_range("level_height", self.level_height, &LEVEL_DIMENSION_RANGE)?;
        check_range("rooms_per_level", self.rooms_per_level, &ROOMS_PER_LEVEL_RANGE)?;
        if !SCALING_FACTOR_RANGE.contains(&self.difficulty.scaling_factor) {
            return Err(GenerationError::validation(
                "difficulty.scaling_factor",
                format!(
                    "{} is outside {:?}",
                    self.difficulty.scaling_factor, SCALING_FACTOR_RANGE
                ),
            ));
        }
        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), GenerationError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(GenerationError::validation(field, format!("{value} is outside {range:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_levels(level_count: u32) -> DungeonParams {
        DungeonParams { level_count, ..DungeonParams::default() }
    }

    #[test]
    fn level_count_boundaries() {
        assert!(with_levels(0).validate().is_err());
        assert!(with_levels(1).validate().is_ok());
        assert!(with_levels(20).validate().is_ok());
        assert!(with_levels(21).validate().is_err());
    }

    #[test]
    fn dimension_and_room_boundaries() {
        let narrow = DungeonParams { level_width: 19, ..DungeonParams::default() };
        let tall = DungeonParams { level_height: 201, ..DungeonParams::default() };
        let sparse = DungeonParams { rooms_per_level: 2, ..DungeonParams::default() };
        let crowded = DungeonParams { rooms_per_level: 51, ..DungeonParams::default() };
        for params in [narrow, tall, sparse, crowded] {
            let err = params.validate().unwrap_err();
            assert!(err.is_validation(), "{err}");
        }
        let edges = DungeonParams {
            level_width: 20,
            level_height: 200,
            rooms_per_level: 50,
            ..DungeonParams::default()
        };
        assert!(edges.validate().is_ok());
    }

    #[test]
    fn scaling_factor_must_be_finite_and_in_range() {
        for scaling_factor in [-0.1, 10.5, f64::NAN] {
            let params = DungeonParams {
                difficulty: DifficultyProgression { scaling_factor, ..DifficultyProgression::default() },
                ..DungeonParams::default()
            };
            let err = params.validate().unwrap_err();
            assert!(err.to_string().contains("scaling_factor"), "{err}");
        }
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = with_levels(21).validate().unwrap_err();
        assert!(err.to_string().contains("level_count"), "{err}");
    }

    #[test]
    fn difficulty_follows_the_worked_example() {
        let progression = DifficultyProgression::default();
        let per_level: Vec<i32> = (1..=3).map(|level| progression.for_level(level)).collect();
        assert_eq!(per_level, vec![2, 3, 5]);
    }

    #[test]
    fn difficulty_is_capped_and_non_decreasing() {
        let progression =
            DifficultyProgression { base_difficulty: 1, scaling_factor: 2.5, max_difficulty: 8 };
        let per_level: Vec<i32> = (1..=10).map(|level| progression.for_level(level)).collect();
        assert!(per_level.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(per_level.last(), Some(&8));
    }

    #[test]
    fn partial_toml_style_input_fills_defaults() {
        let params: DungeonParams =
            serde_json::from_str(r#"{"level_count": 5, "theme": "horror"}"#).unwrap();
        assert_eq!(params.level_count, 5);
        assert_eq!(params.theme, Theme::Horror);
        assert_eq!(params.level_width, 40);
    }
}
