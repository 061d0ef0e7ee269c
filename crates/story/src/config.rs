//! Fixed constants of the narrative plus the tunable [`StoryConfig`] resource.
//!
//! Constants describe the data (units, thresholds, column positions) and do
//! not change between runs. `StoryConfig` holds asset paths, chart sizes and
//! animation timings; it can be overridden from `assets/story.json`.

use std::ops::RangeInclusive;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Steps during which the page layout is mirrored (visual column first).
pub const MIRRORED_STEPS: RangeInclusive<u8> = 2..=5;

/// Window of the trailing moving average used by the natural-flow chart.
pub const MOVING_AVERAGE_WINDOW: usize = 10;

/// Colorado River Compact allocation across all parties, in MAF.
pub const COMPACT_ALLOCATION_MAF: f64 = 16.5;

/// Fixed y domain of the natural-flow chart, in MAF.
pub const NATURAL_FLOW_DOMAIN: (f64, f64) = (5.0, 25.0);

/// Acre-feet in one million acre-feet.
pub const ACRE_FEET_PER_MAF: f64 = 1_000_000.0;

/// Cubic kilometres to million acre-feet.
pub const KM3_TO_MAF: f64 = 0.8107;

/// Rows of metadata preceding the natural-flow table.
pub const RIVER_PREAMBLE_ROWS: usize = 6;
pub const RIVER_YEAR_COLUMN: usize = 2;
pub const RIVER_FLOW_COLUMN: usize = 22;
/// Years up to and including this one are dropped from the natural-flow series.
pub const RIVER_LAST_EXCLUDED_YEAR: f64 = 1915.0;

pub const GROUNDWATER_NAME_COLUMN: usize = 0;
pub const GROUNDWATER_VALUE_COLUMN: usize = 2;
/// Depletions at or below this volume (km³) are not charted.
pub const GROUNDWATER_MIN_KM3: f64 = 10.0;
pub const GROUNDWATER_TOP_N: usize = 10;

/// Lake Mead storage thresholds (acre-feet) separating the background bands.
pub const MEAD_COMFORT_AF: f64 = 20_000_000.0;
pub const MEAD_WARNING_AF: f64 = 15_000_000.0;

/// Lower bound of the water-history index axis.
pub const INDEX_AXIS_FLOOR: f64 = 80.0;

/// Tooltip offset from the pointer, in logical pixels.
pub const TOOLTIP_OFFSET: Vec2 = Vec2::new(10.0, -28.0);

/// Region that stands in for both Mexican states in the allocation table.
pub const MEXICO_ROW: &str = "Mexico";
pub const MEXICO_REGIONS: [&str; 2] = ["Sonora", "Baja California"];

/// Asset paths, relative to [`StoryConfig::asset_root`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub water_history: String,
    pub population_projections: String,
    pub natural_flow: String,
    pub lake_mead: String,
    pub lake_powell: String,
    pub groundwater: String,
    pub allocation: String,
    pub states: String,
    pub basin_upper: String,
    pub basin_lower: String,
    pub river_main: String,
    pub river_tributaries: String,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            water_history: "datasets/Phoenix_WaterPopulation_1990_2019.csv".into(),
            population_projections: "datasets/Phoenix_PopulationProjections_2015_2065.csv"
                .into(),
            natural_flow: "data/river_data.csv".into(),
            lake_mead: "datasets/LakeMead_Storage_1980_2025.csv".into(),
            lake_powell: "datasets/lakePowellStorage.csv".into(),
            groundwater: "data/groundwater.csv".into(),
            allocation: "datasets/Colorado_River_Water_Allocation.csv".into(),
            states: "assets/states.geojson".into(),
            basin_upper: "assets/basin_upper.geojson".into(),
            basin_lower: "assets/basin_lower.geojson".into(),
            river_main: "assets/colorado_main.geojson".into(),
            river_tributaries: "assets/colorado_tributaries.geojson".into(),
        }
    }
}

/// Animation durations in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub line_draw: f64,
    pub bar_grow: f64,
    pub link_fade: f64,
    pub tier_transition: f64,
    pub focus_transition: f64,
    pub panel_fade: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            line_draw: 2.5,
            bar_grow: 1.5,
            link_fade: 1.8,
            tier_transition: 0.8,
            focus_transition: 0.6,
            panel_fade: 0.3,
        }
    }
}

/// Tunable presentation settings.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Directory (native) or URL prefix (wasm) that dataset paths are relative to.
    pub asset_root: String,
    pub paths: DatasetPaths,
    pub timings: Timings,
    /// Height of each chart area in logical pixels.
    pub chart_height: f32,
    /// Height of the allocation map.
    pub map_height: f32,
    /// Minimum section height as a fraction of the viewport height.
    pub section_viewport_fraction: f32,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            asset_root: "assets".into(),
            paths: DatasetPaths::default(),
            timings: Timings::default(),
            chart_height: 380.0,
            map_height: 520.0,
            section_viewport_fraction: 0.9,
        }
    }
}

impl StoryConfig {
    /// Parse a (possibly partial) JSON override. Missing fields keep defaults.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Join a dataset path onto the asset root.
    pub fn resolve(&self, path: &str) -> String {
        let root = self.asset_root.trim_end_matches('/');
        if root.is_empty() {
            path.to_string()
        } else {
            format!("{root}/{path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_root() {
        let config = StoryConfig::default();
        assert_eq!(
            config.resolve(&config.paths.groundwater),
            "assets/data/groundwater.csv"
        );
    }

    #[test]
    fn test_resolve_trims_trailing_slash_and_empty_root() {
        let mut config = StoryConfig {
            asset_root: "static/".into(),
            ..Default::default()
        };
        assert_eq!(config.resolve("a.csv"), "static/a.csv");
        config.asset_root.clear();
        assert_eq!(config.resolve("a.csv"), "a.csv");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            StoryConfig::from_json(r#"{ "chart_height": 300.0, "timings": { "bar_grow": 2.0 } }"#)
                .unwrap();
        assert!((config.chart_height - 300.0).abs() < f32::EPSILON);
        assert!((config.timings.bar_grow - 2.0).abs() < f64::EPSILON);
        assert!((config.timings.line_draw - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.paths, DatasetPaths::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            StoryConfig::from_json("{ nope"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_mirrored_range() {
        assert!(!MIRRORED_STEPS.contains(&1));
        assert!(MIRRORED_STEPS.contains(&2));
        assert!(MIRRORED_STEPS.contains(&5));
        assert!(!MIRRORED_STEPS.contains(&6));
    }
}
