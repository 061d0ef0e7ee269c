//! Phoenix water production vs population, indexed to the first year.

use crate::config::{StoryConfig, INDEX_AXIS_FLOOR};
use crate::dataset::{parse_number, Dataset};
use crate::error::LoadError;
use crate::scale::LinearScale;
use crate::step::ChartKind;
use crate::transform::{extent, index_series};

use super::StepDataset;

#[derive(Debug, Clone, PartialEq)]
pub struct WaterRecord {
    pub year: f64,
    /// Acre-feet produced.
    pub water: f64,
    pub population: f64,
    pub water_index: f64,
    pub population_index: f64,
}

impl WaterRecord {
    /// Acre-feet per 1,000 residents.
    pub fn af_per_thousand(&self) -> Option<f64> {
        (self.population != 0.0 && self.water != 0.0)
            .then(|| self.water / (self.population / 1000.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterHistory {
    pub records: Vec<WaterRecord>,
}

impl WaterHistory {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, LoadError> {
        let [year_col, water_col, pop_col] = dataset.require_columns([
            &["year"][..],
            &["water", "prod", "af"][..],
            &["pop"][..],
        ])?;

        let rows: Vec<(f64, f64, f64)> = dataset
            .records()
            .filter_map(|r| {
                Some((
                    r.get(&year_col).and_then(parse_number)?,
                    r.get(&water_col).and_then(parse_number)?,
                    r.get(&pop_col).and_then(parse_number)?,
                ))
            })
            .collect();

        let water: Vec<f64> = rows.iter().map(|r| r.1).collect();
        let population: Vec<f64> = rows.iter().map(|r| r.2).collect();
        let (Some(water_index), Some(population_index)) =
            (index_series(&water), index_series(&population))
        else {
            return Err(LoadError::Empty {
                what: "water history rows",
            });
        };

        let records = rows
            .into_iter()
            .zip(water_index.into_iter().zip(population_index))
            .map(|((year, water, population), (wi, pi))| WaterRecord {
                year,
                water,
                population,
                water_index: wi,
                population_index: pi,
            })
            .collect();
        Ok(Self { records })
    }

    pub fn years(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.year).collect()
    }

    pub fn year_extent(&self) -> Option<(f64, f64)> {
        extent(self.records.iter().map(|r| r.year))
    }

    /// Index axis domain: `[max(80, min * 0.95), max * 1.05]`, niced.
    pub fn index_scale(&self, range: (f64, f64)) -> LinearScale {
        let (lo, hi) = extent(
            self.records
                .iter()
                .flat_map(|r| [r.water_index, r.population_index]),
        )
        .unwrap_or((100.0, 100.0));
        LinearScale::new((INDEX_AXIS_FLOOR.max(lo * 0.95), hi * 1.05), range).nice()
    }
}

impl StepDataset for WaterHistory {
    const KIND: ChartKind = ChartKind::WaterHistory;

    fn path(config: &StoryConfig) -> Option<String> {
        Some(config.paths.water_history.clone())
    }

    fn transform(text: &str) -> Result<Self, LoadError> {
        Self::from_dataset(&Dataset::parse(text)?)
    }
}
