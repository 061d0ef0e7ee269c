//! Phoenix population projections: low / medium / high scenarios.

use crate::config::StoryConfig;
use crate::dataset::{parse_number, Dataset};
use crate::error::LoadError;
use crate::scale::LinearScale;
use crate::step::ChartKind;
use crate::transform::extent;

use super::StepDataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Low,
    Medium,
    High,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Low, Scenario::Medium, Scenario::High];

    pub fn label(self) -> &'static str {
        match self {
            Scenario::Low => "Low",
            Scenario::Medium => "Medium",
            Scenario::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub year: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Projection {
    pub fn value(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Low => self.low,
            Scenario::Medium => self.medium,
            Scenario::High => self.high,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projections {
    pub records: Vec<Projection>,
}

impl Projections {
    /// Rows need a numeric year and all three scenario values.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, LoadError> {
        let [year_col, low_col, med_col, high_col] = dataset.require_columns([
            &["year"][..],
            &["low"][..],
            &["medium", "med", "reference", "ref"][..],
            &["high"][..],
        ])?;

        let records: Vec<Projection> = dataset
            .records()
            .filter_map(|r| {
                Some(Projection {
                    year: r.get(&year_col).and_then(parse_number)?,
                    low: r.get(&low_col).and_then(parse_number)?,
                    medium: r.get(&med_col).and_then(parse_number)?,
                    high: r.get(&high_col).and_then(parse_number)?,
                })
            })
            .collect();

        if records.is_empty() {
            return Err(LoadError::Empty {
                what: "projection rows",
            });
        }
        Ok(Self { records })
    }

    pub fn years(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.year).collect()
    }

    pub fn year_extent(&self) -> Option<(f64, f64)> {
        extent(self.records.iter().map(|r| r.year))
    }

    /// Shared top of the main and snapshot axes: the high scenario's peak plus 5%.
    pub fn value_ceiling(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.high)
            .fold(0.0, f64::max)
            * 1.05
    }

    pub fn value_scale(&self, range: (f64, f64)) -> LinearScale {
        LinearScale::new((0.0, self.value_ceiling()), range).nice()
    }
}

impl StepDataset for Projections {
    const KIND: ChartKind = ChartKind::PopulationProjections;

    fn path(config: &StoryConfig) -> Option<String> {
        Some(config.paths.population_projections.clone())
    }

    fn transform(text: &str) -> Result<Self, LoadError> {
        Self::from_dataset(&Dataset::parse(text)?)
    }
}
