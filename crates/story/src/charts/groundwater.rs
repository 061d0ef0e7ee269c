//! Largest groundwater depletions, 1900-2000.

use crate::config::{
    StoryConfig, GROUNDWATER_MIN_KM3, GROUNDWATER_NAME_COLUMN, GROUNDWATER_TOP_N,
    GROUNDWATER_VALUE_COLUMN, KM3_TO_MAF,
};
use crate::dataset::{parse_number, parse_rows};
use crate::error::LoadError;
use crate::step::ChartKind;
use crate::transform::top_n_by;

use super::StepDataset;

#[derive(Debug, Clone, PartialEq)]
pub struct Depletion {
    pub name: String,
    pub km3: f64,
}

impl Depletion {
    pub fn maf(&self) -> f64 {
        self.km3 * KM3_TO_MAF
    }

    /// Arizona aquifers are highlighted.
    pub fn is_arizona(&self) -> bool {
        self.name.contains("Arizona")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Groundwater {
    /// Largest first.
    pub depletions: Vec<Depletion>,
}

impl Groundwater {
    pub fn from_rows(rows: &[Vec<String>]) -> Result<Self, LoadError> {
        let min_len = GROUNDWATER_NAME_COLUMN.max(GROUNDWATER_VALUE_COLUMN) + 1;
        let candidates: Vec<Depletion> = rows
            .iter()
            .filter(|row| row.len() >= min_len)
            .filter_map(|row| {
                let name = &row[GROUNDWATER_NAME_COLUMN];
                if name.is_empty() {
                    return None;
                }
                let km3 = parse_number(&row[GROUNDWATER_VALUE_COLUMN])?;
                (km3 > GROUNDWATER_MIN_KM3).then(|| Depletion {
                    name: name.clone(),
                    km3,
                })
            })
            .collect();

        let depletions = top_n_by(candidates, GROUNDWATER_TOP_N, |d| d.km3);
        if depletions.is_empty() {
            return Err(LoadError::Empty {
                what: "groundwater rows",
            });
        }
        Ok(Self { depletions })
    }

    pub fn max_km3(&self) -> f64 {
        self.depletions.iter().map(|d| d.km3).fold(0.0, f64::max)
    }
}

impl StepDataset for Groundwater {
    const KIND: ChartKind = ChartKind::Groundwater;

    fn path(config: &StoryConfig) -> Option<String> {
        Some(config.paths.groundwater.clone())
    }

    fn transform(text: &str) -> Result<Self, LoadError> {
        Self::from_rows(&parse_rows(text)?)
    }
}
