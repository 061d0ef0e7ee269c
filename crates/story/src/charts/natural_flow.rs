//! Colorado River natural flow at Lee Ferry with a 10-year moving average.

use crate::config::{
    StoryConfig, ACRE_FEET_PER_MAF, COMPACT_ALLOCATION_MAF, MOVING_AVERAGE_WINDOW,
    RIVER_FLOW_COLUMN, RIVER_LAST_EXCLUDED_YEAR, RIVER_PREAMBLE_ROWS, RIVER_YEAR_COLUMN,
};
use crate::dataset::{parse_number, parse_rows};
use crate::error::LoadError;
use crate::step::ChartKind;
use crate::transform::{extent, trailing_moving_average_sparse};

use super::StepDataset;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRecord {
    pub year: f64,
    /// Annual natural flow in MAF.
    pub flow: f64,
    /// Trailing 10-year mean in MAF; undefined for the first nine rows.
    pub moving_average: Option<f64>,
}

impl FlowRecord {
    /// Moving average below the compact allocation.
    pub fn in_deficit(&self) -> bool {
        self.moving_average
            .is_some_and(|ma| ma < COMPACT_ALLOCATION_MAF)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NaturalFlow {
    pub records: Vec<FlowRecord>,
}

impl NaturalFlow {
    /// The average is taken over every table row first, then early years and
    /// rows without a flow value are dropped.
    pub fn from_rows(rows: &[Vec<String>]) -> Result<Self, LoadError> {
        let parsed: Vec<(Option<f64>, Option<f64>)> = rows
            .iter()
            .skip(RIVER_PREAMBLE_ROWS)
            .map(|row| {
                let year = row.get(RIVER_YEAR_COLUMN).and_then(|v| parse_number(v));
                let flow = row
                    .get(RIVER_FLOW_COLUMN)
                    .and_then(|v| parse_number(v))
                    .map(|af| af / ACRE_FEET_PER_MAF);
                (year, flow)
            })
            .collect();

        let flows: Vec<Option<f64>> = parsed.iter().map(|(_, f)| *f).collect();
        let averages = trailing_moving_average_sparse(&flows, MOVING_AVERAGE_WINDOW);

        let records: Vec<FlowRecord> = parsed
            .into_iter()
            .zip(averages)
            .filter_map(|((year, flow), moving_average)| {
                let year = year.filter(|y| *y > RIVER_LAST_EXCLUDED_YEAR)?;
                Some(FlowRecord {
                    year,
                    flow: flow?,
                    moving_average,
                })
            })
            .collect();

        if records.is_empty() {
            return Err(LoadError::Empty {
                what: "natural flow rows",
            });
        }
        Ok(Self { records })
    }

    pub fn year_extent(&self) -> Option<(f64, f64)> {
        extent(self.records.iter().map(|r| r.year))
    }

    /// Records with a defined moving average.
    pub fn averaged(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.records
            .iter()
            .filter_map(|r| r.moving_average.map(|ma| (r.year, ma)))
    }
}

impl StepDataset for NaturalFlow {
    const KIND: ChartKind = ChartKind::NaturalFlow;

    fn path(config: &StoryConfig) -> Option<String> {
        Some(config.paths.natural_flow.clone())
    }

    fn transform(text: &str) -> Result<Self, LoadError> {
        Self::from_rows(&parse_rows(text)?)
    }
}
