//! Reservoir storage series for Lake Mead and Lake Powell.

use chrono::{Datelike, NaiveDate};

use crate::config::{StoryConfig, MEAD_COMFORT_AF, MEAD_WARNING_AF};
use crate::dataset::{parse_date, parse_number, Dataset};
use crate::error::LoadError;
use crate::scale::{bisect_left, LinearScale};
use crate::step::ChartKind;
use crate::transform::extent;

use super::StepDataset;

// ---------------------------------------------------------------------------
// Lake Mead
// ---------------------------------------------------------------------------

/// Background band of the Lake Mead chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBand {
    Comfort,
    Warning,
    ShortageRisk,
}

impl StorageBand {
    pub const ALL: [StorageBand; 3] = [
        StorageBand::Comfort,
        StorageBand::Warning,
        StorageBand::ShortageRisk,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StorageBand::Comfort => "Comfort zone",
            StorageBand::Warning => "Warning",
            StorageBand::ShortageRisk => "Shortage risk",
        }
    }

    /// Storage interval in acre-feet. The comfort band tops out at the
    /// highest recorded storage.
    pub fn bounds(self, max_storage: f64) -> (f64, f64) {
        match self {
            StorageBand::Comfort => (MEAD_COMFORT_AF, max_storage),
            StorageBand::Warning => (MEAD_WARNING_AF, MEAD_COMFORT_AF),
            StorageBand::ShortageRisk => (0.0, MEAD_WARNING_AF),
        }
    }

    /// First band whose closed interval contains `storage`.
    pub fn classify(storage: f64, max_storage: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|band| {
            let (lo, hi) = band.bounds(max_storage);
            storage >= lo && storage <= hi
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeadRecord {
    pub year: f64,
    /// Acre-feet.
    pub storage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LakeMead {
    pub records: Vec<MeadRecord>,
}

impl LakeMead {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, LoadError> {
        let [year_col, storage_col] =
            dataset.require_columns([&["year"][..], &["storage"][..]])?;
        let records: Vec<MeadRecord> = dataset
            .records()
            .filter_map(|r| {
                Some(MeadRecord {
                    year: r.get(&year_col).and_then(parse_number)?,
                    storage: r.get(&storage_col).and_then(parse_number)?,
                })
            })
            .collect();
        if records.is_empty() {
            return Err(LoadError::Empty {
                what: "Lake Mead rows",
            });
        }
        Ok(Self { records })
    }

    pub fn max_storage(&self) -> f64 {
        self.records.iter().map(|r| r.storage).fold(0.0, f64::max)
    }

    pub fn year_extent(&self) -> Option<(f64, f64)> {
        extent(self.records.iter().map(|r| r.year))
    }

    pub fn years(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.year).collect()
    }

    /// `[0, max * 1.1]`, niced.
    pub fn storage_scale(&self, range: (f64, f64)) -> LinearScale {
        LinearScale::new((0.0, self.max_storage() * 1.1), range).nice()
    }

    pub fn band_of(&self, record: &MeadRecord) -> Option<StorageBand> {
        StorageBand::classify(record.storage, self.max_storage())
    }
}

impl StepDataset for LakeMead {
    const KIND: ChartKind = ChartKind::LakeMead;

    fn path(config: &StoryConfig) -> Option<String> {
        Some(config.paths.lake_mead.clone())
    }

    fn transform(text: &str) -> Result<Self, LoadError> {
        Self::from_dataset(&Dataset::parse(text)?)
    }
}

// ---------------------------------------------------------------------------
// Lake Powell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowellRecord {
    pub date: NaiveDate,
    /// Acre-feet.
    pub storage: f64,
}

impl PowellRecord {
    /// Continuous x coordinate: days since the common era.
    pub fn x(&self) -> f64 {
        date_x(self.date)
    }

    /// Tooltip heading, e.g. `"July 2021"`.
    pub fn month_label(&self) -> String {
        self.date.format("%B %Y").to_string()
    }
}

pub fn date_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LakePowell {
    /// Sorted by date.
    pub records: Vec<PowellRecord>,
}

impl LakePowell {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, LoadError> {
        let [date_col, storage_col] =
            dataset.require_columns([&["datetime", "date"][..], &["storage"][..]])?;
        let mut records: Vec<PowellRecord> = dataset
            .records()
            .filter_map(|r| {
                Some(PowellRecord {
                    date: r.get(&date_col).and_then(parse_date)?,
                    storage: r.get(&storage_col).and_then(parse_number)?,
                })
            })
            .collect();
        if records.is_empty() {
            return Err(LoadError::Empty {
                what: "Lake Powell rows",
            });
        }
        records.sort_by_key(|r| r.date);
        Ok(Self { records })
    }

    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.records.iter().map(PowellRecord::x))
    }

    pub fn storage_scale(&self, range: (f64, f64)) -> LinearScale {
        let max = self.records.iter().map(|r| r.storage).fold(0.0, f64::max);
        LinearScale::new((0.0, max), range).nice()
    }

    /// First record on or after `x`; `None` past the last record.
    pub fn record_at_or_after(&self, x: f64) -> Option<&PowellRecord> {
        let xs: Vec<f64> = self.records.iter().map(PowellRecord::x).collect();
        self.records.get(bisect_left(&xs, x))
    }
}

impl StepDataset for LakePowell {
    const KIND: ChartKind = ChartKind::LakePowell;

    fn path(config: &StoryConfig) -> Option<String> {
        Some(config.paths.lake_powell.clone())
    }

    fn transform(text: &str) -> Result<Self, LoadError> {
        Self::from_dataset(&Dataset::parse(text)?)
    }
}
