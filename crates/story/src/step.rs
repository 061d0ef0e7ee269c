//! Narrative step identifiers and the step → renderer registry.

use std::collections::BTreeMap;
use std::fmt;

/// Identifier carried by a narrative section marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u8);

impl StepId {
    /// Parse the opaque marker text (e.g. `"4"`).
    pub fn parse(marker: &str) -> Option<Self> {
        marker.trim().parse().ok().map(StepId)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The seven data-driven renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartKind {
    WaterHistory,
    PopulationProjections,
    WaterSources,
    NaturalFlow,
    LakeMead,
    LakePowell,
    Groundwater,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::WaterHistory,
        ChartKind::PopulationProjections,
        ChartKind::WaterSources,
        ChartKind::NaturalFlow,
        ChartKind::LakeMead,
        ChartKind::LakePowell,
        ChartKind::Groundwater,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::WaterHistory => "Phoenix water vs population",
            ChartKind::PopulationProjections => "Phoenix population projections",
            ChartKind::WaterSources => "Phoenix water sources",
            ChartKind::NaturalFlow => "Colorado River natural flow",
            ChartKind::LakeMead => "Lake Mead storage",
            ChartKind::LakePowell => "Lake Powell storage",
            ChartKind::Groundwater => "Groundwater depletion",
        }
    }
}

/// Mapping from step to the renderer it triggers. Steps absent from the
/// registry are styling-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepRegistry {
    entries: BTreeMap<StepId, ChartKind>,
}

impl StepRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry used by the presentation.
    pub fn story() -> Self {
        let mut registry = Self::empty();
        registry
            .register(StepId(1), ChartKind::WaterHistory)
            .register(StepId(2), ChartKind::PopulationProjections)
            .register(StepId(3), ChartKind::WaterSources)
            .register(StepId(4), ChartKind::NaturalFlow)
            .register(StepId(6), ChartKind::LakeMead)
            .register(StepId(7), ChartKind::LakePowell)
            .register(StepId(8), ChartKind::Groundwater);
        registry
    }

    /// Register (or replace) the renderer for `step`.
    pub fn register(&mut self, step: StepId, chart: ChartKind) -> &mut Self {
        self.entries.insert(step, chart);
        self
    }

    pub fn get(&self, step: StepId) -> Option<ChartKind> {
        self.entries.get(&step).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StepId, ChartKind)> + '_ {
        self.entries.iter().map(|(s, c)| (*s, *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marker() {
        assert_eq!(StepId::parse("4"), Some(StepId(4)));
        assert_eq!(StepId::parse(" 12 "), Some(StepId(12)));
        assert_eq!(StepId::parse("four"), None);
        assert_eq!(StepId::parse(""), None);
    }

    #[test]
    fn test_story_registry_skips_styling_steps() {
        let registry = StepRegistry::story();
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.get(StepId(0)), None);
        assert_eq!(registry.get(StepId(5)), None);
        assert_eq!(registry.get(StepId(4)), Some(ChartKind::NaturalFlow));
        assert_eq!(registry.get(StepId(8)), Some(ChartKind::Groundwater));
    }

    #[test]
    fn test_every_chart_registered_once() {
        let registry = StepRegistry::story();
        for kind in ChartKind::ALL {
            assert_eq!(
                registry.iter().filter(|(_, c)| *c == kind).count(),
                1,
                "{kind:?} should have exactly one step"
            );
        }
    }
}
