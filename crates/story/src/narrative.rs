//! Narrative sections in document order.
//!
//! Each section carries the step marker the sequencer watches, the prose
//! shown in the text column, and what the visual column draws.

use crate::step::{ChartKind, StepId};

/// What a section's visual column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visual {
    None,
    Chart(ChartKind),
    /// Stylized ribbon of the river shrinking through its diversions.
    RiverRibbon,
    /// Choropleth of drought-tier allocations, loaded at startup.
    AllocationMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Marker text, parsed into a [`StepId`].
    pub marker: &'static str,
    pub title: &'static str,
    pub paragraphs: &'static [&'static str],
    pub visual: Visual,
}

impl Section {
    pub fn step(&self) -> Option<StepId> {
        StepId::parse(self.marker)
    }
}

pub const SECTIONS: &[Section] = &[
    Section {
        marker: "0",
        title: "A River Running Dry",
        paragraphs: &[
            "The Colorado River supplies water to roughly forty million people across seven \
             U.S. states and two Mexican states.",
            "Scroll to follow the water from Phoenix's taps back to the river, and see why the \
             math no longer adds up.",
        ],
        visual: Visual::None,
    },
    Section {
        marker: "1",
        title: "Phoenix Grew, Water Use Did Not",
        paragraphs: &[
            "Since 1990 Phoenix's population has climbed steadily while total water \
             production stayed nearly flat.",
            "Both series are indexed to 1990 = 100. Hover the chart to compare the two and to \
             see acre-feet used per 1,000 residents.",
        ],
        visual: Visual::Chart(ChartKind::WaterHistory),
    },
    Section {
        marker: "2",
        title: "More People Are Coming",
        paragraphs: &[
            "Projections for the next fifty years range widely, but every scenario adds \
             residents who will need water.",
            "The shaded band spans the low and high scenarios. The bars on the right follow \
             the year under the pointer.",
        ],
        visual: Visual::Chart(ChartKind::PopulationProjections),
    },
    Section {
        marker: "3",
        title: "Where Phoenix's Water Comes From",
        paragraphs: &[
            "The Salt and Verde rivers (SRP) and the Colorado River via the Central Arizona \
             Project (CAP) carry most of the load. Reclaimed water and groundwater fill the gaps.",
            "Hover a flow or a node to trace it, click for a short explanation.",
        ],
        visual: Visual::Chart(ChartKind::WaterSources),
    },
    Section {
        marker: "4",
        title: "A River Promised More Than It Carries",
        paragraphs: &[
            "The 1922 Compact divided about 16.5 million acre-feet a year. The river's \
             ten-year average natural flow has mostly stayed below that line since.",
            "Red shading marks the years the average fell short of the allocation.",
        ],
        visual: Visual::Chart(ChartKind::NaturalFlow),
    },
    Section {
        marker: "5",
        title: "Every Diversion Takes a Share",
        paragraphs: &[
            "Follow the river downstream: each major diversion narrows what remains for \
             everyone below it.",
            "Widths are proportional to the remaining flow. Values are approximate.",
        ],
        visual: Visual::RiverRibbon,
    },
    Section {
        marker: "6",
        title: "Lake Mead Is the Savings Account",
        paragraphs: &[
            "When flows fall short, the reservoirs make up the difference. Lake Mead has \
             been drawn down for more than two decades.",
            "Bands show the storage levels that trigger shortage declarations.",
        ],
        visual: Visual::Chart(ChartKind::LakeMead),
    },
    Section {
        marker: "7",
        title: "Lake Powell Tells the Same Story",
        paragraphs: &[
            "Upstream behind Glen Canyon Dam, Lake Powell has followed Mead downward, \
             approaching levels where the dam can no longer generate power.",
        ],
        visual: Visual::Chart(ChartKind::LakePowell),
    },
    Section {
        marker: "8",
        title: "Borrowing From Underground",
        paragraphs: &[
            "When surface water runs short, pumping shifts to aquifers that refill over \
             centuries, not years.",
            "Arizona's depletions are highlighted among the largest in the country.",
        ],
        visual: Visual::Chart(ChartKind::Groundwater),
    },
    Section {
        marker: "9",
        title: "Who Gets Cut First",
        paragraphs: &[
            "Shortage tiers reduce deliveries in a fixed order. Move the slider to see each \
             region's allocation under deeper drought.",
            "Click a state to focus it and read how it uses its share.",
        ],
        visual: Visual::AllocationMap,
    },
];
