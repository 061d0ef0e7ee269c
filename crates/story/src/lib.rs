use bevy::prelude::*;

pub mod allocation;
pub mod charts;
pub mod config;
pub mod curve;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod format;
pub mod geo;
pub mod narrative;
pub mod region_select;
pub mod renderer;
pub mod reveal;
pub mod scale;
pub mod sequencer;
pub mod step;
pub mod tooltip;
pub mod transform;
pub mod tween;

#[cfg(test)]
pub mod test_harness;

use allocation::AllocationPlugin;
use charts::ChartDataPlugin;
use config::StoryConfig;
use sequencer::{MarkerLayout, NarrativeState, RenderRequested, Sequencer};
use tooltip::Tooltip;

/// Per-frame ordering inside `Update`: marker observation emits
/// [`RenderRequested`], loaders react to it in the same frame, and finished
/// fetches are collected last.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorySet {
    Observe,
    Load,
    Collect,
}

/// Headless core of the presentation: sequencer, dataset loading, map
/// state. Drawing is added separately by the `charts` crate.
pub struct StoryPlugin;

impl Plugin for StoryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StoryConfig>()
            .init_resource::<Sequencer>()
            .init_resource::<NarrativeState>()
            .init_resource::<MarkerLayout>()
            .init_resource::<Tooltip>()
            .add_event::<RenderRequested>()
            .configure_sets(
                Update,
                (StorySet::Observe, StorySet::Load, StorySet::Collect).chain(),
            )
            .add_systems(First, tooltip::clear_tooltip)
            .add_systems(
                Update,
                sequencer::observe_markers.in_set(StorySet::Observe),
            )
            .add_plugins((ChartDataPlugin, AllocationPlugin));
    }
}
