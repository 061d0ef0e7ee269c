//! Chart datasets: one module per step renderer.
//!
//! Every chart follows the same lifecycle. The first [`RenderRequested`] for
//! its [`ChartKind`] claims the renderer's single load, spawns a fetch, and
//! the parsed result lands in that chart's [`ChartSlot`]. Drawing lives in
//! the `charts` crate and only ever reads the slot.

mod groundwater;
mod natural_flow;
mod projections;
mod reservoir;
mod water_history;
mod water_sources;

#[cfg(test)]
mod tests;

use bevy::prelude::*;

use crate::config::StoryConfig;
use crate::error::LoadError;
use crate::fetch::{spawn_fetch, PendingFetch};
use crate::sequencer::{RenderRequested, Sequencer};
use crate::step::ChartKind;
use crate::StorySet;

pub use groundwater::{Depletion, Groundwater};
pub use natural_flow::{FlowRecord, NaturalFlow};
pub use projections::{Projection, Projections, Scenario};
pub use reservoir::{date_x, LakeMead, LakePowell, MeadRecord, PowellRecord, StorageBand};
pub use water_history::{WaterHistory, WaterRecord};
pub use water_sources::{
    Highlight, SankeyGraph, SankeyLayout, SankeyLink, SankeyNode, WaterSources, LINK_OPACITY,
    NODE_PADDING, NODE_WIDTH, SANKEY_TIP,
};

/// Transformed data behind one step renderer.
pub trait StepDataset: Sized + Send + Sync + 'static {
    const KIND: ChartKind;

    /// Asset-relative path to fetch, or `None` when the data is built in.
    fn path(config: &StoryConfig) -> Option<String>;

    /// Parse and transform the fetched text.
    fn transform(text: &str) -> Result<Self, LoadError>;

    /// Data for charts that need no fetch.
    fn builtin() -> Option<Self> {
        None
    }
}

/// Load state and data of one chart.
pub struct ChartSlot<T: StepDataset> {
    pending: Option<PendingFetch>,
    data: Option<T>,
}

impl<T: StepDataset> Resource for ChartSlot<T> {}

impl<T: StepDataset> Default for ChartSlot<T> {
    fn default() -> Self {
        Self {
            pending: None,
            data: None,
        }
    }
}

impl<T: StepDataset> ChartSlot<T> {
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Claim the load for `T` when its step is first activated.
pub fn start_loads<T: StepDataset>(
    mut requests: EventReader<RenderRequested>,
    config: Res<StoryConfig>,
    mut sequencer: ResMut<Sequencer>,
    mut slot: ResMut<ChartSlot<T>>,
) {
    for request in requests.read() {
        if request.chart != T::KIND {
            continue;
        }
        let Some(handle) = sequencer.handle_mut(T::KIND) else {
            continue;
        };
        if !handle.begin_load() {
            continue;
        }
        match T::path(&config) {
            Some(path) => {
                let path = config.resolve(&path);
                info!("{:?}: loading {}", T::KIND, path);
                slot.pending = Some(spawn_fetch(path));
            }
            None => match T::builtin() {
                Some(data) => {
                    slot.data = Some(data);
                    handle.finish_load(Ok(()));
                }
                None => {
                    let e = LoadError::Empty { what: "data source" };
                    warn!("{:?}: {}", T::KIND, e);
                    handle.finish_load(Err(&e));
                }
            },
        }
    }
}

/// Poll the in-flight fetch for `T` and transform the result.
pub fn collect_loads<T: StepDataset>(
    mut sequencer: ResMut<Sequencer>,
    mut slot: ResMut<ChartSlot<T>>,
) {
    let Some(result) = slot.pending.as_mut().and_then(PendingFetch::poll) else {
        return;
    };
    let path = slot
        .pending
        .take()
        .map(|p| p.path().to_string())
        .unwrap_or_default();

    let outcome = result.and_then(|text| T::transform(&text));
    let Some(handle) = sequencer.handle_mut(T::KIND) else {
        return;
    };
    match outcome {
        Ok(data) => {
            info!("{:?}: ready", T::KIND);
            slot.data = Some(data);
            handle.finish_load(Ok(()));
        }
        Err(e) if e.aborts_silently() => {
            warn!("{:?}: {} ({})", T::KIND, e, path);
            handle.finish_load(Err(&e));
        }
        Err(e) => {
            error!("{:?}: error loading chart data: {}", T::KIND, e);
            handle.finish_load(Err(&e));
        }
    }
}

fn register<T: StepDataset>(app: &mut App) {
    app.init_resource::<ChartSlot<T>>().add_systems(
        Update,
        (
            start_loads::<T>.in_set(StorySet::Load),
            collect_loads::<T>.in_set(StorySet::Collect),
        ),
    );
}

// ---- Plugin ----

pub struct ChartDataPlugin;

impl Plugin for ChartDataPlugin {
    fn build(&self, app: &mut App) {
        register::<WaterHistory>(app);
        register::<Projections>(app);
        register::<WaterSources>(app);
        register::<NaturalFlow>(app);
        register::<LakeMead>(app);
        register::<LakePowell>(app);
        register::<Groundwater>(app);
    }
}
