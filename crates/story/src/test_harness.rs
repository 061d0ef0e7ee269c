//! # TestStory: headless harness for the presentation core
//!
//! Wraps a `MinimalPlugins` app with [`StoryPlugin`] and the fixture asset
//! root, so tests can scroll to a step, let real fetch tasks finish, and
//! inspect the resulting ECS state.

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;

use crate::allocation::{AllocationMapSlot, MapView};
use crate::charts::{ChartSlot, StepDataset};
use crate::config::StoryConfig;
use crate::renderer::{LoadStatus, RendererHandle};
use crate::sequencer::{MarkerBounds, MarkerLayout, NarrativeState, Sequencer};
use crate::step::{ChartKind, StepId};
use crate::StoryPlugin;

/// Directory holding the fixture datasets, laid out like the real asset root.
pub const FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

const VIEWPORT_HEIGHT: f32 = 800.0;
const SECTION_HEIGHT: f32 = 1000.0;
const SECTION_COUNT: u8 = 10;
/// Upper bound on frames spent waiting for fetch tasks.
const MAX_WAIT_FRAMES: usize = 500;

pub struct TestStory {
    app: App,
}

impl Default for TestStory {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStory {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Story over the fixture datasets.
    pub fn new() -> Self {
        Self::with_config(StoryConfig {
            asset_root: FIXTURE_ROOT.to_string(),
            ..Default::default()
        })
    }

    /// Story with a custom configuration. The config is inserted before the
    /// plugin so startup loads already see it.
    pub fn with_config(config: StoryConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(config);
        app.add_plugins(StoryPlugin);
        // Run Startup (map load begins here).
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    pub fn update(&mut self) {
        self.app.update();
    }

    /// Lay the sections out so that only `step`'s marker straddles the
    /// viewport midline. Takes effect on the next update.
    pub fn scroll_to(&mut self, step: u8) {
        let midline = VIEWPORT_HEIGHT * 0.5;
        let markers = (0..SECTION_COUNT)
            .map(|i| {
                let top = midline - SECTION_HEIGHT / 2.0
                    + (f32::from(i) - f32::from(step)) * SECTION_HEIGHT;
                MarkerBounds {
                    step: StepId(i),
                    top,
                    bottom: top + SECTION_HEIGHT - 1.0,
                }
            })
            .collect();
        self.set_markers(markers);
    }

    /// Scroll so that no marker touches the midline.
    pub fn scroll_between_sections(&mut self) {
        self.set_markers(Vec::new());
    }

    pub fn set_markers(&mut self, markers: Vec<MarkerBounds>) {
        let mut layout = self.app.world_mut().resource_mut::<MarkerLayout>();
        layout.markers = markers;
        layout.viewport_height = VIEWPORT_HEIGHT;
    }

    /// Scroll to `step` and run one frame.
    pub fn activate(&mut self, step: u8) {
        self.scroll_to(step);
        self.app.update();
    }

    /// Update until `done` holds, giving pool threads a moment between
    /// frames. Returns whether it held before giving up.
    pub fn update_until(&mut self, mut done: impl FnMut(&mut World) -> bool) -> bool {
        for _ in 0..MAX_WAIT_FRAMES {
            if done(self.app.world_mut()) {
                return true;
            }
            self.app.update();
            std::thread::sleep(Duration::from_millis(2));
        }
        done(self.app.world_mut())
    }

    /// Wait until the renderer for `chart` leaves `Loading`.
    pub fn wait_for_chart(&mut self, chart: ChartKind) -> LoadStatus {
        self.update_until(|world| {
            world
                .resource::<Sequencer>()
                .handle(chart)
                .is_some_and(|h| h.status() != LoadStatus::Loading)
        });
        self.handle(chart).status()
    }

    /// Wait until the allocation map leaves `Loading`.
    pub fn wait_for_map(&mut self) -> LoadStatus {
        self.update_until(|world| {
            world.resource::<AllocationMapSlot>().handle().status() != LoadStatus::Loading
        });
        self.map_slot().handle().status()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn sequencer(&self) -> &Sequencer {
        self.app.world().resource::<Sequencer>()
    }

    pub fn narrative(&self) -> &NarrativeState {
        self.app.world().resource::<NarrativeState>()
    }

    pub fn handle(&self, chart: ChartKind) -> RendererHandle {
        self.sequencer().handle(chart).cloned().unwrap_or_default()
    }

    pub fn dispatch_count(&self, step: u8) -> u32 {
        self.sequencer().dispatch_count(StepId(step))
    }

    pub fn chart<T: StepDataset>(&self) -> Option<&T> {
        self.app.world().resource::<ChartSlot<T>>().data()
    }

    pub fn map_slot(&self) -> &AllocationMapSlot {
        self.app.world().resource::<AllocationMapSlot>()
    }

    pub fn map_view_mut(&mut self) -> Mut<'_, MapView> {
        self.app.world_mut().resource_mut::<MapView>()
    }
}
