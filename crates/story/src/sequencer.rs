//! Narrative sequencer: turns section positions into step activations.
//!
//! The page layout publishes each section marker's vertical bounds in
//! [`MarkerLayout`]. A marker is "in" while it straddles the viewport's
//! horizontal midline. Markers whose in/out state changed since the previous
//! frame become [`IntersectionEntry`] values, processed in document order:
//! every intersecting entry makes its step current, and the first visit to a
//! step with a registered renderer emits one [`RenderRequested`].

use std::collections::HashMap;

use bevy::prelude::*;

use crate::config::MIRRORED_STEPS;
use crate::renderer::RendererHandle;
use crate::step::{ChartKind, StepId, StepRegistry};

/// Vertical extent of one section marker in viewport coordinates
/// (0 = top of the visible area, growing downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerBounds {
    pub step: StepId,
    pub top: f32,
    pub bottom: f32,
}

impl MarkerBounds {
    /// Whether the marker crosses the zero-height band at `midline`.
    pub fn intersects(&self, midline: f32) -> bool {
        self.top <= midline && self.bottom >= midline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub step: StepId,
    pub is_intersecting: bool,
}

/// Marker positions measured by the page this frame, in document order.
#[derive(Resource, Debug, Clone, Default)]
pub struct MarkerLayout {
    pub markers: Vec<MarkerBounds>,
    pub viewport_height: f32,
}

impl MarkerLayout {
    pub fn midline(&self) -> f32 {
        self.viewport_height * 0.5
    }
}

/// Styling state derived from the active step.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrativeState {
    pub current_step: Option<StepId>,
    /// Visual column swaps sides.
    pub mirrored: bool,
}

impl NarrativeState {
    /// Page class for the active step, e.g. `"step-4"`.
    pub fn body_class(&self) -> Option<String> {
        self.current_step.map(|s| format!("step-{s}"))
    }
}

/// Sent once per renderer, the first time its step becomes active.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequested {
    pub step: StepId,
    pub chart: ChartKind,
}

#[derive(Resource, Debug, Clone)]
pub struct Sequencer {
    registry: StepRegistry,
    handles: HashMap<ChartKind, RendererHandle>,
    dispatches: HashMap<StepId, u32>,
    intersecting: HashMap<StepId, bool>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(StepRegistry::story())
    }
}

impl Sequencer {
    pub fn new(registry: StepRegistry) -> Self {
        let handles = registry
            .iter()
            .map(|(_, chart)| (chart, RendererHandle::default()))
            .collect();
        Self {
            registry,
            handles,
            dispatches: HashMap::new(),
            intersecting: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Compare markers against the midline and return entries for every
    /// marker whose state changed, in the order given.
    pub fn track(&mut self, markers: &[MarkerBounds], midline: f32) -> Vec<IntersectionEntry> {
        let mut entries = Vec::new();
        for marker in markers {
            let now = marker.intersects(midline);
            let before = self.intersecting.insert(marker.step, now).unwrap_or(false);
            if now != before {
                entries.push(IntersectionEntry {
                    step: marker.step,
                    is_intersecting: now,
                });
            }
        }
        entries
    }

    /// Apply a batch of entries. Returns the renderers to start, in order.
    pub fn observe(
        &mut self,
        entries: &[IntersectionEntry],
        state: &mut NarrativeState,
    ) -> Vec<RenderRequested> {
        let mut requests = Vec::new();
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            state.current_step = Some(entry.step);
            state.mirrored = MIRRORED_STEPS.contains(&entry.step.0);

            let Some(chart) = self.registry.get(entry.step) else {
                continue;
            };
            let count = self.dispatches.entry(entry.step).or_insert(0);
            if *count == 0 {
                *count = 1;
                requests.push(RenderRequested {
                    step: entry.step,
                    chart,
                });
            }
        }
        requests
    }

    /// How many times the renderer for `step` has been dispatched (0 or 1).
    pub fn dispatch_count(&self, step: StepId) -> u32 {
        self.dispatches.get(&step).copied().unwrap_or(0)
    }

    pub fn handle(&self, chart: ChartKind) -> Option<&RendererHandle> {
        self.handles.get(&chart)
    }

    pub fn handle_mut(&mut self, chart: ChartKind) -> Option<&mut RendererHandle> {
        self.handles.get_mut(&chart)
    }
}

/// Feed this frame's marker layout through the sequencer.
pub fn observe_markers(
    layout: Res<MarkerLayout>,
    mut sequencer: ResMut<Sequencer>,
    mut state: ResMut<NarrativeState>,
    mut requests: EventWriter<RenderRequested>,
) {
    let entries = sequencer.track(&layout.markers, layout.midline());
    if entries.is_empty() {
        return;
    }

    let before = state.current_step;
    let started = sequencer.observe(&entries, &mut state);
    if state.current_step != before {
        if let Some(class) = state.body_class() {
            debug!("Narrative step -> {} (mirrored: {})", class, state.mirrored);
        }
    }
    for request in started {
        info!(
            "Step {} activated renderer {:?}",
            request.step, request.chart
        );
        requests.send(request);
    }
}
