//! The scrolling page: each narrative section is a text column beside its
//! visual. Section bounds are measured every frame and handed to the
//! sequencer as the marker layout.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use story::allocation::{AllocationMapSlot, MapView};
use story::charts::{
    ChartSlot, Groundwater, LakeMead, LakePowell, NaturalFlow, Projections, StepDataset,
    WaterHistory, WaterSources,
};
use story::config::StoryConfig;
use story::narrative::{Section, Visual, SECTIONS};
use story::renderer::LoadStatus;
use story::sequencer::{MarkerBounds, MarkerLayout, NarrativeState, Sequencer};
use story::step::ChartKind;
use story::tooltip::{Tooltip, TooltipLine};

use crate::allocation_map::{self, MapGeometry};
use crate::drawing::{allocate_chart, draw_error, to_vec2};
use crate::groundwater::GroundwaterView;
use crate::natural_flow::NaturalFlowView;
use crate::projections::ProjectionsView;
use crate::water_history::WaterHistoryView;
use crate::water_sources::SankeyView;
use crate::{groundwater, lake_mead, lake_powell, natural_flow, projections, river_ribbon};
use crate::{theme, water_history, water_sources};

/// Per-frame context handed to every visual.
pub(crate) struct DrawCtx<'a> {
    /// Seconds since startup.
    pub now: f64,
    /// Visible part of the page in screen coordinates.
    pub viewport: egui::Rect,
    /// Screen rect reserved for the section being drawn.
    pub section: egui::Rect,
    pub config: &'a StoryConfig,
    tooltip: &'a mut Tooltip,
}

impl DrawCtx<'_> {
    /// `rect`'s top edge relative to the top of the viewport.
    pub fn viewport_top(&self, rect: egui::Rect) -> f32 {
        rect.min.y - self.viewport.min.y
    }

    pub fn show_tooltip(
        &mut self,
        pointer: egui::Pos2,
        title: impl Into<String>,
        lines: Vec<TooltipLine>,
    ) {
        self.tooltip.show(to_vec2(pointer), title, lines);
    }
}

#[derive(SystemParam)]
pub(crate) struct ChartSlots<'w> {
    water_history: Res<'w, ChartSlot<WaterHistory>>,
    projections: Res<'w, ChartSlot<Projections>>,
    water_sources: Res<'w, ChartSlot<WaterSources>>,
    natural_flow: Res<'w, ChartSlot<NaturalFlow>>,
    lake_mead: Res<'w, ChartSlot<LakeMead>>,
    lake_powell: Res<'w, ChartSlot<LakePowell>>,
    groundwater: Res<'w, ChartSlot<Groundwater>>,
}

#[derive(SystemParam)]
pub(crate) struct ChartViews<'w> {
    water_history: ResMut<'w, WaterHistoryView>,
    projections: ResMut<'w, ProjectionsView>,
    water_sources: ResMut<'w, SankeyView>,
    natural_flow: ResMut<'w, NaturalFlowView>,
    groundwater: ResMut<'w, GroundwaterView>,
}

#[derive(SystemParam)]
pub(crate) struct MapParams<'w> {
    slot: ResMut<'w, AllocationMapSlot>,
    view: ResMut<'w, MapView>,
    geometry: ResMut<'w, MapGeometry>,
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn page_ui(
    mut contexts: EguiContexts,
    time: Res<Time>,
    config: Res<StoryConfig>,
    narrative: Res<NarrativeState>,
    mut layout: ResMut<MarkerLayout>,
    mut sequencer: ResMut<Sequencer>,
    mut tooltip: ResMut<Tooltip>,
    slots: ChartSlots,
    mut views: ChartViews,
    mut map: MapParams,
) {
    let ctx = contexts.ctx_mut();
    let now = time.elapsed_secs_f64();
    let mut markers = Vec::with_capacity(SECTIONS.len());
    let mut viewport_height = layout.viewport_height;

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let viewport = ui.clip_rect();
                viewport_height = viewport.height();
                let section_height = viewport_height * config.section_viewport_fraction;
                let width = ui.available_width();

                let mut cx = DrawCtx {
                    now,
                    viewport,
                    section: viewport,
                    config: &*config,
                    tooltip: &mut *tooltip,
                };

                for section in SECTIONS {
                    let Some(step) = section.step() else {
                        warn!("Section '{}' has an invalid marker", section.title);
                        continue;
                    };
                    cx.section = egui::Rect::from_min_size(
                        ui.cursor().min,
                        egui::vec2(width, section_height),
                    );
                    let active = narrative.current_step == Some(step);

                    let rect = ui
                        .allocate_ui(egui::vec2(width, section_height), |ui| {
                            ui.set_min_height(section_height);
                            ui.columns(2, |columns| {
                                if let [left, right] = columns {
                                    let (text_ui, visual_ui) = if narrative.mirrored {
                                        (right, left)
                                    } else {
                                        (left, right)
                                    };
                                    section_text(text_ui, section, active);
                                    section_visual(
                                        visual_ui,
                                        &mut cx,
                                        section.visual,
                                        &mut sequencer,
                                        &slots,
                                        &mut views,
                                        &mut map,
                                    );
                                }
                            });
                        })
                        .response
                        .rect;

                    markers.push(MarkerBounds {
                        step,
                        top: rect.min.y - viewport.min.y,
                        bottom: rect.max.y - viewport.min.y,
                    });
                }
            });
    });

    if layout.markers != markers || layout.viewport_height != viewport_height {
        layout.markers = markers;
        layout.viewport_height = viewport_height;
    }
}

fn section_text(ui: &mut egui::Ui, section: &Section, active: bool) {
    let text_color = if active {
        theme::TEXT
    } else {
        theme::TEXT_MUTED
    };
    ui.add_space(40.0);
    ui.label(
        egui::RichText::new(section.title)
            .heading()
            .strong()
            .color(text_color),
    );
    ui.add_space(12.0);
    for paragraph in section.paragraphs {
        ui.label(egui::RichText::new(*paragraph).color(text_color));
        ui.add_space(6.0);
    }
}

fn section_visual(
    ui: &mut egui::Ui,
    cx: &mut DrawCtx,
    visual: Visual,
    sequencer: &mut Sequencer,
    slots: &ChartSlots,
    views: &mut ChartViews,
    map: &mut MapParams,
) {
    ui.add_space(24.0);
    match visual {
        Visual::None => {}
        Visual::RiverRibbon => river_ribbon::draw(ui),
        Visual::AllocationMap => {
            let height = cx.config.map_height;
            let status = map.slot.handle().status();
            match (status, map.slot.data()) {
                (LoadStatus::Ready, Some(data)) => {
                    allocation_map::draw(ui, cx, data, &mut map.view, &mut map.geometry);
                    if map.slot.handle_mut().mark_drawn() {
                        debug!("Allocation map drawn");
                    }
                }
                (LoadStatus::Failed, _) => failed_area(ui, height),
                _ => blank_area(ui, height),
            }
        }
        Visual::Chart(kind) => match kind {
            ChartKind::WaterHistory => {
                chart_area(ui, cx, sequencer, &*slots.water_history, |ui, cx, data| {
                    water_history::draw(ui, cx, data, &mut views.water_history);
                });
            }
            ChartKind::PopulationProjections => {
                chart_area(ui, cx, sequencer, &*slots.projections, |ui, cx, data| {
                    projections::draw(ui, cx, data, &mut views.projections);
                });
            }
            ChartKind::WaterSources => {
                chart_area(ui, cx, sequencer, &*slots.water_sources, |ui, cx, data| {
                    water_sources::draw(ui, cx, data, &mut views.water_sources);
                });
            }
            ChartKind::NaturalFlow => {
                chart_area(ui, cx, sequencer, &*slots.natural_flow, |ui, cx, data| {
                    natural_flow::draw(ui, cx, data, &mut views.natural_flow);
                });
            }
            ChartKind::LakeMead => {
                chart_area(ui, cx, sequencer, &*slots.lake_mead, lake_mead::draw);
            }
            ChartKind::LakePowell => {
                chart_area(ui, cx, sequencer, &*slots.lake_powell, lake_powell::draw);
            }
            ChartKind::Groundwater => {
                chart_area(ui, cx, sequencer, &*slots.groundwater, |ui, cx, data| {
                    groundwater::draw(ui, cx, data, &mut views.groundwater);
                });
            }
        },
    }
}

/// Draw a chart once its data is ready, the fallback message if its load
/// failed, and reserve blank space otherwise.
fn chart_area<T: StepDataset>(
    ui: &mut egui::Ui,
    cx: &mut DrawCtx,
    sequencer: &mut Sequencer,
    slot: &ChartSlot<T>,
    draw: impl FnOnce(&mut egui::Ui, &mut DrawCtx, &T),
) {
    let height = cx.config.chart_height;
    let status = sequencer
        .handle(T::KIND)
        .map(|h| h.status())
        .unwrap_or_default();
    match (status, slot.data()) {
        (LoadStatus::Ready, Some(data)) => {
            draw(ui, cx, data);
            if let Some(handle) = sequencer.handle_mut(T::KIND) {
                if handle.mark_drawn() {
                    debug!("{} chart drawn", T::KIND.label());
                }
            }
        }
        (LoadStatus::Failed, _) => failed_area(ui, height),
        _ => blank_area(ui, height),
    }
}

fn failed_area(ui: &mut egui::Ui, height: f32) {
    let (response, painter) = allocate_chart(ui, height);
    draw_error(&painter, response.rect);
}

fn blank_area(ui: &mut egui::Ui, height: f32) {
    ui.allocate_space(egui::vec2(ui.available_width(), height));
}
