//! Step 1: the drought-tier allocation map.
//!
//! Regions fill bottom-up to their share of the allotment under the selected
//! tier. Clicking a region moves it to the focal point and opens a detail
//! panel; the basin and river overlays can be toggled.

use bevy::log::debug;
use bevy::math::Vec2;
use bevy::prelude::Resource;
use bevy_egui::egui;
use story::allocation::{
    focus_transform, is_labeled, region_description, tier_label, AllocationMap, MapView,
};
use story::geo::{FeatureCollection, MercatorFit, ProjectedFeature, Strip};
use story::tooltip::TooltipLine;

use crate::drawing::{allocate_chart, hover_pos, polyline, to_pos, to_vec2, Margins};
use crate::page::DrawCtx;
use crate::theme;

const MARGINS: Margins = Margins::new(10.0, 10.0, 10.0, 10.0);
/// Height of the horizontal strips regions are filled with.
const STRIP_STEP: f32 = 1.5;
const HOVER_SCALE: f32 = 1.05;
/// Where a selected region settles, from the map's top-left corner.
const FOCAL_X: f32 = 150.0;
const PANEL_WIDTH: f32 = 320.0;

/// A state or province, projected and decomposed for filling.
pub(crate) struct RegionShape {
    name: String,
    postal: Option<String>,
    feature: ProjectedFeature,
    strips: Vec<Strip>,
    bounds: (Vec2, Vec2),
    centroid: Vec2,
}

impl RegionShape {
    fn new(feature: ProjectedFeature) -> Option<Self> {
        let bounds = feature.bounds()?;
        let centroid = feature.centroid()?;
        Some(Self {
            name: feature
                .name
                .clone()
                .or_else(|| feature.postal.clone())
                .unwrap_or_default(),
            postal: feature.postal.clone(),
            strips: feature.fill_strips(STRIP_STEP),
            feature,
            bounds,
            centroid,
        })
    }

    fn center(&self) -> Vec2 {
        (self.bounds.0 + self.bounds.1) * 0.5
    }

    /// Tier values are keyed by region name, with the postal code as a
    /// fallback.
    fn value<T>(&self, lookup: impl Fn(&str) -> Option<T>) -> Option<T> {
        lookup(&self.name).or_else(|| self.postal.as_deref().and_then(&lookup))
    }
}

/// Projected map geometry, rebuilt whenever the map area changes size.
#[derive(Resource, Default)]
pub(crate) struct MapGeometry {
    size: Option<Vec2>,
    regions: Vec<RegionShape>,
    basin_upper: Vec<ProjectedFeature>,
    basin_lower: Vec<ProjectedFeature>,
    rivers: Vec<ProjectedFeature>,
    tributaries: Vec<ProjectedFeature>,
}

impl MapGeometry {
    fn ensure(&mut self, size: Vec2, data: &AllocationMap) {
        if self
            .size
            .is_some_and(|built| (built - size).abs().max_element() < 0.5)
        {
            return;
        }
        *self = Self {
            size: Some(size),
            ..Default::default()
        };
        let Some(fit) = MercatorFit::fit_size(size, &data.states) else {
            return;
        };
        let project = |collection: &FeatureCollection| -> Vec<ProjectedFeature> {
            collection
                .features
                .iter()
                .map(|f| fit.project_feature(f))
                .collect()
        };
        self.regions = project(&data.states)
            .into_iter()
            .filter_map(RegionShape::new)
            .collect();
        self.basin_upper = project(&data.basin_upper);
        self.basin_lower = project(&data.basin_lower);
        self.rivers = project(&data.river_main);
        self.tributaries = project(&data.river_tributaries);
        debug!(
            "Projected {} map regions at {:.0}x{:.0}",
            self.regions.len(),
            size.x,
            size.y
        );
    }
}

/// Screen y of the fill line for `percentage` of a region spanning
/// `bounds`. Values over 100 put the line above the region.
pub(crate) fn fill_line(bounds: (Vec2, Vec2), percentage: f64) -> f32 {
    let (lo, hi) = bounds;
    hi.y - (hi.y - lo.y) * (percentage.max(0.0) / 100.0) as f32
}

/// The part of `strip` below the fill line.
pub(crate) fn clip_strip(strip: &Strip, line: f32) -> Option<Strip> {
    (strip.y1 > line).then(|| Strip {
        y0: strip.y0.max(line),
        ..*strip
    })
}

/// `p * scale + translate`, then into screen space.
#[derive(Debug, Clone, Copy)]
struct Placement {
    origin: Vec2,
    translate: Vec2,
    scale: f32,
}

impl Placement {
    fn at(&self, p: Vec2) -> egui::Pos2 {
        to_pos(self.origin + p * self.scale + self.translate)
    }

    /// Screen point back into projected coordinates.
    fn local(&self, screen: egui::Pos2) -> Vec2 {
        (to_vec2(screen) - self.origin - self.translate) / self.scale
    }

    fn rect(&self, strip: &Strip) -> egui::Rect {
        egui::Rect::from_two_pos(
            self.at(Vec2::new(strip.x0, strip.y0)),
            self.at(Vec2::new(strip.x1, strip.y1)),
        )
    }
}

pub(crate) fn draw(
    ui: &mut egui::Ui,
    cx: &mut DrawCtx,
    data: &AllocationMap,
    view: &mut MapView,
    geometry: &mut MapGeometry,
) {
    let now = cx.now;
    view.advance(now);
    controls(ui, data, view, now);

    let (response, painter) = allocate_chart(ui, cx.config.map_height);
    let outer = response.rect;
    let area = MARGINS.inset(outer);
    let size = Vec2::new(area.width(), area.height());
    geometry.ensure(size, data);
    let origin = Vec2::new(area.min.x, area.min.y);
    let focal = Vec2::new(FOCAL_X, size.y / 3.0);
    let at_rest = Placement {
        origin,
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    let pointer = hover_pos(&response);
    let hovered = pointer
        .filter(|_| view.hover_enabled())
        .and_then(|p| {
            let local = at_rest.local(p);
            geometry
                .regions
                .iter()
                .rposition(|r| r.feature.contains(local))
        });

    let placement_of = |index: usize, region: &RegionShape| {
        let progress = view.focus_progress(&region.name, now) as f32;
        let (translate, scale) = if progress > 0.0 {
            focus_transform(region.center(), focal, progress)
        } else if hovered == Some(index) {
            (region.center() * (1.0 - HOVER_SCALE), HOVER_SCALE)
        } else {
            (Vec2::ZERO, 1.0)
        };
        Placement {
            origin,
            translate,
            scale,
        }
    };

    // Moving and hovered regions are drawn last so they sit on top.
    let mut order: Vec<usize> = (0..geometry.regions.len())
        .filter(|&i| view.region_visible(&geometry.regions[i].name))
        .collect();
    order.sort_by_key(|&i| {
        let region = &geometry.regions[i];
        hovered == Some(i) || view.focus_progress(&region.name, now) > 0.0
    });

    for &i in &order {
        let region = &geometry.regions[i];
        let placement = placement_of(i, region);
        for strip in &region.strips {
            painter.rect_filled(placement.rect(strip), 0.0, theme::REGION_EMPTY);
        }
        if let Some(percentage) = region.value(|key| view.fill_percentage(key, now)) {
            let line = fill_line(region.bounds, percentage);
            for strip in region.strips.iter().filter_map(|s| clip_strip(s, line)) {
                painter.rect_filled(placement.rect(&strip), 0.0, theme::REGION_FILL);
            }
        }
        let stroke = if hovered == Some(i) {
            egui::Stroke::new(3.0, theme::REGION_HOVER)
        } else {
            egui::Stroke::new(1.5, theme::REGION_EDGE)
        };
        for ring in region.feature.polygons.iter().flatten() {
            let points: Vec<egui::Pos2> = ring.iter().map(|p| placement.at(*p)).collect();
            painter.add(egui::Shape::closed_line(points, stroke));
        }
    }

    if view.basins_shown() {
        draw_overlay(&painter, at_rest, &geometry.basin_upper, theme::BASIN_UPPER);
        draw_overlay(&painter, at_rest, &geometry.basin_lower, theme::BASIN_LOWER);
    }
    if view.rivers_shown() {
        for (features, width) in [(&geometry.rivers, 2.5), (&geometry.tributaries, 1.2)] {
            for line in features.iter().flat_map(|f| f.lines.iter()) {
                let points: Vec<egui::Pos2> = line.iter().map(|p| at_rest.at(*p)).collect();
                polyline(&painter, &points, egui::Stroke::new(width, theme::RIVER));
            }
        }
    }

    for &i in &order {
        let region = &geometry.regions[i];
        if !is_labeled(&region.name, region.postal.as_deref()) {
            continue;
        }
        let Some(value) = region.value(|key| view.label_value(key, now)) else {
            continue;
        };
        let placement = placement_of(i, region);
        label(&painter, placement.at(region.centroid), &format!("{value:.2}"));
    }

    if let (Some(i), Some(p)) = (hovered, pointer) {
        let region = &geometry.regions[i];
        let tier = view.tier.index();
        if let Some(values) =
            region.value(|key| data.table.lookup(tier, key, None))
        {
            cx.show_tooltip(
                p,
                region.name.clone(),
                vec![
                    TooltipLine::Plain(format!("Allocation: {} MAF", values.allocation)),
                    TooltipLine::Muted(format!("Allotment: {} MAF", values.allotment)),
                ],
            );
        }
    }

    if response.clicked() {
        let clicked = response.interact_pointer_pos().and_then(|p| {
            order
                .iter()
                .rev()
                .copied()
                .find(|&i| {
                    let region = &geometry.regions[i];
                    region.feature.contains(placement_of(i, region).local(p))
                })
        });
        if let Some(i) = clicked {
            let name = geometry.regions[i].name.clone();
            for transition in view.click_region(&name, now) {
                debug!("Map selection: {:?}", transition);
            }
        }
    }

    if cx.viewport.intersects(outer) {
        detail_panel(ui.ctx(), outer, data, view, geometry, now);
    }
}

/// Tier slider and overlay toggles above the map.
fn controls(ui: &mut egui::Ui, data: &AllocationMap, view: &mut MapView, now: f64) {
    let tier_count = data.table.tier_count();
    ui.horizontal(|ui| {
        let mut index = view.tier.index();
        let label = data.table.key(index).map(tier_label).unwrap_or_default();
        ui.label("Drought tier:");
        let slider = egui::Slider::new(&mut index, 0..=tier_count.saturating_sub(1))
            .show_value(false);
        if ui.add_enabled(tier_count > 1, slider).changed()
            && view.select_tier(index, &data.table, now)
        {
            debug!("Drought tier set to {}", index);
        }
        ui.label(egui::RichText::new(label).strong().color(theme::TITLE));
    });
    ui.horizontal(|ui| {
        let basins = if view.basins_toggled_on() {
            "Hide Basins"
        } else {
            "Show Basins"
        };
        if ui.button(basins).clicked() {
            view.toggle_basins();
        }
        let rivers = if view.rivers_toggled_on() {
            "Hide Rivers"
        } else {
            "Show Rivers"
        };
        if ui.button(rivers).clicked() {
            view.toggle_rivers();
        }
    });
}

fn draw_overlay(
    painter: &egui::Painter,
    placement: Placement,
    features: &[ProjectedFeature],
    color: egui::Color32,
) {
    for feature in features {
        for strip in feature.fill_strips(STRIP_STEP * 2.0) {
            painter.rect_filled(placement.rect(&strip), 0.0, theme::faded(color, 0.3));
        }
        for ring in feature.polygons.iter().flatten() {
            let points: Vec<egui::Pos2> = ring.iter().map(|p| placement.at(*p)).collect();
            painter.add(egui::Shape::closed_line(points, egui::Stroke::new(1.5, color)));
        }
    }
}

/// Centered label with a light halo.
fn label(painter: &egui::Painter, at: egui::Pos2, text: &str) {
    let font = egui::FontId::proportional(14.0);
    for offset in [
        egui::vec2(-1.0, 0.0),
        egui::vec2(1.0, 0.0),
        egui::vec2(0.0, -1.0),
        egui::vec2(0.0, 1.0),
    ] {
        painter.text(
            at + offset,
            egui::Align2::CENTER_CENTER,
            text,
            font.clone(),
            egui::Color32::WHITE,
        );
    }
    painter.text(at, egui::Align2::CENTER_CENTER, text, font, theme::TEXT);
}

/// Details of the selected region beside the map, faded in once the region
/// has reached the focal point.
fn detail_panel(
    ctx: &egui::Context,
    map_rect: egui::Rect,
    data: &AllocationMap,
    view: &mut MapView,
    geometry: &MapGeometry,
    now: f64,
) {
    let opacity = view.panel_opacity(now) as f32;
    if opacity <= 0.0 {
        return;
    }
    let Some(region) = view
        .selection()
        .selected()
        .and_then(|name| geometry.regions.iter().find(|r| r.name == name))
    else {
        return;
    };
    let tier = view.tier.index();
    let values = region.value(|key| data.table.lookup(tier, key, None));
    let tier_text = data.table.key(tier).map(tier_label).unwrap_or_default();
    let name = region.name.clone();

    let mut close = false;
    egui::Area::new(egui::Id::new("region_detail_panel"))
        .fixed_pos(egui::pos2(map_rect.max.x - PANEL_WIDTH - 12.0, map_rect.min.y + 12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.set_opacity(opacity);
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_width(PANEL_WIDTH);
                ui.label(egui::RichText::new(&name).size(22.0).strong().color(theme::TEXT));
                ui.add_space(8.0);
                detail_row(ui, "Drought Tier:", tier_text);
                if let Some(values) = values {
                    detail_row(ui, "Allocation:", format!("{} MAF", values.allocation));
                    detail_row(ui, "Allotment:", format!("{} MAF", values.allotment));
                    detail_row(ui, "Fill Level:", format!("{:.1}%", values.fill_percentage()));
                }
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new(region_description(&name))
                        .size(13.0)
                        .color(theme::TEXT_MUTED),
                );
                ui.add_space(8.0);
                close = ui
                    .add_sized([PANEL_WIDTH, 28.0], egui::Button::new("Close"))
                    .clicked();
            });
        });

    if close {
        if let Some(transition) = view.close_selection(now) {
            debug!("Map selection: {:?}", transition);
        }
    }
}

fn detail_row(ui: &mut egui::Ui, label: &str, value: String) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label).strong().color(theme::TEXT_MUTED));
        ui.label(egui::RichText::new(value).color(theme::TITLE));
    });
}
