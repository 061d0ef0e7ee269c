//! Page palette and egui style.

use bevy_egui::{egui, EguiContexts};

pub const PAGE_BG: egui::Color32 = egui::Color32::from_rgb(248, 247, 244);
pub const TEXT: egui::Color32 = egui::Color32::from_rgb(17, 24, 39);
pub const TEXT_MUTED: egui::Color32 = egui::Color32::from_rgb(75, 85, 99);
pub const GRID: egui::Color32 = egui::Color32::from_rgb(229, 231, 235);
pub const AXIS: egui::Color32 = egui::Color32::from_rgb(107, 114, 128);
pub const ERROR: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

// Series
pub const WATER: egui::Color32 = egui::Color32::from_rgb(29, 78, 216);
pub const POPULATION: egui::Color32 = egui::Color32::from_rgb(0, 238, 255);
pub const FLOW_LINE: egui::Color32 = egui::Color32::from_rgb(0, 90, 141);
pub const ALLOCATION_LINE: egui::Color32 = egui::Color32::from_rgb(255, 0, 0);
pub const DEFICIT_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(51, 0, 0, 51);
pub const LAKE_LINE: egui::Color32 = egui::Color32::from_rgb(29, 78, 216);
pub const LAKE_FILL: egui::Color32 = egui::Color32::from_rgb(191, 219, 254);
pub const LAKE_FILL_TOP: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
pub const LAKE_FILL_BOTTOM: egui::Color32 = egui::Color32::from_rgb(219, 234, 254);
pub const ARIZONA_BAR: egui::Color32 = egui::Color32::from_rgb(234, 12, 12);
pub const OTHER_BAR: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
pub const TITLE: egui::Color32 = egui::Color32::from_rgb(30, 58, 138);

// Projections
pub const SCENARIO_LOW: egui::Color32 = egui::Color32::from_rgb(19, 4, 228);
pub const SCENARIO_MEDIUM: egui::Color32 = egui::Color32::from_rgb(29, 132, 216);
pub const SCENARIO_HIGH: egui::Color32 = egui::Color32::from_rgb(0, 238, 255);
/// `#bfdbfe` at 35%.
pub const UNCERTAINTY_BAND: egui::Color32 = egui::Color32::from_rgba_premultiplied(67, 77, 89, 89);

// Lake Mead bands, premultiplied
pub const BAND_COMFORT: egui::Color32 = egui::Color32::from_rgba_premultiplied(3, 20, 9, 31);
pub const BAND_WARNING: egui::Color32 = egui::Color32::from_rgba_premultiplied(42, 32, 1, 46);
pub const BAND_SHORTAGE: egui::Color32 = egui::Color32::from_rgba_premultiplied(48, 14, 14, 51);
pub const LEGEND_COMFORT: egui::Color32 = egui::Color32::from_rgba_premultiplied(13, 98, 44, 153);
pub const LEGEND_WARNING: egui::Color32 = egui::Color32::from_rgba_premultiplied(187, 143, 6, 204);
pub const LEGEND_SHORTAGE: egui::Color32 = egui::Color32::from_rgba_premultiplied(191, 54, 54, 204);

// River ribbon
pub const RIBBON_FILL: egui::Color32 = egui::Color32::from_rgb(191, 219, 254);
pub const RIBBON_EDGE: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
pub const PIPE: egui::Color32 = egui::Color32::from_rgb(251, 146, 60);
pub const PIPE_HALO: egui::Color32 = egui::Color32::from_rgb(254, 215, 170);
pub const CAPTION_BG: egui::Color32 = egui::Color32::from_rgb(243, 244, 246);

// Map
pub const REGION_EMPTY: egui::Color32 = egui::Color32::from_rgb(226, 232, 240);
pub const REGION_FILL: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
pub const REGION_EDGE: egui::Color32 = egui::Color32::from_rgb(71, 85, 105);
pub const REGION_HOVER: egui::Color32 = egui::Color32::from_rgb(15, 23, 42);
pub const BASIN_UPPER: egui::Color32 = egui::Color32::from_rgb(16, 185, 129);
pub const BASIN_LOWER: egui::Color32 = egui::Color32::from_rgb(245, 158, 11);
pub const RIVER: egui::Color32 = egui::Color32::from_rgb(14, 116, 144);

/// Sankey node colors, indexed like the graph's nodes.
pub const SANKEY_NODES: [egui::Color32; 7] = [
    egui::Color32::from_rgb(56, 109, 255),
    egui::Color32::from_rgb(0, 255, 242),
    egui::Color32::from_rgb(34, 197, 94),
    egui::Color32::from_rgb(72, 154, 209),
    egui::Color32::from_rgb(15, 118, 110),
    egui::Color32::from_rgb(132, 204, 22),
    egui::Color32::from_rgb(239, 68, 68),
];

pub fn sankey_color(index: usize) -> egui::Color32 {
    SANKEY_NODES
        .get(index)
        .copied()
        .unwrap_or(egui::Color32::GRAY)
}

/// `color` at `opacity` in `[0, 1]`.
pub fn faded(color: egui::Color32, opacity: f32) -> egui::Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub fn apply_story_theme(mut contexts: EguiContexts) {
    let ctx = contexts.ctx_mut();
    let mut style = (*ctx.style()).clone();

    style.visuals = egui::Visuals::light();
    style.visuals.panel_fill = PAGE_BG;
    style.visuals.window_fill = egui::Color32::WHITE;
    style.visuals.override_text_color = Some(TEXT);
    style.visuals.selection.bg_fill = WATER;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, WATER);

    let rounding = egui::CornerRadius::same(6);
    style.visuals.window_corner_radius = rounding;
    style.visuals.widgets.inactive.corner_radius = rounding;
    style.visuals.widgets.hovered.corner_radius = rounding;
    style.visuals.widgets.active.corner_radius = rounding;

    style.spacing.item_spacing = egui::vec2(8.0, 10.0);
    style
        .text_styles
        .insert(egui::TextStyle::Heading, egui::FontId::proportional(28.0));
    style
        .text_styles
        .insert(egui::TextStyle::Body, egui::FontId::proportional(17.0));

    ctx.set_style(style);
}
