//! Step 1: Phoenix water production vs population, both indexed to 1990.

use bevy::math::Vec2;
use bevy::prelude::Resource;
use bevy_egui::egui;
use story::charts::{WaterHistory, WaterRecord};
use story::curve::monotone_x;
use story::format::thousands;
use story::reveal::{reveal_progress, smoothstep};
use story::scale::bisect_center;
use story::tooltip::TooltipLine;

use crate::drawing::{
    allocate_chart, axis_title, crosshair, draw_x_axis, draw_y_axis, focus_dot, hover_pos,
    legend_toggle, polyline, reveal_painter, to_pos, to_vec2, year_label, Margins, Plot,
};
use crate::page::DrawCtx;
use crate::theme;

const MARGINS: Margins = Margins::new(32.0, 40.0, 48.0, 90.0);

/// Legend toggles.
#[derive(Resource, Debug, Clone, Copy)]
pub(crate) struct WaterHistoryView {
    pub show_water: bool,
    pub show_population: bool,
}

impl Default for WaterHistoryView {
    fn default() -> Self {
        Self {
            show_water: true,
            show_population: true,
        }
    }
}

pub(crate) fn draw(
    ui: &mut egui::Ui,
    cx: &mut DrawCtx,
    data: &WaterHistory,
    view: &mut WaterHistoryView,
) {
    ui.horizontal(|ui| {
        view.show_water = legend_toggle(ui, theme::WATER, "Water index", view.show_water);
        view.show_population = legend_toggle(
            ui,
            theme::POPULATION,
            "Population index",
            view.show_population,
        );
    });

    let (response, painter) = allocate_chart(ui, cx.config.chart_height);
    let outer = response.rect;
    let Some(years) = data.year_extent() else {
        return;
    };
    let plot = Plot::with_y_scale(MARGINS.inset(outer), years, data.index_scale((0.0, 1.0)));

    draw_y_axis(&painter, &plot, &plot.y.ticks(6), |v| format!("{v:.0}"));
    draw_x_axis(&painter, &plot, &plot.x.ticks(8), year_label);
    axis_title(&painter, outer, "Index (1990 = 100)");

    let progress = smoothstep(reveal_progress(
        cx.viewport.height(),
        cx.viewport_top(outer),
        outer.height(),
    ));
    let revealed = reveal_painter(&painter, plot.rect, progress);

    let curve = |value: fn(&WaterRecord) -> f64| -> Vec<egui::Pos2> {
        let points: Vec<Vec2> = data
            .records
            .iter()
            .map(|r| to_vec2(plot.to_screen(r.year, value(r))))
            .collect();
        monotone_x(&points).into_iter().map(to_pos).collect()
    };
    if view.show_water {
        polyline(
            &revealed,
            &curve(|r| r.water_index),
            egui::Stroke::new(3.0, theme::WATER),
        );
    }
    if view.show_population {
        polyline(
            &revealed,
            &curve(|r| r.population_index),
            egui::Stroke::new(3.0, theme::POPULATION),
        );
    }

    let Some(pointer) = hover_pos(&response).filter(|p| plot.rect.contains(*p)) else {
        return;
    };
    let Some(record) = bisect_center(&data.years(), plot.x_at(pointer.x))
        .and_then(|i| data.records.get(i))
    else {
        return;
    };

    crosshair(&painter, &plot, plot.x.apply(record.year) as f32);
    if view.show_water {
        focus_dot(
            &painter,
            plot.to_screen(record.year, record.water_index),
            theme::WATER,
        );
    }
    if view.show_population {
        focus_dot(
            &painter,
            plot.to_screen(record.year, record.population_index),
            theme::POPULATION,
        );
    }

    let mut lines = vec![
        TooltipLine::Plain(format!("Water index: {:.1}", record.water_index)),
        TooltipLine::Plain(format!("Pop index: {:.1}", record.population_index)),
        TooltipLine::Muted(format!("Water: {} AF", thousands(record.water))),
        TooltipLine::Muted(format!("Population: {}", thousands(record.population))),
    ];
    if let Some(ratio) = record.af_per_thousand() {
        lines.push(TooltipLine::Muted(format!("~{ratio:.1} AF per 1,000 people")));
    }
    cx.show_tooltip(pointer, year_label(record.year), lines);
}
