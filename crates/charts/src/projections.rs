//! Step 2: population projections with an uncertainty band and a snapshot
//! bar chart that follows the hovered year.

use bevy::math::Vec2;
use bevy::prelude::Resource;
use bevy_egui::egui;
use story::charts::{Projection, Projections, Scenario};
use story::curve::monotone_x;
use story::format::{millions, thousands};
use story::scale::{bisect_center, BandScale, LinearScale};
use story::tooltip::TooltipLine;
use story::tween::{Easing, Tween};

use crate::drawing::{
    allocate_chart, axis_title, crosshair, draw_x_axis, draw_y_axis, fill_between, hover_pos,
    legend_item, polyline, to_pos, to_vec2, year_label, Margins, Plot,
};
use crate::page::DrawCtx;
use crate::theme;

const MARGINS: Margins = Margins::new(30.0, 40.0, 40.0, 80.0);
const SNAPSHOT_HEIGHT: f32 = 170.0;
const SNAPSHOT_TRANSITION: f64 = 0.36;
const MAX_BAR_WIDTH: f32 = 110.0;

fn scenario_color(scenario: Scenario) -> egui::Color32 {
    match scenario {
        Scenario::Low => theme::SCENARIO_LOW,
        Scenario::Medium => theme::SCENARIO_MEDIUM,
        Scenario::High => theme::SCENARIO_HIGH,
    }
}

/// Year shown in the snapshot and its animated bar heights.
#[derive(Resource, Debug, Clone)]
pub(crate) struct ProjectionsView {
    snapshot: Option<usize>,
    bars: [Tween; 3],
}

impl Default for ProjectionsView {
    fn default() -> Self {
        Self {
            snapshot: None,
            bars: [Tween::settled(0.0); 3],
        }
    }
}

impl ProjectionsView {
    /// Point the snapshot at record `index`. Bars animate only when the
    /// year actually changes.
    pub fn show(&mut self, index: usize, record: &Projection, now: f64) {
        if self.snapshot == Some(index) {
            return;
        }
        self.snapshot = Some(index);
        for (bar, scenario) in self.bars.iter_mut().zip(Scenario::ALL) {
            bar.retarget(
                record.value(scenario),
                now,
                SNAPSHOT_TRANSITION,
                Easing::CubicInOut,
            );
        }
    }

    pub fn snapshot(&self) -> Option<usize> {
        self.snapshot
    }

    pub fn bar_value(&self, scenario: Scenario, now: f64) -> f64 {
        let i = Scenario::ALL.iter().position(|s| *s == scenario).unwrap_or(0);
        self.bars[i].value_at(now)
    }
}

pub(crate) fn draw(
    ui: &mut egui::Ui,
    cx: &mut DrawCtx,
    data: &Projections,
    view: &mut ProjectionsView,
) {
    let Some(first) = data.records.first() else {
        return;
    };
    if view.snapshot().is_none() {
        view.show(0, first, cx.now);
    }

    ui.horizontal(|ui| {
        for scenario in Scenario::ALL {
            legend_item(ui, scenario_color(scenario), scenario.label());
        }
    });

    let (response, painter) = allocate_chart(ui, cx.config.chart_height);
    let outer = response.rect;
    let Some(years) = data.year_extent() else {
        return;
    };
    let plot = Plot::with_y_scale(MARGINS.inset(outer), years, data.value_scale((0.0, 1.0)));

    draw_y_axis(&painter, &plot, &plot.y.ticks(6), thousands);
    draw_x_axis(&painter, &plot, &plot.x.ticks(6), year_label);
    axis_title(&painter, outer, "Population");

    let curve = |scenario: Scenario| -> Vec<egui::Pos2> {
        let points: Vec<Vec2> = data
            .records
            .iter()
            .map(|r| to_vec2(plot.to_screen(r.year, r.value(scenario))))
            .collect();
        monotone_x(&points).into_iter().map(to_pos).collect()
    };
    let low = curve(Scenario::Low);
    let high = curve(Scenario::High);
    fill_between(&painter, &high, &low, theme::UNCERTAINTY_BAND);
    polyline(&painter, &low, egui::Stroke::new(2.5, theme::SCENARIO_LOW));
    polyline(
        &painter,
        &curve(Scenario::Medium),
        egui::Stroke::new(3.0, theme::SCENARIO_MEDIUM),
    );
    polyline(&painter, &high, egui::Stroke::new(2.5, theme::SCENARIO_HIGH));

    if let Some(pointer) = hover_pos(&response).filter(|p| plot.rect.contains(*p)) {
        if let Some(i) = bisect_center(&data.years(), plot.x_at(pointer.x)) {
            let record = &data.records[i];
            crosshair(&painter, &plot, plot.x.apply(record.year) as f32);
            view.show(i, record, cx.now);
            cx.show_tooltip(
                pointer,
                year_label(record.year),
                Scenario::ALL
                    .iter()
                    .map(|s| {
                        TooltipLine::Plain(format!("{}: {}", s.label(), thousands(record.value(*s))))
                    })
                    .collect(),
            );
        }
    }

    draw_snapshot(ui, cx, data, view);
}

fn draw_snapshot(ui: &mut egui::Ui, cx: &DrawCtx, data: &Projections, view: &ProjectionsView) {
    let Some(record) = view.snapshot().and_then(|i| data.records.get(i)) else {
        return;
    };
    let (response, painter) = allocate_chart(ui, SNAPSHOT_HEIGHT);
    let rect = MARGINS.inset(response.rect);
    let baseline = rect.min.y + 100.0;
    let year = year_label(record.year);

    painter.text(
        egui::pos2(rect.min.x, rect.min.y),
        egui::Align2::LEFT_TOP,
        "Population (approx.)",
        egui::FontId::proportional(10.0),
        theme::TEXT_MUTED,
    );
    painter.text(
        egui::pos2(rect.center().x, rect.min.y),
        egui::Align2::CENTER_TOP,
        format!("{year} snapshot (Low / Medium / High)"),
        egui::FontId::proportional(12.0),
        theme::TEXT,
    );
    painter.line_segment(
        [egui::pos2(rect.min.x, baseline), egui::pos2(rect.max.x, baseline)],
        egui::Stroke::new(1.0, theme::GRID),
    );

    let bands = BandScale::new(3, (rect.min.x as f64, rect.max.x as f64), 0.25);
    let y = LinearScale::new((0.0, data.value_ceiling()), (baseline as f64, rect.min.y as f64 + 40.0));
    let box_width = MAX_BAR_WIDTH.min(bands.bandwidth() as f32 * 0.8);

    for (i, scenario) in Scenario::ALL.into_iter().enumerate() {
        let Some(left) = bands.position(i) else {
            continue;
        };
        let color = scenario_color(scenario);
        let center = (left + bands.bandwidth() / 2.0) as f32;
        let value = view.bar_value(scenario, cx.now);
        let top = (y.apply(value) as f32).min(baseline);

        let bar = egui::Rect::from_min_max(
            egui::pos2(center - box_width / 2.0, top),
            egui::pos2(center + box_width / 2.0, baseline),
        );
        painter.rect_filled(bar, 10.0, theme::faded(color, 0.9));
        painter.circle(
            egui::pos2(center, top),
            5.0,
            egui::Color32::WHITE,
            egui::Stroke::new(2.0, color),
        );
        painter.text(
            egui::pos2(center, top - 20.0),
            egui::Align2::CENTER_BOTTOM,
            millions(record.value(scenario)),
            egui::FontId::proportional(11.0),
            theme::TEXT,
        );
        painter.text(
            egui::pos2(center, baseline + 20.0),
            egui::Align2::CENTER_CENTER,
            scenario.label(),
            egui::FontId::proportional(12.0),
            theme::TEXT,
        );
    }

    painter.text(
        egui::pos2(rect.center().x, rect.max.y),
        egui::Align2::CENTER_BOTTOM,
        format!("Year {year}"),
        egui::FontId::proportional(11.0),
        theme::TEXT_MUTED,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: f64) -> Projection {
        Projection {
            year,
            low: 1_000_000.0,
            medium: 2_000_000.0,
            high: 3_000_000.0,
        }
    }

    #[test]
    fn test_snapshot_animates_to_new_year() {
        let mut view = ProjectionsView::default();
        view.show(0, &record(2015.0), 0.0);
        assert_eq!(view.snapshot(), Some(0));
        assert_eq!(view.bar_value(Scenario::High, 0.0), 0.0);
        assert_eq!(view.bar_value(Scenario::High, 1.0), 3_000_000.0);
        assert_eq!(view.bar_value(Scenario::Low, 1.0), 1_000_000.0);
    }

    #[test]
    fn test_same_year_does_not_restart_transition() {
        let mut view = ProjectionsView::default();
        view.show(2, &record(2025.0), 0.0);
        view.show(2, &record(2025.0), 0.3);
        // Still finishing the transition that began at 0.
        assert_eq!(view.bar_value(Scenario::Medium, 0.36), 2_000_000.0);
    }
}
