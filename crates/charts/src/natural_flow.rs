//! Step 4: the river's ten-year average natural flow against the 1922
//! Compact allocation.

use bevy::math::Vec2;
use bevy::prelude::Resource;
use bevy_egui::egui;
use story::charts::{FlowRecord, NaturalFlow};
use story::config::{COMPACT_ALLOCATION_MAF, NATURAL_FLOW_DOMAIN};
use story::curve::monotone_x;
use story::tooltip::TooltipLine;

use crate::drawing::{
    allocate_chart, animation_progress, axis_title, dashed_line, draw_x_axis, draw_y_axis,
    fill_between, hover_pos, polyline, reveal_painter, to_pos, to_vec2, year_label, Margins,
    Plot,
};
use crate::page::DrawCtx;
use crate::theme;

const MARGINS: Margins = Margins::new(20.0, 30.0, 50.0, 70.0);
/// Hover radius around each averaged point.
const DOT_RADIUS: f32 = 6.0;

#[derive(Resource, Debug, Default)]
pub(crate) struct NaturalFlowView {
    /// When the line started drawing.
    started: Option<f64>,
}

/// Consecutive runs of records with a defined moving average, as
/// `(year, average)` pairs. Gaps split the line.
pub(crate) fn averaged_runs(records: &[FlowRecord]) -> Vec<Vec<(f64, f64)>> {
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current = Vec::new();
    for record in records {
        match record.moving_average {
            Some(ma) => current.push((record.year, ma)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

pub(crate) fn draw(
    ui: &mut egui::Ui,
    cx: &mut DrawCtx,
    data: &NaturalFlow,
    view: &mut NaturalFlowView,
) {
    let (response, painter) = allocate_chart(ui, cx.config.chart_height);
    let outer = response.rect;
    let Some(years) = data.year_extent() else {
        return;
    };
    let plot = Plot::new(MARGINS.inset(outer), years, NATURAL_FLOW_DOMAIN);

    draw_y_axis(&painter, &plot, &plot.y.ticks(5), |v| format!("{v:.0}"));
    draw_x_axis(&painter, &plot, &plot.x.ticks(10), year_label);
    axis_title(&painter, outer, "Natural Flow (Million Acre-Feet)");

    // Allocation line and label.
    let allocation_y = plot.y.apply(COMPACT_ALLOCATION_MAF) as f32;
    dashed_line(
        &painter,
        egui::pos2(plot.rect.min.x, allocation_y),
        egui::pos2(plot.rect.max.x, allocation_y),
        egui::Stroke::new(2.0, theme::ALLOCATION_LINE),
    );
    painter.text(
        egui::pos2(plot.rect.center().x - 100.0, allocation_y - 10.0),
        egui::Align2::LEFT_BOTTOM,
        "Total Allocation (~16.5 MAF)",
        egui::FontId::proportional(12.0),
        theme::ALLOCATION_LINE,
    );

    let runs = averaged_runs(&data.records);

    // Deficit: between the allocation and the average wherever it falls short.
    for run in &runs {
        let upper: Vec<egui::Pos2> = run
            .iter()
            .map(|(year, _)| plot.to_screen(*year, COMPACT_ALLOCATION_MAF))
            .collect();
        let lower: Vec<egui::Pos2> = run
            .iter()
            .map(|(year, ma)| plot.to_screen(*year, ma.min(COMPACT_ALLOCATION_MAF)))
            .collect();
        fill_between(&painter, &upper, &lower, theme::DEFICIT_FILL);
    }

    let started = *view.started.get_or_insert(cx.now);
    let progress = animation_progress(Some(started), cx.now, cx.config.timings.line_draw);
    let drawing = reveal_painter(&painter, plot.rect, progress);
    for run in &runs {
        let points: Vec<Vec2> = run
            .iter()
            .map(|(year, ma)| to_vec2(plot.to_screen(*year, *ma)))
            .collect();
        let smooth: Vec<egui::Pos2> = monotone_x(&points).into_iter().map(to_pos).collect();
        polyline(&drawing, &smooth, egui::Stroke::new(3.0, theme::FLOW_LINE));
    }

    let Some(pointer) = hover_pos(&response) else {
        return;
    };
    let hovered = data.averaged().find(|(year, ma)| {
        plot.to_screen(*year, *ma).distance(pointer) <= DOT_RADIUS
    });
    if let Some((year, ma)) = hovered {
        painter.circle_filled(plot.to_screen(year, ma), DOT_RADIUS, theme::FLOW_LINE);
        cx.show_tooltip(
            pointer,
            year_label(year),
            vec![TooltipLine::Plain(format!("10-Yr Avg: {ma:.2} MAF"))],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: f64, moving_average: Option<f64>) -> FlowRecord {
        FlowRecord {
            year,
            flow: 15.0,
            moving_average,
        }
    }

    #[test]
    fn test_gaps_split_runs() {
        let records = [
            record(1916.0, Some(15.0)),
            record(1917.0, Some(16.0)),
            record(1918.0, None),
            record(1919.0, None),
            record(1920.0, Some(14.0)),
        ];
        let runs = averaged_runs(&records);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![(1916.0, 15.0), (1917.0, 16.0)]);
        assert_eq!(runs[1], vec![(1920.0, 14.0)]);
    }

    #[test]
    fn test_no_average_no_runs() {
        assert!(averaged_runs(&[record(1916.0, None)]).is_empty());
    }
}
