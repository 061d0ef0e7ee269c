//! Step 7: Lake Powell storage as a dated area chart.

use bevy::math::Vec2;
use bevy_egui::egui;
use chrono::{Datelike, NaiveDate};
use story::charts::{date_x, LakePowell};
use story::curve::monotone_x;
use story::format::millions_af;
use story::tooltip::TooltipLine;

use crate::drawing::{
    allocate_chart, axis_title, draw_x_axis, draw_y_axis, fill_to_baseline, hover_pos, polyline,
    to_pos, to_vec2, Margins, Plot,
};
use crate::page::DrawCtx;
use crate::theme;

const MARGINS: Margins = Margins::new(40.0, 30.0, 50.0, 90.0);

/// January 1st of each year in `[first, last]`, stepping to keep about
/// `count` ticks.
fn year_ticks(x_domain: (f64, f64), count: usize) -> Vec<(f64, i32)> {
    let year_of = |x: f64| NaiveDate::from_num_days_from_ce_opt(x as i32).map(|d| d.year());
    let (Some(first), Some(last)) = (year_of(x_domain.0), year_of(x_domain.1)) else {
        return Vec::new();
    };
    let span = (last - first).max(1);
    let step = (span as f64 / count.max(1) as f64).ceil().max(1.0) as i32;
    (first..=last)
        .step_by(step as usize)
        .filter_map(|year| {
            let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
            let x = date_x(date);
            (x >= x_domain.0 && x <= x_domain.1).then_some((x, year))
        })
        .collect()
}

pub(crate) fn draw(ui: &mut egui::Ui, cx: &mut DrawCtx, data: &LakePowell) {
    let (response, painter) = allocate_chart(ui, cx.config.chart_height);
    let outer = response.rect;
    let Some(x_domain) = data.x_extent() else {
        return;
    };
    let plot = Plot::with_y_scale(MARGINS.inset(outer), x_domain, data.storage_scale((0.0, 1.0)));

    painter.text(
        egui::pos2(outer.center().x, outer.min.y + 4.0),
        egui::Align2::CENTER_TOP,
        "Lake Powell Water Storage",
        egui::FontId::proportional(16.0),
        theme::TITLE,
    );
    draw_y_axis(&painter, &plot, &plot.y.ticks(8), millions_af);
    let ticks = year_ticks(x_domain, 10);
    let tick_xs: Vec<f64> = ticks.iter().map(|(x, _)| *x).collect();
    draw_x_axis(&painter, &plot, &tick_xs, |x| {
        ticks
            .iter()
            .find(|(tx, _)| *tx == x)
            .map(|(_, year)| year.to_string())
            .unwrap_or_default()
    });
    axis_title(&painter, outer, "Storage (Acre-Feet)");

    let points: Vec<Vec2> = data
        .records
        .iter()
        .map(|r| to_vec2(plot.to_screen(r.x(), r.storage)))
        .collect();
    let line: Vec<egui::Pos2> = monotone_x(&points).into_iter().map(to_pos).collect();
    fill_to_baseline(
        &painter,
        &line,
        plot.baseline(),
        theme::faded(theme::LAKE_FILL_TOP, 0.8),
        theme::faded(theme::LAKE_FILL_BOTTOM, 0.2),
    );
    polyline(&painter, &line, egui::Stroke::new(2.5, theme::LAKE_LINE));

    let Some(pointer) = hover_pos(&response).filter(|p| plot.rect.contains(*p)) else {
        return;
    };
    if let Some(record) = data.record_at_or_after(plot.x_at(pointer.x)) {
        cx.show_tooltip(
            pointer,
            record.month_label(),
            vec![TooltipLine::Plain(format!(
                "Storage: {:.2}M AF",
                record.storage / 1_000_000.0
            ))],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_ticks_fall_on_new_year() {
        let from = date_x(NaiveDate::from_ymd_opt(2000, 6, 1).unwrap());
        let to = date_x(NaiveDate::from_ymd_opt(2004, 3, 1).unwrap());
        let ticks = year_ticks((from, to), 10);
        let years: Vec<i32> = ticks.iter().map(|(_, y)| *y).collect();
        assert_eq!(years, vec![2001, 2002, 2003, 2004]);
        assert_eq!(
            ticks[0].0,
            date_x(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap())
        );
    }
}
