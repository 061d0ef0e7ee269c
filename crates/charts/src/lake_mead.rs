//! Step 6: Lake Mead storage over shortage-tier bands, revealed with the
//! section's scroll position.

use bevy::math::Vec2;
use bevy_egui::egui;
use story::charts::{LakeMead, StorageBand};
use story::curve::monotone_x;
use story::format::thousands;
use story::reveal::section_reveal_progress;
use story::scale::bisect_center;
use story::tooltip::TooltipLine;

use crate::drawing::{
    allocate_chart, axis_title, crosshair, draw_x_axis, draw_y_axis, fill_to_baseline,
    focus_dot, hover_pos, legend_item, polyline, reveal_painter, to_pos, to_vec2, year_label,
    Margins, Plot,
};
use crate::page::DrawCtx;
use crate::theme;

const MARGINS: Margins = Margins::new(40.0, 40.0, 50.0, 90.0);

fn band_fill(band: StorageBand) -> egui::Color32 {
    match band {
        StorageBand::Comfort => theme::BAND_COMFORT,
        StorageBand::Warning => theme::BAND_WARNING,
        StorageBand::ShortageRisk => theme::BAND_SHORTAGE,
    }
}

fn band_swatch(band: StorageBand) -> egui::Color32 {
    match band {
        StorageBand::Comfort => theme::LEGEND_COMFORT,
        StorageBand::Warning => theme::LEGEND_WARNING,
        StorageBand::ShortageRisk => theme::LEGEND_SHORTAGE,
    }
}

pub(crate) fn draw(ui: &mut egui::Ui, cx: &mut DrawCtx, data: &LakeMead) {
    ui.horizontal(|ui| {
        for band in StorageBand::ALL {
            legend_item(ui, band_swatch(band), band.label());
        }
    });

    let (response, painter) = allocate_chart(ui, cx.config.chart_height);
    let outer = response.rect;
    let Some(years) = data.year_extent() else {
        return;
    };
    let plot = Plot::with_y_scale(MARGINS.inset(outer), years, data.storage_scale((0.0, 1.0)));
    let max_storage = data.max_storage();

    for band in StorageBand::ALL {
        let (lo, hi) = band.bounds(max_storage);
        let top = (plot.y.apply(hi) as f32).max(plot.rect.min.y);
        let bottom = (plot.y.apply(lo) as f32).min(plot.rect.max.y);
        if bottom > top {
            painter.rect_filled(
                egui::Rect::from_x_y_ranges(plot.rect.x_range(), top..=bottom),
                0.0,
                band_fill(band),
            );
        }
    }

    draw_y_axis(&painter, &plot, &plot.y.ticks(6), thousands);
    draw_x_axis(&painter, &plot, &plot.x.ticks(8), year_label);
    axis_title(&painter, outer, "Storage (Acre-feet)");

    let progress = section_reveal_progress(
        cx.viewport.height(),
        cx.viewport_top(cx.section),
        cx.section.height(),
    );
    let revealed = reveal_painter(&painter, plot.rect, progress);
    let points: Vec<Vec2> = data
        .records
        .iter()
        .map(|r| to_vec2(plot.to_screen(r.year, r.storage)))
        .collect();
    let line: Vec<egui::Pos2> = monotone_x(&points).into_iter().map(to_pos).collect();
    fill_to_baseline(
        &revealed,
        &line,
        plot.baseline(),
        theme::LAKE_FILL,
        theme::LAKE_FILL,
    );
    polyline(&revealed, &line, egui::Stroke::new(2.5, theme::LAKE_LINE));

    painter.text(
        egui::pos2(outer.max.x, outer.max.y - 4.0),
        egui::Align2::RIGHT_BOTTOM,
        "Flow reveals as you scroll: shaded bands mark comfort, warning, and shortage risk zones.",
        egui::FontId::proportional(11.0),
        theme::TEXT_MUTED,
    );

    let Some(pointer) = hover_pos(&response).filter(|p| plot.rect.contains(*p)) else {
        return;
    };
    let Some(record) = bisect_center(&data.years(), plot.x_at(pointer.x))
        .and_then(|i| data.records.get(i))
    else {
        return;
    };
    let band = data.band_of(record);

    crosshair(&painter, &plot, plot.x.apply(record.year) as f32);
    focus_dot(&painter, plot.to_screen(record.year, record.storage), theme::LAKE_LINE);
    if let Some(band) = band {
        painter.text(
            egui::pos2(plot.rect.max.x, plot.rect.min.y - 10.0),
            egui::Align2::RIGHT_BOTTOM,
            band.label(),
            egui::FontId::proportional(12.0),
            theme::TEXT,
        );
    }

    let mut lines = vec![TooltipLine::Plain(format!(
        "Storage: {} AF",
        thousands(record.storage)
    ))];
    if let Some(band) = band {
        lines.push(TooltipLine::Alert(band.label().to_string()));
    }
    cx.show_tooltip(pointer, year_label(record.year), lines);
}
