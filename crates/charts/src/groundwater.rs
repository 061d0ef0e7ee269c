//! Step 8: largest groundwater depletions as horizontal bars.

use bevy::prelude::Resource;
use bevy_egui::egui;
use story::charts::Groundwater;
use story::scale::{BandScale, LinearScale};
use story::tooltip::TooltipLine;
use story::tween::Easing;

use crate::drawing::{allocate_chart, animation_progress, draw_x_axis, hover_pos, Margins, Plot};
use crate::page::DrawCtx;
use crate::theme;

const MARGINS: Margins = Margins::new(50.0, 30.0, 50.0, 200.0);
const BAND_PADDING: f64 = 0.3;

#[derive(Resource, Debug, Default)]
pub(crate) struct GroundwaterView {
    /// When the bars started growing.
    started: Option<f64>,
}

pub(crate) fn draw(
    ui: &mut egui::Ui,
    cx: &mut DrawCtx,
    data: &Groundwater,
    view: &mut GroundwaterView,
) {
    let (response, painter) = allocate_chart(ui, cx.config.chart_height);
    let outer = response.rect;
    let rect = MARGINS.inset(outer);
    let plot = Plot::new(rect, (0.0, data.max_km3()), (0.0, 1.0));
    let bands = BandScale::new(
        data.depletions.len(),
        (rect.min.y as f64, rect.max.y as f64),
        BAND_PADDING,
    );

    painter.text(
        egui::pos2(rect.center().x, outer.min.y + 8.0),
        egui::Align2::CENTER_TOP,
        "Largest Groundwater Depletions (1900-2000)",
        egui::FontId::proportional(18.0),
        theme::TITLE,
    );

    let started = *view.started.get_or_insert(cx.now);
    let grow = Easing::CubicInOut.apply(f64::from(animation_progress(
        Some(started),
        cx.now,
        cx.config.timings.bar_grow,
    )));
    let pointer = hover_pos(&response);
    let width_scale = LinearScale::new(plot.x.domain, (0.0, rect.width() as f64));

    for (i, depletion) in data.depletions.iter().enumerate() {
        let Some(top) = bands.position(i) else {
            continue;
        };
        let bar = egui::Rect::from_min_size(
            egui::pos2(rect.min.x, top as f32),
            egui::vec2(
                (width_scale.apply(depletion.km3) * grow) as f32,
                bands.bandwidth() as f32,
            ),
        );
        let hovered = pointer.is_some_and(|p| bar.contains(p));
        let color = if depletion.is_arizona() {
            theme::ARIZONA_BAR
        } else {
            theme::OTHER_BAR
        };
        let color = if hovered {
            theme::faded(color, 0.7)
        } else {
            color
        };
        painter.rect_filled(bar, 0.0, color);
        painter.text(
            egui::pos2(rect.min.x - 6.0, bar.center().y),
            egui::Align2::RIGHT_CENTER,
            &depletion.name,
            egui::FontId::proportional(11.0),
            theme::TEXT,
        );

        if let (true, Some(p)) = (hovered, pointer) {
            cx.show_tooltip(
                p,
                depletion.name.clone(),
                vec![
                    TooltipLine::Plain(format!("Depletion: {} km³", depletion.km3)),
                    TooltipLine::Plain(format!("(~{:.1} MAF)", depletion.maf())),
                ],
            );
        }
    }

    draw_x_axis(&painter, &plot, &plot.x.ticks(5), |v| format!("{v}"));
    painter.text(
        egui::pos2(rect.center().x, outer.max.y - 4.0),
        egui::Align2::CENTER_BOTTOM,
        "Total Volume Lost (Cubic Kilometers)",
        egui::FontId::proportional(12.0),
        theme::TEXT_MUTED,
    );
}
