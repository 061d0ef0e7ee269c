//! Step 3: where Phoenix's water comes from, as a small Sankey diagram.

use bevy::math::Vec2;
use bevy::prelude::Resource;
use bevy_egui::egui;
use story::charts::{
    SankeyLayout, WaterSources, LINK_OPACITY, NODE_PADDING, NODE_WIDTH, SANKEY_TIP,
};
use story::tooltip::TooltipLine;

use crate::drawing::{allocate_chart, hover_pos, to_pos, to_vec2, Margins};
use crate::page::DrawCtx;
use crate::theme;

const MARGINS: Margins = Margins::new(35.0, 20.0, 25.0, 10.0);
const DIAGRAM_HEIGHT: f32 = 260.0;
const CURVE_SAMPLES: usize = 24;
/// Links fade in one after another.
const LINK_DELAY: f64 = 0.15;
const LINK_STAGGER: f64 = 0.04;

#[derive(Resource, Debug, Default)]
pub(crate) struct SankeyView {
    /// Clicked node or link; `None` shows the tip.
    detail: Option<(String, String)>,
    fade_start: Option<f64>,
    layout: Option<SankeyLayout>,
}

impl SankeyView {
    fn layout_for(&mut self, data: &WaterSources, size: Vec2) -> &SankeyLayout {
        if self.layout.as_ref().map_or(true, |l| l.size != size) {
            self.layout = Some(data.graph.layout(size, NODE_WIDTH, NODE_PADDING));
        }
        self.layout.get_or_insert_with(|| data.graph.layout(size, NODE_WIDTH, NODE_PADDING))
    }

    /// Record a click on the diagram.
    pub fn click(&mut self, layout: &SankeyLayout, at: Vec2) {
        self.detail = layout.describe(layout.hit(at));
    }

    pub fn detail(&self) -> Option<&(String, String)> {
        self.detail.as_ref()
    }
}

/// Opacity multiplier of link `index` during the initial fade-in.
pub(crate) fn link_fade(start: f64, index: usize, now: f64, duration: f64) -> f32 {
    let begin = start + LINK_DELAY + LINK_STAGGER * index as f64;
    if duration <= 0.0 {
        return if now >= begin { 1.0 } else { 0.0 };
    }
    ((now - begin) / duration).clamp(0.0, 1.0) as f32
}

pub(crate) fn draw(
    ui: &mut egui::Ui,
    cx: &mut DrawCtx,
    data: &WaterSources,
    view: &mut SankeyView,
) {
    let (response, painter) =
        allocate_chart(ui, DIAGRAM_HEIGHT + MARGINS.top + MARGINS.bottom);
    let area = MARGINS.inset(response.rect);
    let origin = to_vec2(area.min);
    let fade_start = *view.fade_start.get_or_insert(cx.now);
    let link_fade_duration = cx.config.timings.link_fade;

    let pointer = hover_pos(&response);
    let clicked = response
        .clicked()
        .then(|| response.interact_pointer_pos())
        .flatten();

    let layout = view.layout_for(data, Vec2::new(area.width(), area.height())).clone();
    let highlight = pointer
        .map(|p| layout.hit(to_vec2(p) - origin))
        .unwrap_or_default();

    for link in &layout.links {
        let [p0, p1, p2, p3] = layout.link_curve(link);
        let points: Vec<egui::Pos2> = (0..=CURVE_SAMPLES)
            .map(|s| {
                let t = s as f32 / CURVE_SAMPLES as f32;
                let u = 1.0 - t;
                let p = p0 * (u * u * u)
                    + p1 * (3.0 * u * u * t)
                    + p2 * (3.0 * u * t * t)
                    + p3 * (t * t * t);
                to_pos(p + origin)
            })
            .collect();
        let fade = link_fade(fade_start, link.index, cx.now, link_fade_duration);
        let opacity = highlight.link_opacity(link).min(LINK_OPACITY * fade);
        let color = theme::faded(theme::sankey_color(link.source), opacity);
        painter.add(egui::Shape::line(
            points,
            egui::Stroke::new(link.width.max(1.0), color),
        ));
    }

    let mid = layout.size.x / 2.0;
    for node in &layout.nodes {
        let (min, max) = node.rect();
        let rect = egui::Rect::from_min_max(to_pos(min + origin), to_pos(max + origin));
        let opacity = highlight.node_opacity(node.index, &layout);
        painter.rect_filled(rect, 3.0, theme::faded(theme::sankey_color(node.index), opacity));

        let (pos, align) = if node.x0 < mid {
            (egui::pos2(rect.max.x + 6.0, rect.center().y), egui::Align2::LEFT_CENTER)
        } else {
            (egui::pos2(rect.min.x - 6.0, rect.center().y), egui::Align2::RIGHT_CENTER)
        };
        painter.text(
            pos,
            align,
            node.name,
            egui::FontId::proportional(12.0),
            theme::TEXT,
        );
    }

    if let Some(p) = pointer {
        if let Some((title, body)) = layout.describe(highlight) {
            cx.show_tooltip(p, title, vec![TooltipLine::Plain(body)]);
        }
    }
    if let Some(p) = clicked {
        view.click(&layout, to_vec2(p) - origin);
    }

    ui.add_space(4.0);
    match view.detail() {
        Some((title, body)) => {
            ui.label(egui::RichText::new(title).strong());
            ui.label(body);
        }
        None => {
            ui.label(egui::RichText::new(SANKEY_TIP).color(theme::TEXT_MUTED));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SankeyLayout {
        WaterSources::default()
            .graph
            .layout(Vec2::new(600.0, 260.0), NODE_WIDTH, NODE_PADDING)
    }

    #[test]
    fn test_click_on_node_then_empty_space() {
        let layout = layout();
        let mut view = SankeyView::default();
        let srp = &layout.nodes[0];
        view.click(&layout, Vec2::new(srp.x0 + 1.0, srp.center_y()));
        assert_eq!(view.detail().map(|d| d.0.as_str()), Some("SRP"));

        // Far corner between columns: nothing there.
        view.click(&layout, Vec2::new(300.0, -50.0));
        assert!(view.detail().is_none());
    }

    #[test]
    fn test_links_fade_in_staggered() {
        assert_eq!(link_fade(0.0, 0, 0.1, 1.8), 0.0);
        assert_eq!(link_fade(0.0, 0, 5.0, 1.8), 1.0);
        assert!(link_fade(0.0, 5, 1.0, 1.8) < link_fade(0.0, 0, 1.0, 1.8));
    }
}
