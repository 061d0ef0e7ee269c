//! Shared drawing helpers: plot frames, axes, lines, filled areas,
//! progressive clipping, and legend items.

use bevy::math::Vec2;
use bevy_egui::egui;
use story::scale::LinearScale;

use crate::theme;

pub(crate) const ERROR_TEXT: &str = "Error loading chart data.";

/// Space around the plot area for axes and labels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn inset(&self, outer: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            egui::pos2(outer.min.x + self.left, outer.min.y + self.top),
            egui::pos2(
                (outer.max.x - self.right).max(outer.min.x + self.left + 1.0),
                (outer.max.y - self.bottom).max(outer.min.y + self.top + 1.0),
            ),
        )
    }
}

/// Plot area with its data-to-screen scales.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Plot {
    pub rect: egui::Rect,
    pub x: LinearScale,
    pub y: LinearScale,
}

impl Plot {
    /// `y` maps bottom-up: the domain minimum sits on the bottom edge.
    pub fn new(rect: egui::Rect, x_domain: (f64, f64), y_domain: (f64, f64)) -> Self {
        Self {
            rect,
            x: LinearScale::new(x_domain, (rect.min.x as f64, rect.max.x as f64)),
            y: LinearScale::new(y_domain, (rect.max.y as f64, rect.min.y as f64)),
        }
    }

    /// Plot whose y axis takes the domain of a scale built by the dataset.
    pub fn with_y_scale(rect: egui::Rect, x_domain: (f64, f64), y: LinearScale) -> Self {
        Self::new(rect, x_domain, y.domain)
    }

    pub fn to_screen(&self, x: f64, y: f64) -> egui::Pos2 {
        egui::pos2(self.x.apply(x) as f32, self.y.apply(y) as f32)
    }

    /// Data x under a screen x.
    pub fn x_at(&self, screen_x: f32) -> f64 {
        self.x.invert(screen_x as f64)
    }

    pub fn baseline(&self) -> f32 {
        self.rect.max.y
    }
}

pub(crate) fn to_pos(v: Vec2) -> egui::Pos2 {
    egui::pos2(v.x, v.y)
}

pub(crate) fn to_vec2(p: egui::Pos2) -> Vec2 {
    Vec2::new(p.x, p.y)
}

/// Reserve a full-width chart area and return its response and painter.
pub(crate) fn allocate_chart(
    ui: &mut egui::Ui,
    height: f32,
) -> (egui::Response, egui::Painter) {
    let width = ui.available_width().max(120.0);
    let (rect, response) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::click());
    let painter = ui.painter_at(rect);
    (response, painter)
}

/// Pointer position while it hovers `response`.
pub(crate) fn hover_pos(response: &egui::Response) -> Option<egui::Pos2> {
    if response.hovered() {
        response.hover_pos()
    } else {
        None
    }
}

pub(crate) fn draw_error(painter: &egui::Painter, rect: egui::Rect) {
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        ERROR_TEXT,
        egui::FontId::proportional(15.0),
        theme::ERROR,
    );
}

// ---------------------------------------------------------------------------
// Axes
// ---------------------------------------------------------------------------

pub(crate) fn draw_y_axis(
    painter: &egui::Painter,
    plot: &Plot,
    ticks: &[f64],
    label: impl Fn(f64) -> String,
) {
    let font = egui::FontId::proportional(11.0);
    for &tick in ticks {
        let y = plot.y.apply(tick) as f32;
        painter.line_segment(
            [egui::pos2(plot.rect.min.x, y), egui::pos2(plot.rect.max.x, y)],
            egui::Stroke::new(0.5, theme::GRID),
        );
        painter.text(
            egui::pos2(plot.rect.min.x - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            label(tick),
            font.clone(),
            theme::TEXT_MUTED,
        );
    }
    painter.line_segment(
        [plot.rect.left_top(), plot.rect.left_bottom()],
        egui::Stroke::new(1.0, theme::AXIS),
    );
}

pub(crate) fn draw_x_axis(
    painter: &egui::Painter,
    plot: &Plot,
    ticks: &[f64],
    label: impl Fn(f64) -> String,
) {
    let font = egui::FontId::proportional(11.0);
    let y = plot.baseline();
    for &tick in ticks {
        let x = plot.x.apply(tick) as f32;
        painter.line_segment(
            [egui::pos2(x, y), egui::pos2(x, y + 4.0)],
            egui::Stroke::new(1.0, theme::AXIS),
        );
        painter.text(
            egui::pos2(x, y + 6.0),
            egui::Align2::CENTER_TOP,
            label(tick),
            font.clone(),
            theme::TEXT_MUTED,
        );
    }
    painter.line_segment(
        [plot.rect.left_bottom(), plot.rect.right_bottom()],
        egui::Stroke::new(1.0, theme::AXIS),
    );
}

/// Year ticks without digit grouping.
pub(crate) fn year_label(year: f64) -> String {
    format!("{year:.0}")
}

/// Rotated caption on the left edge of the chart.
pub(crate) fn axis_title(painter: &egui::Painter, rect: egui::Rect, text: &str) {
    let galley = painter.layout_no_wrap(
        text.to_string(),
        egui::FontId::proportional(12.0),
        theme::TEXT_MUTED,
    );
    let pos = egui::pos2(rect.min.x + 2.0, rect.center().y + galley.size().x / 2.0);
    painter.add(
        egui::epaint::TextShape::new(pos, galley, theme::TEXT_MUTED)
            .with_angle(-std::f32::consts::FRAC_PI_2),
    );
}

// ---------------------------------------------------------------------------
// Marks
// ---------------------------------------------------------------------------

pub(crate) fn polyline(painter: &egui::Painter, points: &[egui::Pos2], stroke: egui::Stroke) {
    if points.len() < 2 {
        return;
    }
    painter.add(egui::Shape::line(points.to_vec(), stroke));
}

pub(crate) fn dashed_line(
    painter: &egui::Painter,
    from: egui::Pos2,
    to: egui::Pos2,
    stroke: egui::Stroke,
) {
    painter.extend(egui::Shape::dashed_line(&[from, to], stroke, 6.0, 4.0));
}

/// Fill the area between two polylines sampled at the same x positions.
///
/// Each segment becomes a quad in one mesh, so crossings and concave
/// outlines fill correctly.
pub(crate) fn fill_between(
    painter: &egui::Painter,
    upper: &[egui::Pos2],
    lower: &[egui::Pos2],
    color: egui::Color32,
) {
    let n = upper.len().min(lower.len());
    if n < 2 {
        return;
    }
    let mut mesh = egui::Mesh::default();
    for i in 0..n - 1 {
        let base = mesh.vertices.len() as u32;
        mesh.colored_vertex(upper[i], color);
        mesh.colored_vertex(upper[i + 1], color);
        mesh.colored_vertex(lower[i + 1], color);
        mesh.colored_vertex(lower[i], color);
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }
    painter.add(egui::Shape::mesh(mesh));
}

/// Fill from a polyline down to the plot baseline, fading from `top` at
/// the line to `bottom` at the baseline.
pub(crate) fn fill_to_baseline(
    painter: &egui::Painter,
    points: &[egui::Pos2],
    baseline: f32,
    top: egui::Color32,
    bottom: egui::Color32,
) {
    if points.len() < 2 {
        return;
    }
    let mut mesh = egui::Mesh::default();
    for pair in points.windows(2) {
        let base = mesh.vertices.len() as u32;
        mesh.colored_vertex(pair[0], top);
        mesh.colored_vertex(pair[1], top);
        mesh.colored_vertex(egui::pos2(pair[1].x, baseline), bottom);
        mesh.colored_vertex(egui::pos2(pair[0].x, baseline), bottom);
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }
    painter.add(egui::Shape::mesh(mesh));
}

pub(crate) fn focus_dot(painter: &egui::Painter, at: egui::Pos2, color: egui::Color32) {
    painter.circle(at, 4.5, color, egui::Stroke::new(1.5, egui::Color32::WHITE));
}

pub(crate) fn crosshair(painter: &egui::Painter, plot: &Plot, x: f32) {
    painter.line_segment(
        [egui::pos2(x, plot.rect.min.y), egui::pos2(x, plot.rect.max.y)],
        egui::Stroke::new(1.0, theme::AXIS),
    );
}

/// Painter clipped to the left `progress` fraction of `rect`, used to
/// reveal a line from left to right.
pub(crate) fn reveal_painter(
    painter: &egui::Painter,
    rect: egui::Rect,
    progress: f32,
) -> egui::Painter {
    let mut clip = rect.expand(4.0);
    clip.max.x = clip.min.x + clip.width() * progress.clamp(0.0, 1.0);
    painter.with_clip_rect(clip.intersect(painter.clip_rect()))
}

/// Elapsed fraction of an animation that started at `start`.
pub(crate) fn animation_progress(start: Option<f64>, now: f64, duration: f64) -> f32 {
    match start {
        Some(start) if duration > 0.0 => ((now - start) / duration).clamp(0.0, 1.0) as f32,
        Some(_) => 1.0,
        None => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Legend
// ---------------------------------------------------------------------------

pub(crate) fn legend_item(ui: &mut egui::Ui, color: egui::Color32, label: &str) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 2.0, color);
    ui.label(egui::RichText::new(label).small());
}

/// Legend entry that toggles a series. Returns the new visibility.
pub(crate) fn legend_toggle(
    ui: &mut egui::Ui,
    color: egui::Color32,
    label: &str,
    visible: bool,
) -> bool {
    let swatch = if visible {
        color
    } else {
        theme::faded(color, 0.25)
    };
    let text = if visible {
        egui::RichText::new(label).small()
    } else {
        egui::RichText::new(label).small().strikethrough()
    };
    let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 2.0, swatch);
    if ui.selectable_label(false, text).clicked() {
        !visible
    } else {
        visible
    }
}
