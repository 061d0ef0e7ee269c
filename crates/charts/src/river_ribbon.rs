//! Step 5: the river as a ribbon that narrows downstream, with the major
//! diversions drawn as pipes leaving its right bank.
//!
//! Values are approximate and built in; nothing is fetched.

use bevy::math::Vec2;
use bevy_egui::egui;
use story::curve::catmull_rom;

use crate::drawing::{allocate_chart, fill_between, polyline, to_pos, Margins};
use crate::theme;

const MARGINS: Margins = Margins::new(40.0, 40.0, 70.0, 40.0);
const RIBBON_HEIGHT: f32 = 420.0;
const RIBBON_ALPHA: f32 = 0.9;
const PIPE_ALPHA: f32 = 0.8;

const CAPTION: &str = "Flow width is proportional to remaining Colorado River water (~14.6 MAF). \
Side \u{201c}pipes\u{201d} show major diversions (values approximate, for storytelling).";

/// One point on the river's centerline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Station {
    pub center: Vec2,
    pub width: f32,
    pub label: &'static str,
    /// Labels at the mouth sit centered below the ribbon.
    pub centered: bool,
    pub label_offset: Vec2,
}

/// Stations from source (top) to what is left (bottom), inside `size`.
pub(crate) fn stations(size: Vec2) -> [Station; 4] {
    let (w, h) = (size.x, size.y);
    [
        Station {
            center: Vec2::new(w * 0.35, 10.0),
            width: 130.0,
            label: "Total river flow \u{2248}14.6 MAF",
            centered: false,
            label_offset: Vec2::new(10.0, 6.0),
        },
        Station {
            center: Vec2::new(w * 0.30, h * 0.30),
            width: 110.0,
            label: "After Lower Basin & CA \u{2248}9.0 MAF",
            centered: false,
            label_offset: Vec2::new(12.0, 4.0),
        },
        Station {
            center: Vec2::new(w * 0.40, h * 0.55),
            width: 80.0,
            label: "Upper Basin share \u{2248}1.8 MAF",
            centered: false,
            label_offset: Vec2::new(12.0, 4.0),
        },
        Station {
            center: Vec2::new(w * 0.33, h * 0.90),
            width: 40.0,
            label: "River left after major losses",
            centered: true,
            label_offset: Vec2::new(0.0, 22.0),
        },
    ]
}

/// Left and right banks, each smoothed through the stations. Both edges
/// carry the same number of samples.
pub(crate) fn ribbon_edges(stations: &[Station]) -> (Vec<Vec2>, Vec<Vec2>) {
    let left: Vec<Vec2> = stations
        .iter()
        .map(|s| s.center - Vec2::new(s.width / 2.0, 0.0))
        .collect();
    let right: Vec<Vec2> = stations
        .iter()
        .map(|s| s.center + Vec2::new(s.width / 2.0, 0.0))
        .collect();
    (
        catmull_rom(&left, RIBBON_ALPHA),
        catmull_rom(&right, RIBBON_ALPHA),
    )
}

/// A diversion leaving the right bank of `attach`.
struct Pipe {
    label: &'static str,
    attach: Station,
    thickness: f32,
    end: Vec2,
}

fn pipes(size: Vec2, stations: &[Station; 4]) -> [Pipe; 2] {
    [
        Pipe {
            label: "Lower Basin + CA \u{2248}10.0 MAF",
            attach: stations[1],
            thickness: 24.0,
            end: Vec2::new(size.x * 0.85, stations[1].center.y + 4.0),
        },
        Pipe {
            label: "Agriculture \u{2248}4\u{2013}5 MAF",
            attach: stations[2],
            thickness: 22.0,
            end: Vec2::new(size.x * 0.80, stations[2].center.y + 8.0),
        },
    ]
}

/// Control points of a pipe that bows up out of the river and settles
/// into its end point.
pub(crate) fn pipe_path(start: Vec2, end: Vec2) -> [Vec2; 4] {
    let mid_x = (start.x + end.x) / 2.0;
    let ctrl = (end.x - start.x) * 0.35;
    [
        start,
        Vec2::new(mid_x - ctrl, start.y - 18.0),
        Vec2::new(mid_x + ctrl, end.y + 10.0),
        end,
    ]
}

pub(crate) fn draw(ui: &mut egui::Ui) {
    let (response, painter) = allocate_chart(ui, RIBBON_HEIGHT);
    let outer = response.rect;
    let area = MARGINS.inset(outer);
    let origin = Vec2::new(area.min.x, area.min.y);
    let size = Vec2::new(area.width(), area.height());
    let at = |p: Vec2| to_pos(p + origin);

    let stations = stations(size);
    let (left, right) = ribbon_edges(&stations);
    let left: Vec<egui::Pos2> = left.into_iter().map(at).collect();
    let right: Vec<egui::Pos2> = right.into_iter().map(at).collect();
    fill_between(&painter, &left, &right, theme::RIBBON_FILL);
    let outline: Vec<egui::Pos2> = left
        .iter()
        .copied()
        .chain(right.iter().rev().copied())
        .collect();
    painter.add(egui::Shape::closed_line(
        outline,
        egui::Stroke::new(3.0, theme::RIBBON_EDGE),
    ));

    for station in &stations {
        let (align, font_size) = if station.centered {
            (egui::Align2::CENTER_CENTER, 14.0)
        } else {
            (egui::Align2::LEFT_CENTER, 13.0)
        };
        painter.text(
            at(station.center + station.label_offset),
            align,
            station.label,
            egui::FontId::proportional(font_size),
            theme::TEXT,
        );
    }

    for pipe in pipes(size, &stations) {
        let start = pipe.attach.center + Vec2::new(pipe.attach.width / 2.0, 0.0);
        let path: Vec<egui::Pos2> = catmull_rom(&pipe_path(start, pipe.end), PIPE_ALPHA)
            .into_iter()
            .map(at)
            .collect();
        polyline(
            &painter,
            &path,
            egui::Stroke::new(pipe.thickness + 6.0, theme::PIPE_HALO),
        );
        polyline(&painter, &path, egui::Stroke::new(pipe.thickness, theme::PIPE));
        for end in [path.first(), path.last()].into_iter().flatten() {
            painter.circle_filled(*end, pipe.thickness / 2.0, theme::PIPE);
        }
        painter.text(
            at(pipe.end + Vec2::new(8.0 + pipe.thickness / 2.0, 4.0)),
            egui::Align2::LEFT_CENTER,
            pipe.label,
            egui::FontId::proportional(13.0),
            theme::TEXT,
        );
    }

    let caption = egui::Rect::from_min_size(
        egui::pos2(area.min.x, area.max.y + 18.0),
        egui::vec2(area.width(), 32.0),
    );
    painter.rect_filled(caption, 0.0, theme::CAPTION_BG);
    let galley = painter.layout(
        CAPTION.to_string(),
        egui::FontId::proportional(12.0),
        theme::TEXT_MUTED,
        caption.width() - 8.0,
    );
    let text_pos = caption.center() - galley.size() / 2.0;
    painter.galley(text_pos, galley, theme::TEXT_MUTED);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ribbon_narrows_downstream() {
        let stations = stations(Vec2::new(600.0, 310.0));
        let widths: Vec<f32> = stations.iter().map(|s| s.width).collect();
        assert!(widths.windows(2).all(|w| w[0] > w[1]));
        assert!(stations.windows(2).all(|s| s[0].center.y < s[1].center.y));
    }

    #[test]
    fn test_edges_pair_up_and_pass_through_stations() {
        let stations = stations(Vec2::new(600.0, 310.0));
        let (left, right) = ribbon_edges(&stations);
        assert_eq!(left.len(), right.len());
        let first_width = right[0].x - left[0].x;
        assert!((first_width - 130.0).abs() < 1e-3);
        let last_width = right[right.len() - 1].x - left[left.len() - 1].x;
        assert!((last_width - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_pipe_path_bows_above_its_start() {
        let path = pipe_path(Vec2::new(100.0, 50.0), Vec2::new(400.0, 54.0));
        assert_eq!(path[0], Vec2::new(100.0, 50.0));
        assert_eq!(path[3], Vec2::new(400.0, 54.0));
        assert!(path[1].y < path[0].y);
    }
}
