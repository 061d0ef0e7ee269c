use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use story::tooltip::{Tooltip, TooltipLine};

use crate::theme;

/// Paint the shared tooltip, if any chart filled it this frame.
pub(crate) fn tooltip_ui(mut contexts: EguiContexts, tooltip: Res<Tooltip>) {
    let Some(content) = tooltip.content() else {
        return;
    };
    let ctx = contexts.ctx_mut();

    egui::Area::new(egui::Id::new("story_tooltip"))
        .fixed_pos(egui::pos2(content.anchor.x, content.anchor.y))
        .interactable(false)
        .order(egui::Order::Tooltip)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .fill(egui::Color32::from_rgba_premultiplied(255, 255, 255, 240))
                .show(ui, |ui| {
                    ui.set_max_width(260.0);
                    ui.label(egui::RichText::new(&content.title).strong().size(14.0));
                    for line in &content.lines {
                        match line {
                            TooltipLine::Plain(text) => {
                                ui.label(egui::RichText::new(text).size(13.0));
                            }
                            TooltipLine::Muted(text) => {
                                ui.label(
                                    egui::RichText::new(text)
                                        .size(11.0)
                                        .color(theme::TEXT_MUTED),
                                );
                            }
                            TooltipLine::Alert(text) => {
                                ui.label(
                                    egui::RichText::new(text)
                                        .size(13.0)
                                        .strong()
                                        .color(theme::ERROR),
                                );
                            }
                        }
                    }
                });
        });
}
