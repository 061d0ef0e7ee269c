//! The single floating tooltip shared by every chart.
//!
//! Charts call [`Tooltip::show`] while the pointer hovers a datum. The
//! content is cleared at the start of each frame, so a chart that stops
//! calling `show` hides the tooltip without any explicit mouse-out handling.

use bevy::prelude::*;

use crate::config::TOOLTIP_OFFSET;

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipLine {
    Plain(String),
    /// Secondary detail in a smaller, muted style.
    Muted(String),
    /// Highlighted status text.
    Alert(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    /// Top-left corner of the tooltip in screen coordinates.
    pub anchor: Vec2,
    pub title: String,
    pub lines: Vec<TooltipLine>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Tooltip {
    content: Option<TooltipContent>,
}

impl Tooltip {
    /// Show `title` and `lines` next to `pointer`.
    pub fn show(&mut self, pointer: Vec2, title: impl Into<String>, lines: Vec<TooltipLine>) {
        self.content = Some(TooltipContent {
            anchor: pointer + TOOLTIP_OFFSET,
            title: title.into(),
            lines,
        });
    }

    pub fn hide(&mut self) {
        self.content = None;
    }

    pub fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.content.is_some()
    }
}

pub fn clear_tooltip(mut tooltip: ResMut<Tooltip>) {
    tooltip.hide();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_offsets_anchor() {
        let mut tooltip = Tooltip::default();
        tooltip.show(
            Vec2::new(100.0, 200.0),
            "1995",
            vec![TooltipLine::Plain("Water index: 112.0".into())],
        );
        let content = tooltip.content().unwrap();
        assert_eq!(content.anchor, Vec2::new(110.0, 172.0));
        assert_eq!(content.title, "1995");
    }

    #[test]
    fn test_clear_each_frame() {
        let mut app = App::new();
        app.init_resource::<Tooltip>()
            .add_systems(First, clear_tooltip);
        app.world_mut()
            .resource_mut::<Tooltip>()
            .show(Vec2::ZERO, "x", Vec::new());
        assert!(app.world().resource::<Tooltip>().is_visible());
        app.update();
        assert!(!app.world().resource::<Tooltip>().is_visible());
    }
}
