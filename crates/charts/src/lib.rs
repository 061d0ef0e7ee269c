use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use story::StorySet;

mod allocation_map;
mod drawing;
mod groundwater;
mod lake_mead;
mod lake_powell;
mod natural_flow;
mod page;
mod projections;
mod river_ribbon;
pub mod theme;
mod tooltip;
mod water_history;
mod water_sources;

/// Draws the story page with egui: section text, every step's visual, and
/// the shared tooltip. Needs [`story::StoryPlugin`].
pub struct ChartsPlugin;

impl Plugin for ChartsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<water_history::WaterHistoryView>()
            .init_resource::<projections::ProjectionsView>()
            .init_resource::<water_sources::SankeyView>()
            .init_resource::<natural_flow::NaturalFlowView>()
            .init_resource::<groundwater::GroundwaterView>()
            .init_resource::<allocation_map::MapGeometry>()
            .add_systems(Startup, theme::apply_story_theme)
            .add_systems(
                Update,
                (
                    page::page_ui.before(StorySet::Observe),
                    tooltip::tooltip_ui.after(page::page_ui),
                ),
            );
    }
}
