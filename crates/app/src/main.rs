use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use charts::ChartsPlugin;
use story::config::StoryConfig;
use story::StoryPlugin;

#[cfg(target_arch = "wasm32")]
mod web_params;

/// Optional overrides for paths, timings and layout.
#[cfg(not(target_arch = "wasm32"))]
const CONFIG_PATH: &str = "assets/story.json";

fn main() {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "The Colorado River".to_string(),
                    resolution: (1280.0, 800.0).into(),
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            })
            .set(bevy::log::LogPlugin {
                filter: "wgpu=error,naga=warn,story=info,charts=info".to_string(),
                ..default()
            }),
    )
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    .insert_resource(ClearColor(Color::srgb_u8(248, 247, 244)))
    .insert_resource(load_config())
    .add_plugins((StoryPlugin, ChartsPlugin))
    .add_systems(Startup, spawn_camera);

    app.run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> StoryConfig {
    let text = match std::fs::read_to_string(CONFIG_PATH) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoryConfig::default(),
        Err(e) => {
            warn!("Could not read {}: {}", CONFIG_PATH, e);
            return StoryConfig::default();
        }
    };
    match StoryConfig::from_json(&text) {
        Ok(config) => {
            info!("Loaded story config from {}", CONFIG_PATH);
            config
        }
        Err(e) => {
            warn!("Ignoring {}: {}", CONFIG_PATH, e);
            StoryConfig::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_config() -> StoryConfig {
    let mut config = StoryConfig::default();
    if let Some(root) = web_params::query_asset_root() {
        info!("Asset root from URL: {}", root);
        config.asset_root = root;
    }
    config
}
