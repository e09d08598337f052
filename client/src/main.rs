//! Cauldron client - loads the level, renders it and drives the simulation
//!
//! Bevy 0.17

mod audio;
mod camera;
mod input;
mod loading;
mod states;
mod systems;
mod ui;

use std::path::PathBuf;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use cauldron_shared::{ConfigError, GameConfig, GameEvent, CONFIG_PATH};
use states::AppState;

/// Ordering of the per-frame work
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AppSet {
    Input,
    Simulate,
    Present,
}

/// Root folder assets are read from
#[derive(Resource)]
struct AssetRoot(PathBuf);

/// Get the asset path - for bundled macOS apps, use path relative to executable
fn get_asset_path() -> String {
    // Try to find assets relative to executable (for .app bundles)
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let bundled_assets = exe_dir.join("assets");
            if bundled_assets.exists() {
                return bundled_assets.to_string_lossy().to_string();
            }
        }
    }
    // Fall back to default "assets" folder (for development)
    "assets".to_string()
}

/// Read the tuning file. A missing file means defaults; a broken one is reported and ignored.
fn load_config(mut commands: Commands, root: Res<AssetRoot>) {
    let path = root.0.join(CONFIG_PATH);
    let config = match GameConfig::load_from_file(&path) {
        Ok(config) => {
            info!("Loaded tuning from {:?}", path);
            config
        }
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            info!("No tuning file at {:?}, using defaults", path);
            GameConfig::default()
        }
        Err(err) => {
            warn!("{}; using default tuning", err);
            GameConfig::default()
        }
    };
    commands.insert_resource(config);
}

fn main() {
    let asset_path = get_asset_path();

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Cauldron".to_string(),
                    resolution: WindowResolution::new(1280, 720),
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: asset_path.clone(),
                ..default()
            }),
    );

    // Game state machine
    app.init_state::<AppState>();
    app.add_message::<GameEvent>();

    app.insert_resource(AssetRoot(PathBuf::from(asset_path)));
    app.init_resource::<input::InputState>();
    app.init_resource::<systems::LevelStatus>();

    app.configure_sets(Update, (AppSet::Input, AppSet::Simulate, AppSet::Present).chain());

    app.add_plugins(audio::GameAudioPlugin);
    app.add_plugins(ui::HudPlugin);

    // Config first so everything spawned at startup sees the tuning
    app.add_systems(PreStartup, load_config);
    app.add_systems(
        Startup,
        (systems::setup_rendering, camera::setup_cameras, systems::load_level),
    );

    app.add_systems(
        Update,
        (input::handle_keyboard_input, input::handle_mouse_input).in_set(AppSet::Input),
    );

    app.add_systems(
        Update,
        (systems::report_load_progress, systems::bind_level)
            .chain()
            .in_set(AppSet::Simulate)
            .run_if(in_state(AppState::Loading)),
    );
    app.add_systems(
        Update,
        systems::reject_actions_until_ready
            .in_set(AppSet::Simulate)
            .run_if(not(in_state(AppState::Playing))),
    );
    app.add_systems(
        Update,
        systems::run_game_frame
            .in_set(AppSet::Simulate)
            .run_if(in_state(AppState::Playing)),
    );

    // Mirror the simulation onto entities and cameras
    app.add_systems(
        Update,
        (
            systems::sync_scene_nodes,
            systems::apply_ground_texture,
            camera::apply_camera_rig,
            camera::switch_active_camera,
        )
            .chain()
            .in_set(AppSet::Present)
            .run_if(in_state(AppState::Playing)),
    );

    info!("Starting Cauldron client");
    app.run();
}
