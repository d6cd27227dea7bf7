//! Bevy application setup and execution

use bevy::{
    app::{App, AppExit},
    asset::{AssetPlugin, UnapprovedPathMode},
    prelude::*,
};

use crate::config::playback::WINDOW_TITLE;
use crate::scene::SceneState;
use crate::viewer::resources::*;
use crate::viewer::systems::*;

/// Create and configure the viewer app for `scene`
pub fn create_app(scene: SceneState) -> App {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: WINDOW_TITLE.to_string(),
                    ..default()
                }),
                ..default()
            })
            // imported assets live wherever the caller put them
            .set(AssetPlugin {
                unapproved_path_mode: UnapprovedPathMode::Allow,
                ..default()
            }),
    );

    app.add_systems(Startup, setup_scene);
    app.add_systems(Update, update_camera_from_input);
    app.add_systems(
        Update,
        (advance_playback, apply_object_poses, apply_material_colors).chain(),
    );

    app.insert_resource(Playback::new(scene.end_time()));
    app.insert_resource(SceneRes(scene));
    app.insert_resource(OrbitCameraState::default());

    log::info!("[Viewer] App configured");
    app
}

/// Show `scene` until the window is closed
pub fn run(scene: SceneState) -> AppExit {
    let mut app = create_app(scene);
    log::info!("[Viewer] Running...");
    app.run()
}
