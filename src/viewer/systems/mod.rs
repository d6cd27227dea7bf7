//! Viewer systems

pub mod animation;
pub mod camera;
pub mod scene;

pub use animation::{advance_playback, apply_material_colors, apply_object_poses};
pub use camera::update_camera_from_input;
pub use scene::setup_scene;
