//! Viewer component definitions

use bevy::prelude::*;

/// Marker component for the orbit-controlled camera
#[derive(Component)]
pub struct CameraController;

/// Z-up parent of every scene object
#[derive(Component)]
pub struct SceneRoot;

/// Entity whose transform follows the named scene object
#[derive(Component)]
pub struct AnimatedObject(pub String);
