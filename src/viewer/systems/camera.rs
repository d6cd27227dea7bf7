//! Camera control system
//!
//! Orbit camera driven by window mouse input: left drag rotates, the scroll
//! wheel zooms.

use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll},
    math::Vec3,
    prelude::*,
};

use crate::config::camera::*;
use crate::viewer::components::CameraController;
use crate::viewer::resources::OrbitCameraState;

/// Camera position for an orbit state
pub fn orbit_position(state: &OrbitCameraState) -> Vec3 {
    let x = state.distance * state.pitch.cos() * state.yaw.sin();
    let y = state.distance * state.pitch.sin();
    let z = state.distance * state.pitch.cos() * state.yaw.cos();
    state.center + Vec3::new(x, y, z)
}

/// Update camera transform based on mouse input
pub fn update_camera_from_input(
    buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    mut orbit_state: ResMut<OrbitCameraState>,
    mut camera_query: Query<&mut Transform, With<CameraController>>,
) {
    if buttons.pressed(MouseButton::Left) && motion.delta != Vec2::ZERO {
        orbit_state.yaw -= motion.delta.x * ROTATION_SPEED;
        orbit_state.pitch += motion.delta.y * ROTATION_SPEED;
        orbit_state.pitch = orbit_state.pitch.clamp(MIN_PITCH, MAX_PITCH);
    }

    if scroll.delta.y != 0.0 {
        orbit_state.distance -= scroll.delta.y * ZOOM_SPEED;
        orbit_state.distance = orbit_state.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    let camera_position = orbit_position(&orbit_state);
    for mut transform in camera_query.iter_mut() {
        *transform =
            Transform::from_translation(camera_position).looking_at(orbit_state.center, Vec3::Y);
    }
}
