//! Viewer resource definitions

use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::{camera, playback};
use crate::scene::SceneState;

// =============================================================================
// Camera Control
// =============================================================================

/// Orbit camera state for spherical coordinate camera control
#[derive(Resource)]
pub struct OrbitCameraState {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians), clamped to avoid flipping
    pub pitch: f32,
    pub distance: f32,
    /// The point the camera orbits around
    pub center: Vec3,
}

impl Default for OrbitCameraState {
    fn default() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: camera::START_DISTANCE,
            center: Vec3::ZERO,
        }
    }
}

// =============================================================================
// Animation
// =============================================================================

/// The finished scene handed over by the host backend
#[derive(Resource)]
pub struct SceneRes(pub SceneState);

/// Current animation frame, looping over the keyed range
#[derive(Resource)]
pub struct Playback {
    pub frame: f64,
    pub end: f64,
    pub frames_per_second: f64,
}

impl Playback {
    pub fn new(end: f64) -> Self {
        Self {
            frame: 0.0,
            end,
            frames_per_second: playback::FRAMES_PER_SECOND,
        }
    }

    /// Move on by `seconds` of wall time, wrapping at the end
    pub fn advance(&mut self, seconds: f64) {
        if self.end <= 0.0 {
            return;
        }
        self.frame += seconds * self.frames_per_second;
        if self.frame > self.end {
            self.frame %= self.end;
        }
    }
}

/// One render material per scene material
#[derive(Resource, Default)]
pub struct MaterialHandles(pub HashMap<String, Handle<StandardMaterial>>);
