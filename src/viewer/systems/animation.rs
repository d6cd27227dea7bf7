//! Animation systems
//!
//! Plays the recorded tracks back: objects take their pose at the current
//! frame and materials their diffuse color and scalar properties.

use bevy::{
    math::{DQuat, DVec3},
    pbr::StandardMaterial,
    prelude::*,
    time::Time,
};

use crate::scene::rotation::matrix_from_euler;
use crate::scene::{ColorChannel, Material, Pose};
use crate::viewer::components::AnimatedObject;
use crate::viewer::resources::{MaterialHandles, Playback, SceneRes};

/// Render transform of a scene pose
pub fn pose_transform(pose: &Pose) -> Transform {
    Transform {
        translation: DVec3::from_array(pose.location).as_vec3(),
        rotation: DQuat::from_mat3(&matrix_from_euler(pose.rotation)).as_quat(),
        scale: DVec3::from_array(pose.scale).as_vec3(),
    }
}

/// Copy the state of `material` at `frame` onto a render material
pub fn apply_material_state(material: &Material, frame: f64, target: &mut StandardMaterial) {
    let [r, g, b, _] = material.color_at(ColorChannel::Diffuse, frame);
    let alpha = material
        .property_at("alpha", frame)
        .unwrap_or(material.base_color[3]);
    target.base_color = Color::srgba(r as f32, g as f32, b as f32, alpha as f32);
    target.alpha_mode = if alpha < 1.0 {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    };
    if let Some(roughness) = material.property_at("roughness", frame) {
        target.perceptual_roughness = roughness as f32;
    }
    if let Some(metallic) = material.property_at("metallic", frame) {
        target.metallic = metallic as f32;
    }
}

pub fn advance_playback(time: Res<Time>, mut playback: ResMut<Playback>) {
    playback.advance(time.delta_secs_f64());
}

/// Move every object to its pose at the current frame
pub fn apply_object_poses(
    scene: Res<SceneRes>,
    playback: Res<Playback>,
    mut query: Query<(&AnimatedObject, &mut Transform)>,
) {
    for (object, mut transform) in query.iter_mut() {
        if let Some(state) = scene.0.object(&object.0) {
            *transform = pose_transform(&state.pose_at(playback.frame));
        }
    }
}

pub fn apply_material_colors(
    scene: Res<SceneRes>,
    playback: Res<Playback>,
    handles: Option<Res<MaterialHandles>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(handles) = handles else {
        return;
    };
    for (name, handle) in handles.0.iter() {
        let (Some(material), Some(target)) = (scene.0.material(name), materials.get_mut(handle))
        else {
            continue;
        };
        apply_material_state(material, playback.frame, target);
    }
}
