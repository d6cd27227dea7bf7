//! Scene setup system
//!
//! Spawns the camera, lights and one entity per scene object. Objects are
//! spawned parents first so every child can point at its parent entity.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use bevy::{
    core_pipeline::tonemapping::Tonemapping,
    gltf::GltfAssetLabel,
    math::{
        primitives::{Cone, Cuboid, Cylinder, Sphere},
        DVec3, Quat, Vec3,
    },
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
};

use crate::scene::Shape;
use crate::viewer::components::{AnimatedObject, CameraController, SceneRoot};
use crate::viewer::resources::{MaterialHandles, SceneRes};

/// Thickness of the box drawn for a plane
const PLANE_THICKNESS: f32 = 0.001;

/// Color of objects without a material
const DEFAULT_COLOR: Color = Color::srgb(0.7, 0.7, 0.7);

fn as_vec3(v: [f64; 3]) -> Vec3 {
    DVec3::from_array(v).as_vec3()
}

/// Rotation taking the primitive's Y axis onto `axis`
fn axis_rotation(axis: [f64; 3]) -> Quat {
    let dir = as_vec3(axis).try_normalize().unwrap_or(Vec3::Z);
    Quat::from_rotation_arc(Vec3::Y, dir)
}

/// Placement of a shape's mesh relative to its object
pub fn shape_transform(shape: &Shape) -> Transform {
    match *shape {
        Shape::Box { height, axis, .. } | Shape::Cylinder { height, axis, .. } => {
            let rotation = axis_rotation(axis);
            Transform::from_rotation(rotation)
                .with_translation(rotation * Vec3::Y * (height as f32 / 2.0))
        }
        Shape::Cone { axis, .. } => Transform::from_rotation(axis_rotation(axis)),
        _ => Transform::IDENTITY,
    }
}

/// Mesh handle for a shape, `None` for groups
fn shape_mesh(
    shape: &Shape,
    meshes: &mut Assets<Mesh>,
    asset_server: &AssetServer,
) -> Option<Handle<Mesh>> {
    let handle = match shape {
        Shape::Box {
            width,
            length,
            height,
            ..
        } => meshes.add(Cuboid::new(*width as f32, *height as f32, *length as f32)),
        Shape::Cone { radius, height, .. } => meshes.add(Cone {
            radius: *radius as f32,
            height: *height as f32,
        }),
        Shape::Sphere { radius } => meshes.add(Sphere::new(*radius as f32)),
        Shape::Cylinder { radius, height, .. } => {
            meshes.add(Cylinder::new(*radius as f32, *height as f32))
        }
        Shape::Plane { width, length } => {
            meshes.add(Cuboid::new(*width as f32, *length as f32, PLANE_THICKNESS))
        }
        Shape::Mesh { source, mesh } => asset_server.load(
            GltfAssetLabel::Primitive {
                mesh: *mesh,
                primitive: 0,
            }
            .from_asset(source.clone()),
        ),
        Shape::Group => return None,
    };
    Some(handle)
}

/// Build the viewer scene from the finished animation
pub fn setup_scene(
    mut commands: Commands,
    scene: Res<SceneRes>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    log::info!("[Viewer] Setting up scene...");
    let scene = &scene.0;

    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.05, 0.08, 0.12)),
            ..default()
        },
        Tonemapping::None,
        Transform::from_xyz(0.0, 5.0, 15.0).looking_at(Vec3::ZERO, Vec3::Y),
        CameraController,
    ));

    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            shadows_enabled: true,
            color: Color::srgb(1.0, 0.95, 0.85),
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 3000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(bevy::math::EulerRot::XYZ, -0.6, 0.4, 0.0)),
    ));

    let mut handles = MaterialHandles::default();
    for name in scene.materials.keys() {
        handles
            .0
            .insert(name.clone(), materials.add(StandardMaterial::default()));
    }
    let fallback = materials.add(StandardMaterial {
        base_color: DEFAULT_COLOR,
        ..default()
    });

    // scene coordinates are Z-up
    let root = commands
        .spawn((
            Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
            Visibility::default(),
            SceneRoot,
        ))
        .id();

    let mut entities: HashMap<&str, Entity> = HashMap::new();
    for (name, object) in scene.objects_parent_first() {
        let parent = object
            .parent
            .as_deref()
            .and_then(|p| entities.get(p).copied())
            .unwrap_or(root);

        let entity = commands
            .spawn((
                Transform::default(),
                Visibility::default(),
                AnimatedObject(name.clone()),
                ChildOf(parent),
            ))
            .id();
        entities.insert(name.as_str(), entity);

        let Some(mesh) = shape_mesh(&object.shape, &mut meshes, &asset_server) else {
            continue;
        };
        let material = object
            .material
            .as_ref()
            .and_then(|m| handles.0.get(m).cloned())
            .unwrap_or_else(|| fallback.clone());
        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            shape_transform(&object.shape),
            ChildOf(entity),
        ));
    }

    log::info!(
        "[Viewer] Spawned {} object(s), {} material(s)",
        entities.len(),
        handles.0.len()
    );
    commands.insert_resource(handles);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_box_extends_along_axis() {
        let shape = Shape::Box {
            width: 1.0,
            length: 1.0,
            height: 4.0,
            axis: [0.0, 0.0, 1.0],
        };
        let transform = shape_transform(&shape);
        assert!(close(transform.translation, Vec3::new(0.0, 0.0, 2.0)));
        assert!(close(transform.rotation * Vec3::Y, Vec3::Z));
    }

    #[test]
    fn test_cone_is_centered() {
        let shape = Shape::Cone {
            radius: 0.5,
            height: 5.0,
            axis: [1.0, 0.0, 0.0],
        };
        let transform = shape_transform(&shape);
        assert!(close(transform.translation, Vec3::ZERO));
        assert!(close(transform.rotation * Vec3::Y, Vec3::X));
    }

    #[test]
    fn test_degenerate_axis_points_up() {
        let shape = Shape::Cylinder {
            radius: 0.5,
            height: 2.0,
            axis: [0.0, 0.0, 0.0],
        };
        let transform = shape_transform(&shape);
        assert!(close(transform.translation, Vec3::new(0.0, 0.0, 1.0)));
        assert_eq!(shape_transform(&Shape::Sphere { radius: 1.0 }), Transform::IDENTITY);
    }
}
