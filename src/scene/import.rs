//! glTF import
//!
//! Brings the node hierarchy of a glTF file into the scene under one group.
//! Geometry stays in the file; objects only point at it by mesh index.

use std::collections::BTreeSet;
use std::path::Path;

use super::model::{Pose, SceneObject, SceneState, Shape};
use super::rotation::euler_from_quat;
use super::SceneError;

/// glTF is Y-up, the scene is Z-up
const Y_UP_TO_Z_UP: [f64; 3] = [std::f64::consts::FRAC_PI_2, 0.0, 0.0];

/// Import the default scene of `path` as group `reference` placed at `offset`.
///
/// Nothing is added when any resulting name is already taken.
/// Returns the names of the created objects, the group first.
pub fn import_gltf(
    scene: &mut SceneState,
    path: &Path,
    reference: &str,
    offset: [f64; 3],
) -> Result<Vec<String>, SceneError> {
    let gltf = gltf::Gltf::open(path)?;

    let mut group = SceneObject::new(Shape::Group);
    group.rest = Pose {
        location: offset,
        rotation: Y_UP_TO_Z_UP,
        ..Pose::default()
    };
    let mut planned = vec![(reference.to_string(), group)];

    if let Some(root) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
        for node in root.nodes() {
            plan_node(&node, reference, path, &mut planned);
        }
    }

    let mut seen = BTreeSet::new();
    for (name, _) in &planned {
        if scene.objects.contains_key(name) || !seen.insert(name.as_str()) {
            return Err(SceneError::NameClash(name.clone()));
        }
    }

    let names = planned.iter().map(|(name, _)| name.clone()).collect();
    scene.objects.extend(planned);
    Ok(names)
}

fn plan_node(
    node: &gltf::Node,
    parent: &str,
    source: &Path,
    out: &mut Vec<(String, SceneObject)>,
) {
    let name = match node.name() {
        Some(name) => name.to_string(),
        None => format!("{}.node{}", parent, node.index()),
    };

    let shape = match node.mesh() {
        Some(mesh) => Shape::Mesh {
            source: source.to_path_buf(),
            mesh: mesh.index(),
        },
        None => Shape::Group,
    };

    let (translation, rotation, scale) = node.transform().decomposed();
    let mut object = SceneObject::new(shape);
    object.parent = Some(parent.to_string());
    object.rest = Pose {
        location: translation.map(f64::from),
        scale: scale.map(f64::from),
        rotation: euler_from_quat(rotation.map(f64::from)),
    };
    out.push((name.clone(), object));

    for child in node.children() {
        plan_node(&child, &name, source, out);
    }
}
