//! In-process scene model
//!
//! The host backend keeps the whole scene here: shapes, materials and the
//! keyframe tracks the viewer plays back.

pub mod import;
pub mod model;
pub mod rotation;
pub mod track;

pub use import::import_gltf;
pub use model::{ColorChannel, Material, Pose, SceneObject, SceneState, Shape, ShapeKind};
pub use track::{Keyframe, Lerp, Track};

use thiserror::Error;

/// Failures while changing the scene model
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("{0} is already in use.")]
    NameClash(String),
    #[error("failed to import asset: {0}")]
    Import(#[from] gltf::Error),
}
