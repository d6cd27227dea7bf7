//! In-process backend
//!
//! Records every call into a [`SceneState`]. On hand-off the scene is
//! optionally written out as JSON and then played back in the viewer.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::{AxisUpdate, Keying, SceneBackend, SceneQuery};
use crate::config::Config;
use crate::error::BackendError;
use crate::scene::rotation::{euler_from_matrix, matrix_from_euler, rotate_sequential};
use crate::scene::{import_gltf, ColorChannel, Material, SceneError, SceneObject, SceneState, Shape};

#[derive(Debug, Default)]
pub struct HostScene {
    scene: SceneState,
}

impl HostScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    fn object_mut(&mut self, reference: &str) -> Result<&mut SceneObject, BackendError> {
        self.scene
            .object_mut(reference)
            .ok_or_else(|| BackendError::UnknownObject(reference.to_string()))
    }

    fn material_mut(&mut self, reference: &str) -> Result<&mut Material, BackendError> {
        self.scene
            .material_mut(reference)
            .ok_or_else(|| BackendError::UnknownMaterial(reference.to_string()))
    }

    fn write_dump(&self, path: &Path) -> Result<(), BackendError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.scene)?;
        log::info!("[Host] Scene written to {}", path.display());
        Ok(())
    }
}

impl SceneQuery for HostScene {
    fn has_object(&self, reference: &str) -> bool {
        self.scene.objects.contains_key(reference)
    }

    fn has_material(&self, reference: &str) -> bool {
        self.scene.materials.contains_key(reference)
    }

    fn is_group(&self, reference: &str) -> bool {
        self.scene.object(reference).is_some_and(SceneObject::is_group)
    }
}

impl SceneBackend for HostScene {
    fn label(&self) -> &'static str {
        "host"
    }

    fn create_shape(&mut self, reference: &str, shape: Shape) -> Result<(), BackendError> {
        if self.has_object(reference) {
            return Err(SceneError::NameClash(reference.to_string()).into());
        }
        self.scene
            .objects
            .insert(reference.to_string(), SceneObject::new(shape));
        Ok(())
    }

    fn update_shape(&mut self, reference: &str, shape: Shape) -> Result<(), BackendError> {
        self.object_mut(reference)?.shape = shape;
        Ok(())
    }

    fn add_to_group(&mut self, reference: &str, group: &str) -> Result<(), BackendError> {
        if !self.is_group(group) {
            return Err(BackendError::UnknownObject(group.to_string()));
        }
        self.object_mut(reference)?.parent = Some(group.to_string());
        Ok(())
    }

    fn set_translation(
        &mut self,
        reference: &str,
        update: AxisUpdate,
        keying: Keying,
    ) -> Result<(), BackendError> {
        let object = self.object_mut(reference)?;
        let rest = object.rest.location;
        object
            .location
            .record(keying.time, rest, keying.immediate, |current| update.apply(current));
        Ok(())
    }

    fn set_scale(
        &mut self,
        reference: &str,
        update: AxisUpdate,
        keying: Keying,
    ) -> Result<(), BackendError> {
        let object = self.object_mut(reference)?;
        let rest = object.rest.scale;
        object
            .scale
            .record(keying.time, rest, keying.immediate, |current| update.apply(current));
        Ok(())
    }

    fn rotate(
        &mut self,
        reference: &str,
        euler: [f64; 3],
        keying: Keying,
    ) -> Result<(), BackendError> {
        let object = self.object_mut(reference)?;
        let rest = object.rest.rotation;
        object
            .rotation
            .record(keying.time, rest, keying.immediate, |current| {
                euler_from_matrix(&rotate_sequential(&matrix_from_euler(current), euler))
            });
        Ok(())
    }

    fn create_material(&mut self, reference: &str, color: [f64; 4]) -> Result<(), BackendError> {
        if self.has_material(reference) {
            return Err(SceneError::NameClash(reference.to_string()).into());
        }
        self.scene
            .materials
            .insert(reference.to_string(), Material::new(color));
        Ok(())
    }

    fn apply_material(&mut self, reference: &str, material: &str) -> Result<(), BackendError> {
        if !self.has_material(material) {
            return Err(BackendError::UnknownMaterial(material.to_string()));
        }
        self.object_mut(reference)?.material = Some(material.to_string());
        Ok(())
    }

    fn set_material_property(
        &mut self,
        reference: &str,
        property: &str,
        value: f64,
        keying: Keying,
    ) -> Result<(), BackendError> {
        let material = self.material_mut(reference)?;
        // an unkeyed property has no earlier value worth holding
        material
            .properties
            .entry(property.to_string())
            .or_default()
            .record(keying.time, value, keying.immediate, |_| value);
        Ok(())
    }

    fn set_color(
        &mut self,
        reference: &str,
        channel: ColorChannel,
        color: [f64; 4],
        keying: Keying,
    ) -> Result<(), BackendError> {
        let material = self.material_mut(reference)?;
        let base = material.base_color;
        material
            .channel_mut(channel)
            .record(keying.time, base, keying.immediate, |_| color);
        Ok(())
    }

    fn load_object(
        &mut self,
        reference: &str,
        path: &Path,
        offset: [f64; 3],
    ) -> Result<(), BackendError> {
        let created = import_gltf(&mut self.scene, path, reference, offset)?;
        log::info!(
            "[Host] Imported {} object(s) from {} as {}",
            created.len(),
            path.display(),
            reference
        );
        Ok(())
    }

    fn hand_off(self, config: &Config) -> Result<(), BackendError> {
        log::info!(
            "[Host] Animation finished: {} object(s), {} material(s), last key at frame {}",
            self.scene.objects.len(),
            self.scene.materials.len(),
            self.scene.end_time()
        );

        if let Some(path) = &config.dump {
            self.write_dump(path)?;
        }

        if !config.viewer {
            log::info!("[Host] Viewer disabled, exiting");
            return Ok(());
        }

        let exit = crate::viewer::run(self.scene);
        if exit.is_error() {
            return Err(BackendError::Viewer(format!("{:?}", exit)));
        }
        Ok(())
    }
}
