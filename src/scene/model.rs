//! Scene model
//!
//! Objects and materials keyed by their reference strings. Every animated
//! property is a [`Track`] on top of a rest value, so the model can answer
//! "what does the scene look like at time t" for the viewer and for tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use super::track::Track;

// =============================================================================
// Shapes
// =============================================================================

/// Geometry attached to a scene object.
///
/// `axis` is the direction the shape's height runs along; boxes and cylinders
/// extend from the object origin towards it, cones are centered on the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Box {
        width: f64,
        length: f64,
        height: f64,
        axis: [f64; 3],
    },
    Cone {
        radius: f64,
        height: f64,
        axis: [f64; 3],
    },
    Sphere {
        radius: f64,
    },
    Cylinder {
        radius: f64,
        height: f64,
        axis: [f64; 3],
    },
    Plane {
        width: f64,
        length: f64,
    },
    /// Mesh `mesh` of an imported glTF file
    Mesh { source: PathBuf, mesh: usize },
    /// Transform-only node that other objects can be parented to
    Group,
}

/// Primitive names accepted by `make_shape` / `update_shape`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Cone,
    Sphere,
    Cylinder,
    Plane,
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "box" => Ok(Self::Box),
            "cone" => Ok(Self::Cone),
            "sphere" => Ok(Self::Sphere),
            "cylinder" => Ok(Self::Cylinder),
            "plane" => Ok(Self::Plane),
            other => Err(format!("shape {} not implemented", other)),
        }
    }
}

impl ShapeKind {
    /// Fit a primitive of this kind into the given extents
    pub fn fit(self, length: f64, width: f64, height: f64, axis: [f64; 3]) -> Shape {
        match self {
            Self::Box => Shape::Box {
                width,
                length,
                height,
                axis,
            },
            Self::Cone => Shape::Cone {
                radius: length.max(width) / 2.0,
                height,
                axis,
            },
            Self::Sphere => Shape::Sphere {
                radius: length.max(width).max(height) / 2.0,
            },
            Self::Cylinder => Shape::Cylinder {
                radius: length.max(width) / 2.0,
                height,
                axis,
            },
            Self::Plane => Shape::Plane { width, length },
        }
    }
}

// =============================================================================
// Objects
// =============================================================================

/// Unanimated transform of an object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub location: [f64; 3],
    pub scale: [f64; 3],
    /// XYZ Euler angles in radians
    pub rotation: [f64; 3],
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            scale: [1.0; 3],
            rotation: [0.0; 3],
        }
    }
}

/// A named node of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub shape: Shape,
    pub parent: Option<String>,
    pub material: Option<String>,
    pub rest: Pose,
    pub location: Track<[f64; 3]>,
    pub scale: Track<[f64; 3]>,
    pub rotation: Track<[f64; 3]>,
}

impl SceneObject {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            parent: None,
            material: None,
            rest: Pose::default(),
            location: Track::default(),
            scale: Track::default(),
            rotation: Track::default(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.shape, Shape::Group)
    }

    /// Evaluated transform at `time`
    pub fn pose_at(&self, time: f64) -> Pose {
        Pose {
            location: self.location.sample(time).unwrap_or(self.rest.location),
            scale: self.scale.sample(time).unwrap_or(self.rest.scale),
            rotation: self.rotation.sample(time).unwrap_or(self.rest.rotation),
        }
    }

    fn end_time(&self) -> Option<f64> {
        [
            self.location.end_time(),
            self.scale.end_time(),
            self.rotation.end_time(),
        ]
        .into_iter()
        .flatten()
        .reduce(f64::max)
    }
}

// =============================================================================
// Materials
// =============================================================================

/// Which of the three material colors a call addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorChannel {
    Ambient,
    Diffuse,
    Specular,
}

impl ColorChannel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Diffuse => "diffuse",
            Self::Specular => "specular",
        }
    }
}

/// A named surface description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Color given at creation, used by channels without keys
    pub base_color: [f64; 4],
    pub ambient: Track<[f64; 4]>,
    pub diffuse: Track<[f64; 4]>,
    pub specular: Track<[f64; 4]>,
    pub properties: BTreeMap<String, Track<f64>>,
}

impl Material {
    pub fn new(base_color: [f64; 4]) -> Self {
        Self {
            base_color,
            ambient: Track::default(),
            diffuse: Track::default(),
            specular: Track::default(),
            properties: BTreeMap::new(),
        }
    }

    pub fn channel(&self, channel: ColorChannel) -> &Track<[f64; 4]> {
        match channel {
            ColorChannel::Ambient => &self.ambient,
            ColorChannel::Diffuse => &self.diffuse,
            ColorChannel::Specular => &self.specular,
        }
    }

    pub fn channel_mut(&mut self, channel: ColorChannel) -> &mut Track<[f64; 4]> {
        match channel {
            ColorChannel::Ambient => &mut self.ambient,
            ColorChannel::Diffuse => &mut self.diffuse,
            ColorChannel::Specular => &mut self.specular,
        }
    }

    pub fn color_at(&self, channel: ColorChannel, time: f64) -> [f64; 4] {
        self.channel(channel).sample(time).unwrap_or(self.base_color)
    }

    pub fn property_at(&self, name: &str, time: f64) -> Option<f64> {
        self.properties.get(name).and_then(|t| t.sample(time))
    }

    fn end_time(&self) -> Option<f64> {
        [
            self.ambient.end_time(),
            self.diffuse.end_time(),
            self.specular.end_time(),
        ]
        .into_iter()
        .chain(self.properties.values().map(Track::end_time))
        .flatten()
        .reduce(f64::max)
    }
}

// =============================================================================
// Scene
// =============================================================================

/// Everything the command surface has built so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    pub objects: BTreeMap<String, SceneObject>,
    pub materials: BTreeMap<String, Material>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, reference: &str) -> Option<&SceneObject> {
        self.objects.get(reference)
    }

    pub fn object_mut(&mut self, reference: &str) -> Option<&mut SceneObject> {
        self.objects.get_mut(reference)
    }

    pub fn material(&self, reference: &str) -> Option<&Material> {
        self.materials.get(reference)
    }

    pub fn material_mut(&mut self, reference: &str) -> Option<&mut Material> {
        self.materials.get_mut(reference)
    }

    /// Last keyed time across every track, 0 for a static scene
    pub fn end_time(&self) -> f64 {
        self.objects
            .values()
            .filter_map(SceneObject::end_time)
            .chain(self.materials.values().filter_map(Material::end_time))
            .fold(0.0, f64::max)
    }

    /// Objects ordered so that every parent comes before its children
    pub fn objects_parent_first(&self) -> Vec<(&String, &SceneObject)> {
        let mut ordered: Vec<(&String, &SceneObject)> = Vec::with_capacity(self.objects.len());
        let mut placed = std::collections::BTreeSet::new();
        let mut remaining: Vec<_> = self.objects.iter().collect();

        while !remaining.is_empty() {
            let before = remaining.len();
            remaining.retain(|(name, object)| {
                let ready = match &object.parent {
                    Some(parent) => placed.contains(parent) || !self.objects.contains_key(parent),
                    None => true,
                };
                if ready {
                    placed.insert(*name);
                    ordered.push((*name, *object));
                }
                !ready
            });
            if remaining.len() == before {
                // parent cycle; emit the rest unparented rather than loop forever
                ordered.extend(remaining.drain(..));
            }
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_parsing() {
        assert_eq!("cone".parse::<ShapeKind>(), Ok(ShapeKind::Cone));
        assert_eq!(
            "torus".parse::<ShapeKind>(),
            Err("shape torus not implemented".to_string())
        );
    }

    #[test]
    fn test_fit_uses_extents() {
        let shape = ShapeKind::Cylinder.fit(2.0, 4.0, 3.0, [0.0, 0.0, 1.0]);
        assert_eq!(
            shape,
            Shape::Cylinder {
                radius: 2.0,
                height: 3.0,
                axis: [0.0, 0.0, 1.0]
            }
        );
    }

    #[test]
    fn test_pose_falls_back_to_rest() {
        let mut object = SceneObject::new(Shape::Sphere { radius: 1.0 });
        object.location.insert(2.0, [1.0, 2.0, 3.0]);

        let pose = object.pose_at(0.0);
        assert_eq!(pose.location, [1.0, 2.0, 3.0]);
        assert_eq!(pose.scale, [1.0; 3]);
        assert_eq!(pose.rotation, [0.0; 3]);
    }

    #[test]
    fn test_material_channels_default_to_base_color() {
        let mut material = Material::new([0.1, 0.2, 0.3, 1.0]);
        material.diffuse.insert(4.0, [1.0, 0.0, 0.0, 1.0]);

        assert_eq!(material.color_at(ColorChannel::Ambient, 4.0), [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(material.color_at(ColorChannel::Diffuse, 4.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(material.property_at("roughness", 4.0), None);
    }

    #[test]
    fn test_end_time_spans_objects_and_materials() {
        let mut scene = SceneState::new();
        let mut object = SceneObject::new(Shape::Group);
        object.scale.insert(12.0, [2.0; 3]);
        scene.objects.insert("g".into(), object);

        let mut material = Material::new([1.0; 4]);
        material
            .properties
            .entry("alpha".into())
            .or_default()
            .insert(30.0, 0.5);
        scene.materials.insert("m".into(), material);

        assert_eq!(scene.end_time(), 30.0);
        assert_eq!(SceneState::new().end_time(), 0.0);
    }

    #[test]
    fn test_parent_first_ordering() {
        let mut scene = SceneState::new();
        let mut child = SceneObject::new(Shape::Sphere { radius: 1.0 });
        child.parent = Some("b_group".into());
        scene.objects.insert("a_child".into(), child);
        scene.objects.insert("b_group".into(), SceneObject::new(Shape::Group));

        let names: Vec<&str> = scene
            .objects_parent_first()
            .into_iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["b_group", "a_child"]);
    }
}
