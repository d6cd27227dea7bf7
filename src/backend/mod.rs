//! Scene backends
//!
//! A backend owns the scene and carries out validated calls. The host backend
//! keeps an in-process model and shows it in the viewer; the native backend
//! forwards every call to a `proc3d_*` animation library.

pub mod host;
pub mod native;

pub use host::HostScene;
pub use native::{NativeBackend, NativeTime};

use std::path::Path;

use crate::config::Config;
use crate::error::BackendError;
use crate::scene::{ColorChannel, Shape};

/// Name lookups used by validation
pub trait SceneQuery {
    fn has_object(&self, reference: &str) -> bool;
    fn has_material(&self, reference: &str) -> bool;
    /// `false` for unknown names
    fn is_group(&self, reference: &str) -> bool;
}

/// Per-axis values of a `move_to` or `scale`; absent axes keep their value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl AxisUpdate {
    pub fn apply(self, current: [f64; 3]) -> [f64; 3] {
        [
            self.x.unwrap_or(current[0]),
            self.y.unwrap_or(current[1]),
            self.z.unwrap_or(current[2]),
        ]
    }
}

/// Keyframe placement shared by the animated calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keying {
    /// Target time in frames
    pub time: f64,
    /// Also key the previous value one frame earlier
    pub immediate: bool,
}

/// Executes validated scene calls
pub trait SceneBackend: SceneQuery {
    /// Short name for logs
    fn label(&self) -> &'static str;

    fn create_shape(&mut self, reference: &str, shape: Shape) -> Result<(), BackendError>;

    fn update_shape(&mut self, reference: &str, shape: Shape) -> Result<(), BackendError>;

    fn add_to_group(&mut self, reference: &str, group: &str) -> Result<(), BackendError>;

    fn set_translation(
        &mut self,
        reference: &str,
        update: AxisUpdate,
        keying: Keying,
    ) -> Result<(), BackendError>;

    fn set_scale(
        &mut self,
        reference: &str,
        update: AxisUpdate,
        keying: Keying,
    ) -> Result<(), BackendError>;

    /// Apply XYZ Euler angles on top of the current orientation
    fn rotate(&mut self, reference: &str, euler: [f64; 3], keying: Keying)
        -> Result<(), BackendError>;

    fn create_material(&mut self, reference: &str, color: [f64; 4]) -> Result<(), BackendError>;

    fn apply_material(&mut self, reference: &str, material: &str) -> Result<(), BackendError>;

    fn set_material_property(
        &mut self,
        reference: &str,
        property: &str,
        value: f64,
        keying: Keying,
    ) -> Result<(), BackendError>;

    fn set_color(
        &mut self,
        reference: &str,
        channel: ColorChannel,
        color: [f64; 4],
        keying: Keying,
    ) -> Result<(), BackendError>;

    /// Import an external asset as object `reference`
    fn load_object(
        &mut self,
        reference: &str,
        path: &Path,
        offset: [f64; 3],
    ) -> Result<(), BackendError>;

    /// Pass the finished animation on for display; runs once, after `stop`
    fn hand_off(self, config: &Config) -> Result<(), BackendError>
    where
        Self: Sized;
}
