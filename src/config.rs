//! Configuration constants and runtime settings
//!
//! Constants cover the bus identity, command defaults and viewer tuning.
//! [`Config`] is read once at startup from `SCENEBUS_*` environment variables.

use std::path::PathBuf;

use crate::error::StartupError;

/// Process exit code when startup fails
pub const EXIT_STARTUP_FAILURE: i32 = 1;

/// D-Bus identity of the server
pub mod bus {
    /// Well-known name requested on the session bus
    pub const NAME: &str = "de.tuberlin.uebb.modelica3d.server";

    pub const OBJECT_PATH: &str = "/de/tuberlin/uebb/modelica3d/server";

    /// Interface name; fixed at compile time by the interface declaration
    pub const INTERFACE: &str = "de.tuberlin.uebb.modelica3d.api";
}

/// Values used when a call omits an optional parameter
pub mod defaults {
    /// Keyframe time of animated calls without `frame` or `time`
    pub const FRAME: i64 = 1;

    pub const EXTENT: f64 = 1.0;

    /// Direction shapes extend along
    pub const AXIS: [f64; 3] = [0.0, 0.0, 1.0];

    pub const CONE_HEIGHT: f64 = 5.0;

    pub const CYLINDER_HEIGHT: f64 = 10.0;

    pub const MATERIAL_COLOR: [f64; 4] = [0.8, 0.8, 0.8, 1.0];

    /// `set_*_color` channels; alpha defaults to 0
    pub const COLOR_CHANNEL: f64 = 0.5;
    pub const COLOR_ALPHA: f64 = 0.0;

    /// Transforms key only the target time unless asked otherwise
    pub const TRANSFORM_IMMEDIATE: bool = false;

    /// Material changes hold their previous value by default
    pub const MATERIAL_IMMEDIATE: bool = true;
}

/// Viewer camera controls
pub mod camera {
    /// Rotation speed multiplier for mouse drag
    pub const ROTATION_SPEED: f32 = 0.005;

    /// Zoom speed multiplier for scroll wheel
    pub const ZOOM_SPEED: f32 = 0.5;

    pub const MIN_DISTANCE: f32 = 2.0;

    pub const MAX_DISTANCE: f32 = 200.0;

    pub const START_DISTANCE: f32 = 15.0;

    /// Pitch limits (radians) to prevent camera flipping
    pub const MAX_PITCH: f32 = 1.5;
    pub const MIN_PITCH: f32 = -1.5;
}

/// Viewer playback
pub mod playback {
    /// Animation frames advanced per second of wall time
    pub const FRAMES_PER_SECOND: f64 = 25.0;

    pub const WINDOW_TITLE: &str = "scenebus";
}

/// Which backend carries out scene calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Host,
    Native,
}

/// Context allocation symbols of the native library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextSymbols {
    /// `proc3d_animation_context_new` / `proc3d_animation_context_free`
    #[default]
    Proc3d,
    /// `osg_gtk_alloc_context` / `osg_gtk_free_context`
    OsgGtk,
}

impl ContextSymbols {
    pub fn alloc(self) -> &'static str {
        match self {
            Self::Proc3d => "proc3d_animation_context_new",
            Self::OsgGtk => "osg_gtk_alloc_context",
        }
    }

    pub fn free(self) -> &'static str {
        match self {
            Self::Proc3d => "proc3d_animation_context_free",
            Self::OsgGtk => "osg_gtk_free_context",
        }
    }

    /// Library file name searched on the loader path
    fn library_name(self) -> &'static str {
        match (self, cfg!(windows)) {
            (Self::Proc3d, false) => "libproc3d.so",
            (Self::OsgGtk, false) => "libm3d-osg-gtk.so",
            (Self::Proc3d, true) => "proc3d.dll",
            (Self::OsgGtk, true) => "m3d-osg-gtk.dll",
        }
    }
}

/// How the native library takes keyframe times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeAbi {
    /// `unsigned int` frame numbers
    Frame,
    /// `double` times
    #[default]
    Time,
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: BackendKind,
    /// Explicit path of the native library
    pub library: Option<PathBuf>,
    /// Installation root of the native library (`PROC3D_HOME`)
    pub install_root: Option<PathBuf>,
    pub context: ContextSymbols,
    pub time_abi: TimeAbi,
    pub bus_name: String,
    pub object_path: String,
    /// JSON-lines script served instead of the bus
    pub replay: Option<PathBuf>,
    /// Where the host backend writes its final scene
    pub dump: Option<PathBuf>,
    pub viewer: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            library: None,
            install_root: None,
            context: ContextSymbols::default(),
            time_abi: TimeAbi::default(),
            bus_name: bus::NAME.to_string(),
            object_path: bus::OBJECT_PATH.to_string(),
            replay: None,
            dump: None,
            viewer: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StartupError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("SCENEBUS_BACKEND") {
            config.backend = match value.as_str() {
                "host" => BackendKind::Host,
                "native" => BackendKind::Native,
                _ => return Err(invalid("SCENEBUS_BACKEND", value)),
            };
        }
        if let Some(value) = get("SCENEBUS_CONTEXT") {
            config.context = match value.as_str() {
                "proc3d" => ContextSymbols::Proc3d,
                "osg-gtk" => ContextSymbols::OsgGtk,
                _ => return Err(invalid("SCENEBUS_CONTEXT", value)),
            };
        }
        if let Some(value) = get("SCENEBUS_TIME_ABI") {
            config.time_abi = match value.as_str() {
                "frame" => TimeAbi::Frame,
                "time" => TimeAbi::Time,
                _ => return Err(invalid("SCENEBUS_TIME_ABI", value)),
            };
        }
        if let Some(value) = get("SCENEBUS_VIEWER") {
            config.viewer = match value.as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => return Err(invalid("SCENEBUS_VIEWER", value)),
            };
        }

        config.library = get("SCENEBUS_LIBRARY").map(PathBuf::from);
        config.install_root = get("PROC3D_HOME").map(PathBuf::from);
        config.replay = get("SCENEBUS_REPLAY").map(PathBuf::from);
        config.dump = get("SCENEBUS_DUMP").map(PathBuf::from);
        if let Some(name) = get("SCENEBUS_BUS_NAME") {
            config.bus_name = name;
        }
        if let Some(path) = get("SCENEBUS_OBJECT_PATH") {
            config.object_path = path;
        }

        Ok(config)
    }

    /// Location of the native library for this platform.
    ///
    /// Windows needs the installation root even with an explicit library
    /// path; Linux falls back to the loader search path.
    pub fn native_library(&self) -> Result<PathBuf, StartupError> {
        if cfg!(windows) {
            let root = self
                .install_root
                .as_ref()
                .ok_or(StartupError::MissingEnv("PROC3D_HOME"))?;
            return Ok(self
                .library
                .clone()
                .unwrap_or_else(|| root.join("bin").join(self.context.library_name())));
        }
        if cfg!(target_os = "linux") {
            return Ok(self
                .library
                .clone()
                .unwrap_or_else(|| PathBuf::from(self.context.library_name())));
        }
        Err(StartupError::UnsupportedPlatform(std::env::consts::OS))
    }
}

fn invalid(name: &'static str, value: String) -> StartupError {
    StartupError::InvalidConfig { name, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bus_name, "de.tuberlin.uebb.modelica3d.server");
        assert_eq!(config.object_path, "/de/tuberlin/uebb/modelica3d/server");
        assert_eq!(config.time_abi, TimeAbi::Time);
        assert!(config.viewer);
    }

    #[test]
    fn test_reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SCENEBUS_BACKEND", "native"),
            ("SCENEBUS_CONTEXT", "osg-gtk"),
            ("SCENEBUS_TIME_ABI", "frame"),
            ("SCENEBUS_VIEWER", "0"),
            ("SCENEBUS_DUMP", "/tmp/scene.json"),
            ("SCENEBUS_BUS_NAME", "org.example.Scene"),
            ("SCENEBUS_REPLAY", ""),
        ]))
        .unwrap();

        assert_eq!(config.backend, BackendKind::Native);
        assert_eq!(config.context.alloc(), "osg_gtk_alloc_context");
        assert_eq!(config.context.free(), "osg_gtk_free_context");
        assert_eq!(config.time_abi, TimeAbi::Frame);
        assert!(!config.viewer);
        assert_eq!(config.dump, Some(PathBuf::from("/tmp/scene.json")));
        assert_eq!(config.bus_name, "org.example.Scene");
        assert_eq!(config.replay, None);
    }

    #[test]
    fn test_rejects_unknown_values() {
        let err = Config::from_lookup(lookup(&[("SCENEBUS_BACKEND", "blender")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value \"blender\" for SCENEBUS_BACKEND");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_native_library_on_linux() {
        let config = Config::default();
        assert_eq!(config.native_library().unwrap(), PathBuf::from("libproc3d.so"));

        let config = Config {
            library: Some(PathBuf::from("/opt/m3d/libproc3d.so")),
            ..Config::default()
        };
        assert_eq!(
            config.native_library().unwrap(),
            PathBuf::from("/opt/m3d/libproc3d.so")
        );
    }
}
