//! Error types
//!
//! Rejected calls are not errors; see `api::Outcome`. What lives here is the
//! failure of a backend while carrying out a validated call, and the failures
//! that stop the process before it starts serving.

use std::path::PathBuf;
use thiserror::Error;

use crate::scene::SceneError;

/// A backend could not carry out a validated call
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{0} undefined")]
    UnknownObject(String),
    #[error("material {0} undefined")]
    UnknownMaterial(String),
    #[error("missing parameter {0}")]
    MissingParameter(&'static str),
    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),
    #[error("identifier contains a NUL byte: {0}")]
    InvalidName(#[from] std::ffi::NulError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize scene: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("viewer exited with an error: {0}")]
    Viewer(String),
}

/// The process cannot start serving
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("invalid value {value:?} for {name}")]
    InvalidConfig { name: &'static str, value: String },
    #[error("the native backend is not supported on {0}")]
    UnsupportedPlatform(&'static str),
    #[error("failed to load {path}: {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("missing symbol {symbol}: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
    #[error("{0} returned a null context")]
    NullContext(&'static str),
    #[error("bus setup failed: {0}")]
    Bus(#[from] zbus::Error),
    #[error("cannot open replay script {path}: {source}")]
    Replay {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
