//! Preview viewer for the host backend
//!
//! Plays the finished scene in a window once the simulation has stopped.
//!
//! - `components`: ECS components
//! - `resources`: global resources
//! - `systems`: setup, camera and playback systems
//! - `app`: application setup

pub mod app;
pub mod components;
pub mod resources;
pub mod systems;

pub use app::run;
