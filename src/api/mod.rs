//! Remote command surface
//!
//! - `params`: call parameters and their value variants
//! - `command`: the command catalog with declared parameters
//! - `validation`: parameter predicates
//! - `outcome`: accepted / rejected results and backend failures
//! - `facade`: validation plus dispatch to a backend

pub mod command;
pub mod facade;
pub mod outcome;
pub mod params;
pub mod validation;

pub use command::{Command, ParamSpec};
pub use facade::SceneFacade;
pub use outcome::{CommandError, Outcome};
pub use params::{ParamKind, ParamValue, Params};
pub use validation::{validate, Check};

#[cfg(test)]
mod tests;
