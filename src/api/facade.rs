//! Command dispatch
//!
//! [`SceneFacade`] validates a call against the catalog and, if it passes,
//! turns the parameters into a backend operation with defaults filled in.

use std::path::Path;

use super::command::Command;
use super::outcome::{CommandError, Outcome};
use super::params::Params;
use super::validation::validate;
use crate::backend::{AxisUpdate, Keying, SceneBackend};
use crate::config::defaults;
use crate::error::BackendError;
use crate::scene::rotation::{euler_from_matrix, matrix_from_rows};
use crate::scene::{ColorChannel, Shape, ShapeKind};

/// The remote command surface over one backend
pub struct SceneFacade<B> {
    backend: B,
    stopped: bool,
}

impl<B: SceneBackend> SceneFacade<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            stopped: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// `stop` has been accepted
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Validate and run one call.
    ///
    /// A failed check is an ordinary `Rejected` outcome and leaves the scene
    /// untouched. `Err` means the backend failed on a valid call.
    pub fn dispatch(&mut self, command: Command, params: &Params) -> Result<Outcome, CommandError> {
        if let Err(reason) = validate(command, params, &self.backend) {
            log::info!("[Facade] {} rejected: {}", command.name(), reason);
            return Ok(Outcome::Rejected { reason });
        }

        match self.execute(command, params) {
            Ok(outcome) => {
                log::debug!("[Facade] {} -> {:?}", command.name(), outcome);
                Ok(outcome)
            }
            Err(source) => {
                log::error!(
                    "[Facade] {} failed in {} backend: {}",
                    command.name(),
                    self.backend.label(),
                    source
                );
                Err(CommandError {
                    command: command.name(),
                    source,
                })
            }
        }
    }

    fn execute(&mut self, command: Command, params: &Params) -> Result<Outcome, BackendError> {
        match command {
            Command::Stop => {
                self.stopped = true;
                log::info!("[Facade] Stop requested");
                Ok(Outcome::accepted("stopped"))
            }
            Command::MakeBox => {
                let shape = Shape::Box {
                    length: params.number_or("length", defaults::EXTENT),
                    width: params.number_or("width", defaults::EXTENT),
                    height: params.number_or("height", defaults::EXTENT),
                    axis: axis(params, ["tx", "ty", "tz"]),
                };
                self.create(params, shape)
            }
            Command::MakeCone => {
                let shape = Shape::Cone {
                    radius: params.number_or("diameter", defaults::EXTENT) / 2.0,
                    height: params.number_or("height", defaults::CONE_HEIGHT),
                    axis: axis(params, ["x", "y", "z"]),
                };
                self.create(params, shape)
            }
            Command::MakeSphere => {
                let shape = Shape::Sphere {
                    radius: params.number_or("size", defaults::EXTENT) / 2.0,
                };
                self.create(params, shape)
            }
            Command::MakeCylinder => {
                let shape = Shape::Cylinder {
                    radius: params.number_or("diameter", defaults::EXTENT) / 2.0,
                    height: params.number_or("height", defaults::CYLINDER_HEIGHT),
                    axis: axis(params, ["x", "y", "z"]),
                };
                self.create(params, shape)
            }
            Command::MakePlane => {
                let shape = Shape::Plane {
                    length: params.number_or("length", defaults::EXTENT),
                    width: params.number_or("width", defaults::EXTENT),
                };
                self.create(params, shape)
            }
            Command::MakeShape => {
                let shape = match described_shape(params)? {
                    Ok(shape) => shape,
                    Err(reason) => return Ok(Outcome::rejected(reason)),
                };
                self.create(params, shape)
            }
            Command::UpdateShape => {
                let shape = match described_shape(params)? {
                    Ok(shape) => shape,
                    Err(reason) => return Ok(Outcome::rejected(reason)),
                };
                let reference = required(params, "reference")?;
                self.backend.update_shape(reference, shape)?;
                Ok(Outcome::accepted(reference))
            }
            Command::MakeGroup => self.create(params, Shape::Group),
            Command::AddToGroup => {
                let reference = required(params, "reference")?;
                let group = required(params, "group")?;
                self.backend.add_to_group(reference, group)?;
                Ok(Outcome::accepted(reference))
            }
            Command::MoveTo => {
                let reference = required(params, "reference")?;
                let keying = keying(params, defaults::TRANSFORM_IMMEDIATE);
                self.backend
                    .set_translation(reference, axis_update(params), keying)?;
                Ok(Outcome::accepted(reference))
            }
            Command::Scale => {
                let reference = required(params, "reference")?;
                let keying = keying(params, defaults::TRANSFORM_IMMEDIATE);
                self.backend.set_scale(reference, axis_update(params), keying)?;
                Ok(Outcome::accepted(reference))
            }
            Command::Rotate => {
                let reference = required(params, "reference")?;
                let mut rows = [[0.0; 3]; 3];
                for (i, row) in rows.iter_mut().enumerate() {
                    for (j, entry) in row.iter_mut().enumerate() {
                        let name = MATRIX_ENTRIES[i][j];
                        *entry = params
                            .number(name)
                            .ok_or(BackendError::MissingParameter(name))?;
                    }
                }
                let euler = euler_from_matrix(&matrix_from_rows(rows));
                let keying = keying(params, defaults::TRANSFORM_IMMEDIATE);
                self.backend.rotate(reference, euler, keying)?;
                Ok(Outcome::accepted(reference))
            }
            Command::MakeMaterial => {
                let reference = required(params, "reference")?;
                let [r, g, b, a] = defaults::MATERIAL_COLOR;
                let color = [
                    params.number_or("r", r),
                    params.number_or("g", g),
                    params.number_or("b", b),
                    params.number_or("a", a),
                ];
                self.backend.create_material(reference, color)?;
                Ok(Outcome::accepted(reference))
            }
            Command::ApplyMaterial => {
                let reference = required(params, "reference")?;
                let material = required(params, "material")?;
                self.backend.apply_material(reference, material)?;
                Ok(Outcome::accepted(reference))
            }
            Command::SetMaterialProperty => {
                let reference = required(params, "reference")?;
                let property = required(params, "prop")?;
                let value = params
                    .number("value")
                    .ok_or(BackendError::MissingParameter("value"))?;
                let keying = keying(params, defaults::MATERIAL_IMMEDIATE);
                self.backend
                    .set_material_property(reference, property, value, keying)?;
                Ok(Outcome::accepted(reference))
            }
            Command::SetAmbientColor => self.set_color(params, ColorChannel::Ambient),
            Command::SetDiffuseColor => self.set_color(params, ColorChannel::Diffuse),
            Command::SetSpecularColor => self.set_color(params, ColorChannel::Specular),
            Command::LoadScene => self.load(params, "filepath"),
            Command::LoadFromFile => self.load(params, "fileName"),
        }
    }

    fn create(&mut self, params: &Params, shape: Shape) -> Result<Outcome, BackendError> {
        let reference = required(params, "reference")?;
        self.backend.create_shape(reference, shape)?;
        Ok(Outcome::accepted(reference))
    }

    fn set_color(&mut self, params: &Params, channel: ColorChannel) -> Result<Outcome, BackendError> {
        let reference = required(params, "reference")?;
        let color = [
            params.number_or("r", defaults::COLOR_CHANNEL),
            params.number_or("g", defaults::COLOR_CHANNEL),
            params.number_or("b", defaults::COLOR_CHANNEL),
            params.number_or("a", defaults::COLOR_ALPHA),
        ];
        let keying = keying(params, defaults::MATERIAL_IMMEDIATE);
        self.backend.set_color(reference, channel, color, keying)?;
        Ok(Outcome::accepted(reference))
    }

    /// Import `params[path_param]`; the reference defaults to the file stem
    fn load(&mut self, params: &Params, path_param: &'static str) -> Result<Outcome, BackendError> {
        let file = required(params, path_param)?;
        let path = Path::new(file);
        let reference = match params.string("reference") {
            Some(reference) => reference.to_string(),
            None => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.to_string());
                // the declared check only covers an explicit reference
                if self.backend.has_object(&stem) {
                    return Ok(Outcome::rejected(format!("{} is already in use.", stem)));
                }
                stem
            }
        };
        let offset = [
            params.number_or("x", 0.0),
            params.number_or("y", 0.0),
            params.number_or("z", 0.0),
        ];
        self.backend.load_object(&reference, path, offset)?;
        Ok(Outcome::accepted(file))
    }
}

const MATRIX_ENTRIES: [[&str; 3]; 3] = [
    ["R_1_1", "R_1_2", "R_1_3"],
    ["R_2_1", "R_2_2", "R_2_3"],
    ["R_3_1", "R_3_2", "R_3_3"],
];

fn required<'a>(params: &'a Params, name: &'static str) -> Result<&'a str, BackendError> {
    params
        .string(name)
        .ok_or(BackendError::MissingParameter(name))
}

fn axis(params: &Params, names: [&str; 3]) -> [f64; 3] {
    let mut axis = defaults::AXIS;
    for (value, name) in axis.iter_mut().zip(names) {
        *value = params.number_or(name, *value);
    }
    axis
}

fn axis_update(params: &Params) -> AxisUpdate {
    AxisUpdate {
        x: params.number("x"),
        y: params.number("y"),
        z: params.number("z"),
    }
}

/// `time` wins over `frame`; neither means the default frame
fn keying(params: &Params, immediate: bool) -> Keying {
    let time = params
        .number("time")
        .or_else(|| params.integer("frame").map(|f| f as f64))
        .unwrap_or(defaults::FRAME as f64);
    Keying {
        time,
        immediate: params.flag_or("immediate", immediate),
    }
}

/// Shape of a `make_shape` / `update_shape` call, or the rejection reason
fn described_shape(params: &Params) -> Result<Result<Shape, String>, BackendError> {
    let descr = required(params, "descr")?;
    let kind = match descr.parse::<ShapeKind>() {
        Ok(kind) => kind,
        Err(reason) => return Ok(Err(reason)),
    };
    Ok(Ok(kind.fit(
        params.number_or("length", defaults::EXTENT),
        params.number_or("width", defaults::EXTENT),
        params.number_or("height", defaults::EXTENT),
        axis(params, ["x", "y", "z"]),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ParamValue;

    #[test]
    fn test_time_wins_over_frame() {
        let params = Params::new()
            .with("frame", ParamValue::Int(4))
            .with("time", ParamValue::Float(2.5));
        assert_eq!(keying(&params, false).time, 2.5);

        let params = Params::new().with("frame", ParamValue::Int(4));
        assert_eq!(keying(&params, false).time, 4.0);

        let keyed = keying(&Params::new(), true);
        assert_eq!(keyed.time, 1.0);
        assert!(keyed.immediate);
    }

    #[test]
    fn test_axis_defaults() {
        let params = Params::new().with("ty", ParamValue::Int(3));
        assert_eq!(axis(&params, ["tx", "ty", "tz"]), [0.0, 3.0, 1.0]);
    }
}
