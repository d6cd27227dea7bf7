//! Bus method handlers
//!
//! One method per command on the `de.tuberlin.uebb.modelica3d.api` interface.
//! Every method takes the parameter dictionary and returns a string; the work
//! happens on the dispatch thread.

use std::collections::HashMap;

use zbus::{fdo, interface, zvariant::OwnedValue};

use super::protocol::{params_from_bus, reply_to_bus};
use super::shared_state::RequestSender;
use crate::api::Command;

type Args = HashMap<String, OwnedValue>;

/// Object served at the scene object path
pub struct SceneInterface {
    requests: RequestSender,
}

impl SceneInterface {
    pub fn new(requests: RequestSender) -> Self {
        Self { requests }
    }

    fn forward(&self, command: Command, args: Args) -> fdo::Result<String> {
        log::debug!("[Bus] {} with {} parameter(s)", command.name(), args.len());
        reply_to_bus(self.requests.call(command, params_from_bus(args)))
    }
}

#[interface(name = "de.tuberlin.uebb.modelica3d.api")]
impl SceneInterface {
    #[zbus(name = "stop")]
    fn stop(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::Stop, args)
    }

    #[zbus(name = "make_box")]
    fn make_box(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::MakeBox, args)
    }

    #[zbus(name = "make_cone")]
    fn make_cone(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::MakeCone, args)
    }

    #[zbus(name = "make_sphere")]
    fn make_sphere(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::MakeSphere, args)
    }

    #[zbus(name = "make_cylinder")]
    fn make_cylinder(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::MakeCylinder, args)
    }

    #[zbus(name = "make_plane")]
    fn make_plane(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::MakePlane, args)
    }

    #[zbus(name = "make_shape")]
    fn make_shape(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::MakeShape, args)
    }

    #[zbus(name = "update_shape")]
    fn update_shape(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::UpdateShape, args)
    }

    #[zbus(name = "make_group")]
    fn make_group(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::MakeGroup, args)
    }

    #[zbus(name = "add_to_group")]
    fn add_to_group(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::AddToGroup, args)
    }

    #[zbus(name = "move_to")]
    fn move_to(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::MoveTo, args)
    }

    #[zbus(name = "scale")]
    fn scale(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::Scale, args)
    }

    #[zbus(name = "rotate")]
    fn rotate(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::Rotate, args)
    }

    #[zbus(name = "make_material")]
    fn make_material(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::MakeMaterial, args)
    }

    #[zbus(name = "apply_material")]
    fn apply_material(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::ApplyMaterial, args)
    }

    #[zbus(name = "set_material_property")]
    fn set_material_property(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::SetMaterialProperty, args)
    }

    #[zbus(name = "set_ambient_color")]
    fn set_ambient_color(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::SetAmbientColor, args)
    }

    #[zbus(name = "set_diffuse_color")]
    fn set_diffuse_color(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::SetDiffuseColor, args)
    }

    #[zbus(name = "set_specular_color")]
    fn set_specular_color(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::SetSpecularColor, args)
    }

    #[zbus(name = "load_scene")]
    fn load_scene(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::LoadScene, args)
    }

    #[zbus(name = "loadFromFile")]
    fn load_from_file(&self, args: Args) -> fdo::Result<String> {
        self.forward(Command::LoadFromFile, args)
    }
}
