//! Command catalog
//!
//! Every remote method, its wire name and the declared parameters it takes.
//! The declaration drives validation: required parameters are checked whether
//! or not the caller sent them, optional ones only when present.

use super::params::ParamKind;
use super::validation::Check;

/// One declared parameter of a command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub check: Option<Check>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            check: None,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            check: None,
        }
    }

    pub const fn check(mut self, check: Check) -> Self {
        self.check = Some(check);
        self
    }
}

use ParamKind::{Bool, Number, Str};

const NEW_OBJECT: ParamSpec = ParamSpec::required("reference", Str).check(Check::UnusedObject);
const OBJECT: ParamSpec = ParamSpec::required("reference", Str).check(Check::ExistingObject);
const NEW_MATERIAL: ParamSpec =
    ParamSpec::required("reference", Str).check(Check::UnusedMaterial);
const MATERIAL: ParamSpec = ParamSpec::required("reference", Str).check(Check::ExistingMaterial);

// non-integer frames fail the frame check, not the kind check
const FRAME: ParamSpec = ParamSpec::optional("frame", Number).check(Check::Frame);
const TIME: ParamSpec = ParamSpec::optional("time", Number).check(Check::NonNegative);
const IMMEDIATE: ParamSpec = ParamSpec::optional("immediate", Bool);

const fn number(name: &'static str) -> ParamSpec {
    ParamSpec::optional(name, Number)
}

const fn dimension(name: &'static str) -> ParamSpec {
    ParamSpec::optional(name, Number).check(Check::NotZero)
}

const fn positive(name: &'static str) -> ParamSpec {
    ParamSpec::optional(name, Number).check(Check::Positive)
}

const fn matrix_entry(name: &'static str) -> ParamSpec {
    ParamSpec::required(name, Number)
}

const STOP: &[ParamSpec] = &[];

const MAKE_BOX: &[ParamSpec] = &[
    NEW_OBJECT,
    dimension("length"),
    dimension("width"),
    dimension("height"),
    number("tx"),
    number("ty"),
    number("tz"),
];

const MAKE_CONE: &[ParamSpec] = &[
    NEW_OBJECT,
    number("x"),
    number("y"),
    number("z"),
    positive("diameter"),
    dimension("height"),
];

const MAKE_SPHERE: &[ParamSpec] = &[NEW_OBJECT, positive("size")];

const MAKE_CYLINDER: &[ParamSpec] = MAKE_CONE;

const MAKE_PLANE: &[ParamSpec] = &[NEW_OBJECT, dimension("length"), dimension("width")];

const MAKE_SHAPE: &[ParamSpec] = &[
    NEW_OBJECT,
    ParamSpec::required("descr", Str).check(Check::ShapeKind),
    dimension("length"),
    dimension("width"),
    dimension("height"),
    number("x"),
    number("y"),
    number("z"),
    number("extra"),
];

const UPDATE_SHAPE: &[ParamSpec] = &[
    OBJECT,
    ParamSpec::required("descr", Str).check(Check::ShapeKind),
    dimension("length"),
    dimension("width"),
    dimension("height"),
    number("x"),
    number("y"),
    number("z"),
    number("extra"),
];

const MAKE_GROUP: &[ParamSpec] = &[NEW_OBJECT];

const ADD_TO_GROUP: &[ParamSpec] = &[
    OBJECT,
    ParamSpec::required("group", Str).check(Check::ExistingGroup),
];

const TRANSFORM: &[ParamSpec] = &[
    OBJECT,
    number("x"),
    number("y"),
    number("z"),
    FRAME,
    TIME,
    IMMEDIATE,
];

const ROTATE: &[ParamSpec] = &[
    OBJECT,
    matrix_entry("R_1_1"),
    matrix_entry("R_1_2"),
    matrix_entry("R_1_3"),
    matrix_entry("R_2_1"),
    matrix_entry("R_2_2"),
    matrix_entry("R_2_3"),
    matrix_entry("R_3_1"),
    matrix_entry("R_3_2"),
    matrix_entry("R_3_3"),
    FRAME,
    TIME,
    IMMEDIATE,
];

const MAKE_MATERIAL: &[ParamSpec] = &[
    NEW_MATERIAL,
    number("r"),
    number("g"),
    number("b"),
    number("a"),
];

const APPLY_MATERIAL: &[ParamSpec] = &[
    OBJECT,
    ParamSpec::required("material", Str).check(Check::ExistingMaterial),
];

const SET_MATERIAL_PROPERTY: &[ParamSpec] = &[
    MATERIAL,
    ParamSpec::required("prop", Str),
    ParamSpec::required("value", Number),
    FRAME,
    TIME,
    IMMEDIATE,
];

const SET_COLOR: &[ParamSpec] = &[
    MATERIAL,
    number("r"),
    number("g"),
    number("b"),
    number("a"),
    FRAME,
    TIME,
    IMMEDIATE,
];

const LOAD_SCENE: &[ParamSpec] = &[
    ParamSpec::required("filepath", Str).check(Check::ExistingFile),
    ParamSpec::optional("reference", Str).check(Check::UnusedObject),
    number("x"),
    number("y"),
    number("z"),
];

const LOAD_FROM_FILE: &[ParamSpec] = &[
    ParamSpec::required("fileName", Str).check(Check::ExistingFile),
    ParamSpec::optional("reference", Str).check(Check::UnusedObject),
    number("x"),
    number("y"),
    number("z"),
];

/// A remote scene operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Stop,
    MakeBox,
    MakeCone,
    MakeSphere,
    MakeCylinder,
    MakePlane,
    MakeShape,
    UpdateShape,
    MakeGroup,
    AddToGroup,
    MoveTo,
    Scale,
    Rotate,
    MakeMaterial,
    ApplyMaterial,
    SetMaterialProperty,
    SetAmbientColor,
    SetDiffuseColor,
    SetSpecularColor,
    LoadScene,
    LoadFromFile,
}

impl Command {
    pub const ALL: [Command; 21] = [
        Command::Stop,
        Command::MakeBox,
        Command::MakeCone,
        Command::MakeSphere,
        Command::MakeCylinder,
        Command::MakePlane,
        Command::MakeShape,
        Command::UpdateShape,
        Command::MakeGroup,
        Command::AddToGroup,
        Command::MoveTo,
        Command::Scale,
        Command::Rotate,
        Command::MakeMaterial,
        Command::ApplyMaterial,
        Command::SetMaterialProperty,
        Command::SetAmbientColor,
        Command::SetDiffuseColor,
        Command::SetSpecularColor,
        Command::LoadScene,
        Command::LoadFromFile,
    ];

    /// Method name on the bus
    pub fn name(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::MakeBox => "make_box",
            Self::MakeCone => "make_cone",
            Self::MakeSphere => "make_sphere",
            Self::MakeCylinder => "make_cylinder",
            Self::MakePlane => "make_plane",
            Self::MakeShape => "make_shape",
            Self::UpdateShape => "update_shape",
            Self::MakeGroup => "make_group",
            Self::AddToGroup => "add_to_group",
            Self::MoveTo => "move_to",
            Self::Scale => "scale",
            Self::Rotate => "rotate",
            Self::MakeMaterial => "make_material",
            Self::ApplyMaterial => "apply_material",
            Self::SetMaterialProperty => "set_material_property",
            Self::SetAmbientColor => "set_ambient_color",
            Self::SetDiffuseColor => "set_diffuse_color",
            Self::SetSpecularColor => "set_specular_color",
            Self::LoadScene => "load_scene",
            Self::LoadFromFile => "loadFromFile",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Declared parameters, in validation order
    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            Self::Stop => STOP,
            Self::MakeBox => MAKE_BOX,
            Self::MakeCone => MAKE_CONE,
            Self::MakeSphere => MAKE_SPHERE,
            Self::MakeCylinder => MAKE_CYLINDER,
            Self::MakePlane => MAKE_PLANE,
            Self::MakeShape => MAKE_SHAPE,
            Self::UpdateShape => UPDATE_SHAPE,
            Self::MakeGroup => MAKE_GROUP,
            Self::AddToGroup => ADD_TO_GROUP,
            Self::MoveTo | Self::Scale => TRANSFORM,
            Self::Rotate => ROTATE,
            Self::MakeMaterial => MAKE_MATERIAL,
            Self::ApplyMaterial => APPLY_MATERIAL,
            Self::SetMaterialProperty => SET_MATERIAL_PROPERTY,
            Self::SetAmbientColor | Self::SetDiffuseColor | Self::SetSpecularColor => SET_COLOR,
            Self::LoadScene => LOAD_SCENE,
            Self::LoadFromFile => LOAD_FROM_FILE,
        }
    }
}
