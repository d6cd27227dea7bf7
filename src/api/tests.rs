//! End-to-end behaviour of the command surface

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::*;
use crate::backend::{AxisUpdate, HostScene, Keying, SceneBackend, SceneQuery};
use crate::config::Config;
use crate::error::BackendError;
use crate::scene::{ColorChannel, Shape};

/// Accepts everything and remembers what it was asked to do
#[derive(Default)]
struct RecordingBackend {
    objects: BTreeMap<String, bool>,
    materials: BTreeSet<String>,
    calls: Vec<String>,
}

impl SceneQuery for RecordingBackend {
    fn has_object(&self, reference: &str) -> bool {
        self.objects.contains_key(reference)
    }

    fn has_material(&self, reference: &str) -> bool {
        self.materials.contains(reference)
    }

    fn is_group(&self, reference: &str) -> bool {
        self.objects.get(reference).copied().unwrap_or(false)
    }
}

impl SceneBackend for RecordingBackend {
    fn label(&self) -> &'static str {
        "recording"
    }

    fn create_shape(&mut self, reference: &str, shape: Shape) -> Result<(), BackendError> {
        self.objects
            .insert(reference.to_string(), matches!(shape, Shape::Group));
        self.calls.push(format!("create_shape {} {:?}", reference, shape));
        Ok(())
    }

    fn update_shape(&mut self, reference: &str, shape: Shape) -> Result<(), BackendError> {
        self.calls.push(format!("update_shape {} {:?}", reference, shape));
        Ok(())
    }

    fn add_to_group(&mut self, reference: &str, group: &str) -> Result<(), BackendError> {
        self.calls.push(format!("add_to_group {} {}", reference, group));
        Ok(())
    }

    fn set_translation(
        &mut self,
        reference: &str,
        update: AxisUpdate,
        keying: Keying,
    ) -> Result<(), BackendError> {
        self.calls
            .push(format!("set_translation {} {:?} {:?}", reference, update, keying));
        Ok(())
    }

    fn set_scale(
        &mut self,
        reference: &str,
        update: AxisUpdate,
        keying: Keying,
    ) -> Result<(), BackendError> {
        self.calls
            .push(format!("set_scale {} {:?} {:?}", reference, update, keying));
        Ok(())
    }

    fn rotate(
        &mut self,
        reference: &str,
        euler: [f64; 3],
        keying: Keying,
    ) -> Result<(), BackendError> {
        self.calls
            .push(format!("rotate {} {:?} {:?}", reference, euler, keying));
        Ok(())
    }

    fn create_material(&mut self, reference: &str, color: [f64; 4]) -> Result<(), BackendError> {
        self.materials.insert(reference.to_string());
        self.calls
            .push(format!("create_material {} {:?}", reference, color));
        Ok(())
    }

    fn apply_material(&mut self, reference: &str, material: &str) -> Result<(), BackendError> {
        self.calls
            .push(format!("apply_material {} {}", reference, material));
        Ok(())
    }

    fn set_material_property(
        &mut self,
        reference: &str,
        property: &str,
        value: f64,
        keying: Keying,
    ) -> Result<(), BackendError> {
        self.calls.push(format!(
            "set_material_property {} {} {} {:?}",
            reference, property, value, keying
        ));
        Ok(())
    }

    fn set_color(
        &mut self,
        reference: &str,
        channel: ColorChannel,
        color: [f64; 4],
        keying: Keying,
    ) -> Result<(), BackendError> {
        self.calls.push(format!(
            "set_color {} {} {:?} {:?}",
            reference,
            channel.name(),
            color,
            keying
        ));
        Ok(())
    }

    fn load_object(
        &mut self,
        reference: &str,
        path: &Path,
        offset: [f64; 3],
    ) -> Result<(), BackendError> {
        self.objects.insert(reference.to_string(), true);
        self.calls.push(format!(
            "load_object {} {} {:?}",
            reference,
            path.display(),
            offset
        ));
        Ok(())
    }

    fn hand_off(self, _config: &Config) -> Result<(), BackendError> {
        Ok(())
    }
}

fn s(v: &str) -> ParamValue {
    ParamValue::Str(v.into())
}

fn f(v: f64) -> ParamValue {
    ParamValue::Float(v)
}

fn reference(name: &str) -> Params {
    Params::new().with("reference", s(name))
}

fn accepted(outcome: Result<Outcome, CommandError>) -> String {
    match outcome {
        Ok(Outcome::Accepted(value)) => value,
        other => panic!("expected accepted outcome, got {:?}", other),
    }
}

fn rejected(outcome: Result<Outcome, CommandError>) -> String {
    match outcome {
        Ok(Outcome::Rejected { reason }) => reason,
        other => panic!("expected rejected outcome, got {:?}", other),
    }
}

fn identity(params: Params) -> Params {
    let mut params = params;
    for i in 1..=3 {
        for j in 1..=3 {
            let value = if i == j { 1.0 } else { 0.0 };
            params.insert(format!("R_{}_{}", i, j), f(value));
        }
    }
    params
}

/// A file that exists for the duration of a test
struct TempFile(PathBuf);

impl TempFile {
    fn new(name: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        Self(path)
    }

    fn as_str(&self) -> &str {
        self.0.to_str().unwrap()
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        std::fs::remove_file(&self.0).ok();
    }
}

#[test]
fn test_make_box_then_duplicate_is_rejected() {
    let mut facade = SceneFacade::new(HostScene::new());

    assert_eq!(accepted(facade.dispatch(Command::MakeBox, &reference("b"))), "b");
    assert_eq!(
        rejected(facade.dispatch(Command::MakeBox, &reference("b"))),
        "b is already in use."
    );
    assert_eq!(facade.backend().scene().objects.len(), 1);
}

#[test]
fn test_mutations_on_unknown_reference_change_nothing() {
    let mut facade = SceneFacade::new(HostScene::new());
    facade.dispatch(Command::MakeBox, &reference("b")).unwrap();
    let before = facade.backend().scene().clone();

    let moves = reference("ghost").with("x", f(1.0));
    let shape = reference("ghost").with("descr", s("box"));
    for (command, params) in [
        (Command::MoveTo, moves.clone()),
        (Command::Scale, moves),
        (Command::Rotate, identity(reference("ghost"))),
        (Command::UpdateShape, shape),
    ] {
        assert_eq!(rejected(facade.dispatch(command, &params)), "ghost undefined");
    }
    assert_eq!(facade.backend().scene(), &before);
}

#[test]
fn test_identity_rotation_keeps_orientation() {
    let mut facade = SceneFacade::new(HostScene::new());
    facade.dispatch(Command::MakeBox, &reference("b")).unwrap();

    // quarter turn about Z at t=2
    let mut quarter = reference("b").with("time", f(2.0));
    for (name, value) in [
        ("R_1_1", 0.0),
        ("R_1_2", -1.0),
        ("R_1_3", 0.0),
        ("R_2_1", 1.0),
        ("R_2_2", 0.0),
        ("R_2_3", 0.0),
        ("R_3_1", 0.0),
        ("R_3_2", 0.0),
        ("R_3_3", 1.0),
    ] {
        quarter.insert(name, f(value));
    }
    accepted(facade.dispatch(Command::Rotate, &quarter));

    let params = identity(reference("b").with("time", f(6.0)));
    accepted(facade.dispatch(Command::Rotate, &params));

    let object = facade.backend().scene().object("b").unwrap();
    let before = object.pose_at(2.0).rotation;
    let after = object.pose_at(6.0).rotation;
    for i in 0..3 {
        assert!((before[i] - after[i]).abs() < 1e-9);
    }
    assert!((after[2] - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
}

#[test]
fn test_move_to_keys_position_and_hold() {
    let mut facade = SceneFacade::new(HostScene::new());
    facade.dispatch(Command::MakeBox, &reference("b")).unwrap();

    let params = reference("b")
        .with("x", f(1.0))
        .with("y", f(2.0))
        .with("z", f(3.0))
        .with("time", f(5.0))
        .with("immediate", ParamValue::Bool(true));
    accepted(facade.dispatch(Command::MoveTo, &params));

    let object = facade.backend().scene().object("b").unwrap();
    assert_eq!(object.pose_at(5.0).location, [1.0, 2.0, 3.0]);

    let keys = object.location.keys();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].time, 4.0);
    assert_eq!(keys[0].value, [0.0, 0.0, 0.0]);
}

#[test]
fn test_apply_material_requires_created_material() {
    let mut facade = SceneFacade::new(HostScene::new());
    facade.dispatch(Command::MakeBox, &reference("b")).unwrap();

    let params = reference("b").with("material", s("steel"));
    assert_eq!(
        rejected(facade.dispatch(Command::ApplyMaterial, &params)),
        "steel undefined"
    );

    accepted(facade.dispatch(Command::MakeMaterial, &reference("steel")));
    accepted(facade.dispatch(Command::ApplyMaterial, &params));

    let scene = facade.backend().scene();
    assert_eq!(scene.object("b").unwrap().material.as_deref(), Some("steel"));
    assert_eq!(scene.material("steel").unwrap().base_color, [0.8, 0.8, 0.8, 1.0]);
}

#[test]
fn test_zero_dimensions_never_reach_the_backend() {
    let mut facade = SceneFacade::new(RecordingBackend::default());

    let sphere = reference("s").with("size", ParamValue::Int(0));
    assert_eq!(
        rejected(facade.dispatch(Command::MakeSphere, &sphere)),
        "expected positive value"
    );
    let boxed = reference("b").with("height", f(0.0));
    assert_eq!(
        rejected(facade.dispatch(Command::MakeBox, &boxed)),
        "parameter may not be zero"
    );
    assert!(facade.backend().calls.is_empty());
}

#[test]
fn test_zero_shape_extents_never_reach_the_backend() {
    let mut facade = SceneFacade::new(RecordingBackend::default());

    let flat = reference("z")
        .with("descr", s("sphere"))
        .with("length", f(0.0))
        .with("width", f(0.0))
        .with("height", f(0.0));
    assert_eq!(
        rejected(facade.dispatch(Command::MakeShape, &flat)),
        "parameter may not be zero"
    );
    assert!(facade.backend().calls.is_empty());

    accepted(facade.dispatch(Command::MakeBox, &reference("b")));
    let calls = facade.backend().calls.len();
    let squashed = reference("b")
        .with("descr", s("box"))
        .with("height", ParamValue::Int(0));
    assert_eq!(
        rejected(facade.dispatch(Command::UpdateShape, &squashed)),
        "parameter may not be zero"
    );
    assert_eq!(facade.backend().calls.len(), calls);
}

#[test]
fn test_fractional_frame_is_not_a_frame() {
    let mut facade = SceneFacade::new(RecordingBackend::default());
    accepted(facade.dispatch(Command::MakeBox, &reference("b")));
    let calls = facade.backend().calls.len();

    let params = reference("b").with("x", f(1.0)).with("frame", f(2.5));
    assert_eq!(
        rejected(facade.dispatch(Command::MoveTo, &params)),
        "expected positive int"
    );
    let params = reference("b").with("frame", ParamValue::Int(-3));
    assert_eq!(
        rejected(facade.dispatch(Command::MoveTo, &params)),
        "expected positive int"
    );
    assert_eq!(facade.backend().calls.len(), calls);
}

#[test]
fn test_load_from_file_calls_import_once() {
    let mut facade = SceneFacade::new(RecordingBackend::default());

    let missing = Params::new().with("fileName", s("/no/such/model.gltf"));
    assert_eq!(
        rejected(facade.dispatch(Command::LoadFromFile, &missing)),
        "File /no/such/model.gltf does not exist!"
    );
    assert!(facade.backend().calls.is_empty());

    let file = TempFile::new("robot.gltf", "{}");
    let params = Params::new()
        .with("fileName", s(file.as_str()))
        .with("z", f(2.0));
    assert_eq!(accepted(facade.dispatch(Command::LoadFromFile, &params)), file.as_str());

    let stem = file.0.file_stem().unwrap().to_str().unwrap().to_string();
    assert_eq!(
        facade.backend().calls,
        vec![format!("load_object {} {} [0.0, 0.0, 2.0]", stem, file.as_str())]
    );

    // the derived reference is now taken
    assert_eq!(
        rejected(facade.dispatch(Command::LoadFromFile, &params)),
        format!("{} is already in use.", stem)
    );
    assert_eq!(facade.backend().calls.len(), 1);
}

#[test]
fn test_broken_asset_is_a_backend_error() {
    let mut facade = SceneFacade::new(HostScene::new());
    let file = TempFile::new("broken.gltf", "not json");
    let params = Params::new()
        .with("filepath", s(file.as_str()))
        .with("reference", s("asset"));

    let err = facade.dispatch(Command::LoadScene, &params).unwrap_err();
    assert_eq!(err.command, "load_scene");
    assert!(matches!(err.source, BackendError::Scene(_)));
    assert!(!facade.backend().has_object("asset"));
}

#[test]
fn test_required_parameters_are_checked_when_absent() {
    let mut facade = SceneFacade::new(RecordingBackend::default());

    assert_eq!(
        rejected(facade.dispatch(Command::MakeGroup, &Params::new())),
        "missing required parameter 'reference'"
    );

    let mut params = identity(Params::new());
    facade.dispatch(Command::MakeBox, &reference("b")).unwrap();
    params.insert("reference", s("b"));
    let partial: Params = (&params)
        .into_iter()
        .filter(|(name, _)| name.as_str() != "R_2_3")
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    assert_eq!(
        rejected(facade.dispatch(Command::Rotate, &partial)),
        "missing required parameter 'R_2_3'"
    );
}

#[test]
fn test_defaults_reach_the_backend() {
    let mut facade = SceneFacade::new(RecordingBackend::default());

    facade.dispatch(Command::MakeCone, &reference("c")).unwrap();
    facade.dispatch(Command::MakeMaterial, &reference("m")).unwrap();
    facade
        .dispatch(Command::SetSpecularColor, &reference("m").with("r", f(1.0)))
        .unwrap();
    facade
        .dispatch(Command::Scale, &reference("c").with("y", f(2.0)))
        .unwrap();

    let calls = &facade.backend().calls;
    assert_eq!(
        calls[0],
        "create_shape c Cone { radius: 0.5, height: 5.0, axis: [0.0, 0.0, 1.0] }"
    );
    assert_eq!(
        calls[2],
        "set_color m specular [1.0, 0.5, 0.5, 0.0] Keying { time: 1.0, immediate: true }"
    );
    assert_eq!(
        calls[3],
        "set_scale c AxisUpdate { x: None, y: Some(2.0), z: None } Keying { time: 1.0, immediate: false }"
    );
}

#[test]
fn test_make_shape_fits_extents() {
    let mut facade = SceneFacade::new(HostScene::new());

    let params = reference("s")
        .with("descr", s("sphere"))
        .with("length", f(2.0))
        .with("height", f(4.0));
    accepted(facade.dispatch(Command::MakeShape, &params));
    assert_eq!(
        facade.backend().scene().object("s").unwrap().shape,
        Shape::Sphere { radius: 2.0 }
    );

    let params = reference("t").with("descr", s("torus"));
    assert_eq!(
        rejected(facade.dispatch(Command::MakeShape, &params)),
        "shape torus not implemented"
    );
}

#[test]
fn test_grouping() {
    let mut facade = SceneFacade::new(HostScene::new());
    facade.dispatch(Command::MakeBox, &reference("b")).unwrap();
    facade.dispatch(Command::MakeGroup, &reference("g")).unwrap();

    let params = reference("g").with("group", s("b"));
    assert_eq!(
        rejected(facade.dispatch(Command::AddToGroup, &params)),
        "b is not a group"
    );

    let params = reference("b").with("group", s("g"));
    accepted(facade.dispatch(Command::AddToGroup, &params));
    assert_eq!(
        facade.backend().scene().object("b").unwrap().parent.as_deref(),
        Some("g")
    );
}

#[test]
fn test_stop() {
    let mut facade = SceneFacade::new(RecordingBackend::default());
    assert!(!facade.is_stopped());
    assert_eq!(accepted(facade.dispatch(Command::Stop, &Params::new())), "stopped");
    assert!(facade.is_stopped());
}
