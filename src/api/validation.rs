//! Parameter predicates
//!
//! Each check looks at one parameter value and, for reference checks, at the
//! current scene. A failing check yields the message handed back to the caller.

use std::path::Path;

use super::command::Command;
use super::params::{ParamValue, Params};
use crate::backend::SceneQuery;
use crate::scene::ShapeKind;

/// A predicate attached to a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// No object of that name yet
    UnusedObject,
    /// An object of that name exists
    ExistingObject,
    UnusedMaterial,
    ExistingMaterial,
    /// An object of that name exists and is a group
    ExistingGroup,
    NotZero,
    Positive,
    /// Integer frame number, zero or more
    Frame,
    NonNegative,
    ExistingFile,
    /// Name of a primitive `make_shape` knows
    ShapeKind,
}

impl Check {
    pub fn run(self, value: &ParamValue, scene: &dyn SceneQuery) -> Result<(), String> {
        match self {
            Self::UnusedObject => {
                let reference = value.to_string();
                if scene.has_object(&reference) {
                    return Err(format!("{} is already in use.", reference));
                }
            }
            Self::ExistingObject => {
                let reference = value.to_string();
                if !scene.has_object(&reference) {
                    return Err(format!("{} undefined", reference));
                }
            }
            Self::UnusedMaterial => {
                let reference = value.to_string();
                if scene.has_material(&reference) {
                    return Err(format!("{} is already in use.", reference));
                }
            }
            Self::ExistingMaterial => {
                let reference = value.to_string();
                if !scene.has_material(&reference) {
                    return Err(format!("{} undefined", reference));
                }
            }
            Self::ExistingGroup => {
                let reference = value.to_string();
                if !scene.has_object(&reference) {
                    return Err(format!("{} undefined", reference));
                }
                if !scene.is_group(&reference) {
                    return Err(format!("{} is not a group", reference));
                }
            }
            Self::NotZero => {
                if value.as_f64() == Some(0.0) {
                    return Err("parameter may not be zero".to_string());
                }
            }
            Self::Positive => match value.as_f64() {
                Some(x) if x > 0.0 => {}
                _ => return Err("expected positive value".to_string()),
            },
            Self::Frame => match value {
                ParamValue::Int(i) if *i >= 0 => {}
                _ => return Err("expected positive int".to_string()),
            },
            Self::NonNegative => match value.as_f64() {
                Some(x) if x >= 0.0 && x.is_finite() => {}
                _ => return Err("expected positive value".to_string()),
            },
            Self::ExistingFile => {
                let path = value.to_string();
                if !Path::new(&path).is_file() {
                    return Err(format!("File {} does not exist!", path));
                }
            }
            Self::ShapeKind => {
                value.to_string().parse::<ShapeKind>()?;
            }
        }
        Ok(())
    }
}

/// Check `params` against the declaration of `command`.
///
/// Parameters are visited in declaration order. A missing required parameter
/// is an error even when it carries a predicate; a missing optional one is
/// skipped. The first failure is returned.
pub fn validate(command: Command, params: &Params, scene: &dyn SceneQuery) -> Result<(), String> {
    for spec in command.params() {
        let Some(value) = params.get(spec.name) else {
            if spec.required {
                return Err(format!("missing required parameter '{}'", spec.name));
            }
            continue;
        };

        if !spec.kind.accepts(value) {
            return Err(format!(
                "parameter '{}' expects {}",
                spec.name,
                spec.kind.describe()
            ));
        }

        if let Some(check) = spec.check {
            check.run(value, scene)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Names {
        objects: HashSet<String>,
        groups: HashSet<String>,
        materials: HashSet<String>,
    }

    impl SceneQuery for Names {
        fn has_object(&self, reference: &str) -> bool {
            self.objects.contains(reference) || self.groups.contains(reference)
        }

        fn has_material(&self, reference: &str) -> bool {
            self.materials.contains(reference)
        }

        fn is_group(&self, reference: &str) -> bool {
            self.groups.contains(reference)
        }
    }

    fn names() -> Names {
        let mut names = Names::default();
        names.objects.insert("ball".into());
        names.groups.insert("rig".into());
        names.materials.insert("steel".into());
        names
    }

    fn s(v: &str) -> ParamValue {
        ParamValue::Str(v.into())
    }

    #[test]
    fn test_reference_checks() {
        let scene = names();
        assert_eq!(
            Check::UnusedObject.run(&s("ball"), &scene),
            Err("ball is already in use.".to_string())
        );
        assert_eq!(Check::UnusedObject.run(&s("cube"), &scene), Ok(()));
        assert_eq!(
            Check::ExistingObject.run(&s("cube"), &scene),
            Err("cube undefined".to_string())
        );
        assert_eq!(Check::ExistingMaterial.run(&s("steel"), &scene), Ok(()));
        assert_eq!(
            Check::UnusedMaterial.run(&s("steel"), &scene),
            Err("steel is already in use.".to_string())
        );
    }

    #[test]
    fn test_group_check() {
        let scene = names();
        assert_eq!(Check::ExistingGroup.run(&s("rig"), &scene), Ok(()));
        assert_eq!(
            Check::ExistingGroup.run(&s("ball"), &scene),
            Err("ball is not a group".to_string())
        );
        assert_eq!(
            Check::ExistingGroup.run(&s("nope"), &scene),
            Err("nope undefined".to_string())
        );
    }

    #[test]
    fn test_numeric_checks() {
        let scene = names();
        assert!(Check::NotZero.run(&ParamValue::Int(0), &scene).is_err());
        assert!(Check::NotZero.run(&ParamValue::Float(-2.0), &scene).is_ok());
        assert!(Check::Positive.run(&ParamValue::Float(-2.0), &scene).is_err());
        assert!(Check::Positive.run(&ParamValue::Float(0.5), &scene).is_ok());
        assert_eq!(
            Check::Frame.run(&ParamValue::Int(-1), &scene),
            Err("expected positive int".to_string())
        );
        assert!(Check::Frame.run(&ParamValue::Int(0), &scene).is_ok());
        assert!(Check::NonNegative.run(&ParamValue::Float(f64::NAN), &scene).is_err());
    }

    #[test]
    fn test_file_and_shape_checks() {
        let scene = names();
        assert_eq!(
            Check::ExistingFile.run(&s("/definitely/not/here.gltf"), &scene),
            Err("File /definitely/not/here.gltf does not exist!".to_string())
        );
        assert_eq!(Check::ShapeKind.run(&s("box"), &scene), Ok(()));
        assert_eq!(
            Check::ShapeKind.run(&s("torus"), &scene),
            Err("shape torus not implemented".to_string())
        );
    }

    #[test]
    fn test_missing_required_is_rejected_before_checks() {
        let scene = names();
        let params = Params::new().with("size", ParamValue::Int(2));
        assert_eq!(
            validate(Command::MakeSphere, &params, &scene),
            Err("missing required parameter 'reference'".to_string())
        );
    }

    #[test]
    fn test_first_failure_wins_in_declaration_order() {
        let scene = names();
        let params = Params::new()
            .with("size", ParamValue::Int(0))
            .with("reference", s("ball"));
        assert_eq!(
            validate(Command::MakeSphere, &params, &scene),
            Err("ball is already in use.".to_string())
        );
    }

    #[test]
    fn test_wrong_kind_and_unknown_params() {
        let scene = names();
        let params = Params::new()
            .with("reference", s("ball"))
            .with("x", s("left"));
        assert_eq!(
            validate(Command::MoveTo, &params, &scene),
            Err("parameter 'x' expects a number".to_string())
        );

        let params = Params::new()
            .with("reference", s("ball"))
            .with("colour", s("red"));
        assert_eq!(validate(Command::MoveTo, &params, &scene), Ok(()));
    }
}
