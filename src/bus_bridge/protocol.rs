//! Wire conversions
//!
//! Turns the `a{sv}` argument of a bus call into [`Params`] and a dispatch
//! reply into the method result.

use std::collections::HashMap;

use zbus::fdo;
use zbus::zvariant::{OwnedValue, Value};

use super::shared_state::Reply;
use crate::api::{ParamValue, Params};

/// Convert one variant, unwrapping nested variants.
///
/// Unsigned 64-bit values above `i64::MAX` become floats. Containers and
/// other types have no parameter equivalent and yield `None`.
pub fn param_value(value: &Value<'_>) -> Option<ParamValue> {
    Some(match value {
        Value::Bool(b) => ParamValue::Bool(*b),
        Value::U8(i) => ParamValue::Int(i64::from(*i)),
        Value::I16(i) => ParamValue::Int(i64::from(*i)),
        Value::U16(i) => ParamValue::Int(i64::from(*i)),
        Value::I32(i) => ParamValue::Int(i64::from(*i)),
        Value::U32(i) => ParamValue::Int(i64::from(*i)),
        Value::I64(i) => ParamValue::Int(*i),
        Value::U64(i) => match i64::try_from(*i) {
            Ok(i) => ParamValue::Int(i),
            Err(_) => ParamValue::Float(*i as f64),
        },
        Value::F64(x) => ParamValue::Float(*x),
        Value::Str(s) => ParamValue::Str(s.to_string()),
        Value::ObjectPath(p) => ParamValue::Str(p.to_string()),
        Value::Value(inner) => return param_value(inner),
        _ => return None,
    })
}

/// Convert the argument dictionary of a call
pub fn params_from_bus(args: HashMap<String, OwnedValue>) -> Params {
    let mut params = Params::new();
    for (name, value) in args {
        match param_value(&value) {
            Some(converted) => params.insert(name, converted),
            None => log::warn!(
                "[Bus] Ignoring parameter {} of unsupported type {}",
                name,
                value.value_signature()
            ),
        }
    }
    params
}

/// Method result for a dispatch reply; only failed calls become bus errors
pub fn reply_to_bus(reply: Reply) -> fdo::Result<String> {
    reply
        .map(|outcome| outcome.into_message())
        .map_err(fdo::Error::Failed)
}
