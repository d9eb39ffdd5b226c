//! JSON interchange for object graphs.
//!
//! Import always builds fresh raw objects. Export reads through the standard
//! operations, so exporting a reactive wrapper goes through its traps.

use std::collections::HashSet;

use serde_json::{Map, Number};

use super::{ObjectId, ObjectRef, Value};
use crate::error::{ObjectError, ObjectResult};

/// Maximum object nesting [`Value::to_json`] will follow, matching the
/// recursion limit `serde_json` applies when parsing.
pub const MAX_EXPORT_DEPTH: usize = 128;

/// Sequence exports preallocate at most this many slots.
const PREALLOCATE_LIMIT: usize = 1024;

impl Value {
    /// Build a value from JSON. Arrays become sequences, objects become
    /// records.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::Object(ObjectRef::sequence_from(items.into_iter().map(Value::from_json)))
            }
            serde_json::Value::Object(map) => Value::Object(ObjectRef::record_from(
                map.into_iter().map(|(k, v)| (k, Value::from_json(v))),
            )),
        }
    }

    /// Snapshot this value as JSON.
    ///
    /// `Undefined` properties are skipped in records and become `null` in
    /// sequences, as are holes. Non-finite numbers become `null`. Cycles and
    /// graphs nested deeper than [`MAX_EXPORT_DEPTH`] are rejected.
    pub fn to_json(&self) -> ObjectResult<serde_json::Value> {
        let mut path = HashSet::new();
        export(self, &mut path)
    }
}

fn export(value: &Value, path: &mut HashSet<ObjectId>) -> ObjectResult<serde_json::Value> {
    Ok(match value {
        Value::Undefined | Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number(*n),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Object(obj) => {
            if path.len() >= MAX_EXPORT_DEPTH {
                return Err(ObjectError::TooDeep {
                    limit: MAX_EXPORT_DEPTH,
                });
            }
            if !path.insert(obj.id()) {
                return Err(ObjectError::Cycle);
            }
            let json = if obj.is_sequence() {
                export_sequence(obj, path)?
            } else {
                export_record(obj, path)?
            };
            path.remove(&obj.id());
            json
        }
    })
}

fn export_sequence(obj: &ObjectRef, path: &mut HashSet<ObjectId>) -> ObjectResult<serde_json::Value> {
    let len = obj.length()?;
    let mut items = Vec::with_capacity(len.min(PREALLOCATE_LIMIT));
    for i in 0..len {
        items.push(export(&obj.get(i)?, path)?);
    }
    Ok(serde_json::Value::Array(items))
}

fn export_record(obj: &ObjectRef, path: &mut HashSet<ObjectId>) -> ObjectResult<serde_json::Value> {
    let mut map = Map::new();
    for key in obj.own_keys()? {
        let value = obj.get(&key)?;
        if matches!(value, Value::Undefined) {
            continue;
        }
        map.insert(key.to_name(), export(&value, path)?);
    }
    Ok(serde_json::Value::Object(map))
}

fn number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}
