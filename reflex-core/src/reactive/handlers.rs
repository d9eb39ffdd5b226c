//! Interception Handlers
//!
//! [`MutableHandler`] is the proxy handler installed on every reactive
//! wrapper. It overrides two operations:
//!
//! - **read**: forward the read, report it to the dependency tracker, and
//!   wrap object results on the way out. Nested objects are wrapped lazily,
//!   one read at a time, so cyclic graphs never recurse.
//!
//! - **write**: capture whether the key existed and its old value, unwrap
//!   incoming wrappers so raw storage only ever holds raw objects, perform
//!   the write, then classify it as add, set or no-op.
//!
//! # Classification
//!
//! A write to a key that was not an own property is an add. A write to an
//! existing key is a set if the stored value is not strictly equal to the
//! old one, otherwise nothing is reported. No key gets special treatment:
//! appending to a sequence by index already extends its `length`, so the
//! follow-up `length` assignment finds an equal value and stays silent.

use std::sync::Arc;

use super::notifier::{Change, OperationKind};
use super::runtime::RuntimeInner;
use crate::error::ObjectResult;
use crate::object::{ObjectRef, PropertyKey, ProxyHandler, Value};

/// Read and write traps bound to one runtime.
pub(crate) struct MutableHandler {
    runtime: Arc<RuntimeInner>,
}

impl MutableHandler {
    pub(crate) fn new(runtime: Arc<RuntimeInner>) -> Self {
        Self { runtime }
    }
}

/// Decide how a completed write should be reported.
pub(crate) fn classify(had_key: bool, old_value: &Value, new_value: &Value) -> Option<OperationKind> {
    if !had_key {
        Some(OperationKind::Add)
    } else if !new_value.strict_equals(old_value) {
        Some(OperationKind::Set)
    } else {
        None
    }
}

impl ProxyHandler for MutableHandler {
    fn get(&self, target: &ObjectRef, key: &PropertyKey) -> ObjectResult<Value> {
        let value = target.get(key)?;

        self.runtime.tracker().track(target, key);
        if self.runtime.config().trace_reads {
            tracing::trace!(target_id = target.id().raw(), key = %key, "get");
        }

        Ok(match value {
            Value::Object(obj) => Value::Object(self.runtime.reactive_object(&obj)),
            primitive => primitive,
        })
    }

    fn set(&self, target: &ObjectRef, key: PropertyKey, value: Value) -> ObjectResult<()> {
        let had_key = target.has_own(&key)?;
        let old_value = target.get(&key)?;

        let value = self.runtime.raw_value(value);
        target.set(key.clone(), value.clone())?;

        if let Some(kind) = classify(had_key, &old_value, &value) {
            self.runtime.notifier().notify_change(&Change {
                target: target.clone(),
                key,
                kind,
                old_value: had_key.then_some(old_value),
                new_value: value,
            });
        }
        Ok(())
    }
}
