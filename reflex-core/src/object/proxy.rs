//! Proxy Handlers
//!
//! A [`ProxyHandler`] is the interception table behind a proxy cell. It is
//! implemented once and applies to any record or sequence: the proxy keeps
//! the exact shape of its target because every operation it does not
//! override is forwarded unchanged.

use super::{ObjectRef, PropertyKey, Value};
use crate::error::ObjectResult;

/// Interception table for a proxy object.
///
/// Each method receives the proxied target. The default implementations
/// forward to the target with standard semantics.
pub trait ProxyHandler: Send + Sync {
    /// Intercept a property read.
    fn get(&self, target: &ObjectRef, key: &PropertyKey) -> ObjectResult<Value> {
        target.get(key)
    }

    /// Intercept a property write.
    fn set(&self, target: &ObjectRef, key: PropertyKey, value: Value) -> ObjectResult<()> {
        target.set(key, value)
    }

    fn has_own(&self, target: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
        target.has_own(key)
    }

    fn delete(&self, target: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
        target.delete(key)
    }

    fn own_keys(&self, target: &ObjectRef) -> ObjectResult<Vec<PropertyKey>> {
        target.own_keys()
    }
}
