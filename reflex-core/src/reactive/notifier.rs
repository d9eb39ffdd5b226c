//! Collaborator interfaces for the reactive layer.
//!
//! The core decides *whether* a write is observable and *which* reads
//! happened. What to do about it belongs to the surrounding system, which
//! plugs in through [`ChangeNotifier`] and [`DependencyTracker`].

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::object::{ObjectRef, PropertyKey, Value};

/// Classification of an observable write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// The key was not an own property before the write.
    Add,
    /// The key existed and its value changed.
    Set,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Add => f.write_str("add"),
            OperationKind::Set => f.write_str("set"),
        }
    }
}

/// An observable mutation of a raw object.
#[derive(Debug, Clone)]
pub struct Change {
    /// The raw object that was written.
    pub target: ObjectRef,
    pub key: PropertyKey,
    pub kind: OperationKind,
    /// Value before the write. `None` for [`OperationKind::Add`].
    pub old_value: Option<Value>,
    /// Value as stored, i.e. after wrappers were unwrapped.
    pub new_value: Value,
}

/// Receives every write the core classifies as observable.
///
/// Called synchronously from the write trap, after the write landed and
/// with no internal lock held.
pub trait ChangeNotifier: Send + Sync {
    fn notify_change(&self, change: &Change);
}

impl<F> ChangeNotifier for F
where
    F: Fn(&Change) + Send + Sync,
{
    fn notify_change(&self, change: &Change) {
        self(change)
    }
}

/// Told about every property read through a reactive wrapper.
pub trait DependencyTracker: Send + Sync {
    fn track(&self, target: &ObjectRef, key: &PropertyKey);
}

impl<F> DependencyTracker for F
where
    F: Fn(&ObjectRef, &PropertyKey) + Send + Sync,
{
    fn track(&self, target: &ObjectRef, key: &PropertyKey) {
        self(target, key)
    }
}

/// Default notifier: one `tracing` event per change.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl ChangeNotifier for TracingNotifier {
    fn notify_change(&self, change: &Change) {
        tracing::debug!(
            target_id = change.target.id().raw(),
            key = %change.key,
            kind = %change.kind,
            "trigger"
        );
    }
}

/// Default tracker: ignores reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

impl DependencyTracker for NoopTracker {
    fn track(&self, _target: &ObjectRef, _key: &PropertyKey) {}
}

/// In-memory notifier that keeps every change it receives.
///
/// Clones share the same log, so one clone can be handed to a runtime while
/// another is inspected.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Arc<Mutex<Vec<Change>>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded changes, oldest first.
    pub fn changes(&self) -> Vec<Change> {
        self.changes.lock().clone()
    }

    /// Drain the recorded changes.
    pub fn take(&self) -> Vec<Change> {
        std::mem::take(&mut *self.changes.lock())
    }

    /// Kinds and keys only, which is what most assertions care about.
    pub fn summary(&self) -> Vec<(OperationKind, PropertyKey)> {
        self.changes
            .lock()
            .iter()
            .map(|change| (change.kind, change.key.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.changes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.lock().is_empty()
    }

    pub fn clear(&self) {
        self.changes.lock().clear();
    }
}

impl ChangeNotifier for ChangeLog {
    fn notify_change(&self, change: &Change) {
        self.changes.lock().push(change.clone());
    }
}
