//! Reactive Objects
//!
//! This module turns plain object graphs into observable ones. Reads through
//! a reactive wrapper hand out wrappers for nested objects; writes are
//! classified so that only genuine changes reach the change notifier.
//!
//! # Concepts
//!
//! ## Identity Registry
//!
//! Every raw object has at most one wrapper per runtime. The registry maps
//! raw objects to wrappers and back, by identity, so wrapping is never
//! repeated and never shared between unrelated objects with equal contents.
//!
//! ## Interception Handlers
//!
//! A single proxy handler implements the read and write traps for records
//! and sequences alike.
//!
//! ## Factory
//!
//! [`Runtime::reactive`] is the entry point. It is idempotent: wrapping a
//! raw object twice, or wrapping a wrapper, returns the same wrapper.
//!
//! # Implementation Notes
//!
//! Raw storage never holds wrappers. The write trap unwraps incoming values,
//! which keeps the raw graph consistent for code that holds raw references
//! directly, and means nested wrappers are always recreated from the raw
//! value on the next read (through the registry, so identity is preserved).

mod handlers;
mod notifier;
mod registry;
mod runtime;

pub use notifier::{
    Change, ChangeLog, ChangeNotifier, DependencyTracker, NoopTracker, OperationKind, TracingNotifier,
};
pub use registry::IdentityRegistry;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeId};
