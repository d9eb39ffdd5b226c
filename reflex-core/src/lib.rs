//! Reflex Core
//!
//! This crate provides the core of a transparent reactivity layer. Given a
//! mutable object graph, it produces observable wrappers such that:
//!
//! - reading a property yields reactive wrappers for nested objects, on
//!   demand;
//! - writing a property is classified as an add, a change or a no-op, and
//!   only adds and changes reach the change notifier.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `object`: values, identity-compared object handles and proxies
//! - `reactive`: identity registry, interception handlers and the factory
//! - `config`: runtime tunables
//! - `error`: error types
//!
//! # Example
//!
//! ```rust,ignore
//! use reflex_core::object::{ObjectRef, Value};
//! use reflex_core::reactive::{ChangeLog, Runtime};
//!
//! let log = ChangeLog::new();
//! let runtime = Runtime::builder().notifier(log.clone()).build();
//!
//! let todos = ObjectRef::sequence_from(["write docs"]);
//! let reactive = runtime.reactive_object(&todos);
//!
//! // One add for index 1; the follow-up `length` write changes nothing.
//! reactive.push("ship it")?;
//! assert_eq!(log.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod object;
pub mod reactive;

pub use config::RuntimeConfig;
pub use error::{ConfigError, ObjectError, ObjectResult};
pub use object::{ObjectRef, PropertyKey, Value};
pub use reactive::{Change, ChangeNotifier, DependencyTracker, OperationKind, Runtime};
