//! Object Model
//!
//! This module provides the dynamic object model the reactive layer wraps:
//! values, property keys, identity-compared object handles and proxies.
//!
//! # Concepts
//!
//! ## Objects
//!
//! An object is either a record (named properties) or a sequence (indexed
//! elements plus a `length` property). Objects are shared by handle and are
//! never copied implicitly; two handles are the same object only if they
//! point at the same cell.
//!
//! ## Proxies
//!
//! A proxy presents the exact shape of its target while routing every
//! operation through a [`ProxyHandler`]. Sequence helpers such as
//! [`ObjectRef::push`] are written against the standard operations, so they
//! reach the handler exactly the way a hand-written index assignment would.

mod cell;
mod json;
mod proxy;
mod value;

pub use cell::{ObjectId, ObjectRef, WeakObjectRef};
pub use json::MAX_EXPORT_DEPTH;
pub use proxy::ProxyHandler;
pub use value::{PropertyKey, Value, LENGTH, MAX_LENGTH};
