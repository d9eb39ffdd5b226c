//! Object Cells
//!
//! An [`ObjectRef`] is a shared handle to an object cell. Handles compare by
//! identity: cloning a handle yields the same object, while two cells with
//! equal contents remain distinct objects.
//!
//! # Cell Kinds
//!
//! - **Plain** cells own their data: a record (insertion-ordered named
//!   properties) or a sequence (indexed elements, possibly with holes, plus a
//!   `length` own property and optional named extras).
//!
//! - **Proxy** cells own nothing but a target handle and a [`ProxyHandler`].
//!   Every standard operation on a proxy is routed through the handler, which
//!   forwards to the target unless it overrides the operation.
//!
//! # Thread Safety
//!
//! Plain data sits behind a `parking_lot::RwLock`. No lock is held while a
//! proxy handler runs, so handlers are free to call back into any object.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::proxy::ProxyHandler;
use super::value::{PropertyKey, Value, MAX_LENGTH};
use crate::error::{ObjectError, ObjectResult};

/// Process-unique identity of an object cell.
///
/// IDs are handed out from a global counter and never reused, so an ID
/// outliving its cell can never be confused with a newer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ObjectCell {
    id: ObjectId,
    kind: CellKind,
}

enum CellKind {
    Plain(RwLock<PlainObject>),
    Proxy {
        target: ObjectRef,
        handler: Arc<dyn ProxyHandler>,
    },
}

struct PlainObject {
    shape: Shape,
    frozen: bool,
}

enum Shape {
    Record(IndexMap<String, Value>),
    /// Elements are stored sparsely: holes have no slot, and `len` is
    /// tracked separately so a large `length` costs nothing.
    Sequence {
        items: BTreeMap<usize, Value>,
        len: usize,
        named: IndexMap<String, Value>,
    },
}

/// Shared handle to a record, sequence or proxy.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectCell>);

/// Non-owning handle to an object cell.
#[derive(Clone)]
pub struct WeakObjectRef(Weak<ObjectCell>);

impl WeakObjectRef {
    /// Get a strong handle if the object is still alive.
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }

    /// Whether the object still has a strong handle somewhere.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(obj) => write!(f, "Weak({obj:?})"),
            None => f.write_str("Weak(<dropped>)"),
        }
    }
}

impl ObjectRef {
    fn plain(shape: Shape) -> Self {
        Self(Arc::new(ObjectCell {
            id: ObjectId::next(),
            kind: CellKind::Plain(RwLock::new(PlainObject {
                shape,
                frozen: false,
            })),
        }))
    }

    /// Create an empty record.
    pub fn record() -> Self {
        Self::plain(Shape::Record(IndexMap::new()))
    }

    /// Create a record from `(name, value)` pairs.
    ///
    /// Names are canonicalized like any other key, so index-like names are
    /// stored in their decimal form.
    pub fn record_from<K, V, I>(entries: I) -> Self
    where
        K: Into<PropertyKey>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map = entries
            .into_iter()
            .map(|(key, value)| {
                let key: PropertyKey = key.into();
                (key.to_name(), value.into())
            })
            .collect();
        Self::plain(Shape::Record(map))
    }

    /// Create an empty sequence.
    pub fn sequence() -> Self {
        Self::sequence_from(Vec::<Value>::new())
    }

    /// Create a dense sequence from the given elements.
    pub fn sequence_from<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let items: BTreeMap<usize, Value> = items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i, v.into()))
            .collect();
        Self::plain(Shape::Sequence {
            len: items.len(),
            items,
            named: IndexMap::new(),
        })
    }

    /// Create a proxy whose operations are routed through `handler`.
    pub fn proxy(target: ObjectRef, handler: Arc<dyn ProxyHandler>) -> Self {
        Self(Arc::new(ObjectCell {
            id: ObjectId::next(),
            kind: CellKind::Proxy { target, handler },
        }))
    }

    /// Get this object's identity.
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Get a non-owning handle to this object.
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Arc::downgrade(&self.0))
    }

    /// Whether this handle is a proxy rather than plain data.
    pub fn is_proxy(&self) -> bool {
        matches!(self.0.kind, CellKind::Proxy { .. })
    }

    /// The proxied target, if this is a proxy.
    pub fn proxy_target(&self) -> Option<&ObjectRef> {
        match &self.0.kind {
            CellKind::Proxy { target, .. } => Some(target),
            CellKind::Plain(_) => None,
        }
    }

    /// Whether this object (or the object it proxies) is a sequence.
    pub fn is_sequence(&self) -> bool {
        match &self.0.kind {
            CellKind::Plain(data) => matches!(data.read().shape, Shape::Sequence { .. }),
            CellKind::Proxy { target, .. } => target.is_sequence(),
        }
    }

    /// Read a property. Missing properties read as [`Value::Undefined`].
    pub fn get(&self, key: impl Into<PropertyKey>) -> ObjectResult<Value> {
        let key = key.into();
        match &self.0.kind {
            CellKind::Plain(data) => Ok(data.read().get(&key)),
            CellKind::Proxy { target, handler } => handler.get(target, &key),
        }
    }

    /// Assign a property.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> ObjectResult<()> {
        let key = key.into();
        let value = value.into();
        match &self.0.kind {
            CellKind::Plain(data) => data.write().set(key, value),
            CellKind::Proxy { target, handler } => handler.set(target, key, value),
        }
    }

    /// Check for an own property. Sequence holes are not own properties.
    pub fn has_own(&self, key: impl Into<PropertyKey>) -> ObjectResult<bool> {
        let key = key.into();
        match &self.0.kind {
            CellKind::Plain(data) => Ok(data.read().has_own(&key)),
            CellKind::Proxy { target, handler } => handler.has_own(target, &key),
        }
    }

    /// Remove an own property. Returns `false` if the property cannot be
    /// removed (a sequence's `length`).
    pub fn delete(&self, key: impl Into<PropertyKey>) -> ObjectResult<bool> {
        let key = key.into();
        match &self.0.kind {
            CellKind::Plain(data) => data.write().delete(key),
            CellKind::Proxy { target, handler } => handler.delete(target, &key),
        }
    }

    /// List own keys: indices in ascending order, then `length` for
    /// sequences, then names in insertion order.
    pub fn own_keys(&self) -> ObjectResult<Vec<PropertyKey>> {
        match &self.0.kind {
            CellKind::Plain(data) => Ok(data.read().own_keys()),
            CellKind::Proxy { target, handler } => handler.own_keys(target),
        }
    }

    /// Prevent any further writes or deletes.
    pub fn freeze(&self) {
        match &self.0.kind {
            CellKind::Plain(data) => data.write().frozen = true,
            CellKind::Proxy { target, .. } => target.freeze(),
        }
    }

    /// Whether [`freeze`](Self::freeze) was applied to this object.
    pub fn is_frozen(&self) -> bool {
        match &self.0.kind {
            CellKind::Plain(data) => data.read().frozen,
            CellKind::Proxy { target, .. } => target.is_frozen(),
        }
    }

    /// Read `length` through [`get`](Self::get).
    pub fn length(&self) -> ObjectResult<usize> {
        if !self.is_sequence() {
            return Err(ObjectError::NotASequence);
        }
        let value = self.get(PropertyKey::length())?;
        to_length(&value)
    }

    /// Append an element, returning the new length.
    ///
    /// Implemented in terms of [`get`](Self::get) and [`set`](Self::set):
    /// the element is assigned at index `length`, then `length` is assigned
    /// explicitly. On a proxy both assignments reach the handler.
    pub fn push(&self, value: impl Into<Value>) -> ObjectResult<usize> {
        let len = self.length()?;
        self.set(PropertyKey::Index(len), value)?;
        self.set(PropertyKey::length(), len + 1)?;
        Ok(len + 1)
    }

    /// Remove and return the last element.
    ///
    /// Reads the element, deletes its index, then assigns the shortened
    /// `length`. Popping an empty sequence still assigns `length = 0`.
    pub fn pop(&self) -> ObjectResult<Value> {
        let len = self.length()?;
        if len == 0 {
            self.set(PropertyKey::length(), 0usize)?;
            return Ok(Value::Undefined);
        }
        let last = PropertyKey::Index(len - 1);
        let value = self.get(&last)?;
        self.delete(last)?;
        self.set(PropertyKey::length(), len - 1)?;
        Ok(value)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            CellKind::Plain(data) => {
                let kind = match data.read().shape {
                    Shape::Record(_) => "record",
                    Shape::Sequence { .. } => "sequence",
                };
                write!(f, "{}:{}", kind, self.0.id)
            }
            CellKind::Proxy { target, .. } => write!(f, "proxy:{}->{:?}", self.0.id, target),
        }
    }
}

fn to_length(value: &Value) -> ObjectResult<usize> {
    match value {
        Value::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= MAX_LENGTH as f64 => {
            Ok(*n as usize)
        }
        other => Err(ObjectError::InvalidLength {
            value: format!("{other}"),
        }),
    }
}

/// Sequences treat indices at or past [`MAX_LENGTH`] as ordinary names.
fn sequence_key(key: &PropertyKey) -> PropertyKey {
    match key {
        PropertyKey::Index(i) if *i >= MAX_LENGTH => PropertyKey::Name(Arc::from(i.to_string())),
        other => other.clone(),
    }
}

impl PlainObject {
    fn get(&self, key: &PropertyKey) -> Value {
        match (&self.shape, sequence_key(key)) {
            (Shape::Record(map), key) => map.get(&key.to_name()).cloned().unwrap_or_default(),
            (Shape::Sequence { items, .. }, PropertyKey::Index(i)) => {
                items.get(&i).cloned().unwrap_or_default()
            }
            (Shape::Sequence { len, .. }, key) if key.is_length() => Value::from(*len),
            (Shape::Sequence { named, .. }, PropertyKey::Name(name)) => {
                named.get(&*name).cloned().unwrap_or_default()
            }
        }
    }

    fn has_own(&self, key: &PropertyKey) -> bool {
        match (&self.shape, sequence_key(key)) {
            (Shape::Record(map), key) => map.contains_key(&key.to_name()),
            (Shape::Sequence { items, .. }, PropertyKey::Index(i)) => items.contains_key(&i),
            (Shape::Sequence { .. }, key) if key.is_length() => true,
            (Shape::Sequence { named, .. }, PropertyKey::Name(name)) => named.contains_key(&*name),
        }
    }

    fn set(&mut self, key: PropertyKey, value: Value) -> ObjectResult<()> {
        if self.frozen {
            return Err(ObjectError::Frozen { key });
        }
        match (&mut self.shape, sequence_key(&key)) {
            (Shape::Record(map), key) => {
                map.insert(key.to_name(), value);
            }
            (Shape::Sequence { items, len, .. }, PropertyKey::Index(i)) => {
                // `i < MAX_LENGTH`, so this cannot overflow.
                *len = (*len).max(i + 1);
                items.insert(i, value);
            }
            (Shape::Sequence { items, len, .. }, key) if key.is_length() => {
                let new_len = to_length(&value)?;
                drop(items.split_off(&new_len));
                *len = new_len;
            }
            (Shape::Sequence { named, .. }, PropertyKey::Name(name)) => {
                named.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    fn delete(&mut self, key: PropertyKey) -> ObjectResult<bool> {
        if self.frozen {
            return Err(ObjectError::Frozen { key });
        }
        let removed = match (&mut self.shape, sequence_key(&key)) {
            (Shape::Record(map), key) => {
                map.shift_remove(&key.to_name());
                true
            }
            (Shape::Sequence { items, .. }, PropertyKey::Index(i)) => {
                items.remove(&i);
                true
            }
            (Shape::Sequence { .. }, key) if key.is_length() => false,
            (Shape::Sequence { named, .. }, PropertyKey::Name(name)) => {
                named.shift_remove(&*name);
                true
            }
        };
        Ok(removed)
    }

    fn own_keys(&self) -> Vec<PropertyKey> {
        match &self.shape {
            Shape::Record(map) => map.keys().map(|name| PropertyKey::from(name.as_str())).collect(),
            Shape::Sequence { items, named, .. } => items
                .keys()
                .map(|i| PropertyKey::Index(*i))
                .chain(std::iter::once(PropertyKey::length()))
                .chain(named.keys().map(|name| PropertyKey::from(name.as_str())))
                .collect(),
        }
    }
}
