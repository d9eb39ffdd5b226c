//! Values and Property Keys
//!
//! A [`Value`] is either a primitive or a handle to an object cell. Only
//! objects take part in reactivity; primitives are copied around freely.

use std::fmt;
use std::sync::Arc;

use super::ObjectRef;

/// Name of the length property every sequence owns.
pub const LENGTH: &str = "length";

/// Largest valid sequence length. Indices run from `0` to `MAX_LENGTH - 1`;
/// larger integer keys are plain names.
pub const MAX_LENGTH: usize = u32::MAX as usize;

/// A dynamically typed value.
#[derive(Clone, Default)]
pub enum Value {
    /// The absent value. Reading a missing property yields this.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    /// A record or sequence, possibly behind a proxy.
    Object(ObjectRef),
}

impl Value {
    /// Check whether this value is object-like.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Check whether this value is a primitive (anything but an object).
    pub fn is_primitive(&self) -> bool {
        !self.is_object()
    }

    /// Borrow the object handle, if this is an object.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Take the object handle, if this is an object.
    pub fn into_object(self) -> Option<ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Strict equality.
    ///
    /// Objects compare by identity, never by contents. Numbers follow IEEE
    /// comparison, so `NaN` is unequal to itself and `0.0` equals `-0.0`.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Object(obj) => write!(f, "Object({obj:?})"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Object(obj) if obj.is_sequence() => f.write_str("[sequence]"),
            Value::Object(_) => f.write_str("[record]"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

/// Magnitudes above 2^53 are rounded to the nearest representable `f64`.
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

/// Values above 2^53 are rounded to the nearest representable `f64`.
impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<&ObjectRef> for Value {
    fn from(obj: &ObjectRef) -> Self {
        Value::Object(obj.clone())
    }
}

/// A property key: a sequence index or a name.
///
/// Keys are canonical. A name that spells an index (`"3"`, but not `"03"`)
/// is always represented as [`PropertyKey::Index`], so `"3"` and `3` address
/// the same property. Only integers below [`MAX_LENGTH`] are indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(usize),
    Name(Arc<str>),
}

impl PropertyKey {
    /// The `length` key.
    pub fn length() -> Self {
        PropertyKey::Name(Arc::from(LENGTH))
    }

    pub fn is_length(&self) -> bool {
        matches!(self, PropertyKey::Name(name) if &**name == LENGTH)
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            PropertyKey::Name(_) => None,
        }
    }

    /// The key as a property name, the way records store it.
    pub fn to_name(&self) -> String {
        self.to_string()
    }
}

fn parse_index(name: &str) -> Option<usize> {
    let canonical = name == "0" || (!name.starts_with('0') && !name.is_empty());
    if canonical && name.bytes().all(|b| b.is_ascii_digit()) {
        name.parse().ok().filter(|i| *i < MAX_LENGTH)
    } else {
        None
    }
}

impl From<usize> for PropertyKey {
    fn from(i: usize) -> Self {
        if i < MAX_LENGTH {
            PropertyKey::Index(i)
        } else {
            PropertyKey::Name(Arc::from(i.to_string()))
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        match parse_index(name) {
            Some(i) => PropertyKey::Index(i),
            None => PropertyKey::Name(Arc::from(name)),
        }
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        match parse_index(&name) {
            Some(i) => PropertyKey::Index(i),
            None => PropertyKey::Name(Arc::from(name)),
        }
    }
}

impl From<&PropertyKey> for PropertyKey {
    fn from(key: &PropertyKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Index(i) => write!(f, "{i}"),
            PropertyKey::Name(name) => f.write_str(name),
        }
    }
}
