//! Hashable values: set elements and mapping keys.
//!
//! Only scalars may be hashed. Containers are mutable through shared
//! handles, so their hash could change while they sit inside a set; a
//! [`Value`] holding a list, set, or dict is therefore rejected with
//! [`Error::Unhashable`] when converted into a [`Key`].
//!
//! ```rust
//! use serde_persist::{Key, Value};
//!
//! assert_eq!(Key::try_from(Value::from("name")).unwrap(), Key::from("name"));
//! assert!(Key::try_from(Value::list(vec![])).is_err());
//! ```

use crate::identity::ObjectId;
use crate::{Error, Result, Value};
use num_bigint::BigInt;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A hashable scalar.
///
/// Floats hash and compare by bit pattern, so `NaN` can be used as a key and
/// `0.0` and `-0.0` are distinct keys. Values of different variants are never
/// equal; the `From` conversions keep integers that fit an `i64` in
/// [`Key::Int`].
#[derive(Clone, Debug)]
pub enum Key {
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Float(f64),
    Str(Rc<str>),
}

impl Key {
    /// The shared allocation behind a string key.
    #[must_use]
    pub fn id(&self) -> Option<ObjectId> {
        match self {
            Key::Str(s) => Some(ObjectId::of(s)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Int(a), Key::Int(b)) => a == b,
            (Key::BigInt(a), Key::BigInt(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a.to_bits() == b.to_bits(),
            (Key::Str(a), Key::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Bool(b) => b.hash(state),
            Key::Int(i) => i.hash(state),
            Key::BigInt(bi) => bi.hash(state),
            Key::Float(f) => f.to_bits().hash(state),
            Key::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{}", b),
            Key::Int(i) => write!(f, "{}", i),
            Key::BigInt(bi) => write!(f, "{}", bi),
            Key::Float(x) => write!(f, "{:?}", x),
            Key::Str(s) => write!(f, "{:?}", &**s),
        }
    }
}

impl TryFrom<Value> for Key {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Int(i) => Ok(Key::Int(i)),
            Value::BigInt(bi) => Ok(Key::from(bi)),
            Value::Float(f) => Ok(Key::Float(f)),
            Value::Str(s) => Ok(Key::Str(s)),
            other => Err(Error::unhashable(other.kind().tag())),
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Bool(b) => Value::Bool(b),
            Key::Int(i) => Value::Int(i),
            Key::BigInt(bi) => Value::BigInt(bi),
            Key::Float(f) => Value::Float(f),
            Key::Str(s) => Value::Str(s),
        }
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        Key::Float(value)
    }
}

impl From<BigInt> for Key {
    fn from(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(i) => Key::Int(i),
            Err(_) => Key::BigInt(value),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for Key {
    fn from(value: Rc<str>) -> Self {
        Key::Str(value)
    }
}
