//! The closed value model.
//!
//! This module provides the [`Value`] enum, the only thing the encoders and
//! decoders know how to persist, and the [`List`] container handle.
//!
//! ## Core Types
//!
//! - [`Value`]: booleans, integers, floats, strings, lists, sets, and dicts
//! - [`Kind`]: the wire classification of a value (`bool`, `int`, `float`, `str`, `list`, `set`, `dict`)
//! - [`List`]: a shared, mutable sequence handle
//!
//! ## Sharing and Cycles
//!
//! Containers are reference-counted handles. Cloning a `Value` clones the
//! handle, so the clone and the original are the *same object*:
//!
//! ```rust
//! use serde_persist::{List, Value};
//!
//! let inner = Value::list(vec![Value::from(1)]);
//! let outer = Value::list(vec![inner.clone(), inner.clone()]);
//!
//! let items = outer.as_list().unwrap().to_vec();
//! assert!(items[0].same_object(&items[1]));
//! ```
//!
//! A list can hold itself. Such a graph leaks unless the cycle is broken:
//!
//! ```rust
//! use serde_persist::{List, Value};
//!
//! let list = List::new();
//! list.push(Value::from("word"));
//! list.push(Value::List(list.clone()));
//! assert!(Value::List(list.clone()).contains_cycle());
//! list.clear();
//! ```
//!
//! ### Converting from Rust Types
//!
//! ```rust
//! use serde_persist::{to_value, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let value: Value = to_value(&Point { x: 10, y: 20 }).unwrap();
//! assert_eq!(value.as_dict().map(|d| d.len()), Some(2));
//! ```

use crate::identity::ObjectId;
use crate::{Dict, Key, Result, Set};
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Any value that can be persisted.
///
/// Integers that fit an `i64` are always held as [`Value::Int`]; only larger
/// magnitudes use [`Value::BigInt`]. Both are the `int` kind on the wire.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Float(f64),
    Str(Rc<str>),
    List(List),
    Set(Set),
    Dict(Dict),
}

/// The closed set of kinds a value may have.
///
/// # Examples
///
/// ```rust
/// use serde_persist::{Kind, Value};
///
/// assert_eq!(Value::from(3).kind(), Kind::Int);
/// assert_eq!(Kind::from_tag("dict"), Some(Kind::Dict));
/// assert_eq!(Kind::from_tag("alias"), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Str,
    List,
    Set,
    Dict,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::Bool,
        Kind::Int,
        Kind::Float,
        Kind::Str,
        Kind::List,
        Kind::Set,
        Kind::Dict,
    ];

    /// The tag written in the first field of a record.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::List => "list",
            Kind::Set => "set",
            Kind::Dict => "dict",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Returns `true` for lists, sets, and dicts.
    #[inline]
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Kind::List | Kind::Set | Kind::Dict)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A shared, mutable, ordered sequence of values.
///
/// `List` is a handle: clones refer to the same underlying vector.
#[derive(Clone, Default)]
pub struct List(Rc<RefCell<Vec<Value>>>);

impl List {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        List(Rc::new(RefCell::new(Vec::with_capacity(capacity))))
    }

    #[must_use]
    pub fn from_vec(items: Vec<Value>) -> Self {
        List(Rc::new(RefCell::new(items)))
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    /// Returns a handle to the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Removes every element, breaking any cycle that runs through this list.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// A snapshot of the element handles.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Vec<Value>> {
        self.0.borrow_mut()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &List) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        ObjectId::of(&self.0)
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(&Value::List(self.clone()), f, &mut Vec::new())
    }
}

impl FromIterator<Value> for List {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        List::from_vec(iter.into_iter().collect())
    }
}

impl Value {
    /// Creates a string value with a fresh identity.
    #[must_use]
    pub fn str(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    /// Creates a list value from its elements.
    #[must_use]
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(List::from_vec(items))
    }

    /// Creates a set value, collapsing duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Unhashable`] if an element is a container.
    pub fn set<I>(items: I) -> Result<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        let set = Set::new();
        for item in items {
            set.insert(Key::try_from(item)?);
        }
        Ok(Value::Set(set))
    }

    /// Creates a dict value from key/value pairs; later duplicates win.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Unhashable`] if a key is a container.
    pub fn dict<I>(entries: I) -> Result<Value>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let dict = Dict::new();
        for (key, value) in entries {
            dict.insert(Key::try_from(key)?, value);
        }
        Ok(Value::Dict(dict))
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) | Value::BigInt(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::List(_) => Kind::List,
            Value::Set(_) => Kind::Set,
            Value::Dict(_) => Kind::Dict,
        }
    }

    /// The identity of the shared allocation behind this value.
    ///
    /// Strings and containers have identity. Booleans and numbers are plain
    /// data and return `None`: every occurrence is its own object.
    #[must_use]
    pub fn id(&self) -> Option<ObjectId> {
        match self {
            Value::Bool(_) | Value::Int(_) | Value::BigInt(_) | Value::Float(_) => None,
            Value::Str(s) => Some(ObjectId::of(s)),
            Value::List(list) => Some(list.id()),
            Value::Set(set) => Some(set.id()),
            Value::Dict(dict) => Some(dict.id()),
        }
    }

    /// Returns `true` if both values are the same object, not merely equal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_persist::Value;
    ///
    /// let a = Value::str("word");
    /// let b = Value::str("word");
    /// assert_eq!(a, b);
    /// assert!(!a.same_object(&b));
    /// assert!(a.same_object(&a.clone()));
    /// ```
    #[must_use]
    pub fn same_object(&self, other: &Value) -> bool {
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Returns `true` if some container can reach itself.
    #[must_use]
    pub fn contains_cycle(&self) -> bool {
        fn visit(value: &Value, path: &mut HashSet<ObjectId>, done: &mut HashSet<ObjectId>) -> bool {
            // Sets and dict keys hold only scalars, so only lists and dict
            // values can lead back to a container.
            let id = match value {
                Value::List(list) => list.id(),
                Value::Dict(dict) => dict.id(),
                _ => return false,
            };
            if path.contains(&id) {
                return true;
            }
            if done.contains(&id) {
                return false;
            }
            path.insert(id);
            let found = match value {
                Value::List(list) => list.borrow().iter().any(|item| visit(item, path, done)),
                Value::Dict(dict) => dict.borrow().values().any(|item| visit(item, path, done)),
                _ => false,
            };
            path.remove(&id);
            done.insert(id);
            found
        }

        visit(self, &mut HashSet::new(), &mut HashSet::new())
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Value::Set(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an integer that fits an `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_persist::Value;
    ///
    /// assert_eq!(Value::from(42).as_i64(), Some(42));
    /// assert_eq!(Value::from(42.0).as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::BigInt(bi) => i64::try_from(bi).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::Int(i) => Some(BigInt::from(*i)),
            Value::BigInt(bi) => Some(bi.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Structural equality.
    ///
    /// Two handles to the same container are equal without looking inside,
    /// so a cyclic graph compares equal to itself. Comparing two distinct
    /// cyclic graphs does not terminate.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Int(a), Value::BigInt(b)) | (Value::BigInt(b), Value::Int(a)) => {
                BigInt::from(*a) == *b
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            _ => false,
        }
    }
}

// Renders Python-like literals. `open` holds the containers currently being
// printed; reaching one again prints an ellipsis instead of recursing.
pub(crate) fn render(
    value: &Value,
    f: &mut fmt::Formatter<'_>,
    open: &mut Vec<ObjectId>,
) -> fmt::Result {
    match value {
        Value::Bool(b) => write!(f, "{}", b),
        Value::Int(i) => write!(f, "{}", i),
        Value::BigInt(bi) => write!(f, "{}", bi),
        Value::Float(x) => write!(f, "{:?}", x),
        Value::Str(s) => write!(f, "{:?}", &**s),
        Value::List(list) => {
            if open.contains(&list.id()) {
                return f.write_str("[...]");
            }
            open.push(list.id());
            f.write_str("[")?;
            for (i, item) in list.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                render(item, f, open)?;
            }
            open.pop();
            f.write_str("]")
        }
        Value::Set(set) => {
            if set.is_empty() {
                return f.write_str("set()");
            }
            f.write_str("{")?;
            for (i, key) in set.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", key)?;
            }
            f.write_str("}")
        }
        Value::Dict(dict) => {
            if open.contains(&dict.id()) {
                return f.write_str("{...}");
            }
            open.push(dict.id());
            f.write_str("{")?;
            for (i, (key, item)) in dict.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: ", key)?;
                render(item, f, open)?;
            }
            open.pop();
            f.write_str("}")
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, f, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, f, &mut Vec::new())
    }
}

/// Serializes an acyclic value into any serde data format.
///
/// A cyclic value fails with a custom serializer error instead of recursing
/// without bound.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.contains_cycle() {
            return Err(serde::ser::Error::custom(
                "cyclic value cannot be serialized through serde",
            ));
        }
        Acyclic(self).serialize(serializer)
    }
}

struct Acyclic<'a>(&'a Value);

impl Serialize for Acyclic<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self.0 {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::BigInt(bi) => match i128::try_from(bi) {
                Ok(i) => serializer.serialize_i128(i),
                Err(_) => serializer.serialize_str(&bi.to_string()),
            },
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(list) => {
                let items = list.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&Acyclic(item))?;
                }
                seq.end()
            }
            Value::Set(set) => {
                let keys = set.borrow();
                let mut seq = serializer.serialize_seq(Some(keys.len()))?;
                for key in keys.iter() {
                    seq.serialize_element(&Acyclic(&Value::from(key.clone())))?;
                }
                seq.end()
            }
            Value::Dict(dict) => {
                let entries = dict.borrow();
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries.iter() {
                    map.serialize_entry(&Acyclic(&Value::from(key.clone())), &Acyclic(item))?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a boolean, number, string, sequence, or map")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Value, E> {
                Ok(Value::from(BigInt::from(value)))
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Value, E> {
                Ok(Value::from(BigInt::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::str(value))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let list = List::new();
                while let Some(elem) = seq.next_element()? {
                    list.push(elem);
                }
                Ok(Value::List(list))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let dict = Dict::new();
                while let Some((key, value)) = map.next_entry::<Value, Value>()? {
                    let key = Key::try_from(key).map_err(de::Error::custom)?;
                    dict.insert(key, value);
                }
                Ok(Value::Dict(dict))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

// TryFrom implementations for extracting scalars from a Value
impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| crate::Error::custom(format!("expected integer, found {}", value)))
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            _ => Err(crate::Error::custom(format!(
                "expected number, found {}",
                value
            ))),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| crate::Error::custom(format!("expected bool, found {}", value)))
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            _ => Err(crate::Error::custom(format!(
                "expected string, found {}",
                value
            ))),
        }
    }
}

// From implementations for creating a Value from primitives
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::BigInt(BigInt::from(value)),
        }
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::BigInt(value),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Rc::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::str(value)
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::list(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl From<Set> for Value {
    fn from(value: Set) -> Self {
        Value::Set(value)
    }
}

impl From<Dict> for Value {
    fn from(value: Dict) -> Self {
        Value::Dict(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(Kind::from_tag("tuple"), None);
        assert!(Kind::Set.is_composite());
        assert!(!Kind::Str.is_composite());
    }

    #[test]
    fn test_bigint_kind_is_int() {
        let huge = Value::from(u64::MAX);
        assert!(matches!(huge, Value::BigInt(_)));
        assert_eq!(huge.kind(), Kind::Int);
        assert_eq!(huge.as_i64(), None);
        assert_eq!(Value::from(BigInt::from(7)), Value::Int(7));
        assert_eq!(Value::Int(7), Value::BigInt(BigInt::from(7)));
    }

    #[test]
    fn test_scalars_have_no_identity() {
        assert_eq!(Value::from(1).id(), None);
        assert!(!Value::from(true).same_object(&Value::from(true)));
    }

    #[test]
    fn test_clone_shares_container() {
        let list = Value::list(vec![Value::from(1)]);
        let alias = list.clone();
        alias.as_list().unwrap().push(Value::from(2));
        assert_eq!(list.as_list().unwrap().len(), 2);
        assert!(list.same_object(&alias));
    }

    #[test]
    fn test_self_containing_list_renders_and_compares() {
        let list = List::new();
        list.push(Value::from("word"));
        list.push(Value::List(list.clone()));
        let value = Value::List(list.clone());

        assert_eq!(value.to_string(), r#"["word", [...]]"#);
        assert_eq!(value, value.clone());
        assert!(value.contains_cycle());
        list.clear();
    }

    #[test]
    fn test_shared_but_acyclic_is_not_a_cycle() {
        let inner = Value::list(vec![]);
        let outer = Value::list(vec![inner.clone(), inner]);
        assert!(!outer.contains_cycle());
    }

    #[test]
    fn test_set_requires_hashable_elements() {
        assert!(Value::set(vec![Value::from(1), Value::from(1)]).is_ok());
        assert!(Value::set(vec![Value::list(vec![])]).is_err());
        let set = Value::set(vec![Value::from(1), Value::from(1)]).unwrap();
        assert_eq!(set.as_set().unwrap().len(), 1);
    }

    #[test]
    fn test_display_of_containers() {
        let dict = Value::dict(vec![(Value::from("a"), Value::from(1.5))]).unwrap();
        assert_eq!(dict.to_string(), r#"{"a": 1.5}"#);
        assert_eq!(Value::set(Vec::new()).unwrap().to_string(), "set()");
    }

    #[test]
    fn test_tryfrom_scalars() {
        assert_eq!(i64::try_from(Value::from(42)).unwrap(), 42);
        assert_eq!(f64::try_from(Value::from(2)).unwrap(), 2.0);
        assert!(bool::try_from(Value::from(1)).is_err());
        assert_eq!(String::try_from(Value::from("hi")).unwrap(), "hi");
    }

    #[test]
    fn test_serialize_rejects_cycles() {
        let list = List::new();
        list.push(Value::List(list.clone()));
        assert!(serde_json::to_string(&Value::List(list.clone())).is_err());
        list.clear();
    }

    #[test]
    fn test_serde_json_interop() {
        let value: Value = serde_json::from_str(r#"{"name": "Alice", "tags": [1, 2.5, true]}"#).unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(dict.get("name"), Some(Value::from("Alice")));
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
