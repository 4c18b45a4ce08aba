//! Hash-based container handles: [`Dict`] and [`Set`].
//!
//! Both wrap an [`indexmap`] collection behind a shared `Rc<RefCell<..>>`,
//! so that several positions of a value graph can refer to the same
//! container and a dict can (through its values) contain itself.
//!
//! ## Why IndexMap?
//!
//! Insertion order is not part of the format, but keeping it makes the
//! written stream deterministic for a given graph, which keeps tests and
//! diffs of persisted files readable.
//!
//! ## Examples
//!
//! ```rust
//! use serde_persist::{Dict, Key, Value};
//!
//! let dict = Dict::new();
//! dict.insert(Key::from("name"), Value::from("Alice"));
//! dict.insert(Key::from("age"), Value::from(30));
//!
//! assert_eq!(dict.len(), 2);
//! assert_eq!(dict.get("name").and_then(|v| v.as_str().map(String::from)), Some("Alice".to_string()));
//! ```

use crate::identity::ObjectId;
use crate::value::render;
use crate::{Key, Value};
use indexmap::{IndexMap, IndexSet};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A shared, mutable mapping from hashable keys to values.
///
/// Iteration follows insertion order.
///
/// # Examples
///
/// ```rust
/// use serde_persist::{Dict, Key, Value};
///
/// let dict = Dict::new();
/// dict.insert(Key::from("first"), Value::from(1));
/// dict.insert(Key::from("second"), Value::from(2));
///
/// let keys: Vec<_> = dict.keys().into_iter().map(|k| k.to_string()).collect();
/// assert_eq!(keys, vec!["\"first\"", "\"second\""]);
/// ```
#[derive(Clone, Default)]
pub struct Dict(Rc<RefCell<IndexMap<Key, Value>>>);

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Dict(Rc::new(RefCell::new(IndexMap::with_capacity(capacity))))
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    pub fn insert(&self, key: Key, value: Value) -> Option<Value> {
        self.0.borrow_mut().insert(key, value)
    }

    /// Returns a handle to the value stored under `key`.
    #[must_use]
    pub fn get<K: Into<Key>>(&self, key: K) -> Option<Value> {
        self.0.borrow().get(&key.into()).cloned()
    }

    #[must_use]
    pub fn contains_key<K: Into<Key>>(&self, key: K) -> bool {
        self.0.borrow().contains_key(&key.into())
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove<K: Into<Key>>(&self, key: K) -> Option<Value> {
        self.0.borrow_mut().shift_remove(&key.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Removes every entry, breaking any cycle that runs through this dict.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.0.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().values().cloned().collect()
    }

    /// A snapshot of the entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.0
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn borrow(&self) -> Ref<'_, IndexMap<Key, Value>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, IndexMap<Key, Value>> {
        self.0.borrow_mut()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Dict) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        ObjectId::of(&self.0)
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(&Value::Dict(self.clone()), f, &mut Vec::new())
    }
}

impl From<HashMap<Key, Value>> for Dict {
    fn from(map: HashMap<Key, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<IndexMap<Key, Value>> for Dict {
    fn from(map: IndexMap<Key, Value>) -> Self {
        Dict(Rc::new(RefCell::new(map)))
    }
}

impl FromIterator<(Key, Value)> for Dict {
    fn from_iter<T: IntoIterator<Item = (Key, Value)>>(iter: T) -> Self {
        let map: IndexMap<Key, Value> = iter.into_iter().collect();
        Dict::from(map)
    }
}

/// A shared, mutable set of hashable values.
///
/// # Examples
///
/// ```rust
/// use serde_persist::{Key, Set};
///
/// let set = Set::new();
/// assert!(set.insert(Key::from(1)));
/// assert!(!set.insert(Key::from(1)));
/// assert!(set.contains(1));
/// ```
#[derive(Clone, Default)]
pub struct Set(Rc<RefCell<IndexSet<Key>>>);

impl Set {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Set(Rc::new(RefCell::new(IndexSet::with_capacity(capacity))))
    }

    /// Adds `key`, returning `false` if it was already present.
    pub fn insert(&self, key: Key) -> bool {
        self.0.borrow_mut().insert(key)
    }

    #[must_use]
    pub fn contains<K: Into<Key>>(&self, key: K) -> bool {
        self.0.borrow().contains(&key.into())
    }

    pub fn remove<K: Into<Key>>(&self, key: K) -> bool {
        self.0.borrow_mut().shift_remove(&key.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// A snapshot of the elements, in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Key> {
        self.0.borrow().iter().cloned().collect()
    }

    pub fn borrow(&self) -> Ref<'_, IndexSet<Key>> {
        self.0.borrow()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Set) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        ObjectId::of(&self.0)
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(&Value::Set(self.clone()), f, &mut Vec::new())
    }
}

impl FromIterator<Key> for Set {
    fn from_iter<T: IntoIterator<Item = Key>>(iter: T) -> Self {
        let set: IndexSet<Key> = iter.into_iter().collect();
        Set(Rc::new(RefCell::new(set)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_equality_ignores_order() {
        let a: Dict = vec![(Key::from("x"), Value::from(1)), (Key::from("y"), Value::from(2))]
            .into_iter()
            .collect();
        let b: Dict = vec![(Key::from("y"), Value::from(2)), (Key::from("x"), Value::from(1))]
            .into_iter()
            .collect();
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_dict_can_hold_itself() {
        let dict = Dict::new();
        dict.insert(Key::from("self"), Value::Dict(dict.clone()));
        let inner = dict.get("self").unwrap();
        assert!(inner.same_object(&Value::Dict(dict.clone())));
        assert_eq!(format!("{:?}", dict), r#"{"self": {...}}"#);
        dict.clear();
    }

    #[test]
    fn test_remove_keeps_order() {
        let dict = Dict::new();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            dict.insert(Key::from(*name), Value::from(i as i64));
        }
        assert_eq!(dict.remove("b"), Some(Value::from(1)));
        assert_eq!(dict.keys(), vec![Key::from("a"), Key::from("c")]);
    }

    #[test]
    fn test_set_membership() {
        let set: Set = vec![Key::from("a"), Key::from(2), Key::from("a")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
        assert!(set.remove(2));
        assert!(!set.contains(2));
    }

    #[test]
    fn test_from_hash_map() {
        let mut map = HashMap::new();
        map.insert(Key::from("k"), Value::from(true));
        let dict = Dict::from(map);
        assert_eq!(dict.get("k"), Some(Value::from(true)));
    }
}
