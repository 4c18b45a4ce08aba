//! Object identity tracking for the identity-aware format.
//!
//! The write side maps each distinct object (a shared string or container
//! allocation) to a [`Token`] the first time the encoder reaches it. The read
//! side maps tokens back to the objects rebuilt from the stream.
//!
//! Both tables live for exactly one top-level call.

use crate::{Error, Result, Value};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A per-stream identifier for one written object.
///
/// Tokens are handed out in first-sight order starting at 1, so a valid
/// alias always names a token smaller than or equal to the last one written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

impl Token {
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Token(raw)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity of a live shared allocation.
///
/// Derived from the address of an `Rc` allocation. It is only meaningful
/// while that allocation is alive; once it is dropped the address can be
/// handed to a new object. [`WriteTable`] keeps every object it has seen
/// alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Returns the identity of the allocation behind `rc`.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        ObjectId(Rc::as_ptr(rc).cast::<()>() as usize)
    }
}

/// Write-side table: objects already emitted in full.
///
/// # Examples
///
/// ```rust
/// use serde_persist::identity::WriteTable;
/// use serde_persist::Value;
///
/// let word = Value::str("word");
///
/// let mut table = WriteTable::new();
/// let (first, seen) = table.mark_and_check(&word);
/// assert!(!seen);
/// let (again, seen) = table.mark_and_check(&word.clone());
/// assert!(seen);
/// assert_eq!(first, again);
///
/// // Numbers have no identity and are never reported as seen.
/// assert!(!table.mark_and_check(&Value::from(1)).1);
/// ```
#[derive(Debug, Default)]
pub struct WriteTable {
    // The handle pins the allocation, so its address is not reused while
    // the table lives.
    seen: HashMap<ObjectId, (Token, Value)>,
    next: u64,
}

impl WriteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a token that no other object will ever receive.
    ///
    /// Used for booleans and numbers, which have no identity of their own.
    pub fn fresh_token(&mut self) -> Token {
        self.next += 1;
        Token(self.next)
    }

    /// Looks `value` up, assigning it a new token on first sight.
    ///
    /// Returns the object's token and whether it had been seen before. A
    /// repeat sighting leaves the table untouched. Values without identity
    /// always get a fresh token.
    pub fn mark_and_check(&mut self, value: &Value) -> (Token, bool) {
        let id = match value.id() {
            Some(id) => id,
            None => return (self.fresh_token(), false),
        };
        if let Some((token, _)) = self.seen.get(&id) {
            return (*token, true);
        }
        let token = self.fresh_token();
        self.seen.insert(id, (token, value.clone()));
        (token, false)
    }

    /// Number of distinct objects recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Read-side table: tokens mapped to the objects rebuilt from the stream.
#[derive(Debug, Default)]
pub struct ReadTable {
    objects: HashMap<Token, Value>,
}

impl ReadTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` under `token`.
    ///
    /// Containers must be registered while still empty, before any of their
    /// children are decoded, so that a child aliasing its ancestor finds it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateToken`] if `token` is already registered.
    pub fn register(&mut self, token: Token, value: Value, line: usize) -> Result<()> {
        if self.objects.contains_key(&token) {
            return Err(Error::duplicate_token(line, token.get()));
        }
        self.objects.insert(token, value);
        Ok(())
    }

    /// Returns the object registered under `token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingAlias`] if nothing was registered under `token`.
    pub fn resolve(&self, token: Token, line: usize) -> Result<Value> {
        self.objects
            .get(&token)
            .cloned()
            .ok_or_else(|| Error::dangling_alias(line, token.get()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::List;

    #[test]
    fn test_tokens_are_assigned_in_first_sight_order() {
        let a = Value::List(List::new());
        let b = Value::List(List::new());
        let mut table = WriteTable::new();

        assert_eq!(table.mark_and_check(&a), (Token::new(1), false));
        assert_eq!(table.fresh_token(), Token::new(2));
        assert_eq!(table.mark_and_check(&b), (Token::new(3), false));
        assert_eq!(table.mark_and_check(&a), (Token::new(1), true));
        assert_eq!(table.mark_and_check(&Value::from(true)), (Token::new(4), false));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_seen_objects_outlive_their_owners() {
        let mut table = WriteTable::new();
        for i in 0..64 {
            let (token, seen) = table.mark_and_check(&Value::str(&format!("s{}", i)));
            assert!(!seen);
            assert_eq!(token, Token::new(i + 1));
        }
        assert_eq!(table.len(), 64);
    }

    #[test]
    fn test_distinct_allocations_have_distinct_ids() {
        let a = List::new();
        let b = List::new();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn test_resolve_returns_registered_object() {
        let list = List::new();
        let mut table = ReadTable::new();
        table
            .register(Token::new(4), Value::List(list.clone()), 1)
            .unwrap();

        let resolved = table.resolve(Token::new(4), 2).unwrap();
        assert!(resolved.same_object(&Value::List(list)));
    }

    #[test]
    fn test_resolve_unknown_token_is_dangling() {
        let table = ReadTable::new();
        match table.resolve(Token::new(9), 5) {
            Err(Error::DanglingAlias { line, token }) => {
                assert_eq!(line, 5);
                assert_eq!(token, 9);
            }
            other => panic!("Expected dangling alias, got {:?}", other),
        }
    }

    #[test]
    fn test_register_twice_is_rejected() {
        let mut table = ReadTable::new();
        table.register(Token::new(1), Value::Int(1), 1).unwrap();
        assert!(matches!(
            table.register(Token::new(1), Value::Int(2), 3),
            Err(Error::DuplicateToken { line: 3, token: 1 })
        ));
    }
}
