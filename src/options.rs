//! Configuration for top-level encode and decode calls.
//!
//! The only setting is the format [`Generation`] an entry point is bound to.
//! Writers always emit that generation; readers use it as their default and
//! hand off to the other generation when a stream declares it.
//!
//! ## Examples
//!
//! ```rust
//! use serde_persist::{from_str_with_options, to_string_with_options, Options, Value};
//!
//! let value = Value::list(vec![Value::from(true), Value::from(1)]);
//!
//! let plain = to_string_with_options(&value, Options::plain()).unwrap();
//! assert!(plain.starts_with("version:1\n"));
//!
//! // A reader bound to the identity-aware generation still reads it.
//! let back = from_str_with_options(&plain, Options::identity_aware()).unwrap();
//! assert_eq!(back, value);
//! ```

pub use crate::version::Generation;

/// Options for a single top-level call.
///
/// # Examples
///
/// ```rust
/// use serde_persist::{Generation, Options};
///
/// // Identity-aware by default
/// let options = Options::new();
/// assert_eq!(options.generation, Generation::IdentityAware);
///
/// let options = Options::new().with_generation(Generation::Plain);
/// assert_eq!(options.generation, Generation::Plain);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub generation: Generation,
}

impl Options {
    /// Creates default options (identity-aware generation).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options bound to the plain generation: no tokens, no aliasing.
    #[must_use]
    pub fn plain() -> Self {
        Options {
            generation: Generation::Plain,
        }
    }

    /// Options bound to the identity-aware generation.
    #[must_use]
    pub fn identity_aware() -> Self {
        Options {
            generation: Generation::IdentityAware,
        }
    }

    /// Sets the generation written by encoders and assumed by decoders.
    #[must_use]
    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }
}
