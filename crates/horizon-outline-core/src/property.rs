//! Property system for Horizon Outline.
//!
//! Properties are the data backbone of the signal/slot system: a value cell
//! whose owner applies a write under one lock and then decides whether to
//! emit its notification signal.
//!
//! # Example
//!
//! ```
//! use horizon_outline_core::{Property, Signal};
//!
//! struct Tags {
//!     items: Property<Vec<String>>,
//!     changed: Signal<usize>,
//! }
//!
//! impl Tags {
//!     fn push(&self, tag: &str) {
//!         let len = self.items.update(|items| {
//!             items.push(tag.to_string());
//!             items.len()
//!         });
//!         self.changed.emit(len);
//!     }
//! }
//!
//! let tags = Tags { items: Property::default(), changed: Signal::new() };
//! tags.push("draft");
//! assert_eq!(tags.items.with(|items| items.len()), 1);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value cell behind a single `RwLock`.
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is. Every write happens under one lock acquisition, so
/// readers never observe a half-applied update of a compound value.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Mutate the value in place under a single write lock.
    ///
    /// No notification is implied; the caller decides whether to emit.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.value.write())
    }
}

impl<T: Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.value.read())
            .finish()
    }
}
