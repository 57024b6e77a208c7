//! Shared, lazily computed values.

use once_cell::unsync::Lazy;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

type Thunk<'q, V> = Box<dyn FnOnce() -> V + 'q>;

/// A value computed on first access and shared between clones.
///
/// Type models hold their structural members behind `Deferred` so that a
/// self-referential host type only expands as far as it is actually read.
pub struct Deferred<'q, V>(Rc<Lazy<V, Thunk<'q, V>>>);

impl<'q, V> Deferred<'q, V> {
    pub fn new(thunk: impl FnOnce() -> V + 'q) -> Self {
        Deferred(Rc::new(Lazy::new(Box::new(thunk) as Thunk<'q, V>)))
    }

    /// An already computed value.
    pub fn ready(value: V) -> Self
    where
        V: 'q,
    {
        Self::new(move || value)
    }

    pub fn get(&self) -> &V {
        Lazy::force(&self.0)
    }

    /// Whether two handles share the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<V> Clone for Deferred<'_, V> {
    fn clone(&self) -> Self {
        Deferred(Rc::clone(&self.0))
    }
}

impl<V> Deref for Deferred<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.get()
    }
}

impl<V> fmt::Debug for Deferred<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}
