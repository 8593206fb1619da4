// vim: tw=80
//! Type-erased argument and return values.
//!
//! The engine never knows the concrete types flowing through a substitute;
//! the interception layer hands it [`Value`]s.  A `Value` can hold anything
//! with value equality and a debug rendering, which is exactly what argument
//! matching and diagnostics need.

use std::fmt;
use std::sync::Arc;

use downcast::*;

/// Anything that can travel through the engine as an argument, a return
/// value, or a thrown payload.
///
/// Implemented automatically for every `'static` type with value equality
/// and a `Debug` rendering.
pub trait ArgLike: Any + fmt::Debug + Send + Sync {
    /// Value equality against another erased value.
    ///
    /// Values of different concrete types are never equal.
    fn eq_value(&self, other: &dyn ArgLike) -> bool;
}

downcast!(dyn ArgLike);

impl<T> ArgLike for T
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn eq_value(&self, other: &dyn ArgLike) -> bool {
        other.downcast_ref::<T>().map_or(false, |o| self == o)
    }
}

/// A cheaply cloneable erased value.
///
/// Equality is value equality, not identity, so stubbing with raw values
/// behaves the way a test author expects.
#[derive(Clone)]
pub struct Value(Arc<dyn ArgLike>);

impl Value {
    /// Erase a concrete value.
    pub fn of<T: ArgLike>(v: T) -> Self {
        Value(Arc::new(v))
    }

    /// Borrow the underlying value, if it has the given concrete type.
    pub fn downcast_ref<T: ArgLike>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>().ok()
    }

    /// Does the underlying value have the given concrete type?
    pub fn is<T: ArgLike>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_value(other.0.as_ref())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}
