// vim: tw=80
//! Default-answer policies: what an unstubbed call produces.
//!
//! Exactly one policy is active per substitute, chosen at creation time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::answer::CallOutcome;
use crate::deep;
use crate::invocation::{Invocation, Location};
use crate::signature::TypeDesc;
use crate::substitute::Substitute;
use crate::value::Value;

/// The policy applied when no stubbing rule matches an invocation.
pub enum DefaultAnswer {
    /// Type-appropriate empty/zero values.
    Empty(EmptyValues),
    /// Self-explaining placeholders for object returns, empty values for
    /// the rest.
    SmartNulls(EmptyValues),
    /// Lazily chain memoized child substitutes for substitute-capable
    /// return types.
    DeepStubs,
    /// Call through to a real backing implementation.
    Delegate(Arc<dyn Fn(&Invocation) -> CallOutcome + Send + Sync>),
}

impl DefaultAnswer {
    pub fn empty() -> Self {
        DefaultAnswer::Empty(EmptyValues::standard())
    }

    pub fn smart_nulls() -> Self {
        DefaultAnswer::SmartNulls(EmptyValues::standard())
    }

    pub fn deep_stubs() -> Self {
        DefaultAnswer::DeepStubs
    }

    pub fn delegate<F>(f: F) -> Self
    where
        F: Fn(&Invocation) -> CallOutcome + Send + Sync + 'static,
    {
        DefaultAnswer::Delegate(Arc::new(f))
    }

    pub(crate) fn answer(
        &self,
        sub: &Substitute,
        inv: &Invocation,
    ) -> CallOutcome {
        match self {
            DefaultAnswer::Empty(table) => CallOutcome::Returns(
                table.value_for(inv.signature().return_type()),
            ),
            DefaultAnswer::SmartNulls(table) => {
                let rt = inv.signature().return_type();
                if rt.is_mockable() {
                    CallOutcome::Returns(Some(Value::of(SmartNull::new(inv))))
                } else {
                    CallOutcome::Returns(table.value_for(rt))
                }
            }
            DefaultAnswer::DeepStubs => deep::deep_stub(sub, inv),
            DefaultAnswer::Delegate(f) => (f.as_ref())(inv),
        }
    }
}

impl fmt::Debug for DefaultAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefaultAnswer::Empty(_) => "Empty",
            DefaultAnswer::SmartNulls(_) => "SmartNulls",
            DefaultAnswer::DeepStubs => "DeepStubs",
            DefaultAnswer::Delegate(_) => "Delegate",
        };
        write!(f, "DefaultAnswer::{name}")
    }
}

/// The convention table of sensible defaults, keyed by return type name.
///
/// Pre-seeded with the unambiguous entries only: numeric zeros, `false`,
/// `'\0'`, the empty `Vec<Value>` and `HashMap<String, Value>`, the absent
/// `Option<Value>`, and the zero `Duration`.  Every other type, strings
/// included, yields the absent value.  Adopting teams extend the table
/// with [`register`](EmptyValues::register) rather than the engine
/// inventing defaults.
#[derive(Clone)]
pub struct EmptyValues {
    table: HashMap<String, Arc<dyn Fn() -> Value + Send + Sync>>,
}

impl EmptyValues {
    /// An empty table: every type yields the absent value.
    pub fn new() -> Self {
        EmptyValues { table: HashMap::new() }
    }

    /// The standard table.
    pub fn standard() -> Self {
        let mut t = EmptyValues::new();
        t.register("i8", || Value::of(0i8));
        t.register("i16", || Value::of(0i16));
        t.register("i32", || Value::of(0i32));
        t.register("i64", || Value::of(0i64));
        t.register("i128", || Value::of(0i128));
        t.register("isize", || Value::of(0isize));
        t.register("u8", || Value::of(0u8));
        t.register("u16", || Value::of(0u16));
        t.register("u32", || Value::of(0u32));
        t.register("u64", || Value::of(0u64));
        t.register("u128", || Value::of(0u128));
        t.register("usize", || Value::of(0usize));
        t.register("f32", || Value::of(0f32));
        t.register("f64", || Value::of(0f64));
        t.register("bool", || Value::of(false));
        t.register("char", || Value::of('\0'));
        t.register("Vec", || Value::of(Vec::<Value>::new()));
        t.register("HashMap", || Value::of(HashMap::<String, Value>::new()));
        t.register("Option", || Value::of(Option::<Value>::None));
        t.register("Duration", || Value::of(Duration::ZERO));
        t
    }

    /// Register (or replace) the default for a type name.
    pub fn register<F>(&mut self, type_name: &str, f: F)
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.table.insert(type_name.to_owned(), Arc::new(f));
    }

    /// The empty value for `ty`, or `None` (the absent value) when the
    /// table has no entry or the type is unit.
    pub fn value_for(&self, ty: &TypeDesc) -> Option<Value> {
        if ty.is_unit() {
            return None;
        }
        self.table.get(ty.name()).map(|f| f())
    }
}

impl Default for EmptyValues {
    fn default() -> Self {
        EmptyValues::standard()
    }
}

impl fmt::Debug for EmptyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.table.keys().collect();
        names.sort();
        f.debug_tuple("EmptyValues").field(&names).finish()
    }
}

/// The placeholder returned for unstubbed object-returning members under
/// the smart-nulls policy.
///
/// The engine cannot intercept later use of an opaque value, so the
/// placeholder carries everything the interception layer needs to raise a
/// helpful failure when it *is* used: the unstubbed member and where it
/// was called.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmartNull {
    member: String,
    location: Location,
}

impl SmartNull {
    pub(crate) fn new(inv: &Invocation) -> Self {
        SmartNull { member: inv.describe(), location: inv.location() }
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// The message to fail with when this placeholder is used.
    pub fn explain(&self) -> String {
        format!(
            "this value came from the unstubbed call {} at {}; stub that \
             call to give it a real value",
            self.member, self.location,
        )
    }
}
