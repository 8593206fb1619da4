// vim: tw=80
//! The closed set of actions a matched rule can take, and the outcome an
//! interception layer turns back into a real return or raise.

use std::fmt;
use std::sync::{Arc, Mutex};

use fragile::Fragile;

use crate::error::Error;
use crate::invocation::Invocation;
use crate::signature::MemberSignature;
use crate::substitute::Substitute;
use crate::value::Value;

/// A throwable payload, as far as the engine models one: a type name, an
/// optional message, and whether the member must declare it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Throwable {
    type_name: String,
    message: Option<String>,
    checked: bool,
}

impl Throwable {
    /// An unchecked throwable; members never need to declare these.
    pub fn new(type_name: &str) -> Self {
        Throwable {
            type_name: type_name.to_owned(),
            message: None,
            checked: false,
        }
    }

    /// A checked throwable; attaching it to a member that does not declare
    /// its type is a misuse error.
    pub fn checked(type_name: &str) -> Self {
        Throwable { checked: true, ..Throwable::new(type_name) }
    }

    pub fn message(mut self, m: &str) -> Self {
        self.message = Some(m.to_owned());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(m) => write!(f, "{}: {}", self.type_name, m),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// What a resolved call produces.  The interception layer returns the value
/// or re-raises the throwable; the engine never does either itself.
#[derive(Clone, Debug, PartialEq)]
pub enum CallOutcome {
    /// The member returns; `None` is the absent value.
    Returns(Option<Value>),
    /// The member raises.
    Raises(Throwable),
}

impl CallOutcome {
    pub fn returned(&self) -> Option<&Value> {
        match self {
            CallOutcome::Returns(v) => v.as_ref(),
            CallOutcome::Raises(_) => None,
        }
    }

    pub fn raised(&self) -> Option<&Throwable> {
        match self {
            CallOutcome::Returns(_) => None,
            CallOutcome::Raises(t) => Some(t),
        }
    }

    /// A return with no value at all.
    pub fn is_absent(&self) -> bool {
        matches!(self, CallOutcome::Returns(None))
    }
}

type AnswerFn = Box<dyn FnMut(&Invocation) -> CallOutcome + Send>;

/// One action in a rule's answer queue.
///
/// A closed set of variants with a single capability,
/// [`apply`](Answer::apply); resolution depends on nothing else about an
/// answer.
pub enum Answer {
    /// Return a fixed value, or the absent value.
    Returns(Option<Value>),
    /// Raise a throwable.
    Raises(Throwable),
    /// Run caller-supplied logic.
    Invokes(Mutex<AnswerFn>),
    /// Call through to a real backing implementation.
    Delegates(Arc<dyn Fn(&Invocation) -> CallOutcome + Send + Sync>),
    /// Return a memoized child substitute (deep-stub chaining).
    ChainsTo(Substitute),
}

impl Answer {
    pub fn returns(v: Value) -> Self {
        Answer::Returns(Some(v))
    }

    /// Return the absent value.
    pub fn absent() -> Self {
        Answer::Returns(None)
    }

    pub fn raises(t: Throwable) -> Self {
        Answer::Raises(t)
    }

    pub fn invokes<F>(f: F) -> Self
    where
        F: FnMut(&Invocation) -> CallOutcome + Send + 'static,
    {
        Answer::Invokes(Mutex::new(Box::new(f)))
    }

    /// Single-threaded version of [`invokes`](Answer::invokes), for
    /// closures that are not `Send`.
    ///
    /// It is a runtime error to resolve a call against this answer from a
    /// different thread than the one that registered it.
    pub fn invokes_st<F>(f: F) -> Self
    where
        F: FnMut(&Invocation) -> CallOutcome + 'static,
    {
        let mut fragile = Fragile::new(f);
        Answer::invokes(move |inv: &Invocation| (fragile.get_mut())(inv))
    }

    pub fn delegates_to<F>(f: F) -> Self
    where
        F: Fn(&Invocation) -> CallOutcome + Send + Sync + 'static,
    {
        Answer::Delegates(Arc::new(f))
    }

    /// Execute this answer for `inv`.
    pub fn apply(&self, inv: &Invocation) -> CallOutcome {
        match self {
            Answer::Returns(v) => CallOutcome::Returns(v.clone()),
            Answer::Raises(t) => CallOutcome::Raises(t.clone()),
            Answer::Invokes(f) => {
                let mut guard = f.lock().unwrap();
                (*guard)(inv)
            }
            Answer::Delegates(f) => (f.as_ref())(inv),
            Answer::ChainsTo(sub) => {
                CallOutcome::Returns(Some(Value::of(sub.clone())))
            }
        }
    }

    /// Check this answer against the member it is being attached to.
    /// Runs at attach time so that resolution never has to fail.
    pub(crate) fn validate(
        &self,
        signature: &MemberSignature,
    ) -> Result<(), Error> {
        match self {
            Answer::Returns(Some(_)) if signature.return_type().is_unit() => {
                Err(Error::VoidWithReturnValue {
                    signature: signature.to_string(),
                })
            }
            Answer::Raises(t) if t.type_name().is_empty() => {
                Err(Error::InvalidThrowable {
                    signature: signature.to_string(),
                })
            }
            Answer::Raises(t)
                if t.is_checked()
                    && !signature
                        .declared_throwables()
                        .iter()
                        .any(|d| d == t.type_name()) =>
            {
                Err(Error::UndeclaredThrowable {
                    signature: signature.to_string(),
                    thrown: t.type_name().to_owned(),
                })
            }
            _ => Ok(()),
        }
    }

    /// `returns 1` / `raises IoFailure` rendering for diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Answer::Returns(Some(v)) => format!("returns {v:?}"),
            Answer::Returns(None) => "returns nothing".to_owned(),
            Answer::Raises(t) => format!("raises {t}"),
            Answer::Invokes(_) => "invokes custom logic".to_owned(),
            Answer::Delegates(_) => {
                "delegates to the real implementation".to_owned()
            }
            Answer::ChainsTo(sub) => format!("chains to {}", sub.name()),
        }
    }
}

impl fmt::Debug for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
