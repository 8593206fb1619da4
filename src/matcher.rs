// vim: tw=80
//! Per-argument predicates and the match set that binds them to one member
//! signature.

use std::fmt;

use predicates::BoxPredicate;
use predicates::prelude::*;
use predicates_tree::CaseTreeExt;

use crate::error::Error;
use crate::invocation::Invocation;
use crate::signature::MemberSignature;
use crate::value::Value;

/// A predicate over one argument position.
///
/// Stubbing with raw values produces [`Equals`](ArgMatcher::Equals)
/// matchers; anything implementing [`Predicate<Value>`] can stand in for
/// custom matching.
pub enum ArgMatcher {
    /// Value equality with the given value.
    Equals(Value),
    /// A caller-supplied predicate over the erased value.
    Matches(BoxPredicate<Value>),
}

impl ArgMatcher {
    pub fn equals(v: Value) -> Self {
        ArgMatcher::Equals(v)
    }

    /// Accepts every value.
    pub fn any() -> Self {
        ArgMatcher::Matches(predicates::constant::always().boxed())
    }

    /// Match with a plain function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        ArgMatcher::Matches(predicates::function::function(f).boxed())
    }

    /// Match with any [`Predicate<Value>`].
    pub fn matching<P>(p: P) -> Self
    where
        P: Predicate<Value> + Send + Sync + 'static,
    {
        ArgMatcher::Matches(p.boxed())
    }

    pub(crate) fn accepts(&self, v: &Value) -> bool {
        match self {
            ArgMatcher::Equals(expected) => expected == v,
            ArgMatcher::Matches(p) => p.eval(v),
        }
    }

    /// A human-readable account of why `v` was rejected, or `None` if it
    /// was not.  Predicate rejections render the case tree, the same way
    /// failed matches are reported elsewhere in the ecosystem.
    pub(crate) fn explain_mismatch(&self, v: &Value) -> Option<String> {
        match self {
            ArgMatcher::Equals(expected) => {
                if expected == v {
                    None
                } else {
                    Some(format!("expected {expected:?}, got {v:?}"))
                }
            }
            ArgMatcher::Matches(p) => {
                p.find_case(false, v).map(|case| case.tree().to_string())
            }
        }
    }
}

impl fmt::Display for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgMatcher::Equals(v) => write!(f, "eq({v:?})"),
            ArgMatcher::Matches(p) => write!(f, "{p}"),
        }
    }
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// The ordered per-position predicates of one stubbing rule, scoped to one
/// member signature.
///
/// Arity against the signature is checked at construction; a mismatch is a
/// hard error, never a silent non-match.  For a variable-arity member the
/// set can carry either one matcher for the packed tail or one matcher per
/// trailing actual.
pub struct ArgumentMatchSet {
    matchers: Vec<ArgMatcher>,
    varargs: bool,
}

impl ArgumentMatchSet {
    pub fn new(
        signature: &MemberSignature,
        matchers: Vec<ArgMatcher>,
    ) -> Result<Self, Error> {
        let param_count = signature.param_count();
        let arity_ok = if signature.is_varargs() {
            // one matcher for the packed tail, or zero-or-more for the
            // expanded tail
            matchers.len() == param_count || matchers.len() + 1 >= param_count
        } else {
            matchers.len() == param_count
        };
        if !arity_ok {
            return Err(Error::ArityMismatch {
                signature: signature.to_string(),
                matchers: matchers.len(),
                params: param_count,
            });
        }
        Ok(ArgumentMatchSet { matchers, varargs: signature.is_varargs() })
    }

    /// The default match set of a stubbing statement made with raw values:
    /// one equality matcher per actual argument.
    pub(crate) fn from_values(
        signature: &MemberSignature,
        args: &[Value],
    ) -> Self {
        ArgumentMatchSet {
            matchers: args
                .iter()
                .map(|a| ArgMatcher::Equals(a.clone()))
                .collect(),
            varargs: signature.is_varargs(),
        }
    }

    pub fn matchers(&self) -> &[ArgMatcher] {
        &self.matchers
    }

    /// Does this set accept the invocation's actual arguments?
    ///
    /// For a variable-arity tail the packed shape is tried first, then the
    /// expanded shape, then repetition of the last matcher across the tail.
    pub(crate) fn accepts(&self, inv: &Invocation) -> bool {
        let raw = inv.raw_args();
        if !self.varargs {
            return self.matchers.len() == raw.len()
                && self.args_match(raw, false);
        }
        if self.matchers.len() == raw.len() && self.args_match(raw, false) {
            return true;
        }
        let expanded = inv.expanded_args();
        if self.matchers.len() == expanded.len() {
            return self.args_match(&expanded, false);
        }
        !self.matchers.is_empty()
            && self.matchers.len() < expanded.len()
            && self.args_match(&expanded, true)
    }

    fn args_match(&self, args: &[Value], repeat_last: bool) -> bool {
        args.iter().enumerate().all(|(i, a)| {
            let i = if repeat_last {
                i.min(self.matchers.len() - 1)
            } else {
                i
            };
            self.matchers[i].accepts(a)
        })
    }

    /// Why did this set reject the invocation?  Reports the first failing
    /// position, or `None` when the set actually accepts it.
    pub(crate) fn explain_mismatch(&self, inv: &Invocation) -> Option<String> {
        let raw = inv.raw_args();
        let args = if self.matchers.len() == raw.len() {
            raw.to_vec()
        } else {
            inv.expanded_args()
        };
        for (i, a) in args.iter().enumerate() {
            let m = self.matchers.get(i.min(self.matchers.len().saturating_sub(1)))?;
            if let Some(why) = m.explain_mismatch(a) {
                return Some(format!("argument {i}: {why}"));
            }
        }
        None
    }

    /// `eq(1), any()` style rendering for diagnostics.
    pub(crate) fn describe(&self) -> String {
        self.matchers
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Debug for ArgumentMatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.describe())
    }
}
