// vim: tw=80
//! The per-substitute state machine: what happened, and what was promised.
//!
//! One container owns the append-only invocation log, the active stubbing
//! rules (newest first), and the "invocation currently being stubbed"
//! pointer that a stubbing statement builds against.  Every mutating
//! operation is serialized by the container's lock; a rule is only
//! published into the list after its first answer is attached, so snapshot
//! readers never observe a half-built rule.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::answer::Answer;
use crate::error::Error;
use crate::invocation::Invocation;
use crate::matcher::{ArgMatcher, ArgumentMatchSet};
use crate::signature::MemberSignature;
use crate::stubbing::StubbingRule;
use crate::substitute::Substitute;

struct Pending {
    invocation: Invocation,
    matchers: Option<Arc<ArgumentMatchSet>>,
}

struct State {
    invocations: Vec<Invocation>,
    /// Newest first: the most recent rule for an overlapping call shape
    /// wins resolution.
    rules: VecDeque<Arc<StubbingRule>>,
    pending: Option<Pending>,
}

/// The single source of truth for one substitute.
pub struct InvocationContainer {
    state: Mutex<State>,
    /// Keep only the most recent invocation, for stub-only substitutes.
    stub_only: bool,
}

impl InvocationContainer {
    pub(crate) fn new(stub_only: bool) -> Self {
        InvocationContainer {
            state: Mutex::new(State {
                invocations: Vec::new(),
                rules: VecDeque::new(),
                pending: None,
            }),
            stub_only,
        }
    }

    /// Append a call to the log and make it the invocation provisionally
    /// being stubbed.  Every call is a potential stubbing target until an
    /// answer is attached or another call arrives.
    ///
    /// The invocation is constructed under the container lock so that its
    /// sequence number is allocated in log order: within one container,
    /// log order and sequence order always agree.
    pub(crate) fn record_invocation_with(
        &self,
        make: impl FnOnce() -> Invocation,
    ) -> Invocation {
        let mut st = self.state.lock().unwrap();
        let inv = make();
        if self.stub_only {
            st.invocations.clear();
        }
        st.invocations.push(inv.clone());
        st.pending =
            Some(Pending { invocation: inv.clone(), matchers: None });
        inv
    }

    /// Commit the pending invocation to a stubbing statement, optionally
    /// replacing its implied equality matchers with explicit ones.
    pub(crate) fn begin_stubbing(
        &self,
        matchers: Option<Vec<ArgMatcher>>,
    ) -> Result<(), Error> {
        let mut st = self.state.lock().unwrap();
        let pending = st.pending.as_mut().ok_or(Error::UnfinishedStubbing)?;
        pending.matchers = match matchers {
            Some(ms) => Some(Arc::new(ArgumentMatchSet::new(
                pending.invocation.signature(),
                ms,
            )?)),
            None => None,
        };
        Ok(())
    }

    /// Attach an answer to the pending stubbing.
    ///
    /// A fresh rule is pushed to the front of the rule list and the
    /// stubbing-time invocation is dropped from the log: a stubbing call is
    /// not a production call and must not count toward diagnostics.  With
    /// `consecutive` the answer is instead appended to the most recently
    /// pushed rule's queue.
    pub(crate) fn attach_answer(
        &self,
        answer: Answer,
        consecutive: bool,
    ) -> Result<Arc<StubbingRule>, Error> {
        let mut st = self.state.lock().unwrap();
        let pending = st.pending.as_ref().ok_or(Error::UnfinishedStubbing)?;
        let inv = pending.invocation.clone();
        answer.validate(inv.signature())?;

        if consecutive {
            let rule =
                st.rules.front().cloned().ok_or(Error::UnfinishedStubbing)?;
            rule.push_answer(answer);
            return Ok(rule);
        }

        let matchers = match &pending.matchers {
            Some(ms) => Arc::clone(ms),
            None => Arc::new(ArgumentMatchSet::from_values(
                inv.signature(),
                inv.raw_args(),
            )),
        };
        let seq = inv.sequence_number();
        st.invocations.retain(|i| i.sequence_number() != seq);
        let rule = Arc::new(StubbingRule::new(inv, matchers, answer));
        debug!(rule = %rule.describe(), "stubbing registered");
        st.rules.push_front(Arc::clone(&rule));
        Ok(rule)
    }

    /// The resolution scan: newest rule first, first match wins.  The
    /// winning rule is marked used and the pairing is recorded for
    /// diagnostics before the lock is released.
    pub(crate) fn find_answer_for(
        &self,
        inv: &Invocation,
    ) -> Option<Arc<StubbingRule>> {
        let st = self.state.lock().unwrap();
        for rule in &st.rules {
            if rule.matches(inv) {
                rule.mark_used(inv);
                inv.mark_stubbed_by(rule);
                return Some(Arc::clone(rule));
            }
        }
        None
    }

    /// Deep-stub memoization: re-scan for a rule covering this exact call
    /// shape, and only when none exists record a fresh chain rule answering
    /// with `make_child()`'s substitute.  The whole step runs under one
    /// lock acquisition, so two threads chaining the same shape observe one
    /// child.  Chain rules are born used: the chain-creating call is the
    /// call that exercised them.
    pub(crate) fn find_or_chain(
        &self,
        inv: &Invocation,
        make_child: impl FnOnce() -> Substitute,
    ) -> Arc<StubbingRule> {
        let mut st = self.state.lock().unwrap();
        for rule in &st.rules {
            if rule.matches(inv) {
                rule.mark_used(inv);
                inv.mark_stubbed_by(rule);
                return Arc::clone(rule);
            }
        }
        let child = make_child();
        debug!(child = %child.name(), shape = %inv.describe(),
            "deep-stub chain recorded");
        let matchers = Arc::new(ArgumentMatchSet::from_values(
            inv.signature(),
            inv.raw_args(),
        ));
        let rule = Arc::new(StubbingRule::new(
            inv.clone(),
            matchers,
            Answer::ChainsTo(child),
        ));
        rule.mark_used(inv);
        inv.mark_stubbed_by(&rule);
        st.rules.push_front(Arc::clone(&rule));
        rule
    }

    /// Unused, non-lenient rules for the given member; the strict-stubs
    /// call-time check.
    pub(crate) fn unused_same_signature(
        &self,
        signature: &MemberSignature,
    ) -> Vec<Arc<StubbingRule>> {
        let st = self.state.lock().unwrap();
        st.rules
            .iter()
            .filter(|r| {
                !r.was_used() && !r.is_lenient() && r.signature() == signature
            })
            .cloned()
            .collect()
    }

    /// Snapshot of the invocation log, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().unwrap().invocations.clone()
    }

    /// Snapshot of the active rules, newest first (storage order).
    pub fn rules(&self) -> Vec<Arc<StubbingRule>> {
        self.state.lock().unwrap().rules.iter().cloned().collect()
    }
}
