// vim: tw=80
//! A registered "when this call happens, do that" rule.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::answer::{Answer, CallOutcome};
use crate::invocation::{Invocation, Location};
use crate::matcher::ArgumentMatchSet;
use crate::signature::MemberSignature;

/// One stubbing rule: a member signature plus an argument match set, paired
/// with an ordered queue of answers.
///
/// Answers are consumed FIFO; the last remaining answer is replayed
/// indefinitely, so the queue is never empty after construction.  A rule is
/// never deleted during a test: a newer rule for an overlapping call shape
/// supersedes it purely through search order.
pub struct StubbingRule {
    signature: MemberSignature,
    matchers: Arc<ArgumentMatchSet>,
    answers: Mutex<VecDeque<Arc<Answer>>>,
    used: AtomicBool,
    lenient: AtomicBool,
    answered: Mutex<Vec<Invocation>>,
    /// The stubbing-time invocation: carries the creation location and the
    /// creation-order sequence number.
    origin: Invocation,
}

impl StubbingRule {
    pub(crate) fn new(
        origin: Invocation,
        matchers: Arc<ArgumentMatchSet>,
        first_answer: Answer,
    ) -> Self {
        let mut answers = VecDeque::with_capacity(1);
        answers.push_back(Arc::new(first_answer));
        StubbingRule {
            signature: origin.signature().clone(),
            matchers,
            answers: Mutex::new(answers),
            used: AtomicBool::new(false),
            lenient: AtomicBool::new(false),
            answered: Mutex::new(Vec::new()),
            origin,
        }
    }

    /// Append a consecutive answer.
    pub(crate) fn push_answer(&self, answer: Answer) {
        self.answers.lock().unwrap().push_back(Arc::new(answer));
    }

    pub(crate) fn matches(&self, inv: &Invocation) -> bool {
        self.signature == *inv.signature() && self.matchers.accepts(inv)
    }

    pub(crate) fn mark_used(&self, inv: &Invocation) {
        self.used.store(true, Ordering::SeqCst);
        self.answered.lock().unwrap().push(inv.clone());
    }

    /// Execute the next answer for `inv`.  With more than one answer queued
    /// the head is consumed; the last answer is peeked and replayed.
    pub fn answer(&self, inv: &Invocation) -> CallOutcome {
        let answer = {
            let mut q = self.answers.lock().unwrap();
            if q.len() > 1 {
                q.pop_front().unwrap()
            } else {
                Arc::clone(q.front().unwrap())
            }
        };
        answer.apply(inv)
    }

    pub fn was_used(&self) -> bool {
        self.used.load(Ordering::SeqCst)
    }

    /// Exclude this rule from unused-stubbing findings and from strict-mode
    /// escalation.
    pub fn set_lenient(&self) {
        self.lenient.store(true, Ordering::SeqCst);
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient.load(Ordering::SeqCst)
    }

    pub fn signature(&self) -> &MemberSignature {
        &self.signature
    }

    pub fn match_set(&self) -> &ArgumentMatchSet {
        &self.matchers
    }

    /// Where the stubbing statement was written.
    pub fn location(&self) -> Location {
        self.origin.location()
    }

    /// The invocations this rule has answered, in answer order.
    pub fn answered(&self) -> Vec<Invocation> {
        self.answered.lock().unwrap().clone()
    }

    /// Creation order across all rules sharing a sequencer.
    pub(crate) fn creation_order(&self) -> u64 {
        self.origin.sequence_number()
    }

    pub(crate) fn explain_mismatch(&self, inv: &Invocation) -> Option<String> {
        self.matchers.explain_mismatch(inv)
    }

    /// `sub.member(eq(1)); stubbed with [returns 2]` rendering.
    pub fn describe(&self) -> String {
        let answers = self
            .answers
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.describe())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}.{}({}); stubbed with [{}]",
            self.origin.target_name(),
            self.signature.name(),
            self.matchers.describe(),
            answers,
        )
    }
}

impl fmt::Debug for StubbingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubbingRule")
            .field("signature", &self.signature.to_string())
            .field("matchers", &self.matchers)
            .field("used", &self.was_used())
            .field("location", &self.location().to_string())
            .finish()
    }
}
