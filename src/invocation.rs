// vim: tw=80
//! The record of one call attempt on a substitute, and the process-wide
//! sequence numbering that totally orders such records.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use crate::signature::MemberSignature;
use crate::stubbing::StubbingRule;
use crate::value::Value;

/// Allocates globally unique, strictly increasing invocation sequence
/// numbers.
///
/// Every substitute wired to the same `Sequencer` draws from the same
/// counter, so invocation order is comparable across substitutes.  Isolated
/// test harnesses can construct their own instead of using
/// [`global_sequencer`], and may [`reset`](Sequencer::reset) it between
/// runs.
#[derive(Debug, Default)]
pub struct Sequencer {
    next: AtomicU64,
}

impl Sequencer {
    pub const fn new() -> Self {
        Sequencer { next: AtomicU64::new(0) }
    }

    /// The next sequence number.  Never returns the same number twice.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently allocated number, or 0 if none was.
    pub fn current(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.next.store(0, Ordering::SeqCst);
    }
}

/// The process-wide default sequencer, shared by every substitute that was
/// not given an explicit one.
pub fn global_sequencer() -> Arc<Sequencer> {
    static GLOBAL: OnceLock<Arc<Sequencer>> = OnceLock::new();
    GLOBAL.get_or_init(|| Arc::new(Sequencer::new())).clone()
}

/// Where a call happened.  Captured automatically via `#[track_caller]` at
/// the notification boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location(&'static std::panic::Location<'static>);

impl Location {
    #[track_caller]
    pub fn capture() -> Self {
        Location(std::panic::Location::caller())
    }

    pub fn file(&self) -> &str {
        self.0.file()
    }

    pub fn line(&self) -> u32 {
        self.0.line()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.file(), self.0.line())
    }
}

struct InvocationInner {
    target: u64,
    target_name: String,
    signature: MemberSignature,
    raw_args: Vec<Value>,
    sequence_number: u64,
    location: Location,
    stub_info: OnceLock<Weak<StubbingRule>>,
    verified: AtomicBool,
}

/// One recorded call attempt.
///
/// Immutable after construction, except for two one-shot markers: the
/// back-reference to the rule that answered it, and the verification flag.
/// Clones share the record, so a marker set through one clone is visible
/// through all.
///
/// Two invocations are never the same call occurrence, even when they are
/// structurally identical; equality is by sequence number.
#[derive(Clone)]
pub struct Invocation(Arc<InvocationInner>);

impl Invocation {
    pub(crate) fn new(
        target: u64,
        target_name: &str,
        signature: MemberSignature,
        raw_args: Vec<Value>,
        sequencer: &Sequencer,
        location: Location,
    ) -> Self {
        Invocation(Arc::new(InvocationInner {
            target,
            target_name: target_name.to_owned(),
            signature,
            raw_args,
            sequence_number: sequencer.next(),
            location,
            stub_info: OnceLock::new(),
            verified: AtomicBool::new(false),
        }))
    }

    /// Identity of the substitute the call was made on.
    pub fn target(&self) -> u64 {
        self.0.target
    }

    pub fn target_name(&self) -> &str {
        &self.0.target_name
    }

    pub fn signature(&self) -> &MemberSignature {
        &self.0.signature
    }

    pub fn raw_args(&self) -> &[Value] {
        &self.0.raw_args
    }

    /// The arguments with a variable-arity tail flattened: when the last
    /// raw argument of a varargs member is an array, its elements replace
    /// it.  Otherwise identical to [`raw_args`](Invocation::raw_args).
    pub fn expanded_args(&self) -> Vec<Value> {
        if self.0.signature.is_varargs() {
            if let Some(last) = self.0.raw_args.last() {
                if let Some(tail) = last.downcast_ref::<Vec<Value>>() {
                    let n = self.0.raw_args.len();
                    let mut out = self.0.raw_args[..n - 1].to_vec();
                    out.extend(tail.iter().cloned());
                    return out;
                }
            }
        }
        self.0.raw_args.to_vec()
    }

    pub fn sequence_number(&self) -> u64 {
        self.0.sequence_number
    }

    pub fn location(&self) -> Location {
        self.0.location
    }

    /// The rule that answered this invocation, if any rule did.
    pub fn stubbed_by(&self) -> Option<Arc<StubbingRule>> {
        self.0.stub_info.get().and_then(Weak::upgrade)
    }

    pub(crate) fn mark_stubbed_by(&self, rule: &Arc<StubbingRule>) {
        let _ = self.0.stub_info.set(Arc::downgrade(rule));
    }

    /// Record that a verification consumed this invocation.  Returns false
    /// if it was already marked.
    pub fn mark_verified(&self) -> bool {
        !self.0.verified.swap(true, Ordering::SeqCst)
    }

    pub fn is_verified(&self) -> bool {
        self.0.verified.load(Ordering::SeqCst)
    }

    /// `name.member(args)`, for diagnostics.
    pub fn describe(&self) -> String {
        let args = self
            .0
            .raw_args
            .iter()
            .map(|v| format!("{v:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}.{}({args})", self.0.target_name, self.0.signature.name())
    }
}

impl PartialEq for Invocation {
    fn eq(&self, other: &Self) -> bool {
        self.0.sequence_number == other.0.sequence_number
    }
}

impl Eq for Invocation {}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("target", &self.0.target_name)
            .field("signature", &self.0.signature.to_string())
            .field("args", &self.0.raw_args)
            .field("seq", &self.0.sequence_number)
            .finish()
    }
}
