// vim: tw=80
//! The engine-side handle for one substitute object.
//!
//! Substitute *generation* (proxying, subclassing) is an external
//! collaborator; this handle is everything the engine needs to know about
//! one: an identity, creation settings, and the container that records
//! what happened to it.  The interception layer funnels every call attempt
//! through [`notify_invocation`](Substitute::notify_invocation) and returns
//! whatever [`resolve`](Substitute::resolve) produces.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::answer::{Answer, CallOutcome};
use crate::container::InvocationContainer;
use crate::defaults::DefaultAnswer;
use crate::error::Error;
use crate::invocation::{global_sequencer, Invocation, Location, Sequencer};
use crate::matcher::ArgMatcher;
use crate::signature::{MemberSignature, TypeDesc};
use crate::stubbing::StubbingRule;
use crate::value::Value;

/// When unused stubbings and argument mismatches become fatal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Findings are collected but never escalate.
    #[default]
    Lenient,
    /// Findings are logged as advisories at the end-of-test checkpoint.
    Warn,
    /// Argument mismatches fail at call time; unused stubbings fail at the
    /// end-of-test checkpoint.
    StrictStubs,
}

/// Creation-time configuration of a substitute.  The default-answer policy
/// and strictness are fixed for the substitute's lifetime.
pub struct SubstituteSettings {
    name: Option<String>,
    substituted_type: TypeDesc,
    default_answer: DefaultAnswer,
    strictness: Strictness,
    stub_only: bool,
    sequencer: Option<Arc<Sequencer>>,
}

impl SubstituteSettings {
    pub fn new() -> Self {
        SubstituteSettings {
            name: None,
            substituted_type: TypeDesc::top(),
            default_answer: DefaultAnswer::empty(),
            strictness: Strictness::default(),
            stub_only: false,
            sequencer: None,
        }
    }

    /// Display name used in every rendered diagnostic.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    /// The type this substitute stands in for.  Carries the actual type
    /// arguments that deep-stub chaining resolves declared parameters
    /// against.
    pub fn of_type(mut self, ty: TypeDesc) -> Self {
        self.substituted_type = ty;
        self
    }

    pub fn default_answer(mut self, answer: DefaultAnswer) -> Self {
        self.default_answer = answer;
        self
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Keep only the most recent invocation in the log.
    pub fn stub_only(mut self) -> Self {
        self.stub_only = true;
        self
    }

    /// Draw sequence numbers from an explicit sequencer instead of the
    /// process-wide one.
    pub fn sequencer(mut self, sequencer: Arc<Sequencer>) -> Self {
        self.sequencer = Some(sequencer);
        self
    }
}

impl Default for SubstituteSettings {
    fn default() -> Self {
        SubstituteSettings::new()
    }
}

struct SubstituteInner {
    id: u64,
    name: String,
    substituted_type: TypeDesc,
    default_answer: DefaultAnswer,
    strictness: Strictness,
    stub_only: bool,
    sequencer: Arc<Sequencer>,
    container: InvocationContainer,
}

/// A handle on one substitute object.  Cheap to clone; clones share the
/// same identity and container.
#[derive(Clone)]
pub struct Substitute(Arc<SubstituteInner>);

impl Substitute {
    /// A substitute for `ty` with default settings.
    pub fn new(ty: TypeDesc) -> Self {
        Substitute::with_settings(SubstituteSettings::new().of_type(ty))
    }

    pub fn with_settings(settings: SubstituteSettings) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst) + 1;
        let name = settings
            .name
            .unwrap_or_else(|| {
                format!("substitute#{id} for {}", settings.substituted_type)
            });
        Substitute(Arc::new(SubstituteInner {
            id,
            name,
            substituted_type: settings.substituted_type,
            default_answer: settings.default_answer,
            strictness: settings.strictness,
            stub_only: settings.stub_only,
            sequencer: settings.sequencer.unwrap_or_else(global_sequencer),
            container: InvocationContainer::new(settings.stub_only),
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn substituted_type(&self) -> &TypeDesc {
        &self.0.substituted_type
    }

    pub fn strictness(&self) -> Strictness {
        self.0.strictness
    }

    pub(crate) fn is_stub_only(&self) -> bool {
        self.0.stub_only
    }

    pub(crate) fn sequencer(&self) -> Arc<Sequencer> {
        Arc::clone(&self.0.sequencer)
    }

    /// The substitute's container, for diagnostics snapshots.
    pub fn container(&self) -> &InvocationContainer {
        &self.0.container
    }

    /// The notification boundary: record one call attempt.  The location
    /// of the caller is captured automatically.
    #[track_caller]
    pub fn notify_invocation(
        &self,
        signature: MemberSignature,
        raw_args: Vec<Value>,
    ) -> Invocation {
        let location = Location::capture();
        let inv = self.0.container.record_invocation_with(|| {
            Invocation::new(
                self.0.id,
                &self.0.name,
                signature,
                raw_args,
                &self.0.sequencer,
                location,
            )
        });
        debug!(invocation = %inv.describe(), seq = inv.sequence_number(),
            "invocation recorded");
        inv
    }

    /// Resolve a recorded invocation: the newest matching rule answers, or
    /// the substitute's default-answer policy applies.
    ///
    /// Under strict stubs a miss fails immediately when unused rules for
    /// the same member exist, instead of waiting for post-hoc diagnostics.
    pub fn resolve(&self, inv: &Invocation) -> Result<CallOutcome, Error> {
        if let Some(rule) = self.0.container.find_answer_for(inv) {
            return Ok(rule.answer(inv));
        }
        if self.0.strictness == Strictness::StrictStubs {
            let unused =
                self.0.container.unused_same_signature(inv.signature());
            if !unused.is_empty() {
                return Err(argument_mismatch(inv, &unused));
            }
        }
        Ok(self.0.default_answer.answer(self, inv))
    }

    /// Notify and resolve in one step, the way an interception layer does.
    #[track_caller]
    pub fn call(
        &self,
        signature: MemberSignature,
        args: Vec<Value>,
    ) -> Result<CallOutcome, Error> {
        let inv = self.notify_invocation(signature, args);
        self.resolve(&inv)
    }

    /// Commit the most recent invocation to a stubbing statement.  With
    /// `None`, the invocation's own arguments become equality matchers.
    pub fn begin_stubbing(
        &self,
        matchers: Option<Vec<ArgMatcher>>,
    ) -> Result<(), Error> {
        self.0.container.begin_stubbing(matchers)
    }

    /// Attach an answer to the stubbing being built; `consecutive` appends
    /// to the most recently registered rule instead of creating a new one.
    pub fn attach_answer(
        &self,
        answer: Answer,
        consecutive: bool,
    ) -> Result<Arc<StubbingRule>, Error> {
        self.0.container.attach_answer(answer, consecutive)
    }

    /// Record, commit, and answer a stubbing in one step: the shape of a
    /// complete "when x then y" statement.
    #[track_caller]
    pub fn stub(
        &self,
        signature: MemberSignature,
        args: Vec<Value>,
        answer: Answer,
    ) -> Result<Arc<StubbingRule>, Error> {
        self.notify_invocation(signature, args);
        self.begin_stubbing(None)?;
        self.attach_answer(answer, false)
    }

    /// Like [`stub`](Substitute::stub), with explicit matchers replacing
    /// the recorded arguments.
    #[track_caller]
    pub fn stub_with_matchers(
        &self,
        signature: MemberSignature,
        args: Vec<Value>,
        matchers: Vec<ArgMatcher>,
        answer: Answer,
    ) -> Result<Arc<StubbingRule>, Error> {
        self.notify_invocation(signature, args);
        self.begin_stubbing(Some(matchers))?;
        self.attach_answer(answer, false)
    }
}

impl PartialEq for Substitute {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Substitute {}

impl fmt::Debug for Substitute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

fn argument_mismatch(
    inv: &Invocation,
    unused: &[Arc<StubbingRule>],
) -> Error {
    let actual = inv
        .raw_args()
        .iter()
        .map(|v| format!("{v:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    let stubbed = unused
        .iter()
        .map(|r| {
            let why = r
                .explain_mismatch(inv)
                .map(|w| format!("\n    {}", w.replace('\n', "\n    ")))
                .unwrap_or_default();
            format!("  stubbed as {} at {}{}", r.describe(), r.location(), why)
        })
        .collect::<Vec<_>>()
        .join("\n");
    Error::ArgumentMismatch {
        signature: inv.signature().to_string(),
        actual,
        call_location: inv.location().to_string(),
        stubbed,
    }
}
