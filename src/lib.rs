// vim: tw=80
//! A stubbing and invocation-matching engine for test doubles.
//!
//! Standin is the core a mocking framework is built around: it records
//! every call made on a substitute object, registers "when this call
//! happens, do that" rules, resolves each incoming call to the right rule
//! (or to a default-answer policy), and tracks rule usage so that unused
//! stubbings and likely argument typos can be reported afterwards.
//!
//! It deliberately does *not* generate substitute objects, parse a matcher
//! DSL, or integrate with a test runner.  Those are collaborators layered
//! on top: an interception layer funnels every call attempt through
//! [`Substitute::notify_invocation`] and returns whatever
//! [`Substitute::resolve`] produces, and a stubbing DSL translates its
//! syntax into [`Substitute::begin_stubbing`] and
//! [`Substitute::attach_answer`].
//!
//! # Getting started
//!
//! Describe the member being called with a [`MemberSignature`], pass
//! arguments as erased [`Value`]s, and stub with an [`Answer`]:
//!
//! ```
//! use standin::*;
//!
//! let sub = Substitute::new(TypeDesc::object("Service"));
//! let greet = MemberSignature::new("Service", "greet")
//!     .param(TypeDesc::object("String"))
//!     .returns(TypeDesc::object("String"));
//!
//! sub.stub(greet.clone(), vec![Value::of("a")],
//!     Answer::returns(Value::of("hi"))).unwrap();
//!
//! let out = sub.call(greet.clone(), vec![Value::of("a")]).unwrap();
//! assert_eq!(out.returned().unwrap().downcast_ref::<&str>(), Some(&"hi"));
//!
//! // An unstubbed call gets the default-answer policy: here, the
//! // empty-values table, which has no entry for "String" objects.
//! let out = sub.call(greet, vec![Value::of("b")]).unwrap();
//! assert!(out.is_absent());
//! ```
//!
//! # Consecutive answers
//!
//! A rule's answers are consumed first-in first-out, and the last one
//! replays forever:
//!
//! ```
//! use standin::*;
//!
//! let sub = Substitute::new(TypeDesc::object("Counter"));
//! let size = MemberSignature::new("Counter", "size")
//!     .returns(TypeDesc::primitive("i32"));
//!
//! sub.stub(size.clone(), vec![], Answer::returns(Value::of(1))).unwrap();
//! sub.attach_answer(Answer::returns(Value::of(2)), true).unwrap();
//! sub.attach_answer(Answer::returns(Value::of(3)), true).unwrap();
//!
//! for expected in [1, 2, 3, 3] {
//!     let out = sub.call(size.clone(), vec![]).unwrap();
//!     assert_eq!(out.returned().unwrap().downcast_ref::<i32>(),
//!                Some(&expected));
//! }
//! ```
//!
//! # Matching arguments
//!
//! Stubbing with raw values matches by value equality.  Anything
//! implementing [`Predicate<Value>`](Predicate) can replace that:
//!
//! ```
//! use standin::*;
//!
//! let sub = Substitute::new(TypeDesc::object("Service"));
//! let add = MemberSignature::new("Service", "add")
//!     .param(TypeDesc::primitive("i32"))
//!     .returns(TypeDesc::primitive("i32"));
//!
//! sub.stub_with_matchers(
//!     add.clone(),
//!     vec![Value::of(0)],
//!     vec![ArgMatcher::from_fn(|v| {
//!         v.downcast_ref::<i32>().is_some_and(|x| *x > 3)
//!     })],
//!     Answer::returns(Value::of(100)),
//! ).unwrap();
//!
//! let out = sub.call(add.clone(), vec![Value::of(5)]).unwrap();
//! assert_eq!(out.returned().unwrap().downcast_ref::<i32>(), Some(&100));
//!
//! // 1 fails the predicate, so the empty-values default answers: zero
//! let out = sub.call(add, vec![Value::of(1)]).unwrap();
//! assert_eq!(out.returned().unwrap().downcast_ref::<i32>(), Some(&0));
//! ```
//!
//! On a call, rules for the member are scanned newest first and the first
//! match wins, so re-stubbing an overlapping call shape supersedes the
//! older rule without deleting it.
//!
//! # Deep stubs
//!
//! With the deep-stubs default answer, an unstubbed call whose return type
//! is substitute-capable produces a memoized child substitute, so chained
//! call expressions resolve consistently:
//!
//! ```
//! use standin::*;
//!
//! let a = Substitute::with_settings(SubstituteSettings::new()
//!     .name("a")
//!     .of_type(TypeDesc::object("Root"))
//!     .default_answer(DefaultAnswer::deep_stubs()));
//! let b = MemberSignature::new("Root", "b")
//!     .returns(TypeDesc::object("Mid"));
//!
//! let out = a.call(b.clone(), vec![]).unwrap();
//! let child = out.returned().unwrap()
//!     .downcast_ref::<Substitute>().unwrap().clone();
//!
//! let again = a.call(b, vec![]).unwrap();
//! assert_eq!(again.returned().unwrap().downcast_ref::<Substitute>(),
//!            Some(&child));
//! ```
//!
//! # Strictness and diagnostics
//!
//! [`find_unused_stubbings`] and [`find_arg_mismatches`] analyze any set
//! of substitutes after the fact.  Under
//! [`Strictness::StrictStubs`] the same findings become errors: argument
//! mismatches fail at call time, unused stubbings fail the end-of-test
//! checkpoint.
//!
//! ```
//! use standin::*;
//!
//! let sub = Substitute::with_settings(SubstituteSettings::new()
//!     .of_type(TypeDesc::object("Service"))
//!     .strictness(Strictness::StrictStubs));
//! let f = MemberSignature::new("Service", "f")
//!     .param(TypeDesc::primitive("i32"))
//!     .returns(TypeDesc::primitive("i32"));
//!
//! sub.stub(f.clone(), vec![Value::of(1)],
//!     Answer::returns(Value::of(10))).unwrap();
//!
//! let err = sub.call(f, vec![Value::of(2)]).unwrap_err();
//! assert!(matches!(err, Error::ArgumentMismatch { .. }));
//!
//! assert!(verify_no_unused_stubbings([&sub]).is_err());
//! ```
//!
//! # Concurrency
//!
//! Multiple threads may call the same substitute concurrently.  Each
//! container serializes its own mutations, diagnostics snapshots never
//! observe a half-published rule, and invocation sequence numbers come
//! from a process-wide [`Sequencer`] (or an explicit one, for isolated
//! harnesses), so they are unique and monotonic across every substitute.

pub mod answer;
pub mod container;
mod deep;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod invocation;
pub mod matcher;
pub mod signature;
pub mod stubbing;
pub mod substitute;
pub mod value;

pub use crate::answer::{Answer, CallOutcome, Throwable};
pub use crate::container::InvocationContainer;
pub use crate::defaults::{DefaultAnswer, EmptyValues, SmartNull};
pub use crate::diagnostics::{
    find_arg_mismatches, find_unused_stubbings, verify_no_unused_stubbings,
    ArgMismatch, StubbingArgMismatches, UnusedStubbings,
};
pub use crate::error::Error;
pub use crate::invocation::{
    global_sequencer, Invocation, Location, Sequencer,
};
pub use crate::matcher::{ArgMatcher, ArgumentMatchSet};
pub use crate::signature::{MemberSignature, TypeDesc, TypeKind};
pub use crate::stubbing::StubbingRule;
pub use crate::substitute::{Strictness, Substitute, SubstituteSettings};
pub use crate::value::{ArgLike, Value};

pub use predicates::prelude::{predicate, Predicate};
