// vim: tw=80
//! The engine's error taxonomy.
//!
//! Misuse errors and strict-mode call-time mismatches are returned
//! synchronously at the point of misuse.  Diagnostic findings stay plain
//! data unless the end-of-test checkpoint escalates them under strict
//! stubs.

use thiserror::Error;

/// Everything a fallible engine operation can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Stubbing was begun, or an answer attached, without a preceding
    /// invocation on the substitute.
    #[error("stubbing requires a preceding invocation on the substitute")]
    UnfinishedStubbing,

    /// Matcher count differs from the member's formal parameter count.
    #[error("{matchers} matcher(s) supplied for the {params} parameter(s) \
             of {signature}")]
    ArityMismatch {
        signature: String,
        matchers: usize,
        params: usize,
    },

    /// A return value was promised for a unit-returning member.
    #[error("{signature} returns nothing; a return value cannot be stubbed \
             for it")]
    VoidWithReturnValue { signature: String },

    /// A checked throwable was registered that the member does not declare.
    #[error("{thrown} is not declared by {signature}")]
    UndeclaredThrowable { signature: String, thrown: String },

    /// A throwable without a type was registered.
    #[error("a throwable without a type was registered for {signature}")]
    InvalidThrowable { signature: String },

    /// Strict stubs only: a call matched a rule's member but none of the
    /// registered argument sets, while unused rules for that member exist.
    /// Raised at call time.
    #[error("argument mismatch on {signature}\n  called with ({actual}) at \
             {call_location}\n{stubbed}")]
    ArgumentMismatch {
        signature: String,
        actual: String,
        call_location: String,
        /// One line per unused same-member rule: its matchers, creation
        /// location, and why the actual arguments were rejected.
        stubbed: String,
    },

    /// Strict stubs only: rules that were never exercised, reported by the
    /// end-of-test checkpoint.
    #[error("unnecessary stubbings:\n{rendered}")]
    UnnecessaryStubbings { rendered: String },
}

impl Error {
    /// Is this a programmer error in how the API was used, as opposed to a
    /// strictness finding?
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Error::UnfinishedStubbing
                | Error::ArityMismatch { .. }
                | Error::VoidWithReturnValue { .. }
                | Error::UndeclaredThrowable { .. }
                | Error::InvalidThrowable { .. }
        )
    }
}
