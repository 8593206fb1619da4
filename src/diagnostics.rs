// vim: tw=80
//! Post-hoc analyses over one or more substitutes: which rules were never
//! exercised, and which unstubbed calls look like mistyped stubbings.
//!
//! Both analyses are read-only over container snapshots and safe to run
//! while other threads keep calling the substitutes.

use std::sync::Arc;

use tracing::warn;

use crate::error::Error;
use crate::invocation::Invocation;
use crate::stubbing::StubbingRule;
use crate::substitute::{Strictness, Substitute};

/// Rules that were never exercised, in creation order.
///
/// A rule used by any matching call, or born used by deep-stub chaining,
/// never appears here; neither does a lenient rule.
pub struct UnusedStubbings {
    rules: Vec<Arc<StubbingRule>>,
}

impl UnusedStubbings {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &[Arc<StubbingRule>] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<StubbingRule>> {
        self.rules.iter()
    }

    /// One line per unused rule, with its creation location.
    pub fn report(&self) -> String {
        self.rules
            .iter()
            .map(|r| format!("  {} at {}", r.describe(), r.location()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One unused rule paired with the same-member calls that were made with
/// different arguments: the "did you mean to stub with different
/// arguments" lint.
pub struct ArgMismatch {
    rule: Arc<StubbingRule>,
    invocations: Vec<Invocation>,
}

impl ArgMismatch {
    pub fn rule(&self) -> &Arc<StubbingRule> {
        &self.rule
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }
}

/// All mismatch pairings found across the analyzed substitutes.
pub struct StubbingArgMismatches {
    mismatches: Vec<ArgMismatch>,
}

impl StubbingArgMismatches {
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArgMismatch> {
        self.mismatches.iter()
    }

    pub fn report(&self) -> String {
        let mut out = Vec::new();
        for m in &self.mismatches {
            out.push(format!(
                "  {} at {}",
                m.rule.describe(),
                m.rule.location(),
            ));
            for i in &m.invocations {
                out.push(format!(
                    "    was called as {} at {}",
                    i.describe(),
                    i.location(),
                ));
            }
        }
        out.join("\n")
    }
}

/// Every rule that was never exercised, across all given substitutes,
/// ordered by creation.
pub fn find_unused_stubbings<'a, I>(substitutes: I) -> UnusedStubbings
where
    I: IntoIterator<Item = &'a Substitute>,
{
    let mut rules: Vec<_> = substitutes
        .into_iter()
        .flat_map(|s| s.container().rules())
        .filter(|r| !r.was_used() && !r.is_lenient())
        .collect();
    rules.sort_by_key(|r| r.creation_order());
    UnusedStubbings { rules }
}

/// Pair each unused rule with the unstubbed same-member invocations that
/// carried different arguments.
///
/// An invocation that matched some other rule is accounted for, not a
/// mismatch, and is excluded from every pairing.
pub fn find_arg_mismatches<'a, I>(substitutes: I) -> StubbingArgMismatches
where
    I: IntoIterator<Item = &'a Substitute>,
{
    let mut mismatches = Vec::new();
    for sub in substitutes {
        let unstubbed: Vec<_> = sub
            .container()
            .invocations()
            .into_iter()
            .filter(|i| i.stubbed_by().is_none())
            .collect();
        for rule in sub.container().rules() {
            if rule.was_used() || rule.is_lenient() {
                continue;
            }
            let hits: Vec<_> = unstubbed
                .iter()
                .filter(|i| i.signature() == rule.signature())
                .cloned()
                .collect();
            if !hits.is_empty() {
                mismatches.push(ArgMismatch { rule, invocations: hits });
            }
        }
    }
    mismatches.sort_by_key(|m| m.rule.creation_order());
    StubbingArgMismatches { mismatches }
}

/// The end-of-test checkpoint.
///
/// Strict-stubs substitutes with unused rules fail with
/// [`Error::UnnecessaryStubbings`]; warn-level substitutes log their
/// findings as advisories; lenient substitutes are left alone.
pub fn verify_no_unused_stubbings<'a, I>(substitutes: I) -> Result<(), Error>
where
    I: IntoIterator<Item = &'a Substitute>,
{
    let subs: Vec<_> = substitutes.into_iter().collect();

    let warned: Vec<_> = subs
        .iter()
        .copied()
        .filter(|s| s.strictness() == Strictness::Warn)
        .collect();
    if !warned.is_empty() {
        let unused = find_unused_stubbings(warned.iter().copied());
        if !unused.is_empty() {
            warn!("unused stubbings:\n{}", unused.report());
        }
        let mismatches = find_arg_mismatches(warned.into_iter());
        if !mismatches.is_empty() {
            warn!("possible argument mismatches:\n{}", mismatches.report());
        }
    }

    let strict: Vec<_> = subs
        .iter()
        .copied()
        .filter(|s| s.strictness() == Strictness::StrictStubs)
        .collect();
    let unused = find_unused_stubbings(strict.into_iter());
    if unused.is_empty() {
        Ok(())
    } else {
        Err(Error::UnnecessaryStubbings { rendered: unused.report() })
    }
}
