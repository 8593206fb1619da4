// vim: tw=80
//! Deep-stub chaining: `a.b().c()`-style expressions resolve to consistent
//! values without per-hop stubbing.

use crate::answer::CallOutcome;
use crate::defaults::{DefaultAnswer, EmptyValues};
use crate::invocation::Invocation;
use crate::substitute::{Substitute, SubstituteSettings};

/// Answer a miss by chaining: when the member's return type is
/// substitute-capable, a memoized child substitute becomes the permanent
/// recorded answer for this exact call shape.
///
/// The child's own default policy is deep stubs again, so chains recurse,
/// and the resolved return type (with the substitute's actual type
/// arguments applied) seeds the child, so a chain through a parameterized
/// container lands on the element type.  A fully erased return type yields
/// the absent value instead of a guess, and a non-substitutable one falls
/// through to the empty-values policy; neither is an error.
pub(crate) fn deep_stub(sub: &Substitute, inv: &Invocation) -> CallOutcome {
    let return_type =
        inv.signature().resolve_return_against(sub.substituted_type());
    if return_type.is_top() {
        return CallOutcome::Returns(None);
    }
    if !return_type.is_mockable() {
        return CallOutcome::Returns(
            EmptyValues::standard().value_for(&return_type),
        );
    }
    let rule = sub.container().find_or_chain(inv, || {
        let mut settings = SubstituteSettings::new()
            .name(&format!("{}.{}", sub.name(), inv.signature().name()))
            .of_type(return_type.clone())
            .default_answer(DefaultAnswer::deep_stubs())
            .strictness(sub.strictness())
            .sequencer(sub.sequencer());
        if sub.is_stub_only() {
            settings = settings.stub_only();
        }
        Substitute::with_settings(settings)
    });
    rule.answer(inv)
}
