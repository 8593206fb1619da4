// vim: tw=80
//! The invocation log: call order, stubbing-call exclusion, stub-only
//! truncation.

use standin::*;

fn f_sig() -> MemberSignature {
    MemberSignature::new("Service", "f")
        .param(TypeDesc::primitive("i32"))
        .returns(TypeDesc::primitive("i32"))
}

#[test]
fn production_calls_are_logged_in_call_order() {
    let sub = Substitute::new(TypeDesc::object("Service"));
    for x in [1, 2, 3] {
        sub.call(f_sig(), vec![Value::of(x)]).unwrap();
    }

    let log = sub.container().invocations();
    assert_eq!(log.len(), 3);
    let seqs: Vec<u64> =
        log.iter().map(|i| i.sequence_number()).collect();
    let mut sorted = seqs.clone();
    sorted.sort_unstable();
    assert_eq!(seqs, sorted);
    assert_eq!(log[0].raw_args()[0], Value::of(1));
    assert_eq!(log[2].raw_args()[0], Value::of(3));
}

#[test]
fn a_stubbing_call_is_not_a_production_call() {
    let sub = Substitute::new(TypeDesc::object("Service"));
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of(2)))
        .unwrap();

    assert!(sub.container().invocations().is_empty());

    sub.call(f_sig(), vec![Value::of(1)]).unwrap();
    assert_eq!(sub.container().invocations().len(), 1);
}

#[test]
fn stub_only_substitutes_keep_only_the_latest_invocation() {
    let sub = Substitute::with_settings(
        SubstituteSettings::new()
            .of_type(TypeDesc::object("Service"))
            .stub_only(),
    );
    for x in [1, 2, 3] {
        sub.call(f_sig(), vec![Value::of(x)]).unwrap();
    }

    let log = sub.container().invocations();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].raw_args()[0], Value::of(3));
}

#[test]
fn an_answered_invocation_points_back_at_its_rule() {
    let sub = Substitute::new(TypeDesc::object("Service"));
    let rule = sub
        .stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of(2)))
        .unwrap();

    let inv = sub.notify_invocation(f_sig(), vec![Value::of(1)]);
    sub.resolve(&inv).unwrap();

    let back = inv.stubbed_by().unwrap();
    assert_eq!(back.location(), rule.location());
    assert_eq!(rule.answered(), vec![inv.clone()]);

    // an unmatched invocation has no back-reference
    let miss = sub.notify_invocation(f_sig(), vec![Value::of(9)]);
    sub.resolve(&miss).unwrap();
    assert!(miss.stubbed_by().is_none());
}

#[test]
fn the_verification_marker_is_one_shot() {
    let sub = Substitute::new(TypeDesc::object("Service"));
    let inv = sub.notify_invocation(f_sig(), vec![Value::of(1)]);

    assert!(!inv.is_verified());
    assert!(inv.mark_verified());
    assert!(inv.is_verified());
    // a second marking reports that it was already set
    assert!(!inv.mark_verified());

    // clones share the record
    let log = sub.container().invocations();
    assert!(log[0].is_verified());
}

#[test]
fn sequence_numbers_are_unique_across_substitutes() {
    let a = Substitute::new(TypeDesc::object("A"));
    let b = Substitute::new(TypeDesc::object("B"));
    let ping = MemberSignature::new("A", "ping");

    let i1 = a.notify_invocation(ping.clone(), vec![]);
    let i2 = b.notify_invocation(ping.clone(), vec![]);
    let i3 = a.notify_invocation(ping, vec![]);

    assert!(i1.sequence_number() < i2.sequence_number());
    assert!(i2.sequence_number() < i3.sequence_number());
}

#[test]
fn an_isolated_sequencer_can_be_reset() {
    let seq = std::sync::Arc::new(Sequencer::new());
    let sub = Substitute::with_settings(
        SubstituteSettings::new()
            .of_type(TypeDesc::object("Service"))
            .sequencer(seq.clone()),
    );
    let ping = MemberSignature::new("Service", "ping");

    let first = sub.notify_invocation(ping.clone(), vec![]);
    assert_eq!(first.sequence_number(), 1);
    assert_eq!(seq.current(), 1);

    seq.reset();
    let again = sub.notify_invocation(ping, vec![]);
    assert_eq!(again.sequence_number(), 1);
}
