// vim: tw=80
//! Strict stubs: argument mismatches fail at call time, unused stubbings
//! fail the end-of-test checkpoint.

use standin::*;

fn strict(name: &str) -> Substitute {
    Substitute::with_settings(
        SubstituteSettings::new()
            .name(name)
            .of_type(TypeDesc::object("Service"))
            .strictness(Strictness::StrictStubs),
    )
}

fn f_sig() -> MemberSignature {
    MemberSignature::new("Service", "f")
        .param(TypeDesc::primitive("i32"))
        .returns(TypeDesc::object("String"))
}

#[test]
fn mismatched_call_fails_fast() {
    let sub = strict("sub");
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();

    let err = sub.call(f_sig(), vec![Value::of(2)]).unwrap_err();
    match err {
        Error::ArgumentMismatch { signature, actual, stubbed, .. } => {
            assert!(signature.contains("Service.f"));
            assert_eq!(actual, "2");
            assert!(stubbed.contains("eq(1)"));
            assert!(stubbed.contains("strict_stubbing.rs"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn a_used_rule_does_not_trigger_the_call_time_check() {
    let sub = strict("sub");
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    sub.call(f_sig(), vec![Value::of(1)]).unwrap();

    // with the rule exercised, a differing call just gets the default
    let out = sub.call(f_sig(), vec![Value::of(2)]).unwrap();
    assert!(out.is_absent());
}

#[test]
fn unrelated_members_are_not_checked() {
    let sub = strict("sub");
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    let g = MemberSignature::new("Service", "g")
        .returns(TypeDesc::primitive("i32"));

    let out = sub.call(g, vec![]).unwrap();
    assert_eq!(out.returned().unwrap().downcast_ref::<i32>(), Some(&0));
}

#[test]
fn lenient_rules_do_not_trigger_the_call_time_check() {
    let sub = strict("sub");
    let rule = sub
        .stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    rule.set_lenient();

    assert!(sub.call(f_sig(), vec![Value::of(2)]).is_ok());
}

#[test]
fn unused_rules_fail_the_checkpoint() {
    let sub = strict("sub");
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();

    let err = verify_no_unused_stubbings([&sub]).unwrap_err();
    match err {
        Error::UnnecessaryStubbings { rendered } => {
            assert!(rendered.contains("sub.f(eq(1))"));
            assert!(rendered.contains("strict_stubbing.rs"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn an_exercised_strict_substitute_passes_the_checkpoint() {
    let sub = strict("sub");
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    sub.call(f_sig(), vec![Value::of(1)]).unwrap();

    verify_no_unused_stubbings([&sub]).unwrap();
}

#[test]
fn lenient_and_warn_substitutes_never_fail_the_checkpoint() {
    let lenient = Substitute::with_settings(
        SubstituteSettings::new().of_type(TypeDesc::object("Service")),
    );
    let warn = Substitute::with_settings(
        SubstituteSettings::new()
            .of_type(TypeDesc::object("Service"))
            .strictness(Strictness::Warn),
    );
    lenient
        .stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    warn.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();

    // findings stay advisory
    verify_no_unused_stubbings([&lenient, &warn]).unwrap();
    assert_eq!(find_unused_stubbings([&lenient, &warn]).len(), 2);
}

#[test]
fn strict_failures_name_every_unused_rule() {
    let sub = strict("sub");
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    sub.stub(f_sig(), vec![Value::of(2)], Answer::returns(Value::of("b")))
        .unwrap();

    let err = sub.call(f_sig(), vec![Value::of(3)]).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("eq(1)"));
    assert!(rendered.contains("eq(2)"));
}
