// vim: tw=80
//! Unused-stubbing detection over container snapshots.

use standin::*;

fn service(name: &str) -> Substitute {
    Substitute::with_settings(
        SubstituteSettings::new()
            .name(name)
            .of_type(TypeDesc::object("Service")),
    )
}

fn f_sig() -> MemberSignature {
    MemberSignature::new("Service", "f")
        .param(TypeDesc::primitive("i32"))
        .returns(TypeDesc::object("String"))
}

#[test]
fn no_stubbings_no_findings() {
    let sub = service("sub");
    sub.call(f_sig(), vec![Value::of(1)]).unwrap();
    assert!(find_unused_stubbings([&sub]).is_empty());
}

#[test]
fn a_never_matched_rule_is_reported() {
    let sub = service("sub");
    let rule = sub
        .stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();

    let unused = find_unused_stubbings([&sub]);
    assert_eq!(unused.len(), 1);
    assert_eq!(unused.rules()[0].location(), rule.location());
    assert!(unused.report().contains("unused_stubbings.rs"));
}

#[test]
fn a_matched_rule_is_excluded() {
    let sub = service("sub");
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    sub.call(f_sig(), vec![Value::of(1)]).unwrap();

    assert!(find_unused_stubbings([&sub]).is_empty());
}

#[test]
fn findings_span_substitutes_in_creation_order() {
    let first = service("first");
    let second = service("second");
    first
        .stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    second
        .stub(f_sig(), vec![Value::of(2)], Answer::returns(Value::of("b")))
        .unwrap();
    second
        .stub(f_sig(), vec![Value::of(3)], Answer::returns(Value::of("c")))
        .unwrap();
    second.call(f_sig(), vec![Value::of(2)]).unwrap();

    let unused = find_unused_stubbings([&first, &second]);
    assert_eq!(unused.len(), 2);
    let described: Vec<_> =
        unused.iter().map(|r| r.describe()).collect();
    assert!(described[0].starts_with("first.f"));
    assert!(described[1].starts_with("second.f"));
}

#[test]
fn lenient_rules_are_excluded() {
    let sub = service("sub");
    let rule = sub
        .stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    rule.set_lenient();

    assert!(find_unused_stubbings([&sub]).is_empty());
}

#[test]
fn a_superseded_but_matched_rule_still_counts_as_used() {
    let sub = service("sub");
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("a")))
        .unwrap();
    sub.call(f_sig(), vec![Value::of(1)]).unwrap();
    // shadow it afterwards
    sub.stub(f_sig(), vec![Value::of(1)], Answer::returns(Value::of("b")))
        .unwrap();

    let unused = find_unused_stubbings([&sub]);
    assert_eq!(unused.len(), 1);
    assert!(unused.rules()[0].describe().contains("\"b\""));
}
