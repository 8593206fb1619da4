// vim: tw=80
//! FIFO answer consumption, with the last answer replayed indefinitely.

use standin::*;

fn counter() -> (Substitute, MemberSignature) {
    let sub = Substitute::new(TypeDesc::object("Counter"));
    let size = MemberSignature::new("Counter", "size")
        .returns(TypeDesc::primitive("i32"));
    (sub, size)
}

fn returned_i32(out: &CallOutcome) -> i32 {
    *out.returned().unwrap().downcast_ref::<i32>().unwrap()
}

#[test]
fn consecutive_answers_consume_then_replay() {
    let (sub, size) = counter();
    sub.stub(size.clone(), vec![], Answer::returns(Value::of(1))).unwrap();
    sub.attach_answer(Answer::returns(Value::of(2)), true).unwrap();
    sub.attach_answer(Answer::returns(Value::of(3)), true).unwrap();

    for expected in [1, 2, 3, 3, 3] {
        let out = sub.call(size.clone(), vec![]).unwrap();
        assert_eq!(returned_i32(&out), expected);
    }
}

#[test]
fn single_answer_replays_forever() {
    let (sub, size) = counter();
    sub.stub(size.clone(), vec![], Answer::returns(Value::of(42))).unwrap();

    for _ in 0..4 {
        let out = sub.call(size.clone(), vec![]).unwrap();
        assert_eq!(returned_i32(&out), 42);
    }
}

#[test]
fn consecutive_answers_can_mix_returns_and_raises() {
    let (sub, size) = counter();
    sub.stub(size.clone(), vec![], Answer::returns(Value::of(1))).unwrap();
    sub.attach_answer(Answer::raises(Throwable::new("Overflow")), true)
        .unwrap();

    let out = sub.call(size.clone(), vec![]).unwrap();
    assert_eq!(returned_i32(&out), 1);

    let out = sub.call(size.clone(), vec![]).unwrap();
    assert_eq!(out.raised().unwrap().type_name(), "Overflow");

    // the raise is the last answer; it replays
    let out = sub.call(size, vec![]).unwrap();
    assert!(out.raised().is_some());
}

#[test]
fn consecutive_attach_without_rule_is_misuse() {
    let (sub, size) = counter();
    sub.notify_invocation(size, vec![]);
    sub.begin_stubbing(None).unwrap();

    let err =
        sub.attach_answer(Answer::returns(Value::of(1)), true).unwrap_err();
    assert!(matches!(err, Error::UnfinishedStubbing));
}

#[test]
fn consecutive_answers_affect_only_the_newest_rule() {
    let sub = Substitute::new(TypeDesc::object("Service"));
    let f = MemberSignature::new("Service", "f")
        .param(TypeDesc::primitive("i32"))
        .returns(TypeDesc::primitive("i32"));

    sub.stub(f.clone(), vec![Value::of(1)], Answer::returns(Value::of(10)))
        .unwrap();
    sub.stub(f.clone(), vec![Value::of(2)], Answer::returns(Value::of(20)))
        .unwrap();
    sub.attach_answer(Answer::returns(Value::of(21)), true).unwrap();

    // the older rule keeps its single answer
    for _ in 0..2 {
        let out = sub.call(f.clone(), vec![Value::of(1)]).unwrap();
        assert_eq!(returned_i32(&out), 10);
    }
    let out = sub.call(f.clone(), vec![Value::of(2)]).unwrap();
    assert_eq!(returned_i32(&out), 20);
    let out = sub.call(f, vec![Value::of(2)]).unwrap();
    assert_eq!(returned_i32(&out), 21);
}
