// vim: tw=80
//! Concurrent calls against one substitute: serialized mutation, unique
//! monotonic sequence numbers, consistent usage marking.

use std::collections::HashSet;
use std::thread;

use standin::*;

const THREADS: usize = 8;
const CALLS: usize = 50;

fn ping_sig() -> MemberSignature {
    MemberSignature::new("Service", "ping")
        .param(TypeDesc::primitive("usize"))
        .returns(TypeDesc::primitive("usize"))
}

#[test]
fn concurrent_calls_are_all_recorded_exactly_once() {
    let sub = Substitute::new(TypeDesc::object("Service"));
    sub.stub_with_matchers(
        ping_sig(),
        vec![Value::of(0usize)],
        vec![ArgMatcher::any()],
        Answer::delegates_to(|inv| {
            CallOutcome::Returns(Some(inv.raw_args()[0].clone()))
        }),
    )
    .unwrap();

    thread::scope(|s| {
        for t in 0..THREADS {
            let sub = sub.clone();
            s.spawn(move || {
                for i in 0..CALLS {
                    let out = sub
                        .call(ping_sig(), vec![Value::of(t * CALLS + i)])
                        .unwrap();
                    assert_eq!(
                        out.returned().unwrap().downcast_ref::<usize>(),
                        Some(&(t * CALLS + i)),
                    );
                }
            });
        }
    });

    let log = sub.container().invocations();
    assert_eq!(log.len(), THREADS * CALLS);

    // log order agrees with sequence order, and no number repeats
    let seqs: Vec<u64> = log.iter().map(|i| i.sequence_number()).collect();
    let mut sorted = seqs.clone();
    sorted.sort_unstable();
    assert_eq!(seqs, sorted);
    let unique: HashSet<u64> = seqs.iter().copied().collect();
    assert_eq!(unique.len(), seqs.len());

    let rules = sub.container().rules();
    assert_eq!(rules.len(), 1);
    assert!(rules[0].was_used());
    assert_eq!(rules[0].answered().len(), THREADS * CALLS);
}

#[test]
fn concurrent_chaining_memoizes_one_child_per_shape() {
    let sub = Substitute::with_settings(
        SubstituteSettings::new()
            .of_type(TypeDesc::object("Root"))
            .default_answer(DefaultAnswer::deep_stubs()),
    );
    let b = MemberSignature::new("Root", "b")
        .returns(TypeDesc::object("Mid"));

    let children: Vec<Substitute> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let sub = sub.clone();
                let b = b.clone();
                s.spawn(move || {
                    let out = sub.call(b, vec![]).unwrap();
                    out.returned()
                        .unwrap()
                        .downcast_ref::<Substitute>()
                        .unwrap()
                        .clone()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // every thread observed the same memoized child
    assert!(children.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(sub.container().rules().len(), 1);
}

#[test]
fn snapshots_are_safe_during_ongoing_recording() {
    let sub = Substitute::new(TypeDesc::object("Service"));
    sub.stub_with_matchers(
        ping_sig(),
        vec![Value::of(0usize)],
        vec![ArgMatcher::any()],
        Answer::returns(Value::of(1usize)),
    )
    .unwrap();

    thread::scope(|s| {
        let writer = sub.clone();
        s.spawn(move || {
            for i in 0..CALLS {
                writer.call(ping_sig(), vec![Value::of(i)]).unwrap();
            }
        });
        let reader = sub.clone();
        s.spawn(move || {
            for _ in 0..CALLS {
                // a published rule always has its answers attached
                for rule in reader.container().rules() {
                    let _ = rule.describe();
                }
                let _ = find_unused_stubbings([&reader]);
                let _ = find_arg_mismatches([&reader]);
            }
        });
    });
}
