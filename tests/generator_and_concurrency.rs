//! End-to-end scenarios S6 (generator sequence) and S7 (`WaitGroup` barrier).

use php_runtime_core::concurrency::{go, WaitGroup};
use php_runtime_core::generator::{Generator, Resumption};
use php_runtime_core::Value;

#[test]
fn scenario_s6_generator_sequence_matches_iterator_contract() {
    let mut gen = Generator::spawn(
        vec![],
        Box::new(|_args, ctl| {
            for i in 1..=3 {
                match ctl.yield_value(None, Value::Int(i)) {
                    Resumption::Value(_) => {}
                    Resumption::Thrown(e) => return Err(e),
                    Resumption::Cancelled => return Ok(Value::Null),
                }
            }
            Ok(Value::str("done"))
        }),
    );

    assert!(gen.valid());
    assert_eq!(gen.current().to_int(), 1);
    gen.next();
    assert_eq!(gen.current().to_int(), 2);
    gen.next();
    assert_eq!(gen.current().to_int(), 3);
    gen.next();
    assert!(!gen.valid());
    assert_eq!(gen.get_return().unwrap().to_php_string(), b"done");
}

#[test]
fn scenario_s7_wait_group_barrier_releases_after_all_done() {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    let wg = WaitGroup::new();
    let total = Arc::new(AtomicI64::new(0));
    wg.add(5).unwrap();

    let mut handles = Vec::new();
    for i in 1..=5 {
        let wg = wg.clone();
        let total = total.clone();
        handles.push(go(
            vec![Value::Int(i)],
            Box::new(move |args| {
                total.fetch_add(args[0].to_int(), Ordering::SeqCst);
                wg.done().unwrap();
            }),
        ));
    }

    wg.wait();
    assert_eq!(total.load(Ordering::SeqCst), 15);
    for h in handles {
        h.join();
    }
}

#[test]
fn throwing_into_a_suspended_generator_unwinds_the_producer() {
    let mut gen = Generator::spawn(
        vec![],
        Box::new(|_args, ctl| {
            match ctl.yield_value(None, Value::Int(1)) {
                Resumption::Thrown(e) => Err(e),
                _ => Ok(Value::Null),
            }
        }),
    );
    assert!(gen.valid());
    let err = gen.throw(Value::str("boom"));
    assert!(err.is_ok());
    assert!(!gen.valid());
}
