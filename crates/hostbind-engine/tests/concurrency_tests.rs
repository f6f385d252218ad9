//! Shared Slot Table Concurrency Tests
//!
//! Each registration entry owns one slot table. These tests check that an
//! overlapping call into the same entry fails fast with `ContextBusy`, while
//! calls into different entries proceed independently.

use std::sync::{Arc, Barrier};
use std::thread;

use hostbind_engine::{
    BindError, CallTarget, MemorySink, NativeExecutor, ObjectTable, RegistryBuilder,
    ScriptCaller,
};

#[test]
fn test_overlapping_call_is_busy() {
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));

    let sink = Arc::new(MemorySink::new());
    let mut builder = RegistryBuilder::new().with_diagnostics(sink.clone());
    {
        let entered = entered.clone();
        let release = release.clone();
        builder
            .register_function("Wait", move |n: i32| {
                entered.wait();
                release.wait();
                n
            })
            .unwrap();
    }
    builder.register_function("Echo", |n: i32| n).unwrap();

    let registry = Arc::new(builder.build());
    let objects = Arc::new(ObjectTable::new());
    let executor = NativeExecutor::new(registry.clone(), objects.clone());
    let caller = ScriptCaller::new(&registry, &executor, objects.as_ref());

    thread::scope(|s| {
        let first = s.spawn(|| caller.call::<i32, _>(&CallTarget::function("Wait"), (1,)));

        // the first call now holds the slot table of `Wait`
        entered.wait();
        let err = caller
            .call::<i32, _>(&CallTarget::function("Wait"), (2,))
            .unwrap_err();
        assert_eq!(err, BindError::ContextBusy("Wait".to_string()));

        let echo: i32 = caller.call(&CallTarget::function("Echo"), (3,)).unwrap();
        assert_eq!(echo, 3);

        release.wait();
        assert_eq!(first.join().unwrap(), Ok(1));
    });

    assert_eq!(sink.len(), 1);

    // the table is free again once the first call has finished
    let entry = registry.find_by_name("", "Wait").unwrap();
    assert!(entry.lock_context().is_ok());
}

#[test]
fn test_parallel_calls_into_different_entries() {
    let mut builder = RegistryBuilder::new();
    for name in ["A", "B", "C", "D"] {
        builder.register_function(name, |a: i32, b: i32| a * b).unwrap();
    }
    let registry = Arc::new(builder.build());
    let objects = Arc::new(ObjectTable::new());
    let executor = NativeExecutor::new(registry.clone(), objects.clone());
    let caller = ScriptCaller::new(&registry, &executor, objects.as_ref());

    thread::scope(|s| {
        let handles: Vec<_> = ["A", "B", "C", "D"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let caller = &caller;
                s.spawn(move || {
                    let target = CallTarget::function(name);
                    (0..200)
                        .map(|n| caller.call::<i32, _>(&target, (n, i as i32)).unwrap())
                        .sum::<i32>()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected: i32 = (0..200).map(|n| n * i as i32).sum();
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
