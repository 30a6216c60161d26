//! Tests for promise callback ordering through the microtask queue
//!
//! The `*_with_enqueue` promise forms defer every callback through the
//! queue; draining the queue then runs them in FIFO order.

use lutra_core::{JsString, Value};
use lutra_runtime::{JsPromise, MicrotaskQueue};
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn test_then_with_enqueue_defers_until_drain() {
    let queue = Arc::new(MicrotaskQueue::new());
    let promise = JsPromise::resolved(Value::number(42.0));
    let log = Arc::new(Mutex::new(Vec::new()));

    {
        let queue = queue.clone();
        let log = log.clone();
        promise.then_with_enqueue(
            move |v| log.lock().push(v.as_number().unwrap_or(f64::NAN)),
            |task| queue.enqueue(task),
        );
    }

    // Even though the promise was already fulfilled, the callback waits
    // for the drain
    assert!(log.lock().is_empty());
    assert_eq!(queue.drain(), 1);
    assert_eq!(*log.lock(), vec![42.0]);
}

#[test]
fn test_resolve_with_enqueue_runs_callbacks_in_registration_order() {
    let queue = Arc::new(MicrotaskQueue::new());
    let promise = JsPromise::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    for label in ["first", "second", "third"] {
        let log = log.clone();
        promise.then(move |_| log.lock().push(label));
    }

    {
        let queue = queue.clone();
        promise.resolve_with_enqueue(Value::null(), move |task| queue.enqueue(task));
    }

    assert!(log.lock().is_empty());
    queue.drain();
    assert_eq!(*log.lock(), vec!["first", "second", "third"]);
}

#[test]
fn test_callback_enqueues_followup_microtask() {
    // A promise callback can schedule more deferred work; one drain runs both
    let queue = Arc::new(MicrotaskQueue::new());
    let promise = JsPromise::resolved(Value::boolean(true));
    let log = Arc::new(Mutex::new(Vec::new()));

    {
        let queue_outer = queue.clone();
        let queue_inner = queue.clone();
        let log = log.clone();
        promise.then_with_enqueue(
            move |_| {
                log.lock().push("callback");
                let log = log.clone();
                queue_inner.enqueue(move || log.lock().push("followup"));
            },
            move |task| queue_outer.enqueue(task),
        );
    }

    assert_eq!(queue.drain(), 2);
    assert_eq!(*log.lock(), vec!["callback", "followup"]);
}

#[test]
fn test_finally_with_enqueue_on_rejection() {
    let queue = Arc::new(MicrotaskQueue::new());
    let promise = JsPromise::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    {
        let log = log.clone();
        promise.catch(move |e| {
            log.lock()
                .push(e.as_string().map(|s| s.as_str().to_string()).unwrap_or_default());
        });
    }
    {
        let queue = queue.clone();
        let log = log.clone();
        promise.finally_with_enqueue(
            move || log.lock().push("finally".to_string()),
            move |task| queue.enqueue(task),
        );
    }

    promise.reject(Value::string(JsString::intern("boom")));

    // The immediate catch ran; the deferred finally waits for the drain
    assert_eq!(*log.lock(), vec!["boom".to_string()]);
    queue.drain();
    assert_eq!(*log.lock(), vec!["boom".to_string(), "finally".to_string()]);
}

#[test]
fn test_all_through_queue() {
    let queue = Arc::new(MicrotaskQueue::new());
    let a = JsPromise::new();
    let b = JsPromise::new();
    let joined = JsPromise::all([a.clone(), b.clone()]);

    let log = Arc::new(Mutex::new(Vec::new()));
    {
        let queue = queue.clone();
        let log = log.clone();
        joined.then_with_enqueue(
            move |v| {
                let arr = v.as_array().expect("all fulfills with an array");
                log.lock().extend(
                    arr.elements().iter().filter_map(Value::as_number),
                );
            },
            move |task| queue.enqueue(task),
        );
    }

    a.resolve(Value::number(1.0));
    b.resolve(Value::number(2.0));

    assert!(log.lock().is_empty());
    queue.drain();
    assert_eq!(*log.lock(), vec![1.0, 2.0]);
}
