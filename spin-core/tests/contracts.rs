//! Protocol contracts that hold for any stream implementation.
//!
//! Tests cover:
//! - Thread-safety of erased stages
//! - Laziness: nothing runs before `spin`
//! - Erasure transparency and stability
//! - Completion replay on an already-finished lifecycle

use parking_lot::Mutex;
use spin_core::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// A stream implemented outside the crate
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
struct Inline;

impl Executer for Inline {
    fn execute(&self, job: Job) {
        job()
    }
}

struct Values {
    values: Vec<i32>,
    subscribed: Arc<AtomicUsize>,
}

impl Values {
    fn new(values: Vec<i32>) -> (Self, Arc<AtomicUsize>) {
        let subscribed = Arc::new(AtomicUsize::new(0));
        (
            Self {
                values,
                subscribed: Arc::clone(&subscribed),
            },
            subscribed,
        )
    }
}

impl ReactiveStream for Values {
    type Value = i32;
    type Executer = Inline;
    type Lifecycle = CompletionSignal;
    type Input = Self;

    fn to_reactive_stream(self) -> Self {
        self
    }

    fn subscribe(self, observer: Observer<i32>) -> CompletionSignal {
        self.subscribed.fetch_add(1, Ordering::SeqCst);
        for value in self.values {
            observer.next(value);
        }
        let signal = CompletionSignal::new();
        signal.finish();
        signal
    }
}

impl Producer for Values {}

fn collector() -> (Arc<Mutex<Vec<i32>>>, impl Fn(i32) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |value| sink.lock().push(value))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Thread-safety
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn _assert_send<T: Send>() {}
fn _assert_send_sync<T: Send + Sync>() {}

#[test]
fn erased_producer_and_consumer_are_send() {
    _assert_send::<AnyProducer<i32, Inline, CompletionSignal>>();
    _assert_send::<AnyConsumer<i32, Inline, CompletionSignal>>();
}

#[test]
fn erased_command_and_handles_are_send_sync() {
    _assert_send_sync::<AnyCommand<i32, i32, Inline, CompletionSignal>>();
    _assert_send_sync::<CompletionSignal>();
    _assert_send_sync::<Observer<i32>>();
    _assert_send_sync::<StreamError>();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Laziness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn composition_is_lazy_and_spin_subscribes_once() {
    let (values, subscribed) = Values::new(vec![1, 2, 3]);
    let spied = Arc::new(AtomicUsize::new(0));
    let (seen, sink) = collector();

    let hits = Arc::clone(&spied);
    let consumer = values
        .spy(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
        .compose(|stream| stream)
        .scan(0, |sum, value| sum + value)
        .consume(sink, Inline);

    assert_eq!(subscribed.load(Ordering::SeqCst), 0);
    assert_eq!(spied.load(Ordering::SeqCst), 0);

    consumer.spin();

    assert_eq!(subscribed.load(Ordering::SeqCst), 1);
    assert_eq!(spied.load(Ordering::SeqCst), 3);
    assert_eq!(*seen.lock(), vec![1, 3, 6]);
}

#[test]
fn from_builds_the_stream_on_spin() {
    let built = Arc::new(AtomicUsize::new(0));
    let (seen, sink) = collector();

    let counter = Arc::clone(&built);
    let consumer = <Values as Producer>::from(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Values::new(vec![7]).0
    })
    .scan(0, |_, value| value)
    .consume(sink, Inline);

    assert_eq!(built.load(Ordering::SeqCst), 0);
    consumer.spin();
    assert_eq!(built.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock(), vec![7]);
}

#[test]
fn spinner_from_accepts_any_stream() {
    let (seen, sink) = collector();
    Spinner::from(|| Values::new(vec![4, 5]).0)
        .scan(Vec::new(), |mut all, value| {
            all.push(value);
            all
        })
        .consume(move |all: Vec<i32>| sink(all.len() as i32), Inline)
        .spin();

    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn compose_runs_its_function_once_on_subscribe() {
    let (values, _) = Values::new(vec![1, 2]);
    let composed = Arc::new(AtomicUsize::new(0));
    let (seen, sink) = collector();

    let calls = Arc::clone(&composed);
    let consumer = values
        .compose(move |stream| {
            calls.fetch_add(1, Ordering::SeqCst);
            stream.spy(|_| {})
        })
        .scan(0, |_, value| value * 10)
        .consume(sink, Inline);

    assert_eq!(composed.load(Ordering::SeqCst), 0);
    consumer.spin();
    assert_eq!(composed.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock(), vec![10, 20]);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Consumer dispatch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn sinks_receive_values_in_registration_order() {
    let (values, _) = Values::new(vec![1, 2]);
    let order = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&order);
    let second = Arc::clone(&order);
    values
        .scan(0, |_, value| value)
        .consume(move |value| first.lock().push(("first", value)), Inline)
        .consume(move |value| second.lock().push(("second", value)), Inline)
        .spin();

    assert_eq!(
        *order.lock(),
        vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Erasure
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn repeated_erasure_is_transparent() {
    let (values, subscribed) = Values::new(vec![1, 2, 3]);
    let (seen, sink) = collector();

    values
        .erase_to_any_producer()
        .erase_to_any_producer()
        .scan(0, |sum, value| sum + value)
        .erase_to_any_consumer()
        .erase_to_any_consumer()
        .consume(sink, Inline)
        .spin();

    assert_eq!(subscribed.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock(), vec![1, 3, 6]);
}

#[test]
fn erased_command_executes_the_wrapped_command() {
    let executed = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&executed);
    let command = command_fn(move |state: &i32| {
        calls.fetch_add(1, Ordering::SeqCst);
        Values::new(vec![*state + 1]).0
    })
    .erase_to_any_command()
    .erase_to_any_command();

    let (seen, sink) = collector();
    let stream = command.clone().execute(&41);
    assert_eq!(executed.load(Ordering::SeqCst), 1);

    stream.scan(0, |_, value| value).consume(sink, Inline).spin();
    assert_eq!(*seen.lock(), vec![42]);
}

#[test]
fn erased_producers_of_different_streams_share_a_type() {
    let a = Values::new(vec![1]).0.erase_to_any_producer();
    let b = Values::new(vec![2]).0.spy(|_| {});
    let streams: Vec<AnyProducer<i32, Inline, CompletionSignal>> = vec![a, b];
    assert_eq!(streams.len(), 2);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Lifecycle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn completion_replays_on_finished_run() {
    let (values, _) = Values::new(vec![1]);
    let lifecycle = values.scan(0, |_, value| value).consume(|_| {}, Inline).spin();

    let fired = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&fired);
    lifecycle.after_completion(move |outcome| {
        assert!(outcome.is_finished());
        hits.fetch_add(1, Ordering::SeqCst);
    });
    lifecycle.cancel();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
