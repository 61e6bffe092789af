//! Property tests for the fold operations.

#![cfg(feature = "test-utils")]

use parking_lot::Mutex;
use proptest::prelude::*;
use spin_core::test_utils::{ImmediateExecuter, IterStream, Recorder};
use spin_core::*;
use std::sync::Arc;

type Emit = AnyCommand<i64, i64, ImmediateExecuter, CompletionSignal>;

fn emit(mutations: Vec<i64>) -> Emit {
    command_fn(move |_: &i64| IterStream::new(mutations.clone())).erase_to_any_command()
}

fn prefix_sums(values: &[i64]) -> Vec<i64> {
    values
        .iter()
        .scan(0i64, |sum, value| {
            *sum += value;
            Some(*sum)
        })
        .collect()
}

proptest! {
    #[test]
    fn scan_is_a_left_fold_in_emission_order(values in prop::collection::vec(-1000i64..1000, 0..64)) {
        let recorder = Recorder::new();
        IterStream::new(values.clone())
            .scan(0i64, |sum, value| sum + value)
            .consume(recorder.sink(), ImmediateExecuter::new())
            .spin();
        prop_assert_eq!(recorder.values(), prefix_sums(&values));
    }

    #[test]
    fn middlewares_never_change_the_accumulation(values in prop::collection::vec(-1000i64..1000, 0..64)) {
        let observed = Arc::new(Mutex::new(0usize));
        let count = Arc::clone(&observed);
        let options = FoldOptions::new()
            .middleware(move |_: &i64, _: &i64| *count.lock() += 1);

        let recorder = Recorder::new();
        IterStream::new(values.clone())
            .scan_with(0i64, |sum, value| sum + value, options)
            .consume(recorder.sink(), ImmediateExecuter::new())
            .spin();

        prop_assert_eq!(recorder.values(), prefix_sums(&values));
        prop_assert_eq!(*observed.lock(), values.len());
    }

    #[test]
    fn feedback_folds_command_mutations_in_order(
        batches in prop::collection::vec(prop::collection::vec(-100i64..100, 0..8), 0..16)
    ) {
        let recorder = Recorder::new();
        IterStream::new(batches.iter().cloned().map(emit).collect::<Vec<_>>())
            .feedback(0i64, |state, mutation| state + mutation)
            .consume(recorder.sink(), ImmediateExecuter::new())
            .spin();

        let flattened: Vec<i64> = batches.into_iter().flatten().collect();
        prop_assert_eq!(recorder.values(), prefix_sums(&flattened));
    }
}
