//! Integration test: random operation sequences against a `Vec` model.
//!
//! Each case replays a generated sequence of mutations on both a
//! `GrowableArray` and a `std::vec::Vec`, checking after every step that
//! the contents agree, that `0 <= size <= capacity` with `capacity >= 1`,
//! and that every capacity change is one the policy allows. A second
//! property injects refused block requests and checks that a failed
//! operation changes nothing.

use growarr_array::{ArrayError, GrowableArray, GrowthPolicy, Storage};
use growarr_test_utils::FailingStorage;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Append(i32),
    RemoveLast,
    Reserve(usize),
    ShrinkToFit,
    Truncate(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => any::<i32>().prop_map(Op::Append),
        4 => Just(Op::RemoveLast),
        1 => (0usize..128).prop_map(Op::Reserve),
        1 => Just(Op::ShrinkToFit),
        1 => (0usize..32).prop_map(Op::Truncate),
        1 => Just(Op::Clear),
    ]
}

/// Apply `op` to both sides; returns the array's error, if any.
fn apply<S: Storage>(
    array: &mut GrowableArray<i32, S>,
    model: &mut Vec<i32>,
    op: &Op,
) -> Result<(), ArrayError> {
    match *op {
        Op::Append(v) => {
            array.append(v)?;
            model.push(v);
        }
        Op::RemoveLast => match array.remove_last() {
            Ok(v) => assert_eq!(Some(v), model.pop()),
            Err(ArrayError::EmptyContainer) => assert!(model.is_empty()),
            Err(e) => return Err(e),
        },
        Op::Reserve(n) => array.reserve(n)?,
        Op::ShrinkToFit => array.shrink_to_fit()?,
        Op::Truncate(n) => {
            array.truncate(n);
            model.truncate(n);
        }
        Op::Clear => {
            array.clear();
            model.clear();
        }
    }
    Ok(())
}

fn check_transition(policy: &GrowthPolicy, op: &Op, size: usize, before: usize, after: usize) {
    match op {
        Op::Append(_) if after != before => {
            assert!(policy.should_grow(size, before));
            assert_eq!(after, before * policy.resize_factor);
        }
        Op::RemoveLast if after != before => {
            assert!(policy.should_shrink(size, before));
            assert!(after < before && after >= size);
            assert!(!policy.should_grow(size + 1, after));
        }
        Op::Truncate(_) | Op::Clear if after != before => {
            assert!(after < before && after >= size.max(1));
            assert!(!policy.should_grow(size + 1, after));
        }
        Op::Reserve(n) if after != before => assert_eq!(after, *n),
        Op::ShrinkToFit if after != before => assert_eq!(after, size.max(1)),
        _ => {}
    }
}

proptest! {
    #[test]
    fn matches_vec_model(ops in proptest::collection::vec(op_strategy(), 0..300)) {
        let mut array = GrowableArray::new();
        let mut model = Vec::new();
        let policy = array.policy().clone();
        for op in &ops {
            let before = array.capacity();
            apply(&mut array, &mut model, op).unwrap();
            let after = array.capacity();

            prop_assert_eq!(array.as_slice(), model.as_slice());
            prop_assert!(array.size() <= array.capacity());
            prop_assert!(array.capacity() >= 1);
            check_transition(&policy, op, array.size(), before, after);
        }

        let size = array.size();
        prop_assert_eq!(
            array.at(size),
            Err(ArrayError::IndexOutOfRange { index: size, size })
        );
        let collected: Vec<i32> = array.into_iter().collect();
        prop_assert_eq!(collected, model);
    }

    #[test]
    fn refused_requests_change_nothing(
        steps in proptest::collection::vec((op_strategy(), any::<bool>()), 0..200),
    ) {
        let storage = FailingStorage::unlimited();
        let mut array = GrowableArray::try_new_in(storage.clone()).unwrap();
        let mut model = Vec::new();
        for (op, refuse) in &steps {
            if *refuse {
                storage.refuse_all();
            } else {
                storage.allow_all();
            }
            let capacity = array.capacity();
            let snapshot = model.clone();
            if let Err(e) = apply(&mut array, &mut model, op) {
                prop_assert!(*refuse);
                prop_assert!(e.is_recoverable());
                prop_assert_eq!(array.capacity(), capacity);
                prop_assert_eq!(&model, &snapshot);
            }
            prop_assert_eq!(array.as_slice(), model.as_slice());
        }
        storage.allow_all();
        drop(array);
        prop_assert_eq!(storage.live_blocks(), 0);
    }
}
