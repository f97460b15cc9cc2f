//! Integration test: capacity follows the load-factor policy.
//!
//! Walks arrays through append/remove sequences and checks the exact
//! capacity after every step, for the default policy and for custom
//! thresholds and resize factors.

use growarr_array::{ArrayError, ConfigError, GrowableArray, GrowthPolicy, Heap};
use growarr_test_utils::init_test_logging;

fn capacities_after_appends<S: growarr_array::Storage>(
    array: &mut GrowableArray<i32, S>,
    count: i32,
) -> Vec<usize> {
    (0..count)
        .map(|i| {
            array.append(i).unwrap();
            array.capacity()
        })
        .collect()
}

#[test]
fn default_array_doubles_at_three_quarters() {
    init_test_logging();
    let mut a = GrowableArray::new();
    assert_eq!(capacities_after_appends(&mut a, 6), vec![2, 4, 8, 8, 8, 16]);
}

#[test]
fn sized_array_defers_first_growth() {
    let mut a = GrowableArray::with_expected_size(2);
    assert_eq!(a.capacity(), 4);
    assert_eq!(capacities_after_appends(&mut a, 6), vec![4, 4, 8, 8, 8, 16]);
    assert_eq!(
        a.to_string(),
        "capacity: 16 size: 6 vector: < 0 1 2 3 4 5 >"
    );
}

#[test]
fn removing_three_values_returns_them_newest_first() {
    let mut a = GrowableArray::new();
    for v in [10, 20, 30] {
        a.append(v).unwrap();
    }
    assert_eq!(a.remove_last(), Ok(30));
    assert_eq!(a.remove_last(), Ok(20));
    assert_eq!(a.remove_last(), Ok(10));
    assert_eq!(a.remove_last(), Err(ArrayError::EmptyContainer));
    assert_eq!(a.size(), 0);
    // 8 -> (2/8 stays) -> 4 -> 2; an empty array keeps room for one append.
    assert_eq!(a.capacity(), 2);
}

#[test]
fn full_load_factor_grows_only_when_full() {
    let policy = GrowthPolicy {
        max_load_factor: 1.0,
        ..GrowthPolicy::default()
    };
    let mut a = GrowableArray::with_policy(policy).unwrap();
    assert_eq!(capacities_after_appends(&mut a, 5), vec![2, 4, 4, 8, 8]);
}

#[test]
fn triple_resize_factor() {
    let policy = GrowthPolicy {
        resize_factor: 3,
        min_load_factor: Some(0.2),
        ..GrowthPolicy::default()
    };
    let mut a = GrowableArray::with_policy(policy).unwrap();
    assert_eq!(
        capacities_after_appends(&mut a, 7),
        vec![3, 3, 9, 9, 9, 9, 27]
    );
    // 5/27 is the first load at or below 0.2.
    a.remove_last().unwrap();
    assert_eq!(a.capacity(), 27);
    a.remove_last().unwrap();
    assert_eq!(a.capacity(), 9);
}

#[test]
fn thresholds_without_hysteresis_are_rejected() {
    let policy = GrowthPolicy {
        resize_factor: 3,
        ..GrowthPolicy::default()
    };
    // 0.25 is not below 0.75 / 3.
    let err = GrowableArray::<i32>::with_policy(policy).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMinLoadFactor { .. }));
}

#[test]
fn growth_is_amortized() {
    let mut a = GrowableArray::new();
    let n = 10_000usize;
    for i in 0..n {
        a.push(i);
    }
    let stats = a.stats();
    assert!(stats.grow_events <= 15, "{} grow events", stats.grow_events);
    assert!(stats.elements_transferred < 2 * n as u64);
    assert_eq!(stats.peak_capacity, a.capacity());
}

fn bounce_transitions(array: &mut GrowableArray<i32>, rounds: usize) -> u64 {
    let before = array.stats().transitions();
    for i in 0..rounds {
        array.append(i as i32).unwrap();
        array.remove_last().unwrap();
    }
    array.stats().transitions() - before
}

#[test]
fn bouncing_between_one_and_two_does_not_thrash() {
    let mut a = GrowableArray::new();
    a.append(0).unwrap();
    assert_eq!((a.size(), a.capacity()), (1, 2));
    assert!(bounce_transitions(&mut a, 100) <= 1);
}

#[test]
fn bouncing_between_two_and_three_does_not_thrash() {
    let mut a = GrowableArray::new();
    for i in 0..3 {
        a.append(i).unwrap();
    }
    a.remove_last().unwrap();
    assert_eq!(a.size(), 2);
    assert!(bounce_transitions(&mut a, 100) <= 1);
}

#[test]
fn bouncing_at_every_small_size_does_not_thrash() {
    for size in 0..40 {
        let mut a: GrowableArray<i32> = (0..size).collect();
        // Settle after the fill, then bounce.
        bounce_transitions(&mut a, 1);
        assert_eq!(bounce_transitions(&mut a, 50), 0, "size {size}");
    }
}

#[test]
fn drain_and_refill_does_not_thrash() {
    let mut a = GrowableArray::new();
    for i in 0..64 {
        a.push(i);
    }
    assert!(bounce_transitions(&mut a, 100) <= 1);
}

#[test]
fn reserve_then_append_uses_reserved_room() {
    let mut a: GrowableArray<i32, Heap> = GrowableArray::new();
    a.reserve(64).unwrap();
    assert_eq!(a.capacity(), 64);
    for i in 0..47 {
        a.append(i).unwrap();
    }
    assert_eq!(a.capacity(), 64);
    a.append(47).unwrap();
    assert_eq!(a.capacity(), 128);
}

#[test]
fn clear_returns_to_smallest_stable_capacity() {
    let mut a: GrowableArray<i32> = (0..100).collect();
    let shrinks = a.stats().shrink_events;
    a.clear();
    assert_eq!(a.capacity(), 2);
    assert_eq!(a.stats().shrink_events, shrinks + 1);
}

#[test]
fn clear_without_shrink_keeps_capacity() {
    let mut a = GrowableArray::with_policy(GrowthPolicy::without_shrink()).unwrap();
    a.extend(0..100);
    let capacity = a.capacity();
    a.clear();
    assert!(a.is_empty());
    assert_eq!(a.capacity(), capacity);
}

#[test]
fn truncate_shrinks_in_one_step() {
    let mut a: GrowableArray<i32> = (0..100).collect();
    assert_eq!(a.capacity(), 256);
    a.truncate(10);
    // 10/256 -> 128 -> 64 -> 32 (10/32 is above the shrink threshold).
    assert_eq!(a.capacity(), 32);
    assert_eq!(a.stats().shrink_events, 1);
    assert_eq!(a.as_slice(), &(0..10).collect::<Vec<_>>()[..]);
}
