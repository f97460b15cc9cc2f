//! Benchmark workloads for the growarr growable array.
//!
//! - [`workload`]: deterministic append/remove mix generated from a seed
//! - [`replay`]: run a workload against a [`GrowableArray`]
//! - [`replay_vec`]: run the same workload against `Vec` as a baseline

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use growarr_array::GrowableArray;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// One step of a benchmark workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Append(u64),
    RemoveLast,
}

/// Generate `len` operations, each an append with probability `append_bias`.
///
/// The same seed always yields the same sequence.
pub fn workload(seed: u64, len: usize, append_bias: f64) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if rng.random_bool(append_bias) {
                Op::Append(rng.random())
            } else {
                Op::RemoveLast
            }
        })
        .collect()
}

/// Apply `ops` to `array`, returning how many removals found it empty.
pub fn replay(array: &mut GrowableArray<u64>, ops: &[Op]) -> usize {
    let mut empty_hits = 0;
    for op in ops {
        match *op {
            Op::Append(v) => array.push(v),
            Op::RemoveLast => {
                if array.remove_last().is_err() {
                    empty_hits += 1;
                }
            }
        }
    }
    empty_hits
}

/// Apply `ops` to a `Vec`, returning how many removals found it empty.
pub fn replay_vec(vec: &mut Vec<u64>, ops: &[Op]) -> usize {
    let mut empty_hits = 0;
    for op in ops {
        match *op {
            Op::Append(v) => vec.push(v),
            Op::RemoveLast => {
                if vec.pop().is_none() {
                    empty_hits += 1;
                }
            }
        }
    }
    empty_hits
}
