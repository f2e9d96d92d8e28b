// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use revocation_types::params::{UPDATE_MAX_COUNT, UPDATE_MIN_COUNT};

/// Partitions the event interval `[from, to)` into the consecutive
/// `[lo, hi)` ranges the authority serves (and caches): `from` is rounded
/// down to a multiple of `UPDATE_MAX_COUNT`, `to` is rounded up to a
/// multiple of `UPDATE_MIN_COUNT`, and the span is covered greedily with
/// max-size chunks while they fit on an aligned boundary, then min-size
/// chunks for the remainder. Every emitted length is a power of two in
/// `[UPDATE_MIN_COUNT, UPDATE_MAX_COUNT]` and every chunk starts where the
/// previous one ended, so the output is deterministic for given bounds.
pub fn binary_partition(from: u64, to: u64) -> Vec<(u64, u64)> {
    let start = from / UPDATE_MAX_COUNT * UPDATE_MAX_COUNT;
    let end = to.div_ceil(UPDATE_MIN_COUNT) * UPDATE_MIN_COUNT;

    let mut intervals = Vec::new();
    let mut lo = start;
    while lo < end {
        let length = if lo % UPDATE_MAX_COUNT == 0 && lo + UPDATE_MAX_COUNT <= end {
            UPDATE_MAX_COUNT
        } else {
            UPDATE_MIN_COUNT
        };
        intervals.push((lo, lo + length));
        lo += length;
    }
    intervals
}
