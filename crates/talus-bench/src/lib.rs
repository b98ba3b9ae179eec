//! Shared helpers for the talus benchmarks.

#![deny(missing_docs)]

use talus_alloc::GrowList;

/// Build a list of `n` sequential u64 values by repeated push.
pub fn sequential_list(n: usize) -> GrowList<u64> {
    let mut list = GrowList::new();
    for i in 0..n as u64 {
        list.push(i).expect("bench workload fits in memory");
    }
    list
}
