//! Index construction: per-bin pair counts, prefix sum, v2 serialisation.
//!
//! The counting phase is data-parallel over pair indices with atomic
//! fetch-adds on a shared counter array; prefix sum and serialisation are
//! sequential. The pair array is assumed to already be sorted consistently
//! with the produced offsets (sorting is an upstream concern, see
//! [`crate::io::DbWriter`]).

use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use crate::db::Database;
use crate::index::INDEX2_MAGIC;
use crate::kmer::{INDEX2_XOR_MASK, bin_key};

/// Builds a v2 minimizer offset index for a database's pair array.
pub struct IndexBuilder {
    nt: u8,
}

impl IndexBuilder {
    /// `nt` is the minimizer length in bases, 1..=15.
    pub fn new(nt: u8) -> Self {
        assert!(nt >= 1 && nt <= 15, "minimizer length must be 1..=15");
        IndexBuilder { nt }
    }

    /// Histogram the pair array into `4^nt` bins, prefix-sum the counts
    /// into offsets, and serialise the index (`KRAKIX2`, `nt`, offsets as
    /// u64 LE). Post-condition: `offsets[4^nt]` equals the pair count.
    pub fn build(&self, db: &Database<'_>) -> Vec<u8> {
        let k = db.k() as usize;
        let nt = self.nt as usize;
        assert!(nt <= k, "minimizer length must not exceed k");

        let bins = 1usize << (2 * nt);
        let counts: Vec<AtomicU64> = (0..bins).map(|_| AtomicU64::new(0)).collect();
        (0..db.key_ct()).into_par_iter().for_each(|i| {
            let b_key = bin_key(db.key_at(i as usize), k, nt, INDEX2_XOR_MASK);
            counts[b_key as usize].fetch_add(1, Ordering::Relaxed);
        });

        let mut out = Vec::with_capacity(INDEX2_MAGIC.len() + 1 + (bins + 1) * 8);
        out.extend_from_slice(INDEX2_MAGIC);
        out.push(self.nt);
        let mut offset = 0u64;
        out.extend_from_slice(&offset.to_le_bytes());
        for count in &counts {
            offset += count.load(Ordering::Relaxed);
            out.extend_from_slice(&offset.to_le_bytes());
        }
        debug_assert_eq!(offset, db.key_ct());
        out
    }
}
