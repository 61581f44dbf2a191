//! Stable LSD radix sort of (packed key, taxon) pairs into on-disk order:
//! grouped by minimizer bin key, ascending key within each bin.

use crate::kmer::{INDEX2_XOR_MASK, bin_key};

/// Sort `keys` and permute `taxa` accordingly. 8-bit counting passes over
/// the `key_len` stored key bytes, least significant first, then one
/// stable pass on the v2 bin key to group bins without disturbing the key
/// order inside each bin.
pub(crate) fn sort_pairs(keys: &mut [u64], taxa: &mut [u32], key_len: usize, k: usize, nt: u8) {
    debug_assert_eq!(keys.len(), taxa.len());
    let n = keys.len();
    if n <= 1 {
        return;
    }

    // Scratch buffers, reused across passes.
    let mut tmp_keys = vec![0u64; n];
    let mut tmp_taxa = vec![0u32; n];

    for pass in 0..key_len {
        let shift = pass * 8;
        let mut counts = [0usize; 256];
        for &key in keys.iter() {
            counts[((key >> shift) & 0xFF) as usize] += 1;
        }
        let mut sum = 0usize;
        for c in counts.iter_mut() {
            let tmp = *c;
            *c = sum;
            sum += tmp;
        }
        for i in 0..n {
            let byte = ((keys[i] >> shift) & 0xFF) as usize;
            let pos = counts[byte];
            tmp_keys[pos] = keys[i];
            tmp_taxa[pos] = taxa[i];
            counts[byte] = pos + 1;
        }
        keys.copy_from_slice(&tmp_keys);
        taxa.copy_from_slice(&tmp_taxa);
    }

    // Final pass: counting sort on the bin key.
    let bins = 1usize << (2 * nt as usize);
    let mut counts = vec![0usize; bins];
    for &key in keys.iter() {
        counts[bin_key(key, k, nt as usize, INDEX2_XOR_MASK) as usize] += 1;
    }
    let mut sum = 0usize;
    for c in counts.iter_mut() {
        let tmp = *c;
        *c = sum;
        sum += tmp;
    }
    for i in 0..n {
        let b = bin_key(keys[i], k, nt as usize, INDEX2_XOR_MASK) as usize;
        let pos = counts[b];
        tmp_keys[pos] = keys[i];
        tmp_taxa[pos] = taxa[i];
        counts[b] = pos + 1;
    }
    keys.copy_from_slice(&tmp_keys);
    taxa.copy_from_slice(&tmp_taxa);
}
