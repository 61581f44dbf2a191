//! Database file serialisation and memory-mapping helpers.
//! All integers are little-endian.
//!
//! Layout of a database file:
//! - bytes [0..8):   magic `JFLISTDN`
//! - bytes [8..16):  `key_bits`
//! - bytes [16..24): `val_len` (= 4)
//! - bytes [48..56): `key_ct`
//! - remainder of the `72 + 2*(4 + 8*key_bits)`-byte header: reserved,
//!   zeroed on write, ignored on read
//! - pair array: `key_ct` records of `key_len + 4` bytes, sorted by
//!   (v2 bin key, key)

use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian as LE};
use memmap2::Mmap;

use crate::db::DATABASE_MAGIC;
use crate::error::DbError;
use crate::kmer::canonical;
use crate::radix::sort_pairs;

/// Accumulates (k-mer, taxon) pairs and serialises a database region.
///
/// Keys are canonicalised on add, so every stored key is canonical.
/// Duplicate keys keep the first taxon seen; merging duplicates (e.g. LCA
/// reduction) belongs to the upstream build pipeline.
pub struct DbWriter {
    k: usize,
    keys: Vec<u64>,
    taxa: Vec<u32>,
}

impl DbWriter {
    pub fn new(k: usize) -> Self {
        assert!(k >= 1 && k <= 32, "k must be 1..=32");
        DbWriter {
            k,
            keys: Vec::new(),
            taxa: Vec::new(),
        }
    }

    /// Add one pair. `kmer` may be in either orientation.
    pub fn add(&mut self, kmer: u64, taxon: u32) {
        self.keys.push(canonical(kmer, self.k));
        self.taxa.push(taxon);
    }

    /// Number of pairs added so far (duplicates included).
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sort into (v2 bin key, key) order for minimizer length `nt`, drop
    /// duplicate keys, and serialise header plus pair array.
    pub fn into_bytes(mut self, nt: u8) -> Vec<u8> {
        assert!(
            nt >= 1 && nt as usize <= self.k,
            "minimizer length must be 1..=k"
        );
        let key_bits = 2 * self.k;
        let key_len = key_bits.div_ceil(8);
        sort_pairs(&mut self.keys, &mut self.taxa, key_len, self.k, nt);

        let mut kept = 0usize;
        for i in 0..self.keys.len() {
            if kept == 0 || self.keys[i] != self.keys[kept - 1] {
                self.keys[kept] = self.keys[i];
                self.taxa[kept] = self.taxa[i];
                kept += 1;
            }
        }
        self.keys.truncate(kept);
        self.taxa.truncate(kept);

        let header_size = 72 + 2 * (4 + 8 * key_bits);
        let pair_size = key_len + 4;
        let mut out = vec![0u8; header_size + self.keys.len() * pair_size];
        out[..8].copy_from_slice(DATABASE_MAGIC);
        LE::write_u64(&mut out[8..16], key_bits as u64);
        LE::write_u64(&mut out[16..24], 4);
        LE::write_u64(&mut out[48..56], self.keys.len() as u64);

        let mut off = header_size;
        for (&key, &taxon) in self.keys.iter().zip(&self.taxa) {
            LE::write_uint(&mut out[off..off + key_len], key, key_len);
            LE::write_u32(&mut out[off + key_len..off + pair_size], taxon);
            off += pair_size;
        }
        out
    }

    /// Serialise and write the database to `path`.
    pub fn write_to(self, path: &Path, nt: u8) -> Result<(), DbError> {
        std::fs::write(path, self.into_bytes(nt))?;
        Ok(())
    }
}

/// Map an existing file read-only. The returned mapping must outlive every
/// [`crate::Database`] or [`crate::Index`] opened over it.
pub fn map_file(path: &Path) -> Result<Mmap, DbError> {
    let file = File::open(path)?;
    let map = unsafe { Mmap::map(&file)? };
    Ok(map)
}
