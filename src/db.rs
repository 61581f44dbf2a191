//! Database view over a `JFLISTDN` pair-array region, plus the query
//! engine.
//!
//! The pair array holds `key_ct` records of `key_len + 4` bytes each: a
//! packed canonical k-mer (`key_len` little-endian bytes) followed by a
//! 32-bit taxon id. Pairs are sorted by (minimizer bin key, k-mer); a
//! bound [`Index`] delimits each bin, so lookup is a hybrid binary+linear
//! search inside one bin.

use byteorder::{ByteOrder, LittleEndian as LE};

use crate::error::DbError;
use crate::index::Index;
use crate::kmer::{bin_key, kmer_mask};

/// Magic of the pair-array file, inherited from the upstream hash format
/// that produces the sorted pair list.
pub const DATABASE_MAGIC: &[u8; 8] = b"JFLISTDN";

/// Window size at which hybrid search falls back to a linear scan.
/// A tuning constant, not a correctness parameter.
const LINEAR_SCAN_WINDOW: i64 = 15;

/// Non-owning view of a database byte region (typically memory-mapped).
///
/// The region must outlive the view and every query issued through it.
/// Once an index is bound the view is immutable; any number of threads may
/// query it concurrently, each with its own [`QueryState`].
pub struct Database<'a> {
    data: &'a [u8],
    index: Option<&'a Index<'a>>,
    k: u8,
    key_bits: u64,
    key_len: usize,
    val_len: usize,
    key_ct: u64,
    key_mask: u64,
}

/// Search window carried between queries on neighbouring k-mers.
///
/// A fresh state has `lo > hi`, which forces a full lookup on first use.
/// Each querying thread owns its private state.
#[derive(Clone, Copy, Debug)]
pub struct QueryState {
    pub last_bin_key: u64,
    pub lo: i64,
    pub hi: i64,
}

impl QueryState {
    pub fn new() -> Self {
        QueryState {
            last_bin_key: 0,
            lo: 0,
            hi: -1,
        }
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Database<'a> {
    /// Parse the database header. The pair array itself is not read.
    ///
    /// Fails with [`DbError::BadFormat`] on a magic mismatch, a value
    /// width other than 4 bytes, an unusable key width, or a region too
    /// short to hold the advertised pairs.
    pub fn open(bytes: &'a [u8]) -> Result<Self, DbError> {
        if bytes.len() < 56 || &bytes[..8] != DATABASE_MAGIC {
            return Err(DbError::BadFormat("bad database magic".into()));
        }
        let key_bits = LE::read_u64(&bytes[8..16]);
        let val_len = LE::read_u64(&bytes[16..24]);
        let key_ct = LE::read_u64(&bytes[48..56]);
        if val_len != 4 {
            return Err(DbError::BadFormat(format!(
                "can only handle 4-byte values, got {val_len}"
            )));
        }
        if key_bits == 0 || key_bits > 64 || key_bits % 2 != 0 {
            return Err(DbError::BadFormat(format!(
                "unsupported key width of {key_bits} bits"
            )));
        }
        let db = Database {
            data: bytes,
            index: None,
            k: (key_bits / 2) as u8,
            key_bits,
            key_len: (key_bits as usize).div_ceil(8),
            val_len: val_len as usize,
            key_ct,
            key_mask: kmer_mask(key_bits),
        };
        let need = db.header_size() + key_ct as usize * db.pair_size();
        if bytes.len() < need {
            return Err(DbError::BadFormat(format!(
                "pair array truncated: region holds {} bytes, need {need}",
                bytes.len()
            )));
        }
        Ok(db)
    }

    /// Attach the minimizer offset index. Required before any query or
    /// bin-relative operation.
    pub fn bind_index(&mut self, index: &'a Index<'a>) {
        self.index = Some(index);
    }

    /// The bound index, if any.
    #[inline]
    pub fn index(&self) -> Option<&'a Index<'a>> {
        self.index
    }

    /// K-mer length in bases, `key_bits / 2`.
    #[inline]
    pub fn k(&self) -> u8 {
        self.k
    }

    /// Bits per stored key.
    #[inline]
    pub fn key_bits(&self) -> u64 {
        self.key_bits
    }

    /// Bytes per stored key, `ceil(key_bits / 8)`.
    #[inline]
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Bytes per stored value; always 4.
    #[inline]
    pub fn val_len(&self) -> usize {
        self.val_len
    }

    /// Number of key/value pairs.
    #[inline]
    pub fn key_ct(&self) -> u64 {
        self.key_ct
    }

    /// Bytes per pair, `key_len + val_len`.
    #[inline]
    pub fn pair_size(&self) -> usize {
        self.key_len + self.val_len
    }

    /// Offset of the pair array within the region. The preamble width
    /// varies with `key_bits` (inherited from the upstream hash format);
    /// the bytes after the fixed fields are opaque reserved space.
    #[inline]
    pub fn header_size(&self) -> usize {
        72 + 2 * (4 + 8 * self.key_bits as usize)
    }

    /// The raw pair array.
    #[inline]
    pub fn pairs(&self) -> &'a [u8] {
        let start = self.header_size();
        &self.data[start..start + self.key_ct as usize * self.pair_size()]
    }

    /// Bin key for `kmer` under the bound index's minimizer length and
    /// version-dependent XOR mask.
    #[inline]
    pub fn bin_key(&self, kmer: u64) -> u64 {
        let idx = self.bound_index();
        bin_key(
            kmer,
            self.k as usize,
            idx.nt() as usize,
            idx.version().xor_mask(),
        )
    }

    /// Look up a canonical k-mer, returning its taxon id.
    ///
    /// Stored keys are canonical, so callers canonicalise first. A missing
    /// k-mer is `None`, never an error; nothing is allocated.
    pub fn query(&self, kmer: u64) -> Option<u32> {
        let (lo, hi) = self.bin_range(self.bin_key(kmer));
        self.search_range(kmer, lo, hi)
    }

    /// Amortised lookup that reuses the caller's previous bin.
    ///
    /// Successive k-mers of a read usually share a minimizer, so the bin
    /// key only needs recomputing at minimizer transitions. At most two
    /// attempts: the cached window first, then the freshly computed bin.
    /// The second attempt is skipped when the bin key turns out unchanged,
    /// because the k-mer is simply absent. Agrees with [`Database::query`]
    /// on every input regardless of state history.
    pub fn query_with_state(&self, kmer: u64, state: &mut QueryState) -> Option<u32> {
        if state.lo <= state.hi {
            if let Some(val) = self.search_range(kmer, state.lo, state.hi) {
                return Some(val);
            }
            let b_key = self.bin_key(kmer);
            if b_key == state.last_bin_key {
                return None;
            }
            let (lo, hi) = self.bin_range(b_key);
            *state = QueryState {
                last_bin_key: b_key,
                lo,
                hi,
            };
            self.search_range(kmer, lo, hi)
        } else {
            let b_key = self.bin_key(kmer);
            let (lo, hi) = self.bin_range(b_key);
            *state = QueryState {
                last_bin_key: b_key,
                lo,
                hi,
            };
            self.search_range(kmer, lo, hi)
        }
    }

    /// Stored key at pair position `pos`, masked to `key_bits` to discard
    /// high-order garbage in the last byte.
    #[inline]
    pub(crate) fn key_at(&self, pos: usize) -> u64 {
        let off = self.header_size() + pos * self.pair_size();
        LE::read_uint(&self.data[off..off + self.key_len], self.key_len) & self.key_mask
    }

    /// Taxon id at pair position `pos`.
    #[inline]
    fn value_at(&self, pos: usize) -> u32 {
        let off = self.header_size() + pos * self.pair_size() + self.key_len;
        LE::read_u32(&self.data[off..off + 4])
    }

    #[inline]
    fn bound_index(&self) -> &'a Index<'a> {
        self.index
            .expect("no index bound to database; call bind_index first")
    }

    /// Inclusive pair range `[B[b], B[b+1] - 1]` of bin `b`. Empty bins
    /// yield `lo > hi`.
    #[inline]
    fn bin_range(&self, b_key: u64) -> (i64, i64) {
        let idx = self.bound_index();
        (idx.at(b_key) as i64, idx.at(b_key + 1) as i64 - 1)
    }

    /// Hybrid search over the inclusive pair range `[lo, hi]`: classical
    /// binary search while the window is wide, then a branch-predictable
    /// linear scan over the tail.
    fn search_range(&self, kmer: u64, mut lo: i64, mut hi: i64) -> Option<u32> {
        while lo + LINEAR_SCAN_WINDOW <= hi {
            let mid = lo + (hi - lo) / 2;
            let stored = self.key_at(mid as usize);
            if kmer > stored {
                lo = mid + 1;
            } else if kmer < stored {
                hi = mid - 1;
            } else {
                return Some(self.value_at(mid as usize));
            }
        }
        for pos in lo..=hi {
            if self.key_at(pos as usize) == kmer {
                return Some(self.value_at(pos as usize));
            }
        }
        None
    }
}
