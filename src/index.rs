//! Minimizer offset index: `(4^nt)+1` little-endian u64 offsets delimiting
//! bins inside the pair array.
//!
//! On disk: 7 magic bytes (`KRAKIDX` for v1, `KRAKIX2` for v2), one byte
//! `nt`, then the offset array. `B[i]` is the position of the first pair
//! whose bin key equals `i`; pairs of bin `i` occupy `[B[i], B[i+1])`.

use byteorder::{ByteOrder, LittleEndian as LE};

use crate::error::DbError;
use crate::kmer::INDEX2_XOR_MASK;

/// v1 magic; the pair array is sorted by plain canonical minimizer order.
pub const INDEX1_MAGIC: &[u8; 7] = b"KRAKIDX";
/// v2 magic; minimizer order is scrambled with [`INDEX2_XOR_MASK`].
pub const INDEX2_MAGIC: &[u8; 7] = b"KRAKIX2";

/// Index format version, probed from the file magic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexVersion {
    V1,
    V2,
}

impl IndexVersion {
    /// XOR mask applied to bin keys under this version.
    #[inline]
    pub fn xor_mask(self) -> u64 {
        match self {
            IndexVersion::V1 => 0,
            IndexVersion::V2 => INDEX2_XOR_MASK,
        }
    }
}

/// Read-only view of an index byte region (typically memory-mapped).
///
/// Offsets are decoded per access, so the region needs no alignment
/// guarantee. Nothing is copied: the region must outlive the view.
#[derive(Clone, Copy)]
pub struct Index<'a> {
    version: IndexVersion,
    nt: u8,
    offsets: &'a [u8],
}

impl<'a> Index<'a> {
    /// Parse the index header and locate the offset array.
    pub fn open(bytes: &'a [u8]) -> Result<Self, DbError> {
        if bytes.len() < INDEX1_MAGIC.len() + 1 {
            return Err(DbError::BadFormat("index region too short".into()));
        }
        let version = if bytes.starts_with(INDEX1_MAGIC) {
            IndexVersion::V1
        } else if bytes.starts_with(INDEX2_MAGIC) {
            IndexVersion::V2
        } else {
            return Err(DbError::BadFormat("bad index magic".into()));
        };
        let nt = bytes[INDEX1_MAGIC.len()];
        if nt == 0 || nt > 15 {
            return Err(DbError::BadFormat(format!(
                "unsupported minimizer length {nt}"
            )));
        }
        let bins = 1usize << (2 * nt as usize);
        let Some(offsets) = bytes.get(8..8 + (bins + 1) * 8) else {
            return Err(DbError::BadFormat("index offset array truncated".into()));
        };
        Ok(Index {
            version,
            nt,
            offsets,
        })
    }

    /// Minimizer length in bases.
    #[inline]
    pub fn nt(&self) -> u8 {
        self.nt
    }

    /// Format version; determines the bin-key XOR mask.
    #[inline]
    pub fn version(&self) -> IndexVersion {
        self.version
    }

    /// Number of bins, `4^nt`.
    #[inline]
    pub fn bins(&self) -> u64 {
        1u64 << (2 * self.nt as u32)
    }

    /// Offset `B[i]`: position (in pairs) of the first pair in bin `i`.
    /// `B[4^nt]` equals the pair count. Valid for `i` in `0..=4^nt`; debug
    /// builds check the bound.
    #[inline]
    pub fn at(&self, i: u64) -> u64 {
        debug_assert!(i <= self.bins(), "index offset {i} out of range");
        LE::read_u64(&self.offsets[i as usize * 8..])
    }
}
