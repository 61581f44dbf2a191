//! Memory-mapped taxonomic k-mer database.
//!
//! Maps canonical DNA k-mers (2-bit packed, k <= 32) to 32-bit taxon ids.
//! Pairs are stored sorted by minimizer "bin key", so a point lookup is a
//! narrow binary search inside one bin; an auxiliary offset index with
//! `(4^nt)+1` entries delimits the bins. Successive k-mers of a read
//! usually share a minimizer, which [`Database::query_with_state`]
//! exploits by reusing the previous bin across neighbouring queries.
//!
//! The byte regions handed to [`Database::open`] and [`Index::open`] are
//! borrowed, typically from a read-only mapping (see [`io::map_file`]),
//! and must outlive every view opened over them. Views are immutable after
//! binding: any number of threads may query concurrently, each with its
//! own [`QueryState`].

mod builder;
mod db;
mod error;
mod index;
pub mod io;
pub mod kmer;
mod radix;

pub use builder::IndexBuilder;
pub use db::{DATABASE_MAGIC, Database, QueryState};
pub use error::DbError;
pub use index::{INDEX1_MAGIC, INDEX2_MAGIC, Index, IndexVersion};
pub use io::{DbWriter, map_file};
pub use kmer::INDEX2_XOR_MASK;
