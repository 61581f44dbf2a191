use proptest::prelude::*;
use std::collections::HashMap;

use taxondb::kmer::{canonical, decode, encode, kmer_mask, reverse_complement};
use taxondb::{Database, DbWriter, Index, IndexBuilder, QueryState};

/// A packed k-mer together with its length in bases.
fn packed_kmer() -> impl Strategy<Value = (u64, usize)> {
    (1usize..=32).prop_flat_map(|n| {
        (
            any::<u64>().prop_map(move |x| x & kmer_mask(2 * n as u64)),
            Just(n),
        )
    })
}

proptest! {
    #[test]
    fn prop_revcomp_involution((x, n) in packed_kmer()) {
        prop_assert_eq!(reverse_complement(reverse_complement(x, n), n), x);
    }

    #[test]
    fn prop_canonical_is_least((x, n) in packed_kmer()) {
        let canon = canonical(x, n);
        prop_assert!(canon <= x);
        prop_assert!(canon <= reverse_complement(x, n));
    }

    #[test]
    fn prop_canonical_idempotent((x, n) in packed_kmer()) {
        prop_assert_eq!(canonical(canonical(x, n), n), canonical(x, n));
    }

    #[test]
    fn prop_canonical_strand_symmetric((x, n) in packed_kmer()) {
        prop_assert_eq!(canonical(reverse_complement(x, n), n), canonical(x, n));
    }

    #[test]
    fn prop_decode_encode_round_trip(
        seq in prop::collection::vec(prop::sample::select(b"ACGTacgt".to_vec()), 1..=32)
    ) {
        let upper: String = seq.iter().map(|b| (*b as char).to_ascii_uppercase()).collect();
        prop_assert_eq!(decode(encode(&seq).unwrap(), seq.len()), upper);
    }

    // Build a database and index from random pairs, then require: offset
    // invariants, every stored pair found, and the amortised form agreeing
    // with the stateless one on hits and misses alike.
    #[test]
    fn prop_query_round_trip(
        raw in prop::collection::vec(any::<u64>(), 1..48),
        probes in prop::collection::vec(any::<u64>(), 0..16),
        k in 4usize..=12,
        nt in 1u8..=3,
    ) {
        let mask = kmer_mask(2 * k as u64);
        let mut writer = DbWriter::new(k);
        let mut expected: HashMap<u64, u32> = HashMap::new();
        for (i, &r) in raw.iter().enumerate() {
            let kmer = r & mask;
            writer.add(kmer, i as u32);
            expected.entry(canonical(kmer, k)).or_insert(i as u32);
        }
        let db_bytes = writer.into_bytes(nt);
        let idx_bytes = {
            let db = Database::open(&db_bytes).unwrap();
            IndexBuilder::new(nt).build(&db)
        };
        let idx = Index::open(&idx_bytes).unwrap();
        let mut db = Database::open(&db_bytes).unwrap();
        db.bind_index(&idx);

        prop_assert_eq!(idx.at(0), 0);
        for i in 0..idx.bins() {
            prop_assert!(idx.at(i) <= idx.at(i + 1));
        }
        prop_assert_eq!(idx.at(idx.bins()), db.key_ct());

        let mut state = QueryState::new();
        for (&key, &taxon) in &expected {
            prop_assert_eq!(db.query(key), Some(taxon));
            prop_assert_eq!(db.query_with_state(key, &mut state), Some(taxon));
        }
        for &p in &probes {
            let kmer = p & mask;
            let want = expected.get(&kmer).copied();
            prop_assert_eq!(db.query(kmer), want);
            prop_assert_eq!(db.query_with_state(kmer, &mut state), want);
        }
    }
}
