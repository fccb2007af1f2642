mod common;

use common::test_utils::random_dna;
use ntbloom::nthash::tables::reverse_complement;
use ntbloom::{
    BlindNtHash, NtHash, NtHashConfigBuilder, NtHashError, RollingHash,
    SeedNtHash, SymbolPolicy,
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

fn collect(seq: &[u8], k: usize, num_hashes: usize) -> Vec<(usize, Vec<u64>)> {
    NtHash::new(seq, k, num_hashes, 0)
        .expect("valid roller")
        .into_iter()
        .collect()
}

#[cfg(test)]
mod window_tests {
    use super::*;

    #[test]
    fn test_five_windows_of_acgtacgt() {
        let first = collect(b"ACGTACGT", 4, 2);
        assert_eq!(first.len(), 5);
        assert_eq!(
            first.iter().map(|(pos, _)| *pos).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
        assert!(first.iter().all(|(_, h)| h.len() == 2));

        let second = collect(b"ACGTACGT", 4, 2);
        assert_eq!(first, second, "hashing must be deterministic");
    }

    #[test]
    fn test_periodic_sequence_repeats_hashes() {
        let windows = collect(b"ACGTACGT", 4, 1);
        assert_eq!(windows[0].1, windows[4].1);
    }

    #[test]
    fn test_empty_and_short_inputs() {
        assert!(matches!(
            NtHash::new(b"", 3, 1, 0),
            Err(NtHashError::InvalidK { k: 3, seq_len: 0 })
        ));
        assert!(matches!(
            NtHash::new(b"ACG", 4, 1, 0),
            Err(NtHashError::InvalidK { .. })
        ));
        let only_n = collect(b"NNNNNNNN", 3, 1);
        assert!(only_n.is_empty());
    }

    #[test]
    fn test_window_straddling_n_is_never_produced() {
        let seq = b"ACGTACNGTACGTTAGNNACGGT";
        for (pos, _) in collect(seq, 5, 1) {
            assert!(!seq[pos..pos + 5].contains(&b'N'), "window at {pos}");
        }
    }

    #[test]
    fn test_strict_policy_reports_position() {
        let config = NtHashConfigBuilder::default()
            .k(3)
            .num_hashes(2)
            .policy(SymbolPolicy::Strict)
            .build()
            .expect("valid config");
        assert_eq!(
            NtHash::with_config(b"ACGTRACG", &config).unwrap_err(),
            NtHashError::InvalidSymbol {
                position: 4,
                symbol: b'R'
            }
        );
        assert!(NtHash::with_config(b"ACGTACG", &config).is_ok());
    }

    #[test]
    fn test_hash_iter_through_trait() {
        fn count_windows<R: RollingHash>(mut roller: R) -> usize {
            let mut n = 0;
            while roller.roll() {
                assert_eq!(roller.hashes().len(), roller.num_hashes());
                n += 1;
            }
            n
        }
        let seq = b"ACGTTGCAAGGCT";
        assert_eq!(count_windows(NtHash::new(seq, 4, 3, 0).unwrap()), 10);
        assert_eq!(
            count_windows(SeedNtHash::new(seq, &["1011", "1101"], 3, 4, 0).unwrap()),
            10
        );
    }
}

#[cfg(test)]
mod strand_tests {
    use super::*;

    #[test]
    fn test_reverse_complement_has_same_hash_multiset() {
        let mut rng = StdRng::seed_from_u64(7);
        let seq = random_dna(&mut rng, 200);
        let rc = reverse_complement(&seq);

        let mut forward: Vec<Vec<u64>> =
            collect(&seq, 21, 3).into_iter().map(|(_, h)| h).collect();
        let mut reverse: Vec<Vec<u64>> =
            collect(&rc, 21, 3).into_iter().map(|(_, h)| h).collect();
        forward.sort();
        reverse.sort();
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_window_and_its_mirror_match_by_position() {
        let seq = b"GATTACAGATTACACCGT";
        let rc = reverse_complement(seq);
        let k = 6;
        let fwd = collect(seq, k, 1);
        let rev = collect(&rc, k, 1);
        let n = fwd.len();
        for (i, (_, h)) in fwd.iter().enumerate() {
            assert_eq!(h, &rev[n - 1 - i].1);
        }
    }

    #[test]
    fn test_blind_matches_resident_roller() {
        let mut rng = StdRng::seed_from_u64(11);
        let seq = random_dna(&mut rng, 120);
        let k = 15;
        let resident = collect(&seq, k, 4);

        let mut blind = BlindNtHash::new(&seq[..k], 4, 0).unwrap();
        let mut blind_windows = vec![(0usize, blind.hashes().to_vec())];
        for &c in &seq[k..] {
            blind.roll(c);
            blind_windows.push((blind.pos() as usize, blind.hashes().to_vec()));
        }
        assert_eq!(resident, blind_windows);
    }
}

fn dna(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), 1..max_len)
}

proptest! {
    #[test]
    fn prop_canonical_is_min_of_strands(seq in dna(120), k in 1usize..32) {
        prop_assume!(k <= seq.len());
        let mut h = NtHash::new(&seq, k, 2, 0).unwrap();
        while h.roll() {
            prop_assert_eq!(h.canonical_hash(), h.forward_hash().min(h.reverse_hash()));
            prop_assert_eq!(h.hashes()[0], h.canonical_hash());
        }
    }

    #[test]
    fn prop_roll_back_undoes_roll(seq in dna(120), k in 1usize..32) {
        prop_assume!(k < seq.len());
        let mut h = NtHash::new(&seq, k, 3, 0).unwrap();
        prop_assert!(h.roll());
        while h.pos() + k < seq.len() {
            let (fwd, rev) = (h.forward_hash(), h.reverse_hash());
            prop_assert!(h.roll());
            prop_assert!(h.roll_back());
            prop_assert_eq!(h.forward_hash(), fwd);
            prop_assert_eq!(h.reverse_hash(), rev);
            prop_assert!(h.roll());
        }
    }

    #[test]
    fn prop_rolled_hash_equals_fresh_hash(seq in dna(80), k in 1usize..20) {
        prop_assume!(k <= seq.len());
        let mut h = NtHash::new(&seq, k, 1, 0).unwrap();
        while h.roll() {
            let mut fresh = NtHash::new(&seq[h.pos()..h.pos() + k], k, 1, 0).unwrap();
            prop_assert!(fresh.roll());
            prop_assert_eq!(fresh.forward_hash(), h.forward_hash());
            prop_assert_eq!(fresh.reverse_hash(), h.reverse_hash());
        }
    }

    #[test]
    fn prop_seed_dont_cares_never_matter(
        seq in dna(60),
        flip in 0usize..4,
    ) {
        prop_assume!(seq.len() >= 7);
        let seed = "1100011";
        let mut mutated = seq.clone();
        mutated[3] = b"ACGT"[flip];

        let mut a = SeedNtHash::new(&seq, &[seed], 2, 7, 0).unwrap();
        let mut b = SeedNtHash::new(&mutated, &[seed], 2, 7, 0).unwrap();
        prop_assert!(a.roll());
        prop_assert!(b.roll());
        prop_assert_eq!(a.hashes(), b.hashes());
    }
}
