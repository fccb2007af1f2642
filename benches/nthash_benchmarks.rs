use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ntbloom::{BlindNtHash, NtHash, SeedNtHash};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::hint::black_box;

fn generate_dna(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..len).map(|_| b"ACGT"[rng.random_range(0..4)]).collect()
}

fn bench_nthash(c: &mut Criterion) {
    let mut group = c.benchmark_group("nthash_roll");
    let seq = generate_dna(100_000);

    for num_hashes in [1, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("canonical_k31", num_hashes),
            &seq,
            |b, seq| {
                b.iter(|| {
                    let mut h = NtHash::new(seq, 31, num_hashes, 0)
                        .expect("Failed to create roller");
                    let mut acc = 0u64;
                    while h.roll() {
                        acc ^= h.hashes()[0];
                    }
                    black_box(acc)
                })
            },
        );
    }

    group.bench_with_input(BenchmarkId::new("blind_k31", 1), &seq, |b, seq| {
        b.iter(|| {
            let mut h = BlindNtHash::new(&seq[..31], 1, 0)
                .expect("Failed to create roller");
            for &c in &seq[31..] {
                h.roll(c);
            }
            black_box(h.hashes()[0])
        })
    });

    let seeds = ["111110000011111", "110101101011011"];
    group.bench_with_input(BenchmarkId::new("seeds_k15", 2), &seq, |b, seq| {
        b.iter(|| {
            let mut h = SeedNtHash::new(seq, &seeds, 2, 15, 0)
                .expect("Failed to create roller");
            let mut acc = 0u64;
            while h.roll() {
                acc ^= h.hashes()[0];
            }
            black_box(acc)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_nthash);
criterion_main!(benches);
