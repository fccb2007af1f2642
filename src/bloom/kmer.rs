//! Filters that hash whole sequences window by window.
//!
//! Sequences shorter than k contribute no windows, and windows holding a
//! non-ACGT symbol are skipped by the underlying roller.

use super::counting::{Counter, CountingBloomFilter};
use super::storage::{FilterKind, decode_filter, encode_filter};
use super::{
    BloomError, BloomFilter, BloomFilterConfig, BloomParams, BloomResult,
    PersistentBloomFilter,
};
use crate::nthash::{HashSeed, NtHash, NtHashConfig, SeedNtHash};
use std::sync::Arc;

fn check_k(k: usize) -> BloomResult<()> {
    if k == 0 {
        return Err(BloomError::InvalidConfig("k-mer size must be > 0".into()));
    }
    Ok(())
}

fn header_k(k: Option<u32>) -> BloomResult<usize> {
    match k {
        Some(k) if k > 0 => Ok(k as usize),
        _ => Err(BloomError::CorruptFile("missing k-mer size".into())),
    }
}

/// Roller over `seq`, or `None` when the sequence holds no full window.
fn kmer_roller(
    seq: &[u8],
    k: usize,
    num_hashes: usize,
) -> BloomResult<Option<NtHash<'_>>> {
    if seq.len() < k {
        return Ok(None);
    }
    Ok(Some(NtHash::new(seq, k, num_hashes, 0)?))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerBloomFilter {
    filter: BloomFilter,
    k: usize,
}

impl KmerBloomFilter {
    pub fn new(num_bits: usize, num_hashes: usize, k: usize) -> BloomResult<Self> {
        check_k(k)?;
        Ok(Self {
            filter: BloomFilter::new(num_bits, num_hashes)?,
            k,
        })
    }

    pub fn from_config(config: &BloomFilterConfig, k: usize) -> BloomResult<Self> {
        check_k(k)?;
        Ok(Self {
            filter: BloomFilter::from_config(config)?,
            k,
        })
    }

    /// Insert every valid k-mer of `seq`.
    pub fn insert_seq(&mut self, seq: &[u8]) -> BloomResult<()> {
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                self.filter.insert(roller.hashes())?;
            }
        }
        Ok(())
    }

    /// Number of valid k-mers of `seq` present in the filter.
    pub fn contains_seq(&self, seq: &[u8]) -> BloomResult<usize> {
        let mut hits = 0;
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                if self.filter.contains(roller.hashes())? {
                    hits += 1;
                }
            }
        }
        Ok(hits)
    }

    /// Whether any valid k-mer of `seq` is present. Stops at the first hit.
    pub fn contains_any(&self, seq: &[u8]) -> BloomResult<bool> {
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                if self.filter.contains(roller.hashes())? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Number of valid k-mers of `seq` missing from the filter.
    pub fn count_absent(&self, seq: &[u8]) -> BloomResult<usize> {
        let mut misses = 0;
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                if !self.filter.contains(roller.hashes())? {
                    misses += 1;
                }
            }
        }
        Ok(misses)
    }

    pub fn insert(&mut self, hashes: &[u64]) -> BloomResult<()> {
        self.filter.insert(hashes)
    }

    pub fn contains(&self, hashes: &[u64]) -> BloomResult<bool> {
        self.filter.contains(hashes)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_hashes(&self) -> usize {
        self.filter.num_hashes()
    }

    pub fn pop_count(&self) -> usize {
        self.filter.pop_count()
    }

    pub fn occupancy(&self) -> f64 {
        self.filter.occupancy()
    }

    pub fn fpr(&self) -> f64 {
        self.filter.fpr()
    }

    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }
}

impl PersistentBloomFilter for KmerBloomFilter {
    fn to_bytes(&self) -> BloomResult<Vec<u8>> {
        let header = self.filter.header(FilterKind::KmerBloom).with_k(self.k);
        encode_filter(&header, self.filter.as_raw_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> BloomResult<Self> {
        let (header, payload) = decode_filter(bytes, FilterKind::KmerBloom, None)?;
        Ok(Self {
            k: header_k(header.k)?,
            filter: BloomFilter::from_parts(&header, payload),
        })
    }
}

/// Bloom filter keyed by spaced seeds. Each seed of each window is inserted
/// as its own element with `hashes_per_seed` values.
#[derive(Debug, Clone)]
pub struct SeedBloomFilter {
    filter: BloomFilter,
    k: usize,
    seeds: Arc<[HashSeed]>,
}

impl SeedBloomFilter {
    pub fn new<S: AsRef<str>>(
        num_bits: usize,
        k: usize,
        seeds: &[S],
        hashes_per_seed: usize,
    ) -> BloomResult<Self> {
        check_k(k)?;
        let seeds: Arc<[HashSeed]> = HashSeed::parse_all(seeds, k)?.into();
        Ok(Self {
            filter: BloomFilter::new(num_bits, hashes_per_seed)?,
            k,
            seeds,
        })
    }

    fn roller<'a>(&self, seq: &'a [u8]) -> BloomResult<Option<SeedNtHash<'a>>> {
        if seq.len() < self.k {
            return Ok(None);
        }
        let config = NtHashConfig::new(self.k, self.filter.num_hashes());
        Ok(Some(SeedNtHash::with_config(seq, self.seeds.clone(), &config)?))
    }

    pub fn insert_seq(&mut self, seq: &[u8]) -> BloomResult<()> {
        if let Some(mut roller) = self.roller(seq)? {
            while roller.roll() {
                for i in 0..roller.num_seeds() {
                    self.filter.insert(roller.seed_hashes(i))?;
                }
            }
        }
        Ok(())
    }

    /// For each valid window, the indices of the seeds found in the filter.
    pub fn contains_seq(&self, seq: &[u8]) -> BloomResult<Vec<Vec<usize>>> {
        let mut hits = Vec::new();
        if let Some(mut roller) = self.roller(seq)? {
            while roller.roll() {
                let mut window_hits = Vec::new();
                for i in 0..roller.num_seeds() {
                    if self.filter.contains(roller.seed_hashes(i))? {
                        window_hits.push(i);
                    }
                }
                hits.push(window_hits);
            }
        }
        Ok(hits)
    }

    /// Insert one seed's hash values.
    pub fn insert(&mut self, hashes: &[u64]) -> BloomResult<()> {
        self.filter.insert(hashes)
    }

    pub fn contains(&self, hashes: &[u64]) -> BloomResult<bool> {
        self.filter.contains(hashes)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn seeds(&self) -> &[HashSeed] {
        &self.seeds
    }

    pub fn hashes_per_seed(&self) -> usize {
        self.filter.num_hashes()
    }

    pub fn pop_count(&self) -> usize {
        self.filter.pop_count()
    }

    pub fn occupancy(&self) -> f64 {
        self.filter.occupancy()
    }

    pub fn fpr(&self) -> f64 {
        self.filter.fpr()
    }

    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }
}

impl PersistentBloomFilter for SeedBloomFilter {
    fn to_bytes(&self) -> BloomResult<Vec<u8>> {
        let patterns = self.seeds.iter().map(|s| s.pattern().to_string()).collect();
        let header = self
            .filter
            .header(FilterKind::SeedBloom)
            .with_k(self.k)
            .with_seeds(patterns);
        encode_filter(&header, self.filter.as_raw_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> BloomResult<Self> {
        let (header, payload) = decode_filter(bytes, FilterKind::SeedBloom, None)?;
        let k = header_k(header.k)?;
        let patterns = header
            .seeds
            .as_deref()
            .ok_or_else(|| BloomError::CorruptFile("missing seed patterns".into()))?;
        let seeds: Arc<[HashSeed]> = HashSeed::parse_all(patterns, k)
            .map_err(|e| BloomError::CorruptFile(format!("bad seed patterns: {e}")))?
            .into();
        Ok(Self {
            filter: BloomFilter::from_parts(&header, payload),
            k,
            seeds,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerCountingBloomFilter<T: Counter = u8> {
    filter: CountingBloomFilter<T>,
    k: usize,
}

impl<T: Counter> KmerCountingBloomFilter<T> {
    pub fn new(num_slots: usize, num_hashes: usize, k: usize) -> BloomResult<Self> {
        check_k(k)?;
        Ok(Self {
            filter: CountingBloomFilter::new(num_slots, num_hashes)?,
            k,
        })
    }

    pub fn from_config(config: &BloomFilterConfig, k: usize) -> BloomResult<Self> {
        check_k(k)?;
        config.validate()?;
        let params = BloomParams::from(config);
        Self::new(params.num_bits, params.num_hashes, k)
    }

    pub fn insert_seq(&mut self, seq: &[u8]) -> BloomResult<()> {
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                self.filter.insert(roller.hashes())?;
            }
        }
        Ok(())
    }

    pub fn remove_seq(&mut self, seq: &[u8]) -> BloomResult<()> {
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                self.filter.remove(roller.hashes())?;
            }
        }
        Ok(())
    }

    /// Sum of the counts of every valid k-mer of `seq`.
    pub fn count_seq(&self, seq: &[u8]) -> BloomResult<u64> {
        let mut total = 0u64;
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                total += self.filter.count(roller.hashes())?.to_u64();
            }
        }
        Ok(total)
    }

    /// Number of valid k-mers of `seq` with a non-zero count.
    pub fn contains_seq(&self, seq: &[u8]) -> BloomResult<usize> {
        let mut hits = 0;
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                if self.filter.contains(roller.hashes())? {
                    hits += 1;
                }
            }
        }
        Ok(hits)
    }

    /// Zeroes the counters of every valid k-mer of `seq`.
    pub fn clear_seq(&mut self, seq: &[u8]) -> BloomResult<()> {
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                self.filter.clear(roller.hashes())?;
            }
        }
        Ok(())
    }

    /// Inserts each k-mer, summing the counts seen before each insert.
    pub fn contains_insert_seq(&mut self, seq: &[u8]) -> BloomResult<u64> {
        self.fold_windows(seq, |filter, hashes| filter.contains_insert(hashes))
    }

    /// Inserts each k-mer, summing the counts seen after each insert.
    pub fn insert_contains_seq(&mut self, seq: &[u8]) -> BloomResult<u64> {
        self.fold_windows(seq, |filter, hashes| filter.insert_contains(hashes))
    }

    /// Inserts each k-mer whose count is below `threshold`, summing the
    /// counts after the step.
    pub fn insert_thresh_contains_seq(&mut self, seq: &[u8], threshold: T) -> BloomResult<u64> {
        self.fold_windows(seq, |filter, hashes| {
            filter.insert_thresh_contains(hashes, threshold)
        })
    }

    /// Inserts each k-mer whose count is below `threshold`, summing the
    /// counts before the step.
    pub fn contains_insert_thresh_seq(&mut self, seq: &[u8], threshold: T) -> BloomResult<u64> {
        self.fold_windows(seq, |filter, hashes| {
            filter.contains_insert_thresh(hashes, threshold)
        })
    }

    fn fold_windows<F>(&mut self, seq: &[u8], mut step: F) -> BloomResult<u64>
    where
        F: FnMut(&mut CountingBloomFilter<T>, &[u64]) -> BloomResult<T>,
    {
        let mut total = 0u64;
        if let Some(mut roller) = kmer_roller(seq, self.k, self.filter.num_hashes())? {
            while roller.roll() {
                total += step(&mut self.filter, roller.hashes())?.to_u64();
            }
        }
        Ok(total)
    }

    pub fn insert(&mut self, hashes: &[u64]) -> BloomResult<()> {
        self.filter.insert(hashes)
    }

    pub fn remove(&mut self, hashes: &[u64]) -> BloomResult<()> {
        self.filter.remove(hashes)
    }

    pub fn count(&self, hashes: &[u64]) -> BloomResult<T> {
        self.filter.count(hashes)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_hashes(&self) -> usize {
        self.filter.num_hashes()
    }

    pub fn filter(&self) -> &CountingBloomFilter<T> {
        &self.filter
    }
}

impl<T: Counter> PersistentBloomFilter for KmerCountingBloomFilter<T> {
    fn to_bytes(&self) -> BloomResult<Vec<u8>> {
        let header = self.filter.header(FilterKind::KmerCounting).with_k(self.k);
        encode_filter(&header, &self.filter.payload())
    }

    fn from_bytes(bytes: &[u8]) -> BloomResult<Self> {
        let (header, payload) =
            decode_filter(bytes, FilterKind::KmerCounting, Some(T::BITS))?;
        Ok(Self {
            k: header_k(header.k)?,
            filter: CountingBloomFilter::from_parts(&header, payload),
        })
    }
}
