//! Counting Bloom filter with saturating counters.
//!
//! A counter sticks at its maximum once reached: further inserts leave it
//! there and removes can no longer restore the exact earlier count.

use super::storage::{
    FilterHeader, FilterKind, MAX_NUM_HASHES, decode_filter, encode_filter,
};
use super::{
    BloomError, BloomFilterConfig, BloomFilterOps, BloomFilterStats,
    BloomParams, BloomResult, PersistentBloomFilter,
};
use crate::common::bytes2hr;
use std::fmt::Debug;
use tracing::debug;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Unsigned counter width usable in a [`CountingBloomFilter`].
pub trait Counter:
    sealed::Sealed + Copy + Ord + Default + Debug + Send + Sync + 'static
{
    const BITS: u8;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    fn saturating_inc(self) -> Self;
    /// Decrement, leaving zero at zero.
    fn saturating_dec(self) -> Self;
    fn saturating_add(self, other: Self) -> Self;
    fn to_u64(self) -> u64;
    fn write_le(self, out: &mut Vec<u8>);
    /// Decode from exactly `BITS / 8` little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_counter {
    ($t:ty) => {
        impl Counter for $t {
            const BITS: u8 = <$t>::BITS as u8;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MAX: Self = <$t>::MAX;

            #[inline]
            fn saturating_inc(self) -> Self {
                self.saturating_add(1)
            }

            #[inline]
            fn saturating_dec(self) -> Self {
                self.saturating_sub(1)
            }

            #[inline]
            fn saturating_add(self, other: Self) -> Self {
                <$t>::saturating_add(self, other)
            }

            #[inline]
            fn to_u64(self) -> u64 {
                self as u64
            }

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                <$t>::from_le_bytes(buf)
            }
        }
    };
}

impl_counter!(u8);
impl_counter!(u16);
impl_counter!(u32);

#[derive(Clone, PartialEq, Eq)]
pub struct CountingBloomFilter<T: Counter = u8> {
    counters: Vec<T>,
    num_hashes: usize,
}

impl<T: Counter> CountingBloomFilter<T> {
    pub fn new(num_slots: usize, num_hashes: usize) -> BloomResult<Self> {
        if num_slots == 0 {
            return Err(BloomError::InvalidConfig(
                "Number of counters must be > 0".into(),
            ));
        }
        if num_hashes == 0 || num_hashes > MAX_NUM_HASHES {
            return Err(BloomError::InvalidConfig(format!(
                "Number of hashes must be in 1..={MAX_NUM_HASHES}, got {num_hashes}"
            )));
        }
        debug!(
            num_slots,
            num_hashes,
            counter_bits = T::BITS,
            size = %bytes2hr(num_slots * T::BITS as usize / 8),
            "Creating counting Bloom filter"
        );
        Ok(Self {
            counters: vec![T::ZERO; num_slots],
            num_hashes,
        })
    }

    /// `num_bits` in the config is read as the number of counters.
    pub fn from_config(config: &BloomFilterConfig) -> BloomResult<Self> {
        config.validate()?;
        let params = BloomParams::from(config);
        Self::new(params.num_bits, params.num_hashes)
    }

    fn slots<'h>(
        &self,
        hashes: &'h [u64],
    ) -> BloomResult<impl Iterator<Item = usize> + use<'h, T>> {
        if hashes.len() < self.num_hashes {
            return Err(BloomError::HashCountMismatch {
                expected: self.num_hashes,
                found: hashes.len(),
            });
        }
        let len = self.counters.len() as u64;
        Ok(hashes[..self.num_hashes]
            .iter()
            .map(move |&h| (h % len) as usize))
    }

    fn min_count(&self, hashes: &[u64]) -> BloomResult<T> {
        Ok(self
            .slots(hashes)?
            .map(|i| self.counters[i])
            .min()
            .unwrap_or(T::ZERO))
    }

    pub fn insert(&mut self, hashes: &[u64]) -> BloomResult<()> {
        for i in self.slots(hashes)? {
            self.counters[i] = self.counters[i].saturating_inc();
        }
        Ok(())
    }

    pub fn remove(&mut self, hashes: &[u64]) -> BloomResult<()> {
        for i in self.slots(hashes)? {
            self.counters[i] = self.counters[i].saturating_dec();
        }
        Ok(())
    }

    /// Zero every counter the element maps to.
    pub fn clear(&mut self, hashes: &[u64]) -> BloomResult<()> {
        for i in self.slots(hashes)? {
            self.counters[i] = T::ZERO;
        }
        Ok(())
    }

    /// Minimum of the element's counters; zero means absent.
    pub fn count(&self, hashes: &[u64]) -> BloomResult<T> {
        self.min_count(hashes)
    }

    pub fn contains(&self, hashes: &[u64]) -> BloomResult<bool> {
        Ok(self.min_count(hashes)? > T::ZERO)
    }

    /// Count before inserting.
    pub fn contains_insert(&mut self, hashes: &[u64]) -> BloomResult<T> {
        let before = self.min_count(hashes)?;
        self.insert(hashes)?;
        Ok(before)
    }

    /// Count after inserting.
    pub fn insert_contains(&mut self, hashes: &[u64]) -> BloomResult<T> {
        self.insert(hashes)?;
        self.min_count(hashes)
    }

    /// Insert only while the count is below `threshold`; returns the count
    /// afterwards.
    pub fn insert_thresh_contains(
        &mut self,
        hashes: &[u64],
        threshold: T,
    ) -> BloomResult<T> {
        let count = self.min_count(hashes)?;
        if count < threshold {
            self.insert(hashes)?;
            return self.min_count(hashes);
        }
        Ok(count)
    }

    /// Insert only while the count is below `threshold`; returns the count
    /// beforehand.
    pub fn contains_insert_thresh(
        &mut self,
        hashes: &[u64],
        threshold: T,
    ) -> BloomResult<T> {
        let count = self.min_count(hashes)?;
        if count < threshold {
            self.insert(hashes)?;
        }
        Ok(count)
    }

    /// Saturating, counter-wise sum of two filters of identical shape.
    pub fn union(&mut self, other: &CountingBloomFilter<T>) -> BloomResult<()> {
        if self.counters.len() != other.counters.len()
            || self.num_hashes != other.num_hashes
        {
            return Err(BloomError::ShapeMismatch(format!(
                "{} counters / {} hashes vs {} counters / {} hashes",
                self.counters.len(),
                self.num_hashes,
                other.counters.len(),
                other.num_hashes
            )));
        }
        for (a, &b) in self.counters.iter_mut().zip(&other.counters) {
            *a = a.saturating_add(b);
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.counters.fill(T::ZERO);
    }

    pub fn num_slots(&self) -> usize {
        self.counters.len()
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn counters(&self) -> &[T] {
        &self.counters
    }

    /// Counters at or above `threshold`.
    pub fn pop_count_thresh(&self, threshold: T) -> usize {
        self.counters.iter().filter(|&&c| c >= threshold).count()
    }

    pub fn occupancy_thresh(&self, threshold: T) -> f64 {
        self.pop_count_thresh(threshold) as f64 / self.counters.len() as f64
    }

    /// Probability that an absent element reports a count of at least
    /// `threshold`.
    pub fn fpr_thresh(&self, threshold: T) -> f64 {
        self.occupancy_thresh(threshold).powi(self.num_hashes as i32)
    }

    pub fn pop_count(&self) -> usize {
        self.pop_count_thresh(T::ONE)
    }

    pub fn occupancy(&self) -> f64 {
        self.occupancy_thresh(T::ONE)
    }

    pub fn fpr(&self) -> f64 {
        self.fpr_thresh(T::ONE)
    }

    pub(crate) fn header(&self, kind: FilterKind) -> FilterHeader {
        FilterHeader::new(kind, self.counters.len(), self.num_hashes)
            .with_counter_bits(T::BITS)
    }

    pub(crate) fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.counters.len() * T::BITS as usize / 8);
        for &c in &self.counters {
            c.write_le(&mut out);
        }
        out
    }

    /// Caller has already checked the payload length against the header.
    pub(crate) fn from_parts(header: &FilterHeader, payload: &[u8]) -> Self {
        let width = T::BITS as usize / 8;
        Self {
            counters: payload.chunks_exact(width).map(T::read_le).collect(),
            num_hashes: header.num_hashes as usize,
        }
    }
}

impl<T: Counter> BloomFilterOps for CountingBloomFilter<T> {
    fn insert(&mut self, hashes: &[u64]) -> BloomResult<()> {
        CountingBloomFilter::insert(self, hashes)
    }

    fn contains(&self, hashes: &[u64]) -> BloomResult<bool> {
        CountingBloomFilter::contains(self, hashes)
    }
}

impl<T: Counter> BloomFilterStats for CountingBloomFilter<T> {
    fn num_slots(&self) -> usize {
        self.counters.len()
    }

    fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    fn pop_count(&self) -> usize {
        self.pop_count_thresh(T::ONE)
    }
}

impl<T: Counter> PersistentBloomFilter for CountingBloomFilter<T> {
    fn to_bytes(&self) -> BloomResult<Vec<u8>> {
        encode_filter(&self.header(FilterKind::Counting), &self.payload())
    }

    fn from_bytes(bytes: &[u8]) -> BloomResult<Self> {
        let (header, payload) =
            decode_filter(bytes, FilterKind::Counting, Some(T::BITS))?;
        Ok(Self::from_parts(&header, payload))
    }
}

impl<T: Counter> std::fmt::Debug for CountingBloomFilter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CountingBloomFilter {{ num_slots: {}, num_hashes: {}, counter_bits: {}, pop_count: {} }}",
            self.counters.len(),
            self.num_hashes,
            T::BITS,
            self.pop_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_count_remove() {
        let mut filter = CountingBloomFilter::<u8>::new(100, 3).unwrap();
        let h = [5, 17, 42];
        assert_eq!(filter.count(&h).unwrap(), 0);
        filter.insert(&h).unwrap();
        filter.insert(&h).unwrap();
        assert_eq!(filter.count(&h).unwrap(), 2);
        assert!(filter.contains(&h).unwrap());

        filter.remove(&h).unwrap();
        assert_eq!(filter.count(&h).unwrap(), 1);
        filter.remove(&h).unwrap();
        assert!(!filter.contains(&h).unwrap());
        // removing an absent element is a no-op
        filter.remove(&h).unwrap();
        assert_eq!(filter.pop_count(), 0);
    }

    #[test]
    fn test_count_is_minimum() {
        let mut filter = CountingBloomFilter::<u16>::new(100, 2).unwrap();
        filter.insert(&[1, 2]).unwrap();
        filter.insert(&[1, 3]).unwrap();
        assert_eq!(filter.count(&[1, 2]).unwrap(), 1);
        assert_eq!(filter.counters()[1], 2);
    }

    #[test]
    fn test_saturation() {
        let mut filter = CountingBloomFilter::<u8>::new(16, 1).unwrap();
        for _ in 0..300 {
            filter.insert(&[3]).unwrap();
        }
        assert_eq!(filter.count(&[3]).unwrap(), u8::MAX);
        filter.remove(&[3]).unwrap();
        assert_eq!(filter.count(&[3]).unwrap(), u8::MAX - 1);
    }

    #[test]
    fn test_combined_operations() {
        let mut filter = CountingBloomFilter::<u8>::new(64, 2).unwrap();
        let h = [10, 20];
        assert_eq!(filter.contains_insert(&h).unwrap(), 0);
        assert_eq!(filter.insert_contains(&h).unwrap(), 2);

        assert_eq!(filter.insert_thresh_contains(&h, 3).unwrap(), 3);
        assert_eq!(filter.insert_thresh_contains(&h, 3).unwrap(), 3);
        assert_eq!(filter.contains_insert_thresh(&h, 4).unwrap(), 3);
        assert_eq!(filter.contains_insert_thresh(&h, 4).unwrap(), 4);
        assert_eq!(filter.count(&h).unwrap(), 4);

        filter.clear(&h).unwrap();
        assert_eq!(filter.count(&h).unwrap(), 0);
    }

    #[test]
    fn test_threshold_stats() {
        let mut filter = CountingBloomFilter::<u32>::new(10, 1).unwrap();
        filter.insert(&[0]).unwrap();
        filter.insert(&[1]).unwrap();
        filter.insert(&[1]).unwrap();
        assert_eq!(filter.pop_count(), 2);
        assert_eq!(filter.pop_count_thresh(2), 1);
        assert!((filter.occupancy() - 0.2).abs() < f64::EPSILON);
        assert!((filter.fpr_thresh(2) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_union_saturates() {
        let mut a = CountingBloomFilter::<u8>::new(8, 1).unwrap();
        let mut b = CountingBloomFilter::<u8>::new(8, 1).unwrap();
        for _ in 0..200 {
            a.insert(&[2]).unwrap();
            b.insert(&[2]).unwrap();
        }
        b.insert(&[5]).unwrap();
        a.union(&b).unwrap();
        assert_eq!(a.count(&[2]).unwrap(), u8::MAX);
        assert_eq!(a.count(&[5]).unwrap(), 1);

        let c = CountingBloomFilter::<u8>::new(8, 2).unwrap();
        assert!(matches!(a.union(&c), Err(BloomError::ShapeMismatch(_))));
    }

    #[test]
    fn test_roundtrip_bytes_per_width() {
        let mut filter = CountingBloomFilter::<u16>::new(33, 2).unwrap();
        for _ in 0..1000 {
            filter.insert(&[7, 30]).unwrap();
        }
        let bytes = filter.to_bytes().unwrap();
        let restored = CountingBloomFilter::<u16>::from_bytes(&bytes).unwrap();
        assert_eq!(restored, filter);
        assert_eq!(restored.count(&[7, 30]).unwrap(), 1000);

        assert!(matches!(
            CountingBloomFilter::<u8>::from_bytes(&bytes),
            Err(BloomError::CorruptFile(_))
        ));
    }
}
