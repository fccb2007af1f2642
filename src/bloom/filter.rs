use super::storage::{
    FilterHeader, FilterKind, MAX_NUM_HASHES, decode_filter, encode_filter,
};
use super::{
    BloomError, BloomFilterConfig, BloomFilterOps, BloomFilterStats,
    BloomParams, BloomResult, PersistentBloomFilter,
};
use crate::common::bits2hr;
use crate::hash::default_hash_function;
use bitvec::{bitvec, order::Lsb0, vec::BitVec};
use tracing::debug;

/// Bit-array Bloom filter over precomputed hash values.
#[derive(Clone, PartialEq, Eq)]
pub struct BloomFilter {
    bits: BitVec<u8, Lsb0>,
    num_hashes: usize,
}

impl BloomFilter {
    pub fn new(num_bits: usize, num_hashes: usize) -> BloomResult<Self> {
        if num_bits == 0 {
            return Err(BloomError::InvalidConfig(
                "Number of bits must be > 0".into(),
            ));
        }
        if num_hashes == 0 || num_hashes > MAX_NUM_HASHES {
            return Err(BloomError::InvalidConfig(format!(
                "Number of hashes must be in 1..={MAX_NUM_HASHES}, got {num_hashes}"
            )));
        }
        debug!(num_bits, num_hashes, size = %bits2hr(num_bits), "Creating Bloom filter");
        Ok(Self {
            bits: bitvec![u8, Lsb0; 0; num_bits],
            num_hashes,
        })
    }

    pub fn from_config(config: &BloomFilterConfig) -> BloomResult<Self> {
        config.validate()?;
        let params = BloomParams::from(config);
        Self::new(params.num_bits, params.num_hashes)
    }

    #[inline]
    pub(crate) fn check_hashes(&self, hashes: &[u64]) -> BloomResult<()> {
        if hashes.len() < self.num_hashes {
            return Err(BloomError::HashCountMismatch {
                expected: self.num_hashes,
                found: hashes.len(),
            });
        }
        Ok(())
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash % self.bits.len() as u64) as usize
    }

    pub fn insert(&mut self, hashes: &[u64]) -> BloomResult<()> {
        self.check_hashes(hashes)?;
        for &h in &hashes[..self.num_hashes] {
            let idx = self.slot(h);
            self.bits.set(idx, true);
        }
        Ok(())
    }

    pub fn contains(&self, hashes: &[u64]) -> BloomResult<bool> {
        self.check_hashes(hashes)?;
        Ok(hashes[..self.num_hashes].iter().all(|&h| self.bits[self.slot(h)]))
    }

    /// Report whether the element was present, then insert it.
    pub fn contains_insert(&mut self, hashes: &[u64]) -> BloomResult<bool> {
        self.check_hashes(hashes)?;
        let mut present = true;
        for &h in &hashes[..self.num_hashes] {
            let idx = self.slot(h);
            present &= self.bits.replace(idx, true);
        }
        Ok(present)
    }

    pub fn insert_bytes(&mut self, item: &[u8]) -> BloomResult<()> {
        let hashes = default_hash_function(item, self.num_hashes);
        self.insert(&hashes)
    }

    pub fn contains_bytes(&self, item: &[u8]) -> BloomResult<bool> {
        let hashes = default_hash_function(item, self.num_hashes);
        self.contains(&hashes)
    }

    /// Merge a filter of identical shape into this one.
    pub fn union(&mut self, other: &BloomFilter) -> BloomResult<()> {
        if self.bits.len() != other.bits.len()
            || self.num_hashes != other.num_hashes
        {
            return Err(BloomError::ShapeMismatch(format!(
                "{} bits / {} hashes vs {} bits / {} hashes",
                self.bits.len(),
                self.num_hashes,
                other.bits.len(),
                other.num_hashes
            )));
        }
        for (a, b) in self
            .bits
            .as_raw_mut_slice()
            .iter_mut()
            .zip(other.bits.as_raw_slice())
        {
            *a |= b;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn pop_count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn occupancy(&self) -> f64 {
        BloomFilterStats::occupancy(self)
    }

    pub fn fpr(&self) -> f64 {
        BloomFilterStats::fpr(self)
    }

    /// Packed bits, LSB-first.
    pub fn as_raw_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    pub(crate) fn header(&self, kind: FilterKind) -> FilterHeader {
        FilterHeader::new(kind, self.bits.len(), self.num_hashes)
    }

    pub(crate) fn from_parts(header: &FilterHeader, payload: &[u8]) -> Self {
        let mut bits = BitVec::<u8, Lsb0>::from_slice(payload);
        bits.truncate(header.num_slots as usize);
        Self {
            bits,
            num_hashes: header.num_hashes as usize,
        }
    }
}

impl BloomFilterOps for BloomFilter {
    fn insert(&mut self, hashes: &[u64]) -> BloomResult<()> {
        BloomFilter::insert(self, hashes)
    }

    fn contains(&self, hashes: &[u64]) -> BloomResult<bool> {
        BloomFilter::contains(self, hashes)
    }
}

impl BloomFilterStats for BloomFilter {
    fn num_slots(&self) -> usize {
        self.bits.len()
    }

    fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    fn pop_count(&self) -> usize {
        self.bits.count_ones()
    }
}

impl PersistentBloomFilter for BloomFilter {
    fn to_bytes(&self) -> BloomResult<Vec<u8>> {
        encode_filter(&self.header(FilterKind::Bloom), self.as_raw_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> BloomResult<Self> {
        let (header, payload) = decode_filter(bytes, FilterKind::Bloom, None)?;
        Ok(Self::from_parts(&header, payload))
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter {{ num_bits: {}, num_hashes: {}, pop_count: {} }}",
            self.bits.len(),
            self.num_hashes,
            self.pop_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::BloomFilterConfigBuilder;

    #[test]
    fn test_insert_contains() {
        let mut filter = BloomFilter::new(64, 3).unwrap();
        filter.insert(&[1, 2, 3]).unwrap();
        assert!(filter.contains(&[1, 2, 3]).unwrap());
        assert!(filter.contains(&[65, 66, 67]).unwrap());
        assert!(!filter.contains(&[4, 5, 6]).unwrap());
        assert_eq!(filter.pop_count(), 3);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut filter = BloomFilter::new(100, 2).unwrap();
        filter.insert(&[10, 20]).unwrap();
        let once = filter.clone();
        filter.insert(&[10, 20]).unwrap();
        assert_eq!(filter, once);
    }

    #[test]
    fn test_extra_hashes_are_ignored() {
        let mut filter = BloomFilter::new(100, 2).unwrap();
        filter.insert(&[10, 20, 30, 40]).unwrap();
        assert_eq!(filter.pop_count(), 2);
        assert!(filter.contains(&[10, 20]).unwrap());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            BloomFilter::new(0, 3),
            Err(BloomError::InvalidConfig(_))
        ));
        assert!(matches!(
            BloomFilter::new(10, 0),
            Err(BloomError::InvalidConfig(_))
        ));
        assert!(matches!(
            BloomFilter::new(10, MAX_NUM_HASHES + 1),
            Err(BloomError::InvalidConfig(_))
        ));
        let filter = BloomFilter::new(10, 3).unwrap();
        assert!(matches!(
            filter.contains(&[1, 2]),
            Err(BloomError::HashCountMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_contains_insert() {
        let mut filter = BloomFilter::new(128, 2).unwrap();
        assert!(!filter.contains_insert(&[7, 9]).unwrap());
        assert!(filter.contains_insert(&[7, 9]).unwrap());
    }

    #[test]
    fn test_bytes_api() {
        let mut filter = BloomFilter::from_config(
            &BloomFilterConfigBuilder::default()
                .capacity(100)
                .false_positive_rate(0.01)
                .build()
                .unwrap(),
        )
        .unwrap();
        filter.insert_bytes(b"hello").unwrap();
        assert!(filter.contains_bytes(b"hello").unwrap());
        assert!(!filter.contains_bytes(b"world").unwrap());
    }

    #[test]
    fn test_union() {
        let mut a = BloomFilter::new(256, 2).unwrap();
        let mut b = BloomFilter::new(256, 2).unwrap();
        a.insert(&[1, 2]).unwrap();
        b.insert(&[100, 200]).unwrap();
        a.union(&b).unwrap();
        assert!(a.contains(&[1, 2]).unwrap());
        assert!(a.contains(&[100, 200]).unwrap());

        let c = BloomFilter::new(128, 2).unwrap();
        assert!(matches!(a.union(&c), Err(BloomError::ShapeMismatch(_))));
    }

    #[test]
    fn test_layout_is_lsb_first() {
        let mut filter = BloomFilter::new(12, 1).unwrap();
        filter.insert(&[0]).unwrap();
        filter.insert(&[9]).unwrap();
        assert_eq!(filter.as_raw_bytes(), &[0b0000_0001, 0b0000_0010]);
    }

    #[test]
    fn test_roundtrip_bytes() {
        let mut filter = BloomFilter::new(1001, 4).unwrap();
        filter.insert(&[3, 500, 1000, 77]).unwrap();
        let restored = BloomFilter::from_bytes(&filter.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, filter);
    }
}
