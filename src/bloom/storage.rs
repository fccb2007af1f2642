//! On-disk layout shared by every filter type.
//!
//! ```text
//! offset  size  field
//! 0       8     magic b"NTBLOOM\0"
//! 8       2     format version, u16 LE
//! 10      4     header length L, u32 LE
//! 14      L     FilterHeader (bincode, standard config)
//! 14+L    P     slot payload
//! ```
//!
//! Bit payloads are packed LSB-first; counter payloads are little-endian.

use super::{BloomError, BloomResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAGIC: &[u8; 8] = b"NTBLOOM\0";
pub const FORMAT_VERSION: u16 = 1;
const PREFIX_LEN: usize = 8 + 2 + 4;
/// Upper bound on the encoded header; length fields inside it are never
/// trusted beyond this.
const MAX_HEADER_LEN: usize = 64 * 1024;
/// Largest hash count a filter may be built or loaded with.
pub const MAX_NUM_HASHES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    Bloom,
    KmerBloom,
    SeedBloom,
    Counting,
    KmerCounting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterHeader {
    pub kind: FilterKind,
    pub num_slots: u64,
    /// Hashes per window, or per seed for seed filters
    pub num_hashes: u32,
    pub k: Option<u32>,
    pub seeds: Option<Vec<String>>,
    pub counter_bits: Option<u8>,
}

impl FilterHeader {
    pub fn new(kind: FilterKind, num_slots: usize, num_hashes: usize) -> Self {
        Self {
            kind,
            num_slots: num_slots as u64,
            num_hashes: num_hashes as u32,
            k: None,
            seeds: None,
            counter_bits: None,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k as u32);
        self
    }

    pub fn with_seeds(mut self, seeds: Vec<String>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    pub fn with_counter_bits(mut self, bits: u8) -> Self {
        self.counter_bits = Some(bits);
        self
    }

    /// Payload size in bytes implied by the header, `None` on overflow.
    pub fn payload_len(&self) -> Option<usize> {
        let slots = usize::try_from(self.num_slots).ok()?;
        match self.counter_bits {
            Some(bits) => slots.checked_mul(bits as usize / 8),
            None => Some(slots.div_ceil(8)),
        }
    }
}

pub fn encode_filter(header: &FilterHeader, payload: &[u8]) -> BloomResult<Vec<u8>> {
    let header_bytes =
        bincode::serde::encode_to_vec(header, bincode::config::standard())?;
    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        BloomError::SerializationError("Filter header too large".into())
    })?;

    let mut out =
        Vec::with_capacity(PREFIX_LEN + header_bytes.len() + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(payload);
    Ok(out)
}

fn corrupt(msg: impl Into<String>) -> BloomError {
    BloomError::CorruptFile(msg.into())
}

/// Validate a serialized filter and split it into header and payload.
///
/// `counter_bits` is the counter width the caller stores (`None` for bit
/// filters). Nothing in the payload is read before its length is checked.
pub fn decode_filter(
    bytes: &[u8],
    expected_kind: FilterKind,
    counter_bits: Option<u8>,
) -> BloomResult<(FilterHeader, &[u8])> {
    if bytes.len() < PREFIX_LEN {
        return Err(corrupt(format!(
            "{} bytes is shorter than the {PREFIX_LEN} byte prefix",
            bytes.len()
        )));
    }
    let (magic, rest) = bytes.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(corrupt("bad magic"));
    }
    let (version, rest) = rest.split_at(2);
    let version = u16::from_le_bytes([version[0], version[1]]);
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported format version {version}")));
    }
    let (header_len, rest) = rest.split_at(4);
    let header_len =
        u32::from_le_bytes([header_len[0], header_len[1], header_len[2], header_len[3]])
            as usize;
    if header_len > rest.len() {
        return Err(corrupt(format!(
            "header length {header_len} exceeds remaining {} bytes",
            rest.len()
        )));
    }
    let (header_bytes, payload) = rest.split_at(header_len);
    let (header, read): (FilterHeader, usize) =
        bincode::serde::decode_from_slice(
            header_bytes,
            bincode::config::standard().with_limit::<MAX_HEADER_LEN>(),
        )
        .map_err(|e| corrupt(format!("header decode failed: {e}")))?;
    if read != header_len {
        return Err(corrupt("trailing bytes in header"));
    }

    if header.kind != expected_kind {
        return Err(corrupt(format!(
            "expected a {expected_kind:?} filter, found {:?}",
            header.kind
        )));
    }
    if header.counter_bits != counter_bits {
        return Err(corrupt(format!(
            "counter width {:?} does not match {:?}",
            header.counter_bits, counter_bits
        )));
    }
    if header.num_slots == 0 || header.num_hashes == 0 {
        return Err(corrupt("filter shape has a zero dimension"));
    }
    if header.num_hashes as usize > MAX_NUM_HASHES {
        return Err(corrupt(format!(
            "{} hashes exceeds the limit of {MAX_NUM_HASHES}",
            header.num_hashes
        )));
    }
    let expected_len = header
        .payload_len()
        .ok_or_else(|| corrupt("payload size overflows"))?;
    if payload.len() != expected_len {
        return Err(corrupt(format!(
            "payload is {} bytes, header implies {expected_len}",
            payload.len()
        )));
    }

    debug!(
        kind = ?header.kind,
        num_slots = header.num_slots,
        num_hashes = header.num_hashes,
        "Decoded filter header"
    );
    Ok((header, payload))
}
