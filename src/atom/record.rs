//! Owned atom records and per-write options.

use super::{
    get_u16, get_u64, put_u16, put_u64, ATOM_SIZE, FLAGS_OFFSET, GEO_HASH_OFFSET,
    HARMONY_SCORE_OFFSET, MAGIC_OFFSET, PAYLOAD_OFFSET, PAYLOAD_SIZE, SCHEMA_OFFSET,
    SEQUENCE_STAMP_OFFSET, STRANDS_OFFSET,
};

/// A materialized copy of one 64-byte slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    /// Occupancy sentinel
    pub magic: u16,
    /// Unix millis at write time
    pub sequence_stamp: u64,
    /// Opaque location tag
    pub geo_hash: u64,
    /// Payload type tag
    pub schema: u16,
    /// Admission score × 10000
    pub harmony_score: u16,
    /// Caller/engine bitfield
    pub flags: u16,
    /// Payload, zero-padded on the right
    pub payload: [u8; PAYLOAD_SIZE],
    /// Trailing tag or checksum
    pub strands: u64,
}

impl Atom {
    /// Truncate or zero-pad `data` to exactly 32 bytes
    pub fn fit_payload(data: &[u8]) -> [u8; PAYLOAD_SIZE] {
        let mut payload = [0u8; PAYLOAD_SIZE];
        let len = data.len().min(PAYLOAD_SIZE);
        payload[..len].copy_from_slice(&data[..len]);
        payload
    }

    /// Decode one slot
    pub fn decode(slot: &[u8; ATOM_SIZE]) -> Self {
        let mut payload = [0u8; PAYLOAD_SIZE];
        payload.copy_from_slice(&slot[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_SIZE]);

        Self {
            magic: get_u16(slot, MAGIC_OFFSET),
            sequence_stamp: get_u64(slot, SEQUENCE_STAMP_OFFSET),
            geo_hash: get_u64(slot, GEO_HASH_OFFSET),
            schema: get_u16(slot, SCHEMA_OFFSET),
            harmony_score: get_u16(slot, HARMONY_SCORE_OFFSET),
            flags: get_u16(slot, FLAGS_OFFSET),
            payload,
            strands: get_u64(slot, STRANDS_OFFSET),
        }
    }

    /// Write every field straight into `slot`
    pub fn encode_into(&self, slot: &mut [u8; ATOM_SIZE]) {
        put_u16(slot, MAGIC_OFFSET, self.magic);
        put_u64(slot, SEQUENCE_STAMP_OFFSET, self.sequence_stamp);
        put_u64(slot, GEO_HASH_OFFSET, self.geo_hash);
        put_u16(slot, SCHEMA_OFFSET, self.schema);
        put_u16(slot, HARMONY_SCORE_OFFSET, self.harmony_score);
        put_u16(slot, FLAGS_OFFSET, self.flags);
        slot[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_SIZE].copy_from_slice(&self.payload);
        put_u64(slot, STRANDS_OFFSET, self.strands);
    }

    /// Encode into a fresh 64-byte buffer
    pub fn to_bytes(&self) -> [u8; ATOM_SIZE] {
        let mut slot = [0u8; ATOM_SIZE];
        self.encode_into(&mut slot);
        slot
    }

    /// Harmony score decoded back into `[0, 1]`
    pub fn harmony(&self) -> f64 {
        crate::admission::decode_score(self.harmony_score)
    }
}

/// Per-write overrides for the fields the caller may supply
///
/// Anything left as `None` falls back to the engine's configured default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub schema: u16,
    pub geo_hash: Option<u64>,
    pub flags: Option<u16>,
    /// Ignored when the engine computes CRC32 strands
    pub strands: Option<u64>,
}

impl WriteOptions {
    pub fn new(schema: u16) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    pub fn geo_hash(mut self, geo_hash: u64) -> Self {
        self.geo_hash = Some(geo_hash);
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn strands(mut self, strands: u64) -> Self {
        self.strands = Some(strands);
        self
    }
}
