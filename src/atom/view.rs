//! Borrowed atom views over the mapped extent.

use super::{
    checksum, get_u16, get_u64, Atom, ATOM_SIZE, FLAGS_OFFSET, GEO_HASH_OFFSET,
    HARMONY_SCORE_OFFSET, MAGIC, MAGIC_OFFSET, PAYLOAD_OFFSET, PAYLOAD_SIZE, SCHEMA_OFFSET,
    SEQUENCE_STAMP_OFFSET, STRANDS_OFFSET,
};

/// Read-only view of one occupied slot
///
/// Aliases the mapped memory directly; fields are decoded on access and the
/// payload is handed out as a borrowed slice. Call [`AtomView::to_atom`] to
/// materialize a copy.
#[derive(Debug, Clone, Copy)]
pub struct AtomView<'a> {
    index: u64,
    bytes: &'a [u8; ATOM_SIZE],
}

impl<'a> AtomView<'a> {
    pub(crate) fn new(index: u64, bytes: &'a [u8; ATOM_SIZE]) -> Self {
        Self { index, bytes }
    }

    /// Slot index this view was read from
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn magic(&self) -> u16 {
        get_u16(self.bytes, MAGIC_OFFSET)
    }

    pub fn sequence_stamp(&self) -> u64 {
        get_u64(self.bytes, SEQUENCE_STAMP_OFFSET)
    }

    pub fn geo_hash(&self) -> u64 {
        get_u64(self.bytes, GEO_HASH_OFFSET)
    }

    pub fn schema(&self) -> u16 {
        get_u16(self.bytes, SCHEMA_OFFSET)
    }

    /// Raw fixed-point score (score × 10000)
    pub fn harmony_score(&self) -> u16 {
        get_u16(self.bytes, HARMONY_SCORE_OFFSET)
    }

    /// Score decoded back into `[0, 1]`
    pub fn harmony(&self) -> f64 {
        crate::admission::decode_score(self.harmony_score())
    }

    pub fn flags(&self) -> u16 {
        get_u16(self.bytes, FLAGS_OFFSET)
    }

    /// The 32 payload bytes, borrowed from the mapping
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_SIZE]
    }

    pub fn strands(&self) -> u64 {
        get_u64(self.bytes, STRANDS_OFFSET)
    }

    /// Whole slot, all 64 bytes
    pub fn as_bytes(&self) -> &'a [u8; ATOM_SIZE] {
        self.bytes
    }

    pub fn has_magic(&self) -> bool {
        self.magic() == MAGIC
    }

    /// True if strands holds the CRC32 of the preceding 56 bytes
    pub fn checksum_matches(&self) -> bool {
        self.strands() == checksum(self.bytes)
    }

    /// Copy the slot out of the mapping
    pub fn to_atom(&self) -> Atom {
        Atom::decode(self.bytes)
    }
}
