//! Atom Module
//!
//! Fixed 64-byte records that live directly in the mapped extent.
//!
//! ## Record Layout (little-endian, packed, no padding)
//! ```text
//! ┌────────┬──────────────┬──────────────┬────────┬─────────┬───────┐
//! │Magic(2)│ SeqStamp (8) │ GeoHash (8)  │Schema 2│HScore(2)│Flags 2│
//! │  @0    │     @2       │     @10      │  @18   │   @20   │  @22  │
//! ├────────┴──────────────┴──────────────┴────────┴─────────┴───────┤
//! │ Payload (32) @24                                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Strands (8) @56                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A slot is occupied iff its magic equals [`MAGIC`]. The backing file is
//! nothing but these records concatenated in index order.

mod record;
mod view;

pub use record::{Atom, WriteOptions};
pub use view::AtomView;

// =============================================================================
// Layout Constants
// =============================================================================

/// Size of one atom in bytes
pub const ATOM_SIZE: usize = 64;

/// Sentinel marking an occupied slot
pub const MAGIC: u16 = 0x01F0;

/// Size of the payload field in bytes
pub const PAYLOAD_SIZE: usize = 32;

/// Default strands tag when no checksum is requested
pub const DEFAULT_STRANDS_TAG: u64 = 0xDEAD_BEEF;

pub(crate) const MAGIC_OFFSET: usize = 0;
pub(crate) const SEQUENCE_STAMP_OFFSET: usize = 2;
pub(crate) const GEO_HASH_OFFSET: usize = 10;
pub(crate) const SCHEMA_OFFSET: usize = 18;
pub(crate) const HARMONY_SCORE_OFFSET: usize = 20;
pub(crate) const FLAGS_OFFSET: usize = 22;
pub(crate) const PAYLOAD_OFFSET: usize = 24;
pub(crate) const STRANDS_OFFSET: usize = 56;

// Every field must tile the record exactly.
const _: () = assert!(STRANDS_OFFSET + 8 == ATOM_SIZE);
const _: () = assert!(PAYLOAD_OFFSET + PAYLOAD_SIZE == STRANDS_OFFSET);

// =============================================================================
// Strands Policy
// =============================================================================

/// What the engine stores in the trailing strands field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrandsPolicy {
    /// Opaque tag; callers may override it per write
    Tag(u64),

    /// CRC32 of bytes `[0, 56)`, verified on every read
    Crc32,
}

impl Default for StrandsPolicy {
    fn default() -> Self {
        StrandsPolicy::Tag(DEFAULT_STRANDS_TAG)
    }
}

/// CRC32 over everything that precedes the strands field
pub fn checksum(slot: &[u8; ATOM_SIZE]) -> u64 {
    crc32fast::hash(&slot[..STRANDS_OFFSET]) as u64
}

// =============================================================================
// Field Access Helpers
// =============================================================================

#[inline]
pub(crate) fn get_u16(slot: &[u8], offset: usize) -> u16 {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(&slot[offset..offset + 2]);
    u16::from_le_bytes(buf)
}

#[inline]
pub(crate) fn get_u64(slot: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&slot[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

#[inline]
pub(crate) fn put_u16(slot: &mut [u8], offset: usize, value: u16) {
    slot[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn put_u64(slot: &mut [u8], offset: usize, value: u64) {
    slot[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}
