//! Storage Module
//!
//! Memory-mapped backing extent for the atom engine.
//!
//! ## Responsibilities
//! - Create the backing file (sparse, zero-filled) or reopen an existing one
//! - Validate the extent size against the 64-byte slot size
//! - Expose the whole mapped range as a byte slice
//! - Tear down the mapping and file handle on close
//!
//! ## File Format
//! ```text
//! ┌──────────────────────┐ offset 0
//! │ Atom 0 (64 bytes)    │
//! ├──────────────────────┤ offset 64
//! │ Atom 1 (64 bytes)    │
//! ├──────────────────────┤
//! │ ...                  │
//! ├──────────────────────┤ offset (capacity - 1) * 64
//! │ Atom N-1 (64 bytes)  │
//! └──────────────────────┘
//! ```
//! No header, no footer.

mod mapped;

pub use mapped::{check_extent, MappedRegion};
