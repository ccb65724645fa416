//! # atomstore
//!
//! A fixed-record, memory-mapped storage engine:
//! - A backing file mapped straight into the address space
//! - 64-byte atoms read and written in place, no parse/copy step
//! - A pluggable admission filter gating every write
//! - Bad magic (or a failed checksum) reads as an empty slot, never an error
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 SharedAtomEngine (optional)                  │
//! │              (Single Writer / Multi Reader)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       AtomEngine                             │
//! │        bounds → admission → encode at index * 64             │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │ AdmissionFilter │                │  MappedRegion   │
//!   │   (harmony)     │                │   (memmap2)     │
//!   └─────────────────┘                └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use atomstore::AtomEngine;
//! use std::path::Path;
//!
//! let mut engine = AtomEngine::open_path(Path::new("atoms.zpa"), 1)?;
//! assert!(engine.write_atom(0, b"Lichen Universe Semantic Payload V3", 0x01)?);
//! let atom = engine.read_atom(0)?.expect("slot 0 was written");
//! assert_eq!(atom.payload(), &b"Lichen Universe Semantic Payload V3"[..32]);
//! engine.close()?;
//! # Ok::<(), atomstore::AtomError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod atom;
pub mod admission;
pub mod storage;
pub mod engine;
pub mod shared;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use admission::{AcceptAll, AdmissionFilter, HarmonyFilter};
pub use atom::{Atom, AtomView, StrandsPolicy, WriteOptions};
pub use config::{Config, ExtentSize, SizePolicy};
pub use engine::AtomEngine;
pub use error::{AtomError, Result};
pub use shared::SharedAtomEngine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of atomstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
