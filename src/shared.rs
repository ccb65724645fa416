//! Shared Engine
//!
//! Cloneable, thread-safe handle around an [`AtomEngine`].
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
//!
//! - **Writes** (`write_atom`, `close`): exclusive latch, one at a time
//! - **Reads** (`read_atom`): shared latch, many concurrent readers
//!
//! A reader therefore never observes a half-written atom. Reads return an
//! owned [`Atom`] copied out while the latch is held, since a borrowed view
//! cannot outlive the guard.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::atom::{Atom, WriteOptions};
use crate::engine::AtomEngine;
use crate::error::Result;

/// Thread-safe handle to an atom engine
#[derive(Clone)]
pub struct SharedAtomEngine {
    inner: Arc<RwLock<AtomEngine>>,
}

impl SharedAtomEngine {
    pub fn new(engine: AtomEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    /// Write under the exclusive latch
    pub fn write_atom(&self, index: i64, payload: &[u8], schema: u16) -> Result<bool> {
        self.inner.write().write_atom(index, payload, schema)
    }

    pub fn write_atom_with(
        &self,
        index: i64,
        payload: &[u8],
        options: WriteOptions,
    ) -> Result<bool> {
        self.inner.write().write_atom_with(index, payload, options)
    }

    /// Read under the shared latch, materializing the atom
    pub fn read_atom(&self, index: i64) -> Result<Option<Atom>> {
        let engine = self.inner.read();
        Ok(engine.read_atom(index)?.map(|view| view.to_atom()))
    }

    pub fn close(&self) -> Result<()> {
        self.inner.write().close()
    }

    pub fn capacity(&self) -> u64 {
        self.inner.read().capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.read().is_closed()
    }
}

impl From<AtomEngine> for SharedAtomEngine {
    fn from(engine: AtomEngine) -> Self {
        Self::new(engine)
    }
}
