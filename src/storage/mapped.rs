//! Mapped Region
//!
//! Owns the backing file and its read/write memory mapping.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::atom::ATOM_SIZE;
use crate::config::SizePolicy;
use crate::error::{AtomError, Result};

/// File handle plus the mapping over it; dropped together on close
struct Mapping {
    mmap: MmapMut,
    _file: File,
}

/// A fixed-size, directly addressable byte region backed by a file
///
/// The region is either open (mapping alive) or closed. Every accessor on a
/// closed region returns `EngineClosed` instead of touching unmapped memory.
pub struct MappedRegion {
    /// Backing file path
    path: PathBuf,
    /// `None` once closed
    mapping: Option<Mapping>,
    /// Extent length in bytes (fixed at open)
    len: u64,
    /// Whether open_or_create made a new file
    created: bool,
}

impl MappedRegion {
    /// Open `path`, creating it with `size_bytes` if missing
    ///
    /// An existing file is mapped at its on-disk size; a mismatch with
    /// `size_bytes` is logged and accepted.
    pub fn open_or_create(path: &Path, size_bytes: u64) -> Result<Self> {
        Self::open_with_policy(path, size_bytes, SizePolicy::UseExisting)
    }

    /// Open or create with an explicit size policy
    ///
    /// Steps:
    /// 1. Validate `size_bytes` (positive multiple of 64)
    /// 2. Open/create the file read-write
    /// 3. Size a new file, or validate an existing one against `policy`
    /// 4. Map the whole file
    ///
    /// A file created by this call is removed again if steps 3 or 4 fail.
    pub fn open_with_policy(path: &Path, size_bytes: u64, policy: SizePolicy) -> Result<Self> {
        // Step 1: Validate requested size
        check_extent(path, size_bytes)?;

        // Step 2: Open or create
        let created = !path.exists();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| AtomError::storage_init(path, format!("failed to open: {}", e)))?;

        let result = Self::map_file(path, file, size_bytes, policy, created);
        if created && result.is_err() {
            // The handle was consumed by map_file, so the file is already closed here
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(
                    "Failed to remove partially created atom file {}: {}",
                    path.display(),
                    e
                );
            }
        }
        result
    }

    /// Steps 3 and 4 of `open_with_policy`; drops `file` on failure
    fn map_file(
        path: &Path,
        file: File,
        size_bytes: u64,
        policy: SizePolicy,
        created: bool,
    ) -> Result<Self> {
        // Step 3: Establish the extent
        let len = if created {
            file.set_len(size_bytes).map_err(|e| {
                AtomError::storage_init(
                    path,
                    format!("failed to size file to {} bytes: {}", size_bytes, e),
                )
            })?;
            tracing::info!(
                "Created atom file {} ({} bytes, {} slots)",
                path.display(),
                size_bytes,
                size_bytes / ATOM_SIZE as u64
            );
            size_bytes
        } else {
            let on_disk = file
                .metadata()
                .map_err(|e| AtomError::storage_init(path, format!("failed to stat: {}", e)))?
                .len();

            check_extent(path, on_disk)?;

            if on_disk != size_bytes {
                match policy {
                    SizePolicy::Exact => {
                        return Err(AtomError::storage_init(
                            path,
                            format!(
                                "existing size {} does not match requested size {}",
                                on_disk, size_bytes
                            ),
                        ));
                    }
                    SizePolicy::UseExisting => {
                        tracing::warn!(
                            "Atom file {} is {} bytes, requested {}; using on-disk size",
                            path.display(),
                            on_disk,
                            size_bytes
                        );
                    }
                }
            }
            tracing::info!("Opened atom file {} ({} bytes)", path.display(), on_disk);
            on_disk
        };

        if usize::try_from(len).is_err() {
            return Err(AtomError::storage_init(
                path,
                format!("extent of {} bytes does not fit in the address space", len),
            ));
        }

        // Step 4: Map
        // SAFETY: MmapMut::map_mut is unsafe because the file could be modified
        // externally while mapped. This is acceptable because:
        // 1. The region owns the only handle this process opens on the file
        // 2. One engine per backing file is a documented requirement
        // 3. The mapping is dropped before (or with) the file handle on close
        // 4. All access goes through byte_range()/byte_range_mut(), which
        //    refuse to hand out slices once the region is closed
        let mmap = unsafe { MmapMut::map_mut(&file) }
            .map_err(|e| AtomError::storage_init(path, format!("failed to mmap: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            mapping: Some(Mapping { mmap, _file: file }),
            len,
            created,
        })
    }

    /// Full mapped extent, read-only
    pub fn byte_range(&self) -> Result<&[u8]> {
        self.mapping
            .as_ref()
            .map(|m| &m.mmap[..])
            .ok_or(AtomError::EngineClosed)
    }

    /// Full mapped extent, writable
    pub fn byte_range_mut(&mut self) -> Result<&mut [u8]> {
        self.mapping
            .as_mut()
            .map(|m| &mut m.mmap[..])
            .ok_or(AtomError::EngineClosed)
    }

    /// Best-effort msync of dirty pages
    pub fn flush(&self) -> Result<()> {
        let mapping = self.mapping.as_ref().ok_or(AtomError::EngineClosed)?;
        mapping.mmap.flush()?;
        Ok(())
    }

    /// Release the mapping and the file handle
    ///
    /// Idempotent: closing an already-closed region is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(mapping) = self.mapping.take() else {
            return Ok(());
        };

        let flushed = mapping.mmap.flush();
        drop(mapping);

        tracing::info!("Closed atom file {}", self.path.display());
        flushed.map_err(AtomError::from)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Extent length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.mapping.is_none()
    }

    /// True if this open created the backing file
    pub fn was_created(&self) -> bool {
        self.created
    }
}

/// Check that `size_bytes` is a usable extent size for `path`
///
/// The size must be positive and a whole number of atoms.
pub fn check_extent(path: &Path, size_bytes: u64) -> Result<()> {
    if size_bytes == 0 {
        return Err(AtomError::storage_init(path, "extent size must be positive"));
    }
    if size_bytes % ATOM_SIZE as u64 != 0 {
        return Err(AtomError::storage_init(
            path,
            format!(
                "extent size {} is not a multiple of atom size {}",
                size_bytes, ATOM_SIZE
            ),
        ));
    }
    Ok(())
}
