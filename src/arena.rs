use std::fs::{self, File};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};
use std::{fmt, io, mem};

use tracing::{debug, trace, warn};

use crate::align::{ALIGNMENT, checked_align_to, page_size};
use crate::error::{ArenaError, Result};
use crate::mapping::Mapping;

/// Permissions of the backing file: owner read/write only.
const BACKING_FILE_MODE: u32 = 0o600;

/// A bump allocator over a memory-mapped backing file.
///
/// The arena is either closed (no file, no mapping) or open (a file of
/// exactly [`capacity`](Self::capacity) bytes mapped shared and read-write).
/// Allocation only moves a cursor forward; everything is reclaimed at once
/// by [`close`](Self::close), which also deletes the backing file.
///
/// `MmfArena` is neither `Clone` nor `Copy`. A plain Rust move hands the
/// mapping to the new binding; [`take`](Self::take) and
/// [`transfer_from`](Self::transfer_from) do the same between two places
/// that both stay alive.
#[derive(Default)]
pub struct MmfArena {
  path: PathBuf,
  capacity: usize,
  used: usize,
  mapping: Option<Mapping>,
}

impl MmfArena {
  /// Configures an arena backed by `path` with room for at least
  /// `requested_size` bytes.
  ///
  /// Nothing touches the filesystem until [`open`](Self::open). Relative
  /// paths are resolved against the current directory now, and the size is
  /// rounded up to a whole number of pages.
  pub fn new(
    path: impl AsRef<Path>,
    requested_size: usize,
  ) -> Self {
    let path = path.as_ref();
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let page = page_size();
    let capacity = checked_align_to(requested_size, page).unwrap_or(usize::MAX & !(page - 1));

    Self {
      path,
      capacity,
      used: 0,
      mapping: None,
    }
  }

  /// Creates the backing file and maps it. Does nothing if already open.
  ///
  /// Any file already sitting at the path is removed first. On failure the
  /// arena stays closed and no partially created file is left behind.
  pub fn open(&mut self) -> Result<()> {
    if self.is_open() {
      return Ok(());
    }

    self.remove_file();

    let file = File::options()
      .read(true)
      .write(true)
      .create_new(true)
      .mode(BACKING_FILE_MODE)
      .open(&self.path)
      .map_err(|e| ArenaError::resource(&self.path, e))?;

    let mapping = match map_file(file, self.capacity) {
      Ok(mapping) => mapping,
      Err(e) => {
        self.remove_file();
        return Err(ArenaError::resource(&self.path, e));
      }
    };

    debug!(
      path = %self.path.display(),
      capacity = self.capacity,
      base = ?mapping.base(),
      "arena opened"
    );

    self.used = 0;
    self.mapping = Some(mapping);

    Ok(())
  }

  /// Hands out `size` bytes, rounded up to [`ALIGNMENT`].
  ///
  /// The returned bytes are uninitialized and stay valid until the arena is
  /// closed. On failure nothing changes.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    let Some(mapping) = &self.mapping else {
      return Err(ArenaError::Closed);
    };

    let rounded = checked_align_to(size, ALIGNMENT);
    let end = rounded
      .and_then(|rounded| self.used.checked_add(rounded))
      .filter(|end| *end <= self.capacity);

    let Some(end) = end else {
      return Err(ArenaError::CapacityExhausted {
        requested: rounded.unwrap_or(size),
        used: self.used,
        capacity: self.capacity,
      });
    };

    // `used <= capacity == mapping.len()`, so the offset stays in bounds.
    debug_assert_eq!(self.capacity, mapping.len());
    let addr = unsafe { mapping.base().add(self.used) };

    trace!(size, offset = self.used, "arena allocation");

    self.used = end;

    Ok(addr)
  }

  /// Moves `value` into a fresh region of the arena.
  ///
  /// The arena never drops what it holds: a value owning other resources
  /// leaks them unless the caller drops it in place.
  pub fn place<T>(
    &mut self,
    value: T,
  ) -> Result<NonNull<T>> {
    let align = mem::align_of::<T>();

    if align > ALIGNMENT {
      return Err(ArenaError::OverAligned { align });
    }

    let addr = self.allocate(mem::size_of::<T>())?.cast::<T>();

    unsafe { addr.as_ptr().write(value) };

    Ok(addr)
  }

  /// Copies `bytes` into a fresh region of the arena.
  pub fn alloc_bytes(
    &mut self,
    bytes: &[u8],
  ) -> Result<NonNull<[u8]>> {
    let addr = self.allocate(bytes.len())?;

    unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), addr.as_ptr(), bytes.len()) };

    Ok(NonNull::slice_from_raw_parts(addr, bytes.len()))
  }

  /// Syncs the mapped contents to the backing file.
  pub fn flush(&self) -> Result<()> {
    let mapping = self.mapping.as_ref().ok_or(ArenaError::Closed)?;

    mapping.flush().map_err(|e| ArenaError::resource(&self.path, e))
  }

  /// Unmaps the region, closes the file and deletes it. Does nothing if
  /// already closed; failures are logged, never returned.
  pub fn close(&mut self) {
    let Some(mapping) = self.release() else {
      return;
    };

    drop(mapping);
    self.remove_file();

    debug!(path = %self.path.display(), used = self.used, "arena closed");
  }

  /// Detaches the live mapping without tearing it down.
  fn release(&mut self) -> Option<Mapping> {
    self.mapping.take()
  }

  /// Takes over everything `source` owns, closing whatever `self` held
  /// first. `source` is left closed and empty, so dropping it is a no-op.
  pub fn transfer_from(
    &mut self,
    source: &mut MmfArena,
  ) {
    self.close();

    self.path = mem::take(&mut source.path);
    self.capacity = mem::take(&mut source.capacity);
    self.used = mem::take(&mut source.used);
    self.mapping = source.release();

    debug!(path = %self.path.display(), open = self.is_open(), "arena ownership transferred");
  }

  /// Moves the arena out of `self`, leaving an empty, closed arena behind.
  pub fn take(&mut self) -> MmfArena {
    let mut arena = MmfArena::default();
    arena.transfer_from(self);
    arena
  }

  /// Whether the arena currently owns a live mapping.
  pub fn is_open(&self) -> bool {
    self.mapping.is_some()
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn used(&self) -> usize {
    self.used
  }

  pub fn remaining(&self) -> usize {
    self.capacity - self.used
  }

  /// Start of the mapping, if open.
  pub fn as_ptr(&self) -> Option<NonNull<u8>> {
    self.mapping.as_ref().map(Mapping::base)
  }

  fn remove_file(&self) {
    match fs::remove_file(&self.path) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove backing file"),
    }
  }
}

fn map_file(
  file: File,
  len: usize,
) -> io::Result<Mapping> {
  file.set_len(len as u64)?;
  Mapping::new(file, len)
}

impl Drop for MmfArena {
  fn drop(&mut self) {
    self.close();
  }
}

impl fmt::Debug for MmfArena {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("MmfArena")
      .field("path", &self.path)
      .field("capacity", &self.capacity)
      .field("used", &self.used)
      .field("base", &self.as_ptr())
      .finish()
  }
}
