use std::fs::File;
use std::os::fd::AsRawFd;
use std::{io, ptr::NonNull};

use libc::{MAP_FAILED, MAP_SHARED, MS_SYNC, PROT_READ, PROT_WRITE, c_void, mmap, msync, munmap};
use tracing::warn;

/// A shared, read-write mapping of a whole backing file.
///
/// Owns both the file handle and the mapped range. Dropping it unmaps the
/// range and closes the handle; neither step can fail observably.
pub(crate) struct Mapping {
  file: File,
  base: NonNull<u8>,
  len: usize,
}

impl Mapping {
  /// Maps the first `len` bytes of `file`. The file must already be at
  /// least `len` bytes long.
  pub fn new(
    file: File,
    len: usize,
  ) -> io::Result<Self> {
    let addr = unsafe {
      mmap(
        std::ptr::null_mut(),
        len,
        PROT_READ | PROT_WRITE,
        MAP_SHARED,
        file.as_raw_fd(),
        0,
      )
    };

    if addr == MAP_FAILED {
      return Err(io::Error::last_os_error());
    }

    let base = NonNull::new(addr as *mut u8)
      .ok_or_else(|| io::Error::other("mmap returned a null address"))?;

    Ok(Self { file, base, len })
  }

  pub fn base(&self) -> NonNull<u8> {
    self.base
  }

  pub fn len(&self) -> usize {
    self.len
  }

  /// Writes dirty pages back to the file and syncs its data.
  pub fn flush(&self) -> io::Result<()> {
    let rc = unsafe { msync(self.base.as_ptr() as *mut c_void, self.len, MS_SYNC) };

    if rc != 0 {
      return Err(io::Error::last_os_error());
    }

    self.file.sync_data()
  }
}

impl Drop for Mapping {
  fn drop(&mut self) {
    let rc = unsafe { munmap(self.base.as_ptr() as *mut c_void, self.len) };

    if rc != 0 {
      warn!(
        base = ?self.base,
        len = self.len,
        error = %io::Error::last_os_error(),
        "munmap failed, leaking mapping"
      );
    }
    // `file` closes itself after this.
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::align::page_size;
  use tempfile::tempdir;

  #[test]
  fn test_mapping_is_shared_with_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping.dat");
    let len = page_size();

    let file = File::options()
      .read(true)
      .write(true)
      .create_new(true)
      .open(&path)
      .unwrap();
    file.set_len(len as u64).unwrap();

    let mapping = Mapping::new(file, len).unwrap();
    assert_eq!(len, mapping.len());
    assert_eq!(len as u64, std::fs::metadata(&path).unwrap().len());

    unsafe {
      let bytes = std::slice::from_raw_parts_mut(mapping.base().as_ptr(), len);
      bytes[..5].copy_from_slice(b"hello");
    }
    mapping.flush().unwrap();
    drop(mapping);

    let contents = std::fs::read(&path).unwrap();
    assert_eq!(b"hello", &contents[..5]);
    assert_eq!(len, contents.len());
  }

  #[test]
  fn test_zero_length_mapping_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.dat");

    let file = File::options()
      .read(true)
      .write(true)
      .create_new(true)
      .open(&path)
      .unwrap();

    let err = Mapping::new(file, 0).err().unwrap();
    assert_eq!(Some(libc::EINVAL), err.raw_os_error());
  }
}
