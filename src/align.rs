use std::mem;

/// Alignment of every region handed out by the arena: one machine word.
pub const ALIGNMENT: usize = mem::size_of::<usize>();

/// Page size assumed when the OS refuses to report one.
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// Calculates the machine word alignment for the given size.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use mmf_arena::align;
///
/// match mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, ::core::mem::size_of::<usize>())
  };
}

/// Rounds `value` up to a multiple of `align`, which must be a power of two.
///
/// ```rust
/// use mmf_arena::align_to;
///
/// assert_eq!(align_to!(100, 4096), 4096);
/// assert_eq!(align_to!(8192, 4096), 8192);
/// assert_eq!(align_to!(0, 4096), 0);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Overflow-checked form of [`align_to!`].
pub fn checked_align_to(
  value: usize,
  align: usize,
) -> Option<usize> {
  debug_assert!(align.is_power_of_two());
  value.checked_add(align - 1).map(|v| v & !(align - 1))
}

/// Returns the OS page size.
pub fn page_size() -> usize {
  let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

  if size <= 0 {
    return FALLBACK_PAGE_SIZE;
  }

  size as usize
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align() {
    let ptr_size = mem::size_of::<usize>();

    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ptr_size * i + 1)..=(ptr_size * (i + 1));

      let expected_alignment = ptr_size * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
      }
    }

    assert_eq!(0, align!(0usize));
  }

  #[test]
  fn test_align_to_page() {
    let page = page_size();

    assert_eq!(page, align_to!(1, page));
    assert_eq!(page, align_to!(100, page));
    assert_eq!(page, align_to!(page, page));
    assert_eq!(2 * page, align_to!(page + 1, page));
  }

  #[test]
  fn test_checked_align_to() {
    assert_eq!(Some(16), checked_align_to(10, 8));
    assert_eq!(Some(0), checked_align_to(0, ALIGNMENT));
    assert_eq!(None, checked_align_to(usize::MAX, ALIGNMENT));
  }

  #[test]
  fn test_page_size_is_power_of_two() {
    let page = page_size();

    assert!(page.is_power_of_two());
    assert!(page >= ALIGNMENT);
  }
}
