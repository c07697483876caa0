//! Error types for arena operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Everything that can go wrong while opening or allocating from an arena.
///
/// Teardown never produces one of these: `close` and `Drop` swallow OS
/// failures after logging them.
#[derive(Error, Debug)]
pub enum ArenaError {
  /// Creating, sizing or mapping the backing file failed.
  #[error("failed to set up arena backing file {path}: {source}")]
  Resource {
    /// The backing path that was being set up.
    path: PathBuf,
    /// The OS error, carrying the raw error code.
    #[source]
    source: io::Error,
  },

  /// The rounded request does not fit in the remaining capacity.
  #[error("arena capacity exhausted: requested {requested} bytes with {used} of {capacity} bytes used")]
  CapacityExhausted {
    /// Requested size after rounding to the arena alignment.
    requested: usize,
    /// Bytes already handed out.
    used: usize,
    /// Total capacity of the arena.
    capacity: usize,
  },

  /// The arena has no live mapping.
  #[error("arena is not open")]
  Closed,

  /// The type needs a stricter alignment than the arena provides.
  #[error("alignment of {align} bytes exceeds the arena word alignment")]
  OverAligned {
    /// Alignment required by the type.
    align: usize,
  },
}

impl ArenaError {
  pub(crate) fn resource(
    path: impl Into<PathBuf>,
    source: io::Error,
  ) -> Self {
    Self::Resource {
      path: path.into(),
      source,
    }
  }

  /// Raw OS error code behind a [`ArenaError::Resource`] failure.
  pub fn os_code(&self) -> Option<i32> {
    match self {
      Self::Resource { source, .. } => source.raw_os_error(),
      _ => None,
    }
  }
}
