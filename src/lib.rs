//! # mmf_arena - A Memory-Mapped File Arena
//!
//! This crate provides a **bump allocator** (also known as an arena allocator)
//! whose storage is a memory-mapped file instead of the process heap.
//!
//! ## Overview
//!
//! The arena maps one fixed-size backing file and hands out consecutive,
//! word-aligned slices of it:
//!
//! ```text
//!   Arena Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                     MAPPED BACKING FILE                              │
//!   │                                                                      │
//!   │   ┌─────┬─────┬─────┬─────┬───────────────────────────────────────┐  │
//!   │   │ A1  │ A2  │ A3  │ A4  │            Free Space                 │  │
//!   │   └─────┴─────┴─────┴─────┴───────────────────────────────────────┘  │
//!   │   ▲                       ▲                                       ▲  │
//!   │   │                       │                                       │  │
//!   │  base                   used                                capacity │
//!   │                       (next alloc)                                   │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Each allocation "bumps" `used` forward.
//!   Fast allocation: O(1) - just move the cursor.
//!   Nothing is freed individually; closing the arena reclaims everything.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   mmf_arena
//!   ├── align      - Alignment macros (align!, align_to!) and page size
//!   ├── arena      - MmfArena implementation
//!   ├── error      - ArenaError
//!   └── mapping    - Owned file + mmap region (internal)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mmf_arena::MmfArena;
//!
//! fn main() -> mmf_arena::Result<()> {
//!     let mut arena = MmfArena::new("arena.dat", 1024 * 1024);
//!     arena.open()?;
//!
//!     // Place a value in the mapped file
//!     let ptr = arena.place(42u64)?;
//!     println!("Value: {}", unsafe { ptr.read() });
//!
//!     // Unmaps and deletes arena.dat
//!     arena.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//!                 open() (fallible)
//!   ┌────────┐ ─────────────────────────▶ ┌────────┐
//!   │ closed │                            │  open  │ ◀─┐ open(), allocate()
//!   └────────┘ ◀───────────────────────── └────────┘ ──┘
//!     │    ▲    close() / drop / take()
//!     └────┘
//!    close()
//! ```
//!
//! Opening removes any stale file at the path, creates a fresh one with
//! mode `0600`, extends it to the capacity and maps it with
//! `MAP_SHARED | PROT_READ | PROT_WRITE`. Closing unmaps, closes the
//! descriptor and deletes the file. Teardown is best-effort and never fails.
//!
//! ## Features
//!
//! - **Page-sized capacity**: requested sizes are rounded up to the OS page
//! - **Word alignment**: every region starts on a pointer-size boundary
//! - **Move-only ownership**: exactly one arena owns a given mapping
//! - **Guaranteed cleanup**: `Drop` unmaps and deletes the backing file
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **No deallocation**: Regions live until the arena is closed
//! - **No over-aligned types**: alignment never exceeds a machine word
//! - **Unix-only**: Requires `libc` and `mmap` (POSIX systems)
//!
//! ## Safety
//!
//! The arena hands out raw, uninitialized memory. Writing a value before
//! reading it, and not touching a region after the arena is closed, are the
//! caller's responsibility.

pub mod align;
mod arena;
mod error;
mod mapping;

pub use arena::MmfArena;
pub use error::{ArenaError, Result};
