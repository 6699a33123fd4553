//! # freelist - A Free-List Memory Allocator
//!
//! This crate provides a **free-list allocator** that manages memory obtained
//! from the `sbrk` system call (or any other [`HeapGrower`]), reusing freed
//! blocks under a selectable fit policy.
//!
//! ## Overview
//!
//! Every allocation is a block: a fixed-size header followed by the payload.
//! All blocks, free or not, form one doubly linked list in address order:
//!
//! ```text
//!   Heap Layout:
//!
//!   root
//!    │
//!    ▼
//!   ┌────────┬──────────┬────────┬──────────────┬────────┬──────┐
//!   │ header │ payload  │ header │   payload    │ header │ pay- │ ← Program
//!   │ used   │          │ free   │              │ used   │ load │    Break
//!   └────────┴──────────┴────────┴──────────────┴────────┴──────┘
//!       │  ▲               │  ▲                    │
//!       └──┼── next ───────┘  └────── prev ────────┘
//!          └──── prev ─────┘
//! ```
//!
//! An allocation walks the list looking for a free block that is large
//! enough. If one is found and it is much larger than needed, it is **split**:
//!
//! ```text
//!   Split (request = 12 bytes):
//!
//!   before  ┌────────┬───────────────────────────────────┐
//!           │ free   │            1000 bytes             │
//!           └────────┴───────────────────────────────────┘
//!   after   ┌────────┬────┬────────┬─────────────────────┐
//!           │ used   │ 12 │ free   │ 1000 - 12 - header  │
//!           └────────┴────┴────────┴─────────────────────┘
//! ```
//!
//! If nothing fits, the heap **grows** by exactly one block at the tail.
//! Freeing a block **coalesces** it with free neighbors on either side:
//!
//! ```text
//!   Coalesce (free B, then A):
//!
//!   ┌───┬─────┬───┬─────┬───┬─────┐       ┌───┬───────────────┬───┬─────┐
//!   │ A │used │ B │free │ C │used │  ──►  │ A │ free (A+B+hdr)│ C │used │
//!   └───┴─────┴───┴─────┴───┴─────┘       └───┴───────────────┴───┴─────┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   freelist
//!   ├── align      - Alignment quantum and the align! macro
//!   ├── block      - Block header layout (internal) and BlockInfo snapshots
//!   ├── config     - Fit policy and reporting knobs, environment overrides
//!   ├── error      - AllocError and ParseFitError
//!   ├── fit        - First/best/worst/next fit block search
//!   ├── global     - Process-wide locked heap: malloc, calloc, realloc, free
//!   ├── grower     - HeapGrower trait, Sbrk and Arena growers
//!   ├── heap       - Heap: allocate, split, grow, coalesce
//!   └── stats      - Counters and the statistics report
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use freelist::{Arena, Fit, Heap};
//!
//! let mut heap = Heap::new(Arena::new(4096), Fit::Best);
//!
//! let ptr = heap.allocate(100);
//! assert!(!ptr.is_null());
//!
//! unsafe {
//!     ptr.write(42);
//!     heap.deallocate(ptr);
//! }
//!
//! // The freed block is reused instead of growing the heap.
//! let again = heap.allocate(100);
//! assert_eq!(again, ptr);
//! assert_eq!(heap.stats().reuses, 1);
//! assert_eq!(heap.stats().grows, 1);
//! ```
//!
//! The process-wide heap lives in [`global`]:
//!
//! ```rust,ignore
//! let ptr = freelist::global::malloc(64);
//! unsafe { freelist::global::free(ptr) };
//! ```
//!
//! ## Limitations
//!
//! - **Small alignment only**: payloads are aligned to 4 bytes
//! - **Memory is never returned**: the break only moves up
//! - **Unsynchronized heaps**: a [`Heap`] is single-threaded; only the
//!   [`global`] instance is locked
//! - **Unix-only**: [`Sbrk`] requires `libc` and `sbrk` (POSIX systems)
//!
//! ## Safety
//!
//! Freeing or resizing takes raw pointers and is `unsafe`: the pointer must
//! come from the same heap. Freeing a block twice panics.

pub mod align;
mod block;
pub mod config;
pub mod error;
pub mod fit;
pub mod global;
pub mod grower;
pub mod heap;
pub mod stats;

pub use block::{BlockInfo, HEADER_SIZE};
pub use config::Config;
pub use error::{AllocError, ParseFitError};
pub use fit::Fit;
pub use grower::{Arena, HeapGrower, Sbrk};
pub use heap::{Blocks, Heap};
pub use stats::Stats;
