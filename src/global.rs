//! The process-wide heap.
//!
//! One [`Heap<Sbrk>`] behind a mutex. The lock is held for the whole of each
//! operation, so locate, split, grow and mark (or mark-free and coalesce)
//! never interleave between callers of this module. It does not cover other
//! users of the program break, such as the system allocator on another
//! thread; a growth of theirs between measuring and extending the break
//! trips the "program break moved" panic. The heap is configured from the
//! environment on first use (see [`Config::from_env`]).
//!
//! The exit statistics report is off by default: set `FREELIST_STATS=1` or
//! call [`register_exit_report`].

use std::{io::Write, sync::Once};

use log::{debug, warn};
use parking_lot::{Mutex, const_mutex};

use crate::{config::Config, grower::Sbrk, heap::Heap, stats::Stats};

static HEAP: Mutex<Option<Heap<Sbrk>>> = const_mutex(None);
static REPORT: Once = Once::new();

fn with_heap<R>(f: impl FnOnce(&mut Heap<Sbrk>) -> R) -> R {
  let mut guard = HEAP.lock();
  let heap = guard.get_or_insert_with(|| {
    let config = Config::from_env();
    if config.report_on_exit {
      register_exit_report();
    }
    Heap::with_config(Sbrk, &config)
  });
  f(heap)
}

/// Allocates `size` bytes from the process heap. Null on zero size or when
/// the break cannot be extended.
pub fn malloc(size: usize) -> *mut u8 {
  with_heap(|heap| heap.allocate(size))
}

/// Allocates `count * size` zeroed bytes. Null on overflow.
pub fn calloc(
  count: usize,
  size: usize,
) -> *mut u8 {
  with_heap(|heap| heap.zero_allocate(count, size))
}

/// # Safety
///
/// `ptr` must be null or a live pointer returned by this module.
pub unsafe fn realloc(
  ptr: *mut u8,
  size: usize,
) -> *mut u8 {
  with_heap(|heap| unsafe { heap.reallocate(ptr, size) })
}

/// # Safety
///
/// `ptr` must be null or a live pointer returned by this module.
pub unsafe fn free(ptr: *mut u8) {
  with_heap(|heap| unsafe { heap.deallocate(ptr) })
}

/// Counters of the process heap; all zero before first use.
pub fn statistics() -> Stats {
  HEAP
    .lock()
    .as_ref()
    .map(Heap::stats)
    .unwrap_or_default()
}

/// Prints [`statistics`] to stdout at normal process exit. Only the first
/// call registers the handler.
pub fn register_exit_report() {
  REPORT.call_once(|| {
    // SAFETY: print_report is a plain extern "C" fn with no arguments.
    if unsafe { libc::atexit(print_report) } == 0 {
      debug!("registered heap statistics report");
    } else {
      warn!("could not register heap statistics report");
    }
  });
}

extern "C" fn print_report() {
  // Skip the report rather than deadlock if exit raced a heap operation.
  let Some(guard) = HEAP.try_lock() else {
    return;
  };
  let stats = guard.as_ref().map(Heap::stats).unwrap_or_default();
  drop(guard);

  let _ = write!(std::io::stdout().lock(), "\n{stats}");
}
