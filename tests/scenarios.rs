/*
 * scenarios.rs
 *
 * allocator behaviour through the public API, each case on its own
 * arena-backed heap so nothing touches the real program break.
 */

use std::{ptr, slice};

use freelist::{Arena, BlockInfo, Fit, HEADER_SIZE, Heap};

fn heap(fit: Fit) -> Heap<Arena> {
  Heap::new(Arena::new(1 << 16), fit)
}

fn blocks(heap: &Heap<Arena>) -> Vec<BlockInfo> {
  heap.blocks().collect()
}

/* ============================================================================
 * Reuse, split, coalesce
 * ============================================================================ */

#[test]
fn freed_block_is_reused_under_every_fit() {
  for fit in Fit::ALL {
    let mut heap = heap(fit);

    let first = heap.allocate(100);
    unsafe { heap.deallocate(first) };
    let grows = heap.stats().grows;

    let second = heap.allocate(100);
    assert_eq!(second, first, "{fit}");
    assert_eq!(heap.stats().reuses, 1, "{fit}");
    assert_eq!(heap.stats().grows, grows, "{fit}");
  }
}

#[test]
fn three_blocks_coalesce_into_one() {
  let mut heap = heap(Fit::First);

  let a = heap.allocate(48);
  let b = heap.allocate(48);
  let c = heap.allocate(48);

  unsafe {
    heap.deallocate(b);
    heap.deallocate(a);
  }

  let after_two = blocks(&heap);
  assert_eq!(after_two.len(), 2);
  assert_eq!(after_two[0].payload, a as usize);
  assert_eq!(after_two[0].size, 48 + HEADER_SIZE + 48);
  assert!(after_two[0].is_free);
  assert_eq!(after_two[1].payload, c as usize);
  assert!(!after_two[1].is_free);

  unsafe { heap.deallocate(c) };

  let after_three = blocks(&heap);
  assert_eq!(after_three.len(), 1);
  assert_eq!(after_three[0].size, 3 * 48 + 2 * HEADER_SIZE);
  assert!(after_three[0].is_free);
  assert_eq!(heap.stats().coalesces, 2);
  assert_eq!(heap.stats().blocks, 1);
}

#[test]
fn split_leaves_aligned_remainder() {
  let mut heap = heap(Fit::First);

  let big = heap.allocate(1000);
  unsafe { heap.deallocate(big) };
  let small = heap.allocate(10);

  let list = blocks(&heap);
  assert_eq!(small, big);
  assert_eq!(list.len(), 2);
  assert_eq!(list[0].size, 12);
  assert_eq!(list[1].size, 1000 - 12 - HEADER_SIZE);
  assert!(list[1].is_free);
  assert_eq!(list[1].address, list[0].end());
  assert_eq!(heap.stats().splits, 1);
}

#[test]
fn remainder_is_reused_before_growth() {
  let mut heap = heap(Fit::First);

  let big = heap.allocate(400);
  unsafe { heap.deallocate(big) };

  let first = heap.allocate(100);
  let second = heap.allocate(100);

  assert_eq!(first, big);
  assert_eq!(second as usize, first as usize + 100 + HEADER_SIZE);
  assert_eq!(heap.stats().grows, 1);
  assert_eq!(heap.stats().splits, 2);
}

/* ============================================================================
 * Fit policies
 * ============================================================================ */

/// Frees holes of 40, 200 and 80 bytes separated by live fences and returns
/// their payload addresses.
fn holes(heap: &mut Heap<Arena>) -> [*mut u8; 3] {
  let sizes = [40, 200, 80];
  let mut holes = [ptr::null_mut(); 3];

  for (slot, size) in holes.iter_mut().zip(sizes) {
    *slot = heap.allocate(size);
    heap.allocate(4);
  }
  for hole in holes {
    unsafe { heap.deallocate(hole) };
  }

  holes
}

#[test]
fn each_fit_picks_its_hole() {
  let cases = [(Fit::First, 0), (Fit::Best, 0), (Fit::Worst, 1), (Fit::Next, 0)];

  for (fit, expected) in cases {
    let mut heap = heap(fit);
    let holes = holes(&mut heap);
    assert_eq!(heap.allocate(32), holes[expected], "{fit}");
  }

  let mut heap = heap(Fit::Best);
  let holes = holes(&mut heap);
  assert_eq!(heap.allocate(60), holes[2]);
}

#[test]
fn next_fit_walks_forward() {
  let mut heap = heap(Fit::Next);
  let holes = holes(&mut heap);

  assert_eq!(heap.allocate(36), holes[0]);
  assert_eq!(heap.allocate(36), holes[1]);

  // The 200-byte hole was split; the scan resumes at its remainder.
  let remainder = heap.allocate(36);
  assert_eq!(remainder as usize, holes[1] as usize + 36 + HEADER_SIZE);
  assert_eq!(heap.stats().grows, 6);
}

/* ============================================================================
 * Failure paths
 * ============================================================================ */

#[test]
fn out_of_memory_returns_null_and_keeps_metadata() {
  let mut heap = Heap::new(Arena::new(512), Fit::First);

  let ptr = heap.allocate(200);
  assert!(!ptr.is_null());
  let before = blocks(&heap);
  let stats = heap.stats();

  for size in [400, 4096, usize::MAX / 2] {
    assert!(heap.allocate(size).is_null());
  }

  assert_eq!(blocks(&heap), before);
  assert_eq!(heap.stats(), stats);
  assert!(!heap.allocate(16).is_null());
}

#[test]
fn realloc_preserves_prefix() {
  let mut heap = heap(Fit::Worst);

  unsafe {
    let ptr = heap.allocate(20);
    let pattern: Vec<u8> = (0..20).map(|i| i * 7).collect();
    ptr::copy_nonoverlapping(pattern.as_ptr(), ptr, pattern.len());
    heap.allocate(4);

    let grown = heap.reallocate(ptr, 300);
    assert_ne!(grown, ptr);
    assert_eq!(slice::from_raw_parts(grown, 20), pattern.as_slice());
  }
}

#[test]
fn zero_allocate_clears_reused_memory() {
  let mut heap = heap(Fit::First);

  unsafe {
    let dirty = heap.allocate(128);
    ptr::write_bytes(dirty, 0xFF, 128);
    heap.deallocate(dirty);

    let zeroed = heap.zero_allocate(10, 10);
    assert_eq!(zeroed, dirty);
    assert!(slice::from_raw_parts(zeroed, heap.usable_size(zeroed)).iter().all(|&b| b == 0));
  }
}
