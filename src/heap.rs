use std::{marker::PhantomData, ptr, ptr::NonNull};

use log::{debug, trace, warn};

use crate::{
  align::{ALIGNMENT, checked_align},
  block::{Block, BlockInfo, HEADER_SIZE},
  config::Config,
  error::AllocError,
  fit::{self, Fit},
  grower::HeapGrower,
  stats::Stats,
};

/// A free-list heap over memory obtained from a [`HeapGrower`].
///
/// Every block, free or not, sits in one doubly linked list kept in address
/// order. Requests are served by reusing a free block chosen by the heap's
/// [`Fit`] (splitting off any usable remainder) or by growing the heap by
/// exactly one block. Freed blocks are merged eagerly with free neighbors
/// that are physically contiguous.
///
/// A heap is not synchronized; see [`crate::global`] for the shared instance.
pub struct Heap<G: HeapGrower> {
  grower: G,
  fit: Fit,
  root: *mut Block,
  cursor: *mut Block,
  stats: Stats,
}

// SAFETY: the block pointers refer only to memory obtained from `grower` and
// are never shared outside the heap, so moving the heap moves sole ownership.
unsafe impl<G: HeapGrower + Send> Send for Heap<G> {}

impl<G: HeapGrower> Heap<G> {
  pub const fn new(
    grower: G,
    fit: Fit,
  ) -> Self {
    Self {
      grower,
      fit,
      root: ptr::null_mut(),
      cursor: ptr::null_mut(),
      stats: Stats::new(),
    }
  }

  pub fn with_config(
    grower: G,
    config: &Config,
  ) -> Self {
    Self::new(grower, config.fit)
  }

  pub fn fit(&self) -> Fit {
    self.fit
  }

  pub fn stats(&self) -> Stats {
    self.stats
  }

  pub fn grower(&self) -> &G {
    &self.grower
  }

  /// Header address of the first block ever grown, or null for an empty heap.
  pub fn start(&self) -> *mut u8 {
    self.root as *mut u8
  }

  /// Walks every block in address order.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      current: self.root,
      _heap: PhantomData,
    }
  }

  /// Returns `size` bytes rounded up to the alignment quantum, or null.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> *mut u8 {
    self
      .try_allocate(size)
      .map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  /// Like [`allocate`](Heap::allocate) with the failure reason kept.
  pub fn try_allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    if size == 0 {
      debug!("rejecting zero-byte allocation");
      return Err(AllocError::ZeroSize);
    }

    let size = checked_align(size).ok_or(AllocError::Overflow)?;

    // SAFETY: root and cursor are null or live blocks of this heap.
    let located = unsafe { fit::locate(self.fit, self.root, &mut self.cursor, size) };

    let block = if located.found.is_null() {
      // SAFETY: on a miss `last` is the tail of the list or null.
      unsafe { self.grow(located.last, size)? }
    } else {
      self.stats.reuses += 1;
      trace!("{} fit reuses block {:p} for {size} bytes", self.fit, located.found);
      // SAFETY: `found` is a free block of this heap with size >= `size`.
      unsafe { self.split(located.found, size) };
      located.found
    };

    // SAFETY: `block` is a live header of this heap, so the address right
    // past it is non-null.
    let payload = unsafe {
      (*block).is_free = false;
      NonNull::new_unchecked(Block::payload(block))
    };

    self.stats.requested += size;
    self.stats.mallocs += 1;

    Ok(payload)
  }

  /// Allocates `count * size` zeroed bytes. An overflowing product yields null.
  pub fn zero_allocate(
    &mut self,
    count: usize,
    size: usize,
  ) -> *mut u8 {
    self
      .try_zero_allocate(count, size)
      .map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  pub fn try_zero_allocate(
    &mut self,
    count: usize,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let Some(total) = count.checked_mul(size) else {
      warn!("zeroed allocation of {count} x {size} bytes overflows");
      return Err(AllocError::Overflow);
    };

    let payload = self.try_allocate(total)?;

    // SAFETY: the payload is live and spans the block's whole size.
    unsafe {
      let usable = (*Block::from_payload(payload.as_ptr())).size;
      ptr::write_bytes(payload.as_ptr(), 0, usable);
    }

    Ok(payload)
  }

  /// Resizes the allocation at `ptr`.
  ///
  /// A null `ptr` allocates and a zero `size` frees. Blocks that are already
  /// large enough come back unchanged, without shrinking. Otherwise the
  /// contents move to a new block and the old one is freed; if that
  /// allocation fails the old block is left untouched and null is returned.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a live payload returned by this heap.
  pub unsafe fn reallocate(
    &mut self,
    ptr: *mut u8,
    size: usize,
  ) -> *mut u8 {
    if ptr.is_null() {
      return self.allocate(size);
    }

    if size == 0 {
      unsafe { self.deallocate(ptr) };
      return ptr::null_mut();
    }

    let old_size = unsafe { self.usable_size(ptr) };
    if old_size >= size {
      return ptr;
    }

    let fresh = self.allocate(size);
    if fresh.is_null() {
      return ptr::null_mut();
    }

    unsafe {
      ptr::copy_nonoverlapping(ptr, fresh, old_size);
      self.deallocate(ptr);
    }

    fresh
  }

  /// Returns the block behind `ptr` to the free list and merges it with free
  /// neighbors. Null is ignored.
  ///
  /// # Panics
  ///
  /// Panics when the block is already free: a double free would corrupt the
  /// list for every later allocation.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a payload returned by this heap.
  pub unsafe fn deallocate(
    &mut self,
    ptr: *mut u8,
  ) {
    if ptr.is_null() {
      return;
    }

    unsafe {
      let mut block = Block::from_payload(ptr);
      assert!(!(*block).is_free, "double free of {ptr:p}");
      (*block).is_free = true;

      let prev = (*block).prev;
      if !prev.is_null() && (*prev).is_free && Block::end(prev) == block as *mut u8 {
        self.absorb_next(prev);
        block = prev;
      }

      let next = (*block).next;
      if !next.is_null() && (*next).is_free && Block::end(block) == next as *mut u8 {
        self.absorb_next(block);
      }
    }

    self.stats.frees += 1;
  }

  /// Payload bytes available behind `ptr`; at least what was requested.
  ///
  /// # Safety
  ///
  /// `ptr` must be a live payload returned by this heap.
  pub unsafe fn usable_size(
    &self,
    ptr: *mut u8,
  ) -> usize {
    unsafe { (*Block::from_payload(ptr)).size }
  }

  /// Carves `size` bytes off the front of `block` when the rest can stand as
  /// a free block with a positive payload.
  unsafe fn split(
    &mut self,
    block: *mut Block,
    size: usize,
  ) {
    unsafe {
      let old_size = (*block).size;
      if old_size - size <= HEADER_SIZE + ALIGNMENT {
        return;
      }

      let next = (*block).next;
      let leftover = old_size - size - HEADER_SIZE;
      let remainder = Block::write(
        Block::payload(block).add(size),
        Block::new(leftover, true, next, block),
      );

      if !next.is_null() {
        (*next).prev = remainder;
      }
      (*block).next = remainder;
      (*block).size = size;

      trace!("split {block:p}: {size} bytes kept, {leftover} bytes free at {remainder:p}");
    }

    self.stats.splits += 1;
    self.stats.blocks += 1;
  }

  /// Extends the heap by one block of `size` bytes linked after `last`.
  unsafe fn grow(
    &mut self,
    last: *mut Block,
    size: usize,
  ) -> Result<*mut Block, AllocError> {
    let total = size.checked_add(HEADER_SIZE).ok_or(AllocError::Overflow)?;

    let brk = self.grower.current();
    let padding = (brk as usize).wrapping_neg() % ALIGNMENT;
    let increment = total.checked_add(padding).ok_or(AllocError::Overflow)?;

    let Some(address) = self.grower.extend(increment) else {
      warn!("heap extension of {increment} bytes denied");
      return Err(AllocError::OutOfMemory(increment));
    };

    assert_eq!(
      address, brk,
      "program break moved between measuring and extending the heap"
    );

    let block = unsafe {
      let block = Block::write(
        address.add(padding),
        Block::new(size, false, ptr::null_mut(), last),
      );
      if !last.is_null() {
        (*last).next = block;
      }
      block
    };

    if self.root.is_null() {
      self.root = block;
    }

    self.stats.grows += 1;
    self.stats.blocks += 1;
    self.stats.max_heap += increment;

    trace!("grew heap by {increment} bytes, new block {block:p}");
    Ok(block)
  }

  /// Merges the successor of `block` into it.
  unsafe fn absorb_next(
    &mut self,
    block: *mut Block,
  ) {
    unsafe {
      let victim = (*block).next;
      let after = (*victim).next;

      let merged = (*block).size + HEADER_SIZE + (*victim).size;
      (*block).size = merged;
      (*block).next = after;
      if !after.is_null() {
        (*after).prev = block;
      }

      if self.cursor == victim {
        self.cursor = block;
      }

      trace!("coalesced {victim:p} into {block:p}, now {merged} bytes");
    }

    self.stats.coalesces += 1;
    self.stats.blocks -= 1;
  }
}

/// Iterator over the blocks of a heap, see [`Heap::blocks`].
pub struct Blocks<'a> {
  current: *mut Block,
  _heap: PhantomData<&'a ()>,
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<Self::Item> {
    if self.current.is_null() {
      return None;
    }

    // SAFETY: the heap is borrowed, so every linked header stays live.
    let info = unsafe { BlockInfo::of(self.current) };
    self.current = unsafe { (*self.current).next };
    Some(info)
  }
}
