use std::{
  alloc::{self, Layout},
  ptr::NonNull,
};

use libc::{c_void, intptr_t, sbrk};

/// Source of fresh heap memory, modelled on a program break.
///
/// The heap calls [`current`](HeapGrower::current) and then
/// [`extend`](HeapGrower::extend) back to back and expects the old break
/// returned by `extend` to equal the measured one.
pub trait HeapGrower {
  /// Current break address.
  fn current(&mut self) -> *mut u8;

  /// Moves the break up by `increment` bytes and returns the old break, or
  /// `None` when the request is denied.
  fn extend(
    &mut self,
    increment: usize,
  ) -> Option<*mut u8>;
}

/// The process data segment, grown with `sbrk(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sbrk;

impl HeapGrower for Sbrk {
  fn current(&mut self) -> *mut u8 {
    // SAFETY: sbrk(0) only reports the break.
    unsafe { sbrk(0) as *mut u8 }
  }

  fn extend(
    &mut self,
    increment: usize,
  ) -> Option<*mut u8> {
    let increment = intptr_t::try_from(increment).ok()?;

    // SAFETY: a positive increment only maps new memory past the break.
    let address = unsafe { sbrk(increment) };

    if address == usize::MAX as *mut c_void {
      return None;
    }

    Some(address as *mut u8)
  }
}

/// A fixed-capacity region that behaves like a private program break.
///
/// Extensions past the capacity fail, which makes out-of-memory paths easy
/// to reach.
#[derive(Debug)]
pub struct Arena {
  base: NonNull<u8>,
  layout: Layout,
  capacity: usize,
  brk: usize,
}

impl Arena {
  const ALIGN: usize = 16;

  pub fn new(capacity: usize) -> Self {
    let layout = match Layout::from_size_align(capacity.max(Self::ALIGN), Self::ALIGN) {
      Ok(layout) => layout,
      Err(_) => panic!("arena capacity {capacity} exceeds isize::MAX"),
    };

    // SAFETY: the layout has a non-zero size.
    let raw = unsafe { alloc::alloc_zeroed(layout) };
    let Some(base) = NonNull::new(raw) else {
      alloc::handle_alloc_error(layout);
    };

    Self {
      base,
      layout,
      capacity,
      brk: 0,
    }
  }

  /// Start of the region; the first block header lands here.
  pub fn base(&self) -> *mut u8 {
    self.base.as_ptr()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Bytes handed out so far.
  pub fn used(&self) -> usize {
    self.brk
  }
}

impl HeapGrower for Arena {
  fn current(&mut self) -> *mut u8 {
    // SAFETY: brk never exceeds capacity, so this stays within the region.
    unsafe { self.base.as_ptr().add(self.brk) }
  }

  fn extend(
    &mut self,
    increment: usize,
  ) -> Option<*mut u8> {
    let brk = self
      .brk
      .checked_add(increment)
      .filter(|&brk| brk <= self.capacity)?;

    let old = self.current();
    self.brk = brk;
    Some(old)
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    // SAFETY: base was allocated in `new` with this exact layout.
    unsafe { alloc::dealloc(self.base.as_ptr(), self.layout) };
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_arena_break() {
    let mut arena = Arena::new(64);
    let base = arena.base();

    assert_eq!(arena.current(), base);
    assert_eq!(arena.extend(40), Some(base));
    assert_eq!(arena.current() as usize, base as usize + 40);
    assert_eq!(arena.used(), 40);

    assert_eq!(arena.extend(32), None);
    assert_eq!(arena.used(), 40);

    assert_eq!(arena.extend(24), Some(unsafe { base.add(40) }));
    assert_eq!(arena.extend(1), None);
    assert_eq!(arena.extend(usize::MAX), None);
  }

  #[test]
  fn test_arena_alignment() {
    let arena = Arena::new(0);
    assert_eq!(arena.base() as usize % Arena::ALIGN, 0);
    assert_eq!(arena.capacity(), 0);
  }

  #[test]
  fn test_sbrk_rejects_oversized_increment() {
    assert_eq!(Sbrk.extend(usize::MAX), None);
  }
}
