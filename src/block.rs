use std::{mem, ptr};

/// Header prefixed to every payload on the heap.
///
/// Headers are linked in address order and may sit on any 4-byte boundary,
/// so the struct is packed to the alignment quantum. Fields are only ever
/// read and written by value through raw pointers.
#[repr(C, packed(4))]
pub struct Block {
  pub size: usize,
  pub next: *mut Block,
  pub prev: *mut Block,
  pub is_free: bool,
  _padding: [u8; 3],
}

/// Bytes occupied by a [`Block`] header in front of each payload.
pub const HEADER_SIZE: usize = mem::size_of::<Block>();

impl Block {
  pub fn new(
    size: usize,
    is_free: bool,
    next: *mut Block,
    prev: *mut Block,
  ) -> Self {
    Self {
      size,
      next,
      prev,
      is_free,
      _padding: [0; 3],
    }
  }

  /// Writes a fresh header at `address` and returns it as a block pointer.
  ///
  /// # Safety
  ///
  /// `address` must be 4-byte aligned and valid for `HEADER_SIZE` writes.
  pub unsafe fn write(
    address: *mut u8,
    header: Block,
  ) -> *mut Block {
    let block = address as *mut Block;
    unsafe { ptr::write(block, header) };
    block
  }

  /// Address of the payload that follows the header.
  ///
  /// # Safety
  ///
  /// `block` must point at a header inside the heap.
  pub unsafe fn payload(block: *mut Block) -> *mut u8 {
    unsafe { (block as *mut u8).add(HEADER_SIZE) }
  }

  /// Recovers the header from a payload address handed out earlier.
  ///
  /// # Safety
  ///
  /// `payload` must have been returned by the same heap and not yet merged away.
  pub unsafe fn from_payload(payload: *mut u8) -> *mut Block {
    unsafe { payload.sub(HEADER_SIZE) as *mut Block }
  }

  /// One past the last payload byte. Equals the next header's address when
  /// the two blocks are physically contiguous.
  ///
  /// # Safety
  ///
  /// `block` must point at a header inside the heap.
  pub unsafe fn end(block: *mut Block) -> *mut u8 {
    unsafe { Self::payload(block).add((*block).size) }
  }
}

/// Read-only snapshot of one block, as yielded by `Heap::blocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// Address of the header.
  pub address: usize,
  /// Address of the payload.
  pub payload: usize,
  pub size: usize,
  pub is_free: bool,
  pub prev: Option<usize>,
  pub next: Option<usize>,
}

impl BlockInfo {
  /// # Safety
  ///
  /// `block` must point at a live header.
  pub(crate) unsafe fn of(block: *mut Block) -> Self {
    unsafe {
      let prev = (*block).prev;
      let next = (*block).next;
      Self {
        address: block as usize,
        payload: Block::payload(block) as usize,
        size: (*block).size,
        is_free: (*block).is_free,
        prev: (!prev.is_null()).then_some(prev as usize),
        next: (!next.is_null()).then_some(next as usize),
      }
    }
  }

  /// One past the last payload byte.
  pub fn end(&self) -> usize {
    self.payload + self.size
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_header_layout() {
    assert_eq!(mem::align_of::<Block>(), 4);
    assert_eq!(HEADER_SIZE % 4, 0);
    assert_eq!(HEADER_SIZE, 3 * mem::size_of::<usize>() + 4);
  }

  #[test]
  fn test_payload_round_trip() {
    let mut storage = [0u32; 32];
    let base = storage.as_mut_ptr() as *mut u8;

    unsafe {
      let block = Block::write(base, Block::new(40, false, ptr::null_mut(), ptr::null_mut()));
      let payload = Block::payload(block);

      assert_eq!(payload as usize - base as usize, HEADER_SIZE);
      assert_eq!(Block::from_payload(payload), block);
      assert_eq!(Block::end(block) as usize, payload as usize + 40);

      let info = BlockInfo::of(block);
      assert_eq!(info.size, 40);
      assert!(!info.is_free);
      assert_eq!(info.prev, None);
      assert_eq!(info.next, None);
    }
  }
}
