/*
 * sbrk.rs
 *
 * end-to-end run of the process heap on the real program break.
 * kept to a single test so no other test thread moves the break.
 */

use std::{ptr, slice};

use freelist::global;

#[test]
fn process_heap_on_program_break() {
  let before = global::statistics();

  unsafe {
    assert!(global::malloc(0).is_null());

    let a = global::malloc(64);
    let b = global::malloc(64);
    let c = global::malloc(64);
    for block in [a, b, c] {
      assert!(!block.is_null());
      assert_eq!(block as usize % 4, 0);
    }
    assert!(b as usize >= a as usize + 64);
    assert!(c as usize >= b as usize + 64);

    ptr::write_bytes(a, 0x11, 64);
    ptr::write_bytes(b, 0x22, 64);
    ptr::write_bytes(c, 0x33, 64);

    /* freed memory is reused rather than grown */
    global::free(b);
    let grows = global::statistics().grows;
    let reused = global::malloc(64);
    assert_eq!(reused, b);
    assert_eq!(global::statistics().grows, grows);

    /* realloc moves the bytes into a bigger block */
    let moved = global::realloc(a, 512);
    assert!(!moved.is_null());
    assert!(slice::from_raw_parts(moved, 64).iter().all(|&byte| byte == 0x11));
    assert!(slice::from_raw_parts(c, 64).iter().all(|&byte| byte == 0x33));

    let zeroed = global::calloc(32, 8);
    assert!(!zeroed.is_null());
    assert!(slice::from_raw_parts(zeroed, 256).iter().all(|&byte| byte == 0));
    assert!(global::calloc(usize::MAX, 2).is_null());

    for block in [reused, moved, c, zeroed] {
      global::free(block);
    }
    global::free(ptr::null_mut());
  }

  let after = global::statistics();
  assert_eq!(after.mallocs - before.mallocs, 6);
  assert_eq!(after.frees - before.frees, 6);
  assert!(after.reuses > before.reuses);
  assert!(after.max_heap > before.max_heap);
}
