use std::{io::Read, ptr};

use freelist::{Fit, Sbrk, global, grower::HeapGrower};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    Sbrk.current(),
  );
}

fn print_alloc(
  size: usize,
  addr: *mut u8,
) {
  println!(
    "Allocated {} bytes, address = {:?}, program break = {:?}",
    size,
    addr,
    Sbrk.current()
  );
}

fn main() {
  // FREELIST_FIT picks the policy, FREELIST_STATS=1 prints counters at exit.
  println!(
    "fit policy from environment: {}",
    std::env::var(freelist::config::FIT_VAR).unwrap_or_else(|_| Fit::default().to_string())
  );
  global::register_exit_report();

  unsafe {
    print_program_break("start");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 1) Three equally sized blocks. Each one grows the heap.
    // --------------------------------------------------------------------
    let a = global::malloc(64);
    let b = global::malloc(64);
    let c = global::malloc(64);
    println!("\n[1] Allocate A, B, C (64 bytes each)");
    for block in [a, b, c] {
      print_alloc(64, block);
    }
    ptr::write_bytes(b, 0xAB, 64);

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 2) Free B, then A. A absorbs B into one free block.
    // --------------------------------------------------------------------
    global::free(b);
    global::free(a);
    println!("\n[2] Freed B then A, coalesces = {}", global::statistics().coalesces);

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 3) A small request is carved out of the merged block.
    // --------------------------------------------------------------------
    let small = global::malloc(10);
    println!("\n[3] Allocate 10 bytes (expect reuse of A)");
    print_alloc(10, small);
    println!(
      "[3] small == A? {}, splits = {}",
      if small == a { "Yes, it reused the freed block" } else { "No" },
      global::statistics().splits
    );

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 4) Grow the small block through realloc; the bytes come along.
    // --------------------------------------------------------------------
    ptr::copy_nonoverlapping(b"freelist!\0".as_ptr(), small, 10);
    let grown = global::realloc(small, 256);
    println!("\n[4] Realloc 10 -> 256 bytes");
    print_alloc(256, grown);
    let text = std::slice::from_raw_parts(grown, 9);
    println!("[4] Contents preserved: {}", String::from_utf8_lossy(text));

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 5) A large block moves the program break.
    // --------------------------------------------------------------------
    print_program_break("before large alloc");
    let big = global::calloc(64, 1024);
    println!("\n[5] Calloc 64 KiB");
    print_alloc(64 * 1024, big);
    print_program_break("after large alloc");

    global::free(big);
    global::free(grown);
    global::free(c);

    println!("\n[6] End of example. The statistics report follows at exit.");
  }
}
