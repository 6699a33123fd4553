use std::{fmt, ptr, str::FromStr};

use crate::{block::Block, error::ParseFitError};

/// Strategy used to pick among several free blocks that satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Fit {
  /// First free block large enough, scanning from the root.
  #[default]
  First,
  /// Smallest free block large enough.
  Best,
  /// Largest free block large enough.
  Worst,
  /// First fit that resumes after the previously chosen block.
  Next,
}

impl Fit {
  pub const ALL: [Fit; 4] = [Fit::First, Fit::Best, Fit::Worst, Fit::Next];

  pub fn name(self) -> &'static str {
    match self {
      Fit::First => "first",
      Fit::Best => "best",
      Fit::Worst => "worst",
      Fit::Next => "next",
    }
  }
}

impl fmt::Display for Fit {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Fit {
  type Err = ParseFitError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Fit::ALL
      .into_iter()
      .find(|fit| fit.name().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| ParseFitError(s.to_owned()))
  }
}

/// Outcome of a scan over the block list.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Located {
  /// Free block satisfying the request, or null.
  pub found: *mut Block,
  /// Tail of the list when nothing was found; the heap grows after it.
  pub last: *mut Block,
}

impl Located {
  fn none(last: *mut Block) -> Self {
    Self {
      found: ptr::null_mut(),
      last,
    }
  }
}

/// Scans the list rooted at `root` for a free block of at least `size` bytes.
///
/// Blocks are never modified. Only [`Fit::Next`] touches `cursor`, moving it
/// to the block it returns.
///
/// # Safety
///
/// `root` must be null or the head of a well-formed block list, and `cursor`
/// must be null or a live block of that list.
pub(crate) unsafe fn locate(
  fit: Fit,
  root: *mut Block,
  cursor: &mut *mut Block,
  size: usize,
) -> Located {
  unsafe {
    match fit {
      Fit::First => first_fit(root, size),
      Fit::Best => extreme_fit(root, size, |candidate, chosen| candidate < chosen),
      Fit::Worst => extreme_fit(root, size, |candidate, chosen| candidate > chosen),
      Fit::Next => next_fit(root, cursor, size),
    }
  }
}

unsafe fn fits(
  block: *mut Block,
  size: usize,
) -> bool {
  unsafe { (*block).is_free && (*block).size >= size }
}

unsafe fn first_fit(
  root: *mut Block,
  size: usize,
) -> Located {
  unsafe {
    let mut last = ptr::null_mut();
    let mut current = root;

    while !current.is_null() {
      if fits(current, size) {
        return Located {
          found: current,
          last: current,
        };
      }
      last = current;
      current = (*current).next;
    }

    Located::none(last)
  }
}

/// Full scan keeping the qualifying block whose size `better` prefers.
/// Ties keep the lowest address.
unsafe fn extreme_fit(
  root: *mut Block,
  size: usize,
  better: impl Fn(usize, usize) -> bool,
) -> Located {
  unsafe {
    let mut chosen: *mut Block = ptr::null_mut();
    let mut last = ptr::null_mut();
    let mut current = root;

    while !current.is_null() {
      if fits(current, size) && (chosen.is_null() || better((*current).size, (*chosen).size)) {
        chosen = current;
      }
      last = current;
      current = (*current).next;
    }

    Located { found: chosen, last }
  }
}

unsafe fn next_fit(
  root: *mut Block,
  cursor: &mut *mut Block,
  size: usize,
) -> Located {
  unsafe {
    if root.is_null() {
      return Located::none(ptr::null_mut());
    }

    let start = if cursor.is_null() || (**cursor).next.is_null() {
      root
    } else {
      (**cursor).next
    };

    // The full wrap visits every block, so the tail is always seen.
    let mut tail = ptr::null_mut();
    let mut current = start;

    loop {
      if fits(current, size) {
        *cursor = current;
        return Located {
          found: current,
          last: current,
        };
      }

      if (*current).next.is_null() {
        tail = current;
        current = root;
      } else {
        current = (*current).next;
      }

      if current == start {
        return Located::none(tail);
      }
    }
  }
}
