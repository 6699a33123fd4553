/// Every payload size is a multiple of this many bytes.
pub const ALIGNMENT: usize = 4;

/// Rounds the given size up to the next multiple of [`ALIGNMENT`].
///
/// Overflows for sizes within `ALIGNMENT` of `usize::MAX`; use
/// [`checked_align`] for untrusted input.
///
/// # Examples
///
/// ```rust
/// use freelist::align;
///
/// assert_eq!(align!(1), 4);
/// assert_eq!(align!(10), 12);
/// assert_eq!(align!(16), 16);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + $crate::align::ALIGNMENT - 1) & !($crate::align::ALIGNMENT - 1)
  };
}

/// Rounds `size` up to the alignment quantum, or `None` when that overflows.
pub fn checked_align(size: usize) -> Option<usize> {
  size
    .checked_add(ALIGNMENT - 1)
    .map(|padded| padded & !(ALIGNMENT - 1))
}
