use thiserror::Error;

/// Reasons an allocation request yields no block.
///
/// The C-shaped entry points collapse all of these into a null pointer.
/// Double frees and break mismatches are not listed: they abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
  #[error("zero-byte allocation requested")]
  ZeroSize,
  #[error("requested size overflows the address space")]
  Overflow,
  #[error("heap extension of {0} bytes denied")]
  OutOfMemory(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fit policy `{0}` (expected first, best, worst or next)")]
pub struct ParseFitError(pub String);
