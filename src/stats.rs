use std::fmt;

/// Counters kept by a heap. Each one moves only after the operation it
/// describes has succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
  /// Successful allocations.
  pub mallocs: usize,
  /// Deallocations of non-null pointers.
  pub frees: usize,
  /// Allocations served from an existing free block.
  pub reuses: usize,
  /// Heap extensions.
  pub grows: usize,
  /// Free blocks carved in two.
  pub splits: usize,
  /// Neighbor merges.
  pub coalesces: usize,
  /// Blocks currently in the list, free or not.
  pub blocks: usize,
  /// Sum of aligned request sizes.
  pub requested: usize,
  /// Bytes obtained from the grower, headers included.
  pub max_heap: usize,
}

impl Stats {
  pub const fn new() -> Self {
    Self {
      mallocs: 0,
      frees: 0,
      reuses: 0,
      grows: 0,
      splits: 0,
      coalesces: 0,
      blocks: 0,
      requested: 0,
      max_heap: 0,
    }
  }
}

impl fmt::Display for Stats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "heap management statistics")?;
    writeln!(f, "mallocs:\t{}", self.mallocs)?;
    writeln!(f, "frees:\t\t{}", self.frees)?;
    writeln!(f, "reuses:\t\t{}", self.reuses)?;
    writeln!(f, "grows:\t\t{}", self.grows)?;
    writeln!(f, "splits:\t\t{}", self.splits)?;
    writeln!(f, "coalesces:\t{}", self.coalesces)?;
    writeln!(f, "blocks:\t\t{}", self.blocks)?;
    writeln!(f, "requested:\t{}", self.requested)?;
    writeln!(f, "max heap:\t{}", self.max_heap)
  }
}
