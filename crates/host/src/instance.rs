//! Host VM instance interface
//!
//! One implementor per loaded script-VM image. The marshaling core only
//! ever talks to an instance through this trait: resolve a public by
//! name, push parameters, execute, and read strings back out of the
//! instance's addressable heap.

use pawnbridge_core::{Cell, Result, RESERVED_INDEX_FLOOR};

/// Index of a public function inside one host VM instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicIndex(pub i32);

impl PublicIndex {
    /// Whether this index falls in the reserved range and is not a real
    /// callable target.
    #[inline]
    pub fn is_reserved(&self) -> bool {
        self.0 < RESERVED_INDEX_FLOOR
    }
}

/// Address of an allocation in an instance's addressable heap.
///
/// Only meaningful inside the instance that produced it, and only for
/// the duration of the call it was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapAddr(pub i32);

/// One loaded host VM instance.
///
/// Push order follows the target calling convention: the caller pushes
/// the last formal parameter first, the callee pops in forward order.
/// `push_string` and `push_array` allocate in the instance heap, copy
/// the contents in, push the resulting address onto the call stack and
/// return it so the caller can release it after `exec`. Every address
/// handed out must be released exactly once, and never after the call
/// that produced it has been left behind.
pub trait HostInstance: Send + Sync {
    /// Resolve a public function by name.
    fn find_public(&self, name: &str) -> Option<PublicIndex>;

    /// Push a scalar cell onto the pending call stack.
    fn push(&self, value: Cell) -> Result<()>;

    /// Allocate a string in the instance heap and push its address.
    fn push_string(&self, text: &str) -> Result<HeapAddr>;

    /// Allocate a cell array in the instance heap and push its address.
    fn push_array(&self, cells: &[Cell]) -> Result<HeapAddr>;

    /// Release a heap allocation made by `push_string`/`push_array`.
    fn release(&self, addr: HeapAddr);

    /// Execute a resolved public with the pushed parameters and return
    /// its single return cell. Fails only if the instance itself is
    /// corrupt; recovery is out of scope.
    fn exec(&self, index: PublicIndex) -> Result<Cell>;

    /// Read a terminated string out of the instance's memory.
    ///
    /// Used on the dispatch path, where the host hands the bridge a
    /// parameter cell holding a string-region address.
    fn read_string(&self, addr: Cell) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_index_range() {
        assert!(PublicIndex(-10_001).is_reserved());
        assert!(PublicIndex(i32::MIN).is_reserved());
        assert!(!PublicIndex(-10_000).is_reserved());
        assert!(!PublicIndex(0).is_reserved());
        assert!(!PublicIndex(7).is_reserved());
    }
}
