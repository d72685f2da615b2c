//! Raw parameter block view
//!
//! When the host VM fires a public call it hands over a block of cells
//! whose first cell is the total byte length of the actual parameters,
//! followed by one cell per parameter. `RawParams` is a borrowed view
//! over that block.

use pawnbridge_core::{Cell, CELL_BYTES};

/// Borrowed view over a host parameter block.
#[derive(Debug, Clone, Copy)]
pub struct RawParams<'a> {
    cells: &'a [Cell],
}

impl<'a> RawParams<'a> {
    pub fn new(cells: &'a [Cell]) -> Self {
        Self { cells }
    }

    /// Number of parameters the block declares.
    #[inline]
    pub fn count(&self) -> usize {
        self.cells
            .first()
            .map(|len| len.0 as usize / CELL_BYTES)
            .unwrap_or(0)
    }

    /// Parameter cell at a zero-based position, if the block declares it.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Cell> {
        if index < self.count() {
            self.cells.get(index + 1).copied()
        } else {
            None
        }
    }
}

/// Build a parameter block from parameter cells, leading length included.
pub fn pack(values: &[Cell]) -> Vec<Cell> {
    let mut block = Vec::with_capacity(values.len() + 1);
    block.push(Cell((values.len() * CELL_BYTES) as i32));
    block.extend_from_slice(values);
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_and_count() {
        let block = pack(&[Cell(7), Cell(9)]);
        let params = RawParams::new(&block);
        assert_eq!(params.count(), 2);
        assert_eq!(params.get(0), Some(Cell(7)));
        assert_eq!(params.get(1), Some(Cell(9)));
    }

    #[test]
    fn test_out_of_range_positions_are_absent() {
        let block = pack(&[Cell(7)]);
        let params = RawParams::new(&block);
        assert_eq!(params.get(1), None);

        let empty = RawParams::new(&[]);
        assert_eq!(empty.count(), 0);
        assert_eq!(empty.get(0), None);
    }

    #[test]
    fn test_declared_count_bounds_access() {
        // A block that declares fewer parameters than it physically holds
        // must not expose the extras.
        let cells = [Cell(CELL_BYTES as i32), Cell(1), Cell(2)];
        let params = RawParams::new(&cells);
        assert_eq!(params.count(), 1);
        assert_eq!(params.get(0), Some(Cell(1)));
        assert_eq!(params.get(1), None);
    }
}
