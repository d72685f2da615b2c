//! In-memory host VM instance
//!
//! Emulates the host calling convention without a real VM image: a LIFO
//! pending-parameter stack, a heap of terminated cell buffers, and
//! publics backed by Rust closures. The workspace's tests drive the
//! gateway and dispatch against it; embedders can use it to run the
//! bridge headless.
//!
//! Callers push parameters in reverse positional order, so `exec` hands
//! the closure its arguments popped back into forward order, exactly as
//! a real callee would see them.

use crate::instance::{HeapAddr, HostInstance, PublicIndex};
use parking_lot::Mutex;
use pawnbridge_core::{BridgeError, Cell, Result, RESERVED_INDEX_FLOOR};
use std::collections::HashMap;

type PublicFn = Box<dyn Fn(&MemoryInstance, &[Cell]) -> Cell + Send + Sync>;

/// Heap addresses start away from zero so a zero cell never aliases a
/// live allocation.
const HEAP_BASE: i32 = 0x1000;

#[derive(Default)]
struct State {
    stack: Vec<Cell>,
    heap: HashMap<i32, Vec<Cell>>,
    next_addr: i32,
    calls: Vec<(String, Vec<Cell>)>,
    allocations: Vec<HeapAddr>,
    releases: Vec<HeapAddr>,
    exec_fault: bool,
}

/// An in-memory instance with closure-backed publics.
pub struct MemoryInstance {
    publics: Vec<(String, PublicFn)>,
    reserved: Vec<String>,
    state: Mutex<State>,
}

impl MemoryInstance {
    pub fn new() -> Self {
        Self {
            publics: Vec::new(),
            reserved: Vec::new(),
            state: Mutex::new(State {
                next_addr: HEAP_BASE,
                ..State::default()
            }),
        }
    }

    /// Define a public. The closure receives the instance and the
    /// forward-ordered argument cells and returns the public's return
    /// cell.
    pub fn define_public<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&MemoryInstance, &[Cell]) -> Cell + Send + Sync + 'static,
    {
        self.publics.push((name.to_string(), Box::new(handler)));
    }

    /// Make a name resolve into the reserved index range.
    pub fn define_reserved(&mut self, name: &str) {
        self.reserved.push(name.to_string());
    }

    /// Make every subsequent `exec` fail as if the image were corrupt.
    pub fn set_exec_fault(&self, fault: bool) {
        self.state.lock().exec_fault = fault;
    }

    /// Every executed call so far, as (public name, forward args).
    pub fn calls(&self) -> Vec<(String, Vec<Cell>)> {
        self.state.lock().calls.clone()
    }

    /// Heap allocations in acquisition order.
    pub fn allocations(&self) -> Vec<HeapAddr> {
        self.state.lock().allocations.clone()
    }

    /// Heap releases in release order.
    pub fn releases(&self) -> Vec<HeapAddr> {
        self.state.lock().releases.clone()
    }

    /// Cells currently sitting on the pending call stack.
    pub fn stack_depth(&self) -> usize {
        self.state.lock().stack.len()
    }

    /// Raw contents of a live heap allocation.
    pub fn read_heap(&self, addr: HeapAddr) -> Option<Vec<Cell>> {
        self.state.lock().heap.get(&addr.0).cloned()
    }

    fn alloc(&self, cells: Vec<Cell>) -> HeapAddr {
        let mut state = self.state.lock();
        let addr = HeapAddr(state.next_addr);
        state.next_addr += (cells.len().max(1) * pawnbridge_core::CELL_BYTES) as i32;
        state.heap.insert(addr.0, cells);
        state.allocations.push(addr);
        state.stack.push(Cell(addr.0));
        addr
    }
}

impl Default for MemoryInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl HostInstance for MemoryInstance {
    fn find_public(&self, name: &str) -> Option<PublicIndex> {
        if self.reserved.iter().any(|n| n == name) {
            return Some(PublicIndex(RESERVED_INDEX_FLOOR - 1));
        }
        self.publics
            .iter()
            .position(|(n, _)| n == name)
            .map(|index| PublicIndex(index as i32))
    }

    fn push(&self, value: Cell) -> Result<()> {
        self.state.lock().stack.push(value);
        Ok(())
    }

    fn push_string(&self, text: &str) -> Result<HeapAddr> {
        let mut cells: Vec<Cell> = text.chars().map(|c| Cell(c as i32)).collect();
        cells.push(Cell(0));
        Ok(self.alloc(cells))
    }

    fn push_array(&self, cells: &[Cell]) -> Result<HeapAddr> {
        Ok(self.alloc(cells.to_vec()))
    }

    fn release(&self, addr: HeapAddr) {
        let mut state = self.state.lock();
        state.heap.remove(&addr.0);
        state.releases.push(addr);
    }

    fn exec(&self, index: PublicIndex) -> Result<Cell> {
        let (name, args) = {
            let mut state = self.state.lock();
            let mut args: Vec<Cell> = state.stack.drain(..).collect();
            args.reverse();
            if state.exec_fault {
                return Err(BridgeError::Host("instance image fault".into()));
            }
            let name = self
                .publics
                .get(index.0 as usize)
                .map(|(n, _)| n.clone())
                .ok_or_else(|| BridgeError::Host(format!("no public at index {}", index.0)))?;
            state.calls.push((name.clone(), args.clone()));
            (name, args)
        };

        let handler = &self
            .publics
            .iter()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| BridgeError::Host(format!("no public named {name}")))?
            .1;
        Ok(handler(self, &args))
    }

    fn read_string(&self, addr: Cell) -> Result<String> {
        let state = self.state.lock();
        let cells = state
            .heap
            .get(&addr.0)
            .ok_or_else(|| BridgeError::Host(format!("no string region at {:#x}", addr.0)))?;
        let mut text = String::new();
        for cell in cells {
            if cell.0 == 0 {
                break;
            }
            text.push(char::from_u32(cell.0 as u32).unwrap_or('\u{fffd}'));
        }
        Ok(text)
    }
}
