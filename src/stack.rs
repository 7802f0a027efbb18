//! Memory-bounded script stack
//!
//! The interpreter's stacks are limited by the total memory their elements
//! occupy rather than by element count. Each element costs its length plus a
//! fixed [`ELEMENT_OVERHEAD`]. The alt stack is created with
//! [`LimitedStack::make_child`] and draws from the same budget as the main
//! stack, so moving an element between them never changes the total.

use crate::error::{ConsensusError, Result, ScriptErrorCode};
use std::cell::Cell;
use std::rc::Rc;

/// Bytes charged per element on top of its payload
pub const ELEMENT_OVERHEAD: u64 = 32;

#[cold]
fn make_stack_size_error(needed: u64, max: u64) -> ConsensusError {
    ConsensusError::script_with(
        ScriptErrorCode::StackSize,
        format!("Stack memory usage {needed} exceeds limit of {max}"),
    )
}

#[cold]
fn make_underflow_error() -> ConsensusError {
    ConsensusError::script(ScriptErrorCode::InvalidStackOperation)
}

#[inline]
fn element_cost(element: &[u8]) -> u64 {
    ELEMENT_OVERHEAD + element.len() as u64
}

#[derive(Debug)]
pub struct LimitedStack {
    items: Vec<Vec<u8>>,
    /// Shared with every stack made by `make_child`.
    usage: Rc<Cell<u64>>,
    max_memory: u64,
}

impl LimitedStack {
    pub fn new(max_memory: u64) -> Self {
        LimitedStack {
            items: Vec::new(),
            usage: Rc::new(Cell::new(0)),
            max_memory,
        }
    }

    /// Empty stack sharing this stack's memory budget.
    pub fn make_child(&self) -> LimitedStack {
        LimitedStack {
            items: Vec::new(),
            usage: Rc::clone(&self.usage),
            max_memory: self.max_memory,
        }
    }

    /// Copy of the elements with a budget of its own.
    pub fn copy_detached(&self) -> LimitedStack {
        let own: u64 = self.items.iter().map(|e| element_cost(e)).sum();
        LimitedStack {
            items: self.items.clone(),
            usage: Rc::new(Cell::new(own)),
            max_memory: self.max_memory,
        }
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Memory used by this stack and every stack sharing its budget.
    pub fn memory_usage(&self) -> u64 {
        self.usage.get()
    }

    pub fn max_memory(&self) -> u64 {
        self.max_memory
    }

    fn reserve(&self, cost: u64) -> Result<()> {
        let needed = self.usage.get().saturating_add(cost);
        if needed > self.max_memory {
            return Err(make_stack_size_error(needed, self.max_memory));
        }
        self.usage.set(needed);
        Ok(())
    }

    fn release(&self, cost: u64) {
        self.usage.set(self.usage.get().saturating_sub(cost));
    }

    pub fn push(&mut self, element: Vec<u8>) -> Result<()> {
        self.reserve(element_cost(&element))?;
        self.items.push(element);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Vec<u8>> {
        let element = self.items.pop().ok_or_else(make_underflow_error)?;
        self.release(element_cost(&element));
        Ok(element)
    }

    /// Element `depth` positions below the top (0 is the top).
    pub fn top(&self, depth: usize) -> Result<&[u8]> {
        self.index_of(depth)
            .map(|i| self.items[i].as_slice())
            .ok_or_else(make_underflow_error)
    }

    fn index_of(&self, depth: usize) -> Option<usize> {
        self.items.len().checked_sub(depth + 1)
    }

    /// Remove and return the element at `depth`.
    pub fn remove(&mut self, depth: usize) -> Result<Vec<u8>> {
        let i = self.index_of(depth).ok_or_else(make_underflow_error)?;
        let element = self.items.remove(i);
        self.release(element_cost(&element));
        Ok(element)
    }

    /// Remove the elements at depths `from..to` (exclusive of `to`).
    pub fn erase(&mut self, from: usize, to: usize) -> Result<()> {
        if from > to || to > self.items.len() {
            return Err(make_underflow_error());
        }
        let len = self.items.len();
        let freed: u64 = self
            .items
            .drain(len - to..len - from)
            .map(|e| element_cost(&e))
            .sum();
        self.release(freed);
        Ok(())
    }

    /// Swap the elements at two depths.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let ia = self.index_of(a).ok_or_else(make_underflow_error)?;
        let ib = self.index_of(b).ok_or_else(make_underflow_error)?;
        self.items.swap(ia, ib);
        Ok(())
    }

    /// Insert `element` so that it ends up at `depth`.
    pub fn insert(&mut self, depth: usize, element: Vec<u8>) -> Result<()> {
        let i = self
            .items
            .len()
            .checked_sub(depth)
            .ok_or_else(make_underflow_error)?;
        self.reserve(element_cost(&element))?;
        self.items.insert(i, element);
        Ok(())
    }

    /// Push a copy of the element at `depth`.
    pub fn push_copy(&mut self, depth: usize) -> Result<()> {
        let element = self.top(depth)?.to_vec();
        self.push(element)
    }

    /// Move the top element onto `other`. Both stacks share a budget, so this
    /// cannot fail on memory.
    pub fn move_top_to(&mut self, other: &mut LimitedStack) -> Result<()> {
        let element = self.pop()?;
        other.push(element)
    }

    pub fn clear(&mut self) {
        let freed: u64 = self.items.iter().map(|e| element_cost(e)).sum();
        self.items.clear();
        self.release(freed);
    }

    /// Bottom-to-top view of the elements.
    pub fn elements(&self) -> &[Vec<u8>] {
        &self.items
    }
}

impl Drop for LimitedStack {
    fn drop(&mut self) {
        self.clear();
    }
}
