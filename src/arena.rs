//! Flat storage of fixed-size node records ("blocs").
//!
//! Each bloc is laid out as `[variable, refcount, children...]` inside a single `Vec<u32>`.
//! A freed bloc stores [`FREE`] in its variable cell and the next free slot in its refcount cell.

use log::{error, trace};

/// Marker stored in the variable cell of a free bloc.
pub const FREE: u32 = u32::MAX;
/// End of the free list.
const NONE: u32 = u32::MAX;

const VARIABLE: usize = 0;
const REFCOUNT: usize = 1;
const CHILDREN: usize = 2;

pub struct Arena {
    cells: Vec<u32>,
    blocsize: usize,
    /// Number of slots ever handed out and not retracted.
    high_water: usize,
    /// Head of the free list.
    free_head: u32,
    /// Number of slots in the free list.
    free_count: usize,
}

impl Arena {
    /// Create an arena of blocs of `blocsize` cells, with room for `capacity` blocs.
    pub fn new(blocsize: usize, capacity: usize) -> Self {
        assert!(blocsize > CHILDREN, "Bloc size should leave room for children");
        Self {
            cells: vec![0; blocsize * capacity.max(1)],
            blocsize,
            high_water: 0,
            free_head: NONE,
            free_count: 0,
        }
    }

    /// Maximal number of children per bloc.
    pub fn max_children(&self) -> usize {
        self.blocsize - CHILDREN
    }

    /// Number of slots the current allocation can hold.
    pub fn capacity(&self) -> usize {
        self.cells.len() / self.blocsize
    }

    /// High-water mark: slots `0..high_water()` have been handed out at some point.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Number of slots currently in use.
    pub fn len(&self) -> usize {
        self.high_water - self.free_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn offset(&self, slot: u32) -> usize {
        slot as usize * self.blocsize
    }

    /// Allocate a slot, reusing the head of the free list if possible.
    ///
    /// The returned slot has undefined content and must be filled by the caller.
    pub fn allocate(&mut self) -> u32 {
        if self.free_head != NONE {
            let slot = self.free_head;
            let offset = self.offset(slot);
            self.free_head = self.cells[offset + REFCOUNT];
            self.free_count -= 1;
            trace!("arena: reuse slot {}", slot);
            return slot;
        }

        if self.high_water == self.capacity() {
            let new_capacity = 2 * self.capacity();
            trace!("arena: grow from {} to {} slots", self.capacity(), new_capacity);
            self.cells.resize(new_capacity * self.blocsize, 0);
        }

        let slot = self.high_water as u32;
        self.high_water += 1;
        slot
    }

    /// Return a slot to the arena.
    ///
    /// The most recently allocated slot retracts the high-water mark, any other slot goes to the free list.
    pub fn release_slot(&mut self, slot: u32) {
        if !self.is_live(slot) {
            error!("arena: release of invalid slot {}", slot);
            panic!("Slot {} is out of range or already free", slot);
        }
        let offset = self.offset(slot);
        self.cells[offset + VARIABLE] = FREE;
        if slot as usize + 1 == self.high_water {
            self.high_water -= 1;
        } else {
            self.cells[offset + REFCOUNT] = self.free_head;
            self.free_head = slot;
            self.free_count += 1;
        }
    }

    /// Check whether `slot` holds a node record.
    pub fn is_live(&self, slot: u32) -> bool {
        (slot as usize) < self.high_water && self.cells[self.offset(slot) + VARIABLE] != FREE
    }

    /// Iterate over the slots holding node records.
    pub fn live_slots(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.high_water as u32).filter(|&slot| self.is_live(slot))
    }

    pub fn variable(&self, slot: u32) -> u32 {
        self.cells[self.offset(slot) + VARIABLE]
    }

    pub fn refcount(&self, slot: u32) -> u32 {
        self.cells[self.offset(slot) + REFCOUNT]
    }

    pub fn set_refcount(&mut self, slot: u32, refcount: u32) {
        let offset = self.offset(slot);
        self.cells[offset + REFCOUNT] = refcount;
    }

    pub fn children(&self, slot: u32, arity: usize) -> &[u32] {
        let start = self.offset(slot) + CHILDREN;
        &self.cells[start..start + arity]
    }

    /// Fill a freshly allocated slot.
    pub fn write(&mut self, slot: u32, variable: u32, refcount: u32, children: &[u32]) {
        assert!(children.len() <= self.max_children());
        let offset = self.offset(slot);
        self.cells[offset + VARIABLE] = variable;
        self.cells[offset + REFCOUNT] = refcount;
        self.cells[offset + CHILDREN..offset + CHILDREN + children.len()].copy_from_slice(children);
    }

    /// Compare the record stored in `slot` with `(variable, children)`.
    pub fn matches(&self, slot: u32, variable: u32, children: &[u32]) -> bool {
        self.variable(slot) == variable && self.children(slot, children.len()) == children
    }
}
