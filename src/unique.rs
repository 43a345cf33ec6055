//! Hash-consing table mapping `(variable, children)` to node IDs.
//!
//! Every primary bucket holds one node ID directly plus the head of an overflow chain.
//! Chains live in a separate growable array with its own free list.
//! The table stores IDs only; the records themselves are read from the [`Arena`].

use log::{error, trace};

use crate::arena::Arena;
use crate::utils::hash_node;

const NONE: u32 = u32::MAX;

#[derive(Debug, Copy, Clone)]
struct Bucket {
    head: u32,
    chain: u32,
}

impl Bucket {
    const EMPTY: Bucket = Bucket { head: NONE, chain: NONE };
}

#[derive(Debug, Copy, Clone)]
struct Overflow {
    node: u32,
    next: u32,
}

/// Translation between node IDs stored in the table and arena slots.
#[derive(Debug, Copy, Clone)]
pub struct SlotOffset(pub u32);

impl SlotOffset {
    fn slot(self, id: u32) -> u32 {
        id - self.0
    }
}

pub struct UniqueTable {
    buckets: Vec<Bucket>,
    overflow: Vec<Overflow>,
    free_overflow: u32,
    len: usize,
}

impl UniqueTable {
    pub fn new(buckets: usize) -> Self {
        Self {
            buckets: vec![Bucket::EMPTY; buckets.max(1)],
            overflow: Vec::new(),
            free_overflow: NONE,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, variable: u32, children: &[u32]) -> usize {
        (hash_node(variable, children) % self.buckets.len() as u64) as usize
    }

    /// Find the ID of the node `(variable, children)`, if present.
    pub fn lookup(&self, arena: &Arena, offset: SlotOffset, variable: u32, children: &[u32]) -> Option<u32> {
        let bucket = self.buckets[self.bucket_of(variable, children)];
        if bucket.head == NONE {
            return None;
        }
        if arena.matches(offset.slot(bucket.head), variable, children) {
            return Some(bucket.head);
        }
        let mut entry = bucket.chain;
        while entry != NONE {
            let Overflow { node, next } = self.overflow[entry as usize];
            if arena.matches(offset.slot(node), variable, children) {
                return Some(node);
            }
            entry = next;
        }
        None
    }

    /// Check whether inserting one more node would cross the 80% load threshold.
    pub fn needs_resize(&self) -> bool {
        (self.len + 1) * 100 / self.buckets.len() > 80
    }

    /// Register node `id`, whose record `(variable, children)` is already in the arena.
    pub fn insert(&mut self, id: u32, variable: u32, children: &[u32]) {
        let index = self.bucket_of(variable, children);
        self.link(index, id);
        self.len += 1;
    }

    fn link(&mut self, index: usize, id: u32) {
        let bucket = self.buckets[index];
        if bucket.head == NONE {
            self.buckets[index].head = id;
            return;
        }
        let entry = self.alloc_overflow(Overflow {
            node: id,
            next: bucket.chain,
        });
        self.buckets[index].chain = entry;
    }

    fn alloc_overflow(&mut self, value: Overflow) -> u32 {
        if self.free_overflow != NONE {
            let entry = self.free_overflow;
            self.free_overflow = self.overflow[entry as usize].next;
            self.overflow[entry as usize] = value;
            entry
        } else {
            self.overflow.push(value);
            (self.overflow.len() - 1) as u32
        }
    }

    fn free_overflow_entry(&mut self, entry: u32) {
        if entry as usize + 1 == self.overflow.len() {
            self.overflow.pop();
        } else {
            self.overflow[entry as usize] = Overflow {
                node: NONE,
                next: self.free_overflow,
            };
            self.free_overflow = entry;
        }
    }

    /// Unlink node `id` from the table.
    ///
    /// # Panics
    ///
    /// Panics if the entry is missing, which means the canonical form is broken.
    pub fn remove(&mut self, id: u32, variable: u32, children: &[u32]) {
        let index = self.bucket_of(variable, children);
        let bucket = self.buckets[index];

        if bucket.head == id {
            if bucket.chain == NONE {
                self.buckets[index].head = NONE;
            } else {
                let Overflow { node, next } = self.overflow[bucket.chain as usize];
                self.buckets[index] = Bucket { head: node, chain: next };
                self.free_overflow_entry(bucket.chain);
            }
            self.len -= 1;
            return;
        }

        let mut prev = NONE;
        let mut entry = bucket.chain;
        while entry != NONE {
            let Overflow { node, next } = self.overflow[entry as usize];
            if node == id {
                if prev == NONE {
                    self.buckets[index].chain = next;
                } else {
                    self.overflow[prev as usize].next = next;
                }
                self.free_overflow_entry(entry);
                self.len -= 1;
                return;
            }
            prev = entry;
            entry = next;
        }

        error!("unique table: no entry for node @{} (variable {}, children {:?})", id, variable, children);
        panic!("Node @{} is missing from the unique table", id);
    }

    /// Double the bucket count and re-register every live node of the arena.
    pub fn grow(&mut self, arena: &Arena, arities: &[usize], offset: SlotOffset) {
        let new_size = 2 * self.buckets.len();
        trace!("unique table: grow from {} to {} buckets ({} nodes)", self.buckets.len(), new_size, self.len);
        self.buckets = vec![Bucket::EMPTY; new_size];
        self.overflow.clear();
        self.free_overflow = NONE;
        for slot in arena.live_slots() {
            let variable = arena.variable(slot);
            let children = arena.children(slot, arities[variable as usize]);
            let index = self.bucket_of(variable, children);
            self.link(index, slot + offset.0);
        }
    }
}
