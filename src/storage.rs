//! Node store: arena, hash-consing table and reference counts behind one narrow API.
//!
//! All canonical-form invariants are maintained here:
//! no two live records share `(variable, children)`, no record has all-equal children,
//! and children are either leaves or nodes of a strictly later variable.

use log::{error, trace};

use crate::arena::Arena;
use crate::config::MddConfig;
use crate::unique::{SlotOffset, UniqueTable};

pub struct NodeStore {
    arena: Arena,
    table: UniqueTable,
    /// Domain size of every variable, indexed by variable.
    arities: Vec<usize>,
    leaf_count: u32,
}

impl NodeStore {
    pub fn new(leaf_count: u32, arities: Vec<usize>, blocsize: usize, config: &MddConfig) -> Self {
        Self {
            arena: Arena::new(blocsize, config.capacity.max(1)),
            table: UniqueTable::new(config.buckets.max(1)),
            arities,
            leaf_count,
        }
    }

    pub fn leaf_count(&self) -> u32 {
        self.leaf_count
    }

    /// Number of live node records.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn max_arity(&self) -> usize {
        self.arena.max_children()
    }

    pub fn add_variable(&mut self, arity: usize) {
        assert!(arity <= self.max_arity(), "Variable domain does not fit the bloc size");
        self.arities.push(arity);
    }

    pub fn arity_of_variable(&self, variable: u32) -> usize {
        self.arities[variable as usize]
    }

    pub fn is_leaf(&self, id: u32) -> bool {
        id < self.leaf_count
    }

    fn offset(&self) -> SlotOffset {
        SlotOffset(self.leaf_count)
    }

    /// Arena slot of a live node.
    fn slot(&self, id: u32) -> u32 {
        assert!(!self.is_leaf(id), "Expected a node, got leaf @{}", id);
        let slot = id - self.leaf_count;
        if !self.arena.is_live(slot) {
            error!("store: access to dead node @{}", id);
            panic!("Node @{} is not a live node", id);
        }
        slot
    }

    /// Check whether `id` denotes a leaf or a live node.
    pub fn is_valid(&self, id: u32) -> bool {
        self.is_leaf(id) || self.arena.is_live(id - self.leaf_count)
    }

    pub fn variable(&self, id: u32) -> u32 {
        self.arena.variable(self.slot(id))
    }

    pub fn arity(&self, id: u32) -> usize {
        self.arities[self.variable(id) as usize]
    }

    pub fn children(&self, id: u32) -> &[u32] {
        let slot = self.slot(id);
        let arity = self.arities[self.arena.variable(slot) as usize];
        self.arena.children(slot, arity)
    }

    pub fn child(&self, id: u32, value: usize) -> u32 {
        let children = self.children(id);
        assert!(
            value < children.len(),
            "Value {} is out of range for node @{} with {} children",
            value,
            id,
            children.len()
        );
        children[value]
    }

    pub fn refcount(&self, id: u32) -> u32 {
        self.arena.refcount(self.slot(id))
    }

    /// Return the canonical node `(variable, children)`, owned by the caller.
    pub fn find_or_create(&mut self, variable: u32, children: &[u32]) -> u32 {
        assert_eq!(
            children.len(),
            self.arities[variable as usize],
            "Wrong number of children for variable {}",
            variable
        );

        let first = children[0];
        if children.iter().all(|&c| c == first) {
            self.retain(first);
            return first;
        }

        for &c in children {
            assert!(
                self.is_leaf(c) || self.variable(c) > variable,
                "Child @{} does not come after variable {}",
                c,
                variable
            );
        }

        if let Some(id) = self.table.lookup(&self.arena, self.offset(), variable, children) {
            self.retain(id);
            return id;
        }

        if self.table.needs_resize() {
            let offset = self.offset();
            self.table.grow(&self.arena, &self.arities, offset);
        }

        let slot = self.arena.allocate();
        self.arena.write(slot, variable, 1, children);
        for &c in children {
            self.retain(c);
        }
        let id = slot + self.leaf_count;
        self.table.insert(id, variable, children);
        trace!("store: new node @{} = {} -> {:?}", id, variable, children);
        id
    }

    pub fn retain(&mut self, id: u32) {
        if self.is_leaf(id) {
            return;
        }
        let slot = self.slot(id);
        let rc = self.arena.refcount(slot);
        self.arena.set_refcount(slot, rc + 1);
    }

    /// Drop one reference; nodes reaching zero are unregistered and their children released in turn.
    pub fn release(&mut self, id: u32) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if self.is_leaf(id) {
                continue;
            }
            let slot = self.slot(id);
            let rc = self.arena.refcount(slot);
            if rc > 1 {
                self.arena.set_refcount(slot, rc - 1);
                continue;
            }

            let variable = self.arena.variable(slot);
            let children = self.arena.children(slot, self.arities[variable as usize]).to_vec();
            self.table.remove(id, variable, &children);
            self.arena.release_slot(slot);
            trace!("store: freed node @{}", id);
            pending.extend(children);
        }
    }

    /// Iterate over all live node IDs.
    pub fn live_nodes(&self) -> impl Iterator<Item = u32> + '_ {
        self.arena.live_slots().map(move |slot| slot + self.leaf_count)
    }
}
