//! Alternative variable orders over the same nodes.
//!
//! An [`OrderedView`] exposes the variables of a store in some order, and interprets
//! assignments (as used by [`reach`][OrderedView::reach] and by the path searcher)
//! position by position in that order. The nodes themselves always follow the store order.

use std::collections::HashSet;

use crate::error::{MddError, Result};
use crate::manager::MddManager;
use crate::reference::NodeId;
use crate::types::{Var, Variable};

pub trait OrderedView {
    /// The store holding the nodes.
    fn manager(&self) -> &MddManager;

    /// Number of variables in this order.
    fn variable_count(&self) -> usize;

    /// Store variable at `position` in this order.
    fn variable_at(&self, position: usize) -> Var;

    /// Position of a store variable in this order.
    fn position_of(&self, var: Var) -> usize;

    /// Variables, in the order of this view.
    fn ordered_variables(&self) -> Vec<&Variable> {
        (0..self.variable_count())
            .map(|p| self.manager().variable(self.variable_at(p)))
            .collect()
    }

    fn variable_for_key(&self, key: &str) -> Option<Var> {
        self.manager().variable_for_key(key)
    }

    /// Position in this view of the variable tested by `node`, `None` for leaves.
    fn node_position(&self, node: NodeId) -> Option<usize> {
        self.manager().node_variable(node).map(|v| self.position_of(v))
    }

    /// Follow a full assignment, given by position in this view, down to a leaf.
    fn reach(&self, node: NodeId, values: &[u8]) -> NodeId {
        let ddm = self.manager();
        let mut current = node;
        while let Some(var) = ddm.node_variable(current) {
            current = ddm.child(current, values[self.position_of(var)] as usize);
        }
        current
    }

    /// Follow a partial assignment (`-1` for free variables) given by position in this view.
    ///
    /// Returns the leaf if every completion of the assignment reaches the same one.
    fn group_reach(&self, node: NodeId, path: &[i32]) -> Option<NodeId> {
        let ddm = self.manager();
        let var = match ddm.node_variable(node) {
            None => return Some(node),
            Some(var) => var,
        };
        let value = path[self.position_of(var)];
        if value >= 0 {
            return self.group_reach(ddm.child(node, value as usize), path);
        }
        let mut children = ddm.children(node).into_iter();
        let first = children.next().and_then(|c| self.group_reach(c, path))?;
        for c in children {
            if self.group_reach(c, path) != Some(first) {
                return None;
            }
        }
        Some(first)
    }
}

/// Check whether two views share the same store.
pub fn same_store<A: OrderedView + ?Sized, B: OrderedView + ?Sized>(a: &A, b: &B) -> bool {
    std::ptr::eq(a.manager(), b.manager())
}

impl OrderedView for MddManager {
    fn manager(&self) -> &MddManager {
        self
    }

    fn variable_count(&self) -> usize {
        self.variables().len()
    }

    fn variable_at(&self, position: usize) -> Var {
        self.variables()[position].order
    }

    fn position_of(&self, var: Var) -> usize {
        var.index()
    }
}

/// A store seen through a custom variable order.
#[derive(Debug, Clone)]
pub struct MddView<'a> {
    manager: &'a MddManager,
    /// Store variable at each position.
    order: Vec<Var>,
    /// Position of each store variable.
    positions: Vec<usize>,
}

impl<'a> MddView<'a> {
    /// Create a view listing the store variables by key, in the desired order.
    ///
    /// The keys must be a permutation of the store variables.
    pub fn new<K: AsRef<str>>(manager: &'a MddManager, keys: &[K]) -> Result<Self> {
        let count = manager.variables().len();
        if keys.len() != count {
            return Err(MddError::InvalidOrder(format!(
                "expected {} variables, got {}",
                count,
                keys.len()
            )));
        }

        let mut seen = HashSet::new();
        let mut order = Vec::with_capacity(count);
        let mut positions = vec![0; count];
        for (position, key) in keys.iter().enumerate() {
            let key = key.as_ref();
            let var = manager.var_by_key(key)?;
            if !seen.insert(var) {
                return Err(MddError::InvalidOrder(format!("variable '{}' is listed twice", key)));
            }
            positions[var.index()] = position;
            order.push(var);
        }

        Ok(Self {
            manager,
            order,
            positions,
        })
    }
}

impl OrderedView for MddView<'_> {
    fn manager(&self) -> &MddManager {
        self.manager
    }

    fn variable_count(&self) -> usize {
        self.order.len()
    }

    fn variable_at(&self, position: usize) -> Var {
        self.order[position]
    }

    fn position_of(&self, var: Var) -> usize {
        self.positions[var.index()]
    }
}
