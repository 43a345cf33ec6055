//! The MDD manager: variables, leaves, and canonical node construction.
//!
//! All diagrams live inside an [`MddManager`]. Nodes are identified by [`NodeId`] handles and
//! are reference-counted: every function returning a `NodeId` hands one reference to the caller,
//! which must eventually be given back with [`MddManager::release`].
//!
//! ```
//! use mdd_rs::manager::MddManager;
//!
//! let ddm = MddManager::builder()
//!     .variable("a", 2)
//!     .variable("b", 3)
//!     .leaves(2)
//!     .build()
//!     .unwrap();
//! let a = ddm.var_by_key("a").unwrap();
//! let b = ddm.var_by_key("b").unwrap();
//!
//! // b == 2 => 1
//! let nb = ddm.make_node(b, &[ddm.leaf(0), ddm.leaf(0), ddm.leaf(1)]);
//! // a ? nb : 0
//! let f = ddm.make_node(a, &[ddm.leaf(0), nb]);
//! ddm.release(nb);
//! assert_eq!(ddm.node_count(), 2);
//!
//! ddm.release(f);
//! assert_eq!(ddm.node_count(), 0);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;

use log::debug;

use crate::config::MddConfig;
use crate::error::{MddError, Result};
use crate::reference::NodeId;
use crate::storage::NodeStore;
use crate::types::{Var, Variable};

pub struct MddManager {
    variables: Vec<Variable>,
    keys: HashMap<String, Var>,
    store: RefCell<NodeStore>,
}

/// Collects the variables and leaf count of a new [`MddManager`].
#[derive(Debug, Clone)]
pub struct MddManagerBuilder {
    variables: Vec<(String, String, usize)>,
    leaves: usize,
    config: MddConfig,
}

impl MddManagerBuilder {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            leaves: 2,
            config: MddConfig::default(),
        }
    }

    /// Append a variable named after its key.
    pub fn variable(self, key: impl Into<String>, nbval: usize) -> Self {
        let key = key.into();
        let name = key.clone();
        self.named_variable(key, name, nbval)
    }

    pub fn named_variable(mut self, key: impl Into<String>, name: impl Into<String>, nbval: usize) -> Self {
        self.variables.push((key.into(), name.into(), nbval));
        self
    }

    /// Append several variables sharing the same domain size.
    pub fn variables<K: Into<String>>(self, keys: impl IntoIterator<Item = K>, nbval: usize) -> Self {
        keys.into_iter().fold(self, |builder, key| builder.variable(key, nbval))
    }

    /// Number of leaves (terminal values). Defaults to 2.
    pub fn leaves(mut self, leaves: usize) -> Self {
        self.leaves = leaves;
        self
    }

    pub fn config(mut self, config: MddConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<MddManager> {
        if self.leaves == 0 || self.leaves > u32::MAX as usize / 2 {
            return Err(MddError::InvalidLeafCount);
        }

        let mut variables = Vec::with_capacity(self.variables.len());
        let mut keys = HashMap::with_capacity(self.variables.len());
        for (key, name, nbval) in self.variables {
            let nbval = check_domain(&key, nbval)?;
            let order = Var::new(variables.len() as u32);
            if keys.insert(key.clone(), order).is_some() {
                return Err(MddError::DuplicateVariable(key));
            }
            variables.push(Variable { key, name, nbval, order });
        }

        let max_nbval = variables.iter().map(|v| v.nbval as usize).max().unwrap_or(2);
        let arities = variables.iter().map(|v| v.nbval as usize).collect();
        let store = NodeStore::new(self.leaves as u32, arities, max_nbval + 2, &self.config);

        debug!(
            "new manager: {} variables, {} leaves, bloc size {}",
            variables.len(),
            self.leaves,
            max_nbval + 2
        );

        Ok(MddManager {
            variables,
            keys,
            store: RefCell::new(store),
        })
    }
}

impl Default for MddManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_domain(key: &str, nbval: usize) -> Result<u8> {
    if (2..=u8::MAX as usize).contains(&nbval) {
        Ok(nbval as u8)
    } else {
        Err(MddError::InvalidDomain {
            key: key.to_string(),
            nbval,
        })
    }
}

impl Debug for MddManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.store.borrow();
        f.debug_struct("MddManager")
            .field("variables", &self.variables.len())
            .field("leaves", &store.leaf_count())
            .field("nodes", &store.node_count())
            .finish()
    }
}

impl MddManager {
    pub fn builder() -> MddManagerBuilder {
        MddManagerBuilder::new()
    }

    pub fn leaf_count(&self) -> u32 {
        self.store.borrow().leaf_count()
    }

    /// The leaf with the given value.
    pub fn leaf(&self, value: u32) -> NodeId {
        assert!(
            value < self.leaf_count(),
            "Leaf {} is out of range (the store has {} leaves)",
            value,
            self.leaf_count()
        );
        NodeId::new(value)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.store.borrow().node_count()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: Var) -> &Variable {
        &self.variables[var.index()]
    }

    pub fn variable_for_key(&self, key: &str) -> Option<Var> {
        self.keys.get(key).copied()
    }

    /// Like [`variable_for_key`][Self::variable_for_key], reporting a missing key as an error.
    pub fn var_by_key(&self, key: &str) -> Result<Var> {
        self.variable_for_key(key)
            .ok_or_else(|| MddError::UnknownVariable(key.to_string()))
    }

    pub fn nbval(&self, var: Var) -> usize {
        self.variables[var.index()].nbval as usize
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.store.borrow().is_leaf(node.get())
    }

    /// Check whether `node` is a leaf or a live node.
    pub fn is_valid(&self, node: NodeId) -> bool {
        self.store.borrow().is_valid(node.get())
    }

    /// Variable tested by `node`, or `None` for leaves.
    pub fn node_variable(&self, node: NodeId) -> Option<Var> {
        let store = self.store.borrow();
        if store.is_leaf(node.get()) {
            None
        } else {
            Some(Var::new(store.variable(node.get())))
        }
    }

    /// Variable tested by `node`, which must not be a leaf.
    pub fn variable_of(&self, node: NodeId) -> Var {
        Var::new(self.store.borrow().variable(node.get()))
    }

    /// Child reached from `node` when its variable takes `value`.
    pub fn child(&self, node: NodeId, value: usize) -> NodeId {
        NodeId::new(self.store.borrow().child(node.get(), value))
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.store
            .borrow()
            .children(node.get())
            .iter()
            .map(|&c| NodeId::new(c))
            .collect()
    }

    pub fn refcount(&self, node: NodeId) -> u32 {
        self.store.borrow().refcount(node.get())
    }

    fn check_var(&self, var: Var) {
        assert!(
            var.index() < self.variables.len(),
            "Variable {} is out of range ({} variables)",
            var,
            self.variables.len()
        );
    }

    /// Return the canonical node testing `var` with the given children.
    ///
    /// If all children are equal, that child is returned instead.
    /// The result is owned by the caller; the children are not consumed.
    pub fn make_node(&self, var: Var, children: &[NodeId]) -> NodeId {
        debug!("mk(var = {}, children = {:?})", var, children);
        self.check_var(var);
        let raw: Vec<u32> = children.iter().map(|c| c.get()).collect();
        NodeId::new(self.store.borrow_mut().find_or_create(var.id(), &raw))
    }

    /// [`make_node`][Self::make_node] for two-valued variables.
    pub fn make_bool_node(&self, var: Var, low: NodeId, high: NodeId) -> NodeId {
        debug!("mk(var = {}, low = {}, high = {})", var, low, high);
        self.check_var(var);
        if low == high {
            debug!("mk: duplicates {} == {}", low, high);
            self.retain(low);
            return low;
        }
        NodeId::new(self.store.borrow_mut().find_or_create(var.id(), &[low.get(), high.get()]))
    }

    /// Like [`make_node`][Self::make_node], but also releases every given child.
    pub fn make_node_consuming(&self, var: Var, children: &[NodeId]) -> NodeId {
        let node = self.make_node(var, children);
        for &child in children {
            self.release(child);
        }
        node
    }

    pub fn retain(&self, node: NodeId) -> NodeId {
        self.store.borrow_mut().retain(node.get());
        node
    }

    /// Drop a reference to `node`, freeing it (and transitively its children) when none remain.
    ///
    /// # Panics
    ///
    /// Panics if `node` was already freed.
    pub fn release(&self, node: NodeId) {
        self.store.borrow_mut().release(node.get());
    }

    /// Rebuild `node` with every leaf `l` replaced by `mapping[l]`.
    pub fn leaf_flip(&self, node: NodeId, mapping: &[u32]) -> NodeId {
        debug!("leaf_flip(node = {}, mapping = {:?})", node, mapping);
        let leaves = self.leaf_count();
        assert_eq!(mapping.len(), leaves as usize, "Leaf mapping must cover every leaf");
        assert!(
            mapping.iter().all(|&l| l < leaves),
            "Leaf mapping targets must be leaves"
        );
        let mut cache = HashMap::new();
        self.leaf_flip_rec(node, mapping, &mut cache)
    }

    fn leaf_flip_rec(&self, node: NodeId, mapping: &[u32], cache: &mut HashMap<NodeId, NodeId>) -> NodeId {
        if self.is_leaf(node) {
            return NodeId::new(mapping[node.index()]);
        }
        if let Some(&res) = cache.get(&node) {
            return self.retain(res);
        }
        let var = self.variable_of(node);
        let children: Vec<NodeId> = self
            .children(node)
            .into_iter()
            .map(|c| self.leaf_flip_rec(c, mapping, cache))
            .collect();
        let res = self.make_node_consuming(var, &children);
        cache.insert(node, res);
        res
    }

    /// Swap leaves 0 and 1, keeping all other leaves.
    pub fn not(&self, node: NodeId) -> NodeId {
        let leaves = self.leaf_count();
        assert!(leaves >= 2, "Negation needs at least two leaves");
        let mapping: Vec<u32> = (0..leaves)
            .map(|l| match l {
                0 => 1,
                1 => 0,
                l => l,
            })
            .collect();
        self.leaf_flip(node, &mapping)
    }

    /// Node of `var` leading to `vtrue` for values in `[start, end]` and to `vfalse` otherwise.
    pub fn simple_node(&self, var: Var, vfalse: NodeId, vtrue: NodeId, start: usize, end: usize) -> Result<NodeId> {
        let nbval = self.nbval(var);
        if start > end || end >= nbval {
            return Err(MddError::InvalidRange { start, end, nbval });
        }
        let children: Vec<NodeId> = (0..nbval)
            .map(|v| if (start..=end).contains(&v) { vtrue } else { vfalse })
            .collect();
        Ok(self.make_node(var, &children))
    }

    /// Node of `var` leading to `leaf` when the variable equals `value`, and to leaf 0 otherwise.
    pub fn node_for_value(&self, var: Var, value: usize, leaf: NodeId) -> Result<NodeId> {
        self.simple_node(var, self.leaf(0), leaf, value, value)
    }

    /// Append new variables after the existing ones.
    ///
    /// Domains larger than the store's node size are not supported.
    pub fn extend_variables<K: Into<String>>(&mut self, variables: impl IntoIterator<Item = (K, usize)>) -> Result<Vec<Var>> {
        let max_arity = self.store.borrow().max_arity();
        let mut added = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (key, nbval) in variables {
            let key: String = key.into();
            let nbval = check_domain(&key, nbval)?;
            if nbval as usize > max_arity {
                return Err(MddError::Unsupported(format!(
                    "domain of '{}' ({}) exceeds the node size of this store ({})",
                    key, nbval, max_arity
                )));
            }
            if self.keys.contains_key(&key) || !seen.insert(key.clone()) {
                return Err(MddError::DuplicateVariable(key));
            }
            added.push((key, nbval));
        }

        let mut vars = Vec::with_capacity(added.len());
        for (key, nbval) in added {
            let order = Var::new(self.variables.len() as u32);
            debug!("extend: new variable {} = '{}' with {} values", order, key, nbval);
            self.store.get_mut().add_variable(nbval as usize);
            self.keys.insert(key.clone(), order);
            self.variables.push(Variable {
                name: key.clone(),
                key,
                nbval,
                order,
            });
            vars.push(order);
        }
        Ok(vars)
    }

    /// Change the domain of an existing variable.
    ///
    /// Only a no-op change is accepted: live nodes would no longer match their variable.
    pub fn set_domain(&mut self, var: Var, nbval: usize) -> Result<()> {
        self.check_var(var);
        let current = self.nbval(var);
        if current == nbval {
            return Ok(());
        }
        Err(MddError::Unsupported(format!(
            "changing the domain of '{}' from {} to {} values",
            self.variables[var.index()].key,
            current,
            nbval
        )))
    }

    /// Iterate over the IDs of all live nodes.
    pub fn live_nodes(&self) -> Vec<NodeId> {
        self.store.borrow().live_nodes().map(NodeId::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn boolean_manager(n: usize, leaves: usize) -> MddManager {
        MddManager::builder()
            .variables((0..n).map(|i| format!("var{}", i)), 2)
            .leaves(leaves)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_validation() {
        let err = MddManager::builder().variable("a", 1).build().unwrap_err();
        assert!(matches!(err, MddError::InvalidDomain { nbval: 1, .. }));

        let err = MddManager::builder().variable("a", 2).leaves(0).build().unwrap_err();
        assert_eq!(err, MddError::InvalidLeafCount);

        let err = MddManager::builder().variable("a", 2).variable("a", 3).build().unwrap_err();
        assert_eq!(err, MddError::DuplicateVariable("a".to_string()));

        let ddm = MddManager::builder().build().unwrap();
        assert_eq!(ddm.variables().len(), 0);
        assert_eq!(ddm.leaf_count(), 2);
    }

    #[test]
    fn test_construction_counts() {
        let ddm = boolean_manager(5, 10);
        let vars: Vec<Var> = ddm.variables().iter().map(|v| v.order).collect();
        let l = |v| ddm.leaf(v);

        let n4 = ddm.make_bool_node(vars[4], l(3), l(7));
        let n2 = ddm.make_bool_node(vars[2], n4, l(5));
        assert_eq!(ddm.node_count(), 2);

        // Same structure again: nothing new.
        let n2b = ddm.make_bool_node(vars[2], n4, l(5));
        assert_eq!(n2, n2b);
        assert_eq!(ddm.node_count(), 2);

        let n0 = ddm.make_node_consuming(vars[0], &[n2, n2b]);
        assert_eq!(n0, n2);
        assert_eq!(ddm.refcount(n2), 1);

        ddm.release(n4);
        assert_eq!(ddm.node_count(), 2);
        ddm.release(n0);
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_reduction_rule_retains() {
        let ddm = boolean_manager(3, 2);
        let x = ddm.make_bool_node(Var::new(2), ddm.leaf(0), ddm.leaf(1));
        let r = ddm.make_node(Var::new(0), &[x, x]);
        assert_eq!(r, x);
        assert_eq!(ddm.refcount(x), 2);
        ddm.release(r);
        ddm.release(x);
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_shared_children_refcount() {
        let ddm = MddManager::builder()
            .variable("a", 3)
            .variable("b", 2)
            .variable("c", 2)
            .build()
            .unwrap();
        let (a, b, c) = (Var::new(0), Var::new(1), Var::new(2));
        let before = ddm.node_count();
        let shared = ddm.make_bool_node(c, ddm.leaf(0), ddm.leaf(1));
        let left = ddm.make_bool_node(b, shared, ddm.leaf(1));
        let right = ddm.make_bool_node(b, ddm.leaf(0), shared);
        let root = ddm.make_node_consuming(a, &[left, right, shared]);
        // Held by left, right and root.
        assert_eq!(ddm.refcount(shared), 3);
        assert_eq!(ddm.refcount(left), 1);
        assert_eq!(ddm.node_count(), before + 4);
        assert_eq!(ddm.refcount(root), 1);
        ddm.release(root);
        assert_eq!(ddm.node_count(), before);
        assert!(!ddm.is_valid(shared));
    }

    #[test]
    fn test_not_involution() {
        let ddm = MddManager::builder()
            .variable("a", 3)
            .variable("b", 2)
            .leaves(4)
            .build()
            .unwrap();
        let b = ddm.make_bool_node(Var::new(1), ddm.leaf(1), ddm.leaf(3));
        let x = ddm.make_node(Var::new(0), &[ddm.leaf(2), b, ddm.leaf(0)]);

        let nx = ddm.not(x);
        assert_ne!(nx, x);
        let nb = ddm.child(nx, 1);
        assert_eq!(ddm.children(nb), vec![ddm.leaf(0), ddm.leaf(3)]);
        assert_eq!(ddm.child(nx, 0), ddm.leaf(2));
        assert_eq!(ddm.child(nx, 2), ddm.leaf(1));

        let nnx = ddm.not(nx);
        assert_eq!(nnx, x);

        for n in [b, x, nx, nnx] {
            ddm.release(n);
        }
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_leaf_flip_can_reduce() {
        let ddm = boolean_manager(2, 3);
        let x = ddm.make_bool_node(Var::new(1), ddm.leaf(1), ddm.leaf(2));
        let y = ddm.leaf_flip(x, &[0, 2, 2]);
        assert_eq!(y, ddm.leaf(2));
        ddm.release(x);
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_simple_node() {
        let ddm = MddManager::builder().variable("a", 4).build().unwrap();
        let a = Var::new(0);
        let n = ddm.simple_node(a, ddm.leaf(0), ddm.leaf(1), 1, 2).unwrap();
        assert_eq!(ddm.children(n), vec![ddm.leaf(0), ddm.leaf(1), ddm.leaf(1), ddm.leaf(0)]);

        let all = ddm.simple_node(a, ddm.leaf(0), ddm.leaf(1), 0, 3).unwrap();
        assert_eq!(all, ddm.leaf(1));

        let err = ddm.simple_node(a, ddm.leaf(0), ddm.leaf(1), 2, 4).unwrap_err();
        assert_eq!(err, MddError::InvalidRange { start: 2, end: 4, nbval: 4 });

        let v = ddm.node_for_value(a, 3, ddm.leaf(1)).unwrap();
        assert_eq!(ddm.child(v, 3), ddm.leaf(1));
        assert_eq!(ddm.child(v, 0), ddm.leaf(0));
        ddm.release(n);
        ddm.release(v);
    }

    #[test]
    fn test_extend_variables() {
        let mut ddm = MddManager::builder().variable("a", 3).build().unwrap();
        let vars = ddm.extend_variables([("b", 2), ("c", 3)]).unwrap();
        assert_eq!(vars, vec![Var::new(1), Var::new(2)]);
        assert_eq!(ddm.var_by_key("c").unwrap(), Var::new(2));

        let err = ddm.extend_variables([("d", 4)]).unwrap_err();
        assert!(matches!(err, MddError::Unsupported(_)));
        let err = ddm.extend_variables([("a", 2)]).unwrap_err();
        assert_eq!(err, MddError::DuplicateVariable("a".to_string()));
        assert_eq!(ddm.variables().len(), 3);

        let n = ddm.make_node(Var::new(2), &[ddm.leaf(0), ddm.leaf(1), ddm.leaf(1)]);
        assert_eq!(ddm.node_variable(n), Some(Var::new(2)));
        ddm.release(n);
    }

    #[test]
    fn test_set_domain_unsupported() {
        let mut ddm = MddManager::builder().variable("a", 3).build().unwrap();
        assert!(ddm.set_domain(Var::new(0), 3).is_ok());
        assert!(matches!(ddm.set_domain(Var::new(0), 4), Err(MddError::Unsupported(_))));
    }

    #[test]
    fn test_unknown_key() {
        let ddm = boolean_manager(2, 2);
        assert_eq!(ddm.var_by_key("nope"), Err(MddError::UnknownVariable("nope".to_string())));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_child_out_of_range() {
        let ddm = boolean_manager(1, 2);
        let x = ddm.make_bool_node(Var::new(0), ddm.leaf(0), ddm.leaf(1));
        ddm.child(x, 2);
    }

    #[test]
    #[should_panic(expected = "not a live node")]
    fn test_double_release() {
        let ddm = boolean_manager(2, 2);
        let x = ddm.make_bool_node(Var::new(0), ddm.leaf(0), ddm.leaf(1));
        let y = ddm.make_bool_node(Var::new(1), ddm.leaf(0), ddm.leaf(1));
        ddm.release(x);
        ddm.release(x);
        ddm.release(y);
    }

    #[test]
    fn test_is_valid() {
        let ddm = boolean_manager(2, 3);
        let x = ddm.make_bool_node(Var::new(0), ddm.leaf(0), ddm.leaf(2));
        assert!(ddm.is_valid(x));
        assert!(ddm.is_valid(ddm.leaf(2)));
        ddm.release(x);
        assert!(!ddm.is_valid(x));
        assert!(!ddm.is_valid(NodeId::new(42)));
    }
}
