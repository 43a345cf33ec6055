use std::collections::{HashMap, HashSet};

use num_bigint::BigUint;

use crate::manager::MddManager;
use crate::paths::PathSearcher;
use crate::reference::NodeId;

impl MddManager {
    /// Returns one assignment reaching `leaf`, if any exists.
    ///
    /// The assignment has one entry per variable, `-1` for variables that are not tested.
    pub fn one_sat(&self, node: NodeId, leaf: NodeId) -> Option<Vec<i32>> {
        PathSearcher::new(self)
            .with_leaf(leaf.get())
            .paths(node)
            .next()
            .map(|path| path.values)
    }

    /// Number of complete assignments (over all variables of the store) reaching `leaf`.
    pub fn sat_count(&self, node: NodeId, leaf: NodeId) -> BigUint {
        // prefix[i] = number of assignments of the first i variables
        let mut prefix = Vec::with_capacity(self.variables().len() + 1);
        prefix.push(BigUint::from(1u32));
        for v in self.variables() {
            let next = &prefix[prefix.len() - 1] * u32::from(v.nbval);
            prefix.push(next);
        }

        let mut cache = HashMap::new();
        let count = self._sat_count(node, leaf, &prefix, &mut cache);
        count * &prefix[self.level(node)]
    }

    /// Position of the variable of `node`, or the number of variables for leaves.
    fn level(&self, node: NodeId) -> usize {
        self.node_variable(node)
            .map_or(self.variables().len(), |v| v.index())
    }

    /// Count over the variables from the level of `node` onwards.
    fn _sat_count(
        &self,
        node: NodeId,
        leaf: NodeId,
        prefix: &[BigUint],
        cache: &mut HashMap<NodeId, BigUint>,
    ) -> BigUint {
        if self.is_leaf(node) {
            return if node == leaf { BigUint::from(1u32) } else { BigUint::ZERO };
        }
        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let below = self.variable_of(node).index() + 1;
        let mut count = BigUint::ZERO;
        for child in self.children(node) {
            let sub = self._sat_count(child, leaf, prefix, cache);
            if sub != BigUint::ZERO {
                // Variables skipped between this node and the child are free.
                count += sub * (&prefix[self.level(child)] / &prefix[below]);
            }
        }

        cache.insert(node, count.clone());
        count
    }

    /// Distinct internal nodes of the diagram.
    pub fn nodes_of(&self, node: NodeId) -> HashSet<NodeId> {
        let mut visited = HashSet::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if self.is_leaf(n) || !visited.insert(n) {
                continue;
            }
            stack.extend(self.children(n));
        }
        visited
    }

    /// Number of internal nodes of the diagram.
    pub fn size(&self, node: NodeId) -> usize {
        self.nodes_of(node).len()
    }
}
