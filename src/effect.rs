//! Which variables a function depends on, and in which direction.
//!
//! The effect of a variable is found by comparing, at every node testing it,
//! the sub-diagrams reached by consecutive values. Leaves are compared by value:
//! reaching a larger leaf with a larger value of the variable is a positive effect.

use std::collections::HashSet;

use crate::manager::MddManager;
use crate::reference::NodeId;
use crate::relation::Relation;
use crate::types::{Var, VariableEffect};

impl MddManager {
    /// Flag, for every variable, whether some node of the diagram tests it.
    pub fn collect_decision_variables(&self, node: NodeId) -> Vec<bool> {
        let mut flags = vec![false; self.variables().len()];
        let mut visited = HashSet::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let Some(var) = self.node_variable(n) else {
                continue;
            };
            if !visited.insert(n) {
                continue;
            }
            flags[var.index()] = true;
            stack.extend(self.children(n));
        }
        flags
    }

    /// Overall effect of `var` on the function `node`.
    pub fn variable_effect(&self, var: Var, node: NodeId) -> VariableEffect {
        let nbval = self.nbval(var);
        let mut effect = VariableEffect::None;
        let mut visited = HashSet::new();
        let mut compared = HashSet::new();
        self.pivot_nodes(node, var, &mut visited, &mut |ddm: &MddManager, pivot: NodeId| {
            for i in 1..nbval {
                effect = ddm.compare_effect(ddm.child(pivot, i - 1), ddm.child(pivot, i), effect, &mut compared);
            }
        });
        effect
    }

    /// Effect of each step `i -> i + 1` of a multi-valued variable on the function `node`.
    pub fn multivalued_variable_effect(&self, var: Var, node: NodeId) -> Vec<VariableEffect> {
        let nbval = self.nbval(var);
        let mut effects = vec![VariableEffect::None; nbval - 1];
        let mut compared = vec![HashSet::new(); nbval - 1];
        let mut visited = HashSet::new();
        self.pivot_nodes(node, var, &mut visited, &mut |ddm: &MddManager, pivot: NodeId| {
            for (i, (effect, compared)) in effects.iter_mut().zip(compared.iter_mut()).enumerate() {
                let low = ddm.child(pivot, i);
                let high = ddm.child(pivot, i + 1);
                *effect = ddm.compare_effect(low, high, *effect, compared);
            }
        });
        effects
    }

    /// Call `visit` on every distinct node testing `pivot` reachable from `node`.
    fn pivot_nodes(
        &self,
        node: NodeId,
        pivot: Var,
        visited: &mut HashSet<NodeId>,
        visit: &mut dyn FnMut(&MddManager, NodeId),
    ) {
        let Some(var) = self.node_variable(node) else {
            return;
        };
        if var > pivot || !visited.insert(node) {
            return;
        }
        if var == pivot {
            visit(self, node);
        } else {
            for child in self.children(node) {
                self.pivot_nodes(child, pivot, visited, visit);
            }
        }
    }

    /// Merge into `effect` the direction of every change between `low` and `high`.
    fn compare_effect(
        &self,
        low: NodeId,
        high: NodeId,
        effect: VariableEffect,
        compared: &mut HashSet<(NodeId, NodeId)>,
    ) -> VariableEffect {
        if low == high || effect == VariableEffect::Dual || !compared.insert((low, high)) {
            return effect;
        }
        match self.relation(low, high) {
            Relation::LeafLeaf => {
                let step = if low < high {
                    VariableEffect::Positive
                } else {
                    VariableEffect::Negative
                };
                effect.combine(step)
            }
            Relation::LeafNode | Relation::OtherFirst => self
                .children(high)
                .into_iter()
                .fold(effect, |e, c| self.compare_effect(low, c, e, compared)),
            Relation::NodeLeaf | Relation::FirstFirst => self
                .children(low)
                .into_iter()
                .fold(effect, |e, c| self.compare_effect(c, high, e, compared)),
            Relation::SameLevel => self
                .children(low)
                .into_iter()
                .zip(self.children(high))
                .fold(effect, |e, (c1, c2)| self.compare_effect(c1, c2, e, compared)),
        }
    }
}
