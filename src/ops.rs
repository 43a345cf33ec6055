//! Standard operators.
//!
//! Leaves are compared by value: leaf `0` is false, any other leaf is true.
//!
//! - [`And`]: leaf `0` is absorbing, other leaves are neutral.
//! - [`Or`]: non-zero leaves are absorbing, leaf `0` is neutral.
//! - [`Not`]: swaps leaves `0` and `1`.
//! - [`overwrite`]: non-zero leaves of `other` replace the leaves of `first`.

use log::debug;

use crate::flexible::{FlexibleOperator, FlexibleOperatorBuilder, MergeAction};
use crate::manager::MddManager;
use crate::operator::{branch_on, MddOperator};
use crate::reference::NodeId;
use crate::relation::Relation;
use crate::types::Var;

fn is_zero(leaf: NodeId) -> bool {
    leaf.get() == 0
}

#[derive(Debug, Copy, Clone, Default)]
pub struct And;

impl MddOperator for And {
    fn combine_leaves(&self, _ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId {
        if is_zero(first) {
            first
        } else {
            other
        }
    }

    fn combine(&self, ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId {
        debug!("and(first = {}, other = {})", first, other);
        if first == other {
            return ddm.retain(first);
        }
        match ddm.relation(first, other) {
            Relation::LeafLeaf | Relation::LeafNode => {
                if is_zero(first) {
                    first
                } else {
                    ddm.retain(other)
                }
            }
            Relation::NodeLeaf => {
                if is_zero(other) {
                    other
                } else {
                    ddm.retain(first)
                }
            }
            relation => self.recurse(ddm, relation, first, other),
        }
    }

    fn multiple_merge(&self) -> bool {
        true
    }

    fn merge_leaves(&self, _ddm: &MddManager, leaves: &[NodeId]) -> NodeId {
        leaves.iter().copied().find(|&l| is_zero(l)).unwrap_or(leaves[0])
    }

    fn merge_level(&self, ddm: &MddManager, nodes: Vec<NodeId>, leaf_count: usize, var: Var) -> NodeId {
        if let Some(&zero) = nodes[..leaf_count].iter().find(|&&l| is_zero(l)) {
            return zero;
        }
        branch_on(self, ddm, &nodes[leaf_count..], 0, var)
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct Or;

impl MddOperator for Or {
    fn combine_leaves(&self, _ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId {
        if is_zero(first) {
            other
        } else {
            first
        }
    }

    fn combine(&self, ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId {
        debug!("or(first = {}, other = {})", first, other);
        if first == other {
            return ddm.retain(first);
        }
        match ddm.relation(first, other) {
            Relation::LeafLeaf | Relation::LeafNode => {
                if is_zero(first) {
                    ddm.retain(other)
                } else {
                    first
                }
            }
            Relation::NodeLeaf => {
                if is_zero(other) {
                    ddm.retain(first)
                } else {
                    other
                }
            }
            relation => self.recurse(ddm, relation, first, other),
        }
    }

    fn multiple_merge(&self) -> bool {
        true
    }

    fn merge_leaves(&self, _ddm: &MddManager, leaves: &[NodeId]) -> NodeId {
        leaves.iter().copied().find(|&l| !is_zero(l)).unwrap_or(leaves[0])
    }

    fn merge_level(&self, ddm: &MddManager, nodes: Vec<NodeId>, leaf_count: usize, var: Var) -> NodeId {
        if let Some(&one) = nodes[..leaf_count].iter().find(|&&l| !is_zero(l)) {
            return one;
        }
        branch_on(self, ddm, &nodes[leaf_count..], 0, var)
    }
}

/// Negation: swaps leaves `0` and `1` through [`MddManager::not`].
#[derive(Debug, Copy, Clone, Default)]
pub struct Not;

impl Not {
    pub fn apply(&self, ddm: &MddManager, node: NodeId) -> NodeId {
        debug!("not(node = {})", node);
        ddm.not(node)
    }
}

/// Operator where every non-zero leaf of `other` replaces what `first` leads to.
pub fn overwrite() -> FlexibleOperator {
    FlexibleOperatorBuilder::new(MergeAction::Custom)
        .on(Relation::NodeLeaf, MergeAction::Custom)
        .custom(|ddm, _, first, other| {
            if is_zero(other) {
                ddm.retain(first)
            } else {
                other
            }
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn manager() -> MddManager {
        MddManager::builder()
            .variables(["a", "b", "c", "d"], 2)
            .leaves(3)
            .build()
            .unwrap()
    }

    fn var(ddm: &MddManager, i: u32) -> NodeId {
        ddm.make_bool_node(Var::new(i), ddm.leaf(0), ddm.leaf(1))
    }

    #[test]
    fn test_absorbing_leaves() {
        let ddm = manager();
        let x = var(&ddm, 1);
        let zero = ddm.leaf(0);
        let one = ddm.leaf(1);

        assert_eq!(And.combine(&ddm, x, zero), zero);
        assert_eq!(And.combine(&ddm, zero, x), zero);
        assert_eq!(Or.combine(&ddm, x, one), one);
        assert_eq!(Or.combine(&ddm, ddm.leaf(2), x), ddm.leaf(2));

        let same = And.combine(&ddm, x, x);
        assert_eq!(same, x);
        let neutral = Or.combine(&ddm, zero, x);
        assert_eq!(neutral, x);
        assert_eq!(ddm.refcount(x), 3);

        for n in [x, same, neutral] {
            ddm.release(n);
        }
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_and_or_nodes() {
        let ddm = manager();
        let a = var(&ddm, 0);
        let b = var(&ddm, 1);

        let ab = And.combine(&ddm, a, b);
        assert_eq!(ddm.node_variable(ab), Some(Var::new(0)));
        assert_eq!(ddm.child(ab, 0), ddm.leaf(0));
        assert_eq!(ddm.child(ab, 1), b);

        let a_or_b = Or.combine(&ddm, b, a);
        assert_eq!(ddm.child(a_or_b, 0), b);
        assert_eq!(ddm.child(a_or_b, 1), ddm.leaf(1));

        for n in [a, b, ab, a_or_b] {
            ddm.release(n);
        }
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_combine_many_or_matches_fold() {
        let ddm = manager();
        let a = var(&ddm, 0);
        let c = var(&ddm, 2);
        let nb = ddm.make_bool_node(Var::new(1), ddm.leaf(1), ddm.leaf(0));
        let d = var(&ddm, 3);
        let bd = And.combine(&ddm, nb, d);

        let ab = Or.combine(&ddm, a, bd);
        let folded = Or.combine(&ddm, ab, c);
        let merged = Or.combine_many(&ddm, &[a, bd, c]);
        assert_eq!(folded, merged);

        let and_folded = {
            let t = And.combine(&ddm, a, bd);
            let r = And.combine(&ddm, t, c);
            ddm.release(t);
            r
        };
        let and_merged = And.combine_many(&ddm, &[a, bd, c]);
        assert_eq!(and_folded, and_merged);

        assert_eq!(Or.combine_many(&ddm, &[a, ddm.leaf(0), ddm.leaf(1), c]), ddm.leaf(1));
        assert_eq!(And.combine_many(&ddm, &[a, ddm.leaf(1), ddm.leaf(0), c]), ddm.leaf(0));
        let pruned = And.combine_many(&ddm, &[a, ddm.leaf(1), c]);
        let ac = And.combine(&ddm, a, c);
        assert_eq!(pruned, ac);

        for n in [a, c, nb, d, bd, ab, folded, merged, and_folded, and_merged, pruned, ac] {
            ddm.release(n);
        }
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_not() {
        let ddm = manager();
        let a = var(&ddm, 0);
        let b = var(&ddm, 1);
        let ab = And.combine(&ddm, a, b);

        let nab = Not.apply(&ddm, ab);
        let na = Not.apply(&ddm, a);
        let nb = Not.apply(&ddm, b);
        let de_morgan = Or.combine(&ddm, na, nb);
        assert_eq!(nab, de_morgan);

        let back = Not.apply(&ddm, nab);
        assert_eq!(back, ab);

        for n in [a, b, ab, nab, na, nb, de_morgan, back] {
            ddm.release(n);
        }
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_overwrite() {
        let ddm = manager();
        let over = overwrite();
        let a = ddm.make_bool_node(Var::new(0), ddm.leaf(1), ddm.leaf(0));
        let b = ddm.make_bool_node(Var::new(1), ddm.leaf(0), ddm.leaf(2));

        // b = 1 overwrites with 2, otherwise a is kept.
        let r = over.combine(&ddm, a, b);
        let r0 = ddm.child(r, 0);
        let r1 = ddm.child(r, 1);
        assert_eq!(ddm.children(r0), vec![ddm.leaf(1), ddm.leaf(2)]);
        assert_eq!(r1, b);

        // Zero never overwrites.
        let same = over.combine(&ddm, a, ddm.leaf(0));
        assert_eq!(same, a);

        for n in [a, b, r, same] {
            ddm.release(n);
        }
        assert_eq!(ddm.node_count(), 0);
    }
}
