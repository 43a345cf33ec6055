//! Generic recursive combination of diagrams.
//!
//! An operator only has to describe what happens on leaves. The recursion on nodes,
//! driven by the [`Relation`] of the two operands, is shared by all operators:
//!
//! - `LeafNode` / `OtherFirst`: branch on the variable of `other`, keeping `first` unchanged;
//! - `NodeLeaf` / `FirstFirst`: branch on the variable of `first`, keeping `other` unchanged;
//! - `SameLevel`: branch on the common variable, pairing children value by value.
//!
//! Every result is owned by the caller. No result is cached between calls:
//! hash-consing already makes repeated identical sub-diagrams cheap to compare,
//! but distinct operand pairs are recomputed.

use log::debug;

use crate::manager::MddManager;
use crate::reference::NodeId;
use crate::relation::Relation;
use crate::types::Var;

pub trait MddOperator {
    /// Result of combining two leaves.
    fn combine_leaves(&self, ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId;

    /// Combine two diagrams.
    fn combine(&self, ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId {
        match ddm.relation(first, other) {
            Relation::LeafLeaf => self.combine_leaves(ddm, first, other),
            relation => self.recurse(ddm, relation, first, other),
        }
    }

    /// Branch on the earliest variable of the operands and combine the matching children.
    fn recurse(&self, ddm: &MddManager, relation: Relation, first: NodeId, other: NodeId) -> NodeId {
        let (var, children) = match relation {
            Relation::LeafLeaf => panic!("Cannot recurse on two leaves ({}, {})", first, other),
            Relation::LeafNode | Relation::OtherFirst => {
                let children: Vec<NodeId> = ddm
                    .children(other)
                    .into_iter()
                    .map(|c| self.combine(ddm, first, c))
                    .collect();
                (ddm.variable_of(other), children)
            }
            Relation::NodeLeaf | Relation::FirstFirst => {
                let children: Vec<NodeId> = ddm
                    .children(first)
                    .into_iter()
                    .map(|c| self.combine(ddm, c, other))
                    .collect();
                (ddm.variable_of(first), children)
            }
            Relation::SameLevel => {
                let children: Vec<NodeId> = ddm
                    .children(first)
                    .into_iter()
                    .zip(ddm.children(other))
                    .map(|(c1, c2)| self.combine(ddm, c1, c2))
                    .collect();
                (ddm.variable_of(first), children)
            }
        };
        ddm.make_node_consuming(var, &children)
    }

    /// Whether [`combine_many`][Self::combine_many] may branch on all operands at once.
    ///
    /// This reorders operands, so it is only valid for commutative and associative operators.
    fn multiple_merge(&self) -> bool {
        false
    }

    /// Combine any number of diagrams, from left to right.
    ///
    /// With [`multiple_merge`][Self::multiple_merge], the result matches the pairwise fold only
    /// for Boolean leaves: [`And`][crate::ops::And] and [`Or`][crate::ops::Or] pick the first
    /// absorbing leaf, which may differ from the fold when other leaves are present.
    ///
    /// # Panics
    ///
    /// Panics if `nodes` is empty.
    fn combine_many(&self, ddm: &MddManager, nodes: &[NodeId]) -> NodeId {
        debug!("combine_many(nodes = {:?})", nodes);
        match nodes {
            [] => panic!("Need at least one diagram to combine"),
            &[single] => ddm.retain(single),
            &[first, other] => self.combine(ddm, first, other),
            _ if self.multiple_merge() => self.merge_many(ddm, nodes.to_vec(), 0),
            _ => {
                let mut result = self.combine(ddm, nodes[0], nodes[1]);
                for &node in &nodes[2..] {
                    let next = self.combine(ddm, result, node);
                    ddm.release(result);
                    result = next;
                }
                result
            }
        }
    }

    /// Multi-way merge: `nodes[..leaf_count]` are known to be leaves.
    fn merge_many(&self, ddm: &MddManager, mut nodes: Vec<NodeId>, mut leaf_count: usize) -> NodeId {
        let mut best: Option<Var> = None;
        for i in leaf_count..nodes.len() {
            match ddm.node_variable(nodes[i]) {
                None => {
                    nodes.swap(i, leaf_count);
                    leaf_count += 1;
                }
                Some(var) => best = Some(best.map_or(var, |b| b.min(var))),
            }
        }
        match best {
            None => self.merge_leaves(ddm, &nodes),
            Some(var) => self.merge_level(ddm, nodes, leaf_count, var),
        }
    }

    /// Combine a list made only of leaves.
    fn merge_leaves(&self, ddm: &MddManager, leaves: &[NodeId]) -> NodeId {
        leaves[1..]
            .iter()
            .fold(leaves[0], |acc, &leaf| self.combine_leaves(ddm, acc, leaf))
    }

    /// Branch on `var`, the earliest variable among `nodes[leaf_count..]`.
    fn merge_level(&self, ddm: &MddManager, nodes: Vec<NodeId>, leaf_count: usize, var: Var) -> NodeId {
        branch_on(self, ddm, &nodes, leaf_count, var)
    }
}

/// Default multi-way branching, also used by operators that prune their leaves first.
pub fn branch_on<O: MddOperator + ?Sized>(
    op: &O,
    ddm: &MddManager,
    nodes: &[NodeId],
    leaf_count: usize,
    var: Var,
) -> NodeId {
    let children: Vec<NodeId> = (0..ddm.nbval(var))
        .map(|value| {
            let next: Vec<NodeId> = nodes
                .iter()
                .enumerate()
                .map(|(i, &node)| {
                    if i >= leaf_count && ddm.node_variable(node) == Some(var) {
                        ddm.child(node, value)
                    } else {
                        node
                    }
                })
                .collect();
            op.merge_many(ddm, next, leaf_count)
        })
        .collect();
    ddm.make_node_consuming(var, &children)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    /// Leaf-wise maximum.
    struct Max;

    impl MddOperator for Max {
        fn combine_leaves(&self, _ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId {
            first.max(other)
        }
    }

    /// Same as [`Max`], using multi-way merges.
    struct MultiMax;

    impl MddOperator for MultiMax {
        fn combine_leaves(&self, _ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId {
            first.max(other)
        }

        fn multiple_merge(&self) -> bool {
            true
        }
    }

    fn manager() -> MddManager {
        MddManager::builder()
            .variable("a", 3)
            .variable("b", 2)
            .variable("c", 3)
            .leaves(4)
            .build()
            .unwrap()
    }

    #[test]
    fn test_combine_recurses() {
        let ddm = manager();
        let (a, c) = (Var::new(0), Var::new(2));
        let x = ddm.make_node(a, &[ddm.leaf(0), ddm.leaf(2), ddm.leaf(1)]);
        let y = ddm.make_node(c, &[ddm.leaf(1), ddm.leaf(0), ddm.leaf(2)]);

        let r = Max.combine(&ddm, x, y);
        println!("max({}, {}) = {}", x, y, r);
        assert_eq!(ddm.node_variable(r), Some(a));
        let r0 = ddm.child(r, 0);
        assert_eq!(r0, y);
        assert_eq!(ddm.child(r, 1), ddm.leaf(2));
        let r2 = ddm.child(r, 2);
        assert_eq!(ddm.children(r2), vec![ddm.leaf(1), ddm.leaf(1), ddm.leaf(2)]);

        // Commutes.
        let s = Max.combine(&ddm, y, x);
        assert_eq!(r, s);

        for n in [x, y, r, s] {
            ddm.release(n);
        }
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_combine_same_level() {
        let ddm = manager();
        let b = Var::new(1);
        let x = ddm.make_bool_node(b, ddm.leaf(0), ddm.leaf(2));
        let y = ddm.make_bool_node(b, ddm.leaf(3), ddm.leaf(1));
        let r = Max.combine(&ddm, x, y);
        assert_eq!(ddm.children(r), vec![ddm.leaf(3), ddm.leaf(2)]);
        for n in [x, y, r] {
            ddm.release(n);
        }
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_combine_many_matches_fold() {
        let ddm = manager();
        let (a, b, c) = (Var::new(0), Var::new(1), Var::new(2));
        let x = ddm.make_node(a, &[ddm.leaf(0), ddm.leaf(2), ddm.leaf(1)]);
        let y = ddm.make_node(c, &[ddm.leaf(1), ddm.leaf(0), ddm.leaf(3)]);
        let z = ddm.make_bool_node(b, ddm.leaf(2), ddm.leaf(0));
        let operands = [x, ddm.leaf(1), y, z];

        let folded = Max.combine_many(&ddm, &operands);
        let merged = MultiMax.combine_many(&ddm, &operands);
        assert_eq!(folded, merged);

        let xy = Max.combine(&ddm, x, ddm.leaf(1));
        let xyz = Max.combine(&ddm, xy, y);
        let all = Max.combine(&ddm, xyz, z);
        assert_eq!(all, folded);

        for n in [x, y, z, folded, merged, xy, xyz, all] {
            ddm.release(n);
        }
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_combine_many_small() {
        let ddm = manager();
        let x = ddm.make_bool_node(Var::new(1), ddm.leaf(0), ddm.leaf(2));
        let r = Max.combine_many(&ddm, &[x]);
        assert_eq!(r, x);
        assert_eq!(ddm.refcount(x), 2);
        let leaves = MultiMax.combine_many(&ddm, &[ddm.leaf(1), ddm.leaf(3), ddm.leaf(0)]);
        assert_eq!(leaves, ddm.leaf(3));
        ddm.release(r);
        ddm.release(x);
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    #[should_panic(expected = "at least one")]
    fn test_combine_many_empty() {
        let ddm = manager();
        Max.combine_many(&ddm, &[]);
    }
}
