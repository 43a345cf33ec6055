//! Comparison of diagrams living in different managers.
//!
//! [`comparator`] picks the cheapest strategy available for a pair of views:
//!
//! - same store: node IDs are canonical, so equal functions have equal IDs;
//! - compatible stores (shared variables have the same domains and relative order):
//!   both diagrams have the same shape, compare them node by node;
//! - otherwise: enumerate the paths of the first diagram and evaluate each in the other.

use std::collections::HashSet;

use log::debug;

use crate::manager::MddManager;
use crate::paths::PathSearcher;
use crate::reference::NodeId;
use crate::view::{same_store, OrderedView};

pub trait MddComparator {
    /// Check whether `first` (from the first view) and `other` (from the other view)
    /// represent the same function.
    fn similar(&self, first: NodeId, other: NodeId) -> bool;
}

/// Pick a comparator suited to the two views.
pub fn comparator<'a, A, B>(first: &'a A, other: &'a B) -> Box<dyn MddComparator + 'a>
where
    A: OrderedView + ?Sized,
    B: OrderedView + ?Sized,
{
    if same_store(first, other) {
        debug!("comparator: same store");
        return Box::new(IdenticalComparator);
    }
    if are_compatible(first.manager(), other.manager()) {
        debug!("comparator: compatible stores");
        return Box::new(CompatibleComparator::new(first.manager(), other.manager()));
    }
    debug!("comparator: path-based");
    Box::new(HeavyComparator::new(first, other))
}

/// Shared variables must have the same domain and appear in the same relative order.
fn are_compatible(first: &MddManager, other: &MddManager) -> bool {
    let mut last = None;
    for v1 in first.variables() {
        let Some(v2) = other.variable_for_key(&v1.key) else {
            continue;
        };
        if other.variable(v2).nbval != v1.nbval {
            return false;
        }
        if last.is_some_and(|o| v2 <= o) {
            return false;
        }
        last = Some(v2);
    }
    true
}

#[derive(Debug, Copy, Clone, Default)]
pub struct IdenticalComparator;

impl MddComparator for IdenticalComparator {
    fn similar(&self, first: NodeId, other: NodeId) -> bool {
        first == other
    }
}

/// Structural comparison between stores with compatible variables.
#[derive(Debug, Clone)]
pub struct CompatibleComparator<'a> {
    first: &'a MddManager,
    other: &'a MddManager,
}

impl<'a> CompatibleComparator<'a> {
    pub fn new(first: &'a MddManager, other: &'a MddManager) -> Self {
        Self { first, other }
    }

    fn similar_rec(&self, n1: NodeId, n2: NodeId, checked: &mut HashSet<(NodeId, NodeId)>) -> bool {
        match (self.first.node_variable(n1), self.other.node_variable(n2)) {
            (None, None) => n1 == n2,
            (Some(v1), Some(v2)) => {
                if !self.first.variable(v1).is_compatible(self.other.variable(v2)) {
                    return false;
                }
                if !checked.insert((n1, n2)) {
                    return true;
                }
                self.first
                    .children(n1)
                    .into_iter()
                    .zip(self.other.children(n2))
                    .all(|(c1, c2)| self.similar_rec(c1, c2, checked))
            }
            _ => false,
        }
    }
}

impl MddComparator for CompatibleComparator<'_> {
    fn similar(&self, first: NodeId, other: NodeId) -> bool {
        self.similar_rec(first, other, &mut HashSet::new())
    }
}

/// Comparison by evaluating every path of the first diagram in the other one.
pub struct HeavyComparator<'a, A: ?Sized, B: ?Sized> {
    first: &'a A,
    other: &'a B,
    /// Position in the other view of each variable of the first view.
    position_map: Vec<Option<usize>>,
}

impl<'a, A, B> HeavyComparator<'a, A, B>
where
    A: OrderedView + ?Sized,
    B: OrderedView + ?Sized,
{
    pub fn new(first: &'a A, other: &'a B) -> Self {
        let position_map = first
            .ordered_variables()
            .into_iter()
            .map(|v1| {
                other
                    .variable_for_key(&v1.key)
                    .filter(|&v2| other.manager().variable(v2).nbval == v1.nbval)
                    .map(|v2| other.position_of(v2))
            })
            .collect();
        Self {
            first,
            other,
            position_map,
        }
    }

    /// Translate a path of the first view, `None` if it fixes a variable unknown to the other.
    fn translate(&self, path: &[i32]) -> Option<Vec<i32>> {
        let mut translated = vec![-1; self.other.variable_count()];
        for (&value, &position) in path.iter().zip(&self.position_map) {
            match position {
                Some(p) => translated[p] = value,
                None if value >= 0 => return None,
                None => {}
            }
        }
        Some(translated)
    }
}

impl<A, B> MddComparator for HeavyComparator<'_, A, B>
where
    A: OrderedView + ?Sized,
    B: OrderedView + ?Sized,
{
    fn similar(&self, first: NodeId, other: NodeId) -> bool {
        PathSearcher::new(self.first).paths(first).all(|path| {
            self.translate(&path.values)
                .is_some_and(|p| self.other.group_reach(other, &p) == Some(path.leaf))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::types::Var;
    use crate::view::MddView;

    fn simple_manager(n: usize) -> MddManager {
        MddManager::builder()
            .variables((0..n).map(|i| format!("var{}", i)), 2)
            .build()
            .unwrap()
    }

    fn example1(ddm: &MddManager) -> NodeId {
        let n1 = ddm.make_bool_node(Var::new(4), ddm.leaf(0), ddm.leaf(1));
        let n2 = ddm.make_bool_node(Var::new(3), ddm.leaf(0), ddm.leaf(0));
        let node = ddm.make_bool_node(Var::new(2), n1, n2);
        ddm.release(n1);
        node
    }

    fn example2(ddm: &MddManager) -> NodeId {
        let n1 = ddm.make_bool_node(Var::new(3), ddm.leaf(0), ddm.leaf(1));
        let n2 = ddm.make_bool_node(Var::new(1), ddm.leaf(0), ddm.leaf(0));
        let node = ddm.make_bool_node(Var::new(2), n1, n2);
        ddm.release(n1);
        node
    }

    #[test]
    fn test_compatible_managers() {
        let ddm1 = simple_manager(5);
        let ddm2 = simple_manager(5);
        let n1 = example1(&ddm1);
        let m1 = example2(&ddm1);
        let m2 = example2(&ddm2);
        let n2 = example1(&ddm2);

        let cmp = comparator(&ddm1, &ddm2);
        assert!(cmp.similar(n1, n2));
        assert!(cmp.similar(m1, m2));
        assert!(!cmp.similar(n1, m2));

        for n in [n1, m1] {
            ddm1.release(n);
        }
        for n in [n2, m2] {
            ddm2.release(n);
        }
        assert_eq!(ddm1.node_count(), 0);
        assert_eq!(ddm2.node_count(), 0);
    }

    #[test]
    fn test_same_store() {
        let ddm = simple_manager(5);
        let n = example1(&ddm);
        let m = example2(&ddm);
        let view = MddView::new(&ddm, &["var4", "var3", "var2", "var1", "var0"]).unwrap();
        let cmp = comparator(&ddm, &view);
        assert!(cmp.similar(n, n));
        assert!(!cmp.similar(n, m));

        ddm.release(n);
        ddm.release(m);
        assert_eq!(ddm.node_count(), 0);
    }

    #[test]
    fn test_incompatible_order() {
        let ddm1 = simple_manager(3);
        let ddm2 = MddManager::builder()
            .variables(["var2", "var1", "var0", "extra"], 2)
            .build()
            .unwrap();
        // var0 & !var2
        let f1 = {
            let n2 = ddm1.make_bool_node(Var::new(2), ddm1.leaf(1), ddm1.leaf(0));
            let f = ddm1.make_bool_node(Var::new(0), ddm1.leaf(0), n2);
            ddm1.release(n2);
            f
        };
        let f2 = {
            let n0 = ddm2.make_bool_node(Var::new(2), ddm2.leaf(0), ddm2.leaf(1));
            let f = ddm2.make_bool_node(Var::new(0), n0, ddm2.leaf(0));
            ddm2.release(n0);
            f
        };
        // var0 & !var2 & extra
        let g2 = {
            let e = ddm2.make_bool_node(Var::new(3), ddm2.leaf(0), ddm2.leaf(1));
            let f = ddm2.make_bool_node(Var::new(2), ddm2.leaf(0), e);
            let g = ddm2.make_bool_node(Var::new(0), f, ddm2.leaf(0));
            ddm2.release(e);
            ddm2.release(f);
            g
        };

        assert!(!are_compatible(&ddm1, &ddm2));
        let cmp = comparator(&ddm1, &ddm2);
        assert!(cmp.similar(f1, f2));
        assert!(!cmp.similar(f1, g2));

        let back = comparator(&ddm2, &ddm1);
        assert!(back.similar(f2, f1));
        assert!(!back.similar(g2, f1));

        ddm1.release(f1);
        ddm2.release(f2);
        ddm2.release(g2);
        assert_eq!(ddm1.node_count(), 0);
        assert_eq!(ddm2.node_count(), 0);
    }
}
