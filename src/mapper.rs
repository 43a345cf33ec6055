//! Rebuilding diagrams of one manager inside another.

use std::collections::HashMap;

use log::debug;

use crate::error::{MddError, Result};
use crate::flexible::FlexibleOperator;
use crate::manager::MddManager;
use crate::operator::MddOperator;
use crate::ops::{overwrite, And};
use crate::paths::PathSearcher;
use crate::reference::NodeId;
use crate::types::Var;

/// Copies diagrams from `source` into `target`.
///
/// Every source variable at position `i` is mapped to the target variable at
/// `position_map[i]`, or at position `i` if the map has no entry for it.
pub struct MddMapper<'a> {
    source: &'a MddManager,
    target: &'a MddManager,
    position_map: HashMap<usize, usize>,
    overwrite: FlexibleOperator,
}

impl<'a> MddMapper<'a> {
    pub fn new(source: &'a MddManager, target: &'a MddManager, position_map: HashMap<usize, usize>) -> Self {
        Self {
            source,
            target,
            position_map,
            overwrite: overwrite(),
        }
    }

    /// Map every source variable to the target variable with the same key.
    pub fn by_keys(source: &'a MddManager, target: &'a MddManager) -> Result<Self> {
        let position_map = source
            .variables()
            .iter()
            .map(|v| -> Result<(usize, usize)> { Ok((v.order.index(), target.var_by_key(&v.key)?.index())) })
            .collect::<Result<_>>()?;
        Ok(Self::new(source, target, position_map))
    }

    fn target_var(&self, position: usize) -> Result<Var> {
        let index = self.position_map.get(&position).copied().unwrap_or(position);
        if index >= self.target.variables().len() {
            return Err(MddError::UnknownVariable(format!("#{}", index)));
        }
        Ok(Var::new(index as u32))
    }

    /// Build in the target manager the function `node` of the source manager.
    ///
    /// Assignments reaching leaf `0` in the source reach leaf `0` in the result.
    /// A reachable source leaf missing from the target is reported as [`MddError::UnknownLeaf`].
    pub fn map(&self, node: NodeId) -> Result<NodeId> {
        debug!("map(node = {})", node);
        let target = self.target;
        let mut result = target.leaf(0);
        let max_leaf = self.source.leaf_count() - 1;
        for path in PathSearcher::new(self.source).with_leaf_range(1, max_leaf).paths(node) {
            let branch = match self.branch(&path.values, path.leaf.get()) {
                Ok(branch) => branch,
                Err(e) => {
                    target.release(result);
                    return Err(e);
                }
            };
            let next = self.overwrite.combine(target, result, branch);
            target.release(branch);
            target.release(result);
            result = next;
        }
        Ok(result)
    }

    /// Conjunction of the fixed values of `path`, leading to leaf `value`.
    fn branch(&self, path: &[i32], value: u32) -> Result<NodeId> {
        let target = self.target;
        let leaves = target.leaf_count();
        if value >= leaves {
            return Err(MddError::UnknownLeaf { leaf: value, leaves });
        }
        let mut branch = target.leaf(value);
        for (position, &v) in path.iter().enumerate() {
            if v < 0 {
                continue;
            }
            let step = self
                .target_var(position)
                .and_then(|var| target.node_for_value(var, v as usize, target.leaf(value)));
            let step = match step {
                Ok(step) => step,
                Err(e) => {
                    target.release(branch);
                    return Err(e);
                }
            };
            let next = And.combine(target, branch, step);
            target.release(branch);
            target.release(step);
            branch = next;
        }
        Ok(branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::compare::comparator;
    use crate::ops::Or;
    use crate::view::OrderedView;

    #[test]
    fn test_map_identity() {
        let source = MddManager::builder()
            .variables(["a", "b", "c"], 2)
            .leaves(3)
            .build()
            .unwrap();
        let target = MddManager::builder()
            .variables(["a", "b", "c"], 2)
            .leaves(3)
            .build()
            .unwrap();

        // a ? 2 : (c ? 1 : 0)
        let c = source.make_bool_node(Var::new(2), source.leaf(0), source.leaf(1));
        let f = source.make_bool_node(Var::new(0), c, source.leaf(2));

        let mapper = MddMapper::new(&source, &target, HashMap::new());
        let g = mapper.map(f).unwrap();
        assert_eq!(target.variable_of(g), Var::new(0));
        assert_eq!(target.child(g, 1), target.leaf(2));
        let g0 = target.child(g, 0);
        assert_eq!(target.children(g0), vec![target.leaf(0), target.leaf(1)]);
        assert!(comparator(&source, &target).similar(f, g));

        assert_eq!(mapper.map(source.leaf(0)).unwrap(), target.leaf(0));
        let leaf = mapper.map(source.leaf(2)).unwrap();
        assert_eq!(leaf, target.leaf(2));

        target.release(g);
        assert_eq!(target.node_count(), 0);
        source.release(c);
        source.release(f);
    }

    #[test]
    fn test_map_by_keys() {
        let source = MddManager::builder().variables(["a", "b"], 2).build().unwrap();
        let target = MddManager::builder().variables(["x", "b", "a"], 2).build().unwrap();

        let a = source.make_bool_node(Var::new(0), source.leaf(0), source.leaf(1));
        let b = source.make_bool_node(Var::new(1), source.leaf(0), source.leaf(1));
        let f = Or.combine(&source, a, b);

        let mapper = MddMapper::by_keys(&source, &target).unwrap();
        let g = mapper.map(f).unwrap();
        assert_eq!(target.variable_of(g), Var::new(1));
        assert_eq!(target.reach(g, &[0, 0, 1]), target.leaf(1));
        assert_eq!(target.reach(g, &[1, 0, 0]), target.leaf(0));
        assert!(comparator(&source, &target).similar(f, g));

        let missing = MddManager::builder().variables(["a"], 2).build().unwrap();
        assert_eq!(
            MddMapper::by_keys(&source, &missing).err(),
            Some(MddError::UnknownVariable("b".to_string()))
        );

        target.release(g);
        assert_eq!(target.node_count(), 0);
        for n in [a, b, f] {
            source.release(n);
        }
    }

    #[test]
    fn test_map_domain_mismatch() {
        let source = MddManager::builder().variable("m", 3).build().unwrap();
        let target = MddManager::builder().variable("m", 2).build().unwrap();
        let f = source.make_node(Var::new(0), &[source.leaf(0), source.leaf(0), source.leaf(1)]);

        let mapper = MddMapper::new(&source, &target, HashMap::new());
        assert!(matches!(mapper.map(f), Err(MddError::InvalidRange { .. })));
        assert_eq!(target.node_count(), 0);
        source.release(f);
    }

    #[test]
    fn test_map_missing_leaf() {
        let source = MddManager::builder()
            .variables(["a", "b"], 2)
            .leaves(3)
            .build()
            .unwrap();
        let target = MddManager::builder().variables(["a", "b"], 2).build().unwrap();
        let mapper = MddMapper::new(&source, &target, HashMap::new());

        // b ? 1 : 0 maps fine, only leaves shared by both stores are reached.
        let b = source.make_bool_node(Var::new(1), source.leaf(0), source.leaf(1));
        let g = mapper.map(b).unwrap();
        assert_eq!(target.node_count(), 1);
        target.release(g);

        // a ? 2 : b, the branch to leaf 2 comes after a mapped one.
        let f = source.make_bool_node(Var::new(0), b, source.leaf(2));
        assert_eq!(
            mapper.map(f),
            Err(MddError::UnknownLeaf { leaf: 2, leaves: 2 })
        );
        assert_eq!(target.node_count(), 0);

        source.release(b);
        source.release(f);
        assert_eq!(source.node_count(), 0);
    }
}
