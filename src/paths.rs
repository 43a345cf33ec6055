//! Backtracking enumeration of the paths of a diagram.
//!
//! A path is an assignment reaching a leaf, given as one entry per variable (in the order
//! of the [`OrderedView`] used by the searcher), with `-1` for variables not tested along
//! the way.
//!
//! # Example
//!
//! ```
//! use mdd_rs::manager::MddManager;
//! use mdd_rs::paths::PathSearcher;
//! use mdd_rs::types::Var;
//!
//! let ddm = MddManager::builder().variables(["a", "b"], 2).build().unwrap();
//! let b = ddm.make_bool_node(Var::new(1), ddm.leaf(0), ddm.leaf(1));
//! let f = ddm.make_bool_node(Var::new(0), b, ddm.leaf(1));
//!
//! // Paths to leaf 1 only.
//! let paths: Vec<_> = PathSearcher::new(&ddm).with_leaf(1).paths(f).collect();
//! assert_eq!(paths.len(), 2);
//! assert_eq!(paths[0].values, vec![0, 1]);
//! assert_eq!(paths[1].values, vec![1, -1]);
//! ```
//!
//! The searcher keeps an explicit stack of frames, one per node on the current path,
//! so its depth is bounded by the number of variables.

use crate::manager::MddManager;
use crate::reference::NodeId;
use crate::view::OrderedView;

/// Frame on the exploration stack.
#[derive(Debug, Copy, Clone)]
struct StackFrame {
    node: NodeId,
    /// Value currently explored, `-1` before the first one.
    value: i32,
    /// Last value of the current interval (equal to `value` without interval detection).
    max: i32,
}

/// A path found by a [`PathSearcher`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LeafPath {
    pub leaf: NodeId,
    /// Chosen value per variable, `-1` if the variable is free.
    pub values: Vec<i32>,
    /// Upper bound of the chosen interval per variable, `-1` if the variable is free.
    pub max: Vec<i32>,
}

pub struct PathSearcher<'a, V: OrderedView + ?Sized = MddManager> {
    view: &'a V,
    /// Only report leaves within this range.
    filter: Option<(u32, u32)>,
    intervals: bool,
    stack: Vec<StackFrame>,
    /// Leaf root, not reported yet.
    pending_leaf: Option<NodeId>,
}

impl<'a, V: OrderedView + ?Sized> PathSearcher<'a, V> {
    pub fn new(view: &'a V) -> Self {
        Self {
            view,
            filter: None,
            intervals: false,
            stack: Vec::new(),
            pending_leaf: None,
        }
    }

    /// Only report paths to the given leaf.
    pub fn with_leaf(self, leaf: u32) -> Self {
        self.with_leaf_range(leaf, leaf)
    }

    /// Only report paths to leaves within `[min, max]`.
    pub fn with_leaf_range(mut self, min: u32, max: u32) -> Self {
        self.filter = Some((min, max));
        self
    }

    /// Report consecutive values leading to the same child as a single interval.
    pub fn with_intervals(mut self, intervals: bool) -> Self {
        self.intervals = intervals;
        self
    }

    /// Restart the enumeration from `root`.
    pub fn reset(&mut self, root: NodeId) {
        self.stack.clear();
        self.pending_leaf = None;
        if self.view.manager().is_leaf(root) {
            self.pending_leaf = Some(root);
        } else {
            self.stack.push(StackFrame {
                node: root,
                value: -1,
                max: -1,
            });
        }
    }

    fn accepts(&self, leaf: NodeId) -> bool {
        match self.filter {
            None => true,
            Some((min, max)) => (min..=max).contains(&leaf.get()),
        }
    }

    /// Move to the next path and return its leaf, or `None` once all paths were seen.
    pub fn advance(&mut self) -> Option<NodeId> {
        if let Some(leaf) = self.pending_leaf.take() {
            return if self.accepts(leaf) { Some(leaf) } else { None };
        }

        let view = self.view;
        let ddm = view.manager();
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;
            let nbval = ddm.nbval(ddm.variable_of(node)) as i32;
            let value = frame.max + 1;
            if value >= nbval {
                self.stack.pop();
                continue;
            }

            let child = ddm.child(node, value as usize);
            let mut max = value;
            if self.intervals {
                while max + 1 < nbval && ddm.child(node, (max + 1) as usize) == child {
                    max += 1;
                }
            }
            frame.value = value;
            frame.max = max;

            if ddm.is_leaf(child) {
                if self.accepts(child) {
                    return Some(child);
                }
            } else {
                self.stack.push(StackFrame {
                    node: child,
                    value: -1,
                    max: -1,
                });
            }
        }
    }

    /// Write the current path into `values`, one entry per variable of the view.
    pub fn fill_path(&self, values: &mut [i32]) {
        values.fill(-1);
        for frame in &self.stack {
            if let Some(position) = self.view.node_position(frame.node) {
                values[position] = frame.value;
            }
        }
    }

    /// Like [`fill_path`][Self::fill_path], also writing the upper bounds of intervals into `max`.
    pub fn fill_path_with_max(&self, values: &mut [i32], max: &mut [i32]) {
        values.fill(-1);
        max.fill(-1);
        for frame in &self.stack {
            if let Some(position) = self.view.node_position(frame.node) {
                values[position] = frame.value;
                max[position] = frame.max;
            }
        }
    }

    /// Iterate over the paths of `root`.
    pub fn paths(mut self, root: NodeId) -> Self {
        self.reset(root);
        self
    }

    /// Count the paths of `root`.
    pub fn count_paths(&mut self, root: NodeId) -> usize {
        self.reset(root);
        let mut count = 0;
        while self.advance().is_some() {
            count += 1;
        }
        count
    }
}

impl<V: OrderedView + ?Sized> Iterator for PathSearcher<'_, V> {
    type Item = LeafPath;

    fn next(&mut self) -> Option<Self::Item> {
        let leaf = self.advance()?;
        let n = self.view.variable_count();
        let mut values = vec![-1; n];
        let mut max = vec![-1; n];
        self.fill_path_with_max(&mut values, &mut max);
        Some(LeafPath { leaf, values, max })
    }
}
