use crate::manager::MddManager;
use crate::reference::NodeId;

/// Relative position of two diagrams, as seen by recursive algorithms.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Relation {
    /// Both are leaves.
    LeafLeaf,
    /// The first is a leaf, the other is a node.
    LeafNode,
    /// The first is a node, the other is a leaf.
    NodeLeaf,
    /// Both are nodes of the same variable.
    SameLevel,
    /// Both are nodes; the first tests an earlier variable.
    FirstFirst,
    /// Both are nodes; the other tests an earlier variable.
    OtherFirst,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::LeafLeaf,
        Relation::LeafNode,
        Relation::NodeLeaf,
        Relation::SameLevel,
        Relation::FirstFirst,
        Relation::OtherFirst,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl MddManager {
    /// Classify `first` and `other` according to their kind and variable order.
    pub fn relation(&self, first: NodeId, other: NodeId) -> Relation {
        match (self.node_variable(first), self.node_variable(other)) {
            (None, None) => Relation::LeafLeaf,
            (None, Some(_)) => Relation::LeafNode,
            (Some(_), None) => Relation::NodeLeaf,
            (Some(v1), Some(v2)) if v1 == v2 => Relation::SameLevel,
            (Some(v1), Some(v2)) if v1 < v2 => Relation::FirstFirst,
            (Some(_), Some(_)) => Relation::OtherFirst,
        }
    }
}
