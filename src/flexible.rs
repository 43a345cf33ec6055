//! Operators described by a table of actions, one per [`Relation`].
//!
//! ```
//! use mdd_rs::flexible::{FlexibleOperatorBuilder, MergeAction};
//! use mdd_rs::manager::MddManager;
//! use mdd_rs::operator::MddOperator;
//! use mdd_rs::types::Var;
//!
//! let ddm = MddManager::builder().variables(["a", "b"], 2).leaves(3).build().unwrap();
//! let max = FlexibleOperatorBuilder::new(MergeAction::ReturnMax)
//!     .multiple_merge(true)
//!     .build();
//!
//! let a = ddm.make_bool_node(Var::new(0), ddm.leaf(0), ddm.leaf(2));
//! let b = ddm.make_bool_node(Var::new(1), ddm.leaf(1), ddm.leaf(0));
//! let f = max.combine(&ddm, a, b);
//! assert_eq!(ddm.child(f, 1), ddm.leaf(2));
//! ```

use std::fmt::Debug;

use log::debug;

use crate::manager::MddManager;
use crate::operator::MddOperator;
use crate::reference::NodeId;
use crate::relation::Relation;

/// What to do when two diagrams in a given [`Relation`] are combined.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MergeAction {
    /// Continue with the children.
    Recurse,
    /// Return the first operand.
    ReturnFirst,
    /// Return the other operand.
    ReturnOther,
    /// Return the smaller leaf. Applies to two leaves.
    ReturnMin,
    /// Return the larger leaf. Applies to two leaves.
    ReturnMax,
    /// Ask the callback for the action to perform.
    Ask,
    /// Let the callback compute the result.
    Custom,
}

pub type AskFn = dyn Fn(&MddManager, Relation, NodeId, NodeId) -> MergeAction;

/// Custom callback. It must return an owned result: retain any existing node it returns.
pub type CustomFn = dyn Fn(&MddManager, Relation, NodeId, NodeId) -> NodeId;

/// Mutable description of a [`FlexibleOperator`].
pub struct FlexibleOperatorBuilder {
    actions: [MergeAction; 6],
    ask: Option<Box<AskFn>>,
    custom: Option<Box<CustomFn>>,
    multiple_merge: bool,
}

impl FlexibleOperatorBuilder {
    /// Start from the action applied to two leaves; every other relation recurses.
    pub fn new(leaf_leaf: MergeAction) -> Self {
        let mut actions = [MergeAction::Recurse; 6];
        actions[Relation::LeafLeaf.index()] = leaf_leaf;
        Self {
            actions,
            ask: None,
            custom: None,
            multiple_merge: false,
        }
    }

    pub fn on(mut self, relation: Relation, action: MergeAction) -> Self {
        self.actions[relation.index()] = action;
        self
    }

    pub fn ask(mut self, f: impl Fn(&MddManager, Relation, NodeId, NodeId) -> MergeAction + 'static) -> Self {
        self.ask = Some(Box::new(f));
        self
    }

    pub fn custom(mut self, f: impl Fn(&MddManager, Relation, NodeId, NodeId) -> NodeId + 'static) -> Self {
        self.custom = Some(Box::new(f));
        self
    }

    /// Enable multi-way merges. Only valid for commutative and associative operators.
    pub fn multiple_merge(mut self, enabled: bool) -> Self {
        self.multiple_merge = enabled;
        self
    }

    /// Freeze the table.
    ///
    /// # Panics
    ///
    /// Panics if `Ask` or `Custom` is used without the matching callback,
    /// or if two leaves are set to recurse.
    pub fn build(self) -> FlexibleOperator {
        assert_ne!(
            self.actions[Relation::LeafLeaf.index()],
            MergeAction::Recurse,
            "Two leaves cannot be recursed on"
        );
        let uses = |action| self.actions.contains(&action);
        assert!(
            !uses(MergeAction::Ask) || self.ask.is_some(),
            "Ask action needs an ask callback"
        );
        assert!(
            !uses(MergeAction::Custom) || self.custom.is_some(),
            "Custom action needs a custom callback"
        );
        FlexibleOperator {
            actions: self.actions,
            ask: self.ask,
            custom: self.custom,
            multiple_merge: self.multiple_merge,
        }
    }
}

/// Immutable table-driven operator, created by [`FlexibleOperatorBuilder::build`].
pub struct FlexibleOperator {
    actions: [MergeAction; 6],
    ask: Option<Box<AskFn>>,
    custom: Option<Box<CustomFn>>,
    multiple_merge: bool,
}

impl FlexibleOperator {
    pub fn action(&self, relation: Relation) -> MergeAction {
        self.actions[relation.index()]
    }

    fn apply(&self, ddm: &MddManager, relation: Relation, first: NodeId, other: NodeId) -> NodeId {
        let mut action = self.action(relation);
        if action == MergeAction::Ask {
            if let Some(ask) = &self.ask {
                action = ask(ddm, relation, first, other);
            }
            assert_ne!(action, MergeAction::Ask, "Ask callback must choose a concrete action");
        }
        match action {
            MergeAction::Recurse => self.recurse(ddm, relation, first, other),
            MergeAction::ReturnFirst => ddm.retain(first),
            MergeAction::ReturnOther => ddm.retain(other),
            MergeAction::ReturnMin => ddm.retain(first.min(other)),
            MergeAction::ReturnMax => ddm.retain(first.max(other)),
            MergeAction::Custom => match &self.custom {
                Some(custom) => custom(ddm, relation, first, other),
                None => panic!("Custom action without a custom callback"),
            },
            MergeAction::Ask => unreachable!(),
        }
    }
}

impl Debug for FlexibleOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlexibleOperator")
            .field("actions", &self.actions)
            .field("multiple_merge", &self.multiple_merge)
            .finish()
    }
}

impl MddOperator for FlexibleOperator {
    fn combine_leaves(&self, ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId {
        self.apply(ddm, Relation::LeafLeaf, first, other)
    }

    fn combine(&self, ddm: &MddManager, first: NodeId, other: NodeId) -> NodeId {
        let relation = ddm.relation(first, other);
        debug!("flexible(first = {}, other = {}, relation = {:?})", first, other, relation);
        self.apply(ddm, relation, first, other)
    }

    fn multiple_merge(&self) -> bool {
        self.multiple_merge
    }
}
