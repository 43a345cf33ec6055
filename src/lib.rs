//! # mdd-rs: Multi-valued Decision Diagrams in Rust
//!
//! **`mdd-rs`** is a manager-centric library for **Multi-valued Decision Diagrams (MDDs)**:
//! decision diagrams whose variables range over small finite domains and whose leaves carry
//! arbitrary small integer values.
//!
//! ## What is an MDD?
//!
//! An MDD represents a function from assignments of finite-domain variables to a finite set of
//! values as a directed acyclic graph. Each internal node tests one variable and has one child
//! per value of that variable. Nodes are **reduced** (a node whose children are all equal is
//! replaced by that child) and **hash-consed** (structurally identical nodes are shared), so for
//! a fixed variable order every function has exactly one representation.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: All diagrams live in an [`MddManager`][crate::manager::MddManager],
//!   which owns the nodes and guarantees canonicity.
//! - **Explicit Reference Counting**: Nodes are handled through [`NodeId`][crate::reference::NodeId]
//!   handles. Every returned handle is owned by the caller and given back with `release`.
//! - **Generic Operators**: An [`MddOperator`][crate::operator::MddOperator] only describes leaves;
//!   recursion on nodes is shared. Operators can also be declared with
//!   [`FlexibleOperatorBuilder`][crate::flexible::FlexibleOperatorBuilder].
//! - **Path Enumeration**: [`PathSearcher`][crate::paths::PathSearcher] lists the assignments reaching
//!   each leaf, optionally grouping consecutive values into intervals.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mdd_rs::manager::MddManager;
//! use mdd_rs::operator::MddOperator;
//! use mdd_rs::ops::{And, Or};
//! use mdd_rs::view::OrderedView;
//!
//! // 1. Declare the variables: two Boolean ones and a three-level one
//! let ddm = MddManager::builder()
//!     .variables(["a", "b"], 2)
//!     .variable("level", 3)
//!     .build()
//!     .unwrap();
//! let a = ddm.var_by_key("a").unwrap();
//! let level = ddm.var_by_key("level").unwrap();
//!
//! // 2. Build simple functions: a, and level >= 1
//! let fa = ddm.make_bool_node(a, ddm.leaf(0), ddm.leaf(1));
//! let fl = ddm.simple_node(level, ddm.leaf(0), ddm.leaf(1), 1, 2).unwrap();
//!
//! // 3. Combine them
//! let f = And.combine(&ddm, fa, fl);
//! let g = Or.combine(&ddm, fa, fl);
//!
//! // 4. Evaluate: a = 1, b = 0, level = 2
//! assert_eq!(ddm.reach(f, &[1, 0, 2]), ddm.leaf(1));
//! assert_eq!(ddm.reach(f, &[1, 0, 0]), ddm.leaf(0));
//! assert_eq!(ddm.reach(g, &[0, 1, 1]), ddm.leaf(1));
//!
//! // 5. Give the nodes back
//! for n in [fa, fl, f, g] {
//!     ddm.release(n);
//! }
//! assert_eq!(ddm.node_count(), 0);
//! ```
//!
//! ## Core Components
//!
//! - **[`manager`]**: The [`MddManager`][crate::manager::MddManager] and node construction.
//! - **[`operator`]**, **[`ops`]**, **[`flexible`]**: Combination of diagrams.
//! - **[`paths`]**: Path enumeration.
//! - **[`effect`]**: Inference of variable effects (monotonicity).
//! - **[`view`]**, **[`compare`]**, **[`mapper`]**: Working across variable orders and managers.
//! - **[`parser`]**: Logical functions from text.
//! - **[`sat`]**: Model counting.

pub mod arena;
pub mod compare;
pub mod config;
pub mod effect;
pub mod error;
pub mod flexible;
pub mod manager;
pub mod mapper;
pub mod operator;
pub mod ops;
pub mod parser;
pub mod paths;
pub mod reference;
pub mod relation;
pub mod sat;
pub mod storage;
pub mod types;
pub mod unique;
pub mod utils;
pub mod view;
