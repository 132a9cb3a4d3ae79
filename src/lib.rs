//! # sbdd-rs: shared ROBDDs with complement edges
//!
//! **`sbdd-rs`** is a manager-centric library for **Reduced Ordered Binary
//! Decision Diagrams** shared across many functions (an SBDD), with
//! complement edges and reference-counted collection.
//!
//! ## What is a BDD?
//!
//! A Binary Decision Diagram represents a boolean function as a directed
//! acyclic graph. For a fixed variable ordering the reduced form is
//! **canonical** --- every function has exactly one representation --- so
//! equivalence, satisfiability, and validity checks collapse to edge
//! comparisons.
//!
//! ## Key features
//!
//! - **Manager-centric architecture**: all operations go through the
//!   [`Bdd`][crate::bdd::Bdd] engine, which enforces structural sharing
//!   (one node per distinct triple) and the canonical-form invariants.
//! - **Complement edges**: negation toggles one bit on an edge instead of
//!   copying a subgraph, so `¬f` is O(1) and `f`/`¬f` share every node.
//! - **Universal synthesis**: every boolean operator is lowered to the
//!   ternary `ite(f, g, h) = fg + f'h` operator, backed by triple
//!   standardization and a direct-mapped computed table.
//! - **Reference-counted collection**: nodes carry saturating 16-bit
//!   counters; an explicit sweep reclaims everything unreachable.
//!
//! ## Basic usage
//!
//! ```rust
//! use sbdd_rs::bdd::Bdd;
//!
//! // An engine with 4 variables and prime-sized tables.
//! let bdd = Bdd::new(4, 521, 521);
//!
//! let a = bdd.variable(1);
//! let b = bdd.variable(2);
//!
//! // f = a AND (NOT b)
//! let f = bdd.apply_and(a, bdd.apply_not(b));
//!
//! assert!(!bdd.is_zero(f)); // satisfiable
//! assert!(!bdd.is_one(f));  // not a tautology
//! assert_eq!(bdd.count_nodes(f), 3);
//!
//! // Negation is a complement bit, not a new subgraph.
//! assert_eq!(bdd.apply_not(bdd.apply_not(f)), f);
//! ```
//!
//! ## Core components
//!
//! - **[`bdd`]**: the engine and all synthesis algorithms.
//! - **[`storage`]**: node arena and unique table.
//! - **[`cache`]**: the computed table.
//! - **[`trace`]**: gate-list parser driving realistic workloads.
//! - **[`dot`]**: Graphviz visualization.

pub mod bdd;
pub mod cache;
pub mod dot;
pub mod key;
pub mod node;
pub mod reference;
pub mod storage;
pub mod trace;
pub mod types;
