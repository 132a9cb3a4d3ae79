//! The BDD engine: a manager for shared reduced ordered BDDs with
//! complement edges.
//!
//! All operations go through the [`Bdd`] manager. It owns the node arena
//! with its unique table (strong canonicity: one node per distinct
//! `(variable, low, high)` triple), the computed table (memoization for
//! synthesis), the single terminal node, and one canonical edge per
//! declared variable.
//!
//! Every Boolean operator is lowered to the universal if-then-else
//! operator [`apply_ite`][Bdd::apply_ite]:
//!
//! ```text
//! ite(f, g, h) = (f ∧ g) ∨ (¬f ∧ h)
//! ```
//!
//! Canonical form: for a fixed variable order every function has exactly
//! one representation. Stored `high` edges are never complemented; the 0
//! and 1 constants are the two edges into the single terminal node; and
//! negation is a constant-time complement-bit flip on the root edge.
//!
//! # Edge ownership
//!
//! Handles ([`Ref`]) are `Copy`, so reference counting is explicit: every
//! edge returned by an engine operation is owned by the caller, and
//! [`ref_edge`][Bdd::ref_edge] / [`deref_edge`][Bdd::deref_edge] adjust the
//! count for additional copies. [`collect`][Bdd::collect] reclaims nodes
//! whose count dropped to zero. Negation (`-e`) is a value operation and
//! touches no counter.
//!
//! The engine is single-threaded; operations take `&self` through interior
//! mutability and must not be called reentrantly from multiple contexts.

use std::cell::RefCell;
use std::fmt::Debug;
use std::mem;

use log::debug;

use crate::cache::ComputedTable;
use crate::key::OpKey;
use crate::reference::Ref;
use crate::storage::{NodeStorage, TERMINAL_INDEX};
use crate::types::Var;

/// Which cofactor of a variable to take.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Branch {
    Then,
    Else,
}

pub struct Bdd {
    storage: RefCell<NodeStorage>,
    cache: RefCell<ComputedTable>,
    /// Canonical edge per declared variable, 1-indexed; entry 0 holds the
    /// constant one so variable ids index directly.
    vars: Vec<Ref>,
    num_vars: u16,
    unique_size: usize,
    cache_size: usize,
    zero: Ref,
    one: Ref,
}

impl Bdd {
    /// Create an engine with `num_vars` declared variables and the given
    /// unique/computed table sizes (primes recommended).
    ///
    /// The terminal node and the canonical variable edges are materialized
    /// here; the support entries pin their nodes for the engine's lifetime.
    pub fn new(num_vars: u16, unique_size: usize, cache_size: usize) -> Self {
        let storage = NodeStorage::new(unique_size);
        let one = Ref::regular(TERMINAL_INDEX);
        let zero = -one;

        let mut bdd = Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(ComputedTable::new(cache_size)),
            vars: vec![one],
            num_vars,
            unique_size,
            cache_size,
            zero,
            one,
        };

        for i in 1..=num_vars {
            let v = bdd.mk_node(Var::new(i), zero, one);
            bdd.vars.push(v);
        }

        bdd
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(16, 5003, 5003)
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdd")
            .field("num_vars", &self.num_vars)
            .field("unique_size", &self.unique_size)
            .field("cache_size", &self.cache_size)
            .field("num_nodes", &self.num_nodes())
            .finish()
    }
}

// Constants, variables, and node accessors.
impl Bdd {
    pub fn zero(&self) -> Ref {
        self.zero
    }

    pub fn one(&self) -> Ref {
        self.one
    }

    pub fn is_zero(&self, e: Ref) -> bool {
        e == self.zero
    }

    pub fn is_one(&self, e: Ref) -> bool {
        e == self.one
    }

    pub fn is_terminal(&self, e: Ref) -> bool {
        self.is_zero(e) || self.is_one(e)
    }

    pub fn num_vars(&self) -> u16 {
        self.num_vars
    }

    /// Number of live nodes in the unique table, terminal included.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().num_nodes()
    }

    /// The canonical edge for the i-th declared variable (1-indexed).
    pub fn variable(&self, i: u16) -> Ref {
        assert!(
            i >= 1 && i <= self.num_vars,
            "There is no support for variable {}",
            i
        );
        self.vars[i as usize]
    }

    /// Variable at the target node ([`Var::ZERO`] for the terminal).
    pub fn node_var(&self, e: Ref) -> Var {
        self.storage.borrow().variable(e.index())
    }

    /// Stored else-child of the target node, without the complement flip
    /// for `e` itself.
    pub fn node_low(&self, e: Ref) -> Ref {
        self.storage.borrow().low(e.index())
    }

    /// Stored then-child of the target node, without the complement flip
    /// for `e` itself.
    pub fn node_high(&self, e: Ref) -> Ref {
        self.storage.borrow().high(e.index())
    }

    /// Raw variable id of the target node; 0 for the terminal. Used for
    /// ordering decisions where the terminal sorts below every variable and
    /// is skipped explicitly.
    fn var_id(&self, e: Ref) -> u16 {
        self.storage.borrow().variable(e.index()).id()
    }
}

// Reference management.
impl Bdd {
    /// Take an additional owned reference to the edge's target; returns the
    /// edge for convenience. Counters saturate (and pin) at `u16::MAX`.
    pub fn ref_edge(&self, e: Ref) -> Ref {
        self.storage.borrow_mut().inc_ref(e.index());
        e
    }

    /// Release one owned reference to the edge's target. The node becomes
    /// reclaimable once its count reaches zero and a collection pass runs.
    pub fn deref_edge(&self, e: Ref) {
        self.storage.borrow_mut().dec_ref(e.index());
    }

    /// Current reference count of the edge's target node.
    pub fn refs(&self, e: Ref) -> u16 {
        self.storage.borrow().refs(e.index())
    }

    /// Collection pass: flush the computed table (its entries may reference
    /// reclaimed nodes) and sweep every unsaturated refcount-zero node out
    /// of the unique table, cascading child releases. Returns the number of
    /// freed nodes.
    pub fn collect(&self) -> usize {
        debug!("collect()");
        self.cache.borrow_mut().clear();
        self.storage.borrow_mut().collect()
    }

    /// Tear down all tables and reset the engine to its freshly
    /// constructed state. Every previously obtained edge is invalidated.
    pub fn clear(&mut self) {
        debug!("clear()");
        *self = Bdd::new(self.num_vars, self.unique_size, self.cache_size);
    }

    /// Drop every computed-table entry. Purely a performance event: the
    /// cache is advisory and results never depend on it.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Computed-table (hits, misses) counters.
    pub fn cache_stats(&self) -> (usize, usize) {
        let cache = self.cache.borrow();
        (cache.hits(), cache.misses())
    }
}

// Node construction.
impl Bdd {
    /// Lookup-or-create the node `(variable, low, high)` and return an
    /// owned edge to it.
    ///
    /// Restores canonical form on the way: a node with identical children
    /// collapses to that child, and a complemented `high` edge is pushed
    /// onto the returned edge by negating both children.
    pub fn mk_node(&self, variable: Var, low: Ref, high: Ref) -> Ref {
        debug!("mk_node(v = {}, low = {}, high = {})", variable, low, high);

        // Redundancy rule.
        if low == high {
            return self.ref_edge(low);
        }

        // Canonicity: complement bits never appear on stored high edges.
        if high.is_complemented() {
            debug!("mk_node: restoring canonicity");
            return -self.mk_node(variable, -low, -high);
        }

        #[cfg(debug_assertions)]
        {
            let storage = self.storage.borrow();
            for child in [low, high] {
                let v = storage.variable(child.index());
                debug_assert!(
                    v.is_terminal() || variable < v,
                    "Ordering violated: {} above {}",
                    variable,
                    v
                );
            }
        }

        let index = self.storage.borrow_mut().find_or_create(variable, low, high);
        Ref::regular(index)
    }

    /// Shallow cofactors `(else, then)` of `e` with respect to `v`.
    ///
    /// Never builds nodes: if `v` is root-ward of `e`'s variable the edge
    /// does not depend on it and both cofactors are `e`; otherwise they are
    /// the stored children, complemented when `e` itself is.
    pub fn top_cofactors(&self, e: Ref, v: Var) -> (Ref, Ref) {
        if self.is_terminal(e) || v < self.node_var(e) {
            return (e, e);
        }
        debug_assert_eq!(v, self.node_var(e));

        let (low, high) = {
            let storage = self.storage.borrow();
            (storage.low(e.index()), storage.high(e.index()))
        };
        if e.is_complemented() {
            (-low, -high)
        } else {
            (low, high)
        }
    }
}

// Standardization and ITE.
impl Bdd {
    /// Collapse equivalent ITE argument triples to one representative.
    ///
    /// Returns the normalized triple and a flip flag the caller applies by
    /// complementing the final result. After this, `f` and `g` carry
    /// regular edges.
    fn standardize(&self, f: Ref, g: Ref, h: Ref) -> (Ref, Ref, Ref, bool) {
        let (mut f, mut g, mut h) = (f, g, h);
        let one = self.one;
        let zero = self.zero;

        // Identity collapses: at most one fires.
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,G,~F) => ite(F,G,1)
        //   ite(F,~F,H) => ite(F,0,H)
        if f == g {
            g = one;
        } else if f == h {
            h = zero;
        } else if f == -h {
            h = one;
        } else if f == -g {
            g = zero;
        }

        // Symmetric rules: prefer the argument with the root-most variable
        // as f.
        //   ite(F,1,H) == ite(H,1,F)
        //   ite(F,0,H) == ite(~H,0,~F)
        //   ite(F,G,~G) == ite(G,F,~F)
        //   ite(F,G,1) == ite(~G,~F,1)
        //   ite(F,G,0) == ite(G,F,0)
        if g == one {
            if self.var_id(f) > self.var_id(h) {
                mem::swap(&mut f, &mut h);
            }
        } else if g == zero {
            if self.var_id(f) > self.var_id(h) {
                mem::swap(&mut f, &mut h);
                f = -f;
                h = -h;
            }
        } else if g == -h {
            if self.var_id(f) > self.var_id(g) {
                mem::swap(&mut f, &mut g);
                h = -g;
            }
        } else if h == one {
            if self.var_id(f) > self.var_id(g) {
                mem::swap(&mut f, &mut g);
                f = -f;
                g = -g;
            }
        } else if h == zero {
            if self.var_id(f) > self.var_id(g) {
                mem::swap(&mut f, &mut g);
            }
        }

        // Complementary rules: f and g end up regular.
        //   ite(~F,G,H) => ite(F,H,G)
        //   ite(F,~G,H) => ~ite(F,G,~H)
        let mut flip = false;
        if f.is_complemented() {
            mem::swap(&mut g, &mut h);
            f = -f;
        }
        if g.is_complemented() {
            g = -g;
            h = -h;
            flip = !flip;
        }

        (f, g, h, flip)
    }

    /// Terminal cases of the standardized triple.
    ///
    ///   ite(1,G,H) => G
    ///   ite(0,G,H) => H
    ///   ite(F,1,0) => F
    ///   ite(F,G,G) => G
    fn terminal_case(&self, f: Ref, g: Ref, h: Ref) -> Option<Ref> {
        if f == self.one {
            Some(g)
        } else if f == self.zero {
            Some(h)
        } else if h == self.zero && g == self.one {
            Some(f)
        } else if g == h {
            Some(g)
        } else {
            None
        }
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ite(f, g, h) = (f ∧ g) ∨ (¬f ∧ h)
    /// ```
    ///
    /// The arguments are borrowed; the returned edge is owned by the
    /// caller. With both tables effective, each node triple is visited at
    /// most once, bounding the work by O(|f|·|g|·|h|).
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        debug!("apply_ite(f = {}, g = {}, h = {})", f, g, h);

        let (f, g, h, flip) = self.standardize(f, g, h);

        if let Some(res) = self.terminal_case(f, g, h) {
            debug!("terminal: ite({}, {}, {}) -> {}", f, g, h, res);
            return self.ref_edge(if flip { -res } else { res });
        }

        let key = OpKey::Ite(f, g, h);
        if let Some(res) = self.cache.borrow().get(&key) {
            debug!("cache: ite({}, {}, {}) -> {}", f, g, h, res);
            return self.ref_edge(if flip { -res } else { res });
        }

        // Top variable: smallest id among the non-terminal arguments.
        let i = self.var_id(f);
        let j = self.var_id(g);
        let k = self.var_id(h);
        debug_assert_ne!(i, 0);
        let mut m = i;
        if j != 0 {
            m = m.min(j);
        }
        if k != 0 {
            m = m.min(k);
        }
        let v = Var::new(m);

        let (f0, f1) = self.top_cofactors(f, v);
        let (g0, g1) = self.top_cofactors(g, v);
        let (h0, h1) = self.top_cofactors(h, v);

        let t = self.apply_ite(f1, g1, h1);
        let e = self.apply_ite(f0, g0, h0);

        let res = if t == e {
            // Isomorphic branches: no node at v.
            self.deref_edge(e);
            t
        } else {
            let res = self.mk_node(v, e, t);
            self.deref_edge(t);
            self.deref_edge(e);
            res
        };

        self.cache.borrow_mut().insert(key, res);
        debug!("computed: ite({}, {}, {}) -> {}", f, g, h, res);
        if flip {
            -res
        } else {
            res
        }
    }
}

// Boolean operator surface. Everything reduces to ITE; negation is the
// complement bit on the root edge and costs nothing.
impl Bdd {
    /// `¬f`. A value operation: no node is built and no refcount moves.
    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    /// `f ∧ g` = ite(f, g, 0).
    pub fn apply_and(&self, f: Ref, g: Ref) -> Ref {
        self.apply_ite(f, g, self.zero)
    }

    /// `f ∨ g` = ite(f, 1, g).
    pub fn apply_or(&self, f: Ref, g: Ref) -> Ref {
        self.apply_ite(f, self.one, g)
    }

    /// `f ⊕ g` = ite(f, ¬g, g).
    pub fn apply_xor(&self, f: Ref, g: Ref) -> Ref {
        self.apply_ite(f, -g, g)
    }

    /// `¬(f ∧ g)` = ite(f, ¬g, 1).
    pub fn apply_nand(&self, f: Ref, g: Ref) -> Ref {
        self.apply_ite(f, -g, self.one)
    }

    /// `¬(f ∨ g)` = ite(f, 0, ¬g).
    pub fn apply_nor(&self, f: Ref, g: Ref) -> Ref {
        self.apply_ite(f, self.zero, -g)
    }

    /// `f ≡ g` = ite(f, g, ¬g).
    pub fn apply_xnor(&self, f: Ref, g: Ref) -> Ref {
        self.apply_ite(f, g, -g)
    }

    /// `f ∧ ¬g` = ite(f, ¬g, 0).
    pub fn apply_gt(&self, f: Ref, g: Ref) -> Ref {
        self.apply_ite(f, -g, self.zero)
    }

    /// `¬f ∧ g` = ite(f, 0, g).
    pub fn apply_lt(&self, f: Ref, g: Ref) -> Ref {
        self.apply_ite(f, self.zero, g)
    }

    /// `f → g` = ite(f, g, 1).
    pub fn apply_imp(&self, f: Ref, g: Ref) -> Ref {
        self.apply_ite(f, g, self.one)
    }
}

// Cofactors and quantification.
impl Bdd {
    /// Restrict variable `v` in `e` to the given branch.
    ///
    /// Constant time when `v` labels the root or lies root-ward of it;
    /// otherwise the cone below the root is rebuilt with `v` substituted.
    /// The returned edge is owned by the caller.
    pub fn cofactor(&self, e: Ref, v: Var, branch: Branch) -> Ref {
        if self.is_terminal(e) || v < self.node_var(e) {
            // e does not depend on v.
            return self.ref_edge(e);
        }

        if v == self.node_var(e) {
            let child = match branch {
                Branch::Then => self.node_high(e),
                Branch::Else => self.node_low(e),
            };
            // The complement applies to the whole function, children
            // included.
            let child = if e.is_complemented() { -child } else { child };
            return self.ref_edge(child);
        }

        // v lies below the root: rebuild both cones.
        let (low, high) = {
            let storage = self.storage.borrow();
            (storage.low(e.index()), storage.high(e.index()))
        };
        let t = self.cofactor(high, v, branch);
        let e0 = self.cofactor(low, v, branch);

        if t == e0 {
            self.deref_edge(e0);
            return if e.is_complemented() { -t } else { t };
        }

        // Keep the rebuilt high edge regular: a complemented then-branch
        // negates both children and surfaces on the outgoing edge instead.
        let complemented = e.is_complemented() ^ t.is_complemented();
        let (high2, low2) = if t.is_complemented() { (-t, -e0) } else { (t, e0) };
        let res = self.mk_node(self.node_var(e), low2, high2);
        self.deref_edge(t);
        self.deref_edge(e0);
        if complemented {
            -res
        } else {
            res
        }
    }

    /// Existential quantification: `∃v. e = e|_{v=0} ∨ e|_{v=1}`.
    ///
    /// The returned edge is owned by the caller.
    pub fn exist(&self, e: Ref, v: Var) -> Ref {
        debug!("exist({}, {})", e, v);

        if self.is_terminal(e) {
            return self.ref_edge(e);
        }
        let u = self.node_var(e);
        if v < u {
            // v is root-ward of the whole cone, so e does not depend on it.
            return self.ref_edge(e);
        }

        let (low, high) = self.top_cofactors(e, u);

        let key = OpKey::Exist(v, e, high, low);
        if let Some(res) = self.cache.borrow().get(&key) {
            debug!("cache: exist({}, {}) -> {}", e, v, res);
            return self.ref_edge(res);
        }

        if u == v {
            let res = self.apply_or(low, high);
            self.cache.borrow_mut().insert(key, res);
            return res;
        }

        let t = self.exist(high, v);
        let e0 = self.exist(low, v);

        let res = if t == e0 {
            self.deref_edge(e0);
            t
        } else {
            // mk_node re-establishes the regular-high invariant.
            let res = self.mk_node(u, e0, t);
            self.deref_edge(t);
            self.deref_edge(e0);
            res
        };

        self.cache.borrow_mut().insert(key, res);
        debug!("computed: exist({}, {}) -> {}", e, v, res);
        res
    }
}

// Traversals.
impl Bdd {
    /// Number of distinct nodes reachable from `e`, terminal included.
    ///
    /// Uses the node mark bits; the paired unmark pass runs before
    /// returning, so marks are clear again afterwards.
    pub fn count_nodes(&self, e: Ref) -> usize {
        let mut storage = self.storage.borrow_mut();
        let mut count = 0;
        Self::count_rec(&mut storage, e.index(), &mut count);
        Self::unmark_rec(&mut storage, e.index());
        count
    }

    fn count_rec(storage: &mut NodeStorage, index: u32, count: &mut usize) {
        if storage.is_marked(index) {
            return;
        }
        storage.set_marked(index, true);
        *count += 1;
        if !storage.is_terminal(index) {
            let (low, high) = (storage.low(index), storage.high(index));
            Self::count_rec(storage, low.index(), count);
            Self::count_rec(storage, high.index(), count);
        }
    }

    fn unmark_rec(storage: &mut NodeStorage, index: u32) {
        if !storage.is_marked(index) {
            return;
        }
        storage.set_marked(index, false);
        if !storage.is_terminal(index) {
            let (low, high) = (storage.low(index), storage.high(index));
            Self::unmark_rec(storage, low.index());
            Self::unmark_rec(storage, high.index());
        }
    }

    /// Indices of all nodes reachable from the given roots, in post-order
    /// (children before parents). Marks are cleared before returning.
    pub fn descendants(&self, roots: impl IntoIterator<Item = Ref>) -> Vec<u32> {
        let mut storage = self.storage.borrow_mut();
        let roots: Vec<u32> = roots.into_iter().map(|r| r.index()).collect();
        let mut result = Vec::new();
        for &root in &roots {
            Self::visit_rec(&mut storage, root, &mut result);
        }
        for &root in &roots {
            Self::unmark_rec(&mut storage, root);
        }
        result
    }

    fn visit_rec(storage: &mut NodeStorage, index: u32, result: &mut Vec<u32>) {
        if storage.is_marked(index) {
            return;
        }
        storage.set_marked(index, true);
        if !storage.is_terminal(index) {
            let (low, high) = (storage.low(index), storage.high(index));
            Self::visit_rec(storage, low.index(), result);
            Self::visit_rec(storage, high.index(), result);
        }
        result.push(index);
    }

    /// Render the function as a nested bracket string, for diagnostics.
    pub fn to_bracket_string(&self, e: Ref) -> String {
        if self.is_zero(e) {
            return format!("{}:(0)", e);
        } else if self.is_one(e) {
            return format!("{}:(1)", e);
        }

        let v = self.node_var(e);
        let low = self.node_low(e);
        let high = self.node_high(e);

        format!(
            "{}:({}, {}, {})",
            e,
            v,
            self.to_bracket_string(high),
            self.to_bracket_string(low)
        )
    }
}

// Structural checks, used by the test suite.
impl Bdd {
    /// Assert the canonical-form invariants for every live node: ordering,
    /// reducedness, regular high edges, unique-table consistency, cleared
    /// marks, and refcounts covering at least the internally stored edges.
    pub fn check_invariants(&self) {
        let storage = self.storage.borrow();
        let max_index = storage.indices().max().unwrap_or(1) as usize;
        let mut internal_refs = vec![0u32; max_index + 1];

        for index in storage.indices() {
            if storage.is_terminal(index) {
                continue;
            }
            let node = storage.node(index);

            assert!(!node.marked, "Mark bit left set at node {}", index);
            assert!(
                !node.high.is_complemented(),
                "Complement bit on the high edge of node {}",
                index
            );
            assert_ne!(node.low, node.high, "Redundant node {}", index);

            for child in [node.low, node.high] {
                let ci = child.index();
                assert!(storage.is_occupied(ci), "Dangling child of node {}", index);
                if !storage.is_terminal(ci) {
                    assert!(
                        node.variable < storage.variable(ci),
                        "Ordering violated between node {} and child {}",
                        index,
                        ci
                    );
                }
                internal_refs[ci as usize] += 1;
            }
        }

        for (i, &v) in self.vars.iter().enumerate().skip(1) {
            assert_eq!(
                v.index(),
                self.variable(i as u16).index(),
                "Support entry {} is inconsistent",
                i
            );
            internal_refs[v.index() as usize] += 1;
        }

        for index in storage.indices() {
            if storage.is_terminal(index) {
                continue;
            }
            let node = storage.node(index);
            // Uniqueness: the triple resolves to this very node.
            let mut seen = 0;
            for other in storage.indices() {
                if storage.is_terminal(other) {
                    continue;
                }
                let o = storage.node(other);
                if o.variable == node.variable && o.low == node.low && o.high == node.high {
                    seen += 1;
                }
            }
            assert_eq!(seen, 1, "Duplicate triple for node {}", index);

            if !node.is_saturated() {
                let internal = internal_refs.get(index as usize).copied().unwrap_or(0);
                assert!(
                    u32::from(node.refs) >= internal,
                    "Node {} holds {} refs but {} internal edges point at it",
                    index,
                    node.refs,
                    internal
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_constants() {
        let bdd = Bdd::new(2, 521, 521);
        assert!(bdd.is_one(bdd.one()));
        assert!(bdd.is_zero(bdd.zero()));
        assert_eq!(bdd.zero(), -bdd.one());
        assert!(bdd.is_terminal(bdd.zero()));
        assert_eq!(bdd.count_nodes(bdd.one()), 1);
    }

    #[test]
    fn test_variables_materialized() {
        let bdd = Bdd::new(3, 521, 521);
        for i in 1..=3 {
            let v = bdd.variable(i);
            assert!(!v.is_complemented());
            assert_eq!(bdd.node_var(v), Var::new(i));
            assert_eq!(bdd.node_high(v), bdd.one());
            assert_eq!(bdd.node_low(v), bdd.zero());
        }
        // 3 variable nodes + terminal.
        assert_eq!(bdd.num_nodes(), 4);
    }

    #[test]
    #[should_panic(expected = "There is no support for variable 5")]
    fn test_variable_out_of_range() {
        let bdd = Bdd::new(4, 521, 521);
        bdd.variable(5);
    }

    #[test]
    fn test_mk_node_canonicity() {
        let bdd = Bdd::new(2, 521, 521);
        let b = bdd.variable(2);

        // Identical children collapse.
        assert_eq!(bdd.mk_node(Var::new(1), b, b), b);

        // A complemented high edge moves onto the result.
        let n = bdd.mk_node(Var::new(1), bdd.one(), -b);
        assert!(n.is_complemented());
        assert_eq!(bdd.node_high(n), b);
        assert_eq!(bdd.node_low(n), bdd.zero());

        // Same triple twice yields the same node.
        let m = bdd.mk_node(Var::new(1), bdd.zero(), b);
        assert_eq!(m, -n);

        bdd.check_invariants();
    }

    #[test]
    fn test_apply_ite() {
        let bdd = Bdd::new(8, 521, 521);

        // Terminal cases.
        let g = bdd.variable(2);
        let h = bdd.variable(3);
        assert_eq!(bdd.apply_ite(bdd.one(), g, h), g);
        assert_eq!(bdd.apply_ite(bdd.zero(), g, h), h);

        // Standard triples on non-constant arguments.
        let f = bdd.mk_node(Var::new(1), h, bdd.one());
        assert_eq!(bdd.apply_ite(f, f, h), bdd.apply_or(f, h));
        assert_eq!(bdd.apply_ite(f, g, f), bdd.apply_and(f, g));
        assert_eq!(bdd.apply_ite(f, -g, bdd.one()), -bdd.apply_and(f, g));
        assert_eq!(bdd.apply_ite(f, bdd.zero(), -h), -bdd.apply_or(f, h));

        // Constants in g/h.
        let f = bdd.variable(5);
        assert_eq!(bdd.apply_ite(f, g, g), g);
        assert_eq!(bdd.apply_ite(f, bdd.one(), bdd.zero()), f);
        assert_eq!(bdd.apply_ite(f, bdd.zero(), bdd.one()), -f);

        // General case: all three arguments complemented.
        let f = bdd.variable(6);
        let g = bdd.variable(7);
        let h = bdd.variable(8);
        let expected = bdd.mk_node(bdd.node_var(f), -g, -h);
        assert_eq!(bdd.apply_ite(-f, -g, -h), expected);

        bdd.check_invariants();
    }

    #[test]
    fn test_ite_ground_truth() {
        let bdd = Bdd::new(3, 521, 521);
        let a = bdd.variable(1);
        let b = bdd.variable(2);
        let c = bdd.variable(3);

        let edges = [a, b, c, -a, -b, -c, bdd.zero(), bdd.one()];
        for &f in &edges {
            for &g in &edges {
                for &h in &edges {
                    let ite = bdd.apply_ite(f, g, h);
                    let fg = bdd.apply_and(f, g);
                    let nfh = bdd.apply_and(-f, h);
                    assert_eq!(ite, bdd.apply_or(fg, nfh), "ite({}, {}, {})", f, g, h);
                }
            }
        }
        bdd.check_invariants();
    }

    #[test]
    fn test_top_cofactors() {
        let bdd = Bdd::new(2, 521, 521);
        let a = bdd.variable(1);
        let b = bdd.variable(2);

        assert_eq!(bdd.top_cofactors(a, Var::new(1)), (bdd.zero(), bdd.one()));
        assert_eq!(bdd.top_cofactors(-a, Var::new(1)), (bdd.one(), bdd.zero()));
        // b does not depend on x1.
        assert_eq!(bdd.top_cofactors(b, Var::new(1)), (b, b));
    }

    #[test]
    fn test_cofactor_deep() {
        let bdd = Bdd::new(3, 521, 521);
        let a = bdd.variable(1);
        let b = bdd.variable(2);
        let c = bdd.variable(3);

        // f = a ∧ (b ∨ c); restricting c below the root.
        let bc = bdd.apply_or(b, c);
        let f = bdd.apply_and(a, bc);

        let f_c1 = bdd.cofactor(f, Var::new(3), Branch::Then);
        assert_eq!(f_c1, a);
        let f_c0 = bdd.cofactor(f, Var::new(3), Branch::Else);
        assert_eq!(f_c0, bdd.apply_and(a, b));

        bdd.check_invariants();
    }

    #[test]
    fn test_cofactor_law() {
        let bdd = Bdd::new(3, 521, 521);
        let a = bdd.variable(1);
        let b = bdd.variable(2);
        let c = bdd.variable(3);

        let f = bdd.apply_xor(bdd.apply_and(a, b), c);
        for i in 1..=3 {
            let v = Var::new(i);
            let t = bdd.cofactor(f, v, Branch::Then);
            let e = bdd.cofactor(f, v, Branch::Else);
            let vt = bdd.apply_and(bdd.variable(i), t);
            let ve = bdd.apply_and(-bdd.variable(i), e);
            assert_eq!(f, bdd.apply_or(vt, ve), "cofactor law at x{}", i);
        }
        bdd.check_invariants();
    }

    #[test]
    fn test_exist() {
        let bdd = Bdd::new(3, 521, 521);
        let a = bdd.variable(1);
        let b = bdd.variable(2);
        let c = bdd.variable(3);

        // ∃x1. x1 = 1
        assert_eq!(bdd.exist(a, Var::new(1)), bdd.one());

        // ∃x2. (x1 ∧ x2) = x1
        let ab = bdd.apply_and(a, b);
        assert_eq!(bdd.exist(ab, Var::new(2)), a);

        // Quantifying an absent variable is the identity.
        assert_eq!(bdd.exist(ab, Var::new(3)), ab);

        // ∃v. f == f|v=1 ∨ f|v=0 for a mixed function.
        let f = bdd.apply_xor(ab, bdd.apply_or(-b, c));
        for i in 1..=3 {
            let v = Var::new(i);
            let t = bdd.cofactor(f, v, Branch::Then);
            let e = bdd.cofactor(f, v, Branch::Else);
            assert_eq!(bdd.exist(f, v), bdd.apply_or(t, e), "exist law at x{}", i);
        }
        bdd.check_invariants();
    }

    #[test]
    fn test_refcount_ownership() {
        let bdd = Bdd::new(2, 521, 521);
        let a = bdd.variable(1);
        let b = bdd.variable(2);

        // Support pins the variable nodes.
        assert_eq!(bdd.refs(a), 1);

        let f = bdd.apply_and(a, b);
        // The result root is owned by the returned handle only.
        assert_eq!(bdd.refs(f), 1);
        // b is owned by its support entry and by f's high edge.
        assert_eq!(bdd.refs(b), 2);

        let g = bdd.apply_and(a, b);
        assert_eq!(g, f);
        assert_eq!(bdd.refs(f), 2);

        bdd.deref_edge(g);
        bdd.deref_edge(f);
        assert_eq!(bdd.refs(f), 0);
        bdd.check_invariants();
    }

    #[test]
    fn test_collect_reclaims_dead_nodes() {
        let bdd = Bdd::new(4, 521, 521);
        let a = bdd.variable(1);
        let b = bdd.variable(2);
        let c = bdd.variable(3);

        let ab = bdd.apply_and(a, b);
        let f = bdd.apply_or(ab, c);
        let before = bdd.num_nodes();

        // Nothing is reclaimable while the handles are live.
        assert_eq!(bdd.collect(), 0);
        assert_eq!(bdd.num_nodes(), before);

        bdd.deref_edge(f);
        bdd.deref_edge(ab);
        let freed = bdd.collect();
        assert!(freed > 0);
        assert_eq!(bdd.num_nodes(), before - freed);

        // The support variables survive the sweep.
        for i in 1..=4 {
            assert_eq!(bdd.node_var(bdd.variable(i)), Var::new(i));
        }
        bdd.check_invariants();

        // The same function can be rebuilt afterwards.
        let ab2 = bdd.apply_and(a, b);
        assert_eq!(bdd.count_nodes(ab2), 3);
    }

    #[test]
    fn test_clear_resets_engine() {
        let mut bdd = Bdd::new(3, 521, 521);
        let a = bdd.variable(1);
        let b = bdd.variable(2);
        let _f = bdd.apply_and(a, b);
        assert!(bdd.num_nodes() > 4);

        bdd.clear();
        assert_eq!(bdd.num_nodes(), 4);
        assert_eq!(bdd.num_vars(), 3);
        bdd.check_invariants();
    }

    #[test]
    fn test_bracket_string() {
        let bdd = Bdd::new(2, 521, 521);
        let a = bdd.variable(1);
        assert_eq!(bdd.to_bracket_string(bdd.one()), "@1:(1)");
        let s = bdd.to_bracket_string(a);
        assert!(s.contains("x1"), "unexpected rendering: {}", s);
    }
}
