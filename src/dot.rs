//! Graphviz (DOT) rendering of shared BDDs.
//!
//! Conventions: the terminal is a single square labeled `1`; low edges are
//! dotted, and a complement bit on a low or root edge is drawn as an
//! open-circle arrowhead (`odot`). High edges are solid and never carry a
//! complement bit.

use std::collections::BTreeMap;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// Render the named functions into one DOT digraph.
    pub fn to_dot(&self, roots: &[(String, Ref)]) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let target = |e: Ref| -> String {
            if self.is_terminal(e) {
                "terminal".to_string()
            } else {
                format!("n{}", e.index())
            }
        };

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "  node [shape=plaintext];")?;

        writeln!(dot, "  {{ rank=source;")?;
        for (name, _) in roots.iter() {
            writeln!(dot, "    \"{}\";", name)?;
        }
        writeln!(dot, "  }}")?;

        writeln!(dot, "  terminal [label=\"1\", shape=square];")?;
        writeln!(dot, "  node [shape=oval];")?;

        let all_nodes = self.descendants(roots.iter().map(|&(_, root)| root));

        // Interior nodes, one rank per variable.
        let mut levels = BTreeMap::<u16, Vec<u32>>::new();
        for &id in all_nodes.iter() {
            let e = Ref::regular(id);
            if self.is_terminal(e) {
                continue;
            }
            levels.entry(self.node_var(e).id()).or_default().push(id);
        }
        for (var, ids) in levels.iter() {
            writeln!(dot, "  {{ rank=same;")?;
            for &id in ids.iter() {
                writeln!(dot, "    n{} [label=<x<SUB>{}</SUB>>];", id, var)?;
            }
            writeln!(dot, "  }}")?;
        }

        // Child edges.
        for &id in all_nodes.iter() {
            let e = Ref::regular(id);
            if self.is_terminal(e) {
                continue;
            }

            let high = self.node_high(e);
            assert!(!high.is_complemented());
            writeln!(dot, "  n{} -> {};", id, target(high))?;

            let low = self.node_low(e);
            if low.is_complemented() {
                writeln!(dot, "  n{} -> {} [style=dotted, arrowhead=odot];", id, target(low))?;
            } else {
                writeln!(dot, "  n{} -> {} [style=dotted];", id, target(low))?;
            }
        }

        // Root edges.
        for (name, root) in roots.iter() {
            if root.is_complemented() {
                writeln!(dot, "  \"{}\" -> {} [arrowhead=odot];", name, target(*root))?;
            } else {
                writeln!(dot, "  \"{}\" -> {};", name, target(*root))?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
