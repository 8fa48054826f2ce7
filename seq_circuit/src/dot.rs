//! Graphviz export. Each node is labelled with its signal and gate type.

use std::io::{self, Write};

use crate::graph::{CircuitGraph, Node};

pub fn write_dot<W: Write>(graph: &CircuitGraph, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph G {{")?;
    for (id, signal, node) in graph.iter() {
        let label = match node {
            Node::Primary => signal.to_string(),
            _ => format!("{} t:{}", signal, node.kind()),
        };
        writeln!(out, "  n{} [label=\"{}\"];", id.0, label)?;
    }
    for (from, to) in graph.edges() {
        if let Node::Register { .. } = graph.node(to) {
            writeln!(out, "  n{} -> n{} [style=dashed];", from.0, to.0)?;
        } else {
            writeln!(out, "  n{} -> n{};", from.0, to.0)?;
        }
    }
    writeln!(out, "}}")
}
