use crate::graph::{CircuitGraph, Node};

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct CircuitStats {
    pub nb_primary: usize,
    pub nb_const: usize,
    pub nb_not: usize,
    pub nb_and: usize,
    pub nb_register: usize,
    /// Number of combinational ranks.
    pub depth: usize,
}

impl CircuitStats {
    pub fn new(graph: &CircuitGraph) -> CircuitStats {
        let mut stats = CircuitStats::default();

        for (_, _, node) in graph.iter() {
            match node {
                Node::Primary => stats.nb_primary += 1,
                Node::Const(_) => stats.nb_const += 1,
                Node::Not { .. } => stats.nb_not += 1,
                Node::And { .. } => stats.nb_and += 1,
                Node::Register { .. } => stats.nb_register += 1,
            }
        }
        stats.depth = graph.levels().len();

        stats
    }

    pub fn nb_nodes(&self) -> usize {
        self.nb_primary + self.nb_const + self.nb_not + self.nb_and + self.nb_register
    }

    /// Backend gate calls per clock cycle: one per NOT/AND, one copy per register.
    pub fn gates_per_cycle(&self) -> usize {
        self.nb_not + self.nb_and + self.nb_register
    }
}
