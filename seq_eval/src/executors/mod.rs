//! Combinational phase of a cycle: every NOT/AND node recomputed from its operands.

use std::sync::Arc;

use seq_circuit::{CircuitGraph, Node, NodeId};

use crate::{backend::BooleanBackend, error::EvalError};

pub mod par;
pub mod seq;

pub use par::CombExecPar;
pub use seq::CombExecSeq;

pub trait CombExec<B: BooleanBackend> {
    /// Replaces the value of every combinational node of `graph`. Values of
    /// primary, constant and register nodes are read, never written.
    fn eval(
        &self,
        backend: &Arc<B>,
        graph: &CircuitGraph,
        values: &mut [B::Bit],
    ) -> Result<(), EvalError>;
}

/// A gate with its operand values resolved.
pub(crate) enum GateTask<T> {
    Not(T),
    And(T, T),
}

impl<T> GateTask<T> {
    pub(crate) fn new(graph: &CircuitGraph, id: NodeId, values: &[T]) -> Result<Self, EvalError>
    where
        T: Clone,
    {
        match *graph.node(id) {
            Node::Not { a } => Ok(GateTask::Not(values[a.0].clone())),
            Node::And { a, b } => Ok(GateTask::And(values[a.0].clone(), values[b.0].clone())),
            node @ (Node::Primary | Node::Const(_) | Node::Register { .. }) => {
                Err(EvalError::NotCombinational {
                    signal: graph.signal(id),
                    kind: node.kind(),
                })
            }
        }
    }

    pub(crate) fn run<B: BooleanBackend<Bit = T>>(self, backend: &B) -> T {
        match self {
            GateTask::Not(a) => backend.not(&a),
            GateTask::And(a, b) => backend.and(&a, &b),
        }
    }
}

/// Evaluates one combinational node in place, reading operands by reference.
pub(crate) fn eval_node<B: BooleanBackend>(
    backend: &B,
    graph: &CircuitGraph,
    id: NodeId,
    values: &[B::Bit],
) -> Result<B::Bit, EvalError> {
    match *graph.node(id) {
        Node::Not { a } => Ok(backend.not(&values[a.0])),
        Node::And { a, b } => Ok(backend.and(&values[a.0], &values[b.0])),
        node @ (Node::Primary | Node::Const(_) | Node::Register { .. }) => {
            Err(EvalError::NotCombinational {
                signal: graph.signal(id),
                kind: node.kind(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use seq_circuit::{GraphBuilder, NodeKind, Signal};

    use super::*;
    use crate::backend::PlainBackend;

    #[test]
    fn sources_are_not_evaluated() {
        // primary 2, register 3 fed by !2
        let mut b = GraphBuilder::new();
        b.add_not(Signal::Net(2), Signal::Net(4)).unwrap();
        b.add_register(Signal::Net(4), Signal::Net(3)).unwrap();
        let graph = b.build(Signal::Net(1)).unwrap();
        let values = vec![false; graph.len()];
        let backend = PlainBackend::new();

        for (n, kind) in [(2, NodeKind::Primary), (3, NodeKind::Register)] {
            let id = graph.lookup(Signal::Net(n)).unwrap();
            let err = eval_node(&backend, &graph, id, &values).unwrap_err();
            assert!(matches!(
                err,
                EvalError::NotCombinational { signal: Signal::Net(s), kind: k } if s == n && k == kind
            ));
            assert!(matches!(
                GateTask::new(&graph, id, &values),
                Err(EvalError::NotCombinational { signal: Signal::Net(s), kind: k }) if s == n && k == kind
            ));
        }

        let not = graph.lookup(Signal::Net(4)).unwrap();
        assert!(eval_node(&backend, &graph, not, &values).unwrap());
        assert!(GateTask::new(&graph, not, &values).unwrap().run(&backend));
    }
}
