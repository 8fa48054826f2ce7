use std::sync::Arc;

use seq_circuit::CircuitGraph;

use super::{eval_node, CombExec};
use crate::{backend::BooleanBackend, error::EvalError};

/// Walks the cached topological order on the calling thread.
#[derive(Default, Debug, Clone, Copy)]
pub struct CombExecSeq;

impl CombExecSeq {
    pub fn new() -> Self {
        Self
    }

    pub fn new_boxed() -> Box<Self> {
        Box::new(Self)
    }
}

impl<B: BooleanBackend> CombExec<B> for CombExecSeq {
    fn eval(
        &self,
        backend: &Arc<B>,
        graph: &CircuitGraph,
        values: &mut [B::Bit],
    ) -> Result<(), EvalError> {
        for &id in graph.topological_order() {
            let bit = eval_node(backend.as_ref(), graph, id, values)?;
            values[id.0] = bit;
        }
        Ok(())
    }
}
