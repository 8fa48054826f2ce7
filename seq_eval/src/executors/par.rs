use std::sync::Arc;

use ::futures::future::try_join_all;
use itertools::izip;
use log::trace;
use seq_circuit::CircuitGraph;
use tokio::runtime::{Builder, Runtime};

use super::{CombExec, GateTask};
use crate::{backend::BooleanBackend, error::EvalError};

/// Evaluates one topological rank at a time, the gates of a rank concurrently on a
/// multi-threaded runtime. Ranks are barriers: a rank starts once the previous one
/// has been written back.
pub struct CombExecPar {
    rt: Runtime,
}

impl CombExecPar {
    pub fn new(nb_threads: usize) -> Result<Self, EvalError> {
        Ok(Self {
            rt: Builder::new_multi_thread()
                .worker_threads(nb_threads.max(1))
                .build()?,
        })
    }

    pub fn new_boxed(nb_threads: usize) -> Result<Box<Self>, EvalError> {
        Ok(Box::new(Self::new(nb_threads)?))
    }
}

impl<B> CombExec<B> for CombExecPar
where
    B: BooleanBackend + Send + Sync + 'static,
{
    fn eval(
        &self,
        backend: &Arc<B>,
        graph: &CircuitGraph,
        values: &mut [B::Bit],
    ) -> Result<(), EvalError> {
        for (rank, level) in graph.levels().iter().enumerate() {
            trace!("rank {}: {} gates", rank, level.len());

            let tasks = level
                .iter()
                .map(|&id| GateTask::new(graph, id, values))
                .collect::<Result<Vec<_>, _>>()?;

            let handles = tasks.into_iter().map(|task| {
                let backend = Arc::clone(backend);
                self.rt.spawn(async move { task.run(backend.as_ref()) })
            });
            let results = self
                .rt
                .block_on(try_join_all(handles))
                .map_err(|e| EvalError::Join(e.to_string()))?;

            for (id, bit) in izip!(level, results) {
                values[id.0] = bit;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use seq_circuit::{GraphBuilder, Signal};

    use super::*;
    use crate::{backend::PlainBackend, executors::CombExecSeq};

    #[test]
    fn same_values_as_sequential() {
        // a chain and a fan of gates over three primaries
        let mut b = GraphBuilder::new();
        let net = Signal::Net;
        b.add_and(net(2), net(3), net(10)).unwrap();
        b.add_not(net(4), net(11)).unwrap();
        b.add_and(net(10), net(11), net(12)).unwrap();
        b.add_not(net(12), net(13)).unwrap();
        b.add_and(net(13), net(2), net(14)).unwrap();
        b.add_and(net(11), net(3), net(15)).unwrap();
        let graph = b.build(Signal::Net(1)).unwrap();

        let backend = Arc::new(PlainBackend::new());
        let par = CombExecPar::new(4).unwrap();
        for inputs in 0..8u32 {
            let mut seq_values = vec![false; graph.len()];
            for (i, n) in [2u64, 3, 4].into_iter().enumerate() {
                seq_values[graph.lookup(net(n)).unwrap().0] = inputs >> i & 1 == 1;
            }
            let mut par_values = seq_values.clone();

            CombExecSeq::new()
                .eval(&backend, &graph, &mut seq_values)
                .unwrap();
            par.eval(&backend, &graph, &mut par_values).unwrap();
            assert_eq!(seq_values, par_values);
        }
    }
}
