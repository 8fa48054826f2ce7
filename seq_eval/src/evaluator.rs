use std::sync::Arc;

use itertools::izip;
use log::trace;
use num_bigint::BigUint;
use num_traits::Zero;
use seq_circuit::{CircuitGraph, Node, Signal};

use crate::{
    backend::BooleanBackend,
    error::EvalError,
    executors::{CombExec, CombExecSeq},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    EvaluatingCombinational,
    CommittingRegisters,
}

/// Clocks one circuit over one backend.
///
/// A [`step`](Evaluator::step) is a full cycle: every NOT/AND node is recomputed in
/// topological order while registers keep exposing last cycle's value, then every
/// register latches a copy of its data input. Registers therefore show, from the
/// next cycle on, what their input computed this cycle.
pub struct Evaluator<B: BooleanBackend> {
    graph: CircuitGraph,
    backend: Arc<B>,
    exec: Box<dyn CombExec<B>>,
    values: Vec<B::Bit>,
    phase: Phase,
    cycle: u64,
}

impl<B: BooleanBackend> Evaluator<B> {
    pub fn new(graph: CircuitGraph, backend: B) -> Self {
        Self::with_exec(graph, backend, CombExecSeq::new_boxed())
    }

    pub fn with_exec(graph: CircuitGraph, backend: B, exec: Box<dyn CombExec<B>>) -> Self {
        let mut evaluator = Self {
            graph,
            backend: Arc::new(backend),
            exec,
            values: Vec::new(),
            phase: Phase::Idle,
            cycle: 0,
        };
        evaluator.reset();
        evaluator
    }

    /// Every node back to false, constants to their value. The graph is kept.
    pub fn reset(&mut self) {
        let backend = self.backend.as_ref();
        self.values = self
            .graph
            .iter()
            .map(|(_, _, node)| match node {
                Node::Const(true) => backend.one(),
                _ => backend.zero(),
            })
            .collect();
        self.phase = Phase::Idle;
        self.cycle = 0;
    }

    pub fn step(&mut self) -> Result<(), EvalError> {
        if self.phase != Phase::Idle {
            return Err(EvalError::Poisoned { phase: self.phase });
        }

        trace!("{} cycle {}: combinational", self.backend.name(), self.cycle);
        self.phase = Phase::EvaluatingCombinational;
        self.exec
            .eval(&self.backend, &self.graph, &mut self.values)?;

        trace!("{} cycle {}: registers", self.backend.name(), self.cycle);
        self.phase = Phase::CommittingRegisters;
        // all copies taken before any register is written, so register-to-register
        // paths see the old value
        let latched: Vec<B::Bit> = self
            .graph
            .registers()
            .iter()
            .map(|(_, d)| self.backend.copy(&self.values[d.0]))
            .collect();
        for (&(q, _), bit) in izip!(self.graph.registers(), latched) {
            self.values[q.0] = bit;
        }

        self.phase = Phase::Idle;
        self.cycle += 1;
        Ok(())
    }

    /// Forces primary inputs. `bits[i]` goes to `signals[i]`.
    pub fn set_bits(&mut self, signals: &[Signal], bits: &[bool]) -> Result<(), EvalError> {
        if self.phase != Phase::Idle {
            return Err(EvalError::Poisoned { phase: self.phase });
        }
        if signals.len() != bits.len() {
            return Err(EvalError::WidthMismatch {
                signals: signals.len(),
                bits: bits.len(),
            });
        }
        for (signal, bit) in izip!(signals, bits) {
            let id = self
                .graph
                .lookup(*signal)
                .ok_or(EvalError::UnknownSignal(*signal))?;
            let node = self.graph.node(id);
            if *node != Node::Primary {
                return Err(EvalError::NotPrimary {
                    signal: *signal,
                    kind: node.kind(),
                });
            }
            self.values[id.0] = self.backend.encode(*bit);
        }
        Ok(())
    }

    pub fn value(&self, signal: Signal) -> Result<&B::Bit, EvalError> {
        let id = self
            .graph
            .lookup(signal)
            .ok_or(EvalError::UnknownSignal(signal))?;
        Ok(&self.values[id.0])
    }

    /// Decodes `signals` in order. Needs the backend's decoding material.
    pub fn get_bits(&self, signals: &[Signal]) -> Result<Vec<bool>, EvalError> {
        signals
            .iter()
            .map(|signal| Ok(self.backend.decode(self.value(*signal)?)))
            .collect()
    }

    pub fn graph(&self) -> &CircuitGraph {
        &self.graph
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Completed cycles since the last reset.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}

/// Unsigned integer from bits, first bit least significant.
pub fn bits_to_int(bits: &[bool]) -> BigUint {
    let mut acc = BigUint::zero();
    for b in bits.iter().rev() {
        acc <<= 1;
        if *b {
            acc += 1u32;
        }
    }
    acc
}

/// The `width` low bits of `value`, least significant first.
pub fn int_to_bits(value: &BigUint, width: usize) -> Vec<bool> {
    (0..width).map(|i| value.bit(i as u64)).collect()
}
