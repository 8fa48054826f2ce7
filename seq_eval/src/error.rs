use seq_circuit::{NodeKind, Signal};

use crate::evaluator::Phase;

/// Evaluation failures. None of them is recoverable: the run stops.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("node {signal} of kind {kind} cannot be evaluated combinationally")]
    NotCombinational { signal: Signal, kind: NodeKind },
    #[error("node {signal} of kind {kind} is not a primary value and cannot be forced")]
    NotPrimary { signal: Signal, kind: NodeKind },
    #[error("signal {0} is not part of the circuit")]
    UnknownSignal(Signal),
    #[error("{signals} signals but {bits} bits given")]
    WidthMismatch { signals: usize, bits: usize },
    #[error("previous cycle aborted during {phase:?}, reset required")]
    Poisoned { phase: Phase },
    #[error("cannot start worker runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("gate worker failed: {0}")]
    Join(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Circuit(#[from] seq_circuit::Error),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad stimulus: {0}")]
    Stimulus(String),
}
