pub mod backend;
pub mod error;
pub mod evaluator;
pub mod executors;
pub mod runner;
pub mod stimulus;

pub use backend::{BooleanBackend, FheBackend, FheParams, PlainBackend};
pub use error::{Error, EvalError};
pub use evaluator::{bits_to_int, int_to_bits, Evaluator, Phase};
pub use runner::{CycleReport, DualModeRunner, PortReport};
pub use stimulus::Stimulus;
