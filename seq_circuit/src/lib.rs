pub mod dot;
pub mod error;
pub mod graph;
pub mod netlist;
pub mod parser;
pub mod stats;

pub use error::{Error, LoadError, StructuralError};
pub use graph::{CircuitGraph, GraphBuilder, Node, NodeId, NodeKind, Signal};
pub use parser::{parse_netlist, LoadedCircuit};
pub use stats::CircuitStats;
