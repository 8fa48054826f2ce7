use crate::graph::Signal;

/// Malformed netlist description. Nothing built from it is usable.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid netlist JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("module {0} not found in netlist")]
    MissingModule(String),
    #[error("port {0} not found in module")]
    MissingPort(String),
    #[error("clock port {port} must be a single-bit input, found {width} bit(s)")]
    ClockPort { port: String, width: usize },
    #[error("cell {cell}: pin {pin} not connected")]
    MissingPin { cell: String, pin: String },
    #[error("cell {cell}: pin {pin} expected to bind exactly one signal, found {width}")]
    PinWidth {
        cell: String,
        pin: String,
        width: usize,
    },
    #[error("cell {cell}: clocked by {found}, expected clock signal {clock}")]
    ForeignClock {
        cell: String,
        found: Signal,
        clock: Signal,
    },
    #[error("signal {0} has more than one driver")]
    MultipleDrivers(Signal),
    #[error("constant {0} cannot be driven by a cell")]
    DrivenConstant(Signal),
    #[error("signal {signal} is consumed but only driven by unsupported cell type {cell_type}")]
    UnsupportedDriver { signal: Signal, cell_type: String },
    #[error("undefined bit value {0:?}")]
    UndefinedBit(String),
}

/// Graph shape violations found once the netlist is fully loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("circuit has no nodes")]
    Empty,
    #[error("circuit is not weakly connected: {components} components")]
    Disconnected { components: usize },
    #[error("combinational loop through signal {signal}")]
    CombinationalCycle { signal: Signal },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}
