use std::collections::{BTreeMap, BTreeSet, HashMap};

use indexmap::IndexMap;
use itertools::Itertools;
use log::{info, warn};

use crate::{
    error::{Error, LoadError},
    graph::{CircuitGraph, GraphBuilder, Signal},
    netlist::{Bit, Cell, Design, Direction},
};

/// A loaded netlist: the graph plus the port bindings the harness drives and observes.
#[derive(Debug, Clone)]
pub struct LoadedCircuit {
    pub graph: CircuitGraph,
    /// Input ports other than the clock, in declaration order.
    pub inputs: IndexMap<String, Vec<Signal>>,
    pub outputs: IndexMap<String, Vec<Signal>>,
    pub cell_types: BTreeMap<String, usize>,
    /// Cell types that contributed no node.
    pub unsupported: BTreeSet<String>,
}

enum CellKind {
    Not,
    And,
    Dff,
}

fn cell_kind(cell_type: &str) -> Option<CellKind> {
    match cell_type {
        "NOT" | "$_NOT_" => Some(CellKind::Not),
        "AND" | "$_AND_" => Some(CellKind::And),
        "DFF" | "$_DFF_P_" => Some(CellKind::Dff),
        _ => None,
    }
}

fn signals(bits: &[Bit]) -> Result<Vec<Signal>, LoadError> {
    bits.iter().map(Bit::signal).collect()
}

/// Resolves `names` to the single signal bound to each pin.
fn pins<const N: usize>(
    name: &str,
    cell: &Cell,
    names: [&str; N],
) -> Result<[Signal; N], LoadError> {
    let mut out = [Signal::Const(false); N];
    for (slot, pin) in out.iter_mut().zip(names) {
        let bits = cell
            .connections
            .get(pin)
            .ok_or_else(|| LoadError::MissingPin {
                cell: name.to_string(),
                pin: pin.to_string(),
            })?;
        if bits.len() != 1 {
            return Err(LoadError::PinWidth {
                cell: name.to_string(),
                pin: pin.to_string(),
                width: bits.len(),
            });
        }
        *slot = bits[0].signal()?;
    }
    Ok(out)
}

/// Builds the circuit for module `top` of a Yosys JSON netlist.
/// `clock` names the single-bit input port every register must be clocked by.
pub fn parse_netlist(json: &str, top: &str, clock: &str) -> Result<LoadedCircuit, Error> {
    let design = Design::from_json(json)?;
    let module = design
        .modules
        .get(top)
        .ok_or_else(|| LoadError::MissingModule(top.to_string()))?;

    info!("ports:");
    for (name, port) in &module.ports {
        info!("  {} {:?} bits: {:?}", name, port.direction, port.bits);
    }

    let clock_port = module
        .ports
        .get(clock)
        .ok_or_else(|| LoadError::MissingPort(clock.to_string()))?;
    if clock_port.direction != Direction::Input || clock_port.bits.len() != 1 {
        return Err(LoadError::ClockPort {
            port: clock.to_string(),
            width: clock_port.bits.len(),
        }
        .into());
    }
    let clock_signal = clock_port.bits[0].signal()?;

    let mut inputs = IndexMap::new();
    let mut outputs = IndexMap::new();
    for (name, port) in &module.ports {
        match port.direction {
            Direction::Input if name != clock => {
                inputs.insert(name.clone(), signals(&port.bits)?);
            }
            Direction::Output => {
                outputs.insert(name.clone(), signals(&port.bits)?);
            }
            Direction::Inout => warn!("ignoring inout port {}", name),
            Direction::Input => {}
        }
    }

    let cell_types: BTreeMap<String, usize> = module
        .cells
        .values()
        .map(|cell| cell.cell_type.clone())
        .counts()
        .into_iter()
        .collect();
    info!("{} cells", module.cells.len());
    info!("cell types: {:?}", cell_types);

    let mut builder = GraphBuilder::new();
    let mut unsupported = BTreeSet::new();
    let mut unsupported_drivers = HashMap::new();
    for (name, cell) in &module.cells {
        match cell_kind(&cell.cell_type) {
            Some(CellKind::Not) => {
                let [a, y] = pins(name, cell, ["A", "Y"])?;
                builder.add_not(a, y)?;
            }
            Some(CellKind::And) => {
                let [a, b, y] = pins(name, cell, ["A", "B", "Y"])?;
                builder.add_and(a, b, y)?;
            }
            Some(CellKind::Dff) => {
                let [c, d, q] = pins(name, cell, ["C", "D", "Q"])?;
                if c != clock_signal {
                    return Err(LoadError::ForeignClock {
                        cell: name.clone(),
                        found: c,
                        clock: clock_signal,
                    }
                    .into());
                }
                builder.add_register(d, q)?;
            }
            None => {
                unsupported.insert(cell.cell_type.clone());
                // without port_directions any connected net may be one of its outputs
                for (pin, bits) in &cell.connections {
                    let output = match cell.port_directions.get(pin) {
                        Some(direction) => *direction == Direction::Output,
                        None => cell.port_directions.is_empty(),
                    };
                    if !output {
                        continue;
                    }
                    for bit in bits {
                        if let Bit::Net(n) = bit {
                            unsupported_drivers.insert(Signal::Net(*n), cell.cell_type.clone());
                        }
                    }
                }
            }
        }
    }
    if !unsupported.is_empty() {
        warn!("didn't handle cell types: {:?}", unsupported);
    }

    for signal in outputs.values().flatten() {
        builder.intern(*signal);
    }

    let input_signals: BTreeSet<Signal> = inputs.values().flatten().copied().collect();
    for signal in builder.undriven() {
        if input_signals.contains(&signal) {
            continue;
        }
        if let Some(cell_type) = unsupported_drivers.get(&signal) {
            return Err(LoadError::UnsupportedDriver {
                signal,
                cell_type: cell_type.clone(),
            }
            .into());
        }
        warn!("signal {} is not driven, it will read as false", signal);
    }

    let graph = builder.build(clock_signal)?;

    Ok(LoadedCircuit {
        graph,
        inputs,
        outputs,
        cell_types,
        unsupported,
    })
}
