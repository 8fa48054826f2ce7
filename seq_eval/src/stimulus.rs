//! Values forced on primary inputs before each cycle.

use num_bigint::BigUint;
use num_traits::Num;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use seq_circuit::{LoadedCircuit, Node, Signal};

use crate::{error::Error, evaluator::int_to_bits};

/// Held ports keep their value; with a seed, every other input port gets fresh
/// random bits each cycle. Ports not covered by either stay as they are.
#[derive(Debug, Clone)]
pub struct Stimulus {
    held: Vec<(Vec<Signal>, Vec<bool>)>,
    random: Vec<Vec<Signal>>,
    rng: Option<StdRng>,
}

/// Keeps the bits whose signal is a primary node of the graph: unused input
/// bits never become nodes.
fn drivable(circuit: &LoadedCircuit, signals: &[Signal]) -> Vec<(Signal, usize)> {
    signals
        .iter()
        .enumerate()
        .filter(|(_, signal)| {
            circuit
                .graph
                .lookup(**signal)
                .is_some_and(|id| *circuit.graph.node(id) == Node::Primary)
        })
        .map(|(i, signal)| (*signal, i))
        .collect()
}

impl Stimulus {
    pub fn none() -> Stimulus {
        Stimulus {
            held: Vec::new(),
            random: Vec::new(),
            rng: None,
        }
    }

    pub fn new(
        circuit: &LoadedCircuit,
        held: &[(String, BigUint)],
        seed: Option<u64>,
    ) -> Result<Stimulus, Error> {
        let mut stimulus = Stimulus::none();

        for (name, value) in held {
            let signals = circuit
                .inputs
                .get(name)
                .ok_or_else(|| Error::Stimulus(format!("no input port named {}", name)))?;
            if value.bits() > signals.len() as u64 {
                return Err(Error::Stimulus(format!(
                    "{} does not fit in the {} bit(s) of port {}",
                    value,
                    signals.len(),
                    name
                )));
            }
            let bits = int_to_bits(value, signals.len());
            let (signals, bits): (Vec<Signal>, Vec<bool>) = drivable(circuit, signals)
                .into_iter()
                .map(|(signal, i)| (signal, bits[i]))
                .unzip();
            stimulus.held.push((signals, bits));
        }

        if let Some(seed) = seed {
            stimulus.rng = Some(StdRng::seed_from_u64(seed));
            for (name, signals) in &circuit.inputs {
                if held.iter().any(|(held_name, _)| held_name == name) {
                    continue;
                }
                let signals = drivable(circuit, signals)
                    .into_iter()
                    .map(|(signal, _)| signal)
                    .collect();
                stimulus.random.push(signals);
            }
        }

        Ok(stimulus)
    }

    pub fn next_cycle(&mut self) -> Vec<(Vec<Signal>, Vec<bool>)> {
        let mut out = self.held.clone();
        if let Some(rng) = self.rng.as_mut() {
            for signals in &self.random {
                let bits = signals.iter().map(|_| rng.next_u32() % 2 == 1).collect();
                out.push((signals.clone(), bits));
            }
        }
        out
    }
}

/// Parses `PORT=VALUE`; the value is decimal, or hexadecimal/binary with `0x`/`0b`.
pub fn parse_assignment(s: &str) -> Result<(String, BigUint), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PORT=VALUE, got {}", s))?;
    let value = value.trim();
    let parsed = if let Some(hex) = value.strip_prefix("0x") {
        BigUint::from_str_radix(hex, 16)
    } else if let Some(bin) = value.strip_prefix("0b") {
        BigUint::from_str_radix(bin, 2)
    } else {
        BigUint::from_str_radix(value, 10)
    };
    let value = parsed.map_err(|e| format!("invalid value {}: {}", value, e))?;
    Ok((name.trim().to_string(), value))
}
