use std::time::{Duration, Instant};

use indexmap::IndexMap;
use num_bigint::BigUint;
use seq_circuit::Signal;

use crate::{
    backend::BooleanBackend,
    error::{EvalError, Error},
    evaluator::{bits_to_int, Evaluator},
    stimulus::Stimulus,
};

/// One output port decoded from both evaluators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortReport {
    pub name: String,
    pub reference: BigUint,
    pub candidate: BigUint,
}

impl PortReport {
    pub fn matches(&self) -> bool {
        self.reference == self.candidate
    }
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: u64,
    /// Wall-clock time of the candidate evaluator's step.
    pub elapsed: Duration,
    pub gates: usize,
    pub ports: Vec<PortReport>,
}

impl CycleReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &PortReport> {
        self.ports.iter().filter(|port| !port.matches())
    }

    pub fn ms_per_gate(&self) -> f64 {
        if self.gates == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() * 1000.0 / self.gates as f64
    }
}

/// Steps a reference evaluator (normally plaintext) and a candidate evaluator
/// (normally homomorphic) in lock-step, timing the candidate.
pub struct DualModeRunner<R: BooleanBackend, C: BooleanBackend> {
    reference: Evaluator<R>,
    candidate: Evaluator<C>,
    outputs: IndexMap<String, Vec<Signal>>,
    gates: usize,
}

impl<R: BooleanBackend, C: BooleanBackend> DualModeRunner<R, C> {
    /// `gates` is the number of backend gate calls a cycle costs, used for the per-gate figure.
    pub fn new(
        reference: Evaluator<R>,
        candidate: Evaluator<C>,
        outputs: IndexMap<String, Vec<Signal>>,
        gates: usize,
    ) -> Self {
        Self {
            reference,
            candidate,
            outputs,
            gates,
        }
    }

    /// Forces the same input bits on both evaluators.
    pub fn drive(&mut self, signals: &[Signal], bits: &[bool]) -> Result<(), EvalError> {
        self.reference.set_bits(signals, bits)?;
        self.candidate.set_bits(signals, bits)
    }

    pub fn step(&mut self) -> Result<CycleReport, EvalError> {
        let cycle = self.reference.cycle();
        self.reference.step()?;

        let start = Instant::now();
        self.candidate.step()?;
        let elapsed = start.elapsed();

        let ports = self
            .outputs
            .iter()
            .map(|(name, signals)| {
                Ok(PortReport {
                    name: name.clone(),
                    reference: bits_to_int(&self.reference.get_bits(signals)?),
                    candidate: bits_to_int(&self.candidate.get_bits(signals)?),
                })
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        Ok(CycleReport {
            cycle,
            elapsed,
            gates: self.gates,
            ports,
        })
    }

    /// Runs `cycles` cycles, applying `stimulus` before each.
    pub fn run(
        &mut self,
        cycles: usize,
        stimulus: &mut Stimulus,
    ) -> Result<Vec<CycleReport>, Error> {
        self.run_with(cycles, stimulus, |_| {})
    }

    /// Like [`run`](Self::run), handing each report to `observe` as soon as its cycle ends.
    pub fn run_with<F>(
        &mut self,
        cycles: usize,
        stimulus: &mut Stimulus,
        mut observe: F,
    ) -> Result<Vec<CycleReport>, Error>
    where
        F: FnMut(&CycleReport),
    {
        let mut reports = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            for (signals, bits) in stimulus.next_cycle() {
                self.drive(&signals, &bits)?;
            }
            let report = self.step()?;
            observe(&report);
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn reset(&mut self) {
        self.reference.reset();
        self.candidate.reset();
    }

    pub fn reference(&self) -> &Evaluator<R> {
        &self.reference
    }

    pub fn candidate(&self) -> &Evaluator<C> {
        &self.candidate
    }
}

#[cfg(test)]
mod tests {
    use seq_circuit::{CircuitStats, GraphBuilder};
    use test_log::test;

    use super::*;
    use crate::backend::PlainBackend;

    /// Two-input AND latched in a register, exposed as port `r`.
    fn runner() -> DualModeRunner<PlainBackend, PlainBackend> {
        let mut b = GraphBuilder::new();
        b.add_and(Signal::Net(2), Signal::Net(3), Signal::Net(4))
            .unwrap();
        b.add_register(Signal::Net(4), Signal::Net(5)).unwrap();
        let graph = b.build(Signal::Net(1)).unwrap();
        let gates = CircuitStats::new(&graph).gates_per_cycle();

        let mut outputs = IndexMap::new();
        outputs.insert("r".to_string(), vec![Signal::Net(5)]);
        DualModeRunner::new(
            Evaluator::new(graph.clone(), PlainBackend::new()),
            Evaluator::new(graph, PlainBackend::new()),
            outputs,
            gates,
        )
    }

    #[test]
    fn lock_step_reports() {
        let mut runner = runner();

        let report = runner.step().unwrap();
        assert_eq!(report.cycle, 0);
        assert_eq!(report.gates, 2);
        assert_eq!(report.ports[0].reference, BigUint::from(0u32));
        assert_eq!(report.mismatches().count(), 0);

        runner
            .drive(&[Signal::Net(2), Signal::Net(3)], &[true, true])
            .unwrap();
        let report = runner.step().unwrap();
        assert_eq!(report.cycle, 1);
        assert_eq!(report.ports[0].reference, BigUint::from(1u32));
        assert_eq!(report.ports[0].candidate, BigUint::from(1u32));

        runner.reset();
        assert_eq!(runner.reference().cycle(), 0);
        assert_eq!(runner.candidate().cycle(), 0);

        runner
            .drive(&[Signal::Net(2), Signal::Net(3)], &[true, true])
            .unwrap();
        let mut seen = Vec::new();
        let reports = runner
            .run_with(3, &mut Stimulus::none(), |report| seen.push(report.cycle))
            .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].ports[0].candidate, BigUint::from(1u32));

        runner.reset();
        assert_eq!(runner.candidate().cycle(), 0);
    }

    #[test]
    fn mismatch_detected() {
        let report = CycleReport {
            cycle: 0,
            elapsed: Duration::from_millis(30),
            gates: 3,
            ports: vec![
                PortReport {
                    name: "a".to_string(),
                    reference: BigUint::from(2u32),
                    candidate: BigUint::from(2u32),
                },
                PortReport {
                    name: "b".to_string(),
                    reference: BigUint::from(1u32),
                    candidate: BigUint::from(0u32),
                },
            ],
        };
        let names: Vec<_> = report.mismatches().map(|port| port.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
        assert!((report.ms_per_gate() - 10.0).abs() < 1e-9);
    }
}
