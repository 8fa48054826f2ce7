use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use log::{error, info};
use num_bigint::BigUint;
use seq_circuit::{dot::write_dot, parse_netlist, CircuitGraph, CircuitStats};
use seq_eval::{
    executors::{CombExec, CombExecPar, CombExecSeq},
    stimulus::parse_assignment,
    BooleanBackend, DualModeRunner, Error, EvalError, Evaluator, FheBackend, FheParams,
    PlainBackend, Stimulus,
};

#[derive(Parser)]
#[command(
    name = "seq_eval",
    about = "Evaluate a sequential netlist in the clear and under TFHE, cycle by cycle",
    long_about = None
)]
struct Cli {
    /// Yosys JSON netlist mapped to NOT/AND/DFF cells
    #[arg(value_name = "FILE")]
    netlist: PathBuf,

    /// Module to evaluate
    #[arg(long, default_value = "top")]
    top: String,

    /// Clock input port
    #[arg(long, default_value = "clk")]
    clock: String,

    /// Number of clock cycles
    #[arg(short, long, default_value_t = 10)]
    cycles: usize,

    /// Number of execution threads for the encrypted evaluation
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// TFHE parameter set
    #[arg(long, value_enum, default_value_t = FheParams::Default)]
    params: FheParams,

    /// Hold an input port at a value, e.g. `--input en=1`
    #[arg(long = "input", value_name = "PORT=VALUE", value_parser = parse_assignment)]
    inputs: Vec<(String, BigUint)>,

    /// Drive the other input ports with random bits every cycle
    #[arg(long)]
    random: bool,

    /// Seed for --random
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Write the circuit graph in Graphviz format
    #[arg(long, value_name = "PATH")]
    dot: Option<PathBuf>,

    /// Compare against a second plaintext evaluator instead of TFHE
    #[arg(long)]
    skip_fhe: bool,
}

fn make_exec<B>(threads: usize) -> Result<Box<dyn CombExec<B>>, EvalError>
where
    B: BooleanBackend + Send + Sync + 'static,
{
    if threads > 1 {
        Ok(CombExecPar::new_boxed(threads)?)
    } else {
        Ok(CombExecSeq::new_boxed())
    }
}

/// Returns whether every cycle matched.
fn run_cycles<C: BooleanBackend>(
    mut runner: DualModeRunner<PlainBackend, C>,
    cycles: usize,
    stimulus: &mut Stimulus,
    nb_nodes: usize,
) -> Result<bool, Error> {
    let name = runner.candidate().backend().name();

    let reports = runner.run_with(cycles, stimulus, |report| {
        info!(
            "cycle {}: evaluated {} nodes ({} gates) in {:.3} s, or {:.3} ms/gate",
            report.cycle,
            nb_nodes,
            report.gates,
            report.elapsed.as_secs_f64(),
            report.ms_per_gate()
        );
        for port in &report.ports {
            info!("plaintext output {}: {}", port.name, port.reference);
            info!("{} output {}: {}", name, port.name, port.candidate);
        }
        for port in report.mismatches() {
            error!(
                "cycle {}: output {} differs: {} vs {}",
                report.cycle, port.name, port.reference, port.candidate
            );
        }
    })?;

    Ok(reports
        .iter()
        .all(|report| report.mismatches().next().is_none()))
}

fn candidate_evaluator<B>(
    graph: &CircuitGraph,
    backend: B,
    threads: usize,
) -> Result<Evaluator<B>, Error>
where
    B: BooleanBackend + Send + Sync + 'static,
{
    Ok(Evaluator::with_exec(graph.clone(), backend, make_exec(threads)?))
}

fn run(cli: Cli) -> Result<bool, Error> {
    let json = fs::read_to_string(&cli.netlist)?;
    let circuit = parse_netlist(&json, &cli.top, &cli.clock)?;
    info!(
        "Read netlist {:?}, clocked by {}",
        cli.netlist,
        circuit.graph.clock()
    );

    let stats = CircuitStats::new(&circuit.graph);
    info!("{:?}", stats);

    if let Some(path) = &cli.dot {
        let mut out = BufWriter::new(File::create(path)?);
        write_dot(&circuit.graph, &mut out)?;
        out.flush()?;
        info!("Wrote graph to {:?}", path);
    }

    let mut stimulus = Stimulus::new(&circuit, &cli.inputs, cli.random.then_some(cli.seed))?;
    let reference = Evaluator::new(circuit.graph.clone(), PlainBackend::new());
    let gates = stats.gates_per_cycle();

    if cli.skip_fhe {
        let candidate = candidate_evaluator(&circuit.graph, PlainBackend::new(), cli.threads)?;
        let runner = DualModeRunner::new(reference, candidate, circuit.outputs, gates);
        return run_cycles(runner, cli.cycles, &mut stimulus, stats.nb_nodes());
    }

    info!("Generating TFHE keys ({:?})...", cli.params);
    let start = Instant::now();
    let backend = FheBackend::new(cli.params);
    info!("keygen = {:.1?}", start.elapsed());

    let candidate = candidate_evaluator(&circuit.graph, backend, cli.threads)?;
    let runner = DualModeRunner::new(reference, candidate, circuit.outputs, gates);
    run_cycles(runner, cli.cycles, &mut stimulus, stats.nb_nodes())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("Plaintext and encrypted outputs do not match");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
