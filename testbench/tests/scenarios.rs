//! Scenario runner
//!
//! Runs every bundled model with its stock scenario, then every YAML scenario
//! found under testbench/scenarios/.

use anyhow::{Context, Result, ensure};
use glob::glob;
use libtest_mimic::{Arguments, Failed, Trial};
use std::path::Path;
use testbench::simulator::{
    FrameDecoder, ModelId, SERIAL_PAYLOAD, Scenario, SimError, Termination,
};
use testbench::{CapturedRun, run_builtin, run_captured};

const SCENARIO_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios");

fn main() -> Result<()> {
    let args = Arguments::from_args();

    let tests = discover_tests()?;

    libtest_mimic::run(&args, tests).exit();
}

fn discover_tests() -> Result<Vec<Trial>> {
    let mut trials = Vec::new();

    for model in ModelId::ALL {
        trials.push(Trial::test(format!("builtin::{model}"), move || {
            check(run_builtin_impl(model))
        }));
    }

    for path in glob(&format!("{SCENARIO_PATH}/*.yaml"))? {
        let path = path?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .context("Scenario file has no name")?
            .to_owned();
        trials.push(Trial::test(format!("file::{name}"), move || {
            check(run_file_impl(&path))
        }));
    }

    Ok(trials)
}

fn check(result: Result<()>) -> Result<(), Failed> {
    result.map_err(|e| format!("{:#}", e).into())
}

fn check_shape(run: &CapturedRun, max_cycles: u64) -> Result<()> {
    let cycles = max_cycles as usize;
    ensure!(
        run.count("--NEXT EVAL--") == cycles,
        "expected {cycles} evaluations, saw {}",
        run.count("--NEXT EVAL--")
    );

    let edges = run.edge_markers();
    ensure!(edges.len() == cycles, "one edge marker per evaluation");
    ensure!(edges.first() == Some(&"--POSEDGE--"), "first edge must be posedge");
    ensure!(
        edges.windows(2).all(|pair| pair[0] != pair[1]),
        "edges must alternate"
    );

    ensure!(run.count("--END--") == 1, "exactly one end marker");
    ensure!(run.trace.ends_with("--END--\n"), "trace must close with --END--");
    Ok(())
}

fn run_builtin_impl(model: ModelId) -> Result<()> {
    let run = run_builtin(model)?;
    let max_cycles = model.default_max_cycles();

    check_shape(&run, max_cycles)?;
    ensure!(run.report.cycles == max_cycles);
    ensure!(run.report.termination == Termination::TimeoutExceeded);

    if model == ModelId::Serial {
        let bits = run.report.bits.as_ref().context("serial run has no bit-stream")?;
        ensure!(bits.len() == 512, "expected 512 sampled bits, got {}", bits.len());
        ensure!(run.last_received() == Some(bits.to_string().as_str()));
        ensure!(run.count("data_buffer\tAll hail hypnotoad!") == 1024);

        let frames = FrameDecoder::decode(bits);
        ensure!(frames.text() == SERIAL_PAYLOAD, "decoded {:?}", frames.text());
    } else {
        ensure!(run.report.bits.is_none());
        ensure!(run.last_received().is_none());
    }

    match run.report.into_result() {
        Err(SimError::TimeoutExceeded { cycles }) if cycles == max_cycles => Ok(()),
        other => anyhow::bail!("expected a timeout, got {other:?}"),
    }
}

fn run_file_impl(path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let max_cycles = scenario.max_cycles;
    let record = scenario.record.clone();
    let sampled = scenario.sample.is_some();

    let run = run_captured(scenario)?;
    check_shape(&run, max_cycles)?;

    for name in &record {
        let prefix = format!("{name}\t");
        let lines = run
            .trace
            .lines()
            .filter(|line| line.starts_with(&prefix))
            .count();
        ensure!(
            lines == max_cycles as usize,
            "signal {name} recorded {lines} times"
        );
    }

    if sampled {
        let bits = run.report.bits.as_ref().context("no bit-stream")?;
        ensure!(bits.len() as u64 == max_cycles / 2);
    }

    Ok(())
}
