//! Scenario runners and fixtures shared by the integration harnesses.

use anyhow::{Context, Result};
use simulator::{
    Edge, ModelId, RunReport, SampledBitStream, Scenario, SignalDesc, SignalSnapshot,
    SignalValue, SignalWidth, SimulatedModel, SimulationOrchestrator, TraceSink, TraceWriter,
};

pub use simulator;

/// A finished run together with the text trace it produced.
#[derive(Debug)]
pub struct CapturedRun {
    pub report: RunReport,
    pub trace: String,
}

impl CapturedRun {
    /// Number of trace lines exactly equal to `line`.
    pub fn count(&self, line: &str) -> usize {
        self.trace.lines().filter(|l| *l == line).count()
    }

    pub fn edge_markers(&self) -> Vec<&str> {
        self.trace
            .lines()
            .filter(|line| *line == "--POSEDGE--" || *line == "--NEGEDGE--")
            .collect()
    }

    /// Value of the last `received_data` line.
    pub fn last_received(&self) -> Option<&str> {
        self.trace
            .lines()
            .filter_map(|line| line.strip_prefix("received_data\t"))
            .last()
    }
}

/// Runs a scenario and returns the outcome together with whatever trace was
/// written, so failing runs can be inspected too.
pub fn run_traced(
    scenario: Scenario,
    model: Option<Box<dyn SimulatedModel>>,
) -> Result<(simulator::Result<RunReport>, String)> {
    let sim = match model {
        Some(model) => SimulationOrchestrator::with_model(scenario, model),
        None => SimulationOrchestrator::new(scenario),
    };

    let mut writer = TraceWriter::new(Vec::new());
    let outcome = sim.run(&mut writer);
    let trace = String::from_utf8(writer.into_inner()).context("Trace is not UTF-8")?;
    Ok((outcome, trace))
}

pub fn run_captured(scenario: Scenario) -> Result<CapturedRun> {
    let name = scenario.name.clone();
    let (outcome, trace) = run_traced(scenario, None)?;
    let report = outcome.with_context(|| format!("Scenario {name} failed"))?;
    Ok(CapturedRun { report, trace })
}

pub fn run_builtin(model: ModelId) -> Result<CapturedRun> {
    run_captured(Scenario::builtin(model))
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub edges: Vec<(u64, Edge)>,
    pub snapshots: Vec<SignalSnapshot>,
    /// Bit-stream length after each cycle of a sampled scenario.
    pub stream_lengths: Vec<usize>,
    pub last_stream: SampledBitStream,
    pub ended: Option<u64>,
}

impl TraceSink for RecordingSink {
    fn begin_cycle(&mut self, cycle: u64, edge: Edge) -> simulator::Result<()> {
        self.edges.push((cycle, edge));
        Ok(())
    }

    fn record(&mut self, _cycle: u64, snapshot: &SignalSnapshot) -> simulator::Result<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn bitstream(&mut self, _cycle: u64, stream: &SampledBitStream) -> simulator::Result<()> {
        self.stream_lengths.push(stream.len());
        self.last_stream = stream.clone();
        Ok(())
    }

    fn end(&mut self, cycles: u64) -> simulator::Result<()> {
        self.ended = Some(cycles);
        Ok(())
    }
}

const COUNTDOWN_SIGNALS: &[SignalDesc] = &[
    SignalDesc::input("clk", SignalWidth::Bit),
    SignalDesc::output("remaining", SignalWidth::Word(32)),
    SignalDesc::output("done", SignalWidth::Bit),
];

/// Model that raises its completion signal after a fixed number of rising
/// edges.
#[derive(Debug, Clone)]
pub struct CountdownModel {
    clk: bool,
    prev_clk: bool,
    remaining: u32,
}

impl CountdownModel {
    pub fn new(rising_edges: u32) -> Self {
        Self {
            clk: false,
            prev_clk: false,
            remaining: rising_edges,
        }
    }
}

impl SimulatedModel for CountdownModel {
    fn name(&self) -> &str {
        "countdown"
    }

    fn signals(&self) -> &[SignalDesc] {
        COUNTDOWN_SIGNALS
    }

    fn get_signal(&self, name: &str) -> Option<SignalValue> {
        match name {
            "clk" => Some(SignalValue::Bit(self.clk)),
            "remaining" => Some(SignalValue::Word(self.remaining.into())),
            "done" => Some(SignalValue::Bit(self.remaining == 0)),
            _ => None,
        }
    }

    fn set_signal(&mut self, name: &str, value: SignalValue) -> simulator::Result<()> {
        if name == "clk" {
            self.clk = value.to_bit(name)?;
        }
        Ok(())
    }

    fn evaluate(&mut self) {
        if self.clk && !self.prev_clk {
            self.remaining = self.remaining.saturating_sub(1);
        }
        self.prev_clk = self.clk;
    }

    fn finished(&self) -> bool {
        self.remaining == 0
    }
}
