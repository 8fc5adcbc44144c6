use tracing::{debug, error, info, trace, warn};

use crate::adapter::ModelAdapter;
use crate::clock::{self, Edge};
use crate::error::{Result, SimError};
use crate::model::SimulatedModel;
use crate::models::create_model;
use crate::recorder::SignalRecorder;
use crate::sampler::{SampledBitStream, SerialSampler};
use crate::scenario::Scenario;
use crate::signal::SignalValue;
use crate::trace::TraceSink;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The model raised its own completion signal.
    Finished,
    /// The cycle cap was hit first.
    TimeoutExceeded,
}

#[derive(Debug)]
pub struct RunReport {
    pub scenario: String,
    pub cycles: u64,
    pub termination: Termination,
    pub final_clock: bool,
    /// Sampled transmit line, for scenarios that sample one.
    pub bits: Option<SampledBitStream>,
}

impl RunReport {
    /// Turns a timed-out run into `SimError::TimeoutExceeded`.
    pub fn into_result(self) -> Result<Self> {
        match self.termination {
            Termination::Finished => Ok(self),
            Termination::TimeoutExceeded => Err(SimError::TimeoutExceeded {
                cycles: self.cycles,
            }),
        }
    }
}

/// Owns one model for one run and drives it cycle by cycle.
///
/// Each cycle toggles the clock, writes the held inputs, evaluates the model,
/// captures the recorded signals and, when configured, samples the transmit
/// line. Any failure stops the run on the spot.
#[derive(Debug)]
pub struct SimulationOrchestrator {
    scenario: Scenario,
    adapter: ModelAdapter,
    clock: bool,
    cycle: u64,
    recorder: SignalRecorder,
    sampler: Option<SerialSampler>,
}

impl SimulationOrchestrator {
    pub fn new(scenario: Scenario) -> Self {
        let model = create_model(scenario.model);
        Self::with_model(scenario, model)
    }

    /// Runs `scenario` against a caller-supplied model instead of the
    /// bundled one named by `scenario.model`.
    pub fn with_model(scenario: Scenario, model: Box<dyn SimulatedModel>) -> Self {
        Self {
            adapter: ModelAdapter::new(model),
            clock: scenario.initial_clock,
            cycle: 0,
            recorder: SignalRecorder::new(scenario.record.clone()),
            sampler: scenario.sample.as_deref().map(SerialSampler::new),
            scenario,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn adapter(&self) -> &ModelAdapter {
        &self.adapter
    }

    pub fn clock(&self) -> bool {
        self.clock
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Prepares the model, then runs to completion. The sink's `end` is
    /// called whether or not the run fails, including when the clock or a
    /// preloaded input is rejected before the first cycle.
    pub fn run(mut self, sink: &mut dyn TraceSink) -> Result<RunReport> {
        let span = tracing::info_span!("run", scenario = %self.scenario.name);
        let _enter = span.enter();
        info!(
            model = self.adapter.name(),
            max_cycles = self.scenario.max_cycles,
            "starting run"
        );

        let outcome = self.prepare().and_then(|()| self.drive(sink));
        let closed = sink.end(self.cycle);

        let termination = match outcome {
            Ok(termination) => termination,
            Err(err) => {
                error!(cycle = self.cycle, "run aborted: {err}");
                if let Err(close_err) = closed {
                    warn!("trace sink failed to close: {close_err}");
                }
                return Err(err);
            }
        };
        closed?;

        match termination {
            Termination::Finished => info!(cycles = self.cycle, "model finished"),
            Termination::TimeoutExceeded => {
                warn!(cycles = self.cycle, "cycle cap reached before the model finished")
            }
        }

        Ok(RunReport {
            scenario: self.scenario.name,
            cycles: self.cycle,
            termination,
            final_clock: self.clock,
            bits: self.sampler.map(SerialSampler::into_stream),
        })
    }

    /// Writes the initial clock and the preloaded inputs.
    fn prepare(&mut self) -> Result<()> {
        self.adapter
            .set_signal(&self.scenario.clock, SignalValue::Bit(self.clock))?;
        for (name, value) in &self.scenario.preload {
            self.adapter.set_signal(name, value.clone())?;
        }
        debug!(
            model = self.adapter.name(),
            preloaded = self.scenario.preload.len(),
            "model prepared"
        );
        Ok(())
    }

    fn drive(&mut self, sink: &mut dyn TraceSink) -> Result<Termination> {
        loop {
            if let Some(termination) = self.stop_condition() {
                return Ok(termination);
            }
            self.step(sink)?;
        }
    }

    fn stop_condition(&self) -> Option<Termination> {
        if self.adapter.finished() {
            Some(Termination::Finished)
        } else if self.cycle >= self.scenario.max_cycles {
            Some(Termination::TimeoutExceeded)
        } else {
            None
        }
    }

    fn step(&mut self, sink: &mut dyn TraceSink) -> Result<Edge> {
        let (next, edge) = clock::toggle(self.clock);
        self.clock = next;
        sink.begin_cycle(self.cycle, edge)?;
        trace!(cycle = self.cycle, ?edge, "cycle");

        self.adapter
            .set_signal(&self.scenario.clock, SignalValue::Bit(next))?;
        for (name, value) in &self.scenario.hold {
            self.adapter.set_signal(name, value.clone())?;
        }

        self.adapter.evaluate();

        let snapshot = self.recorder.capture(&self.adapter)?;
        sink.record(self.cycle, &snapshot)?;

        if let Some(sampler) = self.sampler.as_mut() {
            let line = sampler.line();
            let tx = self.adapter.get_signal(line)?.to_bit(line)?;
            if let Some(bit) = sampler.maybe_sample(self.cycle, tx) {
                trace!(cycle = self.cycle, bit, "sampled");
            }
            sink.bitstream(self.cycle, sampler.stream())?;
        }

        self.cycle += 1;
        Ok(edge)
    }
}
