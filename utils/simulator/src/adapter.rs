use tracing::trace;

use crate::error::{Result, SimError};
use crate::model::SimulatedModel;
use crate::signal::{SignalDesc, SignalKind, SignalValue, find_signal};

/// Checked access to one exclusively owned model.
#[derive(Debug)]
pub struct ModelAdapter {
    model: Box<dyn SimulatedModel>,
    evaluations: u64,
}

impl ModelAdapter {
    pub fn new(model: Box<dyn SimulatedModel>) -> Self {
        Self {
            model,
            evaluations: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.model.name()
    }

    pub fn signals(&self) -> &[SignalDesc] {
        self.model.signals()
    }

    pub fn describe(&self, name: &str) -> Result<&SignalDesc> {
        find_signal(self.model.signals(), name).ok_or_else(|| self.unknown(name))
    }

    pub fn set_signal(&mut self, name: &str, value: SignalValue) -> Result<()> {
        let desc = *self.describe(name)?;
        if desc.kind != SignalKind::Input {
            return Err(SimError::NotAnInput {
                name: name.to_owned(),
            });
        }
        let value = value.conform(name, desc.width)?;
        self.model.set_signal(name, value)
    }

    pub fn get_signal(&self, name: &str) -> Result<SignalValue> {
        self.model
            .get_signal(name)
            .ok_or_else(|| self.unknown(name))
    }

    pub fn evaluate(&mut self) {
        self.model.evaluate();
        self.evaluations += 1;
        trace!(model = self.model.name(), evaluations = self.evaluations, "evaluated");
    }

    pub fn finished(&self) -> bool {
        self.model.finished()
    }

    /// Number of `evaluate` calls made so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    fn unknown(&self, name: &str) -> SimError {
        SimError::UnknownSignal {
            model: self.model.name().to_owned(),
            name: name.to_owned(),
        }
    }
}
