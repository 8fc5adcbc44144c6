use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SimError};
use crate::models::ModelId;
use crate::signal::SignalValue;

/// Payload the serial scenario loads into `data_buffer`.
pub const SERIAL_PAYLOAD: &str = "All hail hypnotoad!";

/// Input value as written in a scenario file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum InputValue {
    Bit(bool),
    Word(u64),
    Text(String),
}

impl From<InputValue> for SignalValue {
    fn from(value: InputValue) -> Self {
        match value {
            InputValue::Bit(bit) => SignalValue::Bit(bit),
            InputValue::Word(word) => SignalValue::Word(word),
            InputValue::Text(text) => SignalValue::from(text.as_str()),
        }
    }
}

/// On-disk scenario description.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub name: String,
    pub model: ModelId,
    #[serde(default)]
    pub clock: Option<String>,
    #[serde(default)]
    pub initial_clock: bool,
    #[serde(default)]
    pub max_cycles: Option<u64>,
    /// Inputs written before every evaluation.
    #[serde(default)]
    pub hold: BTreeMap<String, InputValue>,
    /// Inputs written once before the first cycle.
    #[serde(default)]
    pub preload: BTreeMap<String, InputValue>,
    #[serde(default)]
    pub record: Vec<String>,
    #[serde(default)]
    pub sample: Option<String>,
}

/// A fully resolved run description.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub model: ModelId,
    pub clock: String,
    pub initial_clock: bool,
    pub max_cycles: u64,
    pub hold: Vec<(String, SignalValue)>,
    pub preload: Vec<(String, SignalValue)>,
    pub record: Vec<String>,
    /// Transmit line to sample, if any.
    pub sample: Option<String>,
}

impl Scenario {
    /// The stock testbench for a bundled model.
    pub fn builtin(model: ModelId) -> Self {
        let mut scenario = Self {
            name: model.name().to_owned(),
            model,
            clock: model.clock_signal().to_owned(),
            initial_clock: false,
            max_cycles: model.default_max_cycles(),
            hold: Vec::new(),
            preload: Vec::new(),
            record: Vec::new(),
            sample: None,
        };

        if model == ModelId::Serial {
            scenario.hold = vec![("proceed".to_owned(), SignalValue::Bit(true))];
            scenario.preload = vec![("data_buffer".to_owned(), SignalValue::from(SERIAL_PAYLOAD))];
            scenario.record = ["tx", "clock", "data_buffer", "proceed", "buffer_pos", "frame_pos"]
                .into_iter()
                .map(str::to_owned)
                .collect();
            scenario.sample = Some("tx".to_owned());
        }

        scenario
    }

    pub fn from_config(config: ScenarioConfig) -> Result<Self> {
        let max_cycles = config
            .max_cycles
            .unwrap_or_else(|| config.model.default_max_cycles());
        if max_cycles == 0 {
            return Err(SimError::Config(format!(
                "scenario `{}`: max_cycles must be positive",
                config.name
            )));
        }

        let resolve = |inputs: BTreeMap<String, InputValue>| -> Vec<(String, SignalValue)> {
            inputs
                .into_iter()
                .map(|(name, value)| (name, SignalValue::from(value)))
                .collect()
        };

        Ok(Self {
            clock: config
                .clock
                .unwrap_or_else(|| config.model.clock_signal().to_owned()),
            name: config.name,
            model: config.model,
            initial_clock: config.initial_clock,
            max_cycles,
            hold: resolve(config.hold),
            preload: resolve(config.preload),
            record: config.record,
            sample: config.sample,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: ScenarioConfig = serde_yaml::from_str(text)?;
        Self::from_config(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles;
        self
    }
}
