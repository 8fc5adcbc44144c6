//! Bundled circuit models.
//!
//! Each model is a behavioral stand-in exposing the signal surface of the
//! corresponding circuit. The harness selects one through [`ModelId`] and only
//! ever talks to it through [`SimulatedModel`].

mod bus;
mod fifo;
mod serial;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::SimError;
use crate::model::SimulatedModel;

pub use bus::BusModel;
pub use fifo::FifoModel;
pub use serial::{DATA_BUFFER_BYTES, SerialModel};

pub(crate) const MODELS: &[&str] = &["bus", "fifo", "serial"];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    Bus,
    Fifo,
    Serial,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Bus, ModelId::Fifo, ModelId::Serial];

    pub fn name(self) -> &'static str {
        match self {
            ModelId::Bus => "bus",
            ModelId::Fifo => "fifo",
            ModelId::Serial => "serial",
        }
    }

    /// Name of the clock input on this model.
    pub fn clock_signal(self) -> &'static str {
        match self {
            ModelId::Bus | ModelId::Fifo => "clk",
            ModelId::Serial => "clock",
        }
    }

    /// Safety cap on cycles when a scenario does not set one.
    pub fn default_max_cycles(self) -> u64 {
        match self {
            ModelId::Bus | ModelId::Fifo => 8192,
            ModelId::Serial => 1024,
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelId {
    type Err = SimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| SimError::UnknownModel(name.to_owned()))
    }
}

/// Create a fresh model instance
pub fn create_model(model_id: ModelId) -> Box<dyn SimulatedModel> {
    match model_id {
        ModelId::Bus => Box::new(BusModel::new()),
        ModelId::Fifo => Box::new(FifoModel::new()),
        ModelId::Serial => Box::new(SerialModel::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for id in ModelId::ALL {
            assert_eq!(id.name().parse::<ModelId>().unwrap(), id);
            assert_eq!(create_model(id).name(), id.name());
        }
        assert!(matches!(
            "uart".parse::<ModelId>(),
            Err(SimError::UnknownModel(_))
        ));
    }

    #[test]
    fn every_model_exposes_its_clock() {
        for id in ModelId::ALL {
            let model = create_model(id);
            assert!(
                model.get_signal(id.clock_signal()).is_some(),
                "{id} has no clock"
            );
        }
    }
}
