use crate::adapter::ModelAdapter;
use crate::error::Result;
use crate::signal::SignalValue;

/// Point-in-time values of the recorded signals, in recording order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignalSnapshot {
    entries: Vec<(String, SignalValue)>,
}

impl SignalSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignalValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn get(&self, name: &str) -> Option<&SignalValue> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SignalRecorder {
    names: Vec<String>,
}

impl SignalRecorder {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Reads every recorded signal. Fails on the first unknown name without
    /// returning a partial snapshot.
    pub fn capture(&self, adapter: &ModelAdapter) -> Result<SignalSnapshot> {
        let entries = self
            .names
            .iter()
            .map(|name| Ok((name.clone(), adapter.get_signal(name)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(SignalSnapshot { entries })
    }
}
