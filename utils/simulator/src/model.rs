use std::fmt;

use crate::error::Result;
use crate::signal::{SignalDesc, SignalValue};

/// A compiled circuit model the harness can drive.
///
/// Implementations are opaque: the harness only sees the declared signal
/// surface and the `evaluate` step. Values handed to `set_signal` have
/// already been checked against the declared [`SignalDesc`] by the adapter.
pub trait SimulatedModel: fmt::Debug {
    fn name(&self) -> &str;

    fn signals(&self) -> &[SignalDesc];

    /// Current value of any signal, `None` if the name is not exposed.
    fn get_signal(&self, name: &str) -> Option<SignalValue>;

    fn set_signal(&mut self, name: &str, value: SignalValue) -> Result<()>;

    /// Settles the model for the current inputs. Must be deterministic.
    fn evaluate(&mut self);

    /// Completion signal raised by the model itself.
    fn finished(&self) -> bool {
        false
    }
}
