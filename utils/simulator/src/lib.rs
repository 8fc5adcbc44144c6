mod adapter;
mod clock;
mod error;
mod model;
pub mod models;
mod orchestrator;
mod recorder;
mod sampler;
mod scenario;
mod signal;
mod trace;
mod uart;
mod vcd;

// Re-export public API
pub use adapter::ModelAdapter;
pub use clock::{Edge, toggle};
pub use error::{Result, SimError};
pub use model::SimulatedModel;
pub use models::{ModelId, create_model};
pub use orchestrator::{RunReport, SimulationOrchestrator, Termination};
pub use recorder::{SignalRecorder, SignalSnapshot};
pub use sampler::{SampledBitStream, SerialSampler};
pub use scenario::{InputValue, SERIAL_PAYLOAD, Scenario, ScenarioConfig};
pub use signal::{ByteBuffer, SignalDesc, SignalKind, SignalValue, SignalWidth, find_signal};
pub use trace::{NullTrace, Tee, TraceSink, TraceWriter};
pub use uart::{DecodedFrames, FrameDecoder, FrameEvent};
pub use vcd::VcdWriter;

impl SimulationOrchestrator {
    /// List all available models
    pub fn available_models() -> &'static [&'static str] {
        models::MODELS
    }
}
