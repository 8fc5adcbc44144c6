use thiserror::Error;

pub type Result<T, E = SimError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("model `{model}` has no signal named `{name}`")]
    UnknownSignal { model: String, name: String },

    #[error("signal `{name}` is not an input")]
    NotAnInput { name: String },

    #[error("signal `{name}` expects a {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("signal `{name}` holds at most {capacity} bytes, got {len}")]
    BufferOverflow {
        name: String,
        capacity: usize,
        len: usize,
    },

    /// The cycle cap was reached before the model asserted completion.
    #[error("model did not finish within {cycles} cycles")]
    TimeoutExceeded { cycles: u64 },

    #[error("unknown model `{0}`")]
    UnknownModel(String),

    #[error("invalid scenario: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
