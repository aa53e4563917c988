use {
    std::path::PathBuf,
    thiserror::Error,
};


/// Everything that can go wrong inside the learning core.
#[derive(Debug, Error)]
pub enum DdpgError {
    /// A hyperparameter is out of range, or a tensor does not have the shape
    /// the agent was built for.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The replay buffer was asked for a batch larger than what it holds.
    #[error("Replay buffer holds {available} transitions but {requested} were requested")]
    InsufficientData {
        requested: usize,
        available: usize,
    },

    /// Reading or writing weights / scores failed.
    #[error("Could not persist {}: {reason}", path.display())]
    Persistence {
        path: PathBuf,
        reason: String,
    },

    /// A loss or gradient became NaN or infinite.
    #[error("Non-finite value in {0}")]
    NumericDivergence(String),

    #[error(transparent)]
    Tensor(#[from] candle_core::Error),
}

impl DdpgError {
    pub fn persistence(
        path: impl Into<PathBuf>,
        reason: impl ToString,
    ) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DdpgError>;
