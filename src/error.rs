use thiserror::Error;

/// All errors produced by vocalis-core.
#[derive(Debug, Error)]
pub enum VocalisError {
    #[error("empty input signal")]
    EmptySignal,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("signal produced no analysis frames")]
    NoFrames,

    #[error("could not detect pitch in the signal")]
    NoPitchDetected,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, VocalisError>;
