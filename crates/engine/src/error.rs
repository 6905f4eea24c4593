use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] tandem_protocol::ProtocolError),

    #[error("Scoring weights must sum to 1.0 (got {sum})")]
    InvalidWeights { sum: f32 },
}
