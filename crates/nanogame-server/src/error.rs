use nanogame_proto::error::ProtoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtoError),

    #[error("connection limit of {capacity} reached")]
    Capacity { capacity: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("write timed out")]
    WriteTimeout,
}
