use crate::domain::channel::Channel;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoanError>;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Cannot set the loan's status to {0:?}")]
    InvalidStatus(String),
    #[error("Amount must be positive")]
    InvalidAmount,
    #[error("Unknown channel {0:?}")]
    InvalidChannel(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Channel '{0}' is closed")]
    ChannelClosed(Channel),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
