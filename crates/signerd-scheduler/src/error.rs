use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The engine configuration cannot be used as given.
    #[error("Invalid scheduler configuration: {0}")]
    InvalidConfig(String),

    /// The completion channel between workers and the engine loop closed.
    #[error("Completion channel closed: {0}")]
    ChannelClosed(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
