use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickerlog_core::ValidationError),

    /// Persistence failures are fatal: no retry, no degradation.
    #[error(transparent)]
    Store(#[from] tickerlog_store::StoreError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Store(_) => 3,
            Self::Command(_) | Self::Io(_) => 10,
        }
    }
}
