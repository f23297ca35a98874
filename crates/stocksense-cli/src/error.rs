use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] stocksense_core::ValidationError),

    #[error("no stock symbols given")]
    NoSymbols,

    #[error("failed to initialise logging: {0}")]
    Logging(#[source] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::NoSymbols => 2,
            Self::Serialization(_) => 4,
            Self::Logging(_) => 6,
            Self::Io(_) => 10,
        }
    }
}
