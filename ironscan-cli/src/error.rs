//! CLI-specific error types and exit code mapping

use ironscan_core::error::{IronscanError, PipelineError};
use ironscan_enumerator::EnumeratorError;
use ironscan_nessus::NessusError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from ironscan-core.
    #[error("{0}")]
    Core(#[from] IronscanError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | General / command error                   |
    /// | 2    | Configuration error                       |
    /// | 3    | Scanner unreachable or request rejected   |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Core(err) => match err {
                IronscanError::Config(_) => 2,
                IronscanError::Catalog(_) => 3,
                IronscanError::Pipeline(PipelineError::FamilyListing(_)) => 3,
                IronscanError::Pipeline(_) => 1,
                IronscanError::Io(_) => 10,
            },
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<NessusError> for CliError {
    fn from(e: NessusError) -> Self {
        Self::Core(e.into())
    }
}

impl From<EnumeratorError> for CliError {
    fn from(e: EnumeratorError) -> Self {
        Self::Core(e.into())
    }
}
