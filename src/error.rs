// Error type shared by the command handlers. Every variant ends the
// current command only; `run` prints it and maps it to an exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// User input failed validation; nothing was sent or written.
    #[error("{0}")]
    Validation(String),
    /// No API key is configured, so the request was never sent.
    #[error("No API key configured. Set one with (shortify config --api-key <key>)")]
    MissingCredential,
    /// The service answered with an error (or could not be reached).
    #[error("{0}")]
    Remote(String),
    #[error("{0:#}")]
    Failure(#[from] anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::MissingCredential => 2,
            Self::Remote(_) | Self::Failure(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn exit_codes_separate_input_from_operational_errors() {
        assert_eq!(CliError::validation("bad sid").exit_code(), 2);
        assert_eq!(CliError::MissingCredential.exit_code(), 2);
        assert_eq!(CliError::Remote("down".into()).exit_code(), 3);
        assert_eq!(CliError::failure(anyhow!("boom")).exit_code(), 3);
    }

    #[test]
    fn failure_message_includes_context_chain() {
        let err: anyhow::Result<()> = Err(anyhow!("disk full")).context("saving API key");
        let message = CliError::failure(err.unwrap_err()).to_string();
        assert_eq!(message, "saving API key: disk full");
    }
}
