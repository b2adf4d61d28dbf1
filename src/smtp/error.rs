//! Error types for the mock SMTP server

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmtpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A request refused by a handler. Displays as the response line
    /// that was sent to the client.
    #[error("{0}")]
    Rejected(String),
}

impl SmtpError {
    /// Returns the response line for a rejected request
    pub fn rejection(&self) -> Option<&str> {
        match self {
            SmtpError::Rejected(response) => Some(response),
            _ => None,
        }
    }

    /// Whether this error came from a timed out read
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            SmtpError::Io(e) if matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            )
        )
    }
}
