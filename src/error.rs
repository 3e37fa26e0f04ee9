//! Error types for the relay.

use thiserror::Error;

/// Everything that can stop a relay or registration run.
///
/// Every variant maps to exit status 1 in the binaries; the split exists so
/// callers can decide per kind whether a failure is fatal (configuration,
/// authentication, backend) or only skips one order (exchange).
#[derive(Error, Debug)]
pub enum RelayError {
    /// Bad or missing user input: symbols, URL, hours, credentials.
    #[error("{0}")]
    Validation(String),

    /// Login or registration did not yield an access token.
    #[error("{0}")]
    Auth(String),

    /// The backend answered with a non-200 status.
    #[error("{0}")]
    Backend(String),

    /// Network failure or an undecodable response body.
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The exchange rejected an order.
    #[error("{0}")]
    Exchange(String),

    /// Settings file or terminal I/O.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Auth(_) => "auth",
            Self::Backend(_) => "backend",
            Self::Transport(_) => "transport",
            Self::Exchange(_) => "exchange",
            Self::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        let err = RelayError::Backend("token expired".to_string());
        assert_eq!(err.to_string(), "token expired");
        assert_eq!(err.kind(), "backend");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RelayError = io.into();
        assert_eq!(err.kind(), "io");
    }
}
