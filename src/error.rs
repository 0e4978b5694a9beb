//! Crate error types
//!
//! Protocol violations are fatal to the connection that produced them and
//! are surfaced as values up the per-connection loop; they never tear down
//! unrelated connections or the process.

/// Convenience result type for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Transport error (read/write failure, peer disconnect)
    Io(std::io::Error),
    /// Protocol violation by the peer
    Protocol(ProtocolError),
}

/// Protocol violations, all fatal to the offending connection
#[derive(Debug)]
pub enum ProtocolError {
    /// The line after PASS was not a well-formed `NICK <nickname>`
    ImproperAuth(String),
    /// A second PASS arrived on an already-authenticated connection
    AlreadyAuthenticated,
    /// JOIN received before authentication
    NotAuthenticated,
    /// A recognized command did not match its expected shape
    MalformedCommand(String),
    /// A forwarded message named a channel without the `#` prefix
    MalformedChannel(String),
    /// Inbound line was not valid UTF-8
    InvalidUtf8,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
        }
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::ImproperAuth(line) => {
                write!(f, "malformed authentication: {:?}", line)
            }
            ProtocolError::AlreadyAuthenticated => write!(f, "already authenticated"),
            ProtocolError::NotAuthenticated => write!(f, "not authenticated"),
            ProtocolError::MalformedCommand(line) => write!(f, "malformed command: {:?}", line),
            ProtocolError::MalformedChannel(channel) => {
                write!(f, "malformed channel name: {:?}", channel)
            }
            ProtocolError::InvalidUtf8 => write!(f, "line is not valid UTF-8"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Protocol(e) => Some(e),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}
