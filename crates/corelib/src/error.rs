//! Error types for the core library.
//!
//! Every variant is I/O-class: argument validation failures detected by the
//! dispatcher and transmission failures reported by transport hooks share one
//! error type so callers handle both the same way.

use crate::peer::PeerId;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by dispatch operations and transport hooks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was missing.
    #[error("{0}")]
    InvalidArgument(&'static str),
    /// Underlying I/O failure raised by a transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The transport was used before `start` or after `stop`.
    #[error("transport for {0} is not started")]
    NotStarted(PeerId),
    /// The transport was started twice.
    #[error("transport for {0} is already started")]
    AlreadyStarted(PeerId),
    /// Another started endpoint already holds this peer id.
    #[error("peer id {0} is already registered by another endpoint")]
    AlreadyRegistered(PeerId),
    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Message used when a dispatch call is handed no message.
    pub const NULL_MESSAGE: &'static str = "message is null";
    /// Message used when a targeted send is handed no destination.
    pub const NULL_PEER_ID: &'static str = "peer ID can not be null";

    /// True if this error reports a missing argument rather than a transport fault.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = Error::InvalidArgument(Error::NULL_MESSAGE);
        assert_eq!(err.to_string(), "message is null");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_invalid_argument());
        assert!(err.to_string().contains("pipe closed"));
    }
}
