//! Error types for the IM920 driver.

use std::io;
use std::time::Duration;

use im920_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while driving an IM920 module.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on the underlying byte stream.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The serial port could not be opened.
    #[error("failed to open serial port {port}: {source}")]
    SerialOpen {
        /// Port name that was requested.
        port: String,
        /// Error reported by the serial port layer.
        #[source]
        source: serialport::Error,
    },

    /// Nothing was received before the read deadline.
    #[error("no data received")]
    NoData,

    /// The busy check did not clear before the deadline.
    #[error("module still busy after {0:?}")]
    BusyTimeout(Duration),

    /// The module answered `NG`.
    #[error("module rejected the command (NG)")]
    NgResponse {
        /// The raw reply, kept for diagnostics.
        reply: Vec<u8>,
    },

    /// A reply was received but is not the one expected.
    #[error("unexpected response: {:?}", String::from_utf8_lossy(.0))]
    UnexpectedResponse(Vec<u8>),

    /// The driver has been closed.
    #[error("driver is closed")]
    Closed,

    /// Invalid driver configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Wire-format violation.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Whether repeating the same call may succeed without changing anything.
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::NoData | Error::BusyTimeout(_) => true,
            Error::Protocol(ProtocolError::EmptyPayload) => true,
            Error::Transport(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Transport(e) => e,
            Error::NoData => io::Error::new(io::ErrorKind::TimedOut, err),
            Error::Closed => io::Error::new(io::ErrorKind::NotConnected, err),
            Error::Protocol(_) | Error::UnexpectedResponse(_) => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
            other => io::Error::other(other),
        }
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnexpectedResponse(b"FUGA\r\n".to_vec());
        assert!(err.to_string().contains("FUGA"));

        let err = Error::from(ProtocolError::EmptyPayload);
        assert_eq!(err.to_string(), "inbound frame has an empty payload");
    }

    #[test]
    fn test_retriable() {
        assert!(Error::NoData.is_retriable());
        assert!(Error::BusyTimeout(Duration::from_millis(500)).is_retriable());
        assert!(Error::from(ProtocolError::EmptyPayload).is_retriable());
        assert!(!Error::NgResponse { reply: b"NG\r\n".to_vec() }.is_retriable());
        assert!(!Error::from(ProtocolError::EmptyValue).is_retriable());
        assert!(!Error::Closed.is_retriable());
    }

    #[test]
    fn test_into_io_error() {
        let err: io::Error = Error::NoData.into();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        let err: io::Error = Error::Closed.into();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);

        let err: io::Error = Error::from(ProtocolError::EmptyPayload).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let err: io::Error = Error::Transport(io::ErrorKind::BrokenPipe.into()).into();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
