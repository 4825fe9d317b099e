//! Error types for the IM920 wire protocol.

use thiserror::Error;

/// Errors that can occur when encoding or decoding IM920 lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The `node,id,rssi` header of an inbound frame could not be parsed.
    #[error("malformed frame header: {0}")]
    MalformedHeader(String),

    /// A field that should be hexadecimal was not.
    #[error("invalid hex: {0:?}")]
    InvalidHex(String),

    /// A hex value decoded to an unsupported number of bytes.
    #[error("invalid size: expected at most {max} bytes, got {actual}")]
    Size {
        /// Maximum allowed byte count.
        max: usize,
        /// Byte count that was decoded.
        actual: usize,
    },

    /// The line did not contain the `\r\n` terminator.
    #[error("missing line terminator: {0:?}")]
    MissingTerminator(String),

    /// An inbound frame carried no payload bytes.
    #[error("inbound frame has an empty payload")]
    EmptyPayload,

    /// A numeric reply was empty.
    #[error("empty value")]
    EmptyValue,

    /// A command mnemonic was not 4 ASCII alphanumeric characters.
    #[error("invalid mnemonic: {0:?}")]
    InvalidMnemonic(String),

    /// The module reported a communication mode this crate does not know.
    #[error("unknown communication mode: {0}")]
    UnknownCommMode(u16),
}

impl ProtocolError {
    /// Create a malformed header error.
    pub fn malformed_header(message: impl Into<String>) -> Self {
        ProtocolError::MalformedHeader(message.into())
    }

    /// Create a missing terminator error from raw line bytes.
    pub fn missing_terminator(line: &[u8]) -> Self {
        ProtocolError::MissingTerminator(String::from_utf8_lossy(line).into_owned())
    }
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::malformed_header("00,06E5");
        assert!(err.to_string().contains("00,06E5"));

        let err = ProtocolError::Size { max: 2, actual: 3 };
        assert_eq!(err.to_string(), "invalid size: expected at most 2 bytes, got 3");

        let err = ProtocolError::missing_terminator(b"0A,1F");
        assert!(err.to_string().contains("0A,1F"));
    }
}
