//! Common types used in the protocol.

use std::fmt;

use crate::error::ProtocolError;

/// A module ID (the 16-bit identifier burned into every IM920).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Id(pub u16);

impl Id {
    /// Encode as the 4-digit uppercase hex parameter used by `SRID`.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0.to_be_bytes())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

impl From<u16> for Id {
    fn from(value: u16) -> Self {
        Id(value)
    }
}

/// A node number as reported in an inbound frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Node(pub u8);

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

/// A radio channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Channel(pub u8);

impl Channel {
    /// Encode as the 2-digit uppercase hex parameter used by `STCH`.
    pub fn to_hex(&self) -> String {
        hex::encode_upper([self.0])
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw received signal strength as reported by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rssi(pub u8);

impl fmt::Display for Rssi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

/// RF communication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommMode {
    /// High-speed mode (50 kbps).
    Fast = 1,
    /// Long-range mode (1.25 kbps).
    Long = 2,
}

impl CommMode {
    /// Encode as the 2-digit hex parameter used by `STRT`.
    pub fn to_hex(&self) -> String {
        hex::encode_upper([*self as u8])
    }
}

impl TryFrom<u16> for CommMode {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CommMode::Fast),
            2 => Ok(CommMode::Long),
            other => Err(ProtocolError::UnknownCommMode(other)),
        }
    }
}

/// Header of an inbound frame: who sent it and how strong it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReadInfo {
    /// Node number of the sender.
    pub node: Node,
    /// Module ID of the sender.
    pub id: Id,
    /// Signal strength the frame was received at.
    pub rssi: Rssi,
}

/// A frame received over the radio from another module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    /// Sender and signal strength.
    pub info: ReadInfo,
    /// Payload bytes (never empty).
    pub payload: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_hex_is_zero_padded_uppercase() {
        assert_eq!(Id(0x0001).to_hex(), "0001");
        assert_eq!(Id(0xBEEF).to_hex(), "BEEF");
        assert_eq!(Id(0x06E5).to_string(), "06E5");
    }

    #[test]
    fn test_channel_and_mode_hex() {
        assert_eq!(Channel(1).to_hex(), "01");
        assert_eq!(Channel(0x1F).to_hex(), "1F");
        assert_eq!(CommMode::Fast.to_hex(), "01");
        assert_eq!(CommMode::Long.to_hex(), "02");
    }

    #[test]
    fn test_comm_mode_from_number() {
        assert_eq!(CommMode::try_from(1), Ok(CommMode::Fast));
        assert_eq!(CommMode::try_from(2), Ok(CommMode::Long));
        assert_eq!(
            CommMode::try_from(3),
            Err(ProtocolError::UnknownCommMode(3))
        );
    }
}
