//! Commands that can be sent to the IM920 module.
//!
//! Every command is a 4-letter mnemonic followed by a space and an optional
//! uppercase hex parameter, terminated by `\r\n`:
//!
//! ```text
//! STCH 05\r\n
//! RDID \r\n
//! ```

use crate::codec::{encode_command_line, encode_payload};
use crate::constants::*;
use crate::error::ProtocolResult;
use crate::types::{Channel, CommMode, Id};

/// Commands understood by the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ========== Data ==========
    /// Transmit a payload over the radio (at most [`MAX_TXDA_SIZE`] bytes are sent).
    Transmit {
        /// Bytes to send.
        payload: Vec<u8>,
    },

    // ========== Read Commands ==========
    /// Read the module ID.
    ReadId,

    /// Read the firmware version string.
    ReadVersion,

    /// Read the radio channel.
    ReadChannel,

    /// Read the communication mode.
    ReadCommMode,

    /// Read the current RSSI.
    ReadRssi,

    /// Read every stored receiver ID.
    ReadReceiverIds,

    // ========== Set Commands ==========
    /// Set the radio channel.
    SetChannel {
        /// The channel to use.
        channel: Channel,
    },

    /// Set the communication mode.
    SetCommMode {
        /// The mode to use.
        mode: CommMode,
    },

    /// Store a receiver ID (requires [`Command::EnableWrite`] first).
    StoreReceiverId {
        /// ID of the module to accept frames from.
        id: Id,
    },

    /// Erase every stored receiver ID (requires [`Command::EnableWrite`] first).
    EraseReceiverIds,

    // ========== Non-volatile Memory ==========
    /// Enable writes to non-volatile memory.
    EnableWrite,

    /// Disable writes to non-volatile memory.
    DisableWrite,

    // ========== Raw Command ==========
    /// Send an arbitrary mnemonic/parameter pair.
    Raw {
        /// The 4-letter mnemonic.
        mnemonic: String,
        /// The parameter text.
        parameter: String,
    },
}

impl Command {
    /// Get the 4-letter mnemonic.
    pub fn mnemonic(&self) -> &str {
        match self {
            Command::Transmit { .. } => CMD_TRANSMIT,
            Command::ReadId => CMD_READ_ID,
            Command::ReadVersion => CMD_READ_VERSION,
            Command::ReadChannel => CMD_READ_CHANNEL,
            Command::ReadCommMode => CMD_READ_COMM_MODE,
            Command::ReadRssi => CMD_READ_RSSI,
            Command::ReadReceiverIds => CMD_READ_RECEIVER_IDS,
            Command::SetChannel { .. } => CMD_SET_CHANNEL,
            Command::SetCommMode { .. } => CMD_SET_COMM_MODE,
            Command::StoreReceiverId { .. } => CMD_STORE_RECEIVER_ID,
            Command::EraseReceiverIds => CMD_ERASE_RECEIVER_IDS,
            Command::EnableWrite => CMD_ENABLE_WRITE,
            Command::DisableWrite => CMD_DISABLE_WRITE,
            Command::Raw { mnemonic, .. } => mnemonic.as_str(),
        }
    }

    /// Get the parameter text (empty for commands without one).
    pub fn parameter(&self) -> String {
        match self {
            Command::Transmit { payload } => encode_payload(payload).0,
            Command::SetChannel { channel } => channel.to_hex(),
            Command::SetCommMode { mode } => mode.to_hex(),
            Command::StoreReceiverId { id } => id.to_hex(),
            Command::Raw { parameter, .. } => parameter.clone(),
            _ => String::new(),
        }
    }

    /// Encode the command as a line to send to the module.
    /// Returns the bytes to send (including the `\r\n` terminator).
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        encode_command_line(self.mnemonic(), &self.parameter())
    }
}
