//! Protocol constants
//!
//! Command mnemonics, status replies and size limits of the IM920 serial
//! command interface.

// ============================================================================
// Command Mnemonics (host → module)
// ============================================================================

/// Transmit data over the radio.
pub const CMD_TRANSMIT: &str = "TXDA";
/// Read the module's own ID.
pub const CMD_READ_ID: &str = "RDID";
/// Read the firmware version.
pub const CMD_READ_VERSION: &str = "RDVR";
/// Read the radio channel.
pub const CMD_READ_CHANNEL: &str = "RDCH";
/// Set the radio channel.
pub const CMD_SET_CHANNEL: &str = "STCH";
/// Read the communication (RF) mode.
pub const CMD_READ_COMM_MODE: &str = "RDRT";
/// Set the communication (RF) mode.
pub const CMD_SET_COMM_MODE: &str = "STRT";
/// Read the current RSSI.
pub const CMD_READ_RSSI: &str = "RDRS";
/// Store a receiver ID in the receive table.
pub const CMD_STORE_RECEIVER_ID: &str = "SRID";
/// Read every stored receiver ID.
pub const CMD_READ_RECEIVER_IDS: &str = "RRID";
/// Erase every stored receiver ID.
pub const CMD_ERASE_RECEIVER_IDS: &str = "ERID";
/// Enable writes to non-volatile memory.
pub const CMD_ENABLE_WRITE: &str = "ENWR";
/// Disable writes to non-volatile memory.
pub const CMD_DISABLE_WRITE: &str = "DSWR";

/// Length of every command mnemonic.
pub const MNEMONIC_LEN: usize = 4;

// ============================================================================
// Framing
// ============================================================================

/// Line terminator used in both directions.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Separator between an inbound frame's header and its payload.
pub const FRAME_SEPARATOR: u8 = b':';

/// Separator between header fields and between payload bytes.
pub const FIELD_SEPARATOR: u8 = b',';

/// Reply to a successful command.
pub const REPLY_OK: &[u8] = b"OK\r\n";

/// Reply to a rejected command.
pub const REPLY_NG: &[u8] = b"NG\r\n";

// ============================================================================
// Limits
// ============================================================================

/// Maximum payload accepted by a single `TXDA` command.
pub const MAX_TXDA_SIZE: usize = 64;

/// Maximum number of bytes collected by one receive call.
pub const MAX_READ_SIZE: usize = 256;

/// Default serial baud rate of the module.
pub const DEFAULT_BAUD_RATE: u32 = 19200;
