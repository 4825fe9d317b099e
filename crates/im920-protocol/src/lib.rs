//! IM920 Serial Protocol
//!
//! This crate provides types and utilities for talking to an IM920 wireless
//! module over its serial command interface. It does no I/O: the `im920`
//! driver crate owns the port and uses this crate to encode command lines and
//! to make sense of what comes back.
//!
//! # Protocol Overview
//!
//! The module speaks a line-based ASCII protocol at 19200 baud:
//!
//! - **Commands** (host → module): `<MNEM> <HEX PARAM>\r\n`, e.g. `STCH 05\r\n`
//! - **Replies** (module → host): `OK\r\n`, `NG\r\n`, or hex values, one per line
//! - **Inbound frames** (module → host, unsolicited): `node,id,rssi:XX,XX,...\r\n`
//!
//! Inbound frames can arrive at any time, including in the middle of a
//! command exchange, so a receive buffer is first split with
//! [`classify_lines`] into [`Line::Frame`]s and the [`Line::Reply`].
//!
//! # Example
//!
//! ```rust
//! use im920_protocol::{classify_lines, parse_frame, Command, Line};
//!
//! let line = Command::ReadId.encode()?;
//! assert_eq!(line, b"RDID \r\n");
//!
//! let lines = classify_lines(b"00,06E5,B5:0A,1F\r\nOK\r\n");
//! assert_eq!(lines.last(), Some(&Line::Reply(b"OK\r\n")));
//!
//! let frame = parse_frame(lines[0].as_bytes())?;
//! assert_eq!(frame.payload, vec![0x0A, 0x1F]);
//! # Ok::<(), im920_protocol::ProtocolError>(())
//! ```

mod codec;
mod commands;
mod constants;
mod error;
mod responses;
mod types;

pub use codec::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use responses::*;
pub use types::*;
