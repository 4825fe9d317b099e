//! Driver for the IM920 wireless module.
//!
//! The module hangs off a serial port and is half-duplex: the host sends
//! one-line commands and the module answers each with one reply, but frames
//! received over the radio are pushed to the host whenever they arrive,
//! including between a command and its reply. [`Im920`] untangles the two:
//! replies go back to the command that asked for them, frames wait in a queue
//! until [`Im920::read`] collects them.
//!
//! # Example
//!
//! ```no_run
//! use im920::{DriverConfig, Im920};
//!
//! let config = DriverConfig::new("/dev/ttyUSB0");
//! let im = Im920::open(&config)?;
//!
//! println!("module id {}", im.id()?);
//! im.write(b"hello")?;
//!
//! let mut buf = [0u8; 64];
//! let n = im.read(&mut buf)?;
//! println!("{} bytes from {}", n, im.last_read_info().id);
//! # Ok::<(), im920::Error>(())
//! ```

mod busy;
mod config;
mod driver;
mod error;
pub mod mock;
mod queue;
mod reader;
mod registers;
mod transport;

pub use busy::BusyCheck;
pub use config::*;
pub use driver::Im920;
pub use error::{Error, Result};
pub use queue::PendingFrames;
pub use reader::{receive, ReadTiming};
pub use transport::{SerialTransport, Transport};

pub use im920_protocol::{
    Channel, CommMode, Command, Id, InboundFrame, Node, ProtocolError, ReadInfo, Rssi,
    MAX_READ_SIZE, MAX_TXDA_SIZE,
};
