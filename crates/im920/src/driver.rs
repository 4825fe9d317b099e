//! Command/response engine and inbound frame reads.
//!
//! One lock guards the transport, the pending frame queue and the last read
//! header. Commands and reads both take it for their whole exchange, because
//! both read the same byte stream: a read slipping in between a command and
//! its reply would steal the reply.
//!
//! ```text
//! issue_command ──► lock ──► busy wait ──► write line ──► receive burst
//!                                                            │
//!                                       classify_lines ◄─────┘
//!                                        │            │
//!                              Line::Frame│            │Line::Reply
//!                                        ▼            ▼
//!                              PendingFrames      returned to caller
//!
//! read ──► lock ──► PendingFrames::pop ─┐
//!                   or receive burst ───┴──► parse_frame ──► caller buffer
//! ```

use std::io;

use im920_protocol::{
    classify_lines, encode_command_line, encode_payload, is_ng, is_ok, parse_frame,
    parse_uint16, parse_uint16_lines, reply_text, Command, InboundFrame, Line, ReadInfo,
    CMD_TRANSMIT, MAX_READ_SIZE,
};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::busy::{wait_not_busy, BusyCheck};
use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::queue::PendingFrames;
use crate::reader::{receive, ReadTiming};
use crate::transport::{write_all, SerialTransport, Transport};

/// Everything guarded by the command lock.
struct State<T> {
    /// `None` once the driver has been closed.
    transport: Option<T>,
    pending: PendingFrames,
    last_read_info: ReadInfo,
    busy_check: Option<Box<dyn BusyCheck>>,
}

/// Driver for one IM920 module on one serial connection.
///
/// All methods take `&self`; share the driver between threads with an `Arc`.
/// Calls are serialized: only one command or read talks to the module at a
/// time and the rest block until it finishes.
pub struct Im920<T: Transport> {
    name: String,
    config: DriverConfig,
    state: Mutex<State<T>>,
}

impl Im920<SerialTransport> {
    /// Open the serial port named in `config`.
    pub fn open(config: &DriverConfig) -> Result<Self> {
        let transport = SerialTransport::open(config)?;
        Im920::new(transport, config.clone())
    }
}

impl<T: Transport> Im920<T> {
    /// Create a driver over an already open transport.
    ///
    /// Fails with [`Error::Config`] when the timings in `config` are invalid.
    pub fn new(transport: T, config: DriverConfig) -> Result<Self> {
        config.validate()?;

        let name = if config.port_name.is_empty() {
            "im920".to_string()
        } else {
            config.port_name.clone()
        };

        Ok(Im920 {
            name,
            config,
            state: Mutex::new(State {
                transport: Some(transport),
                pending: PendingFrames::new(),
                last_read_info: ReadInfo::default(),
                busy_check: None,
            }),
        })
    }

    /// Name used in log messages: the port name, or `im920` when unset.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Install a check polled before every command is written.
    pub fn set_busy_check(&self, check: impl BusyCheck + 'static) {
        self.state.lock().busy_check = Some(Box::new(check));
    }

    /// Remove the busy check.
    pub fn clear_busy_check(&self) {
        self.state.lock().busy_check = None;
    }

    /// Header of the last frame successfully returned by [`Im920::read`].
    pub fn last_read_info(&self) -> ReadInfo {
        self.state.lock().last_read_info
    }

    /// Number of inbound frames waiting to be read.
    pub fn pending_frames(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Drop every pending inbound frame, returning how many were dropped.
    pub fn clear_pending_frames(&self) -> usize {
        self.state.lock().pending.clear()
    }

    /// Check whether [`Im920::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().transport.is_none()
    }

    /// Close the transport. Every later call fails with [`Error::Closed`].
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        let mut transport = state.transport.take().ok_or(Error::Closed)?;
        let dropped = state.pending.clear();
        if dropped > 0 {
            warn!("Im920[{}]: closing with {} unread frames", self.name, dropped);
        }
        debug!("Im920[{}]: closed", self.name);
        transport.close()?;
        Ok(())
    }

    fn timing(&self) -> ReadTiming {
        ReadTiming {
            deadline: self.config.read_timeout(),
            idle_gap: self.config.idle_gap(),
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Send `"<mnemonic> <parameter>\r\n"` and return the raw reply.
    ///
    /// Inbound frames that arrive ahead of the reply are queued for
    /// [`Im920::read`]. An `NG` reply is returned as [`Error::NgResponse`]
    /// carrying the reply bytes.
    pub fn issue_command(&self, mnemonic: &str, parameter: &str) -> Result<Vec<u8>> {
        let line = encode_command_line(mnemonic, parameter)?;

        let reply = {
            let mut guard = self.state.lock();
            let State {
                transport,
                pending,
                busy_check,
                ..
            } = &mut *guard;
            let transport = transport.as_mut().ok_or(Error::Closed)?;

            if let Some(check) = busy_check.as_deref() {
                let timeout = self.config.busy_timeout();
                if !wait_not_busy(check, timeout, self.config.busy_poll_interval()) {
                    warn!("Im920[{}]: module busy, {} not sent", self.name, mnemonic);
                    return Err(Error::BusyTimeout(timeout));
                }
            }

            debug!("Im920[{}]: sending {} {}", self.name, mnemonic, parameter);
            write_all(transport, &line)?;

            let mut buf = [0u8; MAX_READ_SIZE];
            let n = receive(transport, &mut buf, self.timing())?;
            trace!(
                "Im920[{}]: received {:?}",
                self.name,
                String::from_utf8_lossy(&buf[..n])
            );

            let mut reply = Vec::new();
            for line in classify_lines(&buf[..n]) {
                match line {
                    Line::Frame(frame) => {
                        pending.push(frame);
                        debug!(
                            "Im920[{}]: queued inbound frame during {} ({} pending)",
                            self.name,
                            mnemonic,
                            pending.len()
                        );
                    }
                    Line::Reply(bytes) => reply = bytes.to_vec(),
                }
            }
            reply
        };

        if reply.is_empty() {
            return Err(Error::NoData);
        }
        if is_ng(&reply) {
            warn!("Im920[{}]: {} rejected with NG", self.name, mnemonic);
            return Err(Error::NgResponse { reply });
        }
        Ok(reply)
    }

    /// Send a typed command and return the raw reply.
    pub fn issue(&self, command: &Command) -> Result<Vec<u8>> {
        self.issue_command(command.mnemonic(), &command.parameter())
    }

    /// Send a command that must be answered with exactly `OK\r\n`.
    pub fn issue_command_normal(&self, mnemonic: &str, parameter: &str) -> Result<()> {
        let reply = self.issue_command(mnemonic, parameter)?;
        if !is_ok(&reply) {
            return Err(Error::UnexpectedResponse(reply));
        }
        Ok(())
    }

    /// Send a command and return its reply text, without the final `\r\n`.
    pub fn issue_command_resp_str(&self, mnemonic: &str, parameter: &str) -> Result<String> {
        let reply = self.issue_command(mnemonic, parameter)?;
        let text = reply_text(&reply)?;
        String::from_utf8(text.to_vec()).map_err(|_| Error::UnexpectedResponse(reply))
    }

    /// Send a command whose reply is one hex number.
    pub fn issue_command_resp_num(&self, mnemonic: &str, parameter: &str) -> Result<u16> {
        let text = self.issue_command_resp_str(mnemonic, parameter)?;
        Ok(parse_uint16(&text)?)
    }

    /// Send a command whose reply is a list of hex numbers, one per line.
    pub fn issue_command_resp_nums(&self, mnemonic: &str, parameter: &str) -> Result<Vec<u16>> {
        let text = self.issue_command_resp_str(mnemonic, parameter)?;
        Ok(parse_uint16_lines(&text)?)
    }

    // ========================================================================
    // Data
    // ========================================================================

    /// Transmit `payload` over the radio.
    ///
    /// At most [`MAX_TXDA_SIZE`](im920_protocol::MAX_TXDA_SIZE) bytes go out
    /// per call; the return value says how many did, so the caller can send
    /// the rest.
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        let (parameter, accepted) = encode_payload(payload);
        self.issue_command_normal(CMD_TRANSMIT, &parameter)?;
        Ok(accepted)
    }

    /// Read the next inbound frame's payload into `buf`.
    ///
    /// Queued frames are returned first, oldest first; otherwise the line is
    /// read directly. The payload is truncated to `buf.len()`. On success the
    /// frame header becomes [`Im920::last_read_info`]; on failure that is left
    /// untouched.
    ///
    /// An empty `buf` returns `Ok(0)` without consuming a frame.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            if self.is_closed() {
                return Err(Error::Closed);
            }
            return Ok(0);
        }

        let frame = self.read_frame()?;
        let n = frame.payload.len().min(buf.len());
        buf[..n].copy_from_slice(&frame.payload[..n]);
        Ok(n)
    }

    /// Read the next inbound frame, header and full payload.
    pub fn read_frame(&self) -> Result<InboundFrame> {
        let mut guard = self.state.lock();
        let State {
            transport,
            pending,
            last_read_info,
            ..
        } = &mut *guard;
        let transport = transport.as_mut().ok_or(Error::Closed)?;

        let line = match pending.pop() {
            Some(line) => line,
            None => {
                let mut buf = [0u8; MAX_READ_SIZE];
                let n = receive(transport, &mut buf, self.timing())?;
                self.take_first_frame(&buf[..n], pending)
            }
        };

        let frame = parse_frame(&line)?;
        *last_read_info = frame.info;
        trace!(
            "Im920[{}]: read {} bytes from {} (rssi {})",
            self.name,
            frame.payload.len(),
            frame.info.id,
            frame.info.rssi
        );
        Ok(frame)
    }

    /// Pick the first frame out of a fresh burst and queue any others.
    ///
    /// A burst with no frame-shaped line is returned whole so the parse error
    /// describes what actually arrived.
    fn take_first_frame(&self, burst: &[u8], pending: &mut PendingFrames) -> Vec<u8> {
        let mut frames = classify_lines(burst)
            .into_iter()
            .filter(Line::is_frame)
            .map(|line| line.as_bytes());

        match frames.next() {
            Some(first) => {
                for extra in frames {
                    pending.push(extra);
                }
                first.to_vec()
            }
            None => burst.to_vec(),
        }
    }
}

// ============================================================================
// std::io adapters
// ============================================================================

impl<T: Transport> io::Read for &Im920<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Im920::read(*self, buf).map_err(io::Error::from)
    }
}

impl<T: Transport> io::Write for &Im920<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Im920::write(*self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
