//! Scripted in-memory transport for testing without a module.
//!
//! [`MockTransport`] plays the module's side of the serial line. Bytes pushed
//! with [`MockTransport::push_rx`] are readable straight away (unsolicited
//! traffic); replies queued with [`MockTransport::queue_reply`] become
//! readable when the driver writes its next command.
//!
//! # Example
//!
//! ```
//! use im920::mock::MockTransport;
//! use im920::{DriverConfig, Im920};
//!
//! let mock = MockTransport::new();
//! mock.queue_reply(b"06E5\r\n");
//!
//! let im = Im920::new(mock.clone(), DriverConfig::default())?;
//! assert_eq!(im.id()?.0, 0x06E5);
//! assert_eq!(mock.written(), vec![b"RDID \r\n".to_vec()]);
//! # Ok::<(), im920::Error>(())
//! ```

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::transport::Transport;

#[derive(Debug, Default)]
struct MockState {
    /// Bytes the driver can read.
    rx: VecDeque<u8>,
    /// Replies released into `rx`, one per write.
    replies: VecDeque<Vec<u8>>,
    /// Errors returned by `read` once `rx` is drained.
    read_errors: VecDeque<io::ErrorKind>,
    /// Errors returned by the next writes.
    write_errors: VecDeque<io::ErrorKind>,
    /// Everything the driver wrote, one entry per write.
    written: Vec<Vec<u8>>,
    closed: bool,
}

/// A [`Transport`] backed by shared in-memory buffers.
///
/// Clones share state, so a test keeps one clone to script and inspect the
/// line while the driver owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create an idle mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bytes readable immediately.
    pub fn push_rx(&self, data: &[u8]) {
        self.state.lock().rx.extend(data);
    }

    /// Make bytes readable after the next write.
    pub fn queue_reply(&self, data: &[u8]) {
        self.state.lock().replies.push_back(data.to_vec());
    }

    /// Fail a read with `kind` once all readable bytes are consumed.
    pub fn fail_next_read(&self, kind: io::ErrorKind) {
        self.state.lock().read_errors.push_back(kind);
    }

    /// Fail the next write with `kind`.
    pub fn fail_next_write(&self, kind: io::ErrorKind) {
        self.state.lock().write_errors.push_back(kind);
    }

    /// Everything written so far, one entry per write call.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    /// Written data as text lines (lossy), one per write call.
    pub fn written_lines(&self) -> Vec<String> {
        self.state
            .lock()
            .written
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Number of readable bytes not yet consumed.
    pub fn rx_remaining(&self) -> usize {
        self.state.lock().rx.len()
    }

    /// Number of queued replies not yet released.
    pub fn replies_remaining(&self) -> usize {
        self.state.lock().replies.len()
    }

    /// Check whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(io::ErrorKind::NotConnected.into());
        }
        if state.rx.is_empty() {
            if let Some(kind) = state.read_errors.pop_front() {
                return Err(kind.into());
            }
            return Ok(0);
        }

        let n = buf.len().min(state.rx.len());
        for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(io::ErrorKind::NotConnected.into());
        }
        if let Some(kind) = state.write_errors.pop_front() {
            return Err(kind.into());
        }

        state.written.push(data.to_vec());
        if let Some(reply) = state.replies.pop_front() {
            state.rx.extend(reply);
        }
        Ok(data.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_released_on_write() {
        let mut mock = MockTransport::new();
        mock.queue_reply(b"OK\r\n");

        let mut buf = [0u8; 8];
        assert_eq!(mock.read(&mut buf).unwrap(), 0);

        mock.write(b"HOGE HUGA\r\n").unwrap();
        assert_eq!(mock.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"OK\r\n");
        assert_eq!(mock.written_lines(), vec!["HOGE HUGA\r\n".to_string()]);
    }

    #[test]
    fn test_read_errors_wait_for_drained_rx() {
        let mut mock = MockTransport::new();
        mock.push_rx(b"A");
        mock.fail_next_read(io::ErrorKind::BrokenPipe);

        let mut buf = [0u8; 1];
        assert_eq!(mock.read(&mut buf).unwrap(), 1);
        assert_eq!(
            mock.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
        assert_eq!(mock.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_closed_mock_fails() {
        let mut mock = MockTransport::new();
        mock.close().unwrap();
        assert!(mock.is_closed());
        assert!(mock.write(b"x").is_err());
        assert!(mock.read(&mut [0u8; 1]).is_err());
    }
}
