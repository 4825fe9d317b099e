//! Idle-gap byte reader.
//!
//! The module does not length-prefix anything and sometimes drops the trailing
//! `\r\n` on long replies, so the only reliable end-of-burst signal is the line
//! going quiet. Bytes are read one at a time until the buffer fills, the line
//! has been quiet for the idle gap after at least one byte, or the overall
//! deadline passes.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Back-off between empty polls so an always-ready transport does not spin.
const EMPTY_POLL_BACKOFF: Duration = Duration::from_millis(1);

/// Deadlines for one receive call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTiming {
    /// Overall deadline for the call.
    pub deadline: Duration,
    /// Quiet time after the last byte that ends the burst.
    pub idle_gap: Duration,
}

/// Transport errors that only mean "nothing right now".
fn is_quiet(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::UnexpectedEof
    )
}

/// Read one burst from `transport` into `buf`.
///
/// Returns the number of bytes read. Running out of time with nothing read is
/// [`Error::NoData`]; running out of time after the first byte returns what
/// was read. A hard transport error after the first byte also ends the burst
/// successfully.
pub fn receive<T: Transport + ?Sized>(
    transport: &mut T,
    buf: &mut [u8],
    timing: ReadTiming,
) -> Result<usize> {
    let started = Instant::now();
    let mut received = 0;
    let mut last_byte_at: Option<Instant> = None;

    while received < buf.len() {
        if started.elapsed() >= timing.deadline {
            if received == 0 {
                return Err(Error::NoData);
            }
            trace!("receive: deadline reached after {} bytes", received);
            break;
        }

        let n = match transport.read(&mut buf[received..received + 1]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_quiet(&e) => 0,
            Err(e) if received > 0 => {
                debug!("receive: transport error after {} bytes treated as end: {}", received, e);
                break;
            }
            Err(e) => return Err(Error::Transport(e)),
        };

        if n > 0 {
            received += n;
            last_byte_at = Some(Instant::now());
            continue;
        }

        if let Some(at) = last_byte_at {
            if at.elapsed() >= timing.idle_gap {
                break;
            }
        }
        thread::sleep(EMPTY_POLL_BACKOFF);
    }

    Ok(received)
}
