//! Byte-stream transport to the module.
//!
//! The driver never touches a serial port directly; it reads and writes
//! through [`Transport`]. [`SerialTransport`] is the real thing, and
//! [`MockTransport`](crate::mock::MockTransport) scripts the module for tests.

use std::io::{self, Read, Write};

use serialport::SerialPort;
use tracing::debug;

use crate::config::DriverConfig;
use crate::error::{Error, Result};

/// Blocking byte-level transport to the module.
pub trait Transport: Send {
    /// Read up to `buf.len()` bytes.
    ///
    /// Returning `Ok(0)` means nothing is available right now; it does not
    /// mean end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write bytes, returning how many were accepted.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Release the underlying resource.
    fn close(&mut self) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Write all of `data`, retrying short writes.
pub(crate) fn write_all<T: Transport + ?Sized>(transport: &mut T, mut data: &[u8]) -> io::Result<()> {
    while !data.is_empty() {
        match transport.write(data) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => data = &data[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// A serial port opened with the module's line settings (8N1).
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Open the port named in `config`.
    ///
    /// The port's own read timeout is set to the time 100 bytes take on the
    /// wire, so an idle line makes each read return instead of blocking for
    /// the whole receive deadline.
    pub fn open(config: &DriverConfig) -> Result<Self> {
        if config.port_name.is_empty() {
            return Err(Error::config("port_name must be set"));
        }
        config.validate()?;

        let port = serialport::new(&config.port_name, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.port_read_timeout())
            .open()
            .map_err(|source| Error::SerialOpen {
                port: config.port_name.clone(),
                source,
            })?;

        debug!(
            "SerialTransport[{}]: opened at {} baud",
            config.port_name, config.baud_rate
        );

        Ok(SerialTransport {
            port,
            name: config.port_name.clone(),
        })
    }

    /// Get the port name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            other => other,
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let n = self.port.write(data)?;
        self.port.flush()?;
        Ok(n)
    }

    fn close(&mut self) -> io::Result<()> {
        debug!("SerialTransport[{}]: closing", self.name);
        self.port.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[test]
    fn test_open_requires_port_name() {
        let err = SerialTransport::open(&DriverConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_write_all_through_box() {
        let mock = MockTransport::new();
        let mut boxed: Box<dyn Transport> = Box::new(mock.clone());
        write_all(&mut boxed, b"RDID \r\n").unwrap();
        assert_eq!(mock.written(), vec![b"RDID \r\n".to_vec()]);
    }
}
