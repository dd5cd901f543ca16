use std::io::ErrorKind;
use std::time::Duration;

use serial2::SerialPort;

use crate::config::Baud;
use crate::transport::SerialIo;
use crate::{ClientResult, Error};

/// Upper bound on one poll of the device for inbound bytes. Doubles as the
/// listener's shutdown-latency bound.
const READ_TIMEOUT: Duration = Duration::from_millis(100);
const READ_CHUNK_SIZE: usize = 100;

/// Raw handle on the serial device.
///
/// `serial2` opens the port in raw mode (8 data bits, no parity, one stop
/// bit, no flow control, no echo); the read timeout makes every read return
/// promptly with whatever is available. The descriptor closes on drop.
pub struct TtyPort {
    port: SerialPort,
}

impl std::fmt::Debug for TtyPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtyPort").finish_non_exhaustive()
    }
}

impl TtyPort {
    pub fn open(path: &str, baud: Baud) -> ClientResult<Self> {
        let mut port = SerialPort::open(path, u32::from(baud)).map_err(|source| Error::PortOpen {
            path: path.to_string(),
            source,
        })?;
        port.set_read_timeout(READ_TIMEOUT)
            .map_err(|source| Error::PortConfig {
                path: path.to_string(),
                source,
            })?;
        Ok(Self { port })
    }
}

impl SerialIo for TtyPort {
    fn read_available(&self) -> ClientResult<Vec<u8>> {
        let mut data = Vec::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.port.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    data.extend_from_slice(&chunk[..n]);
                    // A short chunk means the device is drained; a full one
                    // may have more behind it.
                    if n < chunk.len() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::TimedOut => break,
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(data)
    }

    fn write_all(&self, data: &[u8]) -> ClientResult<()> {
        let written = self.port.write(data).map_err(Error::Io)?;
        if written != data.len() {
            return Err(Error::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_surfaces_missing_device() {
        let err = TtyPort::open("/dev/mculink-does-not-exist", Baud::Baud9600).unwrap_err();
        assert!(matches!(err, Error::PortOpen { .. }));
    }
}
