/* Abstraction for the transport semantics */

use crate::ClientResult;

pub mod connection;
pub mod framer;
pub mod tty;

pub use connection::Connection;
pub use framer::FrameBuffer;
pub use tty::TtyPort;

/// Byte-level access to the serial device.
///
/// The listener thread is the sole reader, `Connection::send` the sole
/// writer, so implementations only need interior mutability for whatever
/// state the two paths share.
pub trait SerialIo: Send + Sync {
    /// Drains whatever the device currently has buffered, blocking at most
    /// one per-read timeout. An empty result means nothing arrived in time.
    fn read_available(&self) -> ClientResult<Vec<u8>>;

    /// Puts the whole buffer on the wire.
    fn write_all(&self, data: &[u8]) -> ClientResult<()>;
}

/// Frame-level surface of a connection, consumed by the client.
pub trait Channel {
    /// Frames the payload and writes it out synchronously.
    fn send(&self, payload: &[u8]) -> ClientResult<()>;

    /// Reports whether a frame is queued, waiting up to the connection's
    /// readable timeout for one to arrive.
    fn readable(&self) -> ClientResult<bool>;

    /// Removes and returns the oldest queued frame.
    fn read(&self) -> ClientResult<Vec<u8>>;
}
