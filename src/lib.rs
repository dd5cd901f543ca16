//! Remote control of MCU general-purpose I/O pins over a serial line.
//!
//! The `mculink` crate implements the host side of a framed request/reply
//! protocol: the MCU firmware physically owns the pins, the host issues
//! structured commands (create a pin, read it, drive it, delay, run a
//! sequence) and decodes the structured reports that come back.
//!
//! The stack, bottom up:
//! * a raw TTY handle ([`transport::TtyPort`]),
//! * head/tail framing over the byte stream ([`transport::FrameBuffer`]),
//! * a connection with a background listener thread ([`transport::Connection`]),
//! * a synchronous one-request-one-reply client ([`McuClient`]),
//! * remote pin proxies ([`GpiProxy`], [`GpoProxy`]) and a four-phase
//!   step-motor driver ([`StepMotor`]) on top.
//!
//! # Example
//! This example opens a connection to the MCU, claims pin 25 as an output
//! and drives it high.
//!
//! ```no_run
//! use mculink::{Baud, Gpo, GpoProxy, JsonParser, JsonSerializer, McuClient, PortConfig, State};
//! use mculink::transport::Connection;
//!
//! fn example() -> Result<(), mculink::Error> {
//!     let cfg = PortConfig::new("/dev/ttyACM0", Baud::Baud115200, "MSG_HEADER", "MSG_TAIL", 1000)?;
//!     let conn = Connection::open(&cfg)?;
//!     let client = McuClient::new(&conn);
//!
//!     let parser = JsonParser::new();
//!     let serializer = JsonSerializer::new();
//!     let led = GpoProxy::new(25, &client, &parser, &serializer)?;
//!     led.set_state(State::High)?;
//!     led.close()?;
//!     Ok(())
//! }
//! ```
use std::io;

use thiserror::Error;

pub mod client;
pub mod codec;
pub mod config;
pub mod gpio;
pub mod motor;
pub mod transport;

pub use client::McuClient;
pub use codec::{JsonParser, JsonSerializer, Parser, Serializer};
pub use config::{Baud, PortConfig};
pub use gpio::{Direction, Gpi, Gpo, GpiProxy, GpoProxy, State};
pub use motor::{SpinDirection, StepMotor};
pub use transport::{Channel, Connection, SerialIo};

/// Errors surfaced by the client stack.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to open {path}: {source}")]
    PortOpen { path: String, source: io::Error },
    #[error("failed to configure {path}: {source}")]
    PortConfig { path: String, source: io::Error },
    #[error("unsupported baud rate: {0}")]
    UnsupportedBaud(u32),
    #[error("short write: {written} of {expected} bytes accepted")]
    ShortWrite { written: usize, expected: usize },
    #[error("{0}")]
    InvalidConfig(String),
    #[error("no complete frame buffered")]
    Empty,
    #[error("timed out waiting for a frame")]
    Timeout,
    #[error("listener thread died: {0}")]
    ListenerDead(String),
    #[error("failed to decode report: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("device reported failure (result = {code}): {}", what.as_deref().unwrap_or("no diagnostic attached"))]
    RemoteFailure { code: i64, what: Option<String> },
    #[error("{0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ClientResult<T> = std::result::Result<T, Error>;
