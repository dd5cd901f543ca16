// Contains types restricting values related to the serial link
use std::time::Duration;

use derive_more;

use crate::{ClientResult, Error};

/// How long `readable` parks on the condition variable before reporting the
/// queue state.
pub(crate) const READABLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Baud rates the MCU-side UART accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Baud {
    #[display("9600")]
    Baud9600,
    #[display("115200")]
    Baud115200,
}

impl From<Baud> for u32 {
    fn from(baud: Baud) -> Self {
        match baud {
            Baud::Baud9600 => 9_600,
            Baud::Baud115200 => 115_200,
        }
    }
}

impl TryFrom<u32> for Baud {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            9_600 => Ok(Self::Baud9600),
            115_200 => Ok(Self::Baud115200),
            other => Err(Error::UnsupportedBaud(other)),
        }
    }
}

/// Immutable description of the serial link to one MCU.
///
/// `head` and `tail` are the frame markers both sides agree on; `capacity`
/// bounds the framer's byte accumulator.
#[derive(Debug, Clone)]
pub struct PortConfig {
    pub path: String,
    pub baud: Baud,
    pub head: Vec<u8>,
    pub tail: Vec<u8>,
    pub capacity: usize,
    pub readable_timeout: Duration,
}

impl PortConfig {
    pub fn new(
        path: impl Into<String>,
        baud: Baud,
        head: impl Into<Vec<u8>>,
        tail: impl Into<Vec<u8>>,
        capacity: usize,
    ) -> ClientResult<Self> {
        let cfg = Self {
            path: path.into(),
            baud,
            head: head.into(),
            tail: tail.into(),
            capacity,
            readable_timeout: READABLE_TIMEOUT,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> ClientResult<()> {
        if self.head.is_empty() || self.tail.is_empty() {
            return Err(Error::InvalidConfig(
                "frame markers must be non-empty".to_string(),
            ));
        }
        if self.head == self.tail {
            return Err(Error::InvalidConfig(
                "head and tail markers must differ".to_string(),
            ));
        }
        if self.capacity == 0 {
            return Err(Error::InvalidConfig(
                "buffer capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
