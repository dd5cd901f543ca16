// Remote GPIO surface: wire enums, capability traits and report decoding.

use derive_more;
use serde_json::Value;

use crate::{ClientResult, Error};

pub mod proxy;
pub mod requests;

pub use proxy::{GpiProxy, GpoProxy};

/// Logical level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum State {
    Low,
    High,
}

impl From<State> for i64 {
    fn from(state: State) -> Self {
        match state {
            State::Low => 0,
            State::High => 1,
        }
    }
}

impl TryFrom<i64> for State {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Low),
            1 => Ok(Self::High),
            other => Err(Error::InvalidResponse(format!(
                "invalid gpio state: {other}"
            ))),
        }
    }
}

/// Direction a pin is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Direction {
    In,
    Out,
}

impl From<Direction> for i64 {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::In => 0,
            Direction::Out => 1,
        }
    }
}

/// Read capability of a remote pin.
pub trait Gpi {
    fn state(&self) -> ClientResult<State>;
}

/// Write capability of a remote pin.
pub trait Gpo: Gpi {
    fn set_state(&self, state: State) -> ClientResult<()>;
}

/// Checks the `result` field of a report, surfacing whatever diagnostic the
/// MCU attached when it is nonzero.
pub fn decode_report(report: &Value) -> ClientResult<()> {
    let code = report
        .get(requests::RESULT)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::InvalidResponse("report carries no result field".to_string()))?;
    if code != 0 {
        let what = report
            .get(requests::WHAT)
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(Error::RemoteFailure { code, what });
    }
    Ok(())
}
