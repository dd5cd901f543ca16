// Remote pin proxies: every method is one RPC against the MCU.

use log::warn;
use serde_json::Value;

use crate::client::McuClient;
use crate::codec::{Parser, Serializer};
use crate::{ClientResult, Error};

use super::{Direction, Gpi, Gpo, State, decode_report, requests};

/// Remote input pin.
///
/// Construction creates the pin on the MCU; dropping the proxy deletes it
/// best-effort. The proxy borrows the client and owns private copies of the
/// codec pair. It is deliberately not `Clone`: the remote pin has identity.
pub struct GpiProxy<'a, P: Parser, S: Serializer> {
    id: i64,
    client: &'a McuClient<'a>,
    parser: P,
    serializer: S,
    released: bool,
}

impl<'a, P: Parser, S: Serializer> std::fmt::Debug for GpiProxy<'a, P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpiProxy")
            .field("id", &self.id)
            .field("client", &self.client)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl<'a, P: Parser, S: Serializer> GpiProxy<'a, P, S> {
    pub fn new(
        id: i64,
        client: &'a McuClient<'a>,
        parser: &P,
        serializer: &S,
    ) -> ClientResult<Self> {
        let report = transact(
            client,
            parser,
            serializer,
            &requests::create_gpio(id, Direction::In),
        )?;
        decode_report(&report)?;
        Ok(Self {
            id,
            client,
            parser: parser.clone(),
            serializer: serializer.clone(),
            released: false,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Deletes the remote pin, reporting any failure. The drop handler stays
    /// quiet afterwards.
    pub fn close(mut self) -> ClientResult<()> {
        self.released = true;
        let report = self.transact(&requests::delete_gpio(self.id))?;
        decode_report(&report)
    }

    fn transact(&self, request: &Value) -> ClientResult<Value> {
        transact(self.client, &self.parser, &self.serializer, request)
    }
}

impl<P: Parser, S: Serializer> Gpi for GpiProxy<'_, P, S> {
    fn state(&self) -> ClientResult<State> {
        let report = self.transact(&requests::get_gpio(self.id))?;
        decode_report(&report)?;
        read_state(&report)
    }
}

impl<P: Parser, S: Serializer> Drop for GpiProxy<'_, P, S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self
            .transact(&requests::delete_gpio(self.id))
            .and_then(|report| decode_report(&report))
        {
            warn!("failed to delete remote gpi {}: {err}", self.id);
        }
    }
}

/// Remote output pin.
pub struct GpoProxy<'a, P: Parser, S: Serializer> {
    id: i64,
    client: &'a McuClient<'a>,
    parser: P,
    serializer: S,
    released: bool,
}

impl<'a, P: Parser, S: Serializer> GpoProxy<'a, P, S> {
    pub fn new(
        id: i64,
        client: &'a McuClient<'a>,
        parser: &P,
        serializer: &S,
    ) -> ClientResult<Self> {
        let report = transact(
            client,
            parser,
            serializer,
            &requests::create_gpio(id, Direction::Out),
        )?;
        decode_report(&report)?;
        Ok(Self {
            id,
            client,
            parser: parser.clone(),
            serializer: serializer.clone(),
            released: false,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Deletes the remote pin, reporting any failure. The drop handler stays
    /// quiet afterwards.
    pub fn close(mut self) -> ClientResult<()> {
        self.released = true;
        let report = self.transact(&requests::delete_gpio(self.id))?;
        decode_report(&report)
    }

    fn transact(&self, request: &Value) -> ClientResult<Value> {
        transact(self.client, &self.parser, &self.serializer, request)
    }
}

impl<P: Parser, S: Serializer> Gpi for GpoProxy<'_, P, S> {
    fn state(&self) -> ClientResult<State> {
        let report = self.transact(&requests::get_gpio(self.id))?;
        decode_report(&report)?;
        read_state(&report)
    }
}

impl<P: Parser, S: Serializer> Gpo for GpoProxy<'_, P, S> {
    fn set_state(&self, state: State) -> ClientResult<()> {
        let report = self.transact(&requests::set_gpio(self.id, state))?;
        decode_report(&report)
    }
}

impl<P: Parser, S: Serializer> Drop for GpoProxy<'_, P, S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self
            .transact(&requests::delete_gpio(self.id))
            .and_then(|report| decode_report(&report))
        {
            warn!("failed to delete remote gpo {}: {err}", self.id);
        }
    }
}

fn transact<P: Parser, S: Serializer>(
    client: &McuClient<'_>,
    parser: &P,
    serializer: &S,
    request: &Value,
) -> ClientResult<Value> {
    let raw = serializer.serialize(request)?;
    let reply = client.run(&raw)?;
    parser.parse(&reply)
}

fn read_state(report: &Value) -> ClientResult<State> {
    let raw = report
        .get(requests::GPIO_STATE)
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            Error::InvalidResponse("report carries no gpio_state field".to_string())
        })?;
    State::try_from(raw)
}
