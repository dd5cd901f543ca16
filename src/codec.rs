// Wire codec between raw frames and the structured request/report model.

use serde_json::Value;

use crate::{ClientResult, Error};

/// Decodes one frame payload into structured data.
///
/// Implementations are stateless strategies, cheap to clone, so every proxy
/// can own a private copy.
pub trait Parser: Clone {
    fn parse(&self, data: &[u8]) -> ClientResult<Value>;
}

/// Encodes structured data into one frame payload.
pub trait Serializer: Clone {
    fn serialize(&self, data: &Value) -> ClientResult<Vec<u8>>;
}

/// JSON decoder matching the MCU firmware's wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for JsonParser {
    fn parse(&self, data: &[u8]) -> ClientResult<Value> {
        serde_json::from_slice(data).map_err(Error::Decode)
    }
}

/// JSON encoder matching the MCU firmware's wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, data: &Value) -> ClientResult<Vec<u8>> {
        serde_json::to_vec(data).map_err(Error::Encode)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_and_serialize_round_out_the_report_schema() {
        let parser = JsonParser::new();
        let report = parser.parse(b"{\"result\":1,\"what\":\"no such pin\"}").unwrap();
        assert_eq!(Some(1), report.get("result").and_then(Value::as_i64));
        assert_eq!(
            Some("no such pin"),
            report.get("what").and_then(Value::as_str)
        );

        let serializer = JsonSerializer::new();
        let raw = serializer
            .serialize(&json!({"ctor_id": 3, "gpio_id": 10}))
            .unwrap();
        assert_eq!(parser.parse(&raw).unwrap(), json!({"ctor_id": 3, "gpio_id": 10}));
    }

    #[test]
    fn parse_rejects_malformed_payloads() {
        assert!(matches!(
            JsonParser::new().parse(b"{\"result\":"),
            Err(Error::Decode(_))
        ));
    }
}
