//! Built-in event codecs

use bytes::Bytes;
use serde::de::IgnoredAny;
use serde_json::Value;

use contracts::{Codec, ContractError, Event};

/// Encodes an event as one JSON object: header fields plus the body as a string
///
/// The body must be valid UTF-8. A header field with the same name as the
/// body field is overwritten by the body.
#[derive(Debug, Clone)]
pub struct JsonCodec {
    body_field: String,
}

impl JsonCodec {
    pub const NAME: &'static str = "json";

    pub fn new() -> Self {
        Self::with_body_field("body")
    }

    /// Use a custom key for the event body
    pub fn with_body_field(body_field: impl Into<String>) -> Self {
        Self {
            body_field: body_field.into(),
        }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn encode(&self, event: &Event) -> Result<Bytes, ContractError> {
        let body = std::str::from_utf8(&event.body).map_err(|e| ContractError::Encode {
            codec: Self::NAME.to_string(),
            message: "event body is not valid UTF-8".to_string(),
            source: Some(Box::new(e)),
        })?;

        let mut object = event.header.clone();
        object.insert(self.body_field.clone(), Value::String(body.to_owned()));

        serde_json::to_vec(&Value::Object(object))
            .map(Bytes::from)
            .map_err(|e| ContractError::Encode {
                codec: Self::NAME.to_string(),
                message: format!("json error: {e}"),
                source: Some(Box::new(e)),
            })
    }
}

/// Passes the event body through unchanged after checking it is one JSON value
///
/// Headers are ignored. Used when the upstream already produces JSON records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawJsonCodec;

impl RawJsonCodec {
    pub const NAME: &'static str = "raw_json";
}

impl Codec for RawJsonCodec {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn encode(&self, event: &Event) -> Result<Bytes, ContractError> {
        serde_json::from_slice::<IgnoredAny>(&event.body).map_err(|e| ContractError::Encode {
            codec: Self::NAME.to_string(),
            message: format!("body is not a single JSON value: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(event.body.clone())
    }
}
