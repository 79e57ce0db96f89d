//! Text encoding of request and response envelopes.
//!
//! The client only ever hands a [`Codec`] a `serde_json::Value` and gets one
//! back, so a deployment that needs different rules for domain values (custom
//! date encodings, tagged objects) can plug in its own implementation.

use crate::error::Result;
use serde_json::Value;

pub trait Codec: Send + Sync {
    fn serialize(&self, value: &Value) -> Result<String>;
    fn deserialize(&self, text: &str) -> Result<Value>;
}

/// Plain JSON via `serde_json`.
///
/// Dates travel as strings in the format produced by [`crate::dates`]; typed
/// results restore them through `#[serde(with = "mygeotab_rs::dates::geotab_datetime")]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn serialize(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn deserialize(&self, text: &str) -> Result<Value> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_json_codec_serialize() {
        let text = JsonCodec
            .serialize(&json!({"id": -1, "method": "Get", "params": {"typeName": "Device"}}))
            .unwrap();
        assert_eq!(
            text,
            r#"{"id":-1,"method":"Get","params":{"typeName":"Device"}}"#
        );
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        let result = JsonCodec.deserialize("<html>Bad Gateway</html>");
        assert!(matches!(result, Err(Error::Codec(_))));
    }
}
