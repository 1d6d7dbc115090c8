//! Output encodings for serialized resource trees.
//!
//! The tree walker in [`crate::serializer`] drives a [`LinkSink`]; each sink
//! turns resources and attributes into one wire format:
//! - [`TextSink`]: `application/link-format`
//! - [`CborSink`]: array of maps, key `1` holding the target
//! - [`JsonSink`]: array of objects, `"href"` holding the target

use ciborium::value::Value as CborValue;
use linkformat_core::attribute::{encode_attribute, encode_compact, write_attribute, CompactValue};
use linkformat_core::LinkFormatConfig;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::codec::CodecError;

/// CBOR map key of the link target.
pub const CBOR_TARGET_KEY: u8 = 1;

/// JSON member holding the link target.
pub const JSON_TARGET_KEY: &str = "href";

/// Receives resources in emission order.
///
/// For each resource the walker calls `begin_resource`, then `attribute` once
/// per attribute name with at least one value (ascending by name), then
/// `end_resource`.
pub trait LinkSink {
    type Output;

    fn begin_resource(&mut self, target: &str);

    fn attribute(&mut self, name: &str, values: &[String], config: &LinkFormatConfig);

    fn end_resource(&mut self);

    fn finish(self) -> Self::Output;
}

/// Text link-format writer.
#[derive(Debug, Default)]
pub struct TextSink {
    out: String,
}

impl TextSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkSink for TextSink {
    type Output = String;

    fn begin_resource(&mut self, target: &str) {
        self.out.push('<');
        self.out.push_str(target);
        self.out.push('>');
    }

    fn attribute(&mut self, name: &str, values: &[String], config: &LinkFormatConfig) {
        let encoded = encode_attribute(name, values, config);
        if encoded.is_empty() {
            return;
        }
        self.out.push(';');
        write_attribute(&mut self.out, name, &encoded);
    }

    fn end_resource(&mut self) {
        self.out.push(',');
    }

    fn finish(mut self) -> String {
        if self.out.ends_with(',') {
            self.out.pop();
        }
        self.out
    }
}

/// CBOR writer producing an array of maps.
#[derive(Debug, Default)]
pub struct CborSink {
    links: Vec<CborValue>,
    current: Vec<(CborValue, CborValue)>,
}

impl CborSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkSink for CborSink {
    type Output = Result<Vec<u8>, CodecError>;

    fn begin_resource(&mut self, target: &str) {
        self.current = vec![(
            CborValue::Integer(CBOR_TARGET_KEY.into()),
            CborValue::Text(target.to_string()),
        )];
    }

    fn attribute(&mut self, name: &str, values: &[String], _config: &LinkFormatConfig) {
        let value = match encode_compact(values) {
            Some(CompactValue::Flag) => CborValue::Bool(true),
            Some(CompactValue::Text(text)) => CborValue::Text(text),
            None => return,
        };
        self.current.push((CborValue::Text(name.to_string()), value));
    }

    fn end_resource(&mut self) {
        let entries = std::mem::take(&mut self.current);
        self.links.push(CborValue::Map(entries));
    }

    fn finish(self) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(&CborValue::Array(self.links), &mut buf)
            .map_err(|e| CodecError::CborEncode(format!("{e:?}")))?;
        Ok(buf)
    }
}

/// JSON writer producing an array of objects.
///
/// An attribute named `href` is dropped, since that member holds the target.
#[derive(Debug, Default)]
pub struct JsonSink {
    links: Vec<JsonValue>,
    current: Map<String, JsonValue>,
}

impl JsonSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkSink for JsonSink {
    type Output = JsonValue;

    fn begin_resource(&mut self, target: &str) {
        self.current = Map::new();
        self.current
            .insert(JSON_TARGET_KEY.to_string(), JsonValue::String(target.to_string()));
    }

    fn attribute(&mut self, name: &str, values: &[String], _config: &LinkFormatConfig) {
        if name == JSON_TARGET_KEY {
            debug!(attribute = name, "attribute collides with the link target, not written");
            return;
        }
        let value = match encode_compact(values) {
            Some(CompactValue::Flag) => JsonValue::Bool(true),
            Some(CompactValue::Text(text)) => JsonValue::String(text),
            None => return,
        };
        self.current.insert(name.to_string(), value);
    }

    fn end_resource(&mut self) {
        let object = std::mem::take(&mut self.current);
        self.links.push(JsonValue::Object(object));
    }

    fn finish(self) -> JsonValue {
        JsonValue::Array(self.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn drive<S: LinkSink>(mut sink: S) -> S::Output {
        let config = LinkFormatConfig::default();
        sink.begin_resource("/sensors/temp");
        sink.attribute("obs", &strings(&[""]), &config);
        sink.attribute("rt", &strings(&["a", "b"]), &config);
        sink.end_resource();
        sink.begin_resource("/light");
        sink.attribute("ct", &strings(&["0", "41"]), &config);
        sink.end_resource();
        sink.finish()
    }

    #[test]
    fn test_text_sink() {
        assert_eq!(
            drive(TextSink::new()),
            r#"</sensors/temp>;obs;rt="a b",</light>;ct=0;ct=41"#
        );
    }

    #[test]
    fn test_text_sink_empty() {
        assert_eq!(TextSink::new().finish(), "");
    }

    #[test]
    fn test_json_sink() {
        assert_eq!(
            drive(JsonSink::new()),
            serde_json::json!([
                {"href": "/sensors/temp", "obs": true, "rt": "a b"},
                {"href": "/light", "ct": "0 41"}
            ])
        );
    }

    #[test]
    fn test_json_sink_href_attribute_dropped() {
        let config = LinkFormatConfig::default();
        let mut sink = JsonSink::new();
        sink.begin_resource("/n");
        sink.attribute("href", &strings(&["other"]), &config);
        sink.attribute("title", &strings(&["N"]), &config);
        sink.end_resource();
        assert_eq!(sink.finish(), serde_json::json!([{"href": "/n", "title": "N"}]));
    }

    #[test]
    fn test_cbor_sink() {
        let bytes = drive(CborSink::new()).unwrap();
        let value: CborValue = ciborium::de::from_reader(bytes.as_slice()).unwrap();
        let links = value.as_array().unwrap();
        assert_eq!(links.len(), 2);

        let first = links[0].as_map().unwrap();
        assert_eq!(first[0].0, CborValue::Integer(1.into()));
        assert_eq!(first[0].1, CborValue::Text("/sensors/temp".into()));
        assert_eq!(first[1], (CborValue::Text("obs".into()), CborValue::Bool(true)));
        assert_eq!(first[2], (CborValue::Text("rt".into()), CborValue::Text("a b".into())));
    }
}
