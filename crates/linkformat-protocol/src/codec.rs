//! Link-format codec entry points.
//!
//! [`LinkFormat`] owns one [`LinkFormatConfig`] and exposes every encoding
//! and parse target over it, so the classification tables and the strict
//! flag cannot change in the middle of a call.

use linkformat_core::{LinkFormatConfig, LinkFormatError, RemoteResource, Resource, WebLink};
use thiserror::Error;
use tracing::debug;

use crate::parser::{self, Links};
use crate::serializer;
use crate::sink::{CborSink, JsonSink, LinkSink, TextSink};

/// An empty query set: every visible resource is emitted.
pub const NO_QUERIES: &[&str] = &[];

/// Errors that can occur during encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text form could not be parsed.
    #[error(transparent)]
    LinkFormat(#[from] LinkFormatError),

    /// CBOR serialization failed.
    #[error("Failed to encode CBOR: {0}")]
    CborEncode(String),

    /// The input is not well-formed CBOR.
    #[error("Failed to decode CBOR: {0}")]
    CborDecode(String),

    /// Well-formed CBOR that does not describe a link list.
    #[error("Unexpected CBOR structure: {0}")]
    UnexpectedCbor(String),

    /// JSON serialization failed.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Link-format serializer and parser bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct LinkFormat {
    config: LinkFormatConfig,
}

impl LinkFormat {
    pub fn new(config: LinkFormatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LinkFormatConfig {
        &self.config
    }

    fn encode<Q, S>(&self, root: &dyn Resource, queries: &[Q], mut sink: S) -> S::Output
    where
        Q: AsRef<str>,
        S: LinkSink,
    {
        let emitted = serializer::walk(root, queries, &self.config, &mut sink);
        debug!(emitted, queries = queries.len(), "serialized resource tree");
        sink.finish()
    }

    /// Serialize the descendants of `root` that match `queries` as text.
    pub fn serialize<Q: AsRef<str>>(&self, root: &dyn Resource, queries: &[Q]) -> String {
        self.encode(root, queries, TextSink::new())
    }

    /// Serialize as a CBOR array of maps.
    pub fn serialize_cbor<Q: AsRef<str>>(
        &self,
        root: &dyn Resource,
        queries: &[Q],
    ) -> Result<Vec<u8>, CodecError> {
        self.encode(root, queries, CborSink::new())
    }

    /// Serialize as a JSON array of objects.
    pub fn serialize_json<Q: AsRef<str>>(
        &self,
        root: &dyn Resource,
        queries: &[Q],
    ) -> Result<String, CodecError> {
        let value = self.encode(root, queries, JsonSink::new());
        Ok(serde_json::to_string(&value)?)
    }

    /// Serialize flat links in the given order, without filtering.
    pub fn serialize_links(&self, links: &[WebLink]) -> String {
        let mut sink = TextSink::new();
        for link in links {
            sink.begin_resource(&link.target);
            for (name, values) in link.attributes.sorted() {
                if !values.is_empty() {
                    sink.attribute(name, values, &self.config);
                }
            }
            sink.end_resource();
        }
        sink.finish()
    }

    /// Lazily parse a document into flat links.
    pub fn parse<'a>(&'a self, text: &'a str) -> Links<'a> {
        Links::new(text, &self.config)
    }

    /// Parse a document into flat links, failing on the first bad entry.
    pub fn parse_all(&self, text: &str) -> Result<Vec<WebLink>, LinkFormatError> {
        self.parse(text).collect()
    }

    /// Parse a document into a tree under a synthetic root.
    pub fn deserialize(&self, text: &str) -> Result<RemoteResource, LinkFormatError> {
        parser::deserialize(text, &self.config)
    }

    /// Parse the CBOR form produced by [`LinkFormat::serialize_cbor`].
    pub fn parse_cbor(&self, bytes: &[u8]) -> Result<Vec<WebLink>, CodecError> {
        parser::parse_cbor(bytes)
    }
}
