//! # linkformat-protocol
//!
//! CoRE Link Format encodings built on `linkformat-core`.
//!
//! This crate provides:
//! - Tree serialization to text, CBOR and JSON, sharing one traversal
//! - Link parsing into flat links or a shallow resource tree
//! - The [`LinkFormat`] codec bound to a configuration snapshot

pub mod codec;
pub mod parser;
pub mod serializer;
pub mod sink;

pub use codec::{CodecError, LinkFormat, NO_QUERIES};
pub use linkformat_core::{
    LinkFormatConfig, LinkFormatError, RemoteResource, Resource, ResourceAttributes, WebLink,
};
pub use parser::Links;
