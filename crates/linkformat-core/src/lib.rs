//! # linkformat-core
//!
//! Core CoRE Link Format model and codec primitives.
//!
//! This crate provides:
//! - Data model types (ResourceAttributes, WebLink, RemoteResource)
//! - Codec configuration (attribute classification, strict parsing)
//! - Quote-aware tokenizer
//! - Attribute encoding and decoding
//! - Discovery query matching
//!
//! This crate is intentionally runtime-agnostic and performs no I/O beyond
//! optionally reading a configuration file.

pub mod attribute;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod tokenizer;

pub use config::{ConfigError, LinkFormatConfig};
pub use error::{LinkFormatError, Result};
pub use model::*;
pub use query::matches;
