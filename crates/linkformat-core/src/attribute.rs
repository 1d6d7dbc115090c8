//! Attribute encoding and decoding.
//!
//! Space-separated attributes (`rt`, `if`, ...) are written once, with all
//! values joined by spaces inside one pair of quotes. Every other attribute
//! is written once per value. All-digit values are never quoted and empty
//! values are written as bare flags.
//!
//! Decoding is not the exact inverse: `rt="a b"` is read back as the single
//! value `a b`. The query matcher splits such values on spaces.

use tracing::trace;

use crate::config::LinkFormatConfig;
use crate::error::{LinkFormatError, Result};
use crate::model::ResourceAttributes;

/// True for a non-empty string of ASCII digits.
pub fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// One `name[=value]` segment of the text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedValue {
    /// `name`
    Flag,
    /// `name=value`
    Token(String),
    /// `name="value"`
    Quoted(String),
}

/// Value of an attribute in map-based encodings (CBOR, JSON), where each
/// name appears once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactValue {
    Flag,
    Text(String),
}

/// Encode the values of one attribute into text-form segments.
///
/// Returns no segments when `values` is empty.
pub fn encode_attribute(
    name: &str,
    values: &[String],
    config: &LinkFormatConfig,
) -> Vec<EncodedValue> {
    if values.is_empty() {
        return Vec::new();
    }

    if config.is_space_separated(name) {
        let encoded = match values {
            [single] if single.is_empty() => EncodedValue::Flag,
            [single] if is_numeric(single) => EncodedValue::Token(single.clone()),
            _ => EncodedValue::Quoted(values.join(" ")),
        };
        return vec![encoded];
    }

    values
        .iter()
        .map(|value| {
            if value.is_empty() {
                EncodedValue::Flag
            } else if is_numeric(value) {
                EncodedValue::Token(value.clone())
            } else {
                EncodedValue::Quoted(value.clone())
            }
        })
        .collect()
}

/// Encode the values of one attribute for a map-based encoding.
///
/// Multiple values of any attribute collapse into one space-joined string so
/// that the map carries the same information as the text form.
pub fn encode_compact(values: &[String]) -> Option<CompactValue> {
    match values {
        [] => None,
        [single] if single.is_empty() => Some(CompactValue::Flag),
        [single] => Some(CompactValue::Text(single.clone())),
        _ => Some(CompactValue::Text(values.join(" "))),
    }
}

/// Append the text form of one attribute to `out`. Repeated segments are
/// separated by `;` with no trailing separator.
pub fn write_attribute(out: &mut String, name: &str, encoded: &[EncodedValue]) {
    for (i, value) in encoded.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        out.push_str(name);
        match value {
            EncodedValue::Flag => {}
            EncodedValue::Token(v) => {
                out.push('=');
                out.push_str(v);
            }
            EncodedValue::Quoted(v) => {
                out.push_str("=\"");
                out.push_str(v);
                out.push('"');
            }
        }
    }
}

/// Serialize a bag into one text token per attribute name, in ascending
/// order of name. Names without values are skipped.
pub fn serialize_attributes(
    attributes: &ResourceAttributes,
    config: &LinkFormatConfig,
) -> Vec<String> {
    attributes
        .sorted()
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(name, values)| {
            let mut token = String::new();
            write_attribute(&mut token, name, &encode_attribute(name, values, config));
            token
        })
        .collect()
}

/// Split a `name` or `name=value` token, removing one pair of surrounding
/// double quotes from the value. A bare name yields an empty value. Whitespace
/// around the name is dropped.
pub fn decode_attribute(token: &str) -> Result<(&str, &str)> {
    let Some((name, raw)) = token.split_once('=') else {
        return Ok((token.trim(), ""));
    };
    let name = name.trim();

    let starts = raw.starts_with('"');
    let ends = raw.len() > 1 && raw.ends_with('"');
    let value = match (starts, ends) {
        (true, true) => &raw[1..raw.len() - 1],
        (false, false) => raw,
        _ => {
            return Err(LinkFormatError::malformed(format!(
                "unbalanced quotes in value of '{name}'"
            )))
        }
    };
    Ok((name, value))
}

/// Decode `token` and record it in `attributes`.
///
/// Under strict parsing a single-occurrence attribute that is already present
/// fails with `DuplicateAttribute`. Empty tokens are ignored.
pub fn apply_attribute(
    attributes: &mut ResourceAttributes,
    token: &str,
    config: &LinkFormatConfig,
) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(());
    }

    let (name, value) = decode_attribute(token)?;
    if config.strict && config.is_single_occurrence(name) && attributes.contains(name) {
        return Err(LinkFormatError::DuplicateAttribute(name.to_string()));
    }

    trace!(attribute = name, value, "decoded attribute");
    attributes.add(name, value);
    Ok(())
}
