//! Link-format document parsing.
//!
//! Documents are split on `,` into entries and each entry on `;` into
//! tokens, both quote-aware. The first token of an entry is the target in
//! angle brackets; the rest are attributes. Whitespace around the document
//! is ignored, but an empty entry between commas is malformed.

use ciborium::value::Value as CborValue;
use linkformat_core::attribute::apply_attribute;
use linkformat_core::tokenizer::Split;
use linkformat_core::{
    LinkFormatConfig, LinkFormatError, RemoteResource, ResourceAttributes, WebLink,
};
use tracing::{debug, trace};

use crate::codec::CodecError;
use crate::sink::CBOR_TARGET_KEY;

/// Lazy sequence of parsed links, in document order.
///
/// Yields one `Err` at the first malformed entry and then ends.
#[derive(Debug, Clone)]
pub struct Links<'a> {
    entries: Split<'a>,
    config: &'a LinkFormatConfig,
    failed: bool,
}

impl<'a> Links<'a> {
    pub fn new(text: &'a str, config: &'a LinkFormatConfig) -> Self {
        Self {
            entries: Split::new(text.trim(), ','),
            config,
            failed: false,
        }
    }
}

impl Iterator for Links<'_> {
    type Item = Result<WebLink, LinkFormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self
            .entries
            .next()?
            .and_then(|entry| parse_entry(entry, self.config));
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for Links<'_> {}

/// Parse one `<target>;attr;...` entry.
pub fn parse_entry(entry: &str, config: &LinkFormatConfig) -> Result<WebLink, LinkFormatError> {
    let mut tokens = Split::new(entry, ';');
    let first = tokens.next().transpose()?.map(str::trim).unwrap_or_default();
    let target = first
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| {
            LinkFormatError::MalformedInput(format!(
                "link target must be enclosed in '<' and '>': {first}"
            ))
        })?;

    let mut link = WebLink::new(target);
    for token in tokens {
        apply_attribute(&mut link.attributes, token?, config)?;
    }
    trace!(link = %link.target, attributes = link.attributes.len(), "parsed link");
    Ok(link)
}

/// Parse a whole document into a tree: a synthetic root with one child per
/// link.
pub fn deserialize(
    text: &str,
    config: &LinkFormatConfig,
) -> Result<RemoteResource, LinkFormatError> {
    let mut root = RemoteResource::root();
    for link in Links::new(text, config) {
        let WebLink { target, attributes } = link?;
        let mut child = RemoteResource::from_target(&target);
        *child.attributes_mut() = attributes;
        root.add_child(child);
    }
    debug!(
        links = root.child_nodes().len(),
        strict = config.strict,
        "deserialized link-format document"
    );
    Ok(root)
}

/// Parse the CBOR form: an array of maps with the target under key `1`.
///
/// `true` values become flags; text values are stored as one value each.
pub fn parse_cbor(bytes: &[u8]) -> Result<Vec<WebLink>, CodecError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let value: CborValue = ciborium::de::from_reader(bytes)
        .map_err(|e| CodecError::CborDecode(format!("{e:?}")))?;
    let CborValue::Array(items) = value else {
        return Err(CodecError::UnexpectedCbor("top-level item is not an array".into()));
    };

    items.into_iter().map(link_from_cbor).collect()
}

fn link_from_cbor(item: CborValue) -> Result<WebLink, CodecError> {
    let CborValue::Map(entries) = item else {
        return Err(CodecError::UnexpectedCbor("link is not a map".into()));
    };

    let mut target = None;
    let mut attributes = ResourceAttributes::new();
    for (key, value) in entries {
        match (key, value) {
            (CborValue::Integer(k), CborValue::Text(t))
                if i128::from(k) == i128::from(CBOR_TARGET_KEY) =>
            {
                target = Some(t);
            }
            (CborValue::Text(name), CborValue::Bool(true)) => attributes.add_flag(name),
            (CborValue::Text(name), CborValue::Text(v)) => attributes.add(name, v),
            (key, value) => {
                return Err(CodecError::UnexpectedCbor(format!(
                    "unsupported map entry {key:?} => {value:?}"
                )))
            }
        }
    }

    let target =
        target.ok_or_else(|| CodecError::UnexpectedCbor("link without target".into()))?;
    Ok(WebLink { target, attributes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkformat_core::Resource;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Vec<WebLink>, LinkFormatError> {
        Links::new(text, &LinkFormatConfig::default()).collect()
    }

    #[test]
    fn test_parse_basic() {
        let links = parse(r#"</sensors/temp>;rt="temperature-c";if="sensor";obs,</light>;ct=0"#).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target, "/sensors/temp");
        assert_eq!(links[0].attributes.first("rt"), Some("temperature-c"));
        assert_eq!(links[0].attributes.get("obs").unwrap(), [""]);
        assert_eq!(links[1].target, "/light");
        assert_eq!(links[1].attributes.first("ct"), Some("0"));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse(" \n").unwrap().is_empty());
    }

    #[test]
    fn test_space_joined_value_kept_whole() {
        let links = parse(r#"<a>;rt="Type1 Type2""#).unwrap();
        assert_eq!(links[0].attributes.get("rt").unwrap(), ["Type1 Type2"]);
    }

    #[test]
    fn test_missing_brackets() {
        for text in ["/a;rt=x", "<a;rt=x", "a>", "<a>,b"] {
            assert!(matches!(parse(text), Err(LinkFormatError::MalformedInput(_))), "{text}");
        }
    }

    #[test]
    fn test_whitespace_between_entries() {
        let links = parse("<a>;ct=0,\n <b>;obs").unwrap();
        assert_eq!(links[1].target, "b");

        let links = parse("<a>,\n").unwrap();
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_empty_entry_is_malformed() {
        for text in ["<a>,,<b>", ",<a>", "<a>, ,<b>"] {
            assert!(matches!(parse(text), Err(LinkFormatError::MalformedInput(_))), "{text}");
        }
    }

    #[test]
    fn test_stops_after_error() {
        let config = LinkFormatConfig::default();
        let mut links = Links::new("<a>,bad,<c>", &config);
        assert!(links.next().unwrap().is_ok());
        assert!(links.next().unwrap().is_err());
        assert!(links.next().is_none());
    }

    #[test]
    fn test_deserialize_tree() {
        let root = deserialize("</s/temp>;obs,</s/light>", &LinkFormatConfig::default()).unwrap();
        assert_eq!(root.target(), "");
        let children = root.child_nodes();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].target(), "/s/temp");
        assert!(children[0].attributes().observable());
        assert!(children[1].child_nodes().is_empty());
    }

    #[test]
    fn test_deserialize_empty() {
        let root = deserialize("", &LinkFormatConfig::default()).unwrap();
        assert!(root.child_nodes().is_empty());
    }

    #[test]
    fn test_parse_cbor_rejects_non_array() {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&CborValue::Text("x".into()), &mut bytes).unwrap();
        assert!(matches!(parse_cbor(&bytes), Err(CodecError::UnexpectedCbor(_))));
        assert!(matches!(parse_cbor(&[0x82, 0x01]), Err(CodecError::CborDecode(_))));
        assert!(parse_cbor(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_cbor_missing_target() {
        let value = CborValue::Array(vec![CborValue::Map(vec![(
            CborValue::Text("obs".into()),
            CborValue::Bool(true),
        )])]);
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&value, &mut bytes).unwrap();
        assert!(matches!(parse_cbor(&bytes), Err(CodecError::UnexpectedCbor(_))));
    }
}
