//! Errors raised while parsing link-format documents.

use thiserror::Error;

/// Errors that abort a parse call.
///
/// Out-of-range typed attributes are not represented here: they are dropped
/// and reported through the `bool` returned by
/// [`ResourceAttributes::add_link_attribute`](crate::ResourceAttributes::add_link_attribute).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkFormatError {
    /// Missing target brackets, a stray value quote, or an unterminated
    /// quoted span.
    #[error("Malformed link-format input: {0}")]
    MalformedInput(String),

    /// A single-occurrence attribute appeared twice in one entry while
    /// strict parsing was enabled.
    #[error("Duplicate attribute '{0}' in strict mode")]
    DuplicateAttribute(String),
}

impl LinkFormatError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        LinkFormatError::MalformedInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LinkFormatError>;
