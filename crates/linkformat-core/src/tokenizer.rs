//! Quote-aware splitting of link-format text.
//!
//! A delimiter only separates segments outside of `'...'` or `"..."` spans.
//! A backslash flips the escape state rather than escaping exactly the next
//! character, so an even run of backslashes leaves quotes active and an odd
//! run disables quote handling until the next backslash.

use crate::error::{LinkFormatError, Result};

/// Lazy splitter over `input`.
///
/// Yields segments without the delimiter. An empty segment between two
/// delimiters is yielded; a delimiter at the very end produces no trailing
/// empty segment. Reaching the end inside a quoted span yields a single
/// `MalformedInput` error, after which the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Split<'a> {
    input: &'a str,
    delimiter: char,
    /// Byte offset of the next segment start.
    start: usize,
    /// Byte offset of the next character to scan.
    pos: usize,
    escape: bool,
    in_string: Option<char>,
    done: bool,
}

impl<'a> Split<'a> {
    pub fn new(input: &'a str, delimiter: char) -> Self {
        Self {
            input,
            delimiter,
            start: 0,
            pos: 0,
            escape: false,
            in_string: None,
            done: false,
        }
    }
}

impl<'a> Iterator for Split<'a> {
    type Item = Result<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let input = self.input;
        for (offset, c) in input[self.pos..].char_indices() {
            let i = self.pos + offset;
            if c == '\\' {
                self.escape = !self.escape;
                continue;
            }
            if c == self.delimiter && self.in_string.is_none() {
                let segment = &input[self.start..i];
                self.start = i + c.len_utf8();
                self.pos = self.start;
                return Some(Ok(segment));
            }
            if (c == '"' || c == '\'') && !self.escape {
                match self.in_string {
                    None => self.in_string = Some(c),
                    Some(open) if open == c => self.in_string = None,
                    Some(_) => {}
                }
            }
        }

        self.done = true;
        self.pos = input.len();
        if let Some(open) = self.in_string {
            return Some(Err(LinkFormatError::malformed(format!(
                "unterminated {open} quoted span"
            ))));
        }
        if self.start < input.len() {
            return Some(Ok(&input[self.start..]));
        }
        None
    }
}

impl std::iter::FusedIterator for Split<'_> {}

/// Split `input` on `delimiter`, collecting every segment.
pub fn split(input: &str, delimiter: char) -> Result<Vec<&str>> {
    Split::new(input, delimiter).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_split() {
        assert_eq!(split("a;b;c", ';').unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_delimiter_kept() {
        assert_eq!(
            split(r#"<a>;rt="foo,bar",<b>"#, ',').unwrap(),
            [r#"<a>;rt="foo,bar""#, "<b>"]
        );
        assert_eq!(split("x='a;b';y", ';').unwrap(), ["x='a;b'", "y"]);
    }

    #[test]
    fn test_mixed_quotes() {
        // A single quote inside a double-quoted span does not close it.
        assert_eq!(split(r#"t="it's,ok",z"#, ',').unwrap(), [r#"t="it's,ok""#, "z"]);
    }

    #[test]
    fn test_trailing_delimiter_dropped() {
        assert_eq!(split("a,b,", ',').unwrap(), ["a", "b"]);
        assert_eq!(split("", ',').unwrap(), Vec::<&str>::new());
        assert_eq!(split(",", ',').unwrap(), [""]);
    }

    #[test]
    fn test_inner_empty_segment_kept() {
        assert_eq!(split("a,,b", ',').unwrap(), ["a", "", "b"]);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = split(r#"<a>;title="open"#, ';').unwrap_err();
        assert!(matches!(err, LinkFormatError::MalformedInput(_)));
    }

    #[test]
    fn test_escape_toggles() {
        // One backslash leaves escape on, so neither quote toggles the span.
        assert_eq!(split(r#"a=\"x,y",z"#, ',').unwrap(), [r#"a=\"x"#, r#"y""#, "z"]);
        // Two backslashes cancel out and the quotes are live again.
        assert_eq!(split(r#"a=\\"x,y",z"#, ',').unwrap(), [r#"a=\\"x,y""#, "z"]);
    }

    #[test]
    fn test_escape_persists_across_characters() {
        // The escape set by the backslash is still on at the closing quote,
        // so the span never closes.
        let err = split(r#"title="x\"y""#, ';').unwrap_err();
        assert!(matches!(err, LinkFormatError::MalformedInput(_)));
    }

    #[test]
    fn test_lazy_error_after_segments() {
        let mut it = Split::new(r#"a,b,"c"#, ',');
        assert_eq!(it.next(), Some(Ok("a")));
        assert_eq!(it.next(), Some(Ok("b")));
        assert!(matches!(it.next(), Some(Err(_))));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_non_ascii() {
        assert_eq!(split("é;ü", ';').unwrap(), ["é", "ü"]);
    }
}
