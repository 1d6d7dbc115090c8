//! Discovery query matching.
//!
//! A query is one of:
//! - Flag: `obs` (the attribute is present, whatever its value)
//! - Exact: `rt=temperature`
//! - Prefix wildcard: `rt=temp*`
//! - Target: `href=/sensors/temp` or `href=/sensors/*`, matched against the
//!   resource path instead of the attribute bag
//!
//! A resource matches a query set when it matches any one query. An empty set
//! matches everything.

use crate::model::{attr, ResourceAttributes};

/// True if the resource at `path` with `attributes` satisfies any query.
pub fn matches<Q: AsRef<str>>(
    path: &str,
    attributes: &ResourceAttributes,
    queries: &[Q],
) -> bool {
    if queries.is_empty() {
        return true;
    }
    queries
        .iter()
        .any(|query| matches_query(path, attributes, query.as_ref()))
}

/// Evaluate a single query.
pub fn matches_query(path: &str, attributes: &ResourceAttributes, query: &str) -> bool {
    let Some((name, expected)) = query.split_once('=') else {
        return attributes.contains(query);
    };

    if name == attr::LINK {
        return match expected.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => path == expected,
        };
    }

    let Some(values) = attributes.get(name) else {
        return false;
    };

    // Once a wildcard truncates `expected`, later values are compared against
    // the truncated prefix without being truncated themselves.
    let mut expected = expected;
    for actual in values {
        let mut actual = actual.as_str();
        if let Some(star) = expected.find('*') {
            if star < actual.len() {
                if let Some(prefix) = actual.get(..star) {
                    expected = &expected[..star];
                    actual = prefix;
                }
            }
        }

        // Space-separated values are stored joined, e.g. `rt="Type1 Type2"`.
        if actual.contains(' ') && actual.split(' ').any(|part| part == expected) {
            return true;
        }
        if actual == expected {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> ResourceAttributes {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_empty_query_set_matches() {
        let none: &[&str] = &[];
        assert!(matches("/a", &ResourceAttributes::new(), none));
    }

    #[test]
    fn test_flag_query() {
        let a = attrs(&[("obs", ""), ("ct", "0")]);
        assert!(matches("/a", &a, &["obs"]));
        assert!(matches("/a", &a, &["ct"]));
        assert!(!matches("/a", &a, &["rt"]));
    }

    #[test]
    fn test_exact_query() {
        let a = attrs(&[("rt", "temperature"), ("ct", "0"), ("ct", "41")]);
        assert!(matches("/a", &a, &["rt=temperature"]));
        assert!(!matches("/a", &a, &["rt=temp"]));
        assert!(matches("/a", &a, &["ct=41"]));
        assert!(!matches("/a", &a, &["ct=50"]));
    }

    #[test]
    fn test_prefix_wildcard() {
        let a = attrs(&[("rt", "temperature-c")]);
        assert!(matches("/a", &a, &["rt=temp*"]));
        assert!(!matches("/a", &a, &["rt=light*"]));
    }

    #[test]
    fn test_wildcard_truncation_carries_over() {
        // The first value truncates `ab*` to `ab`; the second value is then
        // compared whole and does not match.
        let a = attrs(&[("rt", "zzz"), ("rt", "ab-long")]);
        assert!(!matches("/a", &a, &["rt=ab*"]));

        // A value shorter than the prefix leaves the wildcard in place.
        let a = attrs(&[("rt", "x"), ("rt", "ab-long")]);
        assert!(matches("/a", &a, &["rt=ab*"]));
    }

    #[test]
    fn test_space_joined_values() {
        let a = attrs(&[("rt", "Type1 Type2")]);
        assert!(matches("/a", &a, &["rt=Type1"]));
        assert!(matches("/a", &a, &["rt=Type2"]));
        assert!(matches("/a", &a, &["rt=Type1 Type2"]));
        assert!(!matches("/a", &a, &["rt=Type3"]));
    }

    #[test]
    fn test_href_query() {
        let a = ResourceAttributes::new();
        assert!(matches("/sensors/temp", &a, &["href=/sensors/temp"]));
        assert!(matches("/sensors/temp", &a, &["href=/sensors/*"]));
        assert!(!matches("/sensors/temp", &a, &["href=/actuators/*"]));
        assert!(!matches("/sensors/temp", &a, &["href=/sensors"]));
    }

    #[test]
    fn test_queries_are_ored() {
        let a = attrs(&[("rt", "light")]);
        assert!(matches("/l", &a, &["href=/x", "title", "rt=light"]));
        assert!(!matches("/l", &a, &["href=/x", "title", "rt=dark"]));
    }

    #[test]
    fn test_absent_attribute_falls_through() {
        let a = attrs(&[("if", "sensor")]);
        assert!(matches("/s", &a, &["rt=x", "if=sensor"]));
    }
}
