//! Link-format data model.
//!
//! These types represent the structures exchanged during resource discovery:
//! - Attribute bags (insertion-ordered multi-maps of string values)
//! - Flat parse results ([`WebLink`])
//! - Resource trees, read through the [`Resource`] trait and built by the
//!   parser as [`RemoteResource`] nodes

use tracing::debug;

/// Well-known attribute names.
pub mod attr {
    /// Resource type, space-separated.
    pub const RESOURCE_TYPE: &str = "rt";
    /// Interface description, space-separated.
    pub const INTERFACE_DESCRIPTION: &str = "if";
    /// Content-format code.
    pub const CONTENT_TYPE: &str = "ct";
    /// Maximum size estimate in bytes.
    pub const MAX_SIZE_ESTIMATE: &str = "sz";
    pub const TITLE: &str = "title";
    /// Observable flag.
    pub const OBSERVABLE: &str = "obs";
    /// Link target. Queries on this name match the resource path.
    pub const LINK: &str = "href";
    pub const RELATION: &str = "rel";
    pub const REVERSE_RELATION: &str = "rev";
    pub const ANCHOR: &str = "anchor";
}

/// Attribute bag: attribute name to ordered values.
///
/// Names keep their insertion order and values keep theirs. A flag attribute
/// is stored as a single empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceAttributes {
    entries: Vec<(String, Vec<String>)>,
}

impl ResourceAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct attribute names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any entry exists for `name`, whatever its values.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// All values stored for `name`, or `None` if the name is absent.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|i| self.entries[i].1.as_slice())
    }

    /// Values for `name`; empty if the name is absent.
    pub fn values(&self, name: &str) -> impl Iterator<Item = &str> {
        self.get(name)
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
    }

    /// First value stored for `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// Append a value, creating the entry if needed.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.entries[i].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Record `name` as a flag (a single empty value).
    pub fn add_flag(&mut self, name: impl Into<String>) {
        self.add(name, String::new());
    }

    /// Replace every value of `name` with `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set_values(name, vec![value.into()]);
    }

    /// Replace the value list of `name`. An empty list keeps the name present
    /// but it is skipped by the serializers.
    pub fn set_values(&mut self, name: impl Into<String>, values: Vec<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(i) => self.entries[i].1 = values,
            None => self.entries.push((name, values)),
        }
    }

    /// Remove `name` and return its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Entries in ascending byte order of name, as serialized.
    pub fn sorted(&self) -> Vec<(&str, &[String])> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    // ========================================================================
    // Typed attribute API
    // ========================================================================

    /// Add a typed attribute.
    ///
    /// Returns `false` when the attribute is rejected: a negative `ct` or
    /// `sz` value is dropped without raising an error.
    pub fn add_link_attribute(&mut self, attribute: LinkAttribute) -> bool {
        let LinkAttribute { name, value } = attribute;
        match value {
            AttributeValue::Flag => self.add_flag(name),
            AttributeValue::Int(n) => {
                if n < 0 && (name == attr::CONTENT_TYPE || name == attr::MAX_SIZE_ESTIMATE) {
                    debug!(attribute = %name, value = n, "rejecting negative attribute value");
                    return false;
                }
                self.add(name, n.to_string());
            }
            AttributeValue::Text(s) => self.add(name, s),
        }
        true
    }

    pub fn title(&self) -> Option<&str> {
        self.first(attr::TITLE)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set(attr::TITLE, title);
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.values(attr::RESOURCE_TYPE)
    }

    pub fn add_resource_type(&mut self, rt: impl Into<String>) {
        self.add(attr::RESOURCE_TYPE, rt);
    }

    pub fn interface_descriptions(&self) -> impl Iterator<Item = &str> {
        self.values(attr::INTERFACE_DESCRIPTION)
    }

    pub fn add_interface_description(&mut self, iface: impl Into<String>) {
        self.add(attr::INTERFACE_DESCRIPTION, iface);
    }

    /// Content-format codes that parse as integers.
    pub fn content_types(&self) -> Vec<i64> {
        self.values(attr::CONTENT_TYPE)
            .filter_map(|v| v.parse().ok())
            .collect()
    }

    /// Add a content-format code. Negative codes are rejected.
    pub fn add_content_type(&mut self, ct: i64) -> bool {
        self.add_link_attribute(LinkAttribute::int(attr::CONTENT_TYPE, ct))
    }

    pub fn maximum_size_estimate(&self) -> Option<i64> {
        self.first(attr::MAX_SIZE_ESTIMATE)
            .and_then(|v| v.parse().ok())
    }

    /// Replace the size estimate. Negative sizes are rejected and the
    /// previous value is kept.
    pub fn set_maximum_size_estimate(&mut self, sz: i64) -> bool {
        if sz < 0 {
            debug!(value = sz, "rejecting negative size estimate");
            return false;
        }
        self.set(attr::MAX_SIZE_ESTIMATE, sz.to_string());
        true
    }

    pub fn observable(&self) -> bool {
        self.contains(attr::OBSERVABLE)
    }

    pub fn set_observable(&mut self, observable: bool) {
        if observable {
            self.set(attr::OBSERVABLE, "");
        } else {
            self.remove(attr::OBSERVABLE);
        }
    }
}

impl<N, V> FromIterator<(N, V)> for ResourceAttributes
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attributes = ResourceAttributes::new();
        for (name, value) in iter {
            attributes.add(name, value);
        }
        attributes
    }
}

/// Value of a typed attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Flag,
    Int(i64),
    Text(String),
}

/// A single typed attribute, added through
/// [`ResourceAttributes::add_link_attribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAttribute {
    pub name: String,
    pub value: AttributeValue,
}

impl LinkAttribute {
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::Flag,
        }
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::Int(value),
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::Text(value.into()),
        }
    }
}

/// A flat parse result: one link target and its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebLink {
    /// The target reference without its angle brackets.
    pub target: String,
    pub attributes: ResourceAttributes,
}

impl WebLink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            attributes: ResourceAttributes::new(),
        }
    }
}

/// Read access to a node of a resource tree.
///
/// The tree is owned by the caller; serializers only read it.
pub trait Resource {
    fn name(&self) -> &str;

    /// Path of the ancestors, ending with a separator (e.g. `/sensors/`).
    fn path(&self) -> &str;

    /// Hidden resources are skipped by the serializers, but their children
    /// are still visited.
    fn visible(&self) -> bool {
        true
    }

    fn attributes(&self) -> &ResourceAttributes;

    /// Children in storage order.
    fn children(&self) -> Vec<&dyn Resource>;
}

/// A resource tree node built by the parser, or by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResource {
    name: String,
    path: String,
    visible: bool,
    attributes: ResourceAttributes,
    children: Vec<RemoteResource>,
}

impl RemoteResource {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            visible: true,
            attributes: ResourceAttributes::new(),
            children: Vec::new(),
        }
    }

    /// The synthetic root of a parsed document: empty name and path.
    pub fn root() -> Self {
        Self::new("", "")
    }

    /// Build a node from a link target, splitting it after the last `/` so
    /// that `path + name` is the target.
    pub fn from_target(target: &str) -> Self {
        match target.rfind('/') {
            Some(i) => Self::new(&target[i + 1..], &target[..=i]),
            None => Self::new(target, ""),
        }
    }

    /// Full target reference (`path + name`).
    pub fn target(&self) -> String {
        format!("{}{}", self.path, self.name)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn attributes_mut(&mut self) -> &mut ResourceAttributes {
        &mut self.attributes
    }

    pub fn add_child(&mut self, child: RemoteResource) {
        self.children.push(child);
    }

    pub fn child_nodes(&self) -> &[RemoteResource] {
        &self.children
    }

    pub fn child_nodes_mut(&mut self) -> &mut Vec<RemoteResource> {
        &mut self.children
    }

    /// Depth-first search for a descendant whose full target is `target`.
    pub fn find_resource(&self, target: &str) -> Option<&RemoteResource> {
        let mut stack: Vec<&RemoteResource> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.path.len() + node.name.len() == target.len()
                && target.starts_with(node.path.as_str())
                && target.ends_with(node.name.as_str())
            {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}

impl Resource for RemoteResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn attributes(&self) -> &ResourceAttributes {
        &self.attributes
    }

    fn children(&self) -> Vec<&dyn Resource> {
        self.children.iter().map(|c| c as &dyn Resource).collect()
    }
}
