//! Small helpers over `roxmltree` for pulling fields out of TrackerNet XML
//!
//! Missing optional attributes fall back to empty strings or zero, while
//! missing required elements and unparsable numbers surface as
//! `MalformedUpstreamResponse`.

use roxmltree::{Document, Node};

use crate::error::{ProxyError, Result};

/// An element name, optionally bound to a namespace
///
/// Unqualified tags match on local name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    namespace: Option<&'static str>,
    name: &'static str,
}

impl Tag {
    /// A tag in the given namespace
    pub const fn qualified(namespace: &'static str, name: &'static str) -> Self {
        Self {
            namespace: Some(namespace),
            name,
        }
    }

    /// A tag matched by local name only
    pub const fn local(name: &'static str) -> Self {
        Self {
            namespace: None,
            name,
        }
    }

    /// Whether the node is an element with this tag
    pub fn matches(&self, node: &Node<'_, '_>) -> bool {
        match self.namespace {
            Some(namespace) => node.has_tag_name((namespace, self.name)),
            None => node.has_tag_name(self.name),
        }
    }
}

/// Parses an upstream body into a document
pub fn parse(body: &str) -> Result<Document<'_>> {
    Document::parse(body).map_err(|e| ProxyError::malformed(format!("invalid XML: {}", e)))
}

/// Returns the first direct child with the given tag, or an error naming it
pub fn child<'a, 'input>(node: Node<'a, 'input>, tag: Tag) -> Result<Node<'a, 'input>> {
    node.children()
        .find(|candidate| tag.matches(candidate))
        .ok_or_else(|| ProxyError::malformed(format!("missing <{}> element", tag.name)))
}

/// Iterates over all direct children with the given tag
pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: Tag,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |candidate| tag.matches(candidate))
}

/// Text content of an element, empty if it has none
pub fn text(node: Node<'_, '_>) -> String {
    node.text().unwrap_or_default().to_string()
}

/// Attribute value, empty if absent
pub fn attr(node: Node<'_, '_>, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

/// Integer attribute, zero if absent
pub fn int_attr(node: Node<'_, '_>, name: &str) -> Result<i64> {
    match node.attribute(name) {
        Some(value) => parse_int(name, value),
        None => Ok(0),
    }
}

/// Integer attribute that must be present
pub fn required_int_attr(node: Node<'_, '_>, name: &str) -> Result<i64> {
    let value = node
        .attribute(name)
        .ok_or_else(|| ProxyError::malformed(format!("missing attribute '{}'", name)))?;
    parse_int(name, value)
}

fn parse_int(name: &str, value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| {
        ProxyError::malformed(format!(
            "attribute '{}' is not an integer: '{}'",
            name, value
        ))
    })
}
