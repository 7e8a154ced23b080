//! Helpers over `scraper`'s tree for the fragment-level rewrites done on
//! entry bodies.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;
use url::Url;

/// Permissive parse of an HTML fragment; malformed markup never fails.
pub(crate) fn parse_fragment(html: &str) -> Html {
    Html::parse_fragment(html)
}

/// Serializes the children of the fragment's synthetic `<html>` root.
pub(crate) fn serialize_fragment(doc: &Html) -> String {
    doc.root_element().inner_html()
}

pub(crate) fn is_element(node: &NodeRef<'_, Node>, tag: &str) -> bool {
    node.value()
        .as_element()
        .is_some_and(|element| element.name().eq_ignore_ascii_case(tag))
}

/// Name of the element directly enclosing `node`, if any.
pub(crate) fn parent_element_name<'a>(node: &NodeRef<'a, Node>) -> Option<&'a str> {
    node.parent()
        .and_then(|parent| parent.value().as_element())
        .map(|element| element.name())
}

/// Resolves an attribute value against an optional base URL.
///
/// Fragments, queries and `javascript:` references yield `None`.
pub(crate) fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
