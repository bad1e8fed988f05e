use crate::models::ContentNode;
use crate::parser::NodeRef;

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

/// Attribute names the publishing API accepts, in the order the encoder
/// looks for them.  Everything else is dropped during encoding.
pub const WHITELISTED_ATTRIBUTES: &[&str] = &["href", "src"];

/// Tag names the publishing API renders.  The codec passes every tag
/// through untouched; this list is for callers that want to check before
/// sending.
pub static ALLOWED_TAGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "a", "aside", "b", "blockquote", "br", "code", "em", "figcaption", "figure", "h3", "h4",
        "hr", "i", "iframe", "img", "li", "ol", "p", "pre", "s", "strong", "u", "ul", "video",
    ])
});

pub fn is_whitelisted_attribute(name: &str) -> bool {
    WHITELISTED_ATTRIBUTES.contains(&name)
}

/// Collect every tag in `nodes` (at any depth) that the publishing API does
/// not render, sorted and de-duplicated.  Fragments (empty tags) are not
/// reported.
///
/// # Examples
///
/// ```rust
/// use telegraph_content::{html_to_content, unsupported_tags};
///
/// let content = html_to_content("<h1>Title</h1><p>ok<script>x()</script></p>");
/// assert_eq!(unsupported_tags(&content), vec!["h1", "script"]);
/// ```
pub fn unsupported_tags(nodes: &[ContentNode]) -> Vec<String> {
    let mut found = BTreeSet::new();
    let mut stack = nodes.iter().collect::<Vec<_>>();
    while let Some(node) = stack.pop() {
        if let ContentNode::Element(element) = node {
            if !element.is_fragment() && !ALLOWED_TAGS.contains(element.tag.as_str()) {
                found.insert(element.tag.clone());
            }
            stack.extend(element.children.iter());
        }
    }
    found.into_iter().collect()
}

/// The node whose children make up a parsed page's content: `<body>` when
/// present, otherwise the node itself.
pub fn content_root(doc: &NodeRef) -> NodeRef {
    match doc.select_first("body") {
        Ok(body) => body.as_node().clone(),
        Err(_) => doc.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ElementNode;
    use crate::parser::parse_html;

    #[test]
    fn only_href_and_src_are_whitelisted() {
        assert!(is_whitelisted_attribute("href"));
        assert!(is_whitelisted_attribute("src"));
        assert!(!is_whitelisted_attribute("class"));
        assert!(!is_whitelisted_attribute("HREF"));
    }

    #[test]
    fn unsupported_tags_walks_nested_children() {
        let nodes = vec![
            ContentNode::from(
                ElementNode::new("p")
                    .with_child(ElementNode::new("span").with_child("x"))
                    .with_child(ElementNode::new("b")),
            ),
            ContentNode::from(ElementNode::fragment(vec![
                ElementNode::new("div").into(),
                ElementNode::new("span").into(),
            ])),
            ContentNode::from("loose text"),
        ];
        assert_eq!(unsupported_tags(&nodes), vec!["div", "span"]);
    }

    #[test]
    fn allowed_content_has_no_unsupported_tags() {
        let nodes = vec![ContentNode::from(
            ElementNode::new("figure")
                .with_child(ElementNode::new("img").with_attr("src", "/file/a.png"))
                .with_child(ElementNode::new("figcaption").with_child("caption")),
        )];
        assert!(unsupported_tags(&nodes).is_empty());
    }

    #[test]
    fn content_root_is_body() {
        let doc = parse_html("<p>one</p>");
        let root = content_root(&doc);
        assert_eq!(root.as_element().map(|e| e.name.local.to_string()).as_deref(), Some("body"));
    }
}
