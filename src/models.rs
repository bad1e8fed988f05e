use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node of a Telegraph content tree.
///
/// Serialises the way the publishing API expects: [`ContentNode::Text`] as a
/// bare JSON string and [`ContentNode::Element`] as an object with `tag`,
/// optional `attrs` and optional `children`.
///
/// # Examples
///
/// ```rust
/// use telegraph_content::{ContentNode, ElementNode};
///
/// let node = ContentNode::from(
///     ElementNode::new("a")
///         .with_attr("href", "https://example.com")
///         .with_child("link"),
/// );
/// assert_eq!(
///     serde_json::to_string(&node).unwrap(),
///     r#"{"tag":"a","attrs":{"href":"https://example.com"},"children":["link"]}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentNode {
    /// A text leaf.  The string is carried verbatim; escaping is a rendering
    /// concern.
    Text(String),
    /// A tagged element with its own attributes and children.
    Element(ElementNode),
}

/// The element variant of [`ContentNode`].
///
/// `attrs` and `children` treat "absent" and "empty" as the same thing: both
/// deserialise to an empty collection, and an empty collection is never
/// written out.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementNode {
    /// Lower-case element name.  An empty tag decodes to a fragment.  Not
    /// checked against the API's tag list; see [`crate::unsupported_tags`].
    #[serde(default)]
    pub tag: String,
    /// After encoding this only ever holds `href` and/or `src`.  Decoding
    /// accepts whatever keys are present.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> ElementNode {
        ElementNode {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// A tag-less container holding `children`, the shape used for a whole
    /// page's content list.
    pub fn fragment(children: Vec<ContentNode>) -> ElementNode {
        ElementNode {
            tag: String::new(),
            attrs: BTreeMap::new(),
            children,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> ElementNode {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<ContentNode>) -> ElementNode {
        self.children.push(child.into());
        self
    }

    pub fn is_fragment(&self) -> bool {
        self.tag.is_empty()
    }
}

impl ContentNode {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentNode::Text(text) => Some(text.as_str()),
            ContentNode::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            ContentNode::Text(_) => None,
            ContentNode::Element(element) => Some(element),
        }
    }

    /// Concatenated text of this node and all of its descendants, in
    /// document order.
    pub fn text_contents(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                ContentNode::Text(text) => out.push_str(text),
                ContentNode::Element(element) => stack.extend(element.children.iter().rev()),
            }
        }
        out
    }
}

impl From<ElementNode> for ContentNode {
    fn from(element: ElementNode) -> ContentNode {
        ContentNode::Element(element)
    }
}

impl From<String> for ContentNode {
    fn from(text: String) -> ContentNode {
        ContentNode::Text(text)
    }
}

impl From<&str> for ContentNode {
    fn from(text: &str) -> ContentNode {
        ContentNode::Text(text.to_string())
    }
}

/// Knobs for a [`crate::Codec`].
///
/// # Examples
///
/// ```rust
/// use telegraph_content::CodecOptions;
///
/// let mut opts = CodecOptions::default();
/// opts.debug = true; // print span timings to stdout in debug builds
/// ```
#[derive(Debug, Clone)]
pub struct CodecOptions {
    /// Register a console listener that prints encode / decode spans
    /// (only has an effect in builds with `debug_assertions`).
    pub debug: bool,
    /// Deepest element nesting `encode` keeps.  Elements below this depth
    /// are dropped together with their subtree.  The root passed to
    /// `encode`, or a direct child of the root given to `encode_children`,
    /// is at depth 1.
    pub max_depth: usize,
}

/// Default for [`CodecOptions::max_depth`].  Each element costs two JSON
/// nesting levels (its object and its `children` array), so content this
/// deep still fits under `serde_json`'s default recursion limit of 128.
pub const DEFAULT_MAX_DEPTH: usize = 60;

impl Default for CodecOptions {
    fn default() -> CodecOptions {
        CodecOptions {
            debug: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_serialises_as_bare_string() {
        let node = ContentNode::from("Hello <b> & \"you\"");
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!("Hello <b> & \"you\"")
        );
    }

    #[test]
    fn empty_attrs_and_children_are_not_written() {
        let node = ContentNode::from(ElementNode::new("hr"));
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({"tag": "hr"}));
    }

    #[test]
    fn absent_and_empty_collections_deserialise_the_same() {
        let absent: ContentNode = serde_json::from_value(json!({"tag": "br"})).unwrap();
        let empty: ContentNode =
            serde_json::from_value(json!({"tag": "br", "attrs": {}, "children": []})).unwrap();
        assert_eq!(absent, empty);
    }

    #[test]
    fn unknown_attribute_keys_are_kept_on_deserialise() {
        let node: ContentNode = serde_json::from_value(json!({
            "tag": "iframe",
            "attrs": {"src": "/embed/youtube", "width": "640"}
        }))
        .unwrap();
        let element = node.as_element().unwrap();
        assert_eq!(element.attrs.get("width").map(String::as_str), Some("640"));
        assert_eq!(element.attrs.len(), 2);
    }

    #[test]
    fn missing_tag_is_a_fragment() {
        let node: ContentNode =
            serde_json::from_value(json!({"children": ["a", {"tag": "b"}]})).unwrap();
        let element = node.as_element().unwrap();
        assert!(element.is_fragment());
        assert_eq!(element.children.len(), 2);
    }

    #[test]
    fn nested_content_parses() {
        let nodes: Vec<ContentNode> = serde_json::from_str(
            r#"[{"tag":"p","children":["Hello, ",{"tag":"b","children":["world"]},"!"]}]"#,
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text_contents(), "Hello, world!");
    }

    #[test]
    fn text_contents_of_deep_chain() {
        let mut node = ContentNode::from("x");
        for _ in 0..500 {
            node = ElementNode::new("b").with_child(node).into();
        }
        assert_eq!(node.text_contents(), "x");
    }

    #[test]
    fn default_depth_round_trips_through_json() {
        let mut node = ContentNode::from("deep");
        for _ in 0..DEFAULT_MAX_DEPTH {
            node = ElementNode::new("div").with_attr("href", "/x").with_child(node).into();
        }
        let nodes = vec![node];
        let json = serde_json::to_string(&nodes).unwrap();
        let parsed: Vec<ContentNode> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, nodes);
    }
}
