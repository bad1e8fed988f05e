//! Convert rendered rich-text HTML into the restricted content-node tree the
//! [Telegraph](https://telegra.ph/api) publishing API accepts, and back.
//!
//! ## Quick start
//!
//! ```rust
//! use telegraph_content::{html_to_content, content_to_html};
//!
//! let html = r#"<p class="lead">Hello <img src="https://x/1.png" alt="x"> world</p>"#;
//! let content = html_to_content(html);
//! assert_eq!(
//!     serde_json::to_string(&content).unwrap(),
//!     r#"[{"tag":"p","children":["Hello ",{"tag":"img","attrs":{"src":"https://x/1.png"}}," world"]}]"#
//! );
//! assert_eq!(content_to_html(&content), r#"<p>Hello <img src="https://x/1.png"> world</p>"#);
//! ```
//!
//! ## Module layout
//!
//! * **Top level** – [`encode`] / [`decode`] and friends, backed by [`Codec`].
//!   [`ContentNode`] / [`ElementNode`] are the content tree;
//!   [`RenderedNode`] is the read-only view the encoder walks.
//! * [`parser`] – thin wrappers around the underlying HTML parser ([`parser::NodeRef`],
//!   [`parser::parse_html`]).
//! * [`publish`] – API types, request validation, method URLs and the
//!   publish / provision flow.
//!
//! Encoding keeps every tag, keeps only the `href` and `src` attributes, and
//! drops comments and other non-content nodes.  Decoding accepts any tag and
//! any attribute.  Neither direction can fail.

#[macro_use]
mod logging;
mod codec;

mod models;
mod node_utils;
mod rendered;
mod utils;

pub mod publish;

pub use codec::Codec;
pub use logging::PerfConsoleListener;
pub use logging::logger::{Listener, PerfListener, PerfLogger};
pub use models::{CodecOptions, ContentNode, DEFAULT_MAX_DEPTH, ElementNode};
pub use node_utils::{NodeExt, new_fragment, new_html_element};
pub use rendered::{NodeKind, RenderedNode};
pub use utils::{ALLOWED_TAGS, WHITELISTED_ATTRIBUTES, is_whitelisted_attribute, unsupported_tags};

/// Span ids reported to [`PerfListener`]s.
pub mod spans {
    pub use crate::logging::logging_defs::{DECODE, ENCODE, PARSE_HTML, SERIALIZE_HTML, name};
}

/// Thin wrappers around the underlying HTML parser.
///
/// [`NodeRef`] is the reference-counted DOM node type the codec reads from
/// and decodes into.  [`parse_html`] parses a complete HTML document into a
/// [`NodeRef`] tree.
pub mod parser {
    use kuchikikiki::traits::TendrilSink;
    pub use kuchikikiki::{Attributes, NodeRef};
    pub use crate::node_utils::{NodeExt, new_fragment, new_html_element};

    /// Parse an HTML string into a [`NodeRef`] document tree.
    ///
    /// The parser follows the HTML5 specification; an implicit `<html>`, `<head>`,
    /// and `<body>` are synthesised when missing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use telegraph_content::parser::parse_html;
    ///
    /// let doc = parse_html("<p>hello</p>");
    /// assert!(doc.select_first("body > p").is_ok());
    /// ```
    pub fn parse_html(html: &str) -> NodeRef {
        kuchikikiki::parse_html().one(html)
    }
}

/// Encode one rendered node with default options.  `None` means the node is
/// not content (a comment, doctype, ...) and should be skipped.
///
/// # Examples
///
/// ```rust
/// use telegraph_content::parser::parse_html;
/// use telegraph_content::{encode, ContentNode, ElementNode};
///
/// let doc = parse_html(r#"<a href="/x" class="btn">go</a>"#);
/// let a = doc.select_first("a").unwrap().as_node().clone();
/// assert_eq!(
///     encode(&a),
///     Some(ContentNode::from(ElementNode::new("a").with_attr("href", "/x").with_child("go")))
/// );
/// ```
pub fn encode<N: RenderedNode>(node: &N) -> Option<ContentNode> {
    Codec::default().encode(node)
}

/// Encode the children of `root`; the form of a page's `content` field.
pub fn encode_children<N: RenderedNode>(root: &N) -> Vec<ContentNode> {
    Codec::default().encode_children(root)
}

/// Build a detached, renderable node from `node`.  An element with an empty
/// tag becomes a document fragment.
pub fn decode(node: &ContentNode) -> parser::NodeRef {
    Codec::default().decode(node)
}

/// Decode a whole content list into one document fragment.
pub fn decode_content(nodes: &[ContentNode]) -> parser::NodeRef {
    Codec::default().decode_content(nodes)
}

/// Parse `html` and encode the children of its `<body>`.
pub fn html_to_content(html: &str) -> Vec<ContentNode> {
    Codec::default().html_to_content(html)
}

/// Decode `nodes` and serialise them back to HTML.
pub fn content_to_html(nodes: &[ContentNode]) -> String {
    Codec::default().content_to_html(nodes)
}
