use crate::logging::PerfConsoleListener;
use crate::logging::logger::*;
use crate::logging::logging_defs::*;
use crate::models::{CodecOptions, ContentNode, ElementNode};
use crate::node_utils::{NodeExt, new_fragment, new_html_element};
use crate::parser::{NodeRef, parse_html};
use crate::rendered::{NodeKind, RenderedNode};
use crate::utils::{content_root, is_whitelisted_attribute};

use std::collections::BTreeMap;
use std::rc::Rc;

fn create_perf_logger(options: &CodecOptions) -> PerfLogger {
    let mut listeners = vec![];
    if options.debug {
        listeners.push(Listener::new(Rc::new(PerfConsoleListener {})));
    }
    PerfLogger::new(listeners)
}

/// Converts rendered documents to content trees and back.
///
/// Every operation is total: any well-formed input produces an output, and
/// nothing is validated beyond the text / element / other split.  A `Codec`
/// holds only its options and a perf logger, so one instance can be reused
/// for any number of conversions.
pub struct Codec {
    logger: PerfLogger,
    options: CodecOptions,
}

impl Default for Codec {
    fn default() -> Codec {
        Codec::new(CodecOptions::default())
    }
}

impl Codec {
    pub fn new(options: CodecOptions) -> Codec {
        Codec {
            logger: create_perf_logger(&options),
            options,
        }
    }

    /// Wire in extra listeners, e.g. to collect timings in a host
    /// application.  Replaces the console listener chosen from the options.
    pub fn with_listeners(options: CodecOptions, listeners: Vec<Listener>) -> Codec {
        Codec {
            logger: PerfLogger::new(listeners),
            options,
        }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Encode one rendered node.
    ///
    /// Returns `None` for nodes that are neither text nor element (comments,
    /// doctypes, ...).  Elements keep their tag, keep only the `href` and
    /// `src` attributes, and keep their encodable children in order.
    /// Elements nested deeper than [`CodecOptions::max_depth`] are dropped.
    pub fn encode<N: RenderedNode>(&self, node: &N) -> Option<ContentNode> {
        start_span!(self.logger, ENCODE);
        let encoded = self.encode_at(node, 1);
        end_span!(self.logger, ENCODE);
        encoded
    }

    /// Encode the children of `root`, skipping the root itself.  This is the
    /// shape of a page's `content` field: `root` is usually a `<body>`, a
    /// fragment, or the editor's container element.
    pub fn encode_children<N: RenderedNode>(&self, root: &N) -> Vec<ContentNode> {
        start_span!(self.logger, ENCODE);
        let encoded = root
            .child_nodes()
            .iter()
            .filter_map(|child| self.encode_at(child, 1))
            .collect::<Vec<_>>();
        add_point_to_span!(self.logger, ENCODE, format!("top-level nodes: {}", encoded.len()));
        end_span!(self.logger, ENCODE);
        encoded
    }

    /// Encodes `root` with an explicit stack of open elements, so the depth
    /// of the rendered tree never reaches the call stack.
    fn encode_at<N: RenderedNode>(&self, root: &N, depth: usize) -> Option<ContentNode> {
        let mut stack = match self.encode_step(root, depth) {
            EncodeStep::Done(encoded) => return encoded,
            EncodeStep::Open(frame) => vec![frame],
        };
        while let Some(frame) = stack.last_mut() {
            match frame.pending.next() {
                Some(child) => match self.encode_step(&child, frame.depth + 1) {
                    EncodeStep::Done(Some(encoded)) => frame.element.children.push(encoded),
                    EncodeStep::Done(None) => {}
                    EncodeStep::Open(child_frame) => stack.push(child_frame),
                },
                None => {
                    let finished = ContentNode::Element(stack.pop()?.element);
                    match stack.last_mut() {
                        Some(parent) => parent.element.children.push(finished),
                        None => return Some(finished),
                    }
                }
            }
        }
        None
    }

    fn encode_step<N: RenderedNode>(&self, node: &N, depth: usize) -> EncodeStep<N> {
        match node.kind() {
            NodeKind::Text => {
                EncodeStep::Done(Some(ContentNode::Text(node.text_content().unwrap_or_default())))
            }
            NodeKind::Other => {
                annotate_span!(self.logger, ENCODE, "omitted non-content node");
                EncodeStep::Done(None)
            }
            NodeKind::Element if depth > self.options.max_depth => {
                annotate_span!(
                    self.logger,
                    ENCODE,
                    format!("omitted element nested deeper than {}", self.options.max_depth)
                );
                EncodeStep::Done(None)
            }
            NodeKind::Element => {
                let attrs = node
                    .attributes()
                    .into_iter()
                    .filter(|(name, _)| is_whitelisted_attribute(name))
                    .collect::<BTreeMap<_, _>>();
                EncodeStep::Open(EncodeFrame {
                    element: ElementNode {
                        tag: node.tag_name().unwrap_or_default(),
                        attrs,
                        children: vec![],
                    },
                    pending: node.child_nodes().into_iter(),
                    depth,
                })
            }
        }
    }

    /// Build a detached, renderable node from a content node.
    ///
    /// Text is carried verbatim.  An element with an empty tag becomes a
    /// document fragment whose children serialise as siblings; when such an
    /// element is nested inside another, its children are spliced into the
    /// parent directly.  Attributes are set as given, without filtering.
    pub fn decode(&self, node: &ContentNode) -> NodeRef {
        start_span!(self.logger, DECODE);
        let decoded = match node {
            ContentNode::Text(text) => NodeRef::new_text(text.as_str()),
            ContentNode::Element(element) => {
                let root = if element.is_fragment() {
                    new_fragment()
                } else {
                    new_dom_element(element)
                };
                decode_into(&root, &element.children);
                root
            }
        };
        end_span!(self.logger, DECODE);
        decoded
    }

    /// Decode a whole content list into one fragment.
    pub fn decode_content(&self, nodes: &[ContentNode]) -> NodeRef {
        start_span!(self.logger, DECODE);
        let fragment = new_fragment();
        decode_into(&fragment, nodes);
        add_point_to_span!(self.logger, DECODE, format!("top-level nodes: {}", nodes.len()));
        end_span!(self.logger, DECODE);
        fragment
    }

    /// Parse an HTML document or snippet and encode the children of its
    /// `<body>`.
    pub fn html_to_content(&self, html: &str) -> Vec<ContentNode> {
        start_span!(self.logger, PARSE_HTML);
        let doc = parse_html(html);
        end_span!(self.logger, PARSE_HTML);
        self.encode_children(&content_root(&doc))
    }

    /// Decode `nodes` and serialise them as HTML.  This is where text gets
    /// entity-escaped; the content tree itself holds raw strings.
    pub fn content_to_html(&self, nodes: &[ContentNode]) -> String {
        let fragment = self.decode_content(nodes);
        start_span!(self.logger, SERIALIZE_HTML);
        let html = fragment.inner_html();
        end_span!(self.logger, SERIALIZE_HTML);
        html
    }
}

struct EncodeFrame<N> {
    element: ElementNode,
    pending: std::vec::IntoIter<N>,
    depth: usize,
}

enum EncodeStep<N> {
    Done(Option<ContentNode>),
    Open(EncodeFrame<N>),
}

fn new_dom_element(element: &ElementNode) -> NodeRef {
    let dom_node = new_html_element(&element.tag);
    for (name, value) in &element.attrs {
        dom_node.set_attr_value(name, value);
    }
    dom_node
}

/// Appends the decoded `nodes` to `parent`.  Fragments below the top level
/// do not become DOM nodes of their own: their children go to whatever
/// parent the fragment sits in.
fn decode_into(parent: &NodeRef, nodes: &[ContentNode]) {
    let mut stack = vec![(parent.clone(), nodes.iter())];
    while let Some((parent, pending)) = stack.last_mut() {
        let Some(node) = pending.next() else {
            stack.pop();
            continue;
        };
        match node {
            ContentNode::Text(text) => parent.append(NodeRef::new_text(text.as_str())),
            ContentNode::Element(element) if element.is_fragment() => {
                let parent = parent.clone();
                stack.push((parent, element.children.iter()));
            }
            ContentNode::Element(element) => {
                let dom_node = new_dom_element(element);
                parent.append(dom_node.clone());
                stack.push((dom_node, element.children.iter()));
            }
        }
    }
}
