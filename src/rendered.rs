use crate::parser::NodeRef;
use html5ever::ns;
use kuchikikiki::NodeData;

/// The three shapes of rendered node the codec distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
    /// Comments, doctypes, processing instructions, documents and
    /// fragments.  Never encoded.
    Other,
}

/// Read-only view of a rendered document node.
///
/// The codec is written against this trait only, so any live tree (an
/// editor's view model, a headless DOM, a test double) can be encoded by
/// implementing it.  Implemented for [`NodeRef`].
pub trait RenderedNode: Sized {
    fn kind(&self) -> NodeKind;

    /// Lower-case element name, or `None` unless this is an element.
    fn tag_name(&self) -> Option<String>;

    /// Text of a text node, or `None` unless this is a text node.
    fn text_content(&self) -> Option<String>;

    /// Attributes in source order.  Empty unless this is an element.
    /// Namespaced attributes such as `xlink:href` are not listed.
    fn attributes(&self) -> Vec<(String, String)>;

    /// Direct children in source order.
    fn child_nodes(&self) -> Vec<Self>;
}

impl RenderedNode for NodeRef {
    fn kind(&self) -> NodeKind {
        match self.data() {
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Comment(_)
            | NodeData::ProcessingInstruction(_)
            | NodeData::Doctype(_)
            | NodeData::Document(_)
            | NodeData::DocumentFragment => NodeKind::Other,
        }
    }

    fn tag_name(&self) -> Option<String> {
        self.as_element()
            .map(|e| e.name.local.as_ref().to_ascii_lowercase())
    }

    fn text_content(&self) -> Option<String> {
        self.as_text().map(|t| t.borrow().clone())
    }

    fn attributes(&self) -> Vec<(String, String)> {
        match self.as_element() {
            Some(e) => e
                .attributes
                .borrow()
                .map
                .iter()
                .filter(|(name, _)| name.ns == ns!())
                .map(|(name, attr)| (name.local.to_string(), attr.value.clone()))
                .collect(),
            None => vec![],
        }
    }

    fn child_nodes(&self) -> Vec<NodeRef> {
        self.children().collect()
    }
}
