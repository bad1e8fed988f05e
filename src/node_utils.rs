use crate::parser::NodeRef;
use html5ever::{LocalName, QualName};
use kuchikikiki::{Attributes, ElementData, NodeData};
use std::cell::RefCell;

/// Small DOM helpers implemented on [`NodeRef`].
pub trait NodeExt {
    /// Return the local tag name of this node if it is an element (e.g.
    /// `"p"`, `"img"`), or `None` for text / comment / document nodes.
    fn element_name(&self) -> Option<&str>;

    /// Look up an attribute by name and return its value, or `None` if the
    /// attribute is absent or this is not an element node.
    fn attr_value(&self, name: &str) -> Option<String>;

    /// Set (or overwrite) an attribute.  Does nothing on non-element nodes.
    fn set_attr_value(&self, name: &str, value: &str);

    /// Serialise the *children* of this node to an HTML string (the node's
    /// own open/close tags are **not** included).  For a fragment this is
    /// the markup of the whole fragment.
    fn inner_html(&self) -> String;
}

/// Create a new, detached HTML element node with the given tag name and no
/// attributes or children.
///
/// # Examples
///
/// ```rust
/// use telegraph_content::{new_html_element, NodeExt};
///
/// let figure = new_html_element("figure");
/// assert_eq!(figure.element_name(), Some("figure"));
/// ```
pub fn new_html_element(tag_name: &str) -> NodeRef {
    let name = QualName::new(None, html5ever::ns!(html), LocalName::from(tag_name));
    let attributes = Attributes {
        map: Default::default(),
    };
    NodeRef::new(NodeData::Element(ElementData {
        name,
        attributes: RefCell::new(attributes),
        template_contents: None,
    }))
}

/// Create a new, empty document fragment: a container with no tag of its
/// own whose children are serialised as siblings.
pub fn new_fragment() -> NodeRef {
    NodeRef::new(NodeData::DocumentFragment)
}

impl NodeExt for NodeRef {
    fn element_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.name.local.as_ref())
    }

    fn attr_value(&self, name: &str) -> Option<String> {
        self.as_element()
            .and_then(|e| e.attributes.borrow().get(name).map(|v| v.to_string()))
    }

    fn set_attr_value(&self, name: &str, value: &str) {
        if let Some(e) = self.as_element() {
            e.attributes
                .borrow_mut()
                .insert(LocalName::from(name), value.to_string());
        }
    }

    fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            out.push_str(&child.to_string());
        }
        out
    }
}
