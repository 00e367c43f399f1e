//! The DOM service seam.
//!
//! The compositor never lays anything out itself. Whatever hosts the rendered
//! chart (a headless browser, a test fixture) implements [`Dom`] and hands the
//! compositor opaque node handles; every geometric fact comes back through this
//! trait.

use std::collections::HashMap;

use crate::Result;

#[cfg(feature = "markup")]
pub mod markup;

#[cfg(feature = "markup")]
pub use markup::MarkupDom;

/// Computed style of one node, keyed by CSS property name (`font-size`,
/// `margin-left`, ...).
pub type StyleMap = HashMap<String, String>;

/// Tag name reported for literal text nodes.
pub const TEXT_NODE_NAME: &str = "#text";

/// Measured border box of a node
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Layout vocabulary the compositor understands.
///
/// Anything a chart library emits outside this set (`style`, `script`,
/// `p`, ...) classifies as [`NodeKind::Ignored`] and produces no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A literal text child
    Text,
    /// A legend item: colour swatch plus label
    Span,
    /// An embedded chart fragment
    Svg,
    /// A generic container
    Div,
    /// A pass-through wrapper
    Figure,
    /// A chart title
    H2,
    Ignored,
}

impl NodeKind {
    /// Classify a tag name, case-insensitively.
    pub fn classify(tag: &str) -> NodeKind {
        if tag == TEXT_NODE_NAME {
            return NodeKind::Text;
        }
        match tag.to_ascii_lowercase().as_str() {
            "span" => NodeKind::Span,
            "svg" => NodeKind::Svg,
            "div" => NodeKind::Div,
            "figure" => NodeKind::Figure,
            "h2" => NodeKind::H2,
            _ => NodeKind::Ignored,
        }
    }
}

/// Host-provided view of a rendered document.
///
/// Implementations only answer questions; apart from [`Dom::detach_children`]
/// the compositor treats the document as read-only.
pub trait Dom {
    /// Cheap handle to a node owned by the implementation
    type Node: Copy + PartialEq + std::fmt::Debug;

    /// Tag name of an element, or [`TEXT_NODE_NAME`] for text nodes
    fn tag_name_of(&self, node: Self::Node) -> String;

    /// Layout classification of a node. The default derives it from the tag name.
    fn kind_of(&self, node: Self::Node) -> NodeKind {
        NodeKind::classify(&self.tag_name_of(node))
    }

    /// String value of a text node, `None` for elements
    fn text_of(&self, node: Self::Node) -> Option<String>;

    /// Ordered child nodes (elements and text)
    fn children_of(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Attributes in document order
    fn attributes_of(&self, node: Self::Node) -> Vec<(String, String)>;

    /// Single attribute lookup
    fn attribute_of(&self, node: Self::Node, name: &str) -> Option<String> {
        self.attributes_of(node)
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Resolved computed style. Fails with `Error::UnresolvableStyle` when the
    /// host cannot answer (detached nodes, text nodes).
    fn computed_style_of(&self, node: Self::Node) -> Result<StyleMap>;

    /// Border box after layout
    fn bounding_rect_of(&self, node: Self::Node) -> Rect;

    /// Markup of the node and its subtree
    fn serialize_of(&self, node: Self::Node) -> String;

    /// URL of the page the document was loaded from, if any
    fn document_url(&self) -> Option<String> {
        None
    }

    /// Remove every child of `node`. Called once per compose, after the
    /// container's content has been traced.
    fn detach_children(&mut self, node: Self::Node);
}

/// Concatenated text of all descendant text nodes.
pub fn text_content<D: Dom>(dom: &D, node: D::Node) -> String {
    if let Some(text) = dom.text_of(node) {
        return text;
    }
    dom.children_of(node)
        .into_iter()
        .map(|child| text_content(dom, child))
        .collect()
}

/// Short excerpt of a node's markup for error messages.
pub(crate) fn excerpt<D: Dom>(dom: &D, node: D::Node) -> String {
    const MAX: usize = 80;
    let markup = dom.serialize_of(node);
    match markup.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &markup[..cut]),
        None => markup,
    }
}
