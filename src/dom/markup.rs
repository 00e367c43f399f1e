//! In-memory DOM built from a markup snapshot.
//!
//! `MarkupDom` parses HTML with `scraper` and answers [`Dom`] queries from the
//! markup alone: computed style is the element's inline `style` declarations
//! and the bounding box comes from its declared `width`/`height`. It stands in
//! for a live browser in tests, the CLI and the render service.

use scraper::{Html, Node};

use super::{Dom, Rect, StyleMap, TEXT_NODE_NAME};
use crate::svg::{escape_attr, escape_text};
use crate::{Error, Result};

/// Handle to a node of a [`MarkupDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct MarkupNode {
    tag: String,
    text: Option<String>,
    attrs: Vec<(String, String)>,
    children: Vec<NodeId>,
}

/// Arena-backed DOM snapshot
#[derive(Debug, Clone)]
pub struct MarkupDom {
    nodes: Vec<MarkupNode>,
    root: NodeId,
    document_url: Option<String>,
}

impl MarkupDom {
    /// Parse an HTML document. Whitespace-only text nodes, comments and the
    /// doctype are dropped.
    pub fn parse(markup: &str) -> Self {
        let document = Html::parse_document(markup);
        if !document.errors.is_empty() {
            log::debug!("markup parsed with {} recoverable errors", document.errors.len());
        }

        let mut nodes: Vec<MarkupNode> = Vec::new();
        let mut stack = vec![(*document.root_element(), None::<NodeId>)];
        while let Some((node, parent)) = stack.pop() {
            let entry = match node.value() {
                Node::Element(element) => MarkupNode {
                    tag: element.name().to_string(),
                    text: None,
                    attrs: element
                        .attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    children: Vec::new(),
                },
                Node::Text(text) => {
                    let text: &str = text;
                    if text.trim().is_empty() {
                        continue;
                    }
                    MarkupNode {
                        tag: TEXT_NODE_NAME.to_string(),
                        text: Some(text.to_string()),
                        attrs: Vec::new(),
                        children: Vec::new(),
                    }
                }
                _ => continue,
            };

            let id = NodeId(nodes.len());
            nodes.push(entry);
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }
            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        Self {
            nodes,
            root: NodeId(0),
            document_url: None,
        }
    }

    /// Attach the URL the snapshot was taken from
    pub fn with_document_url(mut self, url: impl Into<String>) -> Self {
        self.document_url = Some(url.into());
        self
    }

    /// The `<html>` element
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element, if the parser produced one
    pub fn body(&self) -> Option<NodeId> {
        self.elements_by_tag("body").into_iter().next()
    }

    /// First element whose `id` attribute equals `id`
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        (0..self.nodes.len()).map(NodeId).find(|n| {
            self.nodes[n.0]
                .attrs
                .iter()
                .any(|(k, v)| k == "id" && v == id)
        })
    }

    /// Every element with the given tag name, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|n| self.nodes[n.0].text.is_none() && self.nodes[n.0].tag.eq_ignore_ascii_case(tag))
            .collect()
    }

    /// First element child of `node`
    pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)
            .children
            .iter()
            .copied()
            .find(|c| self.nodes[c.0].text.is_none())
    }

    fn node(&self, id: NodeId) -> &MarkupNode {
        &self.nodes[id.0]
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        if let Some(text) = &node.text {
            out.push_str(&escape_text(text));
            return;
        }
        out.push('<');
        out.push_str(&node.tag);
        for (k, v) in &node.attrs {
            out.push_str(&format!(" {}=\"{}\"", k, escape_attr(v)));
        }
        out.push('>');
        for child in &node.children {
            self.write_markup(*child, out);
        }
        out.push_str(&format!("</{}>", node.tag));
    }
}

impl Dom for MarkupDom {
    type Node = NodeId;

    fn tag_name_of(&self, node: NodeId) -> String {
        self.node(node).tag.clone()
    }

    fn text_of(&self, node: NodeId) -> Option<String> {
        self.node(node).text.clone()
    }

    fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).children.clone()
    }

    fn attributes_of(&self, node: NodeId) -> Vec<(String, String)> {
        self.node(node).attrs.clone()
    }

    fn computed_style_of(&self, node: NodeId) -> Result<StyleMap> {
        let node = self.node(node);
        if node.text.is_some() {
            return Err(Error::UnresolvableStyle("text nodes have no style".into()));
        }
        Ok(node
            .attrs
            .iter()
            .find(|(k, _)| k == "style")
            .map(|(_, v)| parse_inline_style(v))
            .unwrap_or_default())
    }

    fn bounding_rect_of(&self, node: NodeId) -> Rect {
        let entry = self.node(node);
        if entry.text.is_some() {
            return Rect::default();
        }
        let style = self.computed_style_of(node).unwrap_or_default();
        let dimension = |name: &str| {
            style
                .get(name)
                .and_then(|v| parse_pixels(v))
                .or_else(|| {
                    entry
                        .attrs
                        .iter()
                        .find(|(k, _)| k == name)
                        .and_then(|(_, v)| parse_pixels(v))
                })
                .unwrap_or(0.0)
        };
        Rect::new(0.0, 0.0, dimension("width"), dimension("height"))
    }

    fn serialize_of(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn document_url(&self) -> Option<String> {
        self.document_url.clone()
    }

    fn detach_children(&mut self, node: NodeId) {
        self.nodes[node.0].children.clear();
    }
}

/// Split `a: b; c: d` declarations into a style map. Later declarations win.
pub fn parse_inline_style(style: &str) -> StyleMap {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect()
}

fn parse_pixels(value: &str) -> Option<f64> {
    let v = value.trim();
    v.strip_suffix("px")
        .unwrap_or(v)
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}
