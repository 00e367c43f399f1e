//! Output tree built by the compositor.

use indexmap::IndexMap;
use log::warn;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Attributes an embedded fragment keeps for itself; everything else is
/// presentation and travels onto the group that replaces it.
pub const LAYOUT_ATTRIBUTES: [&str; 4] = ["viewBox", "class", "width", "height"];

/// Child of an [`SvgNode`]
#[derive(Debug, Clone, PartialEq)]
pub enum SvgChild {
    Element(SvgNode),
    Text(String),
}

/// One element of the static SVG being assembled
#[derive(Debug, Clone, PartialEq)]
pub struct SvgNode {
    pub tag: String,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<SvgChild>,
}

impl SvgNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// An empty `<g>`
    pub fn group() -> Self {
        Self::new("g")
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set an attribute. Re-setting keeps the attribute's original position.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Attribute parsed as a plain number (a trailing `px` is tolerated)
    pub fn number_attr(&self, name: &str) -> Option<f64> {
        let raw = self.attr(name)?.trim();
        raw.strip_suffix("px")
            .unwrap_or(raw)
            .trim()
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
    }

    /// Set `transform="translate(x, y)"`
    pub fn translate(&mut self, x: f64, y: f64) {
        self.set_attr("transform", format!("translate({}, {})", fmt_num(x), fmt_num(y)));
    }

    /// Apply `translate(x, y)` after any transform the node already has
    pub fn pre_translate(&mut self, x: f64, y: f64) {
        let shift = format!("translate({}, {})", fmt_num(x), fmt_num(y));
        match self.attrs.get_mut("transform") {
            Some(existing) => *existing = format!("{} {}", shift, existing),
            None => self.set_attr("transform", shift),
        }
    }

    pub fn push(&mut self, child: SvgNode) {
        self.children.push(SvgChild::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(SvgChild::Text(text.into()));
    }

    /// Element children only
    pub fn elements(&self) -> impl Iterator<Item = &SvgNode> {
        self.children.iter().filter_map(|c| match c {
            SvgChild::Element(e) => Some(e),
            SvgChild::Text(_) => None,
        })
    }

    /// Concatenated text of this element's subtree
    pub fn text(&self) -> String {
        self.children
            .iter()
            .map(|c| match c {
                SvgChild::Element(e) => e.text(),
                SvgChild::Text(t) => t.clone(),
            })
            .collect()
    }
}

/// Format a coordinate the way it should read in markup: integers without a
/// fractional part, everything else with at most six decimals.
///
/// Geometry is checked for finiteness before it gets here; a stray NaN or
/// infinity is logged and written as 0 so the document stays well-formed.
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        warn!("non-finite coordinate {} written as 0", v);
        return "0".to_string();
    }
    let nearest = v.round();
    let v = if (v - nearest).abs() < 1e-6 { nearest } else { v };
    if v == v.trunc() {
        // also folds -0 into 0
        return format!("{}", v as i64);
    }
    let s = format!("{:.6}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub(crate) fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
