//! Recursive DOM-to-SVG walk.
//!
//! Each visited node either produces SVG output in the caller's target group
//! or is skipped. Geometry flows back up as an [`Extent`]: block children
//! (embedded charts, containers) stack vertically, legend spans sit side by
//! side and the container grows to cover the last of them.

use log::{debug, trace};

use super::style::StyleSnapshot;
use super::units::DEFAULT_FONT_SIZE;
use crate::dom::{excerpt, text_content, Dom, NodeKind};
use crate::svg::{fmt_num, SvgChild, SvgNode, LAYOUT_ATTRIBUTES};
use crate::{Error, Result};

/// Pad added on each axis to a legend span's background rectangle
pub const SPAN_PAD: f64 = 10.0;

/// Accumulated footprint of a traced subtree
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
    /// Accumulated horizontal margins
    pub x: f64,
    /// Accumulated vertical margins
    pub y: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64, x: f64, y: f64) -> Self {
        Self { width, height, x, y }
    }

    /// Place `other` below what has been accumulated so far
    pub fn stack(&mut self, other: Extent) {
        self.width = self.width.max(other.width);
        self.height += other.height;
        self.x += other.x;
        self.y += other.y;
    }

    /// Grow to cover `other`, a box measured from the same origin
    pub fn cover(&mut self, other: Extent) {
        self.width = self.width.max(other.width);
        self.height = self.height.max(other.height);
        self.x += other.x;
        self.y += other.y;
    }
}

/// Mutable state of one top-level trace. Never shared between traces.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceContext {
    /// Current font size, used to resolve `em` lengths
    pub font_size: f64,
    pub span_pad: f64,
}

impl TraceContext {
    pub fn new(font_size: f64, span_pad: f64) -> Self {
        Self { font_size, span_pad }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE, SPAN_PAD)
    }
}

/// Per-container bookkeeping
#[derive(Debug, Default)]
struct Scope {
    spans: usize,
    /// Height accumulated before the first span of this container
    span_row: Option<f64>,
    in_span: bool,
    /// Positions in the target of headings still waiting for their `x`
    headings: Vec<usize>,
}

/// Converts DOM subtrees into SVG subtrees
pub struct Tracer<'d, D: Dom> {
    dom: &'d D,
    ctx: TraceContext,
    /// Heading rendered by the panel constructor instead of the walk
    claimed: Option<D::Node>,
}

impl<'d, D: Dom> Tracer<'d, D> {
    pub fn new(dom: &'d D, ctx: TraceContext) -> Self {
        Self {
            dom,
            ctx,
            claimed: None,
        }
    }

    /// Leave `heading` out of the walk; the caller draws it as the panel title.
    pub fn claim_heading(&mut self, heading: D::Node) {
        self.claimed = Some(heading);
    }

    pub fn context(&self) -> &TraceContext {
        &self.ctx
    }

    pub fn font_size(&self) -> f64 {
        self.ctx.font_size
    }

    /// Adopt a container's computed `font-size` when it resolves.
    pub fn enter_container(&mut self, node: D::Node) -> StyleSnapshot {
        let style = StyleSnapshot::of(self.dom, node);
        if let Some(size) = style.font_size(self.ctx.font_size) {
            self.ctx.font_size = size;
        }
        style
    }

    /// Trace `node` itself into `target`.
    pub fn trace(&mut self, node: D::Node, target: &mut SvgNode) -> Result<Extent> {
        let mut extent = Extent::default();
        let mut scope = Scope::default();
        self.visit(node, &mut scope, &mut extent, target)?;
        center_headings(&scope, &extent, target);
        Ok(extent)
    }

    /// Trace the children of `node` into `target`, without a group for
    /// `node` itself.
    pub fn trace_children(&mut self, node: D::Node, target: &mut SvgNode) -> Result<Extent> {
        self.walk(node, Scope::default(), target)
    }

    fn walk(&mut self, node: D::Node, mut scope: Scope, target: &mut SvgNode) -> Result<Extent> {
        let mut extent = Extent::default();
        for child in self.dom.children_of(node) {
            self.visit(child, &mut scope, &mut extent, target)?;
        }
        center_headings(&scope, &extent, target);
        trace!("traced {:?} -> {:?}", node, extent);
        Ok(extent)
    }

    fn visit(
        &mut self,
        node: D::Node,
        scope: &mut Scope,
        extent: &mut Extent,
        target: &mut SvgNode,
    ) -> Result<()> {
        match self.dom.kind_of(node) {
            NodeKind::Text => {
                let text = self.text(node, extent, scope.in_span);
                target.push(text);
            }
            NodeKind::Span => {
                let row = *scope.span_row.get_or_insert(extent.height);
                let (group, span) = self.span(node, scope.spans, row)?;
                scope.spans += 1;
                target.push(group);
                extent.cover(span);
            }
            NodeKind::Svg => {
                let group = self.svg(node, extent, scope.in_span)?;
                target.push(group);
            }
            NodeKind::Div => {
                let (group, div) = self.div(node)?;
                target.push(group);
                extent.stack(div);
            }
            NodeKind::Figure => {
                let inner = Scope {
                    in_span: scope.in_span,
                    ..Scope::default()
                };
                let figure = self.walk(node, inner, target)?;
                extent.stack(figure);
            }
            NodeKind::H2 if self.claimed == Some(node) => {
                debug!("title {:?} left to the panel constructor", node);
            }
            NodeKind::H2 => {
                let heading = self.heading(node, extent);
                scope.headings.push(target.children.len());
                target.push(heading);
            }
            NodeKind::Ignored => {
                debug!("skipping <{}>", self.dom.tag_name_of(node));
            }
        }
        Ok(())
    }

    fn text(&self, node: D::Node, extent: &Extent, in_span: bool) -> SvgNode {
        let mut text = SvgNode::new("text");
        if extent.x != 0.0 || extent.y != 0.0 {
            text.set_attr("x", fmt_num(extent.x));
            text.set_attr("y", fmt_num(extent.y));
        }
        text.set_attr("font-size", fmt_num(self.ctx.font_size));
        if in_span {
            text.set_attr("dy", "0.32em");
        }
        text.push_text(self.dom.text_of(node).unwrap_or_default());
        text
    }

    /// A heading met during the walk. It is centered once the container's
    /// width is known and takes no room of its own.
    fn heading(&self, node: D::Node, extent: &Extent) -> SvgNode {
        let style = StyleSnapshot::of(self.dom, node);
        let font_size = style.font_size(self.ctx.font_size).unwrap_or(self.ctx.font_size);
        heading_text(
            text_content(self.dom, node).trim(),
            0.0,
            extent.height + font_size / 2.0,
            font_size,
            style.get("color"),
        )
    }

    fn span(&mut self, node: D::Node, index: usize, row_offset: f64) -> Result<(SvgNode, Extent)> {
        let children = self.dom.children_of(node);
        let has = |kind: NodeKind| children.iter().any(|c| self.dom.kind_of(*c) == kind);
        if !has(NodeKind::Svg) || !has(NodeKind::Text) {
            return Err(Error::StructuralMismatch(format!(
                "legend span needs a swatch and a label: {}",
                excerpt(self.dom, node)
            )));
        }

        let style = StyleSnapshot::of(self.dom, node);
        let margin = style.horizontal_margin(self.ctx.font_size)?;

        let mut content = SvgNode::group();
        let inner = Scope {
            in_span: true,
            ..Scope::default()
        };
        let extent = self.walk(node, inner, &mut content)?;

        let pad = self.ctx.span_pad;
        let (width, height) = (extent.width + pad, extent.height + pad);
        let background = SvgNode::new("rect")
            .with_attr("width", fmt_num(width))
            .with_attr("height", fmt_num(height))
            .with_attr("fill", "none")
            .with_attr("stroke", "none");

        let measured = self.dom.bounding_rect_of(node).width;
        let slot = if measured > 0.0 { measured } else { width };

        let x = index as f64 * (slot + margin);
        let mut group = SvgNode::group();
        group.translate(x, row_offset);
        group.push(background);
        group.children.extend(content.children);
        Ok((group, Extent::new(x + width, row_offset + height, 0.0, 0.0)))
    }

    fn svg(&mut self, node: D::Node, extent: &mut Extent, in_span: bool) -> Result<SvgNode> {
        let style = StyleSnapshot::of(self.dom, node);
        let font_size = self.ctx.font_size;
        let dx = style.horizontal_margin(font_size)?;
        let dy = style.vertical_margin(font_size)?;

        let measured = self.dom.bounding_rect_of(node);
        let width = self.declared(node, "width")?.unwrap_or(measured.width);
        let height = self.declared(node, "height")?.unwrap_or(measured.height);
        let offset = extent.height;

        let mut group = SvgNode::group();
        for (name, value) in self.dom.attributes_of(node) {
            if !LAYOUT_ATTRIBUTES.contains(&name.as_str()) {
                group.set_attr(name, value);
            }
        }

        let children: Vec<_> = self
            .dom
            .children_of(node)
            .into_iter()
            .filter(|c| !self.dom.tag_name_of(*c).eq_ignore_ascii_case("style"))
            .collect();

        if in_span && self.is_swatch(&children) {
            let mut rect = self.copy(children[0]);
            if let SvgChild::Element(rect) = &mut rect {
                rect.set_attr("width", fmt_num(measured.width));
                rect.set_attr("height", fmt_num(measured.height));
            }
            group.translate(measured.width / 2.0, -measured.height / 2.0);
            group.children.push(rect);
        } else {
            if in_span {
                let shift_x = style.length("margin-left", font_size)?
                    - style.length("margin-right", font_size)?;
                let shift_y = style.length("margin-top", font_size)?
                    - style.length("margin-bottom", font_size)?;
                group.translate(shift_x, shift_y);
            } else if offset != 0.0 {
                group.translate(0.0, offset);
            }
            group.children.extend(children.into_iter().map(|c| self.copy(c)));
        }

        extent.stack(Extent::new(width, height, dx, dy));
        Ok(group)
    }

    fn div(&mut self, node: D::Node) -> Result<(SvgNode, Extent)> {
        let style = self.enter_container(node);
        let height_offset = style.height_offset(self.ctx.font_size)?;
        let child_count = self.dom.children_of(node).len();

        let mut group = SvgNode::group();
        let extent = self.walk(node, Scope::default(), &mut group)?;
        if child_count > 1 {
            group.translate(extent.width / 2.0, height_offset / 2.0);
        }
        Ok((
            group,
            Extent::new(extent.width, extent.height + height_offset, extent.x, extent.y),
        ))
    }

    /// A swatch is an embedded SVG holding a single `rect`
    fn is_swatch(&self, children: &[D::Node]) -> bool {
        children.len() == 1 && self.dom.tag_name_of(children[0]).eq_ignore_ascii_case("rect")
    }

    /// `width`/`height` attribute in pixels; bare numbers are user units
    fn declared(&self, node: D::Node, name: &str) -> Result<Option<f64>> {
        let Some(raw) = self.dom.attribute_of(node, name) else {
            return Ok(None);
        };
        if let Ok(v) = raw.trim().parse::<f64>() {
            if !v.is_finite() {
                return Err(Error::UnsupportedLengthUnit { value: raw });
            }
            return Ok(Some(v));
        }
        super::units::resolve_length(Some(&raw), self.ctx.font_size).map(Some)
    }

    /// Verbatim deep copy of an SVG subtree
    fn copy(&self, node: D::Node) -> SvgChild {
        if let Some(text) = self.dom.text_of(node) {
            return SvgChild::Text(text);
        }
        let mut element = SvgNode::new(self.dom.tag_name_of(node));
        for (name, value) in self.dom.attributes_of(node) {
            element.set_attr(name, value);
        }
        element.children = self
            .dom
            .children_of(node)
            .into_iter()
            .map(|c| self.copy(c))
            .collect();
        SvgChild::Element(element)
    }
}

/// Centered `<text>` for a title or heading
pub(crate) fn heading_text(
    text: &str,
    x: f64,
    y: f64,
    font_size: f64,
    color: Option<&str>,
) -> SvgNode {
    let mut node = SvgNode::new("text")
        .with_attr("x", fmt_num(x))
        .with_attr("y", fmt_num(y))
        .with_attr("text-anchor", "middle")
        .with_attr("dominant-baseline", "middle")
        .with_attr("font-size", fmt_num(font_size));
    if let Some(color) = color {
        node.set_attr("fill", color);
    }
    node.push_text(text);
    node
}

fn center_headings(scope: &Scope, extent: &Extent, target: &mut SvgNode) {
    for &i in &scope.headings {
        if let Some(SvgChild::Element(heading)) = target.children.get_mut(i) {
            heading.set_attr("x", fmt_num(extent.width / 2.0));
        }
    }
}
