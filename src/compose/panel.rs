//! One rendered chart to one standalone `<svg>`.

use log::warn;

use super::grid::SHARED_PRESENTATION;
use super::style::StyleSnapshot;
use super::tracer::{heading_text, Extent, TraceContext, Tracer};
use crate::dom::{excerpt, text_content, Dom, NodeKind};
use crate::svg::{fmt_num, SvgNode, SVG_NAMESPACE};
use crate::{Error, Result};

/// Knobs for a single panel
#[derive(Debug, Clone, Default)]
pub struct PanelOptions {
    pub context: TraceContext,
    /// Replaces the text of the panel's `H2`, or adds a title when there is none
    pub title: Option<String>,
}

struct Title {
    text: String,
    font_size: f64,
    color: Option<String>,
}

/// Trace one panel root (a titled `DIV`, a `FIGURE`, or a bare `svg`) into a
/// complete `<svg>` element.
pub fn build_panel<D: Dom>(dom: &D, root: D::Node, options: &PanelOptions) -> Result<SvgNode> {
    let mut tracer = Tracer::new(dom, options.context.clone());
    let mut content = SvgNode::group();

    let container = match dom.kind_of(root) {
        NodeKind::Svg => false,
        NodeKind::Div | NodeKind::Figure => true,
        _ => {
            return Err(Error::StructuralMismatch(format!(
                "panel root must be a div, figure or svg: {}",
                excerpt(dom, root)
            )))
        }
    };

    let heading = if container {
        tracer.enter_container(root);
        dom.children_of(root)
            .into_iter()
            .find(|c| dom.kind_of(*c) == NodeKind::H2)
    } else {
        None
    };
    if let Some(h2) = heading {
        tracer.claim_heading(h2);
    }
    let title = make_title(dom, heading, options.title.as_deref(), tracer.font_size());

    let extent = if container {
        tracer.trace_children(root, &mut content)?
    } else {
        tracer.trace(root, &mut content)?
    };
    let Extent { width, height, .. } = extent;
    if !(width.is_finite() && height.is_finite()) {
        return Err(Error::RenderError(format!(
            "panel {:?} measured {} x {}",
            root, width, height
        )));
    }
    let height = height + title.as_ref().map_or(0.0, |t| t.font_size);

    let mut svg = SvgNode::new("svg")
        .with_attr("xmlns", SVG_NAMESPACE)
        .with_attr("width", fmt_num(width))
        .with_attr("height", fmt_num(height))
        .with_attr("viewBox", format!("0 0 {} {}", fmt_num(width), fmt_num(height)));

    match locate_reference(dom, root) {
        Some(reference) => copy_presentation(dom, reference, &mut svg),
        None => warn!("panel {:?} has no embedded chart to borrow presentation from", root),
    }

    if let Some(title) = &title {
        content.translate(0.0, title.font_size);
        svg.push(title_text(title, width));
    }
    svg.push(content);
    Ok(svg)
}

/// The embedded chart whose presentation attributes the panel inherits:
/// the root itself when it is an `svg`, the last child of a `FIGURE`, or the
/// first chart inside a `DIV`. Legend swatches inside spans never qualify.
pub fn locate_reference<D: Dom>(dom: &D, root: D::Node) -> Option<D::Node> {
    match dom.kind_of(root) {
        NodeKind::Svg => Some(root),
        NodeKind::Figure => {
            let children = dom.children_of(root);
            match children.last() {
                Some(last) if dom.kind_of(*last) == NodeKind::Svg => Some(*last),
                _ => children.into_iter().find_map(|c| nested_reference(dom, c)),
            }
        }
        NodeKind::Div => dom
            .children_of(root)
            .into_iter()
            .find_map(|c| nested_reference(dom, c)),
        _ => None,
    }
}

fn nested_reference<D: Dom>(dom: &D, node: D::Node) -> Option<D::Node> {
    match dom.kind_of(node) {
        NodeKind::Svg | NodeKind::Figure | NodeKind::Div => locate_reference(dom, node),
        _ => None,
    }
}

/// The reference chart keeps its identity (`id`, `class`, ...) on the group
/// that replaces it; the canvas only borrows what styles the whole drawing.
fn copy_presentation<D: Dom>(dom: &D, reference: D::Node, svg: &mut SvgNode) {
    for (name, value) in dom.attributes_of(reference) {
        if SHARED_PRESENTATION.contains(&name.as_str()) {
            svg.set_attr(name, value);
        }
    }
}

fn make_title<D: Dom>(
    dom: &D,
    heading: Option<D::Node>,
    replacement: Option<&str>,
    font_size: f64,
) -> Option<Title> {
    match (heading, replacement) {
        (Some(h2), replacement) => {
            let style = StyleSnapshot::of(dom, h2);
            Some(Title {
                text: replacement
                    .map(str::to_string)
                    .unwrap_or_else(|| text_content(dom, h2).trim().to_string()),
                font_size: style.font_size(font_size).unwrap_or(font_size),
                color: style.get("color").map(str::to_string),
            })
        }
        (None, Some(text)) => Some(Title {
            text: text.to_string(),
            font_size,
            color: None,
        }),
        (None, None) => None,
    }
}

fn title_text(title: &Title, width: f64) -> SvgNode {
    heading_text(
        &title.text,
        width / 2.0,
        title.font_size / 2.0,
        title.font_size,
        title.color.as_deref(),
    )
}

#[cfg(all(test, feature = "markup"))]
mod tests {
    use super::*;
    use crate::dom::MarkupDom;

    fn panel(html: &str, options: &PanelOptions) -> Result<SvgNode> {
        let dom = MarkupDom::parse(html);
        let root = dom.element_by_id("panel").expect("fixture needs #panel");
        build_panel(&dom, root, options)
    }

    #[test]
    fn bare_svg_panel_keeps_its_size() {
        let svg = panel(
            r#"<svg id="panel" width="400" height="300" viewBox="0 0 400 300"></svg>"#,
            &PanelOptions::default(),
        )
        .unwrap();
        assert_eq!(svg.attr("width"), Some("400"));
        assert_eq!(svg.attr("height"), Some("300"));
        assert_eq!(svg.attr("viewBox"), Some("0 0 400 300"));
        assert_eq!(svg.attr("xmlns"), Some(SVG_NAMESPACE));
    }

    #[test]
    fn title_is_first_child_and_adds_its_font_height() {
        let svg = panel(
            r#"<div id="panel"><h2 style="font-size: 16px; color: #333">Revenue</h2><svg width="300" height="200"></svg></div>"#,
            &PanelOptions::default(),
        )
        .unwrap();
        assert_eq!(svg.attr("height"), Some("216"));
        assert_eq!(svg.attr("viewBox"), Some("0 0 300 216"));

        let title = svg.elements().next().unwrap();
        assert_eq!(title.tag, "text");
        assert_eq!(title.text(), "Revenue");
        assert_eq!(title.attr("x"), Some("150"));
        assert_eq!(title.attr("text-anchor"), Some("middle"));
        assert_eq!(title.attr("dominant-baseline"), Some("middle"));
        assert_eq!(title.attr("fill"), Some("#333"));

        let content = svg.elements().nth(1).unwrap();
        assert_eq!(content.attr("transform"), Some("translate(0, 16)"));
    }

    #[test]
    fn title_override_replaces_heading_text() {
        let options = PanelOptions {
            title: Some("Costs".into()),
            ..Default::default()
        };
        let svg = panel(
            r#"<div id="panel"><h2 style="font-size: 16px">Revenue</h2><svg width="300" height="200"></svg></div>"#,
            &options,
        )
        .unwrap();
        assert_eq!(svg.elements().next().unwrap().text(), "Costs");
    }

    #[test]
    fn title_without_heading_uses_context_font_size() {
        let options = PanelOptions {
            title: Some("Added".into()),
            ..Default::default()
        };
        let svg = panel(r#"<div id="panel"><svg width="100" height="50"></svg></div>"#, &options).unwrap();
        assert_eq!(svg.attr("height"), Some("60"));
    }

    #[test]
    fn presentation_comes_from_the_chart_not_the_swatches() {
        let svg = panel(
            r#"<figure id="panel"><div><span><svg width="15" height="15" fill="red"><rect></rect></svg>A</span></div><svg class="plot" width="640" height="400" fill="currentColor" font-family="system-ui, sans-serif" style="max-width: 100%"></svg></figure>"#,
            &PanelOptions::default(),
        )
        .unwrap();
        assert_eq!(svg.attr("fill"), Some("currentColor"));
        assert_eq!(svg.attr("font-family"), Some("system-ui, sans-serif"));
        assert_eq!(svg.attr("style"), Some("max-width: 100%"));
        assert_eq!(svg.attr("class"), None);
        assert_eq!(svg.attr("width"), Some("640"));
    }

    #[test]
    fn chart_identity_stays_on_its_group() {
        let svg = panel(
            r#"<div id="panel"><svg id="chart" class="plot" width="300" height="200" fill="currentColor" aria-label="sales" text-anchor="middle"></svg></div>"#,
            &PanelOptions::default(),
        )
        .unwrap();
        assert_eq!(svg.attr("id"), None);
        assert_eq!(svg.attr("aria-label"), None);
        assert_eq!(svg.attr("text-anchor"), None);
        assert_eq!(svg.attr("fill"), Some("currentColor"));

        let chart = svg.elements().next().unwrap();
        assert_eq!(chart.attr("id"), Some("chart"));
        assert_eq!(chart.attr("text-anchor"), Some("middle"));
    }

    #[test]
    fn only_the_first_heading_becomes_the_title() {
        let svg = panel(
            r#"<div id="panel"><h2 style="font-size: 16px">Revenue</h2><svg width="300" height="200"></svg><h2 style="font-size: 12px">By region</h2></div>"#,
            &PanelOptions::default(),
        )
        .unwrap();
        assert_eq!(svg.attr("height"), Some("216"));
        assert_eq!(svg.elements().next().unwrap().text(), "Revenue");

        let content = svg.elements().nth(1).unwrap();
        let subtitle = content.elements().last().unwrap();
        assert_eq!(subtitle.tag, "text");
        assert_eq!(subtitle.text(), "By region");
        assert_eq!(subtitle.attr("x"), Some("150"));
        assert_eq!(subtitle.attr("y"), Some("206"));
    }

    #[test]
    fn reference_inside_titled_div_is_first_chart() {
        let dom = MarkupDom::parse(
            r#"<div id="panel"><h2>T</h2><div><figure><svg id="chart" width="10" height="10"></svg></figure></div><svg id="late" width="5" height="5"></svg></div>"#,
        );
        let root = dom.element_by_id("panel").unwrap();
        assert_eq!(locate_reference(&dom, root), dom.element_by_id("chart"));
    }

    #[test]
    fn span_root_is_rejected() {
        let err = panel(
            r#"<span id="panel"><svg width="1" height="1"><rect></rect></svg>x</span>"#,
            &PanelOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch(_)));
    }
}
