//! DOM-to-SVG composition.
//!
//! [`compose`] is the one-shot entry point: trace each panel root, merge them
//! when composing a grid, serialize, then hand the processed DOM subtrees
//! back by detaching their children.

pub mod grid;
pub mod panel;
pub mod style;
pub mod tracer;
pub mod units;

use log::debug;

use crate::dom::{Dom, NodeKind};
use crate::svg::SvgNode;
use crate::{ComposeConfig, Mode, Result};

pub use grid::{merge, GridPlan};
pub use panel::{build_panel, locate_reference, PanelOptions};
pub use style::StyleSnapshot;
pub use tracer::{Extent, TraceContext, Tracer, SPAN_PAD};
pub use units::{resolve_length, DEFAULT_FONT_SIZE};

/// Trace `panels` into one `<svg>` tree without serializing or detaching
/// anything.
pub fn compose_panels<D: Dom>(
    dom: &D,
    panels: &[D::Node],
    config: &ComposeConfig,
) -> Result<SvgNode> {
    config.validate(panels.len())?;

    let traced = panels
        .iter()
        .enumerate()
        .map(|(i, root)| {
            // fresh context per panel: font size never leaks between traces
            let options = PanelOptions {
                context: TraceContext::new(config.default_font_size, config.span_pad),
                title: config.title_for(i).map(str::to_string),
            };
            build_panel(dom, *root, &options)
        })
        .collect::<Result<Vec<_>>>()?;

    match config.mode {
        Mode::Single => merge(traced, 1),
        Mode::Grid => merge(traced, config.columns),
    }
}

/// Compose `panels` into a serialized SVG document, then detach the
/// children of every panel root.
pub fn compose<D: Dom>(dom: &mut D, panels: &[D::Node], config: &ComposeConfig) -> Result<String> {
    let svg = compose_panels(&*dom, panels, config)?;
    let document_url = config.document_url.clone().or_else(|| dom.document_url());
    let out = crate::serialize::serialize(svg, document_url.as_deref(), config.pretty)?;

    for root in panels {
        dom.detach_children(*root);
    }
    Ok(out)
}

/// Compose a grid whose panels are the `DIV` children of `container`. Other
/// children are skipped. The container's children are detached afterwards.
pub fn compose_grid_container<D: Dom>(
    dom: &mut D,
    container: D::Node,
    config: &ComposeConfig,
) -> Result<String> {
    let panels: Vec<D::Node> = dom
        .children_of(container)
        .into_iter()
        .filter(|c| dom.kind_of(*c) == NodeKind::Div)
        .collect();
    debug!("grid container {:?} holds {} panels", container, panels.len());

    let config = ComposeConfig {
        mode: Mode::Grid,
        ..config.clone()
    };
    let svg = compose_panels(&*dom, &panels, &config)?;
    let document_url = config.document_url.clone().or_else(|| dom.document_url());
    let out = crate::serialize::serialize(svg, document_url.as_deref(), config.pretty)?;

    dom.detach_children(container);
    Ok(out)
}
