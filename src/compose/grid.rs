//! Merge independently traced panels into one canvas.
//!
//! Rows are assumed uniform: the canvas is as wide as the first row and each
//! row is as tall as its first panel. [`GridPlan::is_uniform`] reports whether
//! the input actually honours that.

use log::warn;

use crate::svg::{fmt_num, SvgNode, SVG_NAMESPACE};
use crate::{Error, Result};

/// Attributes a merged panel group does not inherit from its `<svg>`
pub const PANEL_ROOT_ATTRIBUTES: [&str; 7] = [
    "viewBox",
    "class",
    "width",
    "height",
    "fill",
    "style",
    "font-family",
];

/// Attributes the merged canvas inherits from the first panel
pub const SHARED_PRESENTATION: [&str; 3] = ["style", "fill", "font-family"];

/// Canvas size and per-panel offsets
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub width: f64,
    pub height: f64,
    pub offsets: Vec<(f64, f64)>,
    uniform: bool,
}

impl GridPlan {
    /// Lay out panels of the given `(width, height)` row-major in `columns`
    /// columns. The first row must be complete; a shorter last row is fine.
    pub fn new(sizes: &[(f64, f64)], columns: usize) -> Result<Self> {
        if columns == 0 {
            return Err(Error::ConfigError("grid needs at least one column".into()));
        }
        if sizes.len() < columns {
            return Err(Error::StructuralMismatch(format!(
                "first grid row has {} panels, expected {}",
                sizes.len(),
                columns
            )));
        }

        let width: f64 = sizes[..columns].iter().map(|(w, _)| w).sum();
        let height: f64 = sizes.chunks(columns).map(|row| row[0].1).sum();

        let mut offsets = Vec::with_capacity(sizes.len());
        let mut uniform = true;
        let mut y = 0.0;
        for (r, row) in sizes.chunks(columns).enumerate() {
            let (_, row_height) = row[0];
            let mut x = 0.0;
            for (c, (w, h)) in row.iter().enumerate() {
                offsets.push((x, y));
                x += w;
                if *h != row_height || (r > 0 && *w != sizes[c].0) {
                    uniform = false;
                }
            }
            y += row_height;
        }

        Ok(Self {
            width,
            height,
            offsets,
            uniform,
        })
    }

    /// Whether every row matches the first row's widths and its own first
    /// panel's height
    pub fn is_uniform(&self) -> bool {
        self.uniform
    }
}

/// Merge panels into one `<svg>`. A single panel is returned untouched.
pub fn merge(mut panels: Vec<SvgNode>, columns: usize) -> Result<SvgNode> {
    if panels.len() == 1 {
        return Ok(panels.remove(0));
    }
    if panels.is_empty() {
        return Err(Error::ConfigError("nothing to merge".into()));
    }

    let sizes = panels
        .iter()
        .enumerate()
        .map(|(i, p)| match (p.number_attr("width"), p.number_attr("height")) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(Error::StructuralMismatch(format!(
                "panel {} lacks a numeric width/height",
                i
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    let plan = GridPlan::new(&sizes, columns)?;
    if !plan.is_uniform() {
        warn!(
            "grid rows are not uniform; sizing {} panels from each row's first panel",
            panels.len()
        );
    }

    let mut canvas = SvgNode::new("svg")
        .with_attr("xmlns", SVG_NAMESPACE)
        .with_attr("width", fmt_num(plan.width))
        .with_attr("height", fmt_num(plan.height))
        .with_attr(
            "viewBox",
            format!("0 0 {} {}", fmt_num(plan.width), fmt_num(plan.height)),
        );
    for name in SHARED_PRESENTATION {
        if let Some(value) = panels[0].attr(name) {
            canvas.set_attr(name, value);
        }
    }

    for (panel, (x, y)) in panels.into_iter().zip(plan.offsets) {
        let mut group = SvgNode::group();
        for (name, value) in &panel.attrs {
            if !PANEL_ROOT_ATTRIBUTES.contains(&name.as_str()) && name != "xmlns" {
                group.set_attr(name.clone(), value.clone());
            }
        }
        group.pre_translate(x, y);
        group.children = panel.children;
        canvas.push(group);
    }
    Ok(canvas)
}
