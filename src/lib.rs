//! RFox static SVG export
//!
//! Turns chart markup that a browser has already laid out (native SVG
//! fragments mixed with HTML legends, titles and multi-panel grids) into one
//! self-contained SVG document that needs no CSS engine to display.
//!
//! # Features
//!
//! - **Backend-agnostic**: geometry comes from a host-provided [`Dom`]
//!   implementation; the compositor never lays anything out itself
//! - **markup** (default): [`MarkupDom`], an in-memory DOM parsed from HTML
//! - **service** (default): [`service::RenderService`], concurrent rendering on
//!   a tokio runtime
//! - **cli** (default): the `rfsvg` binary
//!
//! # Example
//!
//! ```
//! use rfsvg::{ComposeConfig, MarkupDom};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut dom = MarkupDom::parse(
//!     r#"<div id="chart"><h2 style="font-size: 16px">Revenue</h2>
//!        <svg width="300" height="200" fill="currentColor"></svg></div>"#,
//! );
//! let root = dom.element_by_id("chart").ok_or("no chart")?;
//!
//! let svg = rfsvg::compose(&mut dom, &[root], &ComposeConfig::default())?;
//! assert!(svg.contains(r#"height="216""#));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

// DOM seam plus the scraper-backed fixture
pub mod dom;
pub use dom::{Dom, NodeKind, Rect, StyleMap};
#[cfg(feature = "markup")]
pub use dom::MarkupDom;

pub mod compose;
pub use compose::{compose, compose_grid_container, compose_panels};

pub mod serialize;
pub mod svg;
pub use svg::{SvgChild, SvgNode};

// Async render service (worker-pool backed)
#[cfg(feature = "service")]
pub mod service;

#[cfg(feature = "service")]
pub use service::{RenderRequest, RenderResponse, RenderService};

/// Single chart or grid of charts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Exactly one panel, no merge
    #[default]
    Single,
    /// Several panels merged row-major into one canvas
    Grid,
}

/// Configuration for one compose call
///
/// The defaults describe a single untitled panel traced with a 10px
/// font-size context:
///
/// ```
/// let cfg = rfsvg::ComposeConfig::default();
/// assert_eq!(cfg.mode, rfsvg::Mode::Single);
/// assert_eq!(cfg.default_font_size, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    pub mode: Mode,
    /// Grid column count (ignored in single mode)
    pub columns: usize,
    /// Per-panel title override, indexed like the panel roots. Replaces the
    /// panel's `H2` text, or adds a title when the panel has none.
    pub titles: Vec<Option<String>>,
    /// Initial font-size context in pixels
    pub default_font_size: f64,
    /// Pad added to each axis of a legend span's background rectangle
    pub span_pad: f64,
    /// Page the DOM was rendered from; references into it are rewritten to
    /// bare fragments. Falls back to [`Dom::document_url`].
    pub document_url: Option<String>,
    /// Indent the serialized output
    pub pretty: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Single,
            columns: 1,
            titles: Vec::new(),
            default_font_size: compose::DEFAULT_FONT_SIZE,
            span_pad: compose::SPAN_PAD,
            document_url: None,
            pretty: false,
        }
    }
}

impl ComposeConfig {
    /// Grid configuration with `columns` columns
    pub fn grid(columns: usize) -> Self {
        Self {
            mode: Mode::Grid,
            columns,
            ..Default::default()
        }
    }

    /// Check the configuration against the number of panel roots about to be
    /// composed.
    pub fn validate(&self, panel_count: usize) -> Result<()> {
        if !(self.default_font_size.is_finite() && self.default_font_size > 0.0) {
            return Err(Error::ConfigError(format!(
                "default_font_size must be positive, got {}",
                self.default_font_size
            )));
        }
        if !(self.span_pad.is_finite() && self.span_pad >= 0.0) {
            return Err(Error::ConfigError(format!(
                "span_pad must be non-negative, got {}",
                self.span_pad
            )));
        }
        if panel_count == 0 {
            return Err(Error::ConfigError("no panels to compose".into()));
        }
        match self.mode {
            Mode::Single if panel_count != 1 => {
                return Err(Error::ConfigError(format!(
                    "single mode takes one panel, got {}",
                    panel_count
                )))
            }
            Mode::Grid if self.columns == 0 => {
                return Err(Error::ConfigError("grid needs at least one column".into()))
            }
            _ => {}
        }
        if let Some(url) = &self.document_url {
            url::Url::parse(url)?;
        }
        Ok(())
    }

    /// Title override for panel `index`, if any
    pub fn title_for(&self, index: usize) -> Option<&str> {
        self.titles.get(index).and_then(|t| t.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ComposeConfig::default();
        assert_eq!(config.columns, 1);
        assert_eq!(config.span_pad, 10.0);
        assert!(config.validate(1).is_ok());
        assert!(!config.pretty);
    }

    #[test]
    fn test_validate() {
        assert!(ComposeConfig::default().validate(0).is_err());
        assert!(ComposeConfig::default().validate(2).is_err());
        assert!(ComposeConfig::grid(2).validate(5).is_ok());
        assert!(ComposeConfig::grid(0).validate(1).is_err());

        let bad_url = ComposeConfig {
            document_url: Some("::".into()),
            ..Default::default()
        };
        assert!(matches!(bad_url.validate(1), Err(Error::ConfigError(_))));

        let bad_font = ComposeConfig {
            default_font_size: 0.0,
            ..Default::default()
        };
        assert!(bad_font.validate(1).is_err());
    }

    #[test]
    fn test_partial_json_config() {
        let config: ComposeConfig =
            serde_json::from_str(r#"{"mode": "grid", "columns": 3, "titles": [null, "B"]}"#).unwrap();
        assert_eq!(config.mode, Mode::Grid);
        assert_eq!(config.columns, 3);
        assert_eq!(config.default_font_size, 10.0);
        assert_eq!(config.title_for(0), None);
        assert_eq!(config.title_for(1), Some("B"));
        assert_eq!(config.title_for(7), None);
    }
}
