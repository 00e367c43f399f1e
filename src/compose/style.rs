//! Best-effort computed style lookups.

use log::debug;

use super::units::{is_length_keyword, resolve_length};
use crate::dom::{Dom, StyleMap};
use crate::Result;

/// Computed style of one node, captured once per visit
#[derive(Debug, Clone, Default)]
pub struct StyleSnapshot {
    map: StyleMap,
}

impl StyleSnapshot {
    /// Read the computed style of `node`. A node the DOM cannot style yields
    /// an empty snapshot instead of an error.
    pub fn of<D: Dom>(dom: &D, node: D::Node) -> Self {
        match dom.computed_style_of(node) {
            Ok(map) => Self { map },
            Err(e) => {
                debug!("no computed style for {:?}: {}", node, e);
                Self::default()
            }
        }
    }

    pub fn from_map(map: StyleMap) -> Self {
        Self { map }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.map.get(property).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// A length property in pixels; absent properties are 0.
    pub fn length(&self, property: &str, font_size: f64) -> Result<f64> {
        resolve_length(self.get(property), font_size)
    }

    /// Sum of the left and right margins
    pub fn horizontal_margin(&self, font_size: f64) -> Result<f64> {
        Ok(self.length("margin-left", font_size)? + self.length("margin-right", font_size)?)
    }

    /// Sum of the top and bottom margins
    pub fn vertical_margin(&self, font_size: f64) -> Result<f64> {
        Ok(self.length("margin-top", font_size)? + self.length("margin-bottom", font_size)?)
    }

    /// `font-size` in pixels, or `None` when it is missing or not a length
    /// this resolver understands.
    pub fn font_size(&self, context: f64) -> Option<f64> {
        let value = self.get("font-size")?;
        match resolve_length(Some(value), context) {
            Ok(px) if px > 0.0 => Some(px),
            Ok(_) => None,
            Err(e) => {
                debug!("ignoring font-size {:?}: {}", value, e);
                None
            }
        }
    }

    /// Largest value among properties whose name contains `height`
    /// (`height`, `min-height`, `line-height`, ...), floored at 0.
    /// Keyword values such as `auto` or `normal` are skipped.
    pub fn height_offset(&self, font_size: f64) -> Result<f64> {
        let mut offset = 0.0f64;
        for (property, value) in &self.map {
            if !property.contains("height") || is_length_keyword(value) {
                continue;
            }
            offset = offset.max(resolve_length(Some(value), font_size)?);
        }
        Ok(offset)
    }
}
