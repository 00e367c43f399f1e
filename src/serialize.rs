//! Final XML output.
//!
//! Headless DOMs resolve same-document references such as
//! `clip-path="url(#c)"` against the page, yielding
//! `url(http://host/page.html#c)`. Those prefixes are stripped back to bare
//! fragments before writing so the file stands on its own.

use std::fmt::Write as _;

use url::Url;

use crate::svg::{escape_attr, escape_text, SvgChild, SvgNode};
use crate::Result;

/// Serialize a finished tree, de-absolutizing references to `document_url`
/// first when one is given.
pub fn serialize(mut root: SvgNode, document_url: Option<&str>, pretty: bool) -> Result<String> {
    if let Some(url) = document_url {
        rewrite_fragment_urls(&mut root, url)?;
    }
    Ok(to_xml(&root, pretty))
}

/// Replace `<document_url>#` with `#` in every attribute of every element.
/// Both the URL as given and its normalized form are recognised. Running
/// this twice has the same effect as running it once.
pub fn rewrite_fragment_urls(root: &mut SvgNode, document_url: &str) -> Result<()> {
    let prefixes = fragment_prefixes(document_url)?;
    if prefixes.is_empty() {
        return Ok(());
    }
    rewrite(root, &prefixes);
    Ok(())
}

fn fragment_prefixes(document_url: &str) -> Result<Vec<String>> {
    let raw = document_url.split('#').next().unwrap_or_default().trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let mut normalized = Url::parse(raw)?;
    normalized.set_fragment(None);

    let mut prefixes = vec![format!("{}#", raw)];
    let normalized = format!("{}#", normalized.as_str());
    if !prefixes.contains(&normalized) {
        prefixes.push(normalized);
    }
    // longest first so a normalized form never leaves a partial prefix behind
    prefixes.sort_by_key(|p| std::cmp::Reverse(p.len()));
    Ok(prefixes)
}

fn rewrite(node: &mut SvgNode, prefixes: &[String]) {
    for value in node.attrs.values_mut() {
        for prefix in prefixes {
            if value.contains(prefix.as_str()) {
                *value = value.replace(prefix.as_str(), "#");
            }
        }
    }
    for child in &mut node.children {
        if let SvgChild::Element(element) = child {
            rewrite(element, prefixes);
        }
    }
}

/// Write `root` as XML. Childless elements self-close. With `pretty`, element
/// children are indented two spaces per level; elements holding text are kept
/// on one line so the text is not altered.
pub fn to_xml(root: &SvgNode, pretty: bool) -> String {
    let mut out = String::new();
    write_node(&mut out, root, pretty, 0);
    if pretty {
        out.push('\n');
    }
    out
}

fn write_node(out: &mut String, node: &SvgNode, pretty: bool, depth: usize) {
    out.push('<');
    out.push_str(&node.tag);
    for (name, value) in &node.attrs {
        let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
    }
    if node.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let inline = !pretty || node.children.iter().any(|c| matches!(c, SvgChild::Text(_)));
    for child in &node.children {
        match child {
            SvgChild::Text(text) => out.push_str(&escape_text(text)),
            SvgChild::Element(element) => {
                if !inline {
                    newline(out, depth + 1);
                }
                write_node(out, element, pretty && !inline, depth + 1);
            }
        }
    }
    if !inline {
        newline(out, depth);
    }
    let _ = write!(out, "</{}>", node.tag);
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str("  ");
    }
}
