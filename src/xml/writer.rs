//! Serialize the arena tree back to XML bytes.
//!
//! Output is UTF-8, tab-indented, platform line endings. Elements whose
//! children are text only are written on one line; empty elements are
//! self-closed. Indentation is regenerated from scratch, so documents are
//! byte-stable across runs regardless of how the input was formatted.

use quick_xml::escape::{escape, partial_escape};

use super::tree::{NodeId, NodeKind, XmlTree};

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Serialize the document rooted at `root` to bytes.
pub(crate) fn serialize_document(tree: &XmlTree, root: NodeId) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push_str(LINE_ENDING);
    write_node(tree, root, 0, &mut out);
    out.into_bytes()
}

fn write_node(tree: &XmlTree, node: NodeId, depth: usize, out: &mut String) {
    match tree.kind(node) {
        NodeKind::Element { .. } => write_element(tree, node, depth, out),
        NodeKind::Text(text) => {
            indent(depth, out);
            out.push_str(&partial_escape(text.as_str()));
            out.push_str(LINE_ENDING);
        }
        NodeKind::Comment(text) => {
            indent(depth, out);
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
            out.push_str(LINE_ENDING);
        }
    }
}

fn write_element(tree: &XmlTree, node: NodeId, depth: usize, out: &mut String) {
    let tag = tree.tag(node).unwrap_or_default();

    indent(depth, out);
    out.push('<');
    out.push_str(tag);
    if let Some(attrs) = tree.attrs(node) {
        for (name, value) in attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
    }

    let children = tree.children(node);
    if children.is_empty() {
        out.push_str("/>");
        out.push_str(LINE_ENDING);
        return;
    }

    let text_only = children
        .iter()
        .all(|&c| matches!(tree.kind(c), NodeKind::Text(_)));
    if text_only {
        out.push('>');
        for &child in children {
            if let NodeKind::Text(text) = tree.kind(child) {
                out.push_str(&partial_escape(text.as_str()));
            }
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
        out.push_str(LINE_ENDING);
        return;
    }

    out.push('>');
    out.push_str(LINE_ENDING);
    for &child in children {
        write_node(tree, child, depth + 1, out);
    }
    indent(depth, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    out.push_str(LINE_ENDING);
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push('\t');
    }
}
