//! Parse XML bytes into the arena tree.
//!
//! Thin event loop over `quick_xml::Reader`. Whitespace-only text is
//! dropped (the writer re-indents), entities are resolved, comments are
//! kept as tree nodes so they travel with their element through clones.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::tree::{NodeId, XmlTree};
use crate::error::SyncError;

/// Parse one XML document into `tree`, returning its root element.
pub(crate) fn parse_document(tree: &mut XmlTree, input: &[u8]) -> Result<NodeId, SyncError> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut root: Option<NodeId> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let element = start_element(tree, e)?;
                attach(tree, &stack, &mut root, element)?;
                stack.push(element);
            }
            Ok(Event::Empty(ref e)) => {
                let element = start_element(tree, e)?;
                attach(tree, &stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| SyncError::xml(format!("invalid text content: {e}")))?;
                if let Some(&parent) = stack.last() {
                    let node = tree.new_text(text.into_owned());
                    tree.append_child(parent, node);
                }
            }
            Ok(Event::Comment(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                if let Some(&parent) = stack.last() {
                    let node = tree.new_comment(text);
                    tree.append_child(parent, node);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declaration, doctype, PI, CDATA wrappers
            Err(e) => {
                return Err(SyncError::xml(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
        }
        buf.clear();
    }

    root.ok_or_else(|| SyncError::xml("document has no root element"))
}

fn start_element(tree: &mut XmlTree, e: &BytesStart<'_>) -> Result<NodeId, SyncError> {
    let name = e.name();
    let tag = std::str::from_utf8(name.as_ref())
        .map_err(|e| SyncError::xml(format!("invalid tag name: {e}")))?;
    let element = tree.new_element(tag);

    for attr in e.attributes() {
        let attr = attr.map_err(|e| SyncError::xml(format!("invalid attribute: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| SyncError::xml(format!("invalid attribute name: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| SyncError::xml(format!("invalid attribute value: {e}")))?;
        tree.set_attr(element, key, value.into_owned());
    }
    Ok(element)
}

fn attach(
    tree: &mut XmlTree,
    stack: &[NodeId],
    root: &mut Option<NodeId>,
    element: NodeId,
) -> Result<(), SyncError> {
    match stack.last() {
        Some(&parent) => tree.append_child(parent, element),
        None => {
            if root.is_some() {
                return Err(SyncError::xml("multiple root elements"));
            }
            *root = Some(element);
        }
    }
    Ok(())
}
