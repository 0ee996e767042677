//! Container-tree builder: locate or create the collection a declared
//! package (or a component's ports) writes into.
//!
//! Descends the `AR-PACKAGES`/`AR-PACKAGE` hierarchy one dotted-name
//! segment at a time, reusing existing packages by `SHORT-NAME` and
//! creating missing ones. Created packages get their `SHORT-NAME` first;
//! an `ELEMENTS` collection is kept ahead of any nested `AR-PACKAGES` so
//! late-created collections do not scramble the document shape.

use crate::xml::{NodeId, XmlTree, tag};

/// Locate or create the `ELEMENTS` collection for a dotted package name
/// under a document root.
pub(crate) fn elements_collection(tree: &mut XmlTree, doc_root: NodeId, dotted: &str) -> NodeId {
    let mut packages = find_or_append(tree, doc_root, tag::AR_PACKAGES);
    let mut leaf = doc_root;

    let mut segments = dotted.split('.').peekable();
    while let Some(segment) = segments.next() {
        let package = match find_package(tree, packages, segment) {
            Some(p) => p,
            None => create_package(tree, packages, segment),
        };
        if segments.peek().is_some() {
            packages = find_or_append(tree, package, tag::AR_PACKAGES);
        } else {
            leaf = package;
        }
    }
    ensure_elements(tree, leaf)
}

/// Locate or create a component element's `PORTS` collection.
pub(crate) fn ports_collection(tree: &mut XmlTree, component: NodeId) -> NodeId {
    find_or_append(tree, component, tag::PORTS)
}

fn find_package(tree: &XmlTree, packages: NodeId, segment: &str) -> Option<NodeId> {
    tree.child_elements(packages)
        .filter(|&p| tree.tag(p) == Some(tag::AR_PACKAGE))
        .find(|&p| tree.short_name(p).as_deref() == Some(segment))
}

fn create_package(tree: &mut XmlTree, packages: NodeId, segment: &str) -> NodeId {
    let package = tree.new_element(tag::AR_PACKAGE);
    let name = tree.new_text_element(tag::SHORT_NAME, segment);
    tree.append_child(package, name);
    tree.append_child(packages, package);
    package
}

fn find_or_append(tree: &mut XmlTree, parent: NodeId, child_tag: &'static str) -> NodeId {
    if let Some(existing) = tree.find_child_element(parent, child_tag) {
        return existing;
    }
    let child = tree.new_element(child_tag);
    tree.append_child(parent, child);
    child
}

fn ensure_elements(tree: &mut XmlTree, package: NodeId) -> NodeId {
    if let Some(existing) = tree.find_child_element(package, tag::ELEMENTS) {
        return existing;
    }
    let elements = tree.new_element(tag::ELEMENTS);
    match tree.find_child_element(package, tag::AR_PACKAGES) {
        Some(nested) => tree.insert_before(nested, elements),
        None => tree.append_child(package, elements),
    }
    elements
}
