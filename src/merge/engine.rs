//! The element merge engine: classify one declared node against the
//! correlation index and materialize its XML element.
//!
//! One generic routine serves all three element kinds; the differences
//! (tag mapping, kind-specific owned child) are captured in a small
//! [`NodeSpec`] descriptor built from the domain node. Identity is the
//! correlation id, not the physical XML node: a matched id always yields
//! a fresh element cloned from the authoritative original, and the source
//! is queued for removal, never mutated in place.

use crate::correlation::{CorrelationId, CorrelationIndex, correlation_of};
use crate::model::{Component, Interface, PackageElement, Port};
use crate::session::SyncSession;
use crate::xml::{NodeId, XmlTree, tag};

/// How one declared node was materialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeAction {
    /// Brand-new element built from the declaration; caller inserts it.
    Created(NodeId),
    /// Correlated element re-materialized at a new location; caller
    /// inserts it.
    Copied(NodeId),
    /// In-place replacement: the clone is already spliced before its
    /// source, so the caller must not insert it. The handle is carried
    /// for recursing into the element's own collections.
    Modified(NodeId),
    /// Missing correlation; nothing was produced and the run is failed.
    Skipped,
}

/// Kind descriptor for the generic merge routine.
pub(crate) struct NodeSpec<'a> {
    /// Element tag for the node's current sub-type.
    pub tag: &'static str,
    pub name: &'a str,
    pub correlation: Option<CorrelationId>,
    pub content: KindContent,
}

/// Kind-specific owned content beyond the `SHORT-NAME` child.
pub(crate) enum KindContent {
    /// Interfaces and components own only their name; a component's
    /// `PORTS` collection is rebuilt by the recursive port merge.
    NameOnly,
    /// Ports own their interface reference child.
    InterfaceRef {
        tref_tag: &'static str,
        dest: &'static str,
        reference: String,
    },
}

impl<'a> NodeSpec<'a> {
    pub fn for_interface(interface: &'a Interface) -> Self {
        Self {
            tag: interface.kind.tag(),
            name: &interface.name,
            correlation: interface.correlation,
            content: KindContent::NameOnly,
        }
    }

    pub fn for_component(component: &'a Component) -> Self {
        Self {
            tag: component.kind.tag(),
            name: &component.name,
            correlation: component.correlation,
            content: KindContent::NameOnly,
        }
    }

    pub fn for_port(port: &'a Port) -> Self {
        Self {
            tag: port.direction.tag(),
            name: &port.name,
            correlation: port.correlation,
            content: KindContent::InterfaceRef {
                tref_tag: port.direction.tref_tag(),
                dest: port.interface.kind.tag(),
                reference: port.interface.reference_path(),
            },
        }
    }

    pub fn for_element(element: &'a PackageElement) -> Self {
        match element {
            PackageElement::Interface(i) => Self::for_interface(i),
            PackageElement::Component(c) => Self::for_component(c),
        }
    }
}

/// Merge one declared node located at `container_fqn` in the session's
/// current file.
pub(crate) fn merge_node(
    tree: &mut XmlTree,
    index: &CorrelationIndex,
    session: &mut SyncSession,
    container_fqn: &str,
    spec: &NodeSpec<'_>,
) -> MergeAction {
    let Some(id) = spec.correlation else {
        return MergeAction::Created(build_new(tree, spec));
    };

    let Some((entry_fqn, entry_path)) = index.location(id) else {
        session.report_missing(id);
        return MergeAction::Skipped;
    };
    let in_place = entry_fqn == container_fqn && entry_path == session.current_path();

    if in_place {
        // The element "found in place" is the passenger clone when this
        // node rode along inside an enclosing Modify/Copy, otherwise the
        // index-bound original.
        let Some(source) = session.claim_clone(id).or_else(|| index.element(id)) else {
            // Metadata claims the element lives here, but it is gone.
            session.report_missing(id);
            return MergeAction::Skipped;
        };
        tracing::debug!("modify {} (id {id}) in place at {container_fqn}", spec.name);
        let clone = materialize(tree, session, spec, source);
        tree.insert_before(source, clone);
        session.queue_removal(source);
        session.mark_visited(id);
        MergeAction::Modified(clone)
    } else {
        let Some(canonical) = index.element(id) else {
            session.report_missing(id);
            return MergeAction::Skipped;
        };
        tracing::debug!(
            "copy {} (id {id}) from {entry_fqn} to {container_fqn}",
            spec.name
        );
        let clone = materialize(tree, session, spec, canonical);
        // The stale original at the old location is superseded too.
        if tree.has_parent(canonical) {
            session.queue_removal(canonical);
        }
        session.mark_visited(id);
        MergeAction::Copied(clone)
    }
}

/// Build a brand-new element strictly from the declaration's fields.
fn build_new(tree: &mut XmlTree, spec: &NodeSpec<'_>) -> NodeId {
    let element = tree.new_element(spec.tag);
    rebuild_owned_children(tree, element, spec);
    element
}

/// Clone `source` verbatim, retag it to the declaration's current
/// sub-type, rebuild the owned leading children, and register any
/// correlation-bearing passenger elements of the clone.
fn materialize(
    tree: &mut XmlTree,
    session: &mut SyncSession,
    spec: &NodeSpec<'_>,
    source: NodeId,
) -> NodeId {
    let clone = tree.clone_subtree(source);
    tree.set_tag(clone, spec.tag);
    rebuild_owned_children(tree, clone, spec);

    for descendant in tree.descendant_elements(clone) {
        let Some(descendant_tag) = tree.tag(descendant) else {
            continue;
        };
        if !tag::is_supported_kind(descendant_tag) {
            continue;
        }
        if let Some(descendant_id) = correlation_of(tree, descendant) {
            session.register_clone(descendant_id, descendant);
        }
    }
    clone
}

/// Strip the DSL-owned leading children and rebuild them from the
/// declaration. Everything else under the element is foreign content and
/// stays untouched.
fn rebuild_owned_children(tree: &mut XmlTree, element: NodeId, spec: &NodeSpec<'_>) {
    strip_owned_children(tree, element, spec);

    let name = tree.new_text_element(tag::SHORT_NAME, spec.name);
    tree.insert_child_at(element, 0, name);

    if let KindContent::InterfaceRef {
        tref_tag,
        dest,
        reference,
    } = &spec.content
    {
        let tref = tree.new_text_element(*tref_tag, reference.clone());
        tree.set_attr(tref, tag::DEST, *dest);
        tree.insert_child_at(element, 1, tref);
    }
}

fn strip_owned_children(tree: &mut XmlTree, element: NodeId, spec: &NodeSpec<'_>) {
    let strips_trefs = matches!(spec.content, KindContent::InterfaceRef { .. });
    let owned: Vec<NodeId> = tree
        .child_elements(element)
        .filter(|&c| match tree.tag(c) {
            Some(tag::SHORT_NAME) => true,
            Some(tag::PROVIDED_INTERFACE_TREF | tag::REQUIRED_INTERFACE_TREF) => strips_trefs,
            _ => false,
        })
        .collect();
    for child in owned {
        tree.detach(child);
    }
}
