//! Forward pass: merge a domain model into the XML documents.
//!
//! Orchestrates the container-tree builder, the element merge engine, the
//! insertion cursors and the deletion pass over one [`SyncSession`].
//! All-or-nothing: on any missing correlation the walk still finishes (so
//! every stale id is reported at once) but the deletion pass is skipped
//! and no documents are serialized.

use crate::correlation::CorrelationIndex;
use crate::error::SyncError;
use crate::model::{Component, DomainModel, PackageElement};
use crate::session::SyncSession;
use crate::xml::{NodeId, XmlWorkspace};

pub mod cursor;
pub mod deletion;
pub mod engine;
pub mod packages;

pub use cursor::InsertionCursor;
pub use engine::MergeAction;

use engine::NodeSpec;

/// One serialized output document of a successful forward merge.
#[derive(Clone, Debug)]
pub struct MergedDocument {
    pub relative_path: String,
    pub bytes: Vec<u8>,
}

/// Result of a forward merge run.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// One document per model file, empty when the run failed.
    pub documents: Vec<MergedDocument>,
    pub failed: bool,
    /// Every collected failure, one per missing correlation id.
    pub errors: Vec<SyncError>,
}

/// Merge the domain model into the workspace's documents.
///
/// Existing documents to merge into must already be loaded into the
/// workspace and the index must be bound to it
/// ([`CorrelationIndex::bind_documents`]); files without a loaded
/// document are built from a fresh skeleton.
pub fn merge_forward(
    model: &DomainModel,
    workspace: &mut XmlWorkspace,
    index: &CorrelationIndex,
) -> MergeOutcome {
    let mut session = SyncSession::new();

    for file in &model.files {
        session.begin_file(&file.relative_path);
        let root = workspace.ensure_document(&file.relative_path);

        for package in &file.packages {
            let collection =
                packages::elements_collection(workspace.tree_mut(), root, &package.name);
            let mut cursor = InsertionCursor::new(workspace.tree(), collection);

            for element in &package.elements {
                let spec = NodeSpec::for_element(element);
                let action = engine::merge_node(
                    workspace.tree_mut(),
                    index,
                    &mut session,
                    &package.name,
                    &spec,
                );
                let placed = place(workspace, &mut cursor, collection, action);
                if let (Some(component_el), PackageElement::Component(component)) =
                    (placed, element)
                {
                    merge_ports(
                        workspace,
                        index,
                        &mut session,
                        &package.name,
                        component,
                        component_el,
                    );
                }
            }
        }
    }

    let failed = session.failed();
    if failed {
        tracing::warn!(
            "forward merge failed with {} missing correlation(s), no output written",
            session.missing_ids().len()
        );
    } else {
        deletion::run(workspace.tree_mut(), index, &mut session);
    }

    let errors = session
        .missing_ids()
        .iter()
        .map(|&id| SyncError::MissingCorrelation(id))
        .collect();

    let documents = if failed {
        Vec::new()
    } else {
        model
            .files
            .iter()
            .filter_map(|file| {
                let bytes = workspace.serialize(&file.relative_path)?;
                Some(MergedDocument {
                    relative_path: file.relative_path.clone(),
                    bytes,
                })
            })
            .collect()
    };

    MergeOutcome {
        documents,
        failed,
        errors,
    }
}

/// Apply the caller-side insertion contract of a merge action.
fn place(
    workspace: &mut XmlWorkspace,
    cursor: &mut InsertionCursor,
    collection: NodeId,
    action: MergeAction,
) -> Option<NodeId> {
    match action {
        MergeAction::Created(el) | MergeAction::Copied(el) => {
            cursor.insert(workspace.tree_mut(), collection, el);
            Some(el)
        }
        MergeAction::Modified(el) => {
            cursor.skip_modified(workspace.tree(), collection);
            Some(el)
        }
        MergeAction::Skipped => None,
    }
}

/// Merge a component's declared ports into its `PORTS` collection, one
/// container level down.
fn merge_ports(
    workspace: &mut XmlWorkspace,
    index: &CorrelationIndex,
    session: &mut SyncSession,
    package_fqn: &str,
    component: &Component,
    component_el: NodeId,
) {
    let collection = packages::ports_collection(workspace.tree_mut(), component_el);
    let container_fqn = format!("{package_fqn}.{}", component.name);
    let mut cursor = InsertionCursor::new(workspace.tree(), collection);

    for port in &component.ports {
        let spec = NodeSpec::for_port(port);
        let action =
            engine::merge_node(workspace.tree_mut(), index, session, &container_fqn, &spec);
        place(workspace, &mut cursor, collection, action);
    }
}
