//! Deletion pass: excise superseded sources and anything never visited.
//!
//! Runs once per forward merge, after the whole walk and only when the
//! failure flag is clear. Removal is detachment by handle, so iteration
//! never invalidates anything: first every queued source goes, then every
//! id the index knows is checked for stale passenger clones and for an
//! original whose domain declaration disappeared.

use crate::correlation::CorrelationIndex;
use crate::session::SyncSession;
use crate::xml::XmlTree;

pub(crate) fn run(tree: &mut XmlTree, index: &CorrelationIndex, session: &mut SyncSession) {
    for element in session.take_pending_removals() {
        tree.detach(element);
    }

    for id in index.ids() {
        let stale: Vec<_> = session.unvisited_clones_of(id).collect();
        for element in stale {
            tree.detach(element);
        }
        if session.is_visited(id) {
            continue;
        }
        if let Some(original) = index.element(id) {
            if tree.has_parent(original) {
                tracing::debug!("deleting element for id {id}: declaration disappeared");
                tree.detach(original);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::{CorrelationEntry, CorrelationId};
    use crate::xml::{XmlWorkspace, tag};

    fn entry(id: u64) -> CorrelationEntry {
        CorrelationEntry {
            id: CorrelationId(id),
            container_fqn: "a".to_string(),
            relative_path: "m.arxml".to_string(),
            tag_name: tag::SENDER_RECEIVER_INTERFACE.to_string(),
            sibling_index: 0,
        }
    }

    #[test]
    fn test_unvisited_original_is_deleted() {
        let mut ws = XmlWorkspace::new();
        ws.add_document(
            "m.arxml",
            br#"<AUTOSAR><AR-PACKAGES><AR-PACKAGE><SHORT-NAME>a</SHORT-NAME><ELEMENTS>
                <SENDER-RECEIVER-INTERFACE MODEL-UID="1"><SHORT-NAME>Gone</SHORT-NAME></SENDER-RECEIVER-INTERFACE>
                </ELEMENTS></AR-PACKAGE></AR-PACKAGES></AUTOSAR>"#,
        )
        .unwrap();
        let mut index = CorrelationIndex::new();
        index.insert_entries(&[entry(1)]);
        index.bind_documents(&ws);
        let original = index.element(CorrelationId(1)).unwrap();

        let mut session = SyncSession::new();
        run(ws.tree_mut(), &index, &mut session);
        assert!(!ws.tree().has_parent(original));
    }

    #[test]
    fn test_visited_original_survives() {
        let mut ws = XmlWorkspace::new();
        ws.add_document(
            "m.arxml",
            br#"<AUTOSAR><AR-PACKAGES><AR-PACKAGE><SHORT-NAME>a</SHORT-NAME><ELEMENTS>
                <SENDER-RECEIVER-INTERFACE MODEL-UID="1"><SHORT-NAME>Kept</SHORT-NAME></SENDER-RECEIVER-INTERFACE>
                </ELEMENTS></AR-PACKAGE></AR-PACKAGES></AUTOSAR>"#,
        )
        .unwrap();
        let mut index = CorrelationIndex::new();
        index.insert_entries(&[entry(1)]);
        index.bind_documents(&ws);
        let original = index.element(CorrelationId(1)).unwrap();

        let mut session = SyncSession::new();
        session.mark_visited(CorrelationId(1));
        run(ws.tree_mut(), &index, &mut session);
        assert!(ws.tree().has_parent(original));
    }

    #[test]
    fn test_pending_removals_and_stale_clones_detached() {
        let mut ws = XmlWorkspace::new();
        let root = ws.create_document("m.arxml");
        let tree = ws.tree_mut();
        let holder = tree.new_element(tag::ELEMENTS);
        tree.append_child(root, holder);
        let queued = tree.new_element(tag::SENDER_RECEIVER_INTERFACE);
        tree.append_child(holder, queued);
        let stale_clone = tree.new_element(tag::P_PORT_PROTOTYPE);
        tree.append_child(holder, stale_clone);

        let mut index = CorrelationIndex::new();
        index.insert_entries(&[entry(7)]);

        let mut session = SyncSession::new();
        session.queue_removal(queued);
        session.register_clone(CorrelationId(7), stale_clone);

        run(ws.tree_mut(), &index, &mut session);
        assert!(!ws.tree().has_parent(queued));
        assert!(!ws.tree().has_parent(stale_clone));
    }
}
