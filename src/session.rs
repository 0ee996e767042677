//! Mutable per-run state of a forward merge.
//!
//! A [`SyncSession`] is constructed fresh at the start of every run and
//! discarded at the end; nothing here is process-global. It records what
//! the merge engine decided (queued removals, visited ids, cloned
//! passenger elements, collected failures) so the deletion pass and the
//! commit decision can run after the walk.

use rustc_hash::FxHashSet;

use crate::correlation::CorrelationId;
use crate::xml::NodeId;

/// A correlation-bearing element cloned as a passenger inside a larger
/// cloned subtree (a port inside a re-cloned component). Unvisited
/// passengers are stale duplicates and are excised by the deletion pass.
#[derive(Clone, Copy, Debug)]
pub struct ClonedDescendant {
    pub id: CorrelationId,
    pub element: NodeId,
    pub visited: bool,
}

/// State of one forward-merge run.
#[derive(Clone, Debug, Default)]
pub struct SyncSession {
    current_path: String,
    pending_removal: FxHashSet<NodeId>,
    visited: FxHashSet<CorrelationId>,
    cloned: Vec<ClonedDescendant>,
    failed: bool,
    missing: Vec<CorrelationId>,
}

impl SyncSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── File scope ──────────────────────────────────────────────────

    /// Enter a model file; subsequent location checks compare against it.
    pub fn begin_file(&mut self, relative_path: &str) {
        self.current_path.clear();
        self.current_path.push_str(relative_path);
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    // ── Removal queue ───────────────────────────────────────────────

    /// Queue a superseded element for the deletion pass.
    pub fn queue_removal(&mut self, element: NodeId) {
        self.pending_removal.insert(element);
    }

    pub fn take_pending_removals(&mut self) -> Vec<NodeId> {
        self.pending_removal.drain().collect()
    }

    // ── Visited ids ─────────────────────────────────────────────────

    /// Record that an id was matched to a declaration this run.
    pub fn mark_visited(&mut self, id: CorrelationId) {
        self.visited.insert(id);
    }

    pub fn is_visited(&self, id: CorrelationId) -> bool {
        self.visited.contains(&id)
    }

    // ── Cloned-descendant registry ──────────────────────────────────

    /// Register a passenger clone, not yet visited.
    pub fn register_clone(&mut self, id: CorrelationId, element: NodeId) {
        self.cloned.push(ClonedDescendant {
            id,
            element,
            visited: false,
        });
    }

    /// Claim the unvisited passenger clone for an id, if one exists.
    ///
    /// The claimed entry is marked visited; it is the element "found in
    /// place" when a Modify hits an id whose original was cloned along
    /// with an enclosing element.
    pub fn claim_clone(&mut self, id: CorrelationId) -> Option<NodeId> {
        let entry = self
            .cloned
            .iter_mut()
            .find(|c| c.id == id && !c.visited)?;
        entry.visited = true;
        Some(entry.element)
    }

    /// Unvisited passenger clones of an id (stale nested duplicates).
    pub fn unvisited_clones_of(&self, id: CorrelationId) -> impl Iterator<Item = NodeId> + '_ {
        self.cloned
            .iter()
            .filter(move |c| c.id == id && !c.visited)
            .map(|c| c.element)
    }

    // ── Failure tracking ────────────────────────────────────────────

    /// Report a missing correlation. The flag is monotonic: once set the
    /// run will not persist anything, but processing continues so every
    /// stale id surfaces.
    pub fn report_missing(&mut self, id: CorrelationId) {
        tracing::warn!("missing correlation id {id}, run will not be persisted");
        self.failed = true;
        self.missing.push(id);
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn missing_ids(&self) -> &[CorrelationId] {
        &self.missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_flag_is_monotonic() {
        let mut session = SyncSession::new();
        assert!(!session.failed());
        session.report_missing(CorrelationId(5));
        session.report_missing(CorrelationId(9));
        assert!(session.failed());
        assert_eq!(
            session.missing_ids(),
            &[CorrelationId(5), CorrelationId(9)]
        );
    }

    #[test]
    fn test_claim_clone_consumes_one_entry() {
        let mut session = SyncSession::new();
        let mut tree = crate::xml::XmlTree::new();
        let a = tree.new_element("P-PORT-PROTOTYPE");
        session.register_clone(CorrelationId(1), a);

        assert_eq!(session.claim_clone(CorrelationId(1)), Some(a));
        assert_eq!(session.claim_clone(CorrelationId(1)), None);
        assert_eq!(session.unvisited_clones_of(CorrelationId(1)).count(), 0);
    }

    #[test]
    fn test_unvisited_clones_listed_per_id() {
        let mut session = SyncSession::new();
        let mut tree = crate::xml::XmlTree::new();
        let a = tree.new_element("P-PORT-PROTOTYPE");
        let b = tree.new_element("R-PORT-PROTOTYPE");
        session.register_clone(CorrelationId(1), a);
        session.register_clone(CorrelationId(2), b);

        let stale: Vec<_> = session.unvisited_clones_of(CorrelationId(2)).collect();
        assert_eq!(stale, vec![b]);
    }

    #[test]
    fn test_begin_file_resets_path() {
        let mut session = SyncSession::new();
        session.begin_file("a.arxml");
        assert_eq!(session.current_path(), "a.arxml");
        session.begin_file("b.arxml");
        assert_eq!(session.current_path(), "b.arxml");
    }
}
