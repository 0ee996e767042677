//! Correlation ids and the per-run correlation index.
//!
//! A correlation id is the stable token linking one domain-model node to
//! one logical XML element across runs, independent of the physical XML
//! node object (which is replaced on every Modify/Copy). Ids are persisted
//! as one entry array per originating XML file and loaded into a single
//! [`CorrelationIndex`] at run start.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::metadata;
use crate::xml::{NodeId, XmlTree, XmlWorkspace, tag};

/// Opaque stable identity of a synchronized element.
///
/// Sequential per project; rendered as a decimal string in the
/// `MODEL-UID` attribute and in entry files.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CorrelationId(pub u64);

impl CorrelationId {
    /// First id handed out in a fresh project.
    pub const FIRST: CorrelationId = CorrelationId(1);

    pub fn next(self) -> CorrelationId {
        CorrelationId(self.0 + 1)
    }

    /// Parse the `MODEL-UID` attribute text. Non-decimal values are not
    /// ours and stay foreign.
    pub fn from_attr(value: &str) -> Option<CorrelationId> {
        value.parse::<u64>().ok().map(CorrelationId)
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation id carried by an XML element, if any.
pub fn correlation_of(tree: &XmlTree, node: NodeId) -> Option<CorrelationId> {
    tree.attr(node, tag::CORRELATION_ATTR)
        .and_then(CorrelationId::from_attr)
}

/// One persisted correlation record.
///
/// Entry arrays are rewritten wholesale by every reverse pass; `tagName`
/// and `siblingIndex` record where the element sat when last derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub id: CorrelationId,
    #[serde(rename = "containerFQN")]
    pub container_fqn: String,
    #[serde(rename = "relativeFilePath")]
    pub relative_path: String,
    #[serde(rename = "tagName")]
    pub tag_name: String,
    #[serde(rename = "siblingIndex")]
    pub sibling_index: u32,
}

#[derive(Clone, Debug)]
struct IndexSlot {
    container_fqn: String,
    relative_path: String,
    /// Bound XML element in the current run's documents; `None` until
    /// [`CorrelationIndex::bind_documents`] runs, or when the owning file
    /// was not loaded this run.
    element: Option<NodeId>,
}

/// Session-scoped lookup over all persisted correlation entries.
#[derive(Clone, Debug, Default)]
pub struct CorrelationIndex {
    slots: FxHashMap<CorrelationId, IndexSlot>,
    next_id: u64,
}

impl CorrelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load entry arrays from serialized metadata files.
    ///
    /// An unreadable file degrades to "no prior correlations" for that XML
    /// file with a warning; only genuinely missing ids referenced by the
    /// model later fail the run.
    pub fn from_metadata<'a>(files: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Self {
        let mut index = Self::new();
        for (path, bytes) in files {
            match metadata::entries_from_json(bytes) {
                Ok(entries) => index.insert_entries(&entries),
                Err(err) => {
                    tracing::warn!("ignoring unreadable correlation metadata for {path}: {err}");
                }
            }
        }
        index
    }

    /// Insert entries from one originating XML file.
    pub fn insert_entries(&mut self, entries: &[CorrelationEntry]) {
        for entry in entries {
            self.observe(entry.id);
            let previous = self.slots.insert(
                entry.id,
                IndexSlot {
                    container_fqn: entry.container_fqn.clone(),
                    relative_path: entry.relative_path.clone(),
                    element: None,
                },
            );
            if previous.is_some() {
                tracing::warn!(
                    "duplicate correlation id {} in metadata, keeping the last entry",
                    entry.id
                );
            }
        }
    }

    /// Bind indexed ids to the XML elements of the loaded documents.
    pub fn bind_documents(&mut self, workspace: &XmlWorkspace) {
        let tree = workspace.tree();
        for (_, root) in workspace.iter() {
            for element in tree.descendant_elements(root) {
                let Some(id) = correlation_of(tree, element) else {
                    continue;
                };
                self.observe(id);
                if let Some(slot) = self.slots.get_mut(&id) {
                    slot.element = Some(element);
                }
            }
        }
    }

    fn observe(&mut self, id: CorrelationId) {
        if id.0 >= self.next_id {
            self.next_id = id.0 + 1;
        }
    }

    pub fn contains(&self, id: CorrelationId) -> bool {
        self.slots.contains_key(&id)
    }

    /// `(containerFQN, relativeFilePath)` recorded for an id.
    pub fn location(&self, id: CorrelationId) -> Option<(&str, &str)> {
        self.slots
            .get(&id)
            .map(|s| (s.container_fqn.as_str(), s.relative_path.as_str()))
    }

    /// The canonical XML element currently bound to an id.
    pub fn element(&self, id: CorrelationId) -> Option<NodeId> {
        self.slots.get(&id).and_then(|s| s.element)
    }

    /// All ids known to the index.
    pub fn ids(&self) -> impl Iterator<Item = CorrelationId> + '_ {
        self.slots.keys().copied()
    }

    /// Next unused id (reverse direction).
    pub fn next_free_id(&self) -> CorrelationId {
        CorrelationId(self.next_id.max(CorrelationId::FIRST.0))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, fqn: &str, path: &str) -> CorrelationEntry {
        CorrelationEntry {
            id: CorrelationId(id),
            container_fqn: fqn.to_string(),
            relative_path: path.to_string(),
            tag_name: "SENDER-RECEIVER-INTERFACE".to_string(),
            sibling_index: 0,
        }
    }

    #[test]
    fn test_entry_wire_format() {
        let json = serde_json::to_string(&entry(7, "a.b", "m.arxml")).unwrap();
        assert!(json.contains("\"id\":7"));
        assert!(json.contains("\"containerFQN\":\"a.b\""));
        assert!(json.contains("\"relativeFilePath\":\"m.arxml\""));
        assert!(json.contains("\"tagName\""));
        assert!(json.contains("\"siblingIndex\":0"));

        let parsed: CorrelationEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry(7, "a.b", "m.arxml"));
    }

    #[test]
    fn test_index_lookup_and_next_free_id() {
        let mut index = CorrelationIndex::new();
        index.insert_entries(&[entry(3, "a.b", "m.arxml"), entry(9, "c", "n.arxml")]);

        assert!(index.contains(CorrelationId(3)));
        assert!(!index.contains(CorrelationId(4)));
        assert_eq!(index.location(CorrelationId(3)), Some(("a.b", "m.arxml")));
        assert_eq!(index.next_free_id(), CorrelationId(10));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_empty_index_starts_at_first() {
        assert_eq!(CorrelationIndex::new().next_free_id(), CorrelationId::FIRST);
    }

    #[test]
    fn test_bind_documents_resolves_elements() {
        let mut ws = XmlWorkspace::new();
        ws.add_document(
            "m.arxml",
            br#"<AUTOSAR><AR-PACKAGES><AR-PACKAGE><SHORT-NAME>a</SHORT-NAME><ELEMENTS>
                <SENDER-RECEIVER-INTERFACE MODEL-UID="3"><SHORT-NAME>If</SHORT-NAME></SENDER-RECEIVER-INTERFACE>
                </ELEMENTS></AR-PACKAGE></AR-PACKAGES></AUTOSAR>"#,
        )
        .unwrap();

        let mut index = CorrelationIndex::new();
        index.insert_entries(&[entry(3, "a", "m.arxml")]);
        index.bind_documents(&ws);

        let element = index.element(CorrelationId(3)).unwrap();
        assert_eq!(
            ws.tree().tag(element),
            Some("SENDER-RECEIVER-INTERFACE")
        );
        // Unindexed ids found in documents still advance the counter.
        assert_eq!(index.next_free_id(), CorrelationId(4));
    }

    #[test]
    fn test_from_metadata_skips_unreadable_files() {
        let good = serde_json::to_vec(&vec![entry(1, "a", "m.arxml")]).unwrap();
        let index = CorrelationIndex::from_metadata([
            ("m.arxml", good.as_slice()),
            ("bad.arxml", b"not json".as_slice()),
        ]);
        assert_eq!(index.len(), 1);
        assert!(index.contains(CorrelationId(1)));
    }

    #[test]
    fn test_from_attr_rejects_foreign_uuids() {
        assert_eq!(CorrelationId::from_attr("42"), Some(CorrelationId(42)));
        assert_eq!(CorrelationId::from_attr("DEADBEEF-0000"), None);
        assert_eq!(CorrelationId::from_attr(""), None);
    }
}
