//! In-memory XML documents for one synchronization run.
//!
//! [`XmlWorkspace`] owns a single node arena ([`XmlTree`]) holding every
//! document touched by the run, keyed by project-relative path. Keeping all
//! documents in one arena lets the merge engine clone a canonical element
//! out of one file and splice it into another without juggling ownership.

use indexmap::IndexMap;

use crate::error::SyncError;

pub mod reader;
pub mod tree;
pub mod writer;

pub use tree::{NodeId, NodeKind, XmlTree};

/// arxml tag and attribute names.
pub mod tag {
    pub const AUTOSAR: &str = "AUTOSAR";
    pub const AR_PACKAGES: &str = "AR-PACKAGES";
    pub const AR_PACKAGE: &str = "AR-PACKAGE";
    pub const SHORT_NAME: &str = "SHORT-NAME";
    pub const ELEMENTS: &str = "ELEMENTS";
    pub const SENDER_RECEIVER_INTERFACE: &str = "SENDER-RECEIVER-INTERFACE";
    pub const CLIENT_SERVER_INTERFACE: &str = "CLIENT-SERVER-INTERFACE";
    pub const APPLICATION_SW_COMPONENT_TYPE: &str = "APPLICATION-SW-COMPONENT-TYPE";
    pub const PORTS: &str = "PORTS";
    pub const P_PORT_PROTOTYPE: &str = "P-PORT-PROTOTYPE";
    pub const R_PORT_PROTOTYPE: &str = "R-PORT-PROTOTYPE";
    pub const PROVIDED_INTERFACE_TREF: &str = "PROVIDED-INTERFACE-TREF";
    pub const REQUIRED_INTERFACE_TREF: &str = "REQUIRED-INTERFACE-TREF";
    pub const DEST: &str = "DEST";

    /// Attribute carrying the correlation id. Engine-produced elements are
    /// exactly those bearing this attribute; everything else is foreign.
    pub const CORRELATION_ATTR: &str = "MODEL-UID";

    /// Whether a tag is one of the three synchronized element kinds.
    pub fn is_supported_kind(tag: &str) -> bool {
        matches!(
            tag,
            SENDER_RECEIVER_INTERFACE
                | CLIENT_SERVER_INTERFACE
                | APPLICATION_SW_COMPONENT_TYPE
                | P_PORT_PROTOTYPE
                | R_PORT_PROTOTYPE
        )
    }
}

/// AUTOSAR schema namespace URIs for freshly created documents.
pub mod namespace {
    pub const AUTOSAR: &str = "http://autosar.org/schema/r4.0";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    pub const SCHEMA_LOCATION: &str = "http://autosar.org/schema/r4.0 AUTOSAR_4-2-2.xsd";
}

/// The set of XML documents of one run, all sharing one node arena.
#[derive(Clone, Debug, Default)]
pub struct XmlWorkspace {
    tree: XmlTree,
    /// Relative path -> document root element, in load order.
    documents: IndexMap<String, NodeId>,
}

impl XmlWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut XmlTree {
        &mut self.tree
    }

    /// Parse an existing document into the workspace.
    pub fn add_document(
        &mut self,
        relative_path: impl Into<String>,
        bytes: &[u8],
    ) -> Result<NodeId, SyncError> {
        let root = reader::parse_document(&mut self.tree, bytes)?;
        self.documents.insert(relative_path.into(), root);
        Ok(root)
    }

    /// Create an empty document with the `AUTOSAR`/`AR-PACKAGES` skeleton.
    pub fn create_document(&mut self, relative_path: impl Into<String>) -> NodeId {
        let root = self.tree.new_element(tag::AUTOSAR);
        self.tree.set_attr(root, "xmlns", namespace::AUTOSAR);
        self.tree.set_attr(root, "xmlns:xsi", namespace::XSI);
        self.tree
            .set_attr(root, "xsi:schemaLocation", namespace::SCHEMA_LOCATION);
        let packages = self.tree.new_element(tag::AR_PACKAGES);
        self.tree.append_child(root, packages);
        self.documents.insert(relative_path.into(), root);
        root
    }

    /// Existing document root for a path, or a fresh skeleton.
    pub fn ensure_document(&mut self, relative_path: &str) -> NodeId {
        match self.documents.get(relative_path) {
            Some(&root) => root,
            None => self.create_document(relative_path),
        }
    }

    pub fn document(&self, relative_path: &str) -> Option<NodeId> {
        self.documents.get(relative_path).copied()
    }

    /// Relative paths of all documents, in load order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Paths and roots of all documents, in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.documents.iter().map(|(p, &root)| (p.as_str(), root))
    }

    /// Serialize one document to UTF-8 bytes.
    pub fn serialize(&self, relative_path: &str) -> Option<Vec<u8>> {
        let &root = self.documents.get(relative_path)?;
        Some(writer::serialize_document(&self.tree, root))
    }
}
