//! # arxsync
//!
//! Correlation-and-merge engine keeping a textual component model
//! (packages of interfaces, software components and ports) and
//! AUTOSAR-style XML synchronized in both directions, without losing
//! hand-authored XML content the domain model cannot express.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! merge / reverse  → forward merge pipeline, reverse id assignment
//!   ↓
//! session          → per-run mutable state (removals, visits, clones)
//!   ↓
//! correlation      → correlation ids, persisted entries, run index
//!   ↓
//! model / metadata → typed domain nodes, metadata path mirroring
//!   ↓
//! xml              → arena element tree, quick-xml reader/writer
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! forward:  DomainModel ─┬─> merge_forward ──> arxml documents
//!                        └─< CorrelationIndex (bound to loaded XML)
//!
//! reverse:  arxml documents ──> assign_ids_reverse ──> model text
//!                                                  └─> correlation entries
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use arxsync::{CorrelationIndex, XmlWorkspace, merge_forward};
//!
//! let mut workspace = XmlWorkspace::new();
//! workspace.add_document("systems/main.arxml", &xml_bytes)?;
//!
//! let mut index = CorrelationIndex::from_metadata(metadata_files);
//! index.bind_documents(&workspace);
//!
//! let outcome = merge_forward(&model, &mut workspace, &index);
//! if !outcome.failed {
//!     for doc in &outcome.documents {
//!         // hand doc.bytes to the host's file writer
//!     }
//! }
//! ```

/// XML element trees: arena storage, parsing, serialization
pub mod xml;

/// Typed domain model handed over by the external parser
pub mod model;

/// Correlation ids, persisted entries, per-run index
pub mod correlation;

/// Correlation metadata path mirroring and JSON encoding
pub mod metadata;

/// Error taxonomy
pub mod error;

/// Per-run mutable session state
pub mod session;

/// Forward pass: domain model -> XML merge
pub mod merge;

/// Reverse pass: XML -> model text + correlation entries
pub mod reverse;

pub use correlation::{CorrelationEntry, CorrelationId, CorrelationIndex};
pub use error::SyncError;
pub use merge::{MergeAction, MergeOutcome, MergedDocument, merge_forward};
pub use model::{
    Component, ComponentKind, DomainModel, Interface, InterfaceKind, InterfaceRef, ModelFile,
    Package, PackageElement, Port, PortDirection,
};
pub use reverse::{ReverseFile, ReverseOutcome, assign_ids_reverse};
pub use session::SyncSession;
pub use xml::{NodeId, XmlTree, XmlWorkspace};
