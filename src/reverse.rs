//! Reverse pass: XML documents -> domain-model text + fresh correlation
//! entries.
//!
//! Walks each package tree top-down, accumulating the dotted container
//! path. Supported elements met without a correlation id get the next
//! sequential id (one counter shared across kinds and files, seeded from
//! the index); every supported element, old or new, yields a correlation
//! entry, so the entry files are rewritten wholesale each run. Elements
//! of unsupported tags stay untouched and unassigned, inert foreign
//! content the forward direction keeps preserving wherever it sits.
//!
//! Absolute slash references (`/a/b/If`) are rewritten to dotted form
//! (`a.b.If`) for the text; the forward direction builds the inverse.

use crate::correlation::{CorrelationEntry, CorrelationId, CorrelationIndex, correlation_of};
use crate::xml::{NodeId, XmlTree, XmlWorkspace, tag};

/// Result of a reverse run over one document.
#[derive(Clone, Debug)]
pub struct ReverseFile {
    pub relative_path: String,
    /// Generated domain-model text.
    pub text: String,
    /// Rewritten correlation entries for this document.
    pub entries: Vec<CorrelationEntry>,
}

/// Result of a reverse run.
#[derive(Clone, Debug, Default)]
pub struct ReverseOutcome {
    pub files: Vec<ReverseFile>,
}

/// Rewrite an absolute slash reference to dotted form.
pub fn reference_to_dotted(reference: &str) -> String {
    reference.trim_start_matches('/').replace('/', ".")
}

/// Assign correlation ids across the workspace's documents and derive the
/// domain-model text for each.
pub fn assign_ids_reverse(
    workspace: &mut XmlWorkspace,
    index: &CorrelationIndex,
) -> ReverseOutcome {
    let mut next = index.next_free_id();

    // Never reuse an id already present in the input, indexed or not.
    for (_, root) in workspace.iter() {
        for element in workspace.tree().descendant_elements(root) {
            if let Some(id) = correlation_of(workspace.tree(), element) {
                if id >= next {
                    next = id.next();
                }
            }
        }
    }

    let paths: Vec<String> = workspace.paths().map(str::to_string).collect();
    let mut files = Vec::new();
    for path in paths {
        let Some(root) = workspace.document(&path) else {
            continue;
        };
        let mut walk = ReverseWalk {
            tree: workspace.tree_mut(),
            relative_path: &path,
            next: &mut next,
            entries: Vec::new(),
            text: String::new(),
        };
        walk.document(root);
        tracing::debug!(
            "reverse pass over {path}: {} correlation entr(ies)",
            walk.entries.len()
        );
        files.push(ReverseFile {
            relative_path: path.clone(),
            text: walk.text,
            entries: walk.entries,
        });
    }
    ReverseOutcome { files }
}

struct ReverseWalk<'a> {
    tree: &'a mut XmlTree,
    relative_path: &'a str,
    next: &'a mut CorrelationId,
    entries: Vec<CorrelationEntry>,
    text: String,
}

impl ReverseWalk<'_> {
    fn document(&mut self, root: NodeId) {
        let Some(packages) = self.tree.find_child_element(root, tag::AR_PACKAGES) else {
            return;
        };
        let top: Vec<NodeId> = self.collect_packages(packages);
        for package in top {
            self.package(package, "");
        }
    }

    fn collect_packages(&self, packages: NodeId) -> Vec<NodeId> {
        self.tree
            .child_elements(packages)
            .filter(|&p| self.tree.tag(p) == Some(tag::AR_PACKAGE))
            .collect()
    }

    fn package(&mut self, package: NodeId, prefix: &str) {
        let Some(name) = self.tree.short_name(package) else {
            return;
        };
        let fqn = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}.{name}")
        };

        if let Some(elements) = self.tree.find_child_element(package, tag::ELEMENTS) {
            self.elements_block(elements, &fqn);
        }
        if let Some(nested) = self.tree.find_child_element(package, tag::AR_PACKAGES) {
            for child in self.collect_packages(nested) {
                self.package(child, &fqn);
            }
        }
    }

    fn elements_block(&mut self, elements: NodeId, fqn: &str) {
        let children: Vec<(usize, NodeId)> = self
            .tree
            .child_elements(elements)
            .enumerate()
            .filter(|&(_, c)| {
                self.tree
                    .tag(c)
                    .is_some_and(tag::is_supported_kind)
            })
            .collect();
        if children.is_empty() {
            return;
        }

        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str("package ");
        self.text.push_str(fqn);
        self.text.push_str(" {\n");
        for (sibling_index, element) in children {
            self.element(element, fqn, sibling_index);
        }
        self.text.push_str("}\n");
    }

    fn element(&mut self, element: NodeId, fqn: &str, sibling_index: usize) {
        let Some(element_tag) = self.tree.tag(element).map(str::to_string) else {
            return;
        };
        let id = self.ensure_id(element);
        self.push_entry(id, fqn, &element_tag, sibling_index);

        let name = self.tree.short_name(element).unwrap_or_default();
        match element_tag.as_str() {
            tag::SENDER_RECEIVER_INTERFACE => {
                self.line(1, &format!("senderReceiver interface {name}"));
            }
            tag::CLIENT_SERVER_INTERFACE => {
                self.line(1, &format!("clientServer interface {name}"));
            }
            tag::APPLICATION_SW_COMPONENT_TYPE => {
                self.line(1, &format!("application component {name} {{"));
                self.ports(element, fqn, &name);
                self.line(1, "}");
            }
            _ => {}
        }
    }

    fn ports(&mut self, component: NodeId, package_fqn: &str, component_name: &str) {
        let Some(collection) = self.tree.find_child_element(component, tag::PORTS) else {
            return;
        };
        let container_fqn = format!("{package_fqn}.{component_name}");
        let ports: Vec<(usize, NodeId)> = self
            .tree
            .child_elements(collection)
            .enumerate()
            .filter(|&(_, p)| {
                matches!(
                    self.tree.tag(p),
                    Some(tag::P_PORT_PROTOTYPE | tag::R_PORT_PROTOTYPE)
                )
            })
            .collect();

        for (sibling_index, port) in ports {
            let Some(port_tag) = self.tree.tag(port).map(str::to_string) else {
                continue;
            };
            let id = self.ensure_id(port);
            self.push_entry(id, &container_fqn, &port_tag, sibling_index);

            let name = self.tree.short_name(port).unwrap_or_default();
            let direction = if port_tag == tag::P_PORT_PROTOTYPE {
                "provided"
            } else {
                "required"
            };
            match self.interface_reference(port) {
                Some(reference) => {
                    self.line(2, &format!("{direction} port {name} : {reference}"));
                }
                None => {
                    self.line(2, &format!("{direction} port {name}"));
                }
            }
        }
    }

    fn interface_reference(&self, port: NodeId) -> Option<String> {
        let tref = self
            .tree
            .find_child_element(port, tag::PROVIDED_INTERFACE_TREF)
            .or_else(|| {
                self.tree
                    .find_child_element(port, tag::REQUIRED_INTERFACE_TREF)
            })?;
        let path = self.tree.element_text(tref)?;
        Some(reference_to_dotted(&path))
    }

    fn ensure_id(&mut self, element: NodeId) -> CorrelationId {
        if let Some(id) = correlation_of(self.tree, element) {
            return id;
        }
        let id = *self.next;
        *self.next = id.next();
        self.tree
            .set_attr(element, tag::CORRELATION_ATTR, id.to_string());
        id
    }

    fn push_entry(&mut self, id: CorrelationId, fqn: &str, tag_name: &str, sibling_index: usize) {
        self.entries.push(CorrelationEntry {
            id,
            container_fqn: fqn.to_string(),
            relative_path: self.relative_path.to_string(),
            tag_name: tag_name.to_string(),
            sibling_index: sibling_index as u32,
        });
    }

    fn line(&mut self, depth: usize, content: &str) {
        for _ in 0..depth {
            self.text.push('\t');
        }
        self.text.push_str(content);
        self.text.push('\n');
    }
}
