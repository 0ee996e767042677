//! Typed domain model handed over by the external parser.
//!
//! The parser/validator is an external collaborator: by the time a model
//! reaches this crate it is already resolved: interface kinds are known,
//! port interface references point at real interfaces, ports are ordered
//! under their owning component. Nodes carry an optional [`CorrelationId`]:
//! present iff the node was last derived from XML, absent for freshly
//! authored nodes.

use smol_str::SmolStr;

use crate::correlation::CorrelationId;
use crate::xml::tag;

/// A complete domain model: one entry per textual model file.
///
/// Each model file maps to exactly one XML file at the same relative path
/// (with the XML extension); the merge engine rebuilds that document.
#[derive(Clone, Debug, Default)]
pub struct DomainModel {
    pub files: Vec<ModelFile>,
}

impl DomainModel {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The declarations of a single textual model file.
#[derive(Clone, Debug)]
pub struct ModelFile {
    /// Project-relative path of the XML file this model file synchronizes to.
    pub relative_path: String,
    /// Declared packages, in declaration order.
    pub packages: Vec<Package>,
}

/// A dotted-name container of interfaces and components.
#[derive(Clone, Debug)]
pub struct Package {
    /// Dotted package name, e.g. `a.b`.
    pub name: String,
    /// Declared elements, in declaration order.
    pub elements: Vec<PackageElement>,
}

/// A declared element directly inside a package.
#[derive(Clone, Debug)]
pub enum PackageElement {
    Interface(Interface),
    Component(Component),
}

impl PackageElement {
    /// Correlation id of the underlying node, if it was derived from XML.
    pub fn correlation(&self) -> Option<CorrelationId> {
        match self {
            PackageElement::Interface(i) => i.correlation,
            PackageElement::Component(c) => c.correlation,
        }
    }

    /// Declared name of the underlying node.
    pub fn name(&self) -> &str {
        match self {
            PackageElement::Interface(i) => &i.name,
            PackageElement::Component(c) => &c.name,
        }
    }
}

/// A port interface declaration.
#[derive(Clone, Debug)]
pub struct Interface {
    pub name: SmolStr,
    pub kind: InterfaceKind,
    pub correlation: Option<CorrelationId>,
}

/// Interface sub-type, selecting the XML element tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    SenderReceiver,
    ClientServer,
}

impl InterfaceKind {
    /// XML tag for an interface of this kind.
    pub fn tag(self) -> &'static str {
        match self {
            InterfaceKind::SenderReceiver => tag::SENDER_RECEIVER_INTERFACE,
            InterfaceKind::ClientServer => tag::CLIENT_SERVER_INTERFACE,
        }
    }
}

/// A software component declaration with its ordered ports.
#[derive(Clone, Debug)]
pub struct Component {
    pub name: SmolStr,
    pub kind: ComponentKind,
    pub ports: Vec<Port>,
    pub correlation: Option<CorrelationId>,
}

/// Component sub-type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Application,
}

impl ComponentKind {
    /// XML tag for a component of this kind.
    pub fn tag(self) -> &'static str {
        match self {
            ComponentKind::Application => tag::APPLICATION_SW_COMPONENT_TYPE,
        }
    }
}

/// A port declaration under a component.
#[derive(Clone, Debug)]
pub struct Port {
    pub name: SmolStr,
    pub direction: PortDirection,
    /// Resolved reference to the port's interface.
    pub interface: InterfaceRef,
    pub correlation: Option<CorrelationId>,
}

/// Port direction, selecting the XML prototype tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Provided,
    Required,
}

impl PortDirection {
    /// XML tag for a port prototype of this direction.
    pub fn tag(self) -> &'static str {
        match self {
            PortDirection::Provided => tag::P_PORT_PROTOTYPE,
            PortDirection::Required => tag::R_PORT_PROTOTYPE,
        }
    }

    /// XML tag of the interface reference child for this direction.
    pub fn tref_tag(self) -> &'static str {
        match self {
            PortDirection::Provided => tag::PROVIDED_INTERFACE_TREF,
            PortDirection::Required => tag::REQUIRED_INTERFACE_TREF,
        }
    }
}

/// A resolved reference from a port to an interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceRef {
    /// Dotted package path of the target interface, e.g. `a.b`.
    pub package: String,
    pub name: SmolStr,
    /// Kind of the target interface (fills the TREF `DEST` attribute).
    pub kind: InterfaceKind,
}

impl InterfaceRef {
    /// Absolute slash-separated reference text, e.g. `/a/b/EngineData`.
    pub fn reference_path(&self) -> String {
        let mut path = String::with_capacity(self.package.len() + self.name.len() + 2);
        for segment in self.package.split('.') {
            path.push('/');
            path.push_str(segment);
        }
        path.push('/');
        path.push_str(&self.name);
        path
    }
}
