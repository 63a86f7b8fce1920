//! Topology errors.

use pf_core::NetId;

pub type TopologyResult<T> = Result<T, TopologyError>;

/// Network construction and validation errors. All are fatal for the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Element or terminal references a node no enclosing network declares.
    UnknownNode { element: String, node: String },

    /// Node name declared twice in one network.
    DuplicateNode { node: String },

    /// Edge starts and ends at the same node.
    SelfLoop { element: String, node: String },

    /// Declared node that no element touches.
    UnconnectedNode { node: String },

    /// Element with only one endpoint, or without endpoints in a node-and-edge network.
    DanglingElement { element: String },

    /// Fitting with no type, K-factor, or equivalent length, or a type the tables lack.
    MissingFittingData { fitting: String },

    /// Pump with neither head nor an inlet/outlet pressure pair.
    MissingPumpData { pump: String },

    /// Equipment without a pressure drop.
    MissingEquipmentData { equipment: String },

    /// Nesting a network inside itself or one of its descendants.
    SelfReference { network: String },

    /// Network already nested elsewhere.
    AlreadyNested { network: String },

    /// Network block with no elements.
    EmptyNetwork { network: String },

    /// Node-and-edge network that is not a single connected piece.
    Disconnected { components: usize },

    /// Id that does not belong to this network arena.
    UnknownNetwork { id: NetId },
}

impl std::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::UnknownNode { element, node } => {
                write!(f, "Element '{}' references unknown node '{}'", element, node)
            }
            TopologyError::DuplicateNode { node } => {
                write!(f, "Node '{}' is declared more than once", node)
            }
            TopologyError::SelfLoop { element, node } => {
                write!(f, "Element '{}' starts and ends at node '{}'", element, node)
            }
            TopologyError::UnconnectedNode { node } => {
                write!(f, "Node '{}' is not connected to any element", node)
            }
            TopologyError::DanglingElement { element } => {
                write!(f, "Element '{}' is not attached at both ends", element)
            }
            TopologyError::MissingFittingData { fitting } => {
                write!(
                    f,
                    "Fitting '{}' has no K-factor, equivalent length, or known type",
                    fitting
                )
            }
            TopologyError::MissingPumpData { pump } => {
                write!(
                    f,
                    "Pump '{}' needs a head or an inlet/outlet pressure pair",
                    pump
                )
            }
            TopologyError::MissingEquipmentData { equipment } => {
                write!(f, "Equipment '{}' has no pressure drop", equipment)
            }
            TopologyError::SelfReference { network } => {
                write!(f, "Network '{}' cannot contain itself", network)
            }
            TopologyError::AlreadyNested { network } => {
                write!(f, "Network '{}' is already nested in another network", network)
            }
            TopologyError::EmptyNetwork { network } => {
                write!(f, "Network '{}' has no elements", network)
            }
            TopologyError::Disconnected { components } => {
                write!(f, "Network splits into {} disconnected parts", components)
            }
            TopologyError::UnknownNetwork { id } => {
                write!(f, "Network id {} does not exist", id)
            }
        }
    }
}

impl std::error::Error for TopologyError {}
