//! pf-graph: network model for pipeflow.
//!
//! Provides:
//! - Topology primitives (`Node`, `Pipe`, `Fitting`, `Pump`, `Equipment`)
//! - Arena-backed nested networks with an incremental, validating builder
//! - The branch normalizer (any topology to a list of branches)
//! - Spanning-tree loop analysis for node-and-edge networks
//!
//! # Example
//!
//! ```
//! use pf_core::units::m;
//! use pf_graph::{NetworkBuilder, Node, Pipe};
//!
//! let mut b = NetworkBuilder::series("main");
//! let root = b.root();
//! b.add_node(root, Node::new("A")).unwrap();
//! b.add_node(root, Node::new("B")).unwrap();
//! b.add_edge(root, Pipe::new("P1").with_length(m(25.0)), "A", "B").unwrap();
//! let net = b.build().unwrap();
//!
//! assert_eq!(net.all_pipes().len(), 1);
//! ```

pub mod builder;
pub mod elements;
pub mod error;
pub mod network;
pub mod normalize;
pub mod topology;
pub(crate) mod validate;

pub use builder::NetworkBuilder;
pub use elements::{
    Element, ElementKind, Equipment, EquipmentLoss, Fitting, Node, Pipe, Pump, SEED_FLOW_M3PS,
};
pub use error::{TopologyError, TopologyResult};
pub use network::{Connection, NetworkBlock, PipelineNetwork};
pub use normalize::{Branch, FlowPath, normalize, normalize_block};
pub use topology::{GraphEdge, LoopPath, LoopTopology};
pub use validate::check_fittings;
