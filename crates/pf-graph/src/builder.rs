//! Incremental network builder.

use crate::elements::{Element, Fitting, Node};
use crate::error::{TopologyError, TopologyResult};
use crate::network::{Connection, NetworkBlock, PipelineNetwork};
use crate::validate;
use pf_core::NetId;

/// Builder for a [`PipelineNetwork`].
///
/// Blocks, nodes and elements are added incrementally; `build()` validates the
/// whole tree and freezes it.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    net: PipelineNetwork,
}

impl NetworkBuilder {
    pub fn new(name: impl Into<String>, connection: Connection) -> Self {
        let root = NetworkBlock::new(NetId::from_index(0), name.into(), connection);
        Self {
            net: PipelineNetwork {
                blocks: vec![root],
                inlet: None,
                outlet: None,
            },
        }
    }

    pub fn series(name: impl Into<String>) -> Self {
        Self::new(name, Connection::Series)
    }

    pub fn parallel(name: impl Into<String>) -> Self {
        Self::new(name, Connection::Parallel)
    }

    pub fn root(&self) -> NetId {
        self.net.root()
    }

    fn block_mut(&mut self, id: NetId) -> TopologyResult<&mut NetworkBlock> {
        self.net
            .blocks
            .get_mut(id.slot())
            .ok_or(TopologyError::UnknownNetwork { id })
    }

    fn block(&self, id: NetId) -> TopologyResult<&NetworkBlock> {
        self.net.block(id).ok_or(TopologyError::UnknownNetwork { id })
    }

    /// Declare a node in `net`. Names are unique per block.
    pub fn add_node(&mut self, net: NetId, node: Node) -> TopologyResult<()> {
        let block = self.block_mut(net)?;
        if block.node(&node.name).is_some() {
            return Err(TopologyError::DuplicateNode { node: node.name });
        }
        block.nodes.push(node);
        Ok(())
    }

    /// Append an element to `net`. Nested networks go through `add_subnetwork`.
    pub fn add_element(&mut self, net: NetId, element: impl Into<Element>) -> TopologyResult<()> {
        match element.into() {
            Element::Network(child) => self.add_subnetwork(net, child),
            leaf => {
                self.block_mut(net)?.elements.push(leaf);
                Ok(())
            }
        }
    }

    /// Append a two-port element between declared nodes.
    pub fn add_edge(
        &mut self,
        net: NetId,
        element: impl Into<Element>,
        from: &str,
        to: &str,
    ) -> TopologyResult<()> {
        let mut element = element.into();
        let label = element.name().unwrap_or("network").to_string();
        if from == to {
            return Err(TopologyError::SelfLoop {
                element: label,
                node: from.to_string(),
            });
        }
        for node in [from, to] {
            if self.net.find_node(net, node).is_none() {
                self.block(net)?;
                return Err(TopologyError::UnknownNode {
                    element: label,
                    node: node.to_string(),
                });
            }
        }
        if !element.set_endpoints(from, to) {
            return Err(TopologyError::DanglingElement { element: label });
        }
        self.block_mut(net)?.elements.push(element);
        Ok(())
    }

    /// Place a fitting at a declared node.
    pub fn add_fitting(&mut self, net: NetId, mut fitting: Fitting, at_node: &str) -> TopologyResult<()> {
        if self.net.find_node(net, at_node).is_none() {
            self.block(net)?;
            return Err(TopologyError::UnknownNode {
                element: fitting.name,
                node: at_node.to_string(),
            });
        }
        fitting.node = Some(at_node.to_string());
        self.block_mut(net)?.elements.push(Element::Fitting(fitting));
        Ok(())
    }

    /// Create a detached block, to be nested with `add_subnetwork`.
    pub fn create_block(&mut self, name: impl Into<String>, connection: Connection) -> NetId {
        let id = NetId::from_index(self.net.blocks.len() as u32);
        self.net
            .blocks
            .push(NetworkBlock::new(id, name.into(), connection));
        id
    }

    /// Nest the detached block `child` as the next element of `parent`.
    pub fn add_subnetwork(&mut self, parent: NetId, child: NetId) -> TopologyResult<()> {
        let child_block = self.block(child)?;
        let child_name = child_block.name.clone();
        if child_block.parent.is_some() {
            return Err(TopologyError::AlreadyNested {
                network: child_name,
            });
        }
        // Walking up from the parent must never reach the child (or the root,
        // which would make the child an ancestor).
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(TopologyError::SelfReference {
                    network: child_name,
                });
            }
            cursor = self.block(id)?.parent;
        }
        if child == self.net.root() {
            return Err(TopologyError::SelfReference {
                network: child_name,
            });
        }
        self.block_mut(parent)?.elements.push(Element::Network(child));
        self.block_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn add_series(&mut self, parent: NetId, name: impl Into<String>) -> TopologyResult<NetId> {
        let id = self.create_block(name, Connection::Series);
        self.add_subnetwork(parent, id)?;
        Ok(id)
    }

    pub fn add_parallel(&mut self, parent: NetId, name: impl Into<String>) -> TopologyResult<NetId> {
        let id = self.create_block(name, Connection::Parallel);
        self.add_subnetwork(parent, id)?;
        Ok(id)
    }

    /// Inlet and outlet for node-and-edge networks.
    pub fn set_terminals(&mut self, inlet: impl Into<String>, outlet: impl Into<String>) {
        self.net.inlet = Some(inlet.into());
        self.net.outlet = Some(outlet.into());
    }

    /// Validate and freeze.
    pub fn build(self) -> TopologyResult<PipelineNetwork> {
        validate::validate_structure(&self.net)?;
        Ok(self.net)
    }
}

#[cfg(test)]
impl PipelineNetwork {
    /// Series network of leaf elements.
    pub(crate) fn series_of(
        name: impl Into<String>,
        elements: impl IntoIterator<Item = Element>,
    ) -> TopologyResult<Self> {
        let mut b = NetworkBuilder::series(name);
        let root = b.root();
        for e in elements {
            b.add_element(root, e)?;
        }
        b.build()
    }
}
