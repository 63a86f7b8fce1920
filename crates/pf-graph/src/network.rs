//! Arena-backed network tree.
//!
//! Every block lives in one flat `Vec`; nesting is expressed with parent ids
//! and `Element::Network` child ids. Block 0 is the root.

use crate::elements::{Element, Node, Pipe};
use pf_core::NetId;
use pf_core::units::{Pressure, VolumeRate};
use std::fmt::Write as _;

/// How the direct children of a block compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Connection {
    #[default]
    Series,
    Parallel,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkBlock {
    pub id: NetId,
    pub name: String,
    pub connection: Connection,
    pub parent: Option<NetId>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) elements: Vec<Element>,
}

impl NetworkBlock {
    pub(crate) fn new(id: NetId, name: String, connection: Connection) -> Self {
        Self {
            id,
            name,
            connection,
            parent: None,
            nodes: Vec::new(),
            elements: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn children(&self) -> impl Iterator<Item = NetId> + '_ {
        self.elements.iter().filter_map(|e| match e {
            Element::Network(id) => Some(*id),
            _ => None,
        })
    }
}

/// A validated pipe network.
///
/// Built through [`crate::NetworkBuilder`]. After `build()` the structure is
/// frozen; only pipe diameters and node diagnostics may change.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PipelineNetwork {
    pub(crate) blocks: Vec<NetworkBlock>,
    pub(crate) inlet: Option<String>,
    pub(crate) outlet: Option<String>,
}

impl PipelineNetwork {
    pub fn root(&self) -> NetId {
        NetId::from_index(0)
    }

    pub fn name(&self) -> &str {
        &self.root_block().name
    }

    pub fn root_block(&self) -> &NetworkBlock {
        &self.blocks[0]
    }

    pub fn block(&self, id: NetId) -> Option<&NetworkBlock> {
        self.blocks.get(id.slot())
    }

    pub fn blocks(&self) -> &[NetworkBlock] {
        &self.blocks
    }

    /// Blocks reachable from the root, parents before children.
    pub fn attached_blocks(&self) -> Vec<&NetworkBlock> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if let Some(block) = self.block(id) {
                out.push(block);
                let mut kids: Vec<NetId> = block.children().collect();
                kids.reverse();
                stack.extend(kids);
            }
        }
        out
    }

    /// Look a node up in `from` and then each enclosing block.
    pub fn find_node(&self, from: NetId, name: &str) -> Option<&Node> {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let block = self.block(id)?;
            if let Some(node) = block.node(name) {
                return Some(node);
            }
            cursor = block.parent;
        }
        None
    }

    pub fn find_node_anywhere(&self, name: &str) -> Option<&Node> {
        self.attached_blocks()
            .into_iter()
            .find_map(|b| b.node(name))
    }

    /// Pipes in reporting order: depth first, element order within a block.
    pub fn all_pipes(&self) -> Vec<&Pipe> {
        let mut out = Vec::new();
        self.collect_pipes(self.root(), &mut out);
        out
    }

    fn collect_pipes<'a>(&'a self, id: NetId, out: &mut Vec<&'a Pipe>) {
        let Some(block) = self.block(id) else {
            return;
        };
        for element in &block.elements {
            match element {
                Element::Pipe(p) => out.push(p),
                Element::Network(child) => self.collect_pipes(*child, out),
                _ => {}
            }
        }
    }

    /// Every pipe with the block that holds it. Only pipe data may change.
    pub fn pipes_mut(&mut self) -> impl Iterator<Item = (NetId, &mut Pipe)> {
        self.blocks.iter_mut().flat_map(|b| {
            let id = b.id;
            b.elements.iter_mut().filter_map(move |e| match e {
                Element::Pipe(p) => Some((id, p)),
                _ => None,
            })
        })
    }

    /// True when no block below `id` composes in parallel.
    pub fn is_parallel_free(&self, id: NetId) -> bool {
        match self.block(id) {
            Some(block) => {
                block.connection == Connection::Series
                    && block.children().all(|c| self.is_parallel_free(c))
            }
            None => false,
        }
    }

    /// Node-and-edge form: the root holds only leaves and at least one of them
    /// is attached between nodes. Such networks are solved on their graph
    /// rather than by series/parallel composition.
    pub fn is_edge_network(&self) -> bool {
        let root = self.root_block();
        root.elements.iter().all(Element::is_leaf)
            && root.elements.iter().any(|e| e.endpoints().0.is_some())
    }

    /// Inlet and outlet nodes. Defaults to the first and last root node.
    pub fn terminals(&self) -> Option<(&str, &str)> {
        let root = self.root_block();
        let inlet = self
            .inlet
            .as_deref()
            .or_else(|| root.nodes.first().map(|n| n.name.as_str()))?;
        let outlet = self
            .outlet
            .as_deref()
            .or_else(|| root.nodes.last().map(|n| n.name.as_str()))?;
        Some((inlet, outlet))
    }

    /// Fill unset pipe elevation changes from their end nodes.
    pub fn resolve_elevations(&mut self) {
        let mut updates = Vec::new();
        for (bi, block) in self.blocks.iter().enumerate() {
            for (ei, element) in block.elements.iter().enumerate() {
                let Element::Pipe(pipe) = element else {
                    continue;
                };
                if pipe.elevation_change.is_some() {
                    continue;
                }
                if let (Some(a), Some(b)) = (pipe.start_node.as_deref(), pipe.end_node.as_deref())
                {
                    let from = self.find_node(block.id, a);
                    let to = self.find_node(block.id, b);
                    if let (Some(from), Some(to)) = (from, to) {
                        updates.push((bi, ei, to.elevation - from.elevation));
                    }
                }
            }
        }
        for (bi, ei, dz) in updates {
            if let Element::Pipe(pipe) = &mut self.blocks[bi].elements[ei] {
                pipe.elevation_change = Some(dz);
            }
        }
    }

    /// Attach solved diagnostics to a node. Returns false for unknown names.
    pub fn annotate_node(
        &mut self,
        name: &str,
        pressure: Option<Pressure>,
        flow_rate: Option<VolumeRate>,
    ) -> bool {
        for block in &mut self.blocks {
            if let Some(node) = block.nodes.iter_mut().find(|n| n.name == name) {
                node.pressure = pressure;
                node.flow_rate = flow_rate;
                return true;
            }
        }
        false
    }

    /// Indented text outline of the network tree.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_block(self.root(), 0, &mut out);
        out
    }

    fn describe_block(&self, id: NetId, depth: usize, out: &mut String) {
        let Some(block) = self.block(id) else {
            return;
        };
        let pad = "  ".repeat(depth);
        let _ = writeln!(
            out,
            "{pad}Network '{}' ({:?}, {} nodes)",
            block.name,
            block.connection,
            block.nodes.len()
        );
        for element in &block.elements {
            match element {
                Element::Network(child) => self.describe_block(*child, depth + 1, out),
                leaf => {
                    let name = leaf.name().unwrap_or_default();
                    let _ = match leaf.endpoints() {
                        (Some(a), Some(b)) => {
                            writeln!(out, "{pad}  {} '{}' {} -> {}", leaf.kind(), name, a, b)
                        }
                        _ => writeln!(out, "{pad}  {} '{}'", leaf.kind(), name),
                    };
                }
            }
        }
    }
}
