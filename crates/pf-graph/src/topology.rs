//! Loop structure of node-and-edge networks.
//!
//! A breadth-first spanning tree is grown from the inlet. Every edge left out
//! of the tree (a chord) closes exactly one independent loop, so a connected
//! graph with `N` nodes and `E` edges yields `E - N + 1` loops.

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::VecDeque;

use crate::elements::Element;
use crate::error::{TopologyError, TopologyResult};
use crate::network::PipelineNetwork;

/// Directed edge between node indices. Positive flow runs `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    /// Index of the element in the root block.
    pub element: usize,
    pub from: usize,
    pub to: usize,
}

/// Signed edge membership of a loop: `+1.0` when the loop runs along the edge.
pub type LoopPath = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct LoopTopology {
    pub nodes: Vec<String>,
    pub edges: Vec<GraphEdge>,
    pub inlet: usize,
    pub outlet: usize,
    order: Vec<usize>,
    parent: Vec<Option<(usize, usize)>>,
    chords: Vec<usize>,
    loops: Vec<LoopPath>,
}

impl LoopTopology {
    /// Graph of a node-and-edge network's root block.
    pub fn from_network(net: &PipelineNetwork) -> TopologyResult<Self> {
        let root = net.root_block();
        let nodes: Vec<String> = root.nodes().iter().map(|n| n.name.clone()).collect();
        let index_of = |name: &str, element: &str| {
            nodes
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| TopologyError::UnknownNode {
                    element: element.to_string(),
                    node: name.to_string(),
                })
        };

        let mut edges = Vec::new();
        for (i, element) in root.elements().iter().enumerate() {
            if matches!(element, Element::Fitting(_)) {
                continue;
            }
            let label = element.name().unwrap_or_default();
            match element.endpoints() {
                (Some(a), Some(b)) => edges.push(GraphEdge {
                    element: i,
                    from: index_of(a, label)?,
                    to: index_of(b, label)?,
                }),
                _ => {
                    return Err(TopologyError::DanglingElement {
                        element: label.to_string(),
                    });
                }
            }
        }

        let (inlet, outlet) = net.terminals().ok_or(TopologyError::EmptyNetwork {
            network: root.name.clone(),
        })?;
        let inlet = index_of(inlet, "terminal")?;
        let outlet = index_of(outlet, "terminal")?;
        Self::build(nodes, edges, inlet, outlet)
    }

    pub fn build(
        nodes: Vec<String>,
        edges: Vec<GraphEdge>,
        inlet: usize,
        outlet: usize,
    ) -> TopologyResult<Self> {
        let n = nodes.len();
        let mut graph: UnGraph<(), usize> = UnGraph::with_capacity(n, edges.len());
        for _ in 0..n {
            graph.add_node(());
        }
        for (i, e) in edges.iter().enumerate() {
            graph.add_edge(NodeIndex::new(e.from), NodeIndex::new(e.to), i);
        }

        let components = connected_components(&graph);
        if components != 1 {
            return Err(TopologyError::Disconnected { components });
        }

        let mut visited = vec![false; n];
        let mut parent = vec![None; n];
        let mut in_tree = vec![false; edges.len()];
        let mut order = Vec::with_capacity(n);
        let mut queue = VecDeque::from([inlet]);
        visited[inlet] = true;

        while let Some(node) = queue.pop_front() {
            order.push(node);
            let mut incident: Vec<usize> = graph
                .edges(NodeIndex::new(node))
                .map(|e| *e.weight())
                .collect();
            incident.sort_unstable();
            for idx in incident {
                let e = edges[idx];
                let other = if e.from == node { e.to } else { e.from };
                if !visited[other] {
                    visited[other] = true;
                    parent[other] = Some((node, idx));
                    in_tree[idx] = true;
                    queue.push_back(other);
                }
            }
        }

        let chords: Vec<usize> = (0..edges.len()).filter(|&i| !in_tree[i]).collect();
        let mut topo = Self {
            nodes,
            edges,
            inlet,
            outlet,
            order,
            parent,
            chords,
            loops: Vec::new(),
        };
        topo.loops = topo.chords.iter().map(|&c| topo.loop_through(c)).collect();
        Ok(topo)
    }

    fn depth(&self, mut node: usize) -> usize {
        let mut d = 0;
        while let Some((p, _)) = self.parent[node] {
            node = p;
            d += 1;
        }
        d
    }

    /// Chord `u -> v` followed by the tree path from `v` back to `u`.
    fn loop_through(&self, chord: usize) -> LoopPath {
        let GraphEdge { from: u, to: v, .. } = self.edges[chord];
        let mut up_from_v = Vec::new();
        let mut up_from_u = Vec::new();
        let (mut a, mut b) = (v, u);
        let (mut da, mut db) = (self.depth(a), self.depth(b));

        // Climb the deeper side first, then both together until they meet.
        while a != b {
            if da >= db {
                if let Some((p, e)) = self.parent[a] {
                    let sign = if self.edges[e].from == a { 1.0 } else { -1.0 };
                    up_from_v.push((e, sign));
                    a = p;
                    da -= 1;
                    continue;
                }
            }
            if let Some((p, e)) = self.parent[b] {
                // Walked in reverse below, so record the parent-to-child sense.
                let sign = if self.edges[e].to == b { 1.0 } else { -1.0 };
                up_from_u.push((e, sign));
                b = p;
                db -= 1;
            }
        }

        let mut path = Vec::with_capacity(1 + up_from_v.len() + up_from_u.len());
        path.push((chord, 1.0));
        path.extend(up_from_v);
        path.extend(up_from_u.into_iter().rev());
        path
    }

    pub fn loops(&self) -> &[LoopPath] {
        &self.loops
    }

    pub fn chords(&self) -> &[usize] {
        &self.chords
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == name)
    }

    /// External supply per node: `+total` at the inlet, `-total` at the outlet.
    pub fn terminal_injection(&self, total: f64) -> Vec<f64> {
        let mut b = vec![0.0; self.nodes.len()];
        b[self.inlet] += total;
        b[self.outlet] -= total;
        b
    }

    /// Edge flows meeting continuity for the given injections, with chord
    /// flows fixed to `chord_flows` and tree flows solved leaf to root.
    pub fn initial_flows(&self, injection: &[f64], chord_flows: &[f64]) -> Vec<f64> {
        let mut flows = vec![0.0; self.edges.len()];
        let mut excess = injection.to_vec();
        for (&c, &q) in self.chords.iter().zip(chord_flows) {
            flows[c] = q;
            excess[self.edges[c].from] -= q;
            excess[self.edges[c].to] += q;
        }
        for &node in self.order.iter().rev() {
            if let Some((p, e)) = self.parent[node] {
                let carry = excess[node];
                flows[e] = if self.edges[e].from == node { carry } else { -carry };
                excess[p] += carry;
                excess[node] = 0.0;
            }
        }
        flows
    }

    /// Node pressures from a reference at the inlet, where `edge_drops[e]` is
    /// the pressure at `from` minus the pressure at `to`.
    pub fn node_pressures(&self, inlet_pressure: f64, edge_drops: &[f64]) -> Vec<f64> {
        let mut p = vec![0.0; self.nodes.len()];
        p[self.inlet] = inlet_pressure;
        for &node in &self.order {
            if let Some((parent, e)) = self.parent[node] {
                let drop = edge_drops[e];
                p[node] = if self.edges[e].from == parent {
                    p[parent] - drop
                } else {
                    p[parent] + drop
                };
            }
        }
        p
    }

    /// Flow passing through each node.
    pub fn node_throughput(&self, flows: &[f64], injection: &[f64]) -> Vec<f64> {
        let mut through: Vec<f64> = injection.iter().map(|b| b.max(0.0)).collect();
        for (e, &q) in self.edges.iter().zip(flows) {
            if q > 0.0 {
                through[e.to] += q;
            } else {
                through[e.from] -= q;
            }
        }
        through
    }

    /// Net inflow minus outflow plus injection at each node. Zero when balanced.
    pub fn continuity_residual(&self, flows: &[f64], injection: &[f64]) -> Vec<f64> {
        let mut r = injection.to_vec();
        for (e, &q) in self.edges.iter().zip(flows) {
            r[e.from] -= q;
            r[e.to] += q;
        }
        r
    }
}
