//! Branch normalizer.
//!
//! Flattens any supported topology input into `Vec<Branch>`, one entry per
//! parallel path. Pure structure: nothing here looks at physics.
//!
//! - a series block contributes one branch: its children's branches laid end to end
//! - a parallel block contributes one branch per child; a nested parallel child
//!   contributes its own branches, since parallel-of-parallel is still parallel
//! - empty branches are dropped
//!
//! Output branches hold only leaves, so normalizing the output again returns it
//! unchanged.

use crate::elements::{Element, Pipe};
use crate::error::{TopologyError, TopologyResult};
use crate::network::{Connection, PipelineNetwork};
use pf_core::NetId;

/// Ordered leaf elements carrying one flow rate.
pub type Branch = Vec<Element>;

/// Anything the engine accepts as a flow path.
#[derive(Debug, Clone, Copy)]
pub enum FlowPath<'a> {
    Pipe(&'a Pipe),
    Chain(&'a [Element]),
    Network(&'a PipelineNetwork),
    Branches(&'a [Branch]),
}

pub fn normalize(input: FlowPath<'_>) -> TopologyResult<Vec<Branch>> {
    match input {
        FlowPath::Pipe(p) => Ok(vec![vec![Element::Pipe(p.clone())]]),
        FlowPath::Chain(elements) => {
            let branch = leaves_only(elements)?;
            Ok(non_empty(vec![branch]))
        }
        FlowPath::Branches(branches) => {
            let out = branches
                .iter()
                .map(|b| leaves_only(b))
                .collect::<TopologyResult<Vec<_>>>()?;
            Ok(non_empty(out))
        }
        FlowPath::Network(net) => normalize_block(net, net.root()),
    }
}

/// Branches of one block of a network.
pub fn normalize_block(net: &PipelineNetwork, id: NetId) -> TopologyResult<Vec<Branch>> {
    let block = net.block(id).ok_or(TopologyError::UnknownNetwork { id })?;
    let branches = match block.connection {
        Connection::Series => {
            let mut chain = Vec::new();
            for element in &block.elements {
                match element {
                    Element::Network(child) => {
                        for branch in normalize_block(net, *child)? {
                            chain.extend(branch);
                        }
                    }
                    leaf => chain.push(leaf.clone()),
                }
            }
            vec![chain]
        }
        Connection::Parallel => {
            let mut out = Vec::new();
            for element in &block.elements {
                match element {
                    Element::Network(child) => {
                        let sub = normalize_block(net, *child)?;
                        let child_parallel = net
                            .block(*child)
                            .is_some_and(|b| b.connection == Connection::Parallel);
                        if child_parallel {
                            out.extend(sub);
                        } else {
                            out.push(sub.into_iter().flatten().collect());
                        }
                    }
                    leaf => out.push(vec![leaf.clone()]),
                }
            }
            out
        }
    };
    Ok(non_empty(branches))
}

fn leaves_only(elements: &[Element]) -> TopologyResult<Branch> {
    elements
        .iter()
        .map(|e| match e {
            Element::Network(id) => Err(TopologyError::UnknownNetwork { id: *id }),
            leaf => Ok(leaf.clone()),
        })
        .collect()
}

fn non_empty(branches: Vec<Branch>) -> Vec<Branch> {
    branches.into_iter().filter(|b| !b.is_empty()).collect()
}
