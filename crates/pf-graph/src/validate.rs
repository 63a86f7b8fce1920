//! Network validation.

use std::collections::HashSet;

use crate::elements::{Element, Fitting};
use crate::error::{TopologyError, TopologyResult};
use crate::network::PipelineNetwork;
use crate::topology::LoopTopology;

/// Structural checks run by `NetworkBuilder::build`.
pub(crate) fn validate_structure(net: &PipelineNetwork) -> TopologyResult<()> {
    let blocks = net.attached_blocks();
    let mut referenced: HashSet<&str> = HashSet::new();

    for block in &blocks {
        if block.elements.is_empty() {
            return Err(TopologyError::EmptyNetwork {
                network: block.name.clone(),
            });
        }

        for element in &block.elements {
            if let Element::Network(child) = element {
                match net.block(*child) {
                    Some(c) if c.parent == Some(block.id) => continue,
                    _ => return Err(TopologyError::UnknownNetwork { id: *child }),
                }
            }
            let label = element.name().unwrap_or_default();

            match element {
                Element::Pump(p) if !p.has_duty() => {
                    return Err(TopologyError::MissingPumpData {
                        pump: p.name.clone(),
                    });
                }
                Element::Equipment(e) if e.loss.is_none() => {
                    return Err(TopologyError::MissingEquipmentData {
                        equipment: e.name.clone(),
                    });
                }
                Element::Fitting(f) => check_fitting_data(f)?,
                Element::Pipe(p) => {
                    for f in &p.fittings {
                        check_fitting_data(f)?;
                    }
                }
                _ => {}
            }

            if let Element::Fitting(Fitting { node: Some(node), .. }) = element {
                if net.find_node(block.id, node).is_none() {
                    return Err(TopologyError::UnknownNode {
                        element: label.to_string(),
                        node: node.clone(),
                    });
                }
                referenced.insert(node.as_str());
            }

            match element.endpoints() {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    if a == b {
                        return Err(TopologyError::SelfLoop {
                            element: label.to_string(),
                            node: a.to_string(),
                        });
                    }
                    for node in [a, b] {
                        if net.find_node(block.id, node).is_none() {
                            return Err(TopologyError::UnknownNode {
                                element: label.to_string(),
                                node: node.to_string(),
                            });
                        }
                        referenced.insert(node);
                    }
                }
                _ => {
                    return Err(TopologyError::DanglingElement {
                        element: label.to_string(),
                    });
                }
            }
        }
    }

    for block in &blocks {
        for node in &block.nodes {
            if !referenced.contains(node.name.as_str()) {
                return Err(TopologyError::UnconnectedNode {
                    node: node.name.clone(),
                });
            }
        }
    }

    if net.is_edge_network() {
        validate_edge_network(net)?;
    }
    Ok(())
}

fn check_fitting_data(f: &Fitting) -> TopologyResult<()> {
    if f.fitting_type.trim().is_empty() && !f.has_explicit_data() {
        return Err(TopologyError::MissingFittingData {
            fitting: f.name.clone(),
        });
    }
    Ok(())
}

/// Every root element must sit on the graph, the terminals must exist and the
/// graph must be connected.
fn validate_edge_network(net: &PipelineNetwork) -> TopologyResult<()> {
    let root = net.root_block();
    for element in &root.elements {
        let attached = match element {
            Element::Fitting(f) => f.node.is_some(),
            other => other.endpoints().0.is_some(),
        };
        if !attached {
            return Err(TopologyError::DanglingElement {
                element: element.name().unwrap_or_default().to_string(),
            });
        }
    }
    let (inlet, outlet) = net.terminals().ok_or(TopologyError::EmptyNetwork {
        network: root.name.clone(),
    })?;
    for node in [inlet, outlet] {
        if root.node(node).is_none() {
            return Err(TopologyError::UnknownNode {
                element: "terminal".to_string(),
                node: node.to_string(),
            });
        }
    }
    LoopTopology::from_network(net).map(|_| ())
}

/// Check that every fitting without explicit K or Le names a type the
/// standards tables know.
pub fn check_fittings(
    net: &PipelineNetwork,
    known_type: impl Fn(&str) -> bool,
) -> TopologyResult<()> {
    let check = |f: &Fitting| {
        if f.has_explicit_data() || known_type(&f.fitting_type) {
            Ok(())
        } else {
            Err(TopologyError::MissingFittingData {
                fitting: f.name.clone(),
            })
        }
    };
    for block in net.attached_blocks() {
        for element in &block.elements {
            match element {
                Element::Fitting(f) => check(f)?,
                Element::Pipe(p) => p.fittings.iter().try_for_each(&check)?,
                _ => {}
            }
        }
    }
    Ok(())
}
