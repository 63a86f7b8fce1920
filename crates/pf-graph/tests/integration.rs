//! Integration tests for pf-graph.

use pf_core::units::m;
use pf_graph::{
    Branch, Connection, Element, FlowPath, LoopTopology, NetworkBuilder, Node, Pipe,
    PipelineNetwork, TopologyError, normalize,
};
use proptest::prelude::*;

fn looped_network() -> PipelineNetwork {
    // A -> B -> D and A -> C -> D with a B-C cross tie.
    let mut b = NetworkBuilder::series("ring");
    let root = b.root();
    for (name, z) in [("A", 0.0), ("B", 2.0), ("C", 1.0), ("D", 0.0)] {
        b.add_node(root, Node::new(name).with_elevation(m(z))).unwrap();
    }
    b.add_edge(root, Pipe::new("AB"), "A", "B").unwrap();
    b.add_edge(root, Pipe::new("BD"), "B", "D").unwrap();
    b.add_edge(root, Pipe::new("AC"), "A", "C").unwrap();
    b.add_edge(root, Pipe::new("CD"), "C", "D").unwrap();
    b.add_edge(root, Pipe::new("BC"), "B", "C").unwrap();
    b.build().unwrap()
}

#[test]
fn edge_network_is_detected_and_analyzed() {
    let net = looped_network();
    assert!(net.is_edge_network());
    assert_eq!(net.terminals(), Some(("A", "D")));

    let topo = LoopTopology::from_network(&net).unwrap();
    assert_eq!(topo.loops().len(), 2);
    assert_eq!(topo.inlet, 0);
    assert_eq!(topo.outlet, 3);
}

#[test]
fn elevations_resolved_from_nodes() {
    let mut net = looped_network();
    net.resolve_elevations();
    let ab = net.all_pipes().into_iter().find(|p| p.name == "AB").unwrap();
    assert!((ab.elevation_change.unwrap().value - 2.0).abs() < 1e-12);
    let bc = net.all_pipes().into_iter().find(|p| p.name == "BC").unwrap();
    assert!((bc.elevation_change.unwrap().value + 1.0).abs() < 1e-12);
}

#[test]
fn explicit_terminals_must_exist() {
    let mut b = NetworkBuilder::series("line");
    let root = b.root();
    b.add_node(root, Node::new("A")).unwrap();
    b.add_node(root, Node::new("B")).unwrap();
    b.add_edge(root, Pipe::new("P"), "A", "B").unwrap();
    b.set_terminals("A", "Z");
    assert!(matches!(b.build(), Err(TopologyError::UnknownNode { .. })));
}

#[test]
fn disconnected_edge_network_rejected() {
    let mut b = NetworkBuilder::series("split");
    let root = b.root();
    for n in ["A", "B", "C", "D"] {
        b.add_node(root, Node::new(n)).unwrap();
    }
    b.add_edge(root, Pipe::new("P1"), "A", "B").unwrap();
    b.add_edge(root, Pipe::new("P2"), "C", "D").unwrap();
    assert_eq!(
        b.build(),
        Err(TopologyError::Disconnected { components: 2 })
    );
}

#[test]
fn describe_lists_nested_blocks() {
    let mut b = NetworkBuilder::series("plant");
    let root = b.root();
    b.add_element(root, Pipe::new("header")).unwrap();
    let par = b.add_parallel(root, "bank").unwrap();
    b.add_element(par, Pipe::new("tube-1")).unwrap();
    b.add_element(par, Pipe::new("tube-2")).unwrap();
    let net = b.build().unwrap();

    let text = net.describe();
    assert!(text.contains("Network 'plant' (Series"));
    assert!(text.contains("  Network 'bank' (Parallel"));
    assert!(text.contains("pipe 'tube-2'"));
    assert!(!net.is_parallel_free(net.root()));
}

#[test]
fn annotate_node_sets_diagnostics() {
    let mut net = looped_network();
    assert!(net.annotate_node("C", Some(pf_core::units::pa(5.0)), None));
    assert!(!net.annotate_node("Q", None, None));
    assert_eq!(
        net.find_node_anywhere("C").unwrap().pressure,
        Some(pf_core::units::pa(5.0))
    );
}

/// Random series/parallel trees of up to three levels.
fn arb_network() -> impl Strategy<Value = PipelineNetwork> {
    let leaf_counts = prop::collection::vec(1usize..4, 1..5);
    (any::<bool>(), leaf_counts, any::<bool>()).prop_map(|(root_parallel, counts, nest)| {
        let conn = if root_parallel {
            Connection::Parallel
        } else {
            Connection::Series
        };
        let mut b = NetworkBuilder::new("root", conn);
        let root = b.root();
        let mut serial = 0;
        for (i, count) in counts.into_iter().enumerate() {
            let child_conn = if nest && i % 2 == 1 {
                Connection::Parallel
            } else {
                Connection::Series
            };
            let child = b.create_block(format!("c{i}"), child_conn);
            b.add_subnetwork(root, child).unwrap();
            for _ in 0..count {
                serial += 1;
                b.add_element(child, Pipe::new(format!("p{serial}"))).unwrap();
            }
        }
        b.build().unwrap()
    })
}

fn leaf_names(branches: &[Branch]) -> Vec<String> {
    branches
        .iter()
        .flatten()
        .filter_map(|e: &Element| e.name().map(str::to_string))
        .collect()
}

proptest! {
    #[test]
    fn normalization_is_idempotent(net in arb_network()) {
        let once = normalize(FlowPath::Network(&net)).unwrap();
        let twice = normalize(FlowPath::Branches(&once)).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalization_preserves_element_order(net in arb_network()) {
        let branches = normalize(FlowPath::Network(&net)).unwrap();
        let expected: Vec<String> = net.all_pipes().iter().map(|p| p.name.clone()).collect();
        prop_assert_eq!(leaf_names(&branches), expected);
    }

    #[test]
    fn series_root_yields_single_branch(net in arb_network()) {
        let branches = normalize(FlowPath::Network(&net)).unwrap();
        if net.root_block().connection == Connection::Series {
            prop_assert_eq!(branches.len(), 1);
        } else {
            prop_assert!(!branches.is_empty());
        }
    }
}
