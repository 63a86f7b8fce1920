use pf_project::*;

fn network_system(net: NetworkDef) -> SystemDef {
    SystemDef {
        id: "s".to_string(),
        name: "s".to_string(),
        fluid: FluidDef::Constant {
            density_kg_m3: 1000.0,
            viscosity_pa_s: 1e-3,
        },
        category: None,
        flow: FlowDef::Volumetric { flow_m3_s: 0.01 },
        topology: TopologyDef::Network(net),
        sizing: SizingDef::default(),
        solver: SolverDef::default(),
        reference_pressure_pa: None,
    }
}

fn node(name: &str) -> NodeDef {
    NodeDef {
        name: name.to_string(),
        elevation_m: 0.0,
    }
}

fn edge(name: &str, from: &str, to: &str) -> ElementDef {
    ElementDef::Pipe(PipeDef {
        name: name.to_string(),
        length_m: Some(10.0),
        from: Some(from.to_string()),
        to: Some(to.to_string()),
        ..PipeDef::default()
    })
}

fn net(nodes: Vec<NodeDef>, elements: Vec<ElementDef>) -> NetworkDef {
    NetworkDef {
        name: "grid".to_string(),
        connection: ConnectionDef::Series,
        nodes,
        elements,
        inlet: None,
        outlet: None,
    }
}

#[test]
fn edges_between_declared_nodes_pass() {
    let n = net(vec![node("A"), node("B")], vec![edge("AB", "A", "B")]);
    validate_system(&network_system(n)).unwrap();
}

#[test]
fn nested_network_sees_parent_nodes() {
    let inner = NetworkDef {
        name: "inner".to_string(),
        ..net(vec![], vec![edge("AB", "A", "B")])
    };
    let n = net(vec![node("A"), node("B")], vec![ElementDef::Network(inner)]);
    validate_system(&network_system(n)).unwrap();
}

#[test]
fn unknown_node_rejected() {
    let n = net(vec![node("A")], vec![edge("AX", "A", "X")]);
    let err = validate_system(&network_system(n)).unwrap_err();
    assert!(matches!(err, ValidationError::MissingReference { ref id, .. } if id == "X"));
}

#[test]
fn duplicate_node_rejected() {
    let n = net(vec![node("A"), node("A")], vec![]);
    assert!(matches!(
        validate_system(&network_system(n)),
        Err(ValidationError::DuplicateId { .. })
    ));
}

#[test]
fn self_loop_rejected() {
    let n = net(vec![node("A")], vec![edge("AA", "A", "A")]);
    assert!(matches!(
        validate_system(&network_system(n)),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn half_connected_edge_rejected() {
    let mut e = edge("AB", "A", "B");
    if let ElementDef::Pipe(p) = &mut e {
        p.to = None;
    }
    let n = net(vec![node("A"), node("B")], vec![e]);
    assert!(matches!(
        validate_system(&network_system(n)),
        Err(ValidationError::MissingData { .. })
    ));
}

#[test]
fn pump_without_duty_rejected() {
    let pump = ElementDef::Pump(PumpDef {
        name: "P".to_string(),
        head_m: None,
        inlet_pressure_pa: Some(1e5),
        outlet_pressure_pa: None,
        efficiency: None,
        from: None,
        to: None,
    });
    let n = net(vec![], vec![pump]);
    assert!(matches!(
        validate_system(&network_system(n)),
        Err(ValidationError::MissingData { .. })
    ));
}

#[test]
fn non_positive_geometry_rejected() {
    let pipe = ElementDef::Pipe(PipeDef {
        name: "P".to_string(),
        internal_diameter_m: Some(0.0),
        ..PipeDef::default()
    });
    let n = net(vec![], vec![pipe]);
    assert!(matches!(
        validate_system(&network_system(n)),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn equipment_needs_drop_or_coefficient() {
    let eq = ElementDef::Equipment(EquipmentDef {
        name: "HX".to_string(),
        pressure_drop_pa: None,
        coefficient: None,
        from: None,
        to: None,
    });
    let n = net(vec![], vec![eq]);
    assert!(validate_system(&network_system(n)).is_err());
}

#[test]
fn zero_iteration_cap_rejected() {
    let mut system = network_system(net(vec![], vec![]));
    system.solver.max_iterations = Some(0);
    assert!(validate_system(&system).is_err());
}
