use pf_app::{AppError, EngineConfig, FlowSpec, FluidSpec, PipelineEngine};
use pf_core::WarningKind;
use pf_core::units::{cp, ft, gpm, inch, kgpm3, kgps, lps, m, mm, pa, pas, psi};
use pf_graph::{Equipment, EquipmentLoss, Fitting, NetworkBuilder, Node, Pipe, Pump};
use pf_results::{ResultsStore, RunMode};
use pf_standards::PipeCostModel;
use pf_solver::{NetworkMethod, SolverConfig};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn water() -> FluidSpec {
    FluidSpec::Constant {
        density: kgpm3(998.0),
        viscosity: cp(1.0),
    }
}

#[test]
fn thousand_foot_water_line() {
    init_tracing();
    let pipe = Pipe::new("L-1")
        .with_internal_diameter(inch(15.25))
        .with_length(ft(1000.0))
        .with_roughness(m(0.0));
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(gpm(3000.0))
        .with_pipe(pipe);

    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run().unwrap();

    let s = results.summary();
    assert_eq!(s.mode, RunMode::SinglePipe);
    assert!((s.pressure_drop_pa - psi(1.86).value).abs() < psi(0.05).value);
    let re = s.reynolds.unwrap();
    assert!((re - 620_899.0).abs() / 620_899.0 < 1e-3);
    assert!(s.converged);
    assert!(results.sizing.is_empty());
    assert_eq!(engine.summary().as_ref(), Some(s));

    let text = results.to_string();
    assert!(text.contains("Total Pressure Drop"));
    assert!(text.contains("L-1"));
}

#[test]
fn mass_flow_and_economic_sizing() {
    init_tracing();
    let cfg = EngineConfig::new(water())
        .with_flow(FlowSpec::Mass(kgps(10.0)))
        .with_pipe(Pipe::new("transfer").with_length(m(80.0)))
        .economic();

    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run().unwrap();

    assert!((results.summary.flow_m3_s - 10.0 / 998.0).abs() < 1e-12);
    assert_eq!(results.sizing.len(), 1);
    let sized = &results.sizing[0];
    assert_eq!(sized.target, "economic");
    // 293 * 10^0.53 * 998^-0.37 = 77.1 mm, next Schedule 40 size is 3 in.
    assert!((sized.diameter_m - 0.07793).abs() < 1e-6);
    assert!((sized.nominal_m.unwrap() - inch(3.0).value).abs() < 1e-9);
    assert_eq!(results.element("transfer").unwrap().diameter_m, Some(sized.diameter_m));
}

#[test]
fn unreachable_budget_still_returns_a_diameter() {
    init_tracing();
    let chain = vec![
        Pipe::new("long run").with_length(m(500.0)).into(),
        Fitting::new("gate_valve").into(),
    ];
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(500.0))
        .with_chain(chain)
        .with_available_dp(pa(1.0));

    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run().unwrap();

    assert_eq!(results.mode(), RunMode::Chain);
    assert_eq!(results.sizing.len(), 1);
    assert!(!results.sizing[0].met_target);
    assert!(
        results
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::BudgetExceeded && w.source == "long run")
    );
    assert!(results.summary.pressure_drop_pa > 1.0);
    // The valve borrows the sized pipe's diameter.
    let valve = results.element("gate_valve").unwrap();
    assert_eq!(valve.diameter_m, Some(results.sizing[0].diameter_m));
}

#[test]
fn nominal_pipe_is_priced() {
    let pipe = Pipe::new("P-4")
        .with_nominal_diameter(inch(4.0))
        .with_schedule("40")
        .with_length(m(10.0));
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(10.0))
        .with_pipe(pipe);

    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run().unwrap();
    let cost = results.summary.pipe_cost.unwrap();
    assert!((cost - 750.0).abs() < 1e-9);
    let d = results.pipes().next().unwrap().diameter_m.unwrap();
    assert!((d - mm(102.26).value).abs() < 1e-9);
}

#[test]
fn pumped_loop_with_parallel_exchangers() {
    init_tracing();
    let mut b = NetworkBuilder::series("cooling");
    let root = b.root();
    b.add_element(root, Pump::with_head("P-101", m(25.0))).unwrap();
    b.add_element(
        root,
        Pipe::new("supply")
            .with_internal_diameter(mm(154.05))
            .with_length(m(120.0)),
    )
    .unwrap();
    let bank = b.add_parallel(root, "exchangers").unwrap();
    let e1 = b.add_series(bank, "E-1 leg").unwrap();
    b.add_element(e1, Pipe::new("E-1").with_internal_diameter(mm(77.93)).with_length(m(40.0)))
        .unwrap();
    b.add_element(e1, Equipment::new("HX-1", EquipmentLoss::Absolute(pa(20_000.0))))
        .unwrap();
    let e2 = b.add_series(bank, "E-2 leg").unwrap();
    b.add_element(e2, Pipe::new("E-2").with_internal_diameter(mm(77.93)).with_length(m(65.0)))
        .unwrap();
    b.add_element(e2, Equipment::new("HX-2", EquipmentLoss::Absolute(pa(20_000.0))))
        .unwrap();
    let net = b.build().unwrap();

    let solver = SolverConfig {
        pressure_tolerance: 0.1,
        ..SolverConfig::default().with_method(NetworkMethod::Dual)
    };
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(30.0))
        .with_network(net)
        .with_solver(solver);

    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run().unwrap();

    assert_eq!(results.mode(), RunMode::Network);
    assert!(results.summary.converged);
    assert_eq!(results.balances.len(), 1);
    let balance = &results.balances[0];
    assert_eq!(balance.block, "exchangers");
    let total: f64 = balance.flows_m3_s.iter().sum();
    assert!((total - 0.030).abs() < 1e-9);
    // The shorter leg takes more flow.
    assert!(balance.flows_m3_s[0] > balance.flows_m3_s[1]);
    assert!(results.summary.pump_power_w > 0.0);
    assert_eq!(results.pipes().count(), 3);
}

#[test]
fn default_diameter_skips_sizing() {
    let solver = SolverConfig {
        default_diameter: Some(mm(50.0)),
        ..SolverConfig::default()
    };
    let cfg = EngineConfig::new(FluidSpec::Constant {
        density: kgpm3(1000.0),
        viscosity: pas(1e-3),
    })
    .with_volumetric_flow(lps(2.0))
    .with_pipe(Pipe::new("P1").with_length(m(10.0)))
    .with_solver(solver);

    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run().unwrap();
    assert!(results.sizing.is_empty());
    assert_eq!(results.elements[0].diameter_m, Some(0.05));
}

#[test]
fn failed_fit_keeps_previous_binding() {
    let mut engine = PipelineEngine::default();
    let good = EngineConfig::new(water())
        .with_volumetric_flow(lps(5.0))
        .with_pipe(Pipe::new("P1").with_internal_diameter(mm(80.0)));
    engine.fit(good).unwrap();
    let id = engine.pending_run_id().unwrap().to_string();

    let bad = EngineConfig::new(water()).with_pipe(Pipe::new("P1"));
    assert!(matches!(engine.fit(bad), Err(AppError::MissingInput { .. })));
    assert_eq!(engine.pending_run_id(), Some(id.as_str()));
    assert!(engine.run().is_ok());
}

#[test]
fn run_and_store_persists_results() {
    let dir = std::env::temp_dir().join("pf_app_engine_store");
    let _ = std::fs::remove_dir_all(&dir);
    let store = ResultsStore::new(dir.clone()).unwrap();

    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(12.0))
        .with_pipe(Pipe::new("P1").with_internal_diameter(mm(102.26)).with_length(m(30.0)));
    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run_and_store(&store).unwrap();

    assert!(store.has_run(&results.run_id));
    assert_eq!(store.load(&results.run_id).unwrap(), results);
    let _ = std::fs::remove_dir_all(&dir);
}

fn ring_with_valve_at_b() -> pf_graph::PipelineNetwork {
    let mut b = NetworkBuilder::series("ring");
    let root = b.root();
    for name in ["A", "B", "C", "D"] {
        b.add_node(root, Node::new(name)).unwrap();
    }
    let leg = |name: &str, length: f64| {
        Pipe::new(name)
            .with_internal_diameter(mm(102.26))
            .with_length(m(length))
    };
    b.add_edge(root, leg("AB", 100.0), "A", "B").unwrap();
    b.add_edge(root, leg("BD", 100.0), "B", "D").unwrap();
    b.add_edge(root, leg("AC", 150.0), "A", "C").unwrap();
    b.add_edge(root, leg("CD", 150.0), "C", "D").unwrap();
    b.add_fitting(root, Fitting::new("gate_valve").named("V-B"), "B")
        .unwrap();
    b.set_terminals("A", "D");
    b.build().unwrap()
}

#[test]
fn solved_graph_nodes_carry_diagnostics() {
    init_tracing();
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(20.0))
        .with_network(ring_with_valve_at_b())
        .with_reference_pressure(pa(300_000.0));

    let mut engine = PipelineEngine::default();
    assert!(engine.solved_network().is_none());
    let results = engine.fit(cfg).unwrap().run().unwrap();
    assert!(results.summary.converged);

    for name in ["A", "B", "C", "D"] {
        let node = engine.solved_node(name).unwrap();
        assert!(node.pressure.is_some(), "{name} has no pressure");
        assert!(node.flow_rate.is_some(), "{name} has no flow");
        let reported = results.nodes.iter().find(|n| n.name == name).unwrap();
        assert_eq!(node.pressure.unwrap().value, reported.pressure_pa);
    }
    let inlet = engine.solved_node("A").unwrap().pressure.unwrap().value;
    assert!((inlet - 300_000.0).abs() < 1e-9);
    assert!(engine.solved_node("D").unwrap().pressure.unwrap().value < inlet);
}

#[test]
fn node_fitting_sees_node_throughput() {
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(20.0))
        .with_network(ring_with_valve_at_b());
    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run().unwrap();

    let valve = results.element("V-B").unwrap();
    let node_b = results.nodes.iter().find(|n| n.name == "B").unwrap();
    let ab = results.element("AB").unwrap();
    assert!((valve.flow_m3_s - node_b.flow_m3_s).abs() < 1e-12);
    assert!((valve.flow_m3_s - ab.flow_m3_s).abs() < 1e-12);
    assert!(valve.pressure_drop_pa > 0.0);

    // The valve adds to the path drop between the terminals.
    let a = results.nodes.iter().find(|n| n.name == "A").unwrap();
    let d = results.nodes.iter().find(|n| n.name == "D").unwrap();
    let expected = a.pressure_pa - d.pressure_pa + valve.pressure_drop_pa;
    assert!((results.summary.pressure_drop_pa - expected).abs() < 1e-6);
}

#[test]
fn loop_of_fixed_drops_reports_non_convergence() {
    init_tracing();
    let mut b = NetworkBuilder::series("exchanger pair");
    let root = b.root();
    b.add_node(root, Node::new("in")).unwrap();
    b.add_node(root, Node::new("out")).unwrap();
    b.add_edge(
        root,
        Equipment::new("HX-1", EquipmentLoss::Absolute(pa(10_000.0))),
        "in",
        "out",
    )
    .unwrap();
    b.add_edge(
        root,
        Equipment::new("HX-2", EquipmentLoss::Absolute(pa(20_000.0))),
        "in",
        "out",
    )
    .unwrap();
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(10.0))
        .with_network(b.build().unwrap());

    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run().unwrap();

    assert!(!results.summary.converged);
    assert!(!results.balances[0].converged);
    assert!(
        results
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::Convergence && w.source == "exchanger pair")
    );
}

#[test]
fn coefficient_equipment_through_the_engine() {
    let line = || Pipe::new("L-1").with_internal_diameter(mm(77.93)).with_length(m(150.0));
    let strainer = |reference| {
        Equipment::new(
            "S-1",
            EquipmentLoss::Coefficient {
                coefficient: 0.1,
                reference,
            },
        )
    };

    // Running pressure: the reference less the line drop ahead of it.
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(8.0))
        .with_chain(vec![line().into(), strainer(None).into()])
        .with_reference_pressure(pa(200_000.0));
    let mut engine = PipelineEngine::default();
    let results = engine.fit(cfg).unwrap().run().unwrap();
    let line_drop = results.element("L-1").unwrap().pressure_drop_pa;
    let s1 = results.element("S-1").unwrap();
    assert!((s1.equipment_loss_pa - 0.1 * (200_000.0 - line_drop)).abs() < 1e-6);

    // Its own reference wins.
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(8.0))
        .with_chain(vec![line().into(), strainer(Some(pa(100_000.0))).into()])
        .with_reference_pressure(pa(200_000.0));
    let results = engine.fit(cfg).unwrap().run().unwrap();
    assert!((results.element("S-1").unwrap().equipment_loss_pa - 10_000.0).abs() < 1e-9);

    // No reference at all is a missing input.
    let cfg = EngineConfig::new(water())
        .with_volumetric_flow(lps(8.0))
        .with_chain(vec![line().into(), strainer(None).into()]);
    let err = engine.fit(cfg).unwrap().run().unwrap_err();
    assert!(matches!(err, AppError::MissingInput { .. }));
}

#[test]
fn run_id_tracks_cost_model() {
    let cfg = || {
        EngineConfig::new(water())
            .with_volumetric_flow(lps(12.0))
            .with_pipe(Pipe::new("P1").with_internal_diameter(mm(102.26)).with_length(m(30.0)))
    };
    let mut steel = PipelineEngine::default();
    let mut again = PipelineEngine::default();
    let mut unpriced = PipelineEngine::default().with_cost_model(PipeCostModel::new());

    let a = steel.fit(cfg()).unwrap().pending_run_id().unwrap().to_string();
    let b = again.fit(cfg()).unwrap().pending_run_id().unwrap().to_string();
    let c = unpriced.fit(cfg()).unwrap().pending_run_id().unwrap().to_string();
    assert_eq!(a, b);
    assert_ne!(a, c);
}
