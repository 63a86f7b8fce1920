use pf_app::{
    RunOptions, RunRequest, compile_system, ensure_run, list_runs, list_systems, load_project,
    load_run,
};
use pf_results::RunMode;
use std::path::PathBuf;

const PROJECT: &str = r#"
version: 1
name: Utility water
systems:
  - id: transfer
    name: Transfer line
    fluid:
      type: Constant
      density_kg_m3: 998.0
      viscosity_pa_s: 0.001
    flow:
      type: Volumetric
      flow_m3_s: 0.012
    topology:
      type: Chain
      elements:
        - type: Pipe
          name: L-1
          length_m: 60.0
          internal_diameter_m: 0.10226
          fittings:
            - fitting_type: elbow_90
              quantity: 3
        - type: Fitting
          fitting_type: gate_valve
        - type: Pipe
          name: L-2
          length_m: 25.0
  - id: ring
    name: Distribution ring
    fluid:
      type: Constant
      density_kg_m3: 998.0
      viscosity_pa_s: 0.001
    flow:
      type: Volumetric
      flow_m3_s: 0.02
    topology:
      type: Network
      name: ring
      nodes:
        - name: A
        - name: B
        - name: C
        - name: D
      elements:
        - type: Pipe
          name: AB
          length_m: 100.0
          internal_diameter_m: 0.10226
          from: A
          to: B
        - type: Pipe
          name: BD
          length_m: 100.0
          internal_diameter_m: 0.10226
          from: B
          to: D
        - type: Pipe
          name: AC
          length_m: 150.0
          internal_diameter_m: 0.10226
          from: A
          to: C
        - type: Pipe
          name: CD
          length_m: 150.0
          internal_diameter_m: 0.10226
          from: C
          to: D
      inlet: A
      outlet: D
"#;

fn project_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("utility.yaml");
    std::fs::write(&path, PROJECT).unwrap();
    path
}

#[test]
fn systems_are_listed_with_their_mode() {
    let path = project_file("pf_app_list_systems");
    let project = load_project(&path).unwrap();
    let systems = list_systems(&project);
    assert_eq!(systems.len(), 2);
    assert_eq!(systems[0].mode, RunMode::Chain);
    assert_eq!(systems[0].element_count, 3);
    assert_eq!(systems[0].unsized_pipes, 1);
    assert_eq!(systems[1].mode, RunMode::Network);
    assert_eq!(systems[1].element_count, 4);
}

#[test]
fn second_run_comes_from_the_cache() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let path = project_file("pf_app_cached_run");
    let request = RunRequest {
        project_path: &path,
        system_id: "transfer",
        options: RunOptions::default(),
    };

    let first = ensure_run(&request).unwrap();
    assert!(!first.loaded_from_cache);
    assert_eq!(first.results.sizing.len(), 1);
    assert_eq!(first.results.sizing[0].pipe, "L-2");

    let second = ensure_run(&request).unwrap();
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);
    assert_eq!(second.results, first.results);

    let runs = list_runs(&path).unwrap();
    assert!(runs.iter().any(|r| r.run_id == first.run_id));
    assert_eq!(load_run(&path, &first.run_id).unwrap(), first.results);
}

#[test]
fn ring_network_reports_node_pressures() {
    let path = project_file("pf_app_ring_run");
    let request = RunRequest {
        project_path: &path,
        system_id: "ring",
        options: RunOptions { use_cache: false },
    };
    let response = ensure_run(&request).unwrap();
    let results = response.results;

    assert_eq!(results.nodes.len(), 4);
    let inlet = results.nodes.iter().find(|n| n.name == "A").unwrap();
    let outlet = results.nodes.iter().find(|n| n.name == "D").unwrap();
    assert!(inlet.pressure_pa > outlet.pressure_pa);
    assert!((results.summary.pressure_drop_pa - (inlet.pressure_pa - outlet.pressure_pa)).abs() < 1e-6);

    // The short side carries more flow.
    let ab = results.element("AB").unwrap().flow_m3_s;
    let ac = results.element("AC").unwrap().flow_m3_s;
    assert!(ab > ac);
    assert!((ab + ac - 0.02).abs() < 1e-6);
}

#[test]
fn unknown_system_is_reported() {
    let path = project_file("pf_app_unknown_system");
    let request = RunRequest {
        project_path: &path,
        system_id: "missing",
        options: RunOptions::default(),
    };
    assert!(matches!(
        ensure_run(&request),
        Err(pf_app::AppError::SystemNotFound(_))
    ));
}

#[test]
fn compiled_chain_keeps_fitting_quantities() {
    let path = project_file("pf_app_compile_chain");
    let project = load_project(&path).unwrap();
    let cfg = compile_system(project.system("transfer").unwrap()).unwrap();
    let Some(pf_app::Topology::Chain(elements)) = cfg.topology else {
        panic!("expected a chain");
    };
    let pf_graph::Element::Pipe(first) = &elements[0] else {
        panic!("expected a pipe");
    };
    assert_eq!(first.fittings[0].quantity, 3);
}
