//! Network-wide pipe sizing.
//!
//! Every pipe without a diameter is handed to the optimizer at an estimated
//! share of the total flow. Parallel blocks split their share evenly over
//! their branches, and looped graphs spread it over the independent routes.
//! A pressure budget is apportioned to pipes by length.

use crate::error::SolverResult;
use crate::optimizer::{SizingOutcome, SizingTarget, optimize_diameter};
use pf_components::EvalContext;
use pf_core::NetId;
use pf_core::units::{VolumeRate, m3ps, pa};
use pf_graph::{Connection, Element, LoopTopology, Pipe, PipelineNetwork};
use std::collections::HashMap;
use tracing::info;

/// Size the unsized pipes of `net` in place and return one outcome per pipe.
pub fn size_network(
    net: &mut PipelineNetwork,
    flow: VolumeRate,
    target: SizingTarget,
    ctx: &EvalContext<'_>,
) -> SolverResult<Vec<SizingOutcome>> {
    let shares = if net.is_edge_network() {
        let routes = LoopTopology::from_network(net)?.loops().len() + 1;
        HashMap::from([(net.root(), 1.0 / routes as f64)])
    } else {
        pipe_shares(net)
    };
    let total_length: f64 = net
        .all_pipes()
        .into_iter()
        .map(|p| pipe_length(p, ctx))
        .sum();

    let mut outcomes = Vec::new();
    for (block, pipe) in net.pipes_mut() {
        if !pipe.needs_sizing() {
            continue;
        }
        let Some(&share) = shares.get(&block) else {
            continue;
        };
        let pipe_target = apportion(target, pipe_length(pipe, ctx), total_length);
        let outcome = optimize_diameter(pipe, m3ps(flow.value * share), pipe_target, ctx)?;
        apply(pipe, &outcome);
        outcomes.push(outcome);
    }
    info!(sized = outcomes.len(), ?target, "network sized");
    Ok(outcomes)
}

/// Size the unsized pipes of a plain series chain, all at the full flow.
pub fn size_chain(
    elements: &mut [Element],
    flow: VolumeRate,
    target: SizingTarget,
    ctx: &EvalContext<'_>,
) -> SolverResult<Vec<SizingOutcome>> {
    let total_length: f64 = elements
        .iter()
        .filter_map(|e| match e {
            Element::Pipe(p) => Some(pipe_length(p, ctx)),
            _ => None,
        })
        .sum();

    let mut outcomes = Vec::new();
    for element in elements.iter_mut() {
        let Element::Pipe(pipe) = element else {
            continue;
        };
        if !pipe.needs_sizing() {
            continue;
        }
        let pipe_target = apportion(target, pipe_length(pipe, ctx), total_length);
        let outcome = optimize_diameter(pipe, flow, pipe_target, ctx)?;
        apply(pipe, &outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Fraction of the total flow seen by pipes held directly in each block.
fn pipe_shares(net: &PipelineNetwork) -> HashMap<NetId, f64> {
    let mut entering: HashMap<NetId, f64> = HashMap::from([(net.root(), 1.0)]);
    let mut shares = HashMap::new();
    for block in net.attached_blocks() {
        let inflow = entering.get(&block.id).copied().unwrap_or(1.0);
        let share = match block.connection {
            Connection::Parallel if !block.elements().is_empty() => {
                inflow / block.elements().len() as f64
            }
            _ => inflow,
        };
        shares.insert(block.id, share);
        for child in block.children() {
            entering.insert(child, share);
        }
    }
    shares
}

fn pipe_length(pipe: &Pipe, ctx: &EvalContext<'_>) -> f64 {
    pipe.length.unwrap_or(ctx.default_length).value
}

fn apportion(target: SizingTarget, length: f64, total_length: f64) -> SizingTarget {
    match target {
        SizingTarget::PressureBudget(budget) if total_length > 0.0 => {
            SizingTarget::PressureBudget(pa(budget.value * length / total_length))
        }
        other => other,
    }
}

fn apply(pipe: &mut Pipe, outcome: &SizingOutcome) {
    pipe.internal_diameter = Some(outcome.diameter);
    if outcome.nominal.is_some() {
        pipe.nominal_diameter = outcome.nominal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{kgpm3, kpa, lps, m, mm, pas};
    use pf_fluids::FluidState;
    use pf_graph::NetworkBuilder;
    use pf_standards::StandardTables;

    fn water() -> FluidState {
        FluidState::new(kgpm3(1000.0), pas(1e-3)).unwrap()
    }

    #[test]
    fn parallel_branches_size_for_half_flow() {
        let tables = StandardTables::default();
        let ctx = EvalContext::new(water(), &tables);
        let mut b = NetworkBuilder::series("plant");
        let root = b.root();
        b.add_element(root, Pipe::new("header").with_length(m(10.0))).unwrap();
        let par = b.add_parallel(root, "split").unwrap();
        b.add_element(par, Pipe::new("left").with_length(m(10.0))).unwrap();
        b.add_element(par, Pipe::new("right").with_length(m(10.0))).unwrap();
        let mut net = b.build().unwrap();

        let out = size_network(&mut net, lps(40.0), SizingTarget::Velocity, &ctx).unwrap();
        assert_eq!(out.len(), 3);
        let header = net.all_pipes()[0].internal_diameter.unwrap();
        let left = net.all_pipes()[1].internal_diameter.unwrap();
        assert!(left < header);
        assert!(net.all_pipes().iter().all(|p| !p.needs_sizing()));
    }

    #[test]
    fn sized_pipes_are_left_alone() {
        let tables = StandardTables::default();
        let ctx = EvalContext::new(water(), &tables);
        let mut chain: Vec<Element> = vec![
            Pipe::new("fixed").with_internal_diameter(mm(50.0)).into(),
            Pipe::new("free").with_length(m(20.0)).into(),
        ];
        let out = size_chain(&mut chain, lps(10.0), SizingTarget::Velocity, &ctx).unwrap();
        assert_eq!(out.len(), 1);
        let Element::Pipe(fixed) = &chain[0] else { unreachable!() };
        assert_eq!(fixed.internal_diameter, Some(mm(50.0)));
        let Element::Pipe(free) = &chain[1] else { unreachable!() };
        assert!(free.internal_diameter.is_some());
        assert!(free.nominal_diameter.is_some());
    }

    #[test]
    fn budget_is_split_by_length() {
        let tables = StandardTables::default();
        let ctx = EvalContext::new(water(), &tables);
        let mut chain: Vec<Element> = vec![
            Pipe::new("short").with_length(m(10.0)).into(),
            Pipe::new("long").with_length(m(90.0)).into(),
        ];
        let out = size_chain(&mut chain, lps(10.0), SizingTarget::PressureBudget(kpa(50.0)), &ctx)
            .unwrap();
        assert_eq!(out[0].target, SizingTarget::PressureBudget(kpa(5.0)));
        assert_eq!(out[1].target, SizingTarget::PressureBudget(kpa(45.0)));
        let total: f64 = out.iter().map(|o| o.evaluation.pressure_drop().value).sum();
        assert!(total <= 50_000.0);
    }
}
