use pf_core::units::{inch, m, mm};
use pf_fluids::FluidCategory;
use pf_standards::{StandardTables, StandardsProvider, Schedule};
use proptest::prelude::*;

#[test]
fn standard_diameters_are_sorted_and_positive() {
    for sched in [Schedule::Sch40, Schedule::Sch80] {
        let tables = StandardTables::new(sched);
        let ds = tables.standard_diameters();
        assert!(!ds.is_empty());
        assert!(ds[0].value > 0.0);
        assert!(ds.windows(2).all(|w| w[0].value < w[1].value));
    }
}

#[test]
fn provider_is_usable_as_trait_object() {
    let provider: Box<dyn StandardsProvider> = Box::new(StandardTables::default());
    let (lo, hi) = provider.recommended_velocity(FluidCategory::Water);
    assert!(lo.value < hi.value);
    assert!(provider.k_factor("entrance_sharp", None).is_some());
    assert!((provider.roughness("PVC").value - mm(0.0015).value).abs() < 1e-15);
}

proptest! {
    #[test]
    fn equivalent_length_scales_with_diameter(d_mm in 10.0f64..600.0) {
        let tables = StandardTables::default();
        let d = mm(d_mm);
        let le = tables.equivalent_length("elbow_90", Some(d)).unwrap();
        prop_assert!((le.value / d.value - 30.0).abs() < 1e-9);
    }

    #[test]
    fn every_tabulated_nominal_round_trips(idx in 0usize..19) {
        let tables = StandardTables::default();
        let ids = tables.standard_diameters();
        let nominal = tables.nominal_for_internal(ids[idx]).unwrap();
        let back = tables.internal_diameter(nominal, None).unwrap();
        prop_assert!((back.value - ids[idx].value).abs() < m(1e-9).value);
        prop_assert!(nominal.value >= inch(0.5).value);
    }
}
