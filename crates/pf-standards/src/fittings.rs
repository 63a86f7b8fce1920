//! Fitting resistance data.
//!
//! Valves and bends are tabulated as L/D ratios (Crane TP-410 style);
//! entrances and exits carry a fixed K independent of size.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FittingResistance {
    /// Equivalent length expressed in pipe diameters.
    LOverD(f64),
    /// Fixed loss coefficient.
    K(f64),
}

const FITTINGS: &[(&str, FittingResistance)] = &[
    ("gate_valve", FittingResistance::LOverD(8.0)),
    ("globe_valve", FittingResistance::LOverD(340.0)),
    ("ball_valve", FittingResistance::LOverD(3.0)),
    ("butterfly_valve", FittingResistance::LOverD(45.0)),
    ("plug_valve", FittingResistance::LOverD(18.0)),
    ("swing_check_valve", FittingResistance::LOverD(100.0)),
    ("lift_check_valve", FittingResistance::LOverD(600.0)),
    ("elbow_90", FittingResistance::LOverD(30.0)),
    ("elbow_90_long_radius", FittingResistance::LOverD(20.0)),
    ("elbow_45", FittingResistance::LOverD(16.0)),
    ("return_bend", FittingResistance::LOverD(50.0)),
    ("tee_run", FittingResistance::LOverD(20.0)),
    ("tee_branch", FittingResistance::LOverD(60.0)),
    ("entrance_sharp", FittingResistance::K(0.5)),
    ("entrance_rounded", FittingResistance::K(0.04)),
    ("entrance_projecting", FittingResistance::K(0.78)),
    ("exit", FittingResistance::K(1.0)),
];

fn normalize(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

pub fn fitting_resistance(fitting_type: &str) -> Option<FittingResistance> {
    let key = normalize(fitting_type);
    FITTINGS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, r)| *r)
}

/// All tabulated fitting keys.
pub fn fitting_types() -> impl Iterator<Item = &'static str> {
    FITTINGS.iter().map(|(name, _)| *name)
}
