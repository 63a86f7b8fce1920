//! Advisory outcomes.
//!
//! Convergence shortfalls, unmet sizing targets and out-of-band velocities are
//! engineering findings, not failures. Calculations attach them to their result
//! and keep going.

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WarningKind {
    /// An iterative calculation stopped at its cap before meeting tolerance.
    Convergence,
    /// The diameter optimizer could not meet its pressure or velocity target.
    BudgetExceeded,
    /// Velocity outside the recommended band for the fluid category.
    VelocityOutOfRange,
    /// Laminar or transitional flow where turbulent flow is assumed typical.
    FlowRegime,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warning {
    pub kind: WarningKind,
    /// Element, network or solver that raised the warning.
    pub source: String,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            message: message.into(),
        }
    }

    pub fn convergence(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::Convergence, source, message)
    }

    pub fn budget_exceeded(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::BudgetExceeded, source, message)
    }

    pub fn velocity(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::VelocityOutOfRange, source, message)
    }

    pub fn flow_regime(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::FlowRegime, source, message)
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WarningKind::Convergence => "convergence",
            WarningKind::BudgetExceeded => "budget exceeded",
            WarningKind::VelocityOutOfRange => "velocity out of range",
            WarningKind::FlowRegime => "flow regime",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.source, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_source() {
        let w = Warning::budget_exceeded("P-101", "smallest loss 12 kPa exceeds budget 5 kPa");
        let text = w.to_string();
        assert!(text.starts_with("[budget exceeded] P-101"));
        assert_eq!(w.kind, WarningKind::BudgetExceeded);
    }
}
