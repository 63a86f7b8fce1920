//! Fluid categories used for recommended-velocity lookups.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FluidCategory {
    #[default]
    Water,
    /// Light organic liquids and solvents.
    OrganicLiquid,
    /// Oils and other viscous liquids.
    ViscousLiquid,
    Gas,
    Steam,
}

impl FluidCategory {
    pub const ALL: [FluidCategory; 5] = [
        FluidCategory::Water,
        FluidCategory::OrganicLiquid,
        FluidCategory::ViscousLiquid,
        FluidCategory::Gas,
        FluidCategory::Steam,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FluidCategory::Water => "water",
            FluidCategory::OrganicLiquid => "organic_liquid",
            FluidCategory::ViscousLiquid => "viscous_liquid",
            FluidCategory::Gas => "gas",
            FluidCategory::Steam => "steam",
        }
    }

    pub fn is_liquid(&self) -> bool {
        !matches!(self, FluidCategory::Gas | FluidCategory::Steam)
    }
}

impl fmt::Display for FluidCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FluidCategory {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "water" | "aqueous" => Ok(FluidCategory::Water),
            "organic_liquid" | "organic" | "solvent" => Ok(FluidCategory::OrganicLiquid),
            "viscous_liquid" | "viscous" | "oil" => Ok(FluidCategory::ViscousLiquid),
            "gas" | "vapor" | "vapour" => Ok(FluidCategory::Gas),
            "steam" => Ok(FluidCategory::Steam),
            _ => Err("unknown fluid category"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_key() {
        for cat in FluidCategory::ALL {
            assert_eq!(cat.key().parse::<FluidCategory>(), Ok(cat));
        }
        assert_eq!("Viscous Liquid".parse(), Ok(FluidCategory::ViscousLiquid));
        assert!("plasma".parse::<FluidCategory>().is_err());
    }
}
