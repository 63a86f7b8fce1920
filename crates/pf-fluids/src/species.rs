//! Named fluids with a CoolProp mapping.

use crate::category::FluidCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Species {
    Water,
    Air,
    Nitrogen,
    Oxygen,
    Methane,
    CarbonDioxide,
    Ammonia,
    Propane,
    NButane,
    NHexane,
    Toluene,
    Ethanol,
    R134a,
}

impl Species {
    pub const ALL: [Species; 13] = [
        Species::Water,
        Species::Air,
        Species::Nitrogen,
        Species::Oxygen,
        Species::Methane,
        Species::CarbonDioxide,
        Species::Ammonia,
        Species::Propane,
        Species::NButane,
        Species::NHexane,
        Species::Toluene,
        Species::Ethanol,
        Species::R134a,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Species::Water => "water",
            Species::Air => "air",
            Species::Nitrogen => "nitrogen",
            Species::Oxygen => "oxygen",
            Species::Methane => "methane",
            Species::CarbonDioxide => "carbon_dioxide",
            Species::Ammonia => "ammonia",
            Species::Propane => "propane",
            Species::NButane => "n_butane",
            Species::NHexane => "n_hexane",
            Species::Toluene => "toluene",
            Species::Ethanol => "ethanol",
            Species::R134a => "r134a",
        }
    }

    /// Category used when the caller does not name one. Liquid or gas is the
    /// phase at ambient conditions.
    pub fn default_category(&self) -> FluidCategory {
        match self {
            Species::Water => FluidCategory::Water,
            Species::NHexane | Species::Toluene | Species::Ethanol => FluidCategory::OrganicLiquid,
            Species::Air
            | Species::Nitrogen
            | Species::Oxygen
            | Species::Methane
            | Species::CarbonDioxide
            | Species::Ammonia
            | Species::Propane
            | Species::NButane
            | Species::R134a => FluidCategory::Gas,
        }
    }

    pub(crate) fn rfluids_pure(&self) -> rfluids::substance::Pure {
        use rfluids::substance::Pure;
        match self {
            Species::Water => Pure::Water,
            Species::Air => Pure::Air,
            Species::Nitrogen => Pure::Nitrogen,
            Species::Oxygen => Pure::Oxygen,
            Species::Methane => Pure::Methane,
            Species::CarbonDioxide => Pure::CarbonDioxide,
            Species::Ammonia => Pure::Ammonia,
            Species::Propane => Pure::nPropane,
            Species::NButane => Pure::nButane,
            Species::NHexane => Pure::nHexane,
            Species::Toluene => Pure::Toluene,
            Species::Ethanol => Pure::Ethanol,
            Species::R134a => Pure::R134a,
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "H2O" | "WATER" => Ok(Species::Water),
            "AIR" => Ok(Species::Air),
            "N2" | "NITROGEN" => Ok(Species::Nitrogen),
            "O2" | "OXYGEN" => Ok(Species::Oxygen),
            "CH4" | "METHANE" => Ok(Species::Methane),
            "CO2" | "CARBON_DIOXIDE" | "CARBONDIOXIDE" => Ok(Species::CarbonDioxide),
            "NH3" | "AMMONIA" => Ok(Species::Ammonia),
            "C3H8" | "PROPANE" => Ok(Species::Propane),
            "N_BUTANE" | "NBUTANE" | "BUTANE" => Ok(Species::NButane),
            "N_HEXANE" | "NHEXANE" | "HEXANE" => Ok(Species::NHexane),
            "TOLUENE" => Ok(Species::Toluene),
            "ETHANOL" => Ok(Species::Ethanol),
            "R134A" => Ok(Species::R134a),
            _ => Err("unknown species"),
        }
    }
}
