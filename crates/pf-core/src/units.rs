// pf-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, Area as UomArea, DiffusionCoefficient as UomKinematicViscosity,
    DynamicViscosity as UomDynamicViscosity, Length as UomLength,
    MassDensity as UomMassDensity, MassRate as UomMassRate, Power as UomPower,
    Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature,
    Velocity as UomVelocity, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Area = UomArea;
pub type DynVisc = UomDynamicViscosity;
/// Kinematic viscosity, m²/s. uom carries this dimension as a diffusion coefficient.
pub type KinVisc = UomKinematicViscosity;
pub type Length = UomLength;
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn inch(v: f64) -> Length {
    use uom::si::length::inch;
    Length::new::<inch>(v)
}

#[inline]
pub fn ft(v: f64) -> Length {
    use uom::si::length::foot;
    Length::new::<foot>(v)
}

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn kpa(v: f64) -> Pressure {
    use uom::si::pressure::kilopascal;
    Pressure::new::<kilopascal>(v)
}

#[inline]
pub fn psi(v: f64) -> Pressure {
    use uom::si::pressure::pound_force_per_square_inch;
    Pressure::new::<pound_force_per_square_inch>(v)
}

#[inline]
pub fn m3ps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

#[inline]
pub fn lps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::liter_per_second;
    VolumeRate::new::<liter_per_second>(v)
}

/// US gallons per minute.
#[inline]
pub fn gpm(v: f64) -> VolumeRate {
    use uom::si::volume_rate::gallon_per_minute;
    VolumeRate::new::<gallon_per_minute>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn pas(v: f64) -> DynVisc {
    use uom::si::dynamic_viscosity::pascal_second;
    DynVisc::new::<pascal_second>(v)
}

#[inline]
pub fn cp(v: f64) -> DynVisc {
    use uom::si::dynamic_viscosity::centipoise;
    DynVisc::new::<centipoise>(v)
}

#[inline]
pub fn m2ps(v: f64) -> KinVisc {
    use uom::si::diffusion_coefficient::square_meter_per_second;
    KinVisc::new::<square_meter_per_second>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

pub mod constants {
    use super::*;

    pub const G0_MPS2: f64 = 9.806_65;

    /// Standard atmosphere, used as the default reference pressure.
    pub const P_ATM_PA: f64 = 101_325.0;

    #[inline]
    pub fn g0() -> Accel {
        use uom::si::acceleration::meter_per_second_squared;
        Accel::new::<meter_per_second_squared>(G0_MPS2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imperial_constructors_land_in_si() {
        assert!((inch(1.0).value - 0.0254).abs() < 1e-12);
        assert!((ft(1.0).value - 0.3048).abs() < 1e-12);
        assert!((mm(180.0).value - 0.18).abs() < 1e-12);
        assert!((psi(1.0).value - 6_894.757).abs() < 1e-3);
        assert!((gpm(1.0).value - 6.309_02e-5).abs() < 1e-9);
        assert!((lps(75.0).value - 0.075).abs() < 1e-12);
        assert!((cp(1.0).value - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn constructors_smoke() {
        let _ = (kpa(1.0), m3ps(0.1), kgps(2.0), kgpm3(998.0), pas(1e-3));
        let _ = (m2ps(1e-6), mps(1.0), k(293.15), watts(10.0), m(1.0));
        assert!((constants::g0().value - constants::G0_MPS2).abs() < 1e-12);
    }

    #[test]
    fn kinematic_viscosity_is_stored_in_m2_per_s() {
        let nu = m2ps(1.0e-6);
        assert!((nu.value - 1.0e-6).abs() < 1e-18);
        let water = cp(1.0).value / kgpm3(1000.0).value;
        assert!((m2ps(water).value - nu.value).abs() < 1e-15);
    }
}
