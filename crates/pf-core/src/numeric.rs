use crate::PfError;

/// Floating point type used throughout the engine.
pub type Real = f64;

#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PfError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive; anything else is a geometry error.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, PfError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(PfError::InvalidGeometry { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances::default();
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        assert!(format!("{err}").contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert_eq!(ensure_positive(0.2, "diameter"), Ok(0.2));
        assert!(matches!(
            ensure_positive(0.0, "diameter"),
            Err(PfError::InvalidGeometry { what: "diameter", .. })
        ));
        assert!(matches!(
            ensure_positive(-1.0, "length"),
            Err(PfError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            ensure_positive(Real::INFINITY, "length"),
            Err(PfError::NonFinite { .. })
        ));
    }
}
