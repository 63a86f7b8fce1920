//! Common helpers for element calculations.

use crate::error::{ComponentError, ComponentResult};
use pf_core::numeric::ensure_finite;

/// Flows below this magnitude (m³/s) are treated as no flow.
pub const EPSILON_FLOW: f64 = 1e-12;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })
}

/// Finite and strictly positive, reported against the owning element.
pub fn check_positive(value: f64, element: &str, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidGeometry {
            element: element.to_string(),
            what,
            value,
        })
    }
}

/// Direction of a signed flow: 1.0 forward, -1.0 reverse, 0.0 for no flow.
pub fn flow_direction(q: f64) -> f64 {
    if q.abs() < EPSILON_FLOW {
        0.0
    } else if q > 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_direction() {
        assert_eq!(flow_direction(0.2), 1.0);
        assert_eq!(flow_direction(-0.2), -1.0);
        assert_eq!(flow_direction(0.0), 0.0);
        assert_eq!(flow_direction(1e-15), 0.0);
    }

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_check_positive() {
        assert_eq!(check_positive(0.3, "P1", "length"), Ok(0.3));
        let err = check_positive(-1.0, "P1", "length").unwrap_err();
        assert!(matches!(err, ComponentError::InvalidGeometry { what: "length", .. }));
    }
}
