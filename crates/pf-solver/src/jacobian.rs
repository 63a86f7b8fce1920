//! Finite difference Jacobian.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

/// Forward-difference Jacobian of `f` at `x`.
///
/// Column `j` is perturbed by `epsilon * max(|x_j|, floor_j)`, so variables
/// sitting at zero still get a step sized to their own scale.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
    floor: &[f64],
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    if floor.len() != n {
        return Err(SolverError::NumericalError {
            what: format!("jacobian floor has {} entries for {} variables", floor.len(), n),
        });
    }
    let f_x = f(x)?;
    let mut jac = DMatrix::zeros(f_x.len(), n);

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(floor[j]);
        if dx <= 0.0 || !dx.is_finite() {
            return Err(SolverError::NumericalError {
                what: format!("zero finite-difference step for variable {j}"),
            });
        }
        let mut x_step = x.clone();
        x_step[j] += dx;
        let df = (f(&x_step)? - &f_x) / dx;
        jac.set_column(j, &df);
    }

    Ok(jac)
}
