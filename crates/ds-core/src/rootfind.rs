//! Bounded scalar root finding.
//!
//! Both nonlinear searches in the engine (the zone internal-pressure balance
//! and the target-air-change-rate opening search) go through the single
//! bisection utility here. The caller supplies a bracket; a bracket whose
//! endpoints do not straddle zero is rejected up front rather than iterated
//! on, and running out of iterations is an explicit failure variant.

use crate::error::CoreError;
use crate::numeric::Real;

/// Iteration bounds for [`solve_root`].
#[derive(Clone, Copy, Debug)]
pub struct RootConfig {
    /// Maximum bisection steps before giving up.
    pub max_iterations: usize,
    /// Absolute tolerance on the residual.
    pub abs_tol: Real,
    /// Label carried into error values.
    pub what: &'static str,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            abs_tol: 1e-9,
            what: "root",
        }
    }
}

/// Find `x` in `[lo, hi]` with `f(x) ~ 0` by bisection.
///
/// Requires `f(lo)` and `f(hi)` to have opposite signs (an endpoint residual
/// within tolerance is accepted directly). Returns
/// [`CoreError::NonConvergence`] if the interval cannot be narrowed to a
/// residual within `abs_tol` inside the iteration budget.
pub fn solve_root<F>(mut f: F, lo: Real, hi: Real, config: RootConfig) -> Result<Real, CoreError>
where
    F: FnMut(Real) -> Real,
{
    if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
        return Err(CoreError::InvalidArg {
            what: "solve_root bracket bounds",
        });
    }

    let mut a = lo;
    let mut b = hi;
    let mut fa = f(a);
    let fb = f(b);

    if fa.abs() <= config.abs_tol {
        return Ok(a);
    }
    if fb.abs() <= config.abs_tol {
        return Ok(b);
    }
    if fa.signum() == fb.signum() {
        return Err(CoreError::BracketInvalid {
            what: config.what,
            lo: a,
            hi: b,
        });
    }

    let mut mid = 0.5 * (a + b);
    let mut fmid = f(mid);
    for _ in 0..config.max_iterations {
        if fmid.abs() <= config.abs_tol {
            return Ok(mid);
        }
        if fmid.signum() == fa.signum() {
            a = mid;
            fa = fmid;
        } else {
            b = mid;
        }
        mid = 0.5 * (a + b);
        fmid = f(mid);
    }

    Err(CoreError::NonConvergence {
        what: config.what,
        iterations: config.max_iterations,
        residual: fmid,
    })
}
