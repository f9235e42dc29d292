//! Tabulated functions of energy with linear interpolation.

use crate::error::{EvgError, EvgResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SplineTable")]
pub struct Spline {
    x:     Vec<f64>,
    y:     Vec<f64>,
    log_e: bool,
}

/// Unchecked serialized form; goes through `Spline::from_knots`.
#[derive(Deserialize)]
struct SplineTable {
    x:     Vec<f64>,
    y:     Vec<f64>,
    log_e: bool,
}

impl TryFrom<SplineTable> for Spline {
    type Error = EvgError;

    fn try_from(table: SplineTable) -> EvgResult<Self> {
        Self::from_knots(table.x, table.y, table.log_e)
    }
}

/// Check the arguments shared by every tabulation.
pub fn check_tabulation_args(knots: usize, emin: f64, emax: f64) -> EvgResult<()> {
    if !(emin > 0.0) {
        return Err(EvgError::InvalidSplineArgs { reason: format!("Emin = {emin} must be > 0") });
    }
    if !(emin < emax) {
        return Err(EvgError::InvalidSplineArgs {
            reason: format!("Emin = {emin} must be < Emax = {emax}"),
        });
    }
    if knots <= 2 {
        return Err(EvgError::InvalidSplineArgs {
            reason: format!("need more than 2 knots, got {knots}"),
        });
    }
    Ok(())
}

/// Knot positions spanning [emin, emax], linear or uniform in log E.
/// The end points are exactly emin and emax.
pub fn knot_energies(knots: usize, emin: f64, emax: f64, log_e: bool) -> Vec<f64> {
    let last = knots - 1;
    let mut energies: Vec<f64> = if log_e {
        let (lo, hi) = (emin.ln(), emax.ln());
        let step = (hi - lo) / last as f64;
        (0..knots).map(|i| (lo + i as f64 * step).exp()).collect()
    } else {
        let step = (emax - emin) / last as f64;
        (0..knots).map(|i| emin + i as f64 * step).collect()
    };
    energies[0] = emin;
    energies[last] = emax;
    energies
}

impl Spline {
    /// Build from knot pairs. `x` must be strictly increasing.
    pub fn from_knots(x: Vec<f64>, y: Vec<f64>, log_e: bool) -> EvgResult<Self> {
        if x.len() != y.len() || x.len() < 2 {
            return Err(EvgError::InvalidSplineArgs {
                reason: format!("{} x values vs {} y values", x.len(), y.len()),
            });
        }
        if x.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(EvgError::InvalidSplineArgs {
                reason: "knot energies are not strictly increasing".into(),
            });
        }
        Ok(Self { x, y, log_e })
    }

    /// Sample `f` at `knots` energies in [emin, emax].
    pub fn tabulate<F>(knots: usize, emin: f64, emax: f64, log_e: bool, mut f: F) -> EvgResult<Self>
    where
        F: FnMut(f64) -> f64,
    {
        check_tabulation_args(knots, emin, emax)?;
        let x = knot_energies(knots, emin, emax, log_e);
        let y = x.iter().map(|&e| f(e)).collect();
        Self::from_knots(x, y, log_e)
    }

    /// Linear interpolation between knots; zero outside the tabulated range.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.x.len();
        if !(x >= self.x[0] && x <= self.x[n - 1]) {
            return 0.0;
        }
        let i = self.x.partition_point(|&k| k <= x);
        if i >= n {
            return self.y[n - 1];
        }
        let (x0, x1) = (self.x[i - 1], self.x[i]);
        let (y0, y1) = (self.y[i - 1], self.y[i]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    pub fn n_knots(&self) -> usize {
        self.x.len()
    }

    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    pub fn is_log_e(&self) -> bool {
        self.log_e
    }

    pub fn knots(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}
