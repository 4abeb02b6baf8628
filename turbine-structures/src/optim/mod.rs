//! Bound and inequality constrained nonlinear optimization

pub mod penalty;

use serde::{Deserialize, Serialize};

use crate::error::{StructuresError, StructuresResult};

/// A problem of the form: minimize f(x) subject to g(x) >= 0 and bounds
pub trait NonlinearProblem {
    fn objective(&self, x: &[f64]) -> StructuresResult<f64>;

    /// Inequality constraints; every value must be non-negative
    fn constraints(&self, x: &[f64]) -> StructuresResult<Vec<f64>>;
}

/// Box bounds on the design variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> StructuresResult<Self> {
        if lower.len() != upper.len() {
            return Err(StructuresError::InvalidInput(format!(
                "{} lower bounds for {} upper bounds",
                lower.len(),
                upper.len()
            )));
        }
        if let Some(i) = (0..lower.len()).find(|&i| lower[i] > upper[i]) {
            return Err(StructuresError::InvalidInput(format!(
                "variable {} has lower bound {} above upper bound {}",
                i, lower[i], upper[i]
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Largest distance of `x` outside the box, zero inside
    pub fn max_violation(&self, x: &[f64]) -> f64 {
        let mut max_viol: f64 = 0.0;
        for ((&xi, &lb), &ub) in x.iter().zip(&self.lower).zip(&self.upper) {
            if xi < lb {
                max_viol = max_viol.max(lb - xi);
            }
            if xi > ub {
                max_viol = max_viol.max(xi - ub);
            }
        }
        max_viol
    }

    /// Squared Euclidean distance from `x` to the box
    pub fn squared_distance(&self, x: &[f64]) -> f64 {
        x.iter()
            .zip(&self.lower)
            .zip(&self.upper)
            .map(|((&xi, &lb), &ub)| {
                let d = (lb - xi).max(xi - ub).max(0.0);
                d * d
            })
            .sum()
    }

    /// Clamp `x` into the box
    pub fn project(&self, x: &mut [f64]) {
        for ((xi, &lb), &ub) in x.iter_mut().zip(&self.lower).zip(&self.upper) {
            *xi = xi.max(lb).min(ub);
        }
    }
}

/// Largest violation of g(x) >= 0, zero when feasible
pub fn max_constraint_violation(g: &[f64]) -> f64 {
    g.iter().fold(0.0, |acc: f64, &gi| acc.max(-gi))
}

/// Outcome of a constrained solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResult {
    pub x: Vec<f64>,
    pub objective: f64,
    /// Whether every constraint and bound is met within tolerance
    pub success: bool,
    pub message: String,
    pub iterations: u64,
    pub max_violation: f64,
}

/// A solver for [`NonlinearProblem`]s
pub trait ConstrainedOptimizer {
    fn minimize<P: NonlinearProblem>(
        &self,
        problem: &P,
        x0: Vec<f64>,
        bounds: &Bounds,
    ) -> StructuresResult<OptimizeResult>;
}
