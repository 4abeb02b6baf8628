//! Two-phase penalty method with L-BFGS inner solves
//!
//! The first phase minimizes the constraint shortfall alone to reach a
//! feasible point. The later stages then minimize
//!
//! ```text
//! P_μ(x) = f(Πx) + μ · Σ min(0, g_i(Πx) - δ)² + μ · ‖x - Πx‖²
//! ```
//!
//! with increasing μ, where `Π` projects onto the bounds and `δ` is a small
//! margin that keeps the penalty minimizer inside the feasible set. Every
//! evaluated point is checked against the unshifted constraints and the
//! feasible one with the lowest objective is returned.
//!
//! Gradients are the smaller of the forward and backward differences, and
//! zero when they disagree in sign. A constraint that steps between
//! samples, such as a nearest-sample curve lookup, then only affects one
//! side and does not swamp the gradient.

use std::cell::RefCell;

use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    max_constraint_violation, Bounds, ConstrainedOptimizer, NonlinearProblem, OptimizeResult,
};
use crate::error::{StructuresError, StructuresResult};

/// Penalty method settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyLbfgs {
    /// Total L-BFGS iterations, split evenly across the feasibility phase
    /// and the penalty stages
    pub max_iterations: u64,
    /// Largest constraint violation accepted as feasible
    pub tolerance: f64,
    /// Shift applied to every constraint while penalizing
    pub constraint_margin: f64,
    pub initial_penalty: f64,
    pub penalty_increase: f64,
    pub penalty_stages: usize,
    /// Number of correction pairs kept by L-BFGS
    pub memory: usize,
    /// Gradient norm at which an inner solve stops
    pub gradient_tolerance: f64,
    /// Finite difference step
    pub fd_step: f64,
}

impl Default for PenaltyLbfgs {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-4,
            constraint_margin: 1e-2,
            initial_penalty: 10.0,
            penalty_increase: 10.0,
            penalty_stages: 6,
            memory: 7,
            gradient_tolerance: 1e-6,
            fd_step: 1e-7,
        }
    }
}

impl PenaltyLbfgs {
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_constraint_margin(mut self, margin: f64) -> Self {
        self.constraint_margin = margin;
        self
    }

    pub fn with_penalty_schedule(mut self, initial: f64, increase: f64, stages: usize) -> Self {
        self.initial_penalty = initial;
        self.penalty_increase = increase;
        self.penalty_stages = stages;
        self
    }
}

/// What an inner solve minimizes
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Constraint shortfall and bound distance only
    Feasibility,
    /// Objective plus shortfall and bound distance scaled by μ
    Penalty(f64),
}

/// Points worth keeping across inner solves
#[derive(Debug, Default)]
struct Incumbents {
    /// Lowest objective among points within tolerance of feasible
    feasible: Option<(f64, Vec<f64>)>,
    /// Smallest constraint violation seen
    closest: Option<(f64, Vec<f64>)>,
    /// Lowest penalized cost of the current inner solve, unprojected
    stage: Option<(f64, Vec<f64>)>,
}

impl Incumbents {
    fn record(&mut self, x: &[f64], objective: f64, violation: f64, tolerance: f64) {
        if violation <= tolerance && self.feasible.as_ref().map_or(true, |(f, _)| objective < *f) {
            self.feasible = Some((objective, x.to_vec()));
        }
        if self.closest.as_ref().map_or(true, |(v, _)| violation < *v) {
            self.closest = Some((violation, x.to_vec()));
        }
    }

    fn record_stage(&mut self, cost: f64, x: &[f64]) {
        if self.stage.as_ref().map_or(true, |(c, _)| cost < *c) {
            self.stage = Some((cost, x.to_vec()));
        }
    }
}

/// Penalized objective handed to argmin
struct PenaltyProblem<'a, P> {
    problem: &'a P,
    bounds: &'a Bounds,
    phase: Phase,
    margin: f64,
    tolerance: f64,
    fd_step: f64,
    incumbents: &'a RefCell<Incumbents>,
}

impl<P: NonlinearProblem> CostFunction for PenaltyProblem<'_, P> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let mut inside = x.clone();
        self.bounds.project(&mut inside);
        let objective = self.problem.objective(&inside)?;
        let g = self.problem.constraints(&inside)?;
        if let Some(i) = g.iter().position(|gi| !gi.is_finite()) {
            return Err(StructuresError::NonFinite(format!("constraint {} is {}", i, g[i])).into());
        }

        let shortfall: f64 = g
            .iter()
            .map(|gi| {
                let s = (gi - self.margin).min(0.0);
                s * s
            })
            .sum();
        let outside = self.bounds.squared_distance(x);
        let cost = match self.phase {
            Phase::Feasibility => shortfall + outside,
            Phase::Penalty(mu) => objective + mu * (shortfall + outside),
        };
        if !cost.is_finite() {
            return Err(StructuresError::NonFinite(format!("penalized objective {}", cost)).into());
        }

        let mut incumbents = self.incumbents.borrow_mut();
        if objective.is_finite() {
            let violation = max_constraint_violation(&g);
            incumbents.record(&inside, objective, violation, self.tolerance);
        }
        incumbents.record_stage(cost, x);
        Ok(cost)
    }
}

impl<P: NonlinearProblem> Gradient for PenaltyProblem<'_, P> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        let f0 = self.cost(x)?;
        let h = self.fd_step;
        let mut grad = vec![0.0; x.len()];
        let mut shifted = x.clone();
        for (i, g) in grad.iter_mut().enumerate() {
            shifted[i] = x[i] + h;
            let forward = (self.cost(&shifted)? - f0) / h;
            shifted[i] = x[i] - h;
            let backward = (f0 - self.cost(&shifted)?) / h;
            shifted[i] = x[i];
            *g = if forward * backward <= 0.0 {
                0.0
            } else if forward.abs() < backward.abs() {
                forward
            } else {
                backward
            };
        }
        Ok(grad)
    }
}

impl PenaltyLbfgs {
    /// Run one inner L-BFGS solve from `x` and return where it ended
    fn run_phase<P: NonlinearProblem>(
        &self,
        problem: &P,
        bounds: &Bounds,
        phase: Phase,
        x: Vec<f64>,
        max_iters: u64,
        incumbents: &RefCell<Incumbents>,
    ) -> StructuresResult<(Vec<f64>, u64)> {
        incumbents.borrow_mut().stage = None;
        let penalty_problem = PenaltyProblem {
            problem,
            bounds,
            phase,
            margin: self.constraint_margin,
            tolerance: self.tolerance,
            fd_step: self.fd_step,
            incumbents,
        };
        let solver = LBFGS::new(MoreThuenteLineSearch::new(), self.memory)
            .with_tolerance_grad(self.gradient_tolerance)
            .map_err(|e| StructuresError::InvalidInput(e.to_string()))?;

        let executor = Executor::new(penalty_problem, solver)
            .configure(|state| state.param(x.clone()).max_iters(max_iters));

        match executor.run() {
            Ok(res) => {
                let iterations = res.state().get_iter();
                let end = res.state().get_best_param().cloned().unwrap_or(x);
                Ok((end, iterations))
            }
            Err(err) => match err.downcast::<StructuresError>() {
                Ok(problem_err) => Err(problem_err),
                Err(err) => {
                    debug!("{:?} phase stopped early: {}", phase, err);
                    let end = incumbents
                        .borrow_mut()
                        .stage
                        .take()
                        .map_or(x, |(_, best)| best);
                    Ok((end, 0))
                }
            },
        }
    }
}

impl ConstrainedOptimizer for PenaltyLbfgs {
    fn minimize<P: NonlinearProblem>(
        &self,
        problem: &P,
        x0: Vec<f64>,
        bounds: &Bounds,
    ) -> StructuresResult<OptimizeResult> {
        if x0.len() != bounds.len() {
            return Err(StructuresError::InvalidInput(format!(
                "initial guess has {} variables for {} bounds",
                x0.len(),
                bounds.len()
            )));
        }
        let stages = self.penalty_stages.max(1);
        let inner_max_iter = (self.max_iterations / (stages as u64 + 1)).max(1);
        let incumbents = RefCell::new(Incumbents::default());

        let (mut x, mut iterations) = self.run_phase(
            problem,
            bounds,
            Phase::Feasibility,
            x0,
            inner_max_iter,
            &incumbents,
        )?;
        if let Some((_, feasible)) = &incumbents.borrow().feasible {
            x = feasible.clone();
        }
        debug!(
            "Feasibility phase: {} iterations, feasible point found: {}",
            iterations,
            incumbents.borrow().feasible.is_some()
        );

        let mut penalty = self.initial_penalty;
        for stage in 0..stages {
            let (end, iters) = self.run_phase(
                problem,
                bounds,
                Phase::Penalty(penalty),
                x,
                inner_max_iter,
                &incumbents,
            )?;
            x = end;
            iterations += iters;
            debug!(
                "Penalty stage {}: mu {:.1e}, best feasible objective {:?}",
                stage,
                penalty,
                incumbents.borrow().feasible.as_ref().map(|(f, _)| *f)
            );
            penalty *= self.penalty_increase;
        }

        let incumbents = incumbents.into_inner();
        let (mut x, success) = match (incumbents.feasible, incumbents.closest) {
            (Some((_, best)), _) => (best, true),
            (None, Some((_, closest))) => (closest, false),
            (None, None) => (x, false),
        };
        bounds.project(&mut x);
        let g = problem.constraints(&x)?;
        let max_violation = max_constraint_violation(&g);
        let message = if success {
            "Optimization terminated successfully".to_string()
        } else {
            format!(
                "Positive constraint violation {:.3e} after {} penalty stages",
                max_violation, stages
            )
        };

        Ok(OptimizeResult {
            objective: problem.objective(&x)?,
            x,
            success,
            message,
            iterations,
            max_violation,
        })
    }
}
