//! Analysis options

use serde::{Deserialize, Serialize};

/// Settings for the modal (eigenvalue) analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsOptions {
    /// Number of modes to report
    pub n_modes: usize,
    /// Convergence tolerance of the symmetric eigen solver
    pub tolerance: f64,
    /// Iteration cap for the eigen solver (0 = unlimited)
    pub max_iterations: usize,
}

impl DynamicsOptions {
    /// Create modal settings
    pub fn new(n_modes: usize, tolerance: f64) -> Self {
        Self {
            n_modes,
            tolerance,
            max_iterations: 0,
        }
    }
}

/// Options for structural analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Include shear deformation in element stiffness
    pub shear: bool,
    /// Include geometric stiffness (P-Delta iteration)
    pub geom: bool,
    /// Maximum iterations for P-Delta analysis
    pub max_iterations: usize,
    /// Convergence tolerance on displacements for P-Delta analysis
    pub tolerance: f64,
    /// Modal analysis settings, if enabled
    pub dynamics: Option<DynamicsOptions>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            shear: true,
            geom: false,
            max_iterations: 30,
            tolerance: 1e-9,
            dynamics: None,
        }
    }
}

impl AnalysisOptions {
    /// Set the shear deformation flag
    pub fn with_shear(mut self, shear: bool) -> Self {
        self.shear = shear;
        self
    }

    /// Set the geometric stiffness flag
    pub fn with_geometric_stiffness(mut self, geom: bool) -> Self {
        self.geom = geom;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Enable modal analysis
    pub fn with_dynamics(mut self, n_modes: usize, tolerance: f64) -> Self {
        self.dynamics = Some(DynamicsOptions::new(n_modes, tolerance));
        self
    }
}
