//! Reaction (support) conditions

use serde::{Deserialize, Serialize};

/// Support springs at a node
///
/// Each of the six DOFs `[DX, DY, DZ, RX, RY, RZ]` carries a spring
/// stiffness. Zero means free. A stiffness at or above `rigid` marks the
/// DOF as fixed: it still enters the static stiffness as a penalty spring,
/// and it is removed from the modal eigenproblem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Supported node id
    pub node: usize,
    /// Spring stiffness per DOF (N/m, N·m/rad)
    pub stiffness: [f64; 6],
    /// Threshold at which a spring counts as a rigid restraint
    pub rigid: f64,
}

impl Reaction {
    /// Fully fixed support using a penalty stiffness on all six DOFs
    pub fn rigid(node: usize, rigid: f64) -> Self {
        Self {
            node,
            stiffness: [rigid; 6],
            rigid,
        }
    }

    /// Support with explicit per-DOF springs
    pub fn with_stiffness(node: usize, stiffness: [f64; 6], rigid: f64) -> Self {
        Self {
            node,
            stiffness,
            rigid,
        }
    }

    /// Whether the DOF has any restraint
    pub fn is_supported(&self, dof: usize) -> bool {
        self.stiffness[dof] > 0.0
    }

    /// Whether the DOF counts as fixed
    pub fn is_fixed(&self, dof: usize) -> bool {
        self.stiffness[dof] >= self.rigid
    }
}
