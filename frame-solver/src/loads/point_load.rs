//! Concentrated nodal loads

use serde::{Deserialize, Serialize};

/// A concentrated force and moment applied at a node, in global coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Loaded node id
    pub node: usize,
    /// Force `[FX, FY, FZ]` (N)
    pub force: [f64; 3],
    /// Moment `[MX, MY, MZ]` (N·m)
    pub moment: [f64; 3],
}

impl PointLoad {
    /// Create a new nodal load
    pub fn new(node: usize, force: [f64; 3], moment: [f64; 3]) -> Self {
        Self {
            node,
            force,
            moment,
        }
    }

    /// Pure force at a node
    pub fn force(node: usize, force: [f64; 3]) -> Self {
        Self::new(node, force, [0.0; 3])
    }

    /// Pure moment at a node
    pub fn moment(node: usize, moment: [f64; 3]) -> Self {
        Self::new(node, [0.0; 3], moment)
    }

    /// Get as array [FX, FY, FZ, MX, MY, MZ]
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.force[0],
            self.force[1],
            self.force[2],
            self.moment[0],
            self.moment[1],
            self.moment[2],
        ]
    }

    /// Whether every component is exactly zero
    pub fn is_zero(&self) -> bool {
        self.force.iter().chain(self.moment.iter()).all(|&v| v == 0.0)
    }
}
