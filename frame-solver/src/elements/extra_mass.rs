//! Lumped mass and inertia attached to a node

use serde::{Deserialize, Serialize};

/// Rigid lumped mass attached to a node through a center-of-gravity offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtraNodeMass {
    /// Node id the mass is attached to
    pub node: usize,
    /// Mass (kg)
    pub mass: f64,
    /// Inertia about the mass center `[Ixx, Iyy, Izz, Ixy, Ixz, Iyz]` (kg·m²)
    pub inertia: [f64; 6],
    /// Offset of the mass center from the node (m)
    pub cg: [f64; 3],
}

impl ExtraNodeMass {
    /// Create a new extra node mass
    pub fn new(node: usize, mass: f64, inertia: [f64; 6], cg: [f64; 3]) -> Self {
        Self {
            node,
            mass,
            inertia,
            cg,
        }
    }

    /// Point mass without rotational inertia or offset
    pub fn point(node: usize, mass: f64) -> Self {
        Self::new(node, mass, [0.0; 6], [0.0; 3])
    }

    /// Weight force and its moment about the node for a gravity vector
    ///
    /// Returns `[FX, FY, FZ, MX, MY, MZ]`.
    pub fn gravity_load(&self, gravity: &[f64; 3]) -> [f64; 6] {
        let f = [
            self.mass * gravity[0],
            self.mass * gravity[1],
            self.mass * gravity[2],
        ];
        let c = &self.cg;
        [
            f[0],
            f[1],
            f[2],
            c[1] * f[2] - c[2] * f[1],
            c[2] * f[0] - c[0] * f[2],
            c[0] * f[1] - c[1] * f[0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_weight_moment() {
        let m = ExtraNodeMass::new(0, 100.0, [0.0; 6], [2.0, 0.0, 5.0]);
        let load = m.gravity_load(&[0.0, 0.0, -10.0]);
        assert_eq!(load[2], -1000.0);
        // r x F with r = (2, 0, 5), F = (0, 0, -1000)
        assert_eq!(load[3], 0.0);
        assert_eq!(load[4], 2000.0);
        assert_eq!(load[5], 0.0);
    }
}
