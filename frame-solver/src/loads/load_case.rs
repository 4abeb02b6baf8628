//! Static load cases

use super::PointLoad;
use serde::{Deserialize, Serialize};

/// A static load case: uniform gravity plus nodal point loads
///
/// Gravity acts on element self-weight and, when enabled on the frame, on
/// extra node masses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticLoadCase {
    /// Gravitational acceleration vector (m/s²)
    pub gravity: [f64; 3],
    /// Nodal loads
    pub point_loads: Vec<PointLoad>,
}

impl StaticLoadCase {
    /// Create a load case with the given gravity vector and no point loads
    pub fn new(gravity: [f64; 3]) -> Self {
        Self {
            gravity,
            point_loads: Vec::new(),
        }
    }

    /// Add a point load
    pub fn add_point_load(&mut self, load: PointLoad) {
        self.point_loads.push(load);
    }

    /// Add many point loads at once
    pub fn add_point_loads<I>(&mut self, loads: I)
    where
        I: IntoIterator<Item = PointLoad>,
    {
        self.point_loads.extend(loads);
    }

    /// Sum of the nodal loads applied at a node, `[FX, FY, FZ, MX, MY, MZ]`
    pub fn nodal_load(&self, node: usize) -> [f64; 6] {
        let mut total = [0.0; 6];
        for load in self.point_loads.iter().filter(|l| l.node == node) {
            for (t, v) in total.iter_mut().zip(load.as_array()) {
                *t += v;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodal_load_sums_repeated_nodes() {
        let mut case = StaticLoadCase::new([0.0, 0.0, -9.81]);
        case.add_point_load(PointLoad::force(2, [1.0, 0.0, 0.0]));
        case.add_point_load(PointLoad::new(2, [0.5, 0.0, 0.0], [0.0, 0.0, 3.0]));
        case.add_point_load(PointLoad::force(1, [0.0, 7.0, 0.0]));

        assert_eq!(case.nodal_load(2), [1.5, 0.0, 0.0, 0.0, 0.0, 3.0]);
        assert_eq!(case.nodal_load(1), [0.0, 7.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(case.nodal_load(0), [0.0; 6]);
    }
}
