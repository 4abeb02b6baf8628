//! Node - a point in 3D space with an effective joint radius

use serde::{Deserialize, Serialize};

/// A 3D node in the frame model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node index, used by elements, reactions, masses and loads
    pub id: usize,
    /// X coordinate (m)
    pub x: f64,
    /// Y coordinate (m)
    pub y: f64,
    /// Z coordinate (m), positive up
    pub z: f64,
    /// Effective joint radius (m), used to size rigid element ends
    pub r: f64,
}

impl Node {
    /// Create a new node
    pub fn new(id: usize, x: f64, y: f64, z: f64, r: f64) -> Self {
        Self { id, x, y, z, r }
    }

    /// Create a node from a coordinate triple
    pub fn from_coords(id: usize, xyz: [f64; 3], r: f64) -> Self {
        Self::new(id, xyz[0], xyz[1], xyz[2], r)
    }

    /// Get the coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new(3, 1.0, 2.0, 3.0, 0.5);
        assert_eq!(node.id, 3);
        assert_eq!(node.coords(), [1.0, 2.0, 3.0]);
        assert_eq!(node.r, 0.5);
    }

    #[test]
    fn test_node_distance() {
        let n1 = Node::new(0, 0.0, 0.0, 0.0, 0.0);
        let n2 = Node::new(1, 3.0, 0.0, 4.0, 0.0);
        assert!((n1.distance_to(&n2) - 5.0).abs() < 1e-10);
    }
}
