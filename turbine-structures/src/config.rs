//! Configuration for assembly, frame analysis and rail transport

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StructuresResult;

/// Standard gravitational acceleration used throughout (m/s²)
pub const GRAVITY: f64 = 9.80633;

/// Load any configuration struct from JSON; missing fields take defaults
pub fn from_json<T: DeserializeOwned>(json: &str) -> StructuresResult<T> {
    Ok(serde_json::from_str(json)?)
}

/// Capacity limits and node matching for frame assembly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLimits {
    /// Maximum number of nodes in any assembled frame
    pub max_nodes: usize,
    /// Maximum number of elements in any assembled frame
    pub max_elements: usize,
    /// Penalty stiffness of rigid supports
    pub rigid_stiffness: f64,
    /// Decimal places coordinates are rounded to before node deduplication
    pub node_decimals: i32,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_nodes: 1000,
            max_elements: 1000,
            rigid_stiffness: 1e30,
            node_decimals: 4,
        }
    }
}

impl FrameLimits {
    /// Set node capacity
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Set element capacity
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }
}

/// Options for the tower and system frame solves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameAnalysisConfig {
    /// Include shear deformation
    pub shear: bool,
    /// Include geometric stiffness
    pub geometric_stiffness: bool,
    /// Number of modes to extract
    pub n_modes: usize,
    /// Eigen solver tolerance
    pub modal_tolerance: f64,
    /// Gravitational acceleration (m/s²), acting in -z
    pub gravity: f64,
}

impl Default for FrameAnalysisConfig {
    fn default() -> Self {
        Self {
            shear: true,
            geometric_stiffness: true,
            n_modes: 10,
            modal_tolerance: 1e-7,
            gravity: GRAVITY,
        }
    }
}

impl FrameAnalysisConfig {
    /// Set the shear deformation flag
    pub fn with_shear(mut self, shear: bool) -> Self {
        self.shear = shear;
        self
    }

    /// Set the geometric stiffness flag
    pub fn with_geometric_stiffness(mut self, geom: bool) -> Self {
        self.geometric_stiffness = geom;
        self
    }

    /// Set the number of modes
    pub fn with_modes(mut self, n_modes: usize, tolerance: f64) -> Self {
        self.n_modes = n_modes;
        self.modal_tolerance = tolerance;
        self
    }
}

/// Rail and flatcar limits for blade transport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailTransportConfig {
    /// Horizontal turn angle over one rail chord (deg)
    pub horizontal_angle_deg: f64,
    /// Lateral clearance envelope width (m), 22 ft
    pub lateral_clearance: f64,
    /// Vertical clearance envelope height (m), 23 ft
    pub vertical_clearance: f64,
    /// Maximum allowable strain during transport
    pub max_strains: f64,
    /// Maximum allowable lateral to vertical force ratio
    pub max_lv: f64,
    /// Maximum weight of a 4-axle flatcar (kg)
    pub max_flatcar_weight_4axle: f64,
    /// Maximum weight of an 8-axle flatcar (kg)
    pub max_flatcar_weight_8axle: f64,
    /// Maximum root rotation (deg)
    pub max_root_rot_deg: f64,
    /// Flatcar truck center to truck center length (m)
    pub flatcar_tc_length: f64,
    /// Number of load-scaling stations
    pub n_opt: usize,
    /// Samples per rail curve
    pub n_points: usize,
    /// Rail chord the turn angle is defined over (m), 100 ft
    pub rail_chord_length: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
}

impl Default for RailTransportConfig {
    fn default() -> Self {
        Self {
            horizontal_angle_deg: 13.0,
            lateral_clearance: 6.7056,
            vertical_clearance: 7.0104,
            max_strains: 3500e-6,
            max_lv: 0.5,
            max_flatcar_weight_4axle: 129727.31,
            max_flatcar_weight_8axle: 217724.16,
            max_root_rot_deg: 15.0,
            flatcar_tc_length: 20.12,
            n_opt: 21,
            n_points: 10000,
            rail_chord_length: 30.48,
            gravity: GRAVITY,
        }
    }
}

impl RailTransportConfig {
    /// Set the lateral clearance
    pub fn with_lateral_clearance(mut self, clearance: f64) -> Self {
        self.lateral_clearance = clearance;
        self
    }

    /// Set the horizontal turn angle
    pub fn with_horizontal_angle(mut self, angle_deg: f64) -> Self {
        self.horizontal_angle_deg = angle_deg;
        self
    }

    /// Set the strain limit
    pub fn with_max_strains(mut self, max_strains: f64) -> Self {
        self.max_strains = max_strains;
        self
    }

    /// Set the number of load-scaling stations
    pub fn with_stations(mut self, n_opt: usize) -> Self {
        self.n_opt = n_opt;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: RailTransportConfig =
            from_json(r#"{ "lateral_clearance": 5.0, "n_opt": 11 }"#).unwrap();
        assert_eq!(config.lateral_clearance, 5.0);
        assert_eq!(config.n_opt, 11);
        assert_eq!(config.max_strains, 3500e-6);
        assert_eq!(config.n_points, 10000);
    }

    #[test]
    fn test_frame_limits_defaults() {
        let limits = FrameLimits::default();
        assert_eq!(limits.max_nodes, 1000);
        assert_eq!(limits.max_elements, 1000);
        assert_eq!(limits.rigid_stiffness, 1e30);
        assert_eq!(limits.node_decimals, 4);
    }
}
