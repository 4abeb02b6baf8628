//! Frame element - 3D beam between two nodes

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Cross-section and material properties of a frame element
///
/// Bending and shear follow the element's local axes: `iy`/`asz` govern
/// bending in the local x-z plane, `iz`/`asy` bending in the local x-y plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Cross-sectional area (m²)
    pub a: f64,
    /// Effective shear area in local y (m²); zero disables shear deformation
    pub asy: f64,
    /// Effective shear area in local z (m²); zero disables shear deformation
    pub asz: f64,
    /// Torsional constant (m⁴)
    pub jx: f64,
    /// Area moment of inertia about local y (m⁴)
    pub iy: f64,
    /// Area moment of inertia about local z (m⁴)
    pub iz: f64,
    /// Young's modulus (Pa)
    pub e: f64,
    /// Shear modulus (Pa)
    pub g: f64,
    /// Mass density (kg/m³)
    pub rho: f64,
}

impl SectionProperties {
    /// Thin or thick walled circular tube
    pub fn tube(outer_diameter: f64, wall_thickness: f64, e: f64, g: f64, rho: f64) -> Self {
        let r_o = outer_diameter / 2.0;
        let r_i = r_o - wall_thickness;

        let a = PI * (r_o.powi(2) - r_i.powi(2));
        let i = PI * (r_o.powi(4) - r_i.powi(4)) / 4.0;

        Self {
            a,
            asy: a / 2.0,
            asz: a / 2.0,
            jx: 2.0 * i,
            iy: i,
            iz: i,
            e,
            g,
            rho,
        }
    }

    /// Mass per unit length (kg/m)
    pub fn mass_per_length(&self) -> f64 {
        self.rho * self.a
    }
}

/// A 3D frame element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element index
    pub id: usize,
    /// Start node id
    pub n1: usize,
    /// End node id
    pub n2: usize,
    /// Section and material properties
    pub section: SectionProperties,
    /// Rotation about the longitudinal axis (radians)
    pub roll: f64,
}

impl Element {
    /// Create a new element without roll
    pub fn new(id: usize, n1: usize, n2: usize, section: SectionProperties) -> Self {
        Self {
            id,
            n1,
            n2,
            section,
            roll: 0.0,
        }
    }

    /// Set element rotation about its longitudinal axis
    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }
}
