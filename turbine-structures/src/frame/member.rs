//! Member models contributed by each physical platform component

use std::f64::consts::PI;

use frame_solver::elements::SectionProperties;
use serde::{Deserialize, Serialize};

use crate::error::{StructuresError, StructuresResult};

/// Section and material properties of one member element
///
/// `ixx` and `iyy` are the bending moments of area about the section axes
/// and `izz` the torsional constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberSection {
    pub a: f64,
    pub asx: f64,
    pub asy: f64,
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
    pub rho: f64,
    pub e: f64,
    pub g: f64,
}

impl MemberSection {
    /// Thin-walled circular tube
    pub fn tube(outer_diameter: f64, wall_thickness: f64, e: f64, g: f64, rho: f64) -> Self {
        let ro = 0.5 * outer_diameter;
        let ri = ro - wall_thickness;
        let a = PI * (ro * ro - ri * ri);
        let i = PI / 4.0 * (ro.powi(4) - ri.powi(4));
        Self {
            a,
            asx: 0.5 * a,
            asy: 0.5 * a,
            ixx: i,
            iyy: i,
            izz: 2.0 * i,
            rho,
            e,
            g,
        }
    }

    /// Properties in the solver's element axes
    ///
    /// The member x axis carries the solver's local y shear area, the
    /// member z axis is the torsional one.
    pub fn to_solver_section(&self) -> SectionProperties {
        SectionProperties {
            a: self.a,
            asy: self.asx,
            asz: self.asy,
            jx: self.izz,
            iy: self.ixx,
            iz: self.iyy,
            e: self.e,
            g: self.g,
            rho: self.rho,
        }
    }
}

/// The structural model of one member
///
/// Nodes are ordered along the member; element `i` joins nodes `i` and
/// `i + 1` and uses `sections[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberModel {
    /// Node coordinates (m)
    pub nodes: Vec<[f64; 3]>,
    /// Effective radius at each node (m)
    pub radii: Vec<f64>,
    /// Per-element section properties
    pub sections: Vec<MemberSection>,
    /// Local index of the center of buoyancy node
    pub idx_cb: usize,
    /// Buoyancy force (N), acting in +z at the center of buoyancy node
    pub buoyancy_force: f64,
    /// Displaced volume (m³)
    pub displacement: f64,
    pub center_of_buoyancy: [f64; 3],
    pub center_of_mass: [f64; 3],
    pub total_mass: f64,
    pub total_cost: f64,
    /// Waterplane area (m²)
    pub awater: f64,
    /// Waterplane moment of inertia (m⁴)
    pub iwater: f64,
    pub added_mass: [f64; 6],
}

impl MemberModel {
    /// A member with the same radius and section everywhere and no mass,
    /// cost or hydrostatics yet
    pub fn uniform(nodes: Vec<[f64; 3]>, radius: f64, section: MemberSection) -> Self {
        let n = nodes.len();
        Self {
            radii: vec![radius; n],
            sections: vec![section; n.saturating_sub(1)],
            nodes,
            idx_cb: 0,
            buoyancy_force: 0.0,
            displacement: 0.0,
            center_of_buoyancy: [0.0; 3],
            center_of_mass: [0.0; 3],
            total_mass: 0.0,
            total_cost: 0.0,
            awater: 0.0,
            iwater: 0.0,
            added_mass: [0.0; 6],
        }
    }

    /// Set the total mass and its center
    pub fn with_mass(mut self, total_mass: f64, center_of_mass: [f64; 3]) -> Self {
        self.total_mass = total_mass;
        self.center_of_mass = center_of_mass;
        self
    }

    /// Set the buoyancy node, displaced volume and buoyancy force
    pub fn with_buoyancy(
        mut self,
        idx_cb: usize,
        displacement: f64,
        center_of_buoyancy: [f64; 3],
        buoyancy_force: f64,
    ) -> Self {
        self.idx_cb = idx_cb;
        self.displacement = displacement;
        self.center_of_buoyancy = center_of_buoyancy;
        self.buoyancy_force = buoyancy_force;
        self
    }

    /// Set the cost
    pub fn with_cost(mut self, total_cost: f64) -> Self {
        self.total_cost = total_cost;
        self
    }

    /// Set the waterplane properties and added mass
    pub fn with_hydrostatics(mut self, awater: f64, iwater: f64, added_mass: [f64; 6]) -> Self {
        self.awater = awater;
        self.iwater = iwater;
        self.added_mass = added_mass;
        self
    }

    pub fn n_elements(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Check array lengths against the node count
    pub(crate) fn validate(&self, member: usize) -> StructuresResult<()> {
        let n = self.nodes.len();
        if n < 2 {
            return Err(StructuresError::InvalidInput(format!(
                "member {} needs at least 2 nodes, got {}",
                member, n
            )));
        }
        if self.radii.len() != n {
            return Err(StructuresError::InvalidInput(format!(
                "member {} has {} radii for {} nodes",
                member,
                self.radii.len(),
                n
            )));
        }
        if self.sections.len() != n - 1 {
            return Err(StructuresError::InvalidInput(format!(
                "member {} has {} sections for {} elements",
                member,
                self.sections.len(),
                n - 1
            )));
        }
        if self.idx_cb >= n {
            return Err(StructuresError::GeometryLookup(format!(
                "member {} center of buoyancy index {} is outside its {} nodes",
                member, self.idx_cb, n
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solver_section_axes() {
        let section = MemberSection {
            a: 1.0,
            asx: 2.0,
            asy: 3.0,
            ixx: 4.0,
            iyy: 5.0,
            izz: 6.0,
            rho: 7.0,
            e: 8.0,
            g: 9.0,
        };
        let props = section.to_solver_section();
        assert_eq!(props.asy, 2.0);
        assert_eq!(props.asz, 3.0);
        assert_eq!(props.iy, 4.0);
        assert_eq!(props.iz, 5.0);
        assert_eq!(props.jx, 6.0);
    }

    #[test]
    fn test_tube_torsion_is_twice_bending() {
        let section = MemberSection::tube(6.0, 0.03, 200e9, 79.3e9, 7850.0);
        assert_relative_eq!(section.izz, 2.0 * section.ixx);
        assert_relative_eq!(section.asx, 0.5 * section.a);
    }

    #[test]
    fn test_validate_rejects_bad_buoyancy_index() {
        let section = MemberSection::tube(6.0, 0.03, 200e9, 79.3e9, 7850.0);
        let member = MemberModel::uniform(vec![[0.0; 3], [0.0, 0.0, 1.0]], 3.0, section)
            .with_buoyancy(2, 1.0, [0.0; 3], 1.0);
        assert!(matches!(
            member.validate(0),
            Err(StructuresError::GeometryLookup(_))
        ));
    }
}
