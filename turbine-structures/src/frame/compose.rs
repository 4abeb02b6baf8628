//! Merging the tower onto the platform

use log::debug;
use serde::{Deserialize, Serialize};

use super::assembly::{closest_node, weighted_mean, FrameElement, FrameModel, PlatformModel};
use crate::config::FrameLimits;
use crate::error::{StructuresError, StructuresResult};

/// Point masses and positions needed to combine platform and tower
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositionInputs {
    pub transition_node: [f64; 3],
    pub hub_node: [f64; 3],
    pub transition_piece_mass: f64,
    pub rna_mass: f64,
    /// RNA center of gravity relative to the hub node (m)
    pub rna_cg: [f64; 3],
    /// Sea water density (kg/m³)
    pub rho_water: f64,
}

/// The combined platform and tower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemModel {
    pub frame: FrameModel,
    /// Platform node the tower base is attached to
    pub transition_index: usize,
    /// Ballast needed for the platform to float at its design draft (kg)
    pub variable_ballast_mass: f64,
}

/// Attach the tower on top of the platform
///
/// The tower's first node is the transition point. It is replaced by the
/// platform node nearest the transition coordinate and the remaining tower
/// nodes are appended after the platform's.
pub fn compose_system(
    platform: &PlatformModel,
    tower: &FrameModel,
    inputs: &CompositionInputs,
    limits: &FrameLimits,
) -> StructuresResult<SystemModel> {
    let plat = &platform.frame;
    let itrans = closest_node(&plat.nodes, inputs.transition_node)?;
    if tower.nodes.is_empty() {
        return Err(StructuresError::GeometryLookup(
            "tower has no transition node".to_string(),
        ));
    }

    let n_platform = plat.n_nodes();
    let offset = n_platform - 1;
    let reindex = |n: usize| if n == 0 { itrans } else { n + offset };

    let mut nodes = plat.nodes.clone();
    nodes.extend_from_slice(&tower.nodes[1..]);
    let mut node_forces = plat.node_forces.clone();
    node_forces.extend(tower.node_forces.iter().skip(1));
    let mut node_radii = plat.node_radii.clone();
    node_radii.extend(tower.node_radii.iter().skip(1));

    let mut elements = plat.elements.clone();
    elements.extend(tower.elements.iter().map(|el| FrameElement {
        n1: reindex(el.n1),
        n2: reindex(el.n2),
        section: el.section,
    }));

    let mass = plat.mass + tower.mass + inputs.rna_mass + inputs.transition_piece_mass;
    let rna_position = [
        inputs.rna_cg[0] + inputs.hub_node[0],
        inputs.rna_cg[1] + inputs.hub_node[1],
        inputs.rna_cg[2] + inputs.hub_node[2],
    ];
    let center_of_mass = weighted_mean(
        [
            (plat.mass, plat.center_of_mass),
            (tower.mass, tower.center_of_mass),
            (inputs.rna_mass, rna_position),
            (inputs.transition_piece_mass, inputs.transition_node),
        ],
        "system center of mass",
    )?;

    let frame = FrameModel {
        nodes,
        node_radii,
        node_forces,
        elements,
        mass,
        cost: plat.cost + tower.cost,
        center_of_mass,
    };
    frame.check_capacity(limits)?;

    let variable_ballast_mass = platform.displacement * inputs.rho_water - mass;
    debug!(
        "Composed system: {} nodes, {} elements, transition node {}, variable ballast {:.4e} kg",
        frame.n_nodes(),
        frame.n_elements(),
        itrans,
        variable_ballast_mass
    );

    Ok(SystemModel {
        frame,
        transition_index: itrans,
        variable_ballast_mass,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::assembly::{tower_frame, PlatformFrame};
    use crate::frame::member::{MemberModel, MemberSection};
    use approx::assert_relative_eq;

    fn section() -> MemberSection {
        MemberSection::tube(6.0, 0.05, 200e9, 79.3e9, 7850.0)
    }

    fn platform() -> PlatformModel {
        let column = MemberModel::uniform(
            vec![[0.0, 0.0, -20.0], [0.0, 0.0, -10.0], [0.0, 0.0, 10.0]],
            5.0,
            section(),
        )
        .with_mass(3.0e6, [0.0, 0.0, -15.0])
        .with_buoyancy(1, 4000.0, [0.0, 0.0, -10.0], 4.0e7);
        let pontoon = MemberModel::uniform(
            vec![[0.0, 0.0, -20.0], [30.0, 0.0, -20.0]],
            2.0,
            section(),
        )
        .with_mass(5.0e5, [15.0, 0.0, -20.0])
        .with_buoyancy(0, 400.0, [15.0, 0.0, -20.0], 0.0);
        PlatformFrame::new(FrameLimits::default())
            .assemble(&[column, pontoon])
            .unwrap()
    }

    fn inputs() -> CompositionInputs {
        CompositionInputs {
            transition_node: [0.0, 0.0, 10.0],
            hub_node: [0.0, 0.0, 150.0],
            transition_piece_mass: 1.0e5,
            rna_mass: 6.0e5,
            rna_cg: [-5.0, 0.0, 2.0],
            rho_water: 1025.0,
        }
    }

    #[test]
    fn test_two_node_tower() {
        let plat = platform();
        let tower_member = MemberModel::uniform(
            vec![[0.0, 0.0, 10.0], [0.0, 0.0, 150.0]],
            3.0,
            section(),
        )
        .with_mass(1.0e6, [0.0, 0.0, 60.0]);
        let tower = tower_frame(&tower_member, &FrameLimits::default()).unwrap();

        let system = compose_system(&plat, &tower, &inputs(), &FrameLimits::default()).unwrap();
        let m = plat.frame.n_nodes();

        assert_eq!(system.frame.n_nodes(), m + 2 - 1);
        assert_eq!(system.frame.n_elements(), plat.frame.n_elements() + 1);
        let itrans = closest_node(&plat.frame.nodes, [0.0, 0.0, 10.0]).unwrap();
        assert_eq!(system.transition_index, itrans);
        let first_tower = system.frame.elements[plat.frame.n_elements()];
        assert_eq!(first_tower.n1, itrans);
        assert_eq!(first_tower.n2, m);
        assert_eq!(system.frame.nodes[m], [0.0, 0.0, 150.0]);
    }

    #[test]
    fn test_mass_and_ballast() {
        let plat = platform();
        let tower_member = MemberModel::uniform(
            vec![[0.0, 0.0, 10.0], [0.0, 0.0, 80.0], [0.0, 0.0, 150.0]],
            3.0,
            section(),
        )
        .with_mass(1.0e6, [0.0, 0.0, 60.0]);
        let tower = tower_frame(&tower_member, &FrameLimits::default()).unwrap();
        let system = compose_system(&plat, &tower, &inputs(), &FrameLimits::default()).unwrap();

        let mass = 3.5e6 + 1.0e6 + 6.0e5 + 1.0e5;
        assert_relative_eq!(system.frame.mass, mass);
        let com_z = (3.0e6 * -15.0 + 5.0e5 * -20.0 + 1.0e6 * 60.0 + 6.0e5 * 152.0 + 1.0e5 * 10.0)
            / mass;
        assert_relative_eq!(system.frame.center_of_mass[2], com_z, max_relative = 1e-12);
        assert_relative_eq!(
            system.frame.center_of_mass[0],
            (5.0e5 * 15.0 + 6.0e5 * -5.0) / mass,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            system.variable_ballast_mass,
            4400.0 * 1025.0 - mass,
            max_relative = 1e-12
        );
        // tower elements past the first keep their offset indices
        let tower_elements = &system.frame.elements[plat.frame.n_elements()..];
        assert_eq!(tower_elements[1].n1, plat.frame.n_nodes());
        assert_eq!(tower_elements[1].n2, plat.frame.n_nodes() + 1);
    }

    #[test]
    fn test_leaning_tower_keeps_its_top() {
        let column = MemberModel::uniform(
            vec![[5.0, 0.0, -20.0], [5.0, 0.0, 10.0]],
            5.0,
            section(),
        )
        .with_mass(2.0e6, [5.0, 0.0, -5.0])
        .with_buoyancy(0, 2000.0, [5.0, 0.0, -10.0], 2.0e7);
        let plat = PlatformFrame::new(FrameLimits::default())
            .assemble(&[column])
            .unwrap();
        // the base does not sort first by coordinate
        let tower_member = MemberModel::uniform(
            vec![[5.0, 0.0, 10.0], [2.5, 0.0, 55.0], [0.0, 0.0, 100.0]],
            3.0,
            section(),
        )
        .with_mass(8.0e5, [2.5, 0.0, 55.0]);
        let tower = tower_frame(&tower_member, &FrameLimits::default()).unwrap();
        assert_eq!(tower.nodes[0], [5.0, 0.0, 10.0]);

        let inputs = CompositionInputs {
            transition_node: [5.0, 0.0, 10.0],
            hub_node: [0.0, 0.0, 100.0],
            ..inputs()
        };
        let system = compose_system(&plat, &tower, &inputs, &FrameLimits::default()).unwrap();

        let nodes = &system.frame.nodes;
        assert_eq!(
            nodes,
            &vec![
                [5.0, 0.0, -20.0],
                [5.0, 0.0, 10.0],
                [2.5, 0.0, 55.0],
                [0.0, 0.0, 100.0]
            ]
        );
        assert_eq!(system.transition_index, 1);
        let tower_elements: Vec<(usize, usize)> = system.frame.elements[1..]
            .iter()
            .map(|el| (el.n1, el.n2))
            .collect();
        assert_eq!(tower_elements, vec![(1, 2), (2, 3)]);
        assert_eq!(system.frame.element_lengths().unwrap().len(), 3);
    }

    #[test]
    fn test_capacity_of_combined_frame() {
        let plat = platform();
        let tower_member = MemberModel::uniform(
            vec![[0.0, 0.0, 10.0], [0.0, 0.0, 80.0], [0.0, 0.0, 150.0]],
            3.0,
            section(),
        )
        .with_mass(1.0e6, [0.0, 0.0, 60.0]);
        let tower = tower_frame(&tower_member, &FrameLimits::default()).unwrap();
        let limits = FrameLimits::default().with_max_nodes(plat.frame.n_nodes() + 1);
        let err = compose_system(&plat, &tower, &inputs(), &limits).unwrap_err();
        assert!(matches!(
            err,
            StructuresError::CapacityExceeded { what: "node", .. }
        ));
    }
}
