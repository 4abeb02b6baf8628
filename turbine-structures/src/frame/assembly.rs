//! Platform and tower frame models

use log::debug;
use serde::{Deserialize, Serialize};

use super::member::{MemberModel, MemberSection};
use super::topology::Topology;
use crate::config::FrameLimits;
use crate::error::{StructuresError, StructuresResult};

/// One frame element between two global nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameElement {
    pub n1: usize,
    pub n2: usize,
    pub section: MemberSection,
}

/// An assembled node and element model with its mass properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameModel {
    pub nodes: Vec<[f64; 3]>,
    /// Effective radius at each node (m)
    pub node_radii: Vec<f64>,
    /// Applied force at each node (N)
    pub node_forces: Vec<[f64; 3]>,
    pub elements: Vec<FrameElement>,
    pub mass: f64,
    pub cost: f64,
    pub center_of_mass: [f64; 3],
}

impl FrameModel {
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Length of every element
    pub fn element_lengths(&self) -> StructuresResult<Vec<f64>> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, el)| {
                match (self.nodes.get(el.n1), self.nodes.get(el.n2)) {
                    (Some(a), Some(b)) => Ok(distance(a, b)),
                    _ => Err(StructuresError::InvalidInput(format!(
                        "element {} references node {} or {} outside {} nodes",
                        i,
                        el.n1,
                        el.n2,
                        self.nodes.len()
                    ))),
                }
            })
            .collect()
    }

    /// Fail if the model no longer fits the configured capacity
    pub fn check_capacity(&self, limits: &FrameLimits) -> StructuresResult<()> {
        if self.nodes.len() > limits.max_nodes {
            return Err(StructuresError::CapacityExceeded {
                what: "node",
                count: self.nodes.len(),
                max: limits.max_nodes,
            });
        }
        if self.elements.len() > limits.max_elements {
            return Err(StructuresError::CapacityExceeded {
                what: "element",
                count: self.elements.len(),
                max: limits.max_elements,
            });
        }
        Ok(())
    }
}

/// The assembled platform with its hydrostatic totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformModel {
    pub frame: FrameModel,
    /// Total displaced volume (m³)
    pub displacement: f64,
    pub center_of_buoyancy: [f64; 3],
    pub awater: f64,
    pub iwater: f64,
    pub added_mass: [f64; 6],
}

/// Assembles platform members into one frame
///
/// The node numbering only depends on member coordinates, so it is kept
/// between calls and rebuilt when the rounded node layout changes or after
/// [`PlatformFrame::invalidate_topology`].
#[derive(Debug, Clone)]
pub struct PlatformFrame {
    limits: FrameLimits,
    topology: Option<Topology>,
}

impl PlatformFrame {
    pub fn new(limits: FrameLimits) -> Self {
        Self {
            limits,
            topology: None,
        }
    }

    /// The cached topology, if any
    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    /// Force the next assembly to renumber nodes
    pub fn invalidate_topology(&mut self) {
        self.topology = None;
    }

    /// Assemble the members into one platform model
    pub fn assemble(&mut self, members: &[MemberModel]) -> StructuresResult<PlatformModel> {
        if members.is_empty() {
            return Err(StructuresError::InvalidInput(
                "platform needs at least one member".to_string(),
            ));
        }
        for (k, member) in members.iter().enumerate() {
            member.validate(k)?;
        }

        let coords: Vec<&[[f64; 3]]> = members.iter().map(|m| m.nodes.as_slice()).collect();
        let stale = match &self.topology {
            Some(topology) => !topology.matches(&coords, self.limits.node_decimals),
            None => true,
        };
        if stale {
            self.topology = Some(Topology::build(&coords, &self.limits)?);
        } else {
            debug!("Reusing platform topology");
        }
        let Some(topology) = self.topology.as_ref() else {
            return Err(StructuresError::GeometryLookup(
                "platform topology is missing".to_string(),
            ));
        };

        let mut frame = frame_from_topology(topology, members)?;

        let mass: f64 = members.iter().map(|m| m.total_mass).sum();
        let volume: f64 = members.iter().map(|m| m.displacement).sum();
        frame.mass = mass;
        frame.cost = members.iter().map(|m| m.total_cost).sum();
        frame.center_of_mass = weighted_mean(
            members.iter().map(|m| (m.total_mass, m.center_of_mass)),
            "platform center of mass",
        )?;
        let center_of_buoyancy = weighted_mean(
            members.iter().map(|m| (m.displacement, m.center_of_buoyancy)),
            "platform center of buoyancy",
        )?;

        let mut added_mass = [0.0; 6];
        for member in members {
            for (total, m) in added_mass.iter_mut().zip(&member.added_mass) {
                *total += m;
            }
        }

        debug!(
            "Assembled platform: {} nodes, {} elements, mass {:.4e} kg, displacement {:.4e} m3",
            frame.n_nodes(),
            frame.n_elements(),
            mass,
            volume
        );

        Ok(PlatformModel {
            frame,
            displacement: volume,
            center_of_buoyancy,
            awater: members.iter().map(|m| m.awater).sum(),
            iwater: members.iter().map(|m| m.iwater).sum(),
            added_mass,
        })
    }
}

/// Frame model of a single tower member
///
/// Nodes stay in member order, so the first node is the tower base that
/// [`compose_system`](super::compose_system) attaches to the platform.
/// Mass, cost and center of mass are the member's own.
pub fn tower_frame(member: &MemberModel, limits: &FrameLimits) -> StructuresResult<FrameModel> {
    member.validate(0)?;
    let topology = Topology::chain(&member.nodes, limits)?;
    let mut frame = frame_from_topology(&topology, std::slice::from_ref(member))?;
    frame.mass = member.total_mass;
    frame.cost = member.total_cost;
    frame.center_of_mass = member.center_of_mass;
    Ok(frame)
}

/// The hub position above the transition node
pub fn hub_node(transition_node: [f64; 3], hub_height: f64) -> [f64; 3] {
    [transition_node[0], transition_node[1], hub_height]
}

/// Index of the node nearest to `point`; the first one wins ties
pub fn closest_node(nodes: &[[f64; 3]], point: [f64; 3]) -> StructuresResult<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, node) in nodes.iter().enumerate() {
        let d = distance(node, &point);
        if d.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, min)| d < min) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i).ok_or_else(|| {
        StructuresError::GeometryLookup(format!(
            "no node near {:?} among {} nodes",
            point,
            nodes.len()
        ))
    })
}

pub(crate) fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

/// Nodes, radii, buoyancy forces and elements; mass properties left at zero
fn frame_from_topology(
    topology: &Topology,
    members: &[MemberModel],
) -> StructuresResult<FrameModel> {
    let n_nodes = topology.n_nodes();
    let mut node_radii = vec![0.0_f64; n_nodes];
    let mut node_forces = vec![[0.0; 3]; n_nodes];

    for (k, member) in members.iter().enumerate() {
        let globals = topology.member_nodes(k).ok_or_else(|| {
            StructuresError::GeometryLookup(format!("member {} is not in the topology", k))
        })?;
        for (&g, &r) in globals.iter().zip(&member.radii) {
            node_radii[g] = node_radii[g].max(r);
        }
        let icb = globals.get(member.idx_cb).copied().ok_or_else(|| {
            StructuresError::GeometryLookup(format!(
                "member {} center of buoyancy index {} has no global node",
                k, member.idx_cb
            ))
        })?;
        node_forces[icb][2] += member.buoyancy_force;
    }

    let sections = members.iter().flat_map(|m| m.sections.iter().copied());
    let elements = topology
        .elements()
        .iter()
        .zip(sections)
        .map(|(&(n1, n2), section)| FrameElement { n1, n2, section })
        .collect();

    Ok(FrameModel {
        nodes: topology.nodes().to_vec(),
        node_radii,
        node_forces,
        elements,
        mass: 0.0,
        cost: 0.0,
        center_of_mass: [0.0; 3],
    })
}

/// Weighted average of points; a zero or non-finite total is an error
pub(crate) fn weighted_mean<I>(items: I, what: &str) -> StructuresResult<[f64; 3]>
where
    I: IntoIterator<Item = (f64, [f64; 3])>,
{
    let mut total = 0.0;
    let mut moment = [0.0; 3];
    for (w, p) in items {
        total += w;
        for (m, x) in moment.iter_mut().zip(p) {
            *m += w * x;
        }
    }
    let mean = moment.map(|m| m / total);
    if total == 0.0 || mean.iter().any(|v| !v.is_finite()) {
        return Err(StructuresError::NonFinite(format!(
            "{} with total weight {}",
            what, total
        )));
    }
    Ok(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn section() -> MemberSection {
        MemberSection::tube(6.0, 0.05, 200e9, 79.3e9, 7850.0)
    }

    fn column(x: f64, mass: f64, volume: f64) -> MemberModel {
        MemberModel::uniform(
            vec![[x, 0.0, -20.0], [x, 0.0, -10.0], [x, 0.0, 10.0]],
            3.0,
            section(),
        )
        .with_mass(mass, [x, 0.0, -12.0])
        .with_buoyancy(1, volume, [x, 0.0, -10.0], volume * 1025.0 * 9.80633)
        .with_cost(mass * 2.5)
        .with_hydrostatics(28.3, 63.6, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
    }

    fn brace(x0: f64, x1: f64) -> MemberModel {
        MemberModel::uniform(
            vec![[x0, 0.0, -20.0], [x1, 0.0, -20.0]],
            1.0,
            MemberSection::tube(2.0, 0.02, 200e9, 79.3e9, 7850.0),
        )
        .with_mass(1.0e5, [0.5 * (x0 + x1), 0.0, -20.0])
        .with_buoyancy(0, 60.0, [0.5 * (x0 + x1), 0.0, -20.0], 0.0)
    }

    #[test]
    fn test_single_member_platform() {
        let member = column(0.0, 2.0e6, 500.0);
        let mut platform = PlatformFrame::new(FrameLimits::default());
        let model = platform.assemble(std::slice::from_ref(&member)).unwrap();

        assert_eq!(model.frame.n_nodes(), 3);
        assert_eq!(model.frame.n_elements(), 2);
        assert_eq!(model.frame.mass, 2.0e6);
        assert_eq!(model.frame.cost, 5.0e6);
        assert_eq!(model.displacement, 500.0);
        assert_eq!(model.frame.center_of_mass, [0.0, 0.0, -12.0]);
        assert_eq!(model.added_mass, member.added_mass);
        assert_eq!(model.frame.node_forces[1][2], member.buoyancy_force);
    }

    #[test]
    fn test_totals_are_sums() {
        let members = vec![
            column(0.0, 2.0e6, 500.0),
            column(40.0, 1.0e6, 300.0),
            brace(0.0, 40.0),
        ];
        let mut platform = PlatformFrame::new(FrameLimits::default());
        let model = platform.assemble(&members).unwrap();

        assert_eq!(model.frame.mass, 2.0e6 + 1.0e6 + 1.0e5);
        assert_eq!(model.displacement, 500.0 + 300.0 + 60.0);
        assert_eq!(model.frame.cost, 2.5 * (2.0e6 + 1.0e6));
        assert_relative_eq!(model.awater, 2.0 * 28.3);
        assert_relative_eq!(model.added_mass[5], 12.0);
        assert_relative_eq!(
            model.frame.center_of_mass[0],
            (1.0e6 * 40.0 + 1.0e5 * 20.0) / 3.1e6,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            model.center_of_buoyancy[0],
            (300.0 * 40.0 + 60.0 * 20.0) / 860.0,
            max_relative = 1e-12
        );

        // the brace shares both column bases
        assert_eq!(model.frame.n_nodes(), 6);
        assert_eq!(model.frame.n_elements(), 5);
    }

    #[test]
    fn test_node_radius_is_largest_member() {
        let members = vec![column(0.0, 2.0e6, 500.0), brace(0.0, 40.0)];
        let mut platform = PlatformFrame::new(FrameLimits::default());
        let model = platform.assemble(&members).unwrap();
        let base = closest_node(&model.frame.nodes, [0.0, 0.0, -20.0]).unwrap();
        let far = closest_node(&model.frame.nodes, [40.0, 0.0, -20.0]).unwrap();
        assert_eq!(model.frame.node_radii[base], 3.0);
        assert_eq!(model.frame.node_radii[far], 1.0);
    }

    #[test]
    fn test_topology_is_reused_until_layout_changes() {
        let mut members = vec![column(0.0, 2.0e6, 500.0), brace(0.0, 40.0)];
        let mut platform = PlatformFrame::new(FrameLimits::default());
        let first = platform.assemble(&members).unwrap();
        let cached = platform.topology().cloned().unwrap();

        members[0].total_mass = 3.0e6;
        let second = platform.assemble(&members).unwrap();
        assert_eq!(platform.topology(), Some(&cached));
        assert_eq!(first.frame.nodes, second.frame.nodes);
        assert_eq!(first.frame.elements, second.frame.elements);

        members[1].nodes[1] = [50.0, 0.0, -20.0];
        let third = platform.assemble(&members).unwrap();
        assert_ne!(platform.topology(), Some(&cached));
        assert!(third.frame.nodes.contains(&[50.0, 0.0, -20.0]));
    }

    #[test]
    fn test_zero_mass_is_an_error() {
        let member = column(0.0, 0.0, 500.0);
        let mut platform = PlatformFrame::new(FrameLimits::default());
        let err = platform.assemble(&[member]).unwrap_err();
        assert!(matches!(err, StructuresError::NonFinite(_)));
    }

    #[test]
    fn test_zero_volume_is_an_error() {
        let member = column(0.0, 1.0e6, 0.0);
        let mut platform = PlatformFrame::new(FrameLimits::default());
        let err = platform.assemble(&[member]).unwrap_err();
        assert!(matches!(err, StructuresError::NonFinite(_)));
    }

    #[test]
    fn test_closest_node() {
        let nodes = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        assert_eq!(closest_node(&nodes, [0.9, 0.1, 0.0]).unwrap(), 1);
        assert!(matches!(
            closest_node(&[], [0.0; 3]),
            Err(StructuresError::GeometryLookup(_))
        ));
    }

    #[test]
    fn test_hub_node() {
        assert_eq!(hub_node([1.0, 2.0, 15.0], 150.0), [1.0, 2.0, 150.0]);
    }
}
